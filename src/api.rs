// api.rs
use std::future::Future;
use std::time::Duration;

use serde::Deserialize;
use tracing::warn;
use url::Url;

use crate::domain::listing::{Listing, NewListing};
use crate::errors::ApiError;

const USER_AGENT: &str = concat!("casamap/", env!("CARGO_PKG_VERSION"));
const REQUEST_TIMEOUT: Duration = Duration::from_secs(10);

/// How much of a bad payload makes it into an error message.
const PAYLOAD_SNIPPET_LEN: usize = 200;

/// The listings REST endpoint, as consumed by this crate.
pub trait ListingsApi {
    /// GET the full collection.
    fn fetch_all(&self) -> impl Future<Output = Result<Vec<Listing>, ApiError>> + Send;

    /// POST a new listing; yields the record the backend created.
    fn create(&self, listing: &NewListing) -> impl Future<Output = Result<Listing, ApiError>> + Send;
}

/// One raw hit from the geocoding service. Coordinates arrive as strings.
#[derive(Debug, Clone, Deserialize)]
pub struct PlaceRecord {
    pub display_name: String,
    pub lat: String,
    pub lon: String,
}

/// The geocoding service. Implementations are country-scoped: every
/// search carries the configured country constraint.
pub trait GeocodeApi {
    fn search(
        &self,
        query: &str,
        limit: u8,
    ) -> impl Future<Output = Result<Vec<PlaceRecord>, ApiError>> + Send;
}

pub struct HttpListingsApi {
    client: reqwest::Client,
    endpoint: Url,
}

impl HttpListingsApi {
    pub fn new(endpoint: Url) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self { client, endpoint })
    }
}

impl ListingsApi for HttpListingsApi {
    async fn fetch_all(&self) -> Result<Vec<Listing>, ApiError> {
        let text = fetch_text(self.client.get(self.endpoint.clone())).await?;
        parse_listing_array(&text)
    }

    async fn create(&self, listing: &NewListing) -> Result<Listing, ApiError> {
        let text = fetch_text(self.client.post(self.endpoint.clone()).json(listing)).await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::JsonParse(format!("{e}; payload: {}", snippet(&text))))
    }
}

pub struct HttpGeocodeApi {
    client: reqwest::Client,
    endpoint: Url,
    country: String,
}

impl HttpGeocodeApi {
    pub fn new(endpoint: Url, country: impl Into<String>) -> Result<Self, ApiError> {
        let client = reqwest::Client::builder()
            .user_agent(USER_AGENT)
            .timeout(REQUEST_TIMEOUT)
            .build()
            .map_err(|e| ApiError::Network(e.to_string()))?;

        Ok(Self {
            client,
            endpoint,
            country: country.into(),
        })
    }
}

impl GeocodeApi for HttpGeocodeApi {
    async fn search(&self, query: &str, limit: u8) -> Result<Vec<PlaceRecord>, ApiError> {
        let limit = limit.to_string();
        let request = self.client.get(self.endpoint.clone()).query(&[
            ("format", "json"),
            ("q", query),
            ("countrycodes", self.country.as_str()),
            ("limit", limit.as_str()),
        ]);

        let text = fetch_text(request).await?;
        serde_json::from_str(&text)
            .map_err(|e| ApiError::JsonParse(format!("{e}; payload: {}", snippet(&text))))
    }
}

/// Send the request, read the body, and turn a non-2xx status into an
/// error carrying that body.
async fn fetch_text(request: reqwest::RequestBuilder) -> Result<String, ApiError> {
    let resp = request
        .send()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;

    let status = resp.status();
    let text = resp
        .text()
        .await
        .map_err(|e| ApiError::Network(e.to_string()))?;

    if !status.is_success() {
        return Err(ApiError::Status(status.as_u16(), snippet(&text).into_owned()));
    }

    Ok(text)
}

/// Parse a listings payload. A record that does not deserialize is
/// dropped with a warning; only a body that is not an array at all fails
/// the fetch.
pub(crate) fn parse_listing_array(text: &str) -> Result<Vec<Listing>, ApiError> {
    let root: serde_json::Value = serde_json::from_str(text)
        .map_err(|e| ApiError::JsonParse(format!("{e}; payload: {}", snippet(text))))?;
    let serde_json::Value::Array(values) = root else {
        return Err(ApiError::UnexpectedShape(format!(
            "expected an array of listings; payload: {}",
            snippet(text)
        )));
    };

    let mut listings = Vec::with_capacity(values.len());
    for value in values {
        match serde_json::from_value::<Listing>(value.clone()) {
            Ok(listing) => listings.push(listing),
            Err(e) => warn!(payload = %value, "skipping listing record: {e}"),
        }
    }
    Ok(listings)
}

fn snippet(text: &str) -> std::borrow::Cow<'_, str> {
    if text.chars().count() <= PAYLOAD_SNIPPET_LEN {
        return text.into();
    }
    let cut: String = text.chars().take(PAYLOAD_SNIPPET_LEN).collect();
    format!("{cut}…").into()
}
