use std::env;
use std::fmt::Display;
use std::str::FromStr;

use tracing::{info, warn};
use url::Url;

pub struct Config {
    /// GET for the collection, POST for creation.
    pub listings_endpoint: Url,
    pub geocode_endpoint: Url,
    /// Geocode lookups are constrained to this country.
    pub country_code: String,
    pub state_db_path: String,
}

impl Config {
    pub fn load() -> Self {
        Self {
            listings_endpoint: try_load("CASAMAP_API_URL", "http://localhost:3001/api/casa"),
            geocode_endpoint: try_load(
                "CASAMAP_GEOCODE_URL",
                "https://nominatim.openstreetmap.org/search",
            ),
            country_code: try_load("CASAMAP_COUNTRY", "fr"),
            state_db_path: try_load("CASAMAP_STATE_DB", "casamap.sqlite3"),
        }
    }
}

fn var(key: &str) -> Result<String, ()> {
    env::var(key).map_err(|_| ())
}

fn try_load<T: FromStr>(key: &str, default: &str) -> T
where
    T::Err: Display,
{
    var(key)
        .unwrap_or_else(|_| {
            info!("{key} not set, using default: {default}");
            default.to_string()
        })
        .parse()
        .map_err(|e| {
            warn!("Invalid {key} value: {e}");
        })
        .expect("Environment misconfigured!")
}
