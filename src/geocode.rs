use std::collections::HashSet;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use tracing::{debug, warn};

use crate::api::{GeocodeApi, PlaceRecord};
use crate::domain::geo::LatLng;
use crate::tasks::Debounce;

/// Keystrokes inside this window collapse into one request.
pub const QUIET_PERIOD: Duration = Duration::from_millis(300);

/// Queries shorter than this clear the suggestion list without ever
/// touching the network.
pub const MIN_QUERY_LEN: usize = 3;

pub const SUGGESTION_LIMIT: u8 = 5;

/// One place the user can accept: the label shown and where it is.
#[derive(Debug, Clone, PartialEq)]
pub struct GeocodeSuggestion {
    pub label: String,
    pub point: LatLng,
}

/// Free-text place search against a rate-sensitive geocoding service.
/// `suggest` debounces; `resolve` is a single immediate lookup.
pub struct GeocodeLookup<A> {
    api: Arc<A>,
    suggestions: Arc<Mutex<Vec<GeocodeSuggestion>>>,
    debounce: Debounce,
}

impl<A: GeocodeApi + Send + Sync + 'static> GeocodeLookup<A> {
    pub fn new(api: A) -> Self {
        Self {
            api: Arc::new(api),
            suggestions: Arc::new(Mutex::new(Vec::new())),
            debounce: Debounce::new(),
        }
    }

    /// The current suggestion list. Replaced wholesale by each successful
    /// lookup; cleared by short queries and by `accept`.
    pub fn suggestions(&self) -> Vec<GeocodeSuggestion> {
        self.suggestions.lock().unwrap().clone()
    }

    #[cfg(test)]
    pub(crate) fn api(&self) -> &A {
        &self.api
    }

    /// Feed one keystroke's worth of query text. A new call supersedes
    /// the pending quiet-period timer, so a stale request is never
    /// issued. Lookup failures are logged and leave the list as it was.
    pub fn suggest(&self, query: &str) {
        if query.chars().count() < MIN_QUERY_LEN {
            self.debounce.cancel();
            self.suggestions.lock().unwrap().clear();
            return;
        }

        let api = Arc::clone(&self.api);
        let sink = Arc::clone(&self.suggestions);
        let query = query.to_string();

        self.debounce.schedule(QUIET_PERIOD, async move {
            match api.search(&query, SUGGESTION_LIMIT).await {
                Ok(records) => {
                    let deduped = dedupe_by_leading_segment(records);
                    debug!(count = deduped.len(), "suggestion list replaced");
                    *sink.lock().unwrap() = deduped;
                }
                Err(e) => warn!("suggestion lookup failed: {e}"),
            }
        });
    }

    /// Accept a suggestion: the list clears and the caller gets the
    /// point to recenter on.
    pub fn accept(&self, suggestion: &GeocodeSuggestion) -> LatLng {
        self.debounce.cancel();
        self.suggestions.lock().unwrap().clear();
        suggestion.point
    }

    /// One immediate single-result lookup. `None` means the place was
    /// not found, or the lookup failed (which is logged); either way the
    /// caller's view stays where it was.
    pub async fn resolve(&self, place_name: &str) -> Option<GeocodeSuggestion> {
        match self.api.search(place_name, 1).await {
            Ok(records) => {
                let found = records.into_iter().find_map(suggestion_from_record);
                if found.is_none() {
                    debug!(place = place_name, "place not found");
                }
                found
            }
            Err(e) => {
                warn!("place lookup failed: {e}");
                None
            }
        }
    }
}

fn suggestion_from_record(record: PlaceRecord) -> Option<GeocodeSuggestion> {
    let lat: f64 = record.lat.trim().parse().ok()?;
    let lng: f64 = record.lon.trim().parse().ok()?;
    let point = LatLng::new(lat, lng);
    if !point.is_valid() {
        warn!(place = %record.display_name, "geocode hit with out-of-range coordinates");
        return None;
    }
    Some(GeocodeSuggestion {
        label: leading_segment(&record.display_name),
        point,
    })
}

/// "Paris, Île-de-France, France métropolitaine, France" → "Paris".
fn leading_segment(display_name: &str) -> String {
    display_name
        .split(',')
        .next()
        .unwrap_or(display_name)
        .trim()
        .to_string()
}

/// Collapse hits sharing a leading label segment; the first one wins and
/// input order is preserved.
fn dedupe_by_leading_segment(records: Vec<PlaceRecord>) -> Vec<GeocodeSuggestion> {
    let mut seen = HashSet::new();
    let mut out = Vec::new();
    for record in records {
        let Some(suggestion) = suggestion_from_record(record) else {
            continue;
        };
        if seen.insert(suggestion.label.clone()) {
            out.push(suggestion);
        }
    }
    out
}
