use std::collections::{BTreeMap, VecDeque};
use std::sync::atomic::{AtomicBool, AtomicU64, AtomicUsize, Ordering};
use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::api::{GeocodeApi, ListingsApi, PlaceRecord};
use crate::auth::{Identity, IdentityProvider};
use crate::db::connection::{init_db, Database};
use crate::domain::geo::LatLng;
use crate::domain::listing::{Listing, NewListing};
use crate::errors::ApiError;
use crate::map::surface::{MapSurface, MarkerId, MarkerSpec};

static DB_COUNTER: AtomicU64 = AtomicU64::new(0);

/// Fresh state db under a unique temp path.
pub fn make_db() -> Database {
    let path = std::env::temp_dir().join(format!(
        "casamap_test_{}_{}.sqlite",
        std::time::SystemTime::now()
            .duration_since(std::time::UNIX_EPOCH)
            .unwrap()
            .as_nanos(),
        DB_COUNTER.fetch_add(1, Ordering::SeqCst),
    ));
    let db = Database::new(path.to_string_lossy().into_owned());
    init_db(&db).expect("Failed to initialize state db");
    db
}

/// A listing at a valid coordinate with no tags and no dates.
pub fn listing(id: &str, lat: f64, lng: f64) -> Listing {
    Listing {
        id: id.to_string(),
        title: format!("Casa {id}"),
        description: String::new(),
        address: String::new(),
        city: String::new(),
        start_date: None,
        end_date: None,
        latitude: Some(lat),
        longitude: Some(lng),
        categories: Vec::new(),
        owner: None,
    }
}

pub fn draft(title: &str) -> NewListing {
    NewListing {
        title: title.to_string(),
        description: String::new(),
        address: "1 Rue de Test".to_string(),
        city: "Paris".to_string(),
        start_date: chrono::NaiveDate::from_ymd_opt(2025, 6, 1).unwrap(),
        end_date: chrono::NaiveDate::from_ymd_opt(2025, 6, 30).unwrap(),
        latitude: 48.8566,
        longitude: 2.3522,
        categories: Vec::new(),
        user_email: String::new(),
    }
}

pub fn place_record(display_name: &str, lat: &str, lon: &str) -> PlaceRecord {
    PlaceRecord {
        display_name: display_name.to_string(),
        lat: lat.to_string(),
        lon: lon.to_string(),
    }
}

// ----- Surface double -----

/// Observable half of the recording surface; tests keep the probe while
/// the surface itself moves into a controller.
#[derive(Default)]
pub struct SurfaceProbe {
    pub live: Mutex<BTreeMap<MarkerId, MarkerSpec>>,
    pub views: Mutex<Vec<(LatLng, u8)>>,
    pub tile_layers: AtomicUsize,
    pub destroyed: AtomicBool,
    pub bad_removals: AtomicUsize,
}

impl SurfaceProbe {
    pub fn live_count(&self) -> usize {
        self.live.lock().unwrap().len()
    }

    pub fn live_listing_ids(&self) -> Vec<String> {
        self.live
            .lock()
            .unwrap()
            .values()
            .map(|spec| spec.listing_id.clone())
            .collect()
    }

    pub fn last_view(&self) -> Option<(LatLng, u8)> {
        self.views.lock().unwrap().last().copied()
    }

    pub fn view_count(&self) -> usize {
        self.views.lock().unwrap().len()
    }
}

/// In-memory map surface that records every operation.
pub struct RecordingSurface {
    next_id: MarkerId,
    pub probe: Arc<SurfaceProbe>,
}

impl RecordingSurface {
    pub fn new() -> (Self, Arc<SurfaceProbe>) {
        let probe = Arc::new(SurfaceProbe::default());
        (
            Self {
                next_id: 0,
                probe: Arc::clone(&probe),
            },
            probe,
        )
    }
}

impl MapSurface for RecordingSurface {
    fn add_tile_layer(&mut self, _url_template: &str, _max_zoom: u8) {
        self.probe.tile_layers.fetch_add(1, Ordering::SeqCst);
    }

    fn set_view(&mut self, center: LatLng, zoom: u8) {
        self.probe.views.lock().unwrap().push((center, zoom));
    }

    fn add_marker(&mut self, spec: &MarkerSpec) -> MarkerId {
        self.next_id += 1;
        self.probe
            .live
            .lock()
            .unwrap()
            .insert(self.next_id, spec.clone());
        self.next_id
    }

    fn remove_marker(&mut self, id: MarkerId) {
        if self.probe.live.lock().unwrap().remove(&id).is_none() {
            self.probe.bad_removals.fetch_add(1, Ordering::SeqCst);
        }
    }

    fn project(&self, point: LatLng) -> (f32, f32) {
        (point.lng as f32, point.lat as f32)
    }

    fn destroy(&mut self) {
        self.probe.live.lock().unwrap().clear();
        self.probe.destroyed.store(true, Ordering::SeqCst);
    }
}

// ----- Listings endpoint double -----

pub enum FakeResponse {
    Ok(Vec<Listing>),
    OkAfter(Duration, Vec<Listing>),
    Err(ApiError),
}

/// Scripted listings endpoint: responses pop in order, one per call.
pub struct FakeListingsApi {
    responses: Mutex<VecDeque<FakeResponse>>,
    pub fetch_calls: AtomicUsize,
    created: AtomicUsize,
}

impl FakeListingsApi {
    pub fn new(responses: Vec<FakeResponse>) -> Self {
        Self {
            responses: Mutex::new(responses.into()),
            fetch_calls: AtomicUsize::new(0),
            created: AtomicUsize::new(0),
        }
    }

    pub fn empty() -> Self {
        Self::new(Vec::new())
    }
}

impl ListingsApi for FakeListingsApi {
    async fn fetch_all(&self) -> Result<Vec<Listing>, ApiError> {
        self.fetch_calls.fetch_add(1, Ordering::SeqCst);
        let next = self
            .responses
            .lock()
            .unwrap()
            .pop_front()
            .expect("no scripted fetch response left");
        match next {
            FakeResponse::Ok(listings) => Ok(listings),
            FakeResponse::OkAfter(delay, listings) => {
                tokio::time::sleep(delay).await;
                Ok(listings)
            }
            FakeResponse::Err(e) => Err(e),
        }
    }

    async fn create(&self, draft: &NewListing) -> Result<Listing, ApiError> {
        let n = self.created.fetch_add(1, Ordering::SeqCst) + 1;
        let mut created = listing(&format!("created-{n}"), draft.latitude, draft.longitude);
        created.title = draft.title.clone();
        created.categories = draft.categories.clone();
        created.start_date = Some(draft.start_date);
        created.end_date = Some(draft.end_date);
        Ok(created)
    }
}

// ----- Geocode double -----

/// Geocode service returning the same scripted hits for every query,
/// counting calls and recording queries.
pub struct FakeGeocodeApi {
    hits: Mutex<Vec<PlaceRecord>>,
    fail: AtomicBool,
    pub calls: AtomicUsize,
    pub queries: Mutex<Vec<String>>,
}

impl FakeGeocodeApi {
    pub fn new(hits: Vec<PlaceRecord>) -> Self {
        Self {
            hits: Mutex::new(hits),
            fail: AtomicBool::new(false),
            calls: AtomicUsize::new(0),
            queries: Mutex::new(Vec::new()),
        }
    }

    pub fn set_fail(&self, fail: bool) {
        self.fail.store(fail, Ordering::SeqCst);
    }
}

impl GeocodeApi for FakeGeocodeApi {
    async fn search(&self, query: &str, limit: u8) -> Result<Vec<PlaceRecord>, ApiError> {
        self.calls.fetch_add(1, Ordering::SeqCst);
        self.queries.lock().unwrap().push(query.to_string());
        if self.fail.load(Ordering::SeqCst) {
            return Err(ApiError::Network("scripted failure".to_string()));
        }
        let mut hits = self.hits.lock().unwrap().clone();
        hits.truncate(limit as usize);
        Ok(hits)
    }
}

// ----- Identity double -----

pub struct FakeIdentityProvider {
    pub identity: Identity,
}

impl FakeIdentityProvider {
    pub fn signed_in_as(email: &str) -> Self {
        Self {
            identity: Identity {
                email: email.to_string(),
                name: None,
                avatar_url: None,
            },
        }
    }
}

impl IdentityProvider for FakeIdentityProvider {
    async fn sign_in(&self) -> Result<Identity, ApiError> {
        Ok(self.identity.clone())
    }
}

/// Let spawned tasks on the current-thread test runtime run to
/// completion.
pub async fn settle() {
    for _ in 0..20 {
        tokio::task::yield_now().await;
    }
}
