use chrono::{NaiveDate, NaiveDateTime};
use tracing::{info, warn};

use crate::api::{GeocodeApi, ListingsApi};
use crate::auth::{Identity, IdentityProvider};
use crate::db::connection::Database;
use crate::db::view_state;
use crate::domain::filters::{self, FilterState};
use crate::domain::geo::{LatLng, ViewState, CITY_ZOOM};
use crate::domain::listing::{Listing, NewListing};
use crate::geocode::{GeocodeLookup, GeocodeSuggestion};
use crate::map::controller::MapController;
use crate::map::markers::{self, MarkerSynchronizer};
use crate::map::panel::DetailPanel;
use crate::map::surface::{MapSurface, MarkerId, MarkerInput};
use crate::store::ListingStore;

/// Everything one map screen owns, wired together: the remote listing
/// collection, the geocoder, the filters, the surface lifecycle and the
/// persisted camera. Instead of leaning on framework re-renders, marker
/// rebuilds are driven explicitly, and only when the visible id-set
/// actually changed.
pub struct MapApp<S, L, G>
where
    S: MapSurface,
{
    store: ListingStore<L>,
    lookup: GeocodeLookup<G>,
    filters: FilterState,
    controller: MapController<S>,
    markers: MarkerSynchronizer,
    db: Database,
    identity: Option<Identity>,
    visible: Vec<Listing>,
}

impl<S, L, G> MapApp<S, L, G>
where
    S: MapSurface,
    L: ListingsApi,
    G: GeocodeApi + Send + Sync + 'static,
{
    pub fn new(listings_api: L, geocode_api: G, db: Database) -> Self {
        Self {
            store: ListingStore::new(listings_api),
            lookup: GeocodeLookup::new(geocode_api),
            filters: FilterState::new(),
            controller: MapController::new(),
            markers: MarkerSynchronizer::new(),
            db,
            identity: None,
            visible: Vec::new(),
        }
    }

    pub fn store(&self) -> &ListingStore<L> {
        &self.store
    }

    pub fn filters(&self) -> &FilterState {
        &self.filters
    }

    pub fn panel(&self) -> &DetailPanel {
        self.markers.panel()
    }

    /// The post-filter subset currently driving the marker set.
    pub fn visible(&self) -> &[Listing] {
        &self.visible
    }

    pub fn identity(&self) -> Option<&Identity> {
        self.identity.as_ref()
    }

    // ----- Surface lifecycle -----

    /// Mount the surface, restoring the saved camera or falling back to
    /// the default view.
    pub fn mount(&mut self, surface: S) {
        let view = match view_state::load_view(&self.db) {
            Ok(Some(saved)) => saved,
            Ok(None) => ViewState::default(),
            Err(e) => {
                warn!("saved view unavailable, using default: {e}");
                ViewState::default()
            }
        };
        self.controller.mount(surface, &view);
        self.resync(true);
    }

    pub fn unmount(&mut self) {
        if let Some(surface) = self.controller.surface_mut() {
            self.markers.clear(surface);
        }
        self.controller.unmount();
        // The collection's lifetime is the screen's.
        self.store.clear();
        self.visible.clear();
    }

    // ----- Listings -----

    /// Re-fetch the collection; on success the marker set follows.
    pub async fn refresh(&mut self) {
        if self.store.refresh().await {
            self.resync(false);
        }
    }

    /// Create a listing as the signed-in user and show it immediately.
    /// Without an identity this is a logged no-op.
    pub async fn create_listing(&mut self, mut draft: NewListing) -> Option<Listing> {
        let Some(identity) = &self.identity else {
            warn!("create_listing without a signed-in identity");
            return None;
        };
        draft.user_email = identity.email.clone();

        match self.store.create(&draft).await {
            Ok(created) => {
                self.resync(false);
                Some(created)
            }
            Err(e) => {
                warn!("listing creation failed: {e}");
                None
            }
        }
    }

    // ----- Filters -----

    pub fn toggle_category(&mut self, tag: &str) {
        self.filters.toggle_category(tag);
        self.resync(false);
    }

    pub fn clear_categories(&mut self) {
        self.filters.clear_categories();
        self.resync(false);
    }

    pub fn set_date_threshold(&mut self, day: NaiveDate) {
        self.filters.set_date_threshold(day);
        self.resync(false);
    }

    pub fn set_date_threshold_at(&mut self, at: NaiveDateTime) {
        self.filters.set_date_threshold_at(at);
        self.resync(false);
    }

    pub fn clear_date_threshold(&mut self) {
        self.filters.clear_date_threshold();
        self.resync(false);
    }

    // ----- Search -----

    pub fn suggest(&self, query: &str) {
        self.lookup.suggest(query);
    }

    pub fn suggestions(&self) -> Vec<GeocodeSuggestion> {
        self.lookup.suggestions()
    }

    pub fn accept_suggestion(&mut self, suggestion: &GeocodeSuggestion) {
        let point = self.lookup.accept(suggestion);
        self.jump_to(point);
        self.remember_place(&suggestion.label);
    }

    /// Resolve a city by name and recenter on it. `false` when the place
    /// wasn't found (or the lookup failed): the view stays where it was.
    pub async fn search_city(&mut self, name: &str) -> bool {
        let Some(found) = self.lookup.resolve(name).await else {
            info!(place = name, "city not found, view unchanged");
            return false;
        };
        self.jump_to(found.point);
        self.remember_place(&found.label);
        true
    }

    /// The place name saved by the previous session, for prefilling a
    /// search box.
    pub fn last_place(&self) -> Option<String> {
        match view_state::load_last_place(&self.db) {
            Ok(place) => place,
            Err(e) => {
                warn!("saved place unavailable: {e}");
                None
            }
        }
    }

    // ----- Identity -----

    pub async fn sign_in<P: IdentityProvider>(&mut self, provider: &P) -> bool {
        match provider.sign_in().await {
            Ok(identity) => {
                info!(email = %identity.email, "signed in");
                self.identity = Some(identity);
                true
            }
            Err(e) => {
                warn!("sign-in failed: {e}");
                false
            }
        }
    }

    pub fn sign_out(&mut self) {
        self.identity = None;
    }

    // ----- Marker interaction -----

    pub fn on_marker_input(&mut self, id: MarkerId, input: MarkerInput) {
        if let Some(surface) = self.controller.surface_mut() {
            self.markers.on_marker_input(surface, id, input);
        }
    }

    fn jump_to(&mut self, point: LatLng) {
        self.controller.set_view(point, CITY_ZOOM);
        let view = ViewState::new(point, CITY_ZOOM);
        if let Err(e) = view_state::save_view(&self.db, &view) {
            warn!("failed to persist view: {e}");
        }
    }

    fn remember_place(&self, label: &str) {
        if let Err(e) = view_state::save_last_place(&self.db, label) {
            warn!("failed to persist place name: {e}");
        }
    }

    /// Recompute the visible subset and, if its identity changed (or the
    /// surface just mounted), rebuild the markers.
    fn resync(&mut self, force: bool) {
        let next = filters::visible(&self.store.snapshot(), &self.filters);
        let changed = !markers::same_id_set(&self.visible, &next);
        self.visible = next;

        if !force && !changed {
            return;
        }
        if let Some(surface) = self.controller.surface_mut() {
            self.markers.sync(surface, &self.visible);
        }
    }
}
