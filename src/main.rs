use casamap::api::{HttpGeocodeApi, HttpListingsApi};
use casamap::config::Config;
use casamap::db::connection::{init_db, Database};
use casamap::{LatLng, MapApp, MapSurface, MarkerId, MarkerSpec};
use tracing::info;

/// Headless stand-in for a real map surface: it logs what it is asked
/// to draw, which is enough to run the whole pipeline end to end.
#[derive(Default)]
struct ConsoleSurface {
    next_id: MarkerId,
    live: usize,
}

impl MapSurface for ConsoleSurface {
    fn add_tile_layer(&mut self, url_template: &str, max_zoom: u8) {
        info!(template = url_template, max_zoom, "tile layer attached");
    }

    fn set_view(&mut self, center: LatLng, zoom: u8) {
        info!(lat = center.lat, lng = center.lng, zoom, "view set");
    }

    fn add_marker(&mut self, spec: &MarkerSpec) -> MarkerId {
        self.next_id += 1;
        self.live += 1;
        info!(
            listing = %spec.listing_id,
            lat = spec.point.lat,
            lng = spec.point.lng,
            "marker placed"
        );
        self.next_id
    }

    fn remove_marker(&mut self, _id: MarkerId) {
        self.live = self.live.saturating_sub(1);
    }

    fn project(&self, _point: LatLng) -> (f32, f32) {
        (0.0, 0.0)
    }

    fn destroy(&mut self) {
        info!(live = self.live, "surface destroyed");
    }
}

#[tokio::main(flavor = "current_thread")]
async fn main() {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "info".into()),
        )
        .init();

    let config = Config::load();

    // State db holds the last view and the last searched place.
    let db = Database::new(config.state_db_path.clone());
    if let Err(e) = init_db(&db) {
        eprintln!("❌ State database initialization failed: {e}");
        std::process::exit(1);
    }

    let listings_api = match HttpListingsApi::new(config.listings_endpoint.clone()) {
        Ok(api) => api,
        Err(e) => {
            eprintln!("❌ Listings client init failed: {e}");
            std::process::exit(1);
        }
    };
    let geocode_api =
        match HttpGeocodeApi::new(config.geocode_endpoint.clone(), config.country_code.clone()) {
            Ok(api) => api,
            Err(e) => {
                eprintln!("❌ Geocode client init failed: {e}");
                std::process::exit(1);
            }
        };

    let mut app = MapApp::new(listings_api, geocode_api, db);
    app.mount(ConsoleSurface::default());

    app.refresh().await;
    info!(
        listings = app.store().len(),
        visible = app.visible().len(),
        "collection refreshed"
    );

    // `casamap <city>` recenters on a resolved city, like the search box.
    if let Some(city) = std::env::args().nth(1) {
        if app.search_city(&city).await {
            info!(city = %city, "recentered on searched city");
        }
    }

    app.unmount();
}
