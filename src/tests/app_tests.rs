use std::sync::atomic::Ordering;
use std::sync::Arc;

use chrono::NaiveDate;

use crate::app::MapApp;
use crate::db::connection::Database;
use crate::db::view_state::{load_last_place, load_view, save_view};
use crate::domain::geo::{LatLng, ViewState, CITY_ZOOM, DEFAULT_CENTER};
use crate::domain::listing::Listing;
use crate::tests::support::{
    draft, listing, make_db, place_record, FakeGeocodeApi, FakeIdentityProvider, FakeListingsApi,
    FakeResponse, RecordingSurface, SurfaceProbe,
};

type TestApp = MapApp<RecordingSurface, FakeListingsApi, FakeGeocodeApi>;

fn paris_books(id: &str) -> Listing {
    let mut l = listing(id, 48.8566, 2.3522);
    l.city = "Paris".to_string();
    l.categories = vec!["Books".to_string()];
    l.start_date = NaiveDate::from_ymd_opt(2025, 6, 1);
    l
}

fn make_app(
    responses: Vec<FakeResponse>,
    hits: Vec<crate::api::PlaceRecord>,
) -> (TestApp, RecordingSurface, Arc<SurfaceProbe>, Database) {
    let db = make_db();
    let app = MapApp::new(
        FakeListingsApi::new(responses),
        FakeGeocodeApi::new(hits),
        db.clone(),
    );
    let (surface, probe) = RecordingSurface::new();
    (app, surface, probe, db)
}

#[tokio::test]
async fn mount_restores_the_saved_camera() {
    let (mut app, surface, probe, db) = make_app(Vec::new(), Vec::new());
    let saved = ViewState::new(LatLng::new(43.2951, -0.3708), 10);
    save_view(&db, &saved).unwrap();

    app.mount(surface);

    let (center, zoom) = probe.last_view().unwrap();
    assert!((center.lat - saved.center.lat).abs() < 1e-9);
    assert_eq!(zoom, 10);
}

#[tokio::test]
async fn mount_without_saved_state_uses_the_default_view() {
    let (mut app, surface, probe, _db) = make_app(Vec::new(), Vec::new());

    app.mount(surface);

    let (center, zoom) = probe.last_view().unwrap();
    assert_eq!(center, DEFAULT_CENTER);
    assert_eq!(zoom, 6);
}

#[tokio::test]
async fn refresh_drives_the_marker_set() {
    let (mut app, surface, probe, _db) = make_app(
        vec![FakeResponse::Ok(vec![paris_books("a"), paris_books("b")])],
        Vec::new(),
    );

    app.mount(surface);
    assert_eq!(probe.live_count(), 0);

    app.refresh().await;
    assert_eq!(probe.live_count(), 2);
}

#[tokio::test]
async fn category_selection_round_trip_empties_and_restores_markers() {
    let (mut app, surface, probe, _db) = make_app(
        vec![FakeResponse::Ok(vec![paris_books("a"), paris_books("b")])],
        Vec::new(),
    );
    app.mount(surface);
    app.refresh().await;

    app.toggle_category("Books");
    assert_eq!(probe.live_count(), 2);

    // Move the whole selection to a tag neither listing carries.
    app.toggle_category("Books");
    app.toggle_category("Art");
    assert_eq!(probe.live_count(), 0);
    assert!(app.visible().is_empty());

    app.clear_categories();
    assert_eq!(probe.live_count(), 2);
}

#[tokio::test]
async fn date_threshold_filters_markers_and_clears_back() {
    let mut june = paris_books("june");
    june.start_date = NaiveDate::from_ymd_opt(2025, 6, 15);
    let mut may = paris_books("may");
    may.start_date = NaiveDate::from_ymd_opt(2025, 5, 15);

    let (mut app, surface, probe, _db) =
        make_app(vec![FakeResponse::Ok(vec![june, may])], Vec::new());
    app.mount(surface);
    app.refresh().await;
    assert_eq!(probe.live_count(), 2);

    app.set_date_threshold(NaiveDate::from_ymd_opt(2025, 6, 1).unwrap());
    assert_eq!(probe.live_listing_ids(), vec!["june"]);

    app.clear_date_threshold();
    assert_eq!(probe.live_count(), 2);
}

#[tokio::test]
async fn searching_a_known_city_recenters_and_persists() {
    let (mut app, surface, probe, db) = make_app(
        Vec::new(),
        vec![place_record(
            "Paris, Île-de-France, France",
            "48.8566",
            "2.3522",
        )],
    );
    app.mount(surface);

    assert!(app.search_city("Paris").await);

    let (center, zoom) = probe.last_view().unwrap();
    assert!((center.lat - 48.8566).abs() < 1e-9);
    assert_eq!(zoom, CITY_ZOOM);

    let persisted = load_view(&db).unwrap().unwrap();
    assert_eq!(persisted.zoom, CITY_ZOOM);
    assert_eq!(load_last_place(&db).unwrap().as_deref(), Some("Paris"));
    assert_eq!(app.last_place().as_deref(), Some("Paris"));
}

#[tokio::test]
async fn searching_an_unknown_city_changes_nothing() {
    let (mut app, surface, probe, db) = make_app(Vec::new(), Vec::new());
    app.mount(surface);
    let views_before = probe.view_count();

    assert!(!app.search_city("Nowhereville").await);

    assert_eq!(probe.view_count(), views_before);
    assert!(load_view(&db).unwrap().is_none());
    assert!(load_last_place(&db).unwrap().is_none());
}

#[tokio::test]
async fn accepting_a_suggestion_recenters_and_persists_its_label() {
    let (mut app, surface, probe, db) = make_app(Vec::new(), Vec::new());
    app.mount(surface);

    let suggestion = crate::geocode::GeocodeSuggestion {
        label: "Pau".to_string(),
        point: LatLng::new(43.2951, -0.3708),
    };
    app.accept_suggestion(&suggestion);

    let (center, zoom) = probe.last_view().unwrap();
    assert!((center.lng + 0.3708).abs() < 1e-9);
    assert_eq!(zoom, CITY_ZOOM);
    assert_eq!(load_last_place(&db).unwrap().as_deref(), Some("Pau"));
}

#[tokio::test]
async fn creating_a_listing_requires_a_signed_in_identity() {
    let (mut app, surface, probe, _db) = make_app(Vec::new(), Vec::new());
    app.mount(surface);

    assert!(app.create_listing(draft("Chez Nous")).await.is_none());
    assert!(app.store().is_empty());

    let provider = FakeIdentityProvider::signed_in_as("casa@example.com");
    assert!(app.sign_in(&provider).await);

    let created = app.create_listing(draft("Chez Nous")).await.unwrap();
    assert_eq!(app.store().len(), 1);
    assert_eq!(probe.live_listing_ids(), vec![created.id.clone()]);
}

#[tokio::test]
async fn unmount_clears_markers_and_destroys_the_surface() {
    let (mut app, surface, probe, _db) = make_app(
        vec![FakeResponse::Ok(vec![paris_books("a")])],
        Vec::new(),
    );
    app.mount(surface);
    app.refresh().await;
    assert_eq!(probe.live_count(), 1);

    app.unmount();

    assert_eq!(probe.live_count(), 0);
    assert!(probe.destroyed.load(Ordering::SeqCst));
    assert_eq!(probe.bad_removals.load(Ordering::SeqCst), 0);
    assert!(app.store().is_empty());
    assert!(app.visible().is_empty());
}

#[tokio::test]
async fn failed_refresh_leaves_markers_in_place() {
    let (mut app, surface, probe, _db) = make_app(
        vec![
            FakeResponse::Ok(vec![paris_books("a")]),
            FakeResponse::Err(crate::errors::ApiError::Network("down".to_string())),
        ],
        Vec::new(),
    );
    app.mount(surface);
    app.refresh().await;
    assert_eq!(probe.live_count(), 1);

    app.refresh().await;
    assert_eq!(probe.live_count(), 1);
    assert_eq!(app.store().len(), 1);
}
