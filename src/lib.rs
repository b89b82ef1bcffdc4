pub mod api;
pub mod app;
pub mod auth;
pub mod config;
pub mod db;
pub mod domain;
pub mod errors;
pub mod geocode;
pub mod map;
pub mod store;

mod tasks;

#[cfg(test)]
mod tests;

pub use app::MapApp;
pub use domain::filters::{by_categories, by_start_date, filter, visible, FilterState};
pub use domain::geo::{LatLng, ViewState};
pub use domain::listing::{Listing, NewListing, Owner};
pub use geocode::{GeocodeLookup, GeocodeSuggestion};
pub use map::controller::MapController;
pub use map::markers::MarkerSynchronizer;
pub use map::surface::{MapSurface, MarkerId, MarkerInput, MarkerSpec};
pub use store::ListingStore;
