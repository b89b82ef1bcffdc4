use serde::{Deserialize, Serialize};

/// WGS84 point, decimal degrees.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct LatLng {
    pub lat: f64,
    pub lng: f64,
}

impl LatLng {
    pub fn new(lat: f64, lng: f64) -> Self {
        Self { lat, lng }
    }

    /// Both components finite and inside the WGS84 envelope.
    pub fn is_valid(&self) -> bool {
        self.lat.is_finite()
            && self.lng.is_finite()
            && (-90.0..=90.0).contains(&self.lat)
            && (-180.0..=180.0).contains(&self.lng)
    }
}

/// Continental center shown until a saved view exists.
pub const DEFAULT_CENTER: LatLng = LatLng {
    lat: 46.603354,
    lng: 1.888334,
};
pub const DEFAULT_ZOOM: u8 = 6;

/// Zoom applied when jumping to a searched city.
pub const CITY_ZOOM: u8 = 12;

pub const MIN_ZOOM: u8 = 5;
pub const MAX_ZOOM: u8 = 18;

/// Base tile layer template; exactly one base layer per surface.
pub const TILE_URL: &str = "https://{s}.basemaps.cartocdn.com/light_all/{z}/{x}/{y}{r}.png";
pub const TILE_MAX_ZOOM: u8 = 20;

/// Map camera: where the surface is looking and how close.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct ViewState {
    pub center: LatLng,
    pub zoom: u8,
}

impl ViewState {
    pub fn new(center: LatLng, zoom: u8) -> Self {
        Self {
            center,
            zoom: zoom.clamp(MIN_ZOOM, MAX_ZOOM),
        }
    }
}

impl Default for ViewState {
    fn default() -> Self {
        Self {
            center: DEFAULT_CENTER,
            zoom: DEFAULT_ZOOM,
        }
    }
}
