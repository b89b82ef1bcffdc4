use crate::domain::geo::LatLng;

/// Identity of one marker, unique within its surface.
pub type MarkerId = u64;

/// What the synchronizer asks the surface to draw for one listing.
#[derive(Debug, Clone, PartialEq)]
pub struct MarkerSpec {
    pub listing_id: String,
    pub point: LatLng,
}

/// Marker interactions, as delivered by the embedder's event plumbing.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum MarkerInput {
    HoverEnter,
    HoverLeave,
    Click,
}

/// The rendering surface, bound to its container by the embedder.
/// Everything visual lives behind this seam; the crate tracks only
/// lifecycle and marker identity.
pub trait MapSurface {
    fn add_tile_layer(&mut self, url_template: &str, max_zoom: u8);

    fn set_view(&mut self, center: LatLng, zoom: u8);

    fn add_marker(&mut self, spec: &MarkerSpec) -> MarkerId;

    fn remove_marker(&mut self, id: MarkerId);

    /// Container-relative pixel position of a point, used to anchor the
    /// hover card next to its marker.
    fn project(&self, point: LatLng) -> (f32, f32);

    /// Release everything the surface holds (layers, listeners).
    fn destroy(&mut self);
}
