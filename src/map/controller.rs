use tracing::warn;

use crate::domain::geo::{LatLng, ViewState, MAX_ZOOM, MIN_ZOOM, TILE_MAX_ZOOM, TILE_URL};
use crate::map::surface::MapSurface;

enum Lifecycle<S> {
    Uninitialized,
    Mounted(S),
    Unmounted,
}

/// Owns the surface lifecycle: mounted exactly once, torn down exactly
/// once, view changes accepted only in between. Operating outside the
/// mounted window is a usage error: logged, then ignored.
pub struct MapController<S: MapSurface> {
    lifecycle: Lifecycle<S>,
}

impl<S: MapSurface> MapController<S> {
    pub fn new() -> Self {
        Self {
            lifecycle: Lifecycle::Uninitialized,
        }
    }

    pub fn is_mounted(&self) -> bool {
        matches!(self.lifecycle, Lifecycle::Mounted(_))
    }

    /// One-time initialization: the single base tile layer, then the
    /// starting view.
    pub fn mount(&mut self, mut surface: S, view: &ViewState) {
        match self.lifecycle {
            Lifecycle::Uninitialized => {
                surface.add_tile_layer(TILE_URL, TILE_MAX_ZOOM);
                surface.set_view(view.center, view.zoom);
                self.lifecycle = Lifecycle::Mounted(surface);
            }
            Lifecycle::Mounted(_) => warn!("mount called on an already-mounted controller"),
            Lifecycle::Unmounted => warn!("mount called after unmount"),
        }
    }

    /// Re-center and re-zoom without recreating the surface.
    pub fn set_view(&mut self, center: LatLng, zoom: u8) {
        match &mut self.lifecycle {
            Lifecycle::Mounted(surface) => surface.set_view(center, zoom.clamp(MIN_ZOOM, MAX_ZOOM)),
            _ => warn!("set_view outside the mounted lifecycle"),
        }
    }

    /// The live surface, for marker work. `None` outside the mounted
    /// window.
    pub fn surface_mut(&mut self) -> Option<&mut S> {
        match &mut self.lifecycle {
            Lifecycle::Mounted(surface) => Some(surface),
            _ => None,
        }
    }

    /// Terminal teardown. Releases every surface resource.
    pub fn unmount(&mut self) {
        match std::mem::replace(&mut self.lifecycle, Lifecycle::Unmounted) {
            Lifecycle::Mounted(mut surface) => surface.destroy(),
            Lifecycle::Uninitialized => {
                warn!("unmount called before mount");
                self.lifecycle = Lifecycle::Uninitialized;
            }
            Lifecycle::Unmounted => warn!("unmount called twice"),
        }
    }
}

impl<S: MapSurface> Default for MapController<S> {
    fn default() -> Self {
        Self::new()
    }
}

impl<S: MapSurface> Drop for MapController<S> {
    /// Abnormal teardown still releases the surface.
    fn drop(&mut self) {
        if let Lifecycle::Mounted(surface) = &mut self.lifecycle {
            surface.destroy();
        }
    }
}
