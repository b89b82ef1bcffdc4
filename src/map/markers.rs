use std::collections::HashSet;

use tracing::{debug, warn};

use crate::domain::listing::Listing;
use crate::map::panel::DetailPanel;
use crate::map::surface::{MapSurface, MarkerId, MarkerInput, MarkerSpec};

/// Keeps a surface's markers equal to the currently visible listings.
///
/// Every pass is a full clear-then-recreate: additions, removals and
/// reorders all take the same path, and no marker outlives the pass that
/// replaced its set. Cheap enough at this collection size; an
/// incremental diff would buy churn efficiency, not correctness.
pub struct MarkerSynchronizer {
    owned: Vec<(MarkerId, Listing)>,
    panel: DetailPanel,
}

impl MarkerSynchronizer {
    pub fn new() -> Self {
        Self {
            owned: Vec::new(),
            panel: DetailPanel::new(),
        }
    }

    pub fn panel(&self) -> &DetailPanel {
        &self.panel
    }

    pub fn marker_count(&self) -> usize {
        self.owned.len()
    }

    /// Rebuild the marker set from the visible subset. Listings without
    /// a usable coordinate pair are skipped with a warning; they never
    /// fail the pass.
    pub fn sync<S: MapSurface>(&mut self, surface: &mut S, visible: &[Listing]) {
        for (id, _) in self.owned.drain(..) {
            surface.remove_marker(id);
        }

        for listing in visible {
            let Some(point) = listing.coordinate() else {
                warn!(listing = %listing.id, "no usable coordinate pair, not rendering");
                continue;
            };
            let id = surface.add_marker(&MarkerSpec {
                listing_id: listing.id.clone(),
                point,
            });
            self.owned.push((id, listing.clone()));
        }

        debug!(markers = self.owned.len(), "marker set rebuilt");
    }

    /// Route one marker interaction from the embedder's event plumbing.
    pub fn on_marker_input<S: MapSurface>(&self, surface: &S, id: MarkerId, input: MarkerInput) {
        let Some((_, listing)) = self.owned.iter().find(|(owned_id, _)| *owned_id == id) else {
            warn!(marker = id, "input for a marker this synchronizer does not own");
            return;
        };

        match input {
            MarkerInput::HoverEnter => {
                if let Some(point) = listing.coordinate() {
                    self.panel.show(listing.clone(), surface.project(point));
                }
            }
            MarkerInput::HoverLeave => self.panel.schedule_hide(),
            MarkerInput::Click => self.panel.select(listing.clone()),
        }
    }

    /// Remove every owned marker and reset the panel (surface teardown).
    pub fn clear<S: MapSurface>(&mut self, surface: &mut S) {
        for (id, _) in self.owned.drain(..) {
            surface.remove_marker(id);
        }
        self.panel.reset();
    }
}

impl Default for MarkerSynchronizer {
    fn default() -> Self {
        Self::new()
    }
}

/// Shallow set-of-ids comparison deciding whether a `sync` is due.
pub fn same_id_set(a: &[Listing], b: &[Listing]) -> bool {
    let ids = |listings: &[Listing]| {
        listings
            .iter()
            .map(|l| l.id.clone())
            .collect::<HashSet<String>>()
    };
    ids(a) == ids(b)
}
