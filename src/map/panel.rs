use std::sync::{Arc, Mutex};
use std::time::Duration;

use crate::domain::listing::Listing;
use crate::tasks::Debounce;

/// How long a hover card lingers after the pointer leaves its marker.
/// Skimming across a marker edge within this window doesn't flicker.
pub const HIDE_DELAY: Duration = Duration::from_millis(100);

/// The transient card shown next to a hovered marker.
#[derive(Debug, Clone, PartialEq)]
pub struct HoverCard {
    pub listing: Listing,
    /// Container-relative pixel anchor.
    pub anchor: (f32, f32),
}

/// Listing detail state: a transient hover card and a persistent
/// click-selection.
pub struct DetailPanel {
    hovered: Arc<Mutex<Option<HoverCard>>>,
    selected: Mutex<Option<Listing>>,
    hide_timer: Debounce,
}

impl DetailPanel {
    pub fn new() -> Self {
        Self {
            hovered: Arc::new(Mutex::new(None)),
            selected: Mutex::new(None),
            hide_timer: Debounce::new(),
        }
    }

    pub fn hovered(&self) -> Option<HoverCard> {
        self.hovered.lock().unwrap().clone()
    }

    pub fn selected(&self) -> Option<Listing> {
        self.selected.lock().unwrap().clone()
    }

    /// Pointer entered a marker: show its card and call off any pending
    /// hide.
    pub fn show(&self, listing: Listing, anchor: (f32, f32)) {
        self.hide_timer.cancel();
        *self.hovered.lock().unwrap() = Some(HoverCard { listing, anchor });
    }

    /// Pointer left the marker: hide the card once the linger window
    /// passes without a re-entry.
    pub fn schedule_hide(&self) {
        let hovered = Arc::clone(&self.hovered);
        self.hide_timer.schedule(HIDE_DELAY, async move {
            hovered.lock().unwrap().take();
        });
    }

    /// Click: the persistent detail view.
    pub fn select(&self, listing: Listing) {
        *self.selected.lock().unwrap() = Some(listing);
    }

    pub fn clear_selection(&self) {
        self.selected.lock().unwrap().take();
    }

    /// Drop all panel state, e.g. on surface teardown.
    pub fn reset(&self) {
        self.hide_timer.cancel();
        self.hovered.lock().unwrap().take();
        self.selected.lock().unwrap().take();
    }
}

impl Default for DetailPanel {
    fn default() -> Self {
        Self::new()
    }
}
