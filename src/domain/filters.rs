// src/domain/filters.rs

use std::collections::BTreeSet;

use chrono::{NaiveDate, NaiveDateTime};

use crate::domain::listing::Listing;

/// What the user currently has selected. Never persisted; a fresh session
/// starts unfiltered.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FilterState {
    categories: BTreeSet<String>,
    date_threshold: Option<NaiveDate>,
}

impl FilterState {
    pub fn new() -> Self {
        Self::default()
    }

    /// Select the tag if unselected, deselect it otherwise.
    pub fn toggle_category(&mut self, tag: &str) {
        if !self.categories.remove(tag) {
            self.categories.insert(tag.to_string());
        }
    }

    pub fn clear_categories(&mut self) {
        self.categories.clear();
    }

    pub fn selected_categories(&self) -> &BTreeSet<String> {
        &self.categories
    }

    pub fn set_date_threshold(&mut self, day: NaiveDate) {
        self.date_threshold = Some(day);
    }

    /// Timestamped variant: filtering is calendar-day granular, so the
    /// time-of-day component is dropped.
    pub fn set_date_threshold_at(&mut self, at: NaiveDateTime) {
        self.date_threshold = Some(at.date());
    }

    pub fn clear_date_threshold(&mut self) {
        self.date_threshold = None;
    }

    pub fn date_threshold(&self) -> Option<NaiveDate> {
        self.date_threshold
    }
}

/// Listings whose tag set intersects the selection (OR semantics).
/// An empty selection selects everything. Input order is preserved.
pub fn by_categories(listings: &[Listing], selected: &BTreeSet<String>) -> Vec<Listing> {
    if selected.is_empty() {
        return listings.to_vec();
    }
    listings
        .iter()
        .filter(|l| l.categories.iter().any(|c| selected.contains(c)))
        .cloned()
        .collect()
}

/// Listings starting on or after the threshold day. No threshold selects
/// everything; a listing without a start date cannot satisfy one.
pub fn by_start_date(listings: &[Listing], threshold: Option<NaiveDate>) -> Vec<Listing> {
    let Some(day) = threshold else {
        return listings.to_vec();
    };
    listings
        .iter()
        .filter(|l| l.start_date.is_some_and(|start| start >= day))
        .cloned()
        .collect()
}

/// Both filters in one pass. They select over disjoint fields, so the
/// order of application does not matter.
pub fn filter(
    listings: &[Listing],
    selected: &BTreeSet<String>,
    threshold: Option<NaiveDate>,
) -> Vec<Listing> {
    by_start_date(&by_categories(listings, selected), threshold)
}

/// `filter` driven by a [`FilterState`].
pub fn visible(listings: &[Listing], filters: &FilterState) -> Vec<Listing> {
    filter(listings, &filters.categories, filters.date_threshold)
}
