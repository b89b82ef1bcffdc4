use std::sync::{Arc, Mutex};

use tracing::{debug, warn};

use crate::api::ListingsApi;
use crate::domain::listing::{Listing, NewListing};
use crate::errors::ApiError;

/// Holds the last successfully fetched listing collection.
///
/// Clones share the same collection, so one handle can serve reads while
/// another refreshes.
pub struct ListingStore<A> {
    api: Arc<A>,
    inner: Arc<Mutex<Inner>>,
}

struct Inner {
    listings: Vec<Listing>,
    issued: u64,
    applied: u64,
}

impl<A> Clone for ListingStore<A> {
    fn clone(&self) -> Self {
        Self {
            api: Arc::clone(&self.api),
            inner: Arc::clone(&self.inner),
        }
    }
}

impl<A: ListingsApi> ListingStore<A> {
    pub fn new(api: A) -> Self {
        Self {
            api: Arc::new(api),
            inner: Arc::new(Mutex::new(Inner {
                listings: Vec::new(),
                issued: 0,
                applied: 0,
            })),
        }
    }

    pub fn snapshot(&self) -> Vec<Listing> {
        self.inner.lock().unwrap().listings.clone()
    }

    pub fn len(&self) -> usize {
        self.inner.lock().unwrap().listings.len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Fetch the collection and replace the held one wholesale. Any
    /// failure is logged and leaves the previous collection untouched.
    ///
    /// Overlapping calls are allowed. Each call takes a ticket when it is
    /// issued, and a response only lands if nothing issued later has
    /// landed first: a slow early response can never overwrite a fast
    /// later one. Returns whether this call's response was applied.
    pub async fn refresh(&self) -> bool {
        let ticket = {
            let mut inner = self.inner.lock().unwrap();
            inner.issued += 1;
            inner.issued
        };

        match self.api.fetch_all().await {
            Ok(listings) => {
                let mut inner = self.inner.lock().unwrap();
                if ticket <= inner.applied {
                    debug!(ticket, "dropping refresh response superseded in flight");
                    return false;
                }
                debug!(count = listings.len(), "listing collection replaced");
                inner.applied = ticket;
                inner.listings = listings;
                true
            }
            Err(e) => {
                warn!("listing refresh failed, keeping previous collection: {e}");
                false
            }
        }
    }

    /// Optimistic local insert, for a record the backend just confirmed.
    pub fn append(&self, listing: Listing) {
        self.inner.lock().unwrap().listings.push(listing);
    }

    /// Drop the held collection (surface teardown).
    pub fn clear(&self) {
        self.inner.lock().unwrap().listings.clear();
    }

    /// POST a new listing and append the created record without waiting
    /// for the next refresh.
    pub async fn create(&self, draft: &NewListing) -> Result<Listing, ApiError> {
        let created = self.api.create(draft).await?;
        self.append(created.clone());
        Ok(created)
    }
}
