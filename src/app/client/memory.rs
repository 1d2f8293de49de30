//! In-memory listing source
//!
//! Serves a fixed catalog (or a fixed failure) and counts fetches. Used for
//! fixtures and for exercising the cache without a network.

use std::sync::atomic::{AtomicUsize, Ordering};
use std::time::Duration;

use async_trait::async_trait;

use crate::app::models::RawListing;
use crate::errors::{UpstreamError, UpstreamResult};

use super::ListingSource;

/// Listing source backed by a fixed catalog
#[derive(Debug)]
pub struct StaticListingSource {
    outcome: UpstreamResult<Vec<RawListing>>,
    delay: Option<Duration>,
    fetches: AtomicUsize,
}

impl StaticListingSource {
    /// Source that always returns the given catalog
    pub fn new(listings: Vec<RawListing>) -> Self {
        Self {
            outcome: Ok(listings),
            delay: None,
            fetches: AtomicUsize::new(0),
        }
    }

    /// Source that always fails with the given error
    pub fn failing(error: UpstreamError) -> Self {
        Self {
            outcome: Err(error),
            delay: None,
            fetches: AtomicUsize::new(0),
        }
    }

    /// Parse the catalog from a JSON array
    pub fn from_json(json: &str) -> UpstreamResult<Self> {
        let listings = serde_json::from_str(json).map_err(UpstreamError::decode)?;
        Ok(Self::new(listings))
    }

    /// Wait before answering, to simulate a slow upstream
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = Some(delay);
        self
    }

    /// Number of fetches served so far
    pub fn fetch_count(&self) -> usize {
        self.fetches.load(Ordering::SeqCst)
    }
}

#[async_trait]
impl ListingSource for StaticListingSource {
    async fn fetch_listings(&self) -> UpstreamResult<Vec<RawListing>> {
        self.fetches.fetch_add(1, Ordering::SeqCst);
        if let Some(delay) = self.delay {
            tokio::time::sleep(delay).await;
        }
        self.outcome.clone()
    }

    fn describe(&self) -> String {
        "in-memory catalog".to_string()
    }
}
