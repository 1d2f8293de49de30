//! Upstream listing catalog access
//!
//! The cache only needs "give me the whole catalog"; [`ListingSource`] is that
//! seam. The module is organized into:
//! - `config`: HTTP client configuration and building
//! - `http`: the catalog fetched over HTTP
//! - `memory`: a fixed in-memory catalog

use async_trait::async_trait;

use crate::app::models::RawListing;
use crate::errors::UpstreamResult;

pub mod config;
pub mod http;
pub mod memory;

pub use config::ClientConfig;
pub use http::HttpListingSource;
pub use memory::StaticListingSource;

/// Provider of the raw listing catalog
#[async_trait]
pub trait ListingSource: Send + Sync {
    /// Fetch the entire catalog
    async fn fetch_listings(&self) -> UpstreamResult<Vec<RawListing>>;

    /// Human-readable origin, for logs
    fn describe(&self) -> String;
}
