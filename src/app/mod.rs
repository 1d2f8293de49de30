//! Core application logic for the listing proxy
//!
//! This module contains the upstream catalog client, data models, channel
//! eligibility rules, the bucket cache and the request-serving core.
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use listing_proxy::app::{
//!     BucketCache, CachePopulator, EligibilityRules, ListingService, PageRequest,
//!     StaticListingSource, SystemClock,
//! };
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let source = Arc::new(StaticListingSource::from_json("[]")?);
//! let cache = Arc::new(BucketCache::new(std::time::Duration::from_secs(600)));
//! let populator = CachePopulator::new(source, cache, EligibilityRules::default(), Arc::new(SystemClock));
//! let service = ListingService::new(Arc::new(populator));
//!
//! let page = service.get_page(Some("zap"), PageRequest::default()).await?;
//! println!("{} of {} listings", page.page_size, page.total_count);
//! # Ok(())
//! # }
//! ```

pub mod cache;
pub mod client;
pub mod clock;
pub mod geofence;
pub mod models;
pub mod paginator;
pub mod rules;
pub mod service;

// Re-export main public API
pub use cache::{BucketCache, CacheConfig, CachePopulator, CacheStats, TtlCache};
pub use client::{ClientConfig, HttpListingSource, ListingSource, StaticListingSource};
pub use clock::{Clock, SystemClock};
pub use geofence::{BoundingBox, GeoFence};
pub use models::{Channel, ChannelBucket, Listing, PageResult, RawListing};
pub use paginator::{paginate, PageQuery, PageRequest};
pub use rules::EligibilityRules;
pub use service::ListingService;
