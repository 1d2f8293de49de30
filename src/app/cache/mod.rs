//! Channel bucket cache
//!
//! Buckets live in a typed in-memory store with an absolute time-to-live.
//! On a miss the populator fetches the upstream catalog once, filters it for
//! both channels and stores both buckets, so the sibling channel's next
//! request is served without another upstream call.
//!
//! # Module Organization
//!
//! - [`config`] - TTL and sweep interval
//! - [`store`] - generic TTL store and its background sweeper
//! - [`populator`] - single-flight population from the upstream
//! - [`stats`] - hit/miss counters
//!
//! # Examples
//!
//! ```rust,no_run
//! use std::sync::Arc;
//! use listing_proxy::app::cache::{BucketCache, CacheConfig, CachePopulator};
//! use listing_proxy::app::client::StaticListingSource;
//! use listing_proxy::app::clock::SystemClock;
//! use listing_proxy::app::models::Channel;
//! use listing_proxy::app::rules::EligibilityRules;
//!
//! # async fn example() -> Result<(), Box<dyn std::error::Error>> {
//! let config = CacheConfig::default();
//! let cache = Arc::new(BucketCache::new(config.ttl));
//! let source = Arc::new(StaticListingSource::from_json("[]")?);
//! let populator = CachePopulator::new(source, cache, EligibilityRules::default(), Arc::new(SystemClock));
//!
//! let bucket = populator.bucket_for(Channel::Zap).await?;
//! println!("{} zap listings", bucket.len());
//! # Ok(())
//! # }
//! ```

pub mod config;
pub mod populator;
pub mod stats;
pub mod store;

// Re-export main public API
pub use config::CacheConfig;
pub use populator::{partition, BucketCache, CachePopulator, PopulationReport};
pub use stats::CacheStats;
pub use store::TtlCache;
