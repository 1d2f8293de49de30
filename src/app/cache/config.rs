//! Cache configuration types and defaults

use std::time::Duration;

use serde::{Deserialize, Serialize};

use crate::constants::cache;

/// Configuration for the bucket cache
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// Time a populated bucket stays valid, counted from storage
    #[serde(with = "humantime_serde")]
    pub ttl: Duration,
    /// Interval between sweeps of expired entries
    #[serde(with = "humantime_serde")]
    pub cleanup_interval: Duration,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl: cache::DEFAULT_TTL,
            cleanup_interval: cache::DEFAULT_CLEANUP_INTERVAL,
        }
    }
}

impl CacheConfig {
    /// Set the bucket time-to-live
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Set the sweep interval
    pub fn with_cleanup_interval(mut self, interval: Duration) -> Self {
        self.cleanup_interval = interval;
        self
    }
}
