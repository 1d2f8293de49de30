//! Cache population from the upstream catalog
//!
//! One population pass fetches the whole catalog, runs both channels' rules
//! over every listing and stores both buckets. Concurrent cache misses join
//! the pass already in flight instead of starting their own upstream fetch,
//! and every waiter receives the same outcome.

use std::sync::{Arc, Mutex, PoisonError};

use futures::future::{BoxFuture, FutureExt, Shared};
use tracing::{debug, info, warn};

use crate::app::client::ListingSource;
use crate::app::clock::Clock;
use crate::app::models::{Channel, ChannelBucket, ChannelBuckets, Listing, RawListing};
use crate::app::rules::{EligibilityRules, Rejection};
use crate::errors::UpstreamResult;

use super::store::TtlCache;

/// Store of channel buckets
pub type BucketCache = TtlCache<Channel, ChannelBucket>;

type Flight = Shared<BoxFuture<'static, UpstreamResult<ChannelBuckets>>>;

/// Counts from one population pass
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct PopulationReport {
    /// Listings received from the upstream
    pub received: usize,
    /// Dropped because the price could not be parsed
    pub unparseable_price: usize,
    /// Dropped because the location is (0, 0)
    pub missing_location: usize,
    /// Listings in the zap bucket
    pub zap: usize,
    /// Listings in the vivareal bucket
    pub vivareal: usize,
}

/// Split a raw catalog into the two channel buckets
///
/// Single pass; each channel receives its own copy of a listing so that a
/// price adjustment made for one channel never shows up in the other.
pub fn partition(
    rules: &EligibilityRules,
    raw: Vec<RawListing>,
    clock: &dyn Clock,
) -> (ChannelBuckets, PopulationReport) {
    let mut report = PopulationReport {
        received: raw.len(),
        ..Default::default()
    };
    let mut zap = Vec::new();
    let mut vivareal = Vec::new();

    for record in raw {
        let Some(listing) = Listing::from_raw(record) else {
            report.unparseable_price += 1;
            continue;
        };
        if let Err(rejection) = rules.precheck(&listing) {
            if rejection == Rejection::MissingLocation {
                report.missing_location += 1;
            }
            continue;
        }

        if let Ok(copy) = rules.apply(Channel::Zap, &listing, clock) {
            zap.push(copy);
        }
        if let Ok(copy) = rules.apply(Channel::VivaReal, &listing, clock) {
            vivareal.push(copy);
        }
    }

    report.zap = zap.len();
    report.vivareal = vivareal.len();

    let buckets = ChannelBuckets {
        zap: Arc::new(ChannelBucket::new(Channel::Zap, zap)),
        vivareal: Arc::new(ChannelBucket::new(Channel::VivaReal, vivareal)),
    };
    (buckets, report)
}

/// Fills the bucket cache from the upstream, one pass at a time
pub struct CachePopulator {
    source: Arc<dyn ListingSource>,
    cache: Arc<BucketCache>,
    rules: EligibilityRules,
    clock: Arc<dyn Clock>,
    inflight: Mutex<Option<Flight>>,
}

impl CachePopulator {
    pub fn new(
        source: Arc<dyn ListingSource>,
        cache: Arc<BucketCache>,
        rules: EligibilityRules,
        clock: Arc<dyn Clock>,
    ) -> Self {
        Self {
            source,
            cache,
            rules,
            clock,
            inflight: Mutex::new(None),
        }
    }

    /// The cache this populator writes to
    pub fn cache(&self) -> &Arc<BucketCache> {
        &self.cache
    }

    /// Return the channel's cached bucket, populating the cache if needed
    pub async fn bucket_for(&self, channel: Channel) -> UpstreamResult<Arc<ChannelBucket>> {
        let buckets = self.populate().await?;
        Ok(Arc::clone(buckets.get(channel)))
    }

    /// Produce both buckets and store them in the cache
    ///
    /// Joins a pass that is already in flight, and returns the stored buckets
    /// without fetching when a pass finished since the caller's lookup.
    pub async fn populate(&self) -> UpstreamResult<ChannelBuckets> {
        let flight = {
            let mut slot = self.inflight.lock().unwrap_or_else(PoisonError::into_inner);
            if let Some(buckets) = self.stored_buckets() {
                return Ok(buckets);
            }
            self.join_or_start(&mut slot)
        };
        self.wait(flight).await
    }

    /// Both buckets, if both are still live
    fn stored_buckets(&self) -> Option<ChannelBuckets> {
        Some(ChannelBuckets {
            zap: self.cache.peek(&Channel::Zap)?,
            vivareal: self.cache.peek(&Channel::VivaReal)?,
        })
    }

    fn join_or_start(&self, slot: &mut Option<Flight>) -> Flight {
        if let Some(flight) = slot.as_ref() {
            debug!("Joining population already in flight");
            return flight.clone();
        }

        let flight = Self::run(
            Arc::clone(&self.source),
            Arc::clone(&self.cache),
            self.rules,
            Arc::clone(&self.clock),
        )
        .boxed()
        .shared();
        *slot = Some(flight.clone());
        flight
    }

    async fn wait(&self, flight: Flight) -> UpstreamResult<ChannelBuckets> {
        let outcome = flight.clone().await;

        let mut slot = self.inflight.lock().unwrap_or_else(PoisonError::into_inner);
        if slot.as_ref().is_some_and(|current| current.ptr_eq(&flight)) {
            *slot = None;
        }
        outcome
    }

    async fn run(
        source: Arc<dyn ListingSource>,
        cache: Arc<BucketCache>,
        rules: EligibilityRules,
        clock: Arc<dyn Clock>,
    ) -> UpstreamResult<ChannelBuckets> {
        info!("Requesting listings from {}", source.describe());
        let raw = source.fetch_listings().await.map_err(|e| {
            warn!("Upstream fetch failed: {}", e);
            e
        })?;

        let (buckets, report) = partition(&rules, raw, clock.as_ref());
        cache.insert(Channel::Zap, Arc::clone(&buckets.zap));
        cache.insert(Channel::VivaReal, Arc::clone(&buckets.vivareal));

        info!(
            received = report.received,
            zap = report.zap,
            vivareal = report.vivareal,
            "Populated listing cache"
        );
        debug!(
            unparseable_price = report.unparseable_price,
            missing_location = report.missing_location,
            "Listings dropped during population"
        );
        Ok(buckets)
    }
}

impl std::fmt::Debug for CachePopulator {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CachePopulator")
            .field("source", &self.source.describe())
            .field("ttl", &self.cache.ttl())
            .finish_non_exhaustive()
    }
}
