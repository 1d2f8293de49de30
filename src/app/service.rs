//! Request handling core
//!
//! Resolves the requested channel, obtains its bucket from the cache (or
//! populates it) and cuts out the requested page. Transport concerns live in
//! [`crate::server`].

use std::collections::BTreeSet;
use std::sync::Arc;

use tracing::debug;

use crate::app::cache::{BucketCache, CachePopulator, CacheStats};
use crate::app::models::{Channel, ChannelBucket, PageResult};
use crate::app::paginator::{paginate, PageRequest};
use crate::errors::{ServiceError, ServiceResult};

/// Serves paginated channel listings out of the bucket cache
#[derive(Debug)]
pub struct ListingService {
    datasources: BTreeSet<Channel>,
    populator: Arc<CachePopulator>,
}

impl ListingService {
    /// Service accepting every known channel
    pub fn new(populator: Arc<CachePopulator>) -> Self {
        Self::with_datasources(populator, Channel::ALL)
    }

    /// Service accepting only the given channels
    pub fn with_datasources(
        populator: Arc<CachePopulator>,
        datasources: impl IntoIterator<Item = Channel>,
    ) -> Self {
        Self {
            datasources: datasources.into_iter().collect(),
            populator,
        }
    }

    pub fn datasources(&self) -> impl Iterator<Item = Channel> + '_ {
        self.datasources.iter().copied()
    }

    pub fn cache(&self) -> &Arc<BucketCache> {
        self.populator.cache()
    }

    pub fn cache_stats(&self) -> CacheStats {
        self.cache().stats()
    }

    /// Map the `source` header onto a configured channel
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::InvalidChannel` for a missing, empty or unknown
    /// source, or one that is not configured.
    pub fn resolve_channel(&self, source: Option<&str>) -> ServiceResult<Channel> {
        let requested = source.unwrap_or_default();
        Channel::from_header(requested)
            .filter(|channel| self.datasources.contains(channel))
            .ok_or_else(|| ServiceError::InvalidChannel {
                requested: requested.to_string(),
            })
    }

    /// Cached bucket for a channel, populating the cache on a miss
    pub async fn bucket(&self, channel: Channel) -> ServiceResult<Arc<ChannelBucket>> {
        if let Some(bucket) = self.cache().get(&channel) {
            debug!("Cache hit for {}", channel);
            return Ok(bucket);
        }

        debug!("Cache miss for {}", channel);
        Ok(self.populator.bucket_for(channel).await?)
    }

    /// Answer one listings request
    ///
    /// # Errors
    ///
    /// Returns `ServiceError::InvalidChannel` when the source is not accepted
    /// and `ServiceError::Upstream` when population was needed and failed.
    pub async fn get_page(
        &self,
        source: Option<&str>,
        request: PageRequest,
    ) -> ServiceResult<PageResult> {
        let channel = self.resolve_channel(source)?;
        let bucket = self.bucket(channel).await?;
        let page = paginate(&bucket, request);

        debug!(
            "Serving page {} of {} ({} of {} listings)",
            page.page_number, channel, page.page_size, page.total_count
        );
        Ok(page)
    }
}
