//! Pagination of channel buckets
//!
//! `offset` is a page index: page `offset` of size `limit` starts at
//! `offset * limit`. A page past the end of the bucket is empty but still
//! reports the bucket's total count.

use serde::Deserialize;

use crate::app::models::{ChannelBucket, PageResult};
use crate::constants::pagination;

/// Raw pagination query parameters
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PageQuery {
    pub offset: Option<String>,
    pub limit: Option<String>,
}

/// Validated pagination parameters
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRequest {
    pub offset: usize,
    pub limit: usize,
}

impl Default for PageRequest {
    fn default() -> Self {
        Self {
            offset: pagination::DEFAULT_OFFSET,
            limit: pagination::DEFAULT_LIMIT,
        }
    }
}

impl PageRequest {
    pub fn new(offset: usize, limit: usize) -> Self {
        Self { offset, limit }
    }

    /// Missing, unparseable or negative values fall back to the defaults
    pub fn from_query(query: &PageQuery) -> Self {
        Self {
            offset: parse_param(query.offset.as_deref()).unwrap_or(pagination::DEFAULT_OFFSET),
            limit: parse_param(query.limit.as_deref()).unwrap_or(pagination::DEFAULT_LIMIT),
        }
    }
}

impl From<PageQuery> for PageRequest {
    fn from(query: PageQuery) -> Self {
        Self::from_query(&query)
    }
}

fn parse_param(value: Option<&str>) -> Option<usize> {
    let value = value?.trim();
    value
        .strip_prefix('+')
        .unwrap_or(value)
        .parse::<usize>()
        .ok()
}

/// Cut one page out of a bucket
pub fn paginate(bucket: &ChannelBucket, request: PageRequest) -> PageResult {
    let total = bucket.len();
    let start = request.offset.saturating_mul(request.limit);

    if start >= total {
        tracing::debug!(
            "Page {} of size {} starts past the end of {} listings",
            request.offset,
            request.limit,
            total
        );
        return PageResult {
            listings: Vec::new(),
            page_number: request.offset,
            page_size: 0,
            total_count: total,
        };
    }

    let end = start.saturating_add(request.limit).min(total);
    let listings = bucket.listings[start..end].to_vec();

    PageResult {
        page_size: listings.len(),
        listings,
        page_number: request.offset,
        total_count: total,
    }
}
