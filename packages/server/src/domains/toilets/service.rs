//! Entry point used by the HTTP layer.
//!
//! Owns the single cache slot and wires a cache miss to a full walk of the
//! registry followed by aggregation.

use std::sync::Arc;
use std::time::Duration;

use super::aggregator::{aggregate, AggregateResult};
use super::cache::{CacheError, RefreshCache, Snapshot};
use super::errors::{UpstreamError, UpstreamResult};
use super::models::RawBody;
use super::paginator::{collect_all, PaginationConfig};
use crate::kernel::{BasePageSource, ServerDeps};

pub const DEFAULT_CACHE_TTL: Duration = Duration::from_secs(60 * 60);

/// Immutable after startup.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct AggregationConfig {
    pub pagination: PaginationConfig,
    pub cache_ttl: Duration,
}

impl Default for AggregationConfig {
    fn default() -> Self {
        Self {
            pagination: PaginationConfig::default(),
            cache_ttl: DEFAULT_CACHE_TTL,
        }
    }
}

pub type ToiletSnapshot = Snapshot<AggregateResult>;

pub struct ToiletService {
    source: Arc<dyn BasePageSource>,
    config: AggregationConfig,
    cache: RefreshCache<AggregateResult, UpstreamError>,
}

impl ToiletService {
    pub fn new(deps: &ServerDeps, config: AggregationConfig) -> Self {
        Self {
            source: Arc::clone(&deps.page_source),
            config,
            cache: RefreshCache::new(),
        }
    }

    /// Every acceptable toilet in the registry, from cache when fresh.
    pub async fn all(&self) -> Result<ToiletSnapshot, CacheError<UpstreamError>> {
        let source = Arc::clone(&self.source);
        let pagination = self.config.pagination;

        self.cache
            .get(self.config.cache_ttl, move || async move {
                let started = std::time::Instant::now();
                let records = collect_all(source.as_ref(), pagination).await?;
                let result = aggregate(records);

                tracing::info!(
                    count = result.len(),
                    records_seen = result.stats.records_seen,
                    duplicates = result.stats.duplicates,
                    incomplete = result.stats.incomplete,
                    elapsed_ms = started.elapsed().as_millis() as u64,
                    "Registry aggregated"
                );
                Ok::<_, UpstreamError>(result)
            })
            .await
    }

    /// One untouched upstream page for `start..=end`.
    pub async fn raw_page(&self, start: u32, end: u32) -> UpstreamResult<RawBody> {
        self.source.fetch_raw(start, end).await
    }
}
