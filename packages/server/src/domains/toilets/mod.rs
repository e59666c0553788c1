//! Seoul public toilet registry: normalize, paginate, aggregate, cache.

pub mod aggregator;
pub mod cache;
pub mod errors;
pub mod models;
pub mod normalizer;
pub mod paginator;
pub mod service;

pub use aggregator::{aggregate, AggregateResult, AggregateStats, Aggregator};
pub use cache::{CacheEntry, CacheError, RefreshCache, Snapshot};
pub use errors::{UpstreamError, UpstreamResult};
pub use models::{Page, RawBody, RawRow, Toilet};
pub use normalizer::normalize;
pub use paginator::{collect_all, PageWalker, PaginationConfig};
pub use service::{AggregationConfig, ToiletService, ToiletSnapshot};
