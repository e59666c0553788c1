// Trait definitions for dependency injection
//
// These are INFRASTRUCTURE traits only - no business logic.
// Pagination, normalization and caching live in the toilets domain and talk to
// the upstream only through these traits.
//
// Naming convention: Base* for trait names (e.g., BasePageSource)

use async_trait::async_trait;

use crate::domains::toilets::errors::UpstreamResult;
use crate::domains::toilets::models::{Page, RawBody};

// =============================================================================
// Page Source Trait (Infrastructure - bounded-range upstream reads)
// =============================================================================

#[async_trait]
pub trait BasePageSource: Send + Sync {
    /// Fetch the raw rows for the inclusive, 1-based window `start..=end`.
    ///
    /// Rows with unfamiliar fields are not an error; only an unreachable
    /// upstream or an unparseable body is.
    async fn fetch_page(&self, start: u32, end: u32) -> UpstreamResult<Page>;

    /// Fetch the same window without parsing (pass-through proxy).
    async fn fetch_raw(&self, start: u32, end: u32) -> UpstreamResult<RawBody>;
}
