// Server dependencies and infrastructure adapters
//
// Adapters wrap concrete clients so they satisfy the kernel traits; ServerDeps
// bundles the trait objects handed to the domain layer.

use std::sync::Arc;

use async_trait::async_trait;
use seoul_openapi::{OpenApiError, PageRange, SeoulOpenApiClient};

use super::BasePageSource;
use crate::domains::toilets::errors::{UpstreamError, UpstreamResult};
use crate::domains::toilets::models::{Page, RawBody};

// =============================================================================
// Seoul Open API adapter
// =============================================================================

/// Wrapper to implement BasePageSource for SeoulOpenApiClient
pub struct SeoulOpenApiAdapter(pub Arc<SeoulOpenApiClient>);

impl SeoulOpenApiAdapter {
    pub fn new(client: Arc<SeoulOpenApiClient>) -> Self {
        Self(client)
    }
}

impl From<OpenApiError> for UpstreamError {
    fn from(err: OpenApiError) -> Self {
        if err.is_malformed() {
            UpstreamError::Malformed(err.to_string())
        } else {
            UpstreamError::Unavailable(err.to_string())
        }
    }
}

fn range(start: u32, end: u32) -> UpstreamResult<PageRange> {
    // The paginator and the proxy route only build valid windows, so this
    // branch means a local bug, not an outage. Nothing is sent upstream.
    PageRange::new(start, end).map_err(|e| {
        tracing::error!(start, end, "Invalid page window requested");
        UpstreamError::Unavailable(e.to_string())
    })
}

#[async_trait]
impl BasePageSource for SeoulOpenApiAdapter {
    async fn fetch_page(&self, start: u32, end: u32) -> UpstreamResult<Page> {
        let response = self.0.fetch_page(range(start, end)?).await?;

        Ok(Page {
            start: response.range.start,
            end: response.range.end,
            total_count: response.total_count,
            rows: response.rows,
        })
    }

    async fn fetch_raw(&self, start: u32, end: u32) -> UpstreamResult<RawBody> {
        let response = self.0.fetch_raw(range(start, end)?).await?;

        Ok(RawBody {
            content_type: response.content_type,
            body: response.body,
        })
    }
}

// =============================================================================
// ServerDeps
// =============================================================================

/// Server dependencies accessible to the domain layer (using traits for testability)
#[derive(Clone)]
pub struct ServerDeps {
    pub page_source: Arc<dyn BasePageSource>,
}

impl ServerDeps {
    pub fn new(page_source: Arc<dyn BasePageSource>) -> Self {
        Self { page_source }
    }

    /// Dependencies backed by the live Seoul Open API.
    pub fn seoul(client: SeoulOpenApiClient) -> Self {
        Self::new(Arc::new(SeoulOpenApiAdapter::new(Arc::new(client))))
    }
}
