// TestDependencies - mock implementations for testing
//
// Provides a scripted page source that can be injected into ServerDeps for
// tests, plus row builders shaped like real registry rows.

use async_trait::async_trait;
use std::collections::VecDeque;
use std::sync::{Arc, Mutex};
use std::time::Duration;

use super::{BasePageSource, ServerDeps};
use crate::domains::toilets::errors::{UpstreamError, UpstreamResult};
use crate::domains::toilets::models::{Page, RawBody, RawRow};

// =============================================================================
// Row builders
// =============================================================================

/// A complete row in the primary upstream schema.
pub fn toilet_row(id: &str) -> RawRow {
    [
        ("OBJECTID", id.to_string()),
        ("CONTS_NAME", format!("공중화장실 {id}")),
        ("ADDR_NEW", format!("서울특별시 중구 세종대로 {id}")),
        ("COORD_Y", "37.5663".to_string()),
        ("COORD_X", "126.9779".to_string()),
        ("GU_NAME", "중구".to_string()),
    ]
    .into_iter()
    .map(|(k, v)| (k.to_string(), v))
    .collect()
}

/// `count` complete rows with consecutive ids starting at `first_id`.
pub fn toilet_rows(first_id: u32, count: u32) -> Vec<RawRow> {
    (first_id..first_id + count)
        .map(|id| toilet_row(&id.to_string()))
        .collect()
}

// =============================================================================
// Mock Page Source
// =============================================================================

/// Scripted upstream. Each `fetch_page` call consumes the next queued
/// response; once the script runs out every page is empty.
#[derive(Clone, Default)]
pub struct MockPageSource {
    pages: Arc<Mutex<VecDeque<UpstreamResult<Vec<RawRow>>>>>,
    raw_responses: Arc<Mutex<VecDeque<UpstreamResult<RawBody>>>>,
    page_calls: Arc<Mutex<Vec<(u32, u32)>>>,
    raw_calls: Arc<Mutex<Vec<(u32, u32)>>>,
    latency: Duration,
}

impl MockPageSource {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue a page containing these rows
    pub fn with_page(self, rows: Vec<RawRow>) -> Self {
        self.pages.lock().unwrap().push_back(Ok(rows));
        self
    }

    /// Queue pages of complete rows with the given sizes, ids numbered across pages
    pub fn with_page_sizes(self, sizes: &[u32]) -> Self {
        let mut next_id = 1;
        let mut pages = self.pages.lock().unwrap();
        for &size in sizes {
            pages.push_back(Ok(toilet_rows(next_id, size)));
            next_id += size;
        }
        drop(pages);
        self
    }

    /// Queue a failing page fetch
    pub fn with_error(self, error: UpstreamError) -> Self {
        self.pages.lock().unwrap().push_back(Err(error));
        self
    }

    /// Queue a pass-through response
    pub fn with_raw(self, content_type: Option<&str>, body: &str) -> Self {
        self.raw_responses.lock().unwrap().push_back(Ok(RawBody {
            content_type: content_type.map(str::to_string),
            body: bytes::Bytes::from(body.to_string()),
        }));
        self
    }

    /// Queue a failing pass-through fetch
    pub fn with_raw_error(self, error: UpstreamError) -> Self {
        self.raw_responses.lock().unwrap().push_back(Err(error));
        self
    }

    /// Simulated per-request latency
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    /// Wrap this source in ServerDeps
    pub fn into_deps(self) -> ServerDeps {
        ServerDeps::new(Arc::new(self))
    }

    /// All (start, end) windows requested through fetch_page
    pub fn page_calls(&self) -> Vec<(u32, u32)> {
        self.page_calls.lock().unwrap().clone()
    }

    pub fn page_call_count(&self) -> usize {
        self.page_calls.lock().unwrap().len()
    }

    /// All (start, end) windows requested through fetch_raw
    pub fn raw_calls(&self) -> Vec<(u32, u32)> {
        self.raw_calls.lock().unwrap().clone()
    }
}

#[async_trait]
impl BasePageSource for MockPageSource {
    async fn fetch_page(&self, start: u32, end: u32) -> UpstreamResult<Page> {
        self.page_calls.lock().unwrap().push((start, end));

        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }

        let next = self.pages.lock().unwrap().pop_front();
        let rows = next.unwrap_or_else(|| Ok(Vec::new()))?;
        Ok(Page::new(start, end, rows))
    }

    async fn fetch_raw(&self, start: u32, end: u32) -> UpstreamResult<RawBody> {
        self.raw_calls.lock().unwrap().push((start, end));

        let next = self.raw_responses.lock().unwrap().pop_front();
        next.unwrap_or_else(|| {
            Ok(RawBody {
                content_type: Some("application/xml; charset=utf-8".to_string()),
                body: bytes::Bytes::from_static(b"<RESULT><CODE>INFO-200</CODE></RESULT>"),
            })
        })
    }
}
