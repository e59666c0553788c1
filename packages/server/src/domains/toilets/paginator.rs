//! Walks the registry one fixed-width window at a time.
//!
//! The walk stops after the first page that is empty or short, or once the
//! configured page bound is reached. Pages are fetched strictly one after
//! another with a fixed pause between them (never before the first). Any
//! fetch error ends the walk and nothing collected so far is returned.

use std::time::Duration;

use super::errors::UpstreamResult;
use super::models::Toilet;
use super::normalizer::normalize;
use crate::kernel::BasePageSource;

/// Pause between page requests unless configured otherwise.
pub const DEFAULT_PAGE_DELAY: Duration = Duration::from_millis(120);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PaginationConfig {
    /// Rows requested per page; a page with fewer rows is the last one.
    pub page_size: u32,
    /// Hard stop for an upstream that never signals the end.
    pub max_pages: u32,
    /// Pause between consecutive page requests.
    pub page_delay: Duration,
}

impl Default for PaginationConfig {
    fn default() -> Self {
        Self {
            page_size: 1000,
            max_pages: 20,
            page_delay: DEFAULT_PAGE_DELAY,
        }
    }
}

/// Lazy, finite, single-use walk over the registry.
///
/// Each call to [`PageWalker::next_batch`] fetches at most one page and
/// returns its rows normalized. A new walker starts again from index 1.
pub struct PageWalker<'a> {
    source: &'a dyn BasePageSource,
    config: PaginationConfig,
    next_start: u32,
    pages_fetched: u32,
    finished: bool,
}

impl<'a> PageWalker<'a> {
    pub fn new(source: &'a dyn BasePageSource, config: PaginationConfig) -> Self {
        Self {
            source,
            config: PaginationConfig {
                page_size: config.page_size.max(1),
                max_pages: config.max_pages.max(1),
                ..config
            },
            next_start: 1,
            pages_fetched: 0,
            finished: false,
        }
    }

    pub fn pages_fetched(&self) -> u32 {
        self.pages_fetched
    }

    pub fn is_finished(&self) -> bool {
        self.finished
    }

    /// Fetch and normalize the next page. `Ok(None)` once the walk is over.
    pub async fn next_batch(&mut self) -> UpstreamResult<Option<Vec<Toilet>>> {
        if self.finished {
            return Ok(None);
        }

        if self.pages_fetched > 0 && !self.config.page_delay.is_zero() {
            tokio::time::sleep(self.config.page_delay).await;
        }

        let page_size = self.config.page_size;
        let start = self.next_start;
        let end = start.saturating_add(page_size - 1);

        let page = match self.source.fetch_page(start, end).await {
            Ok(page) => page,
            Err(e) => {
                self.finished = true;
                tracing::warn!(start, end, error = %e, "Page fetch failed, aborting walk");
                return Err(e);
            }
        };
        self.pages_fetched += 1;

        let rows = page.len();
        tracing::debug!(
            start,
            end,
            rows,
            total = ?page.total_count,
            "Fetched registry page"
        );

        if rows == 0 {
            self.finished = true;
            return Ok(None);
        }

        if rows < page_size as usize {
            self.finished = true;
        } else if self.pages_fetched >= self.config.max_pages {
            tracing::warn!(
                max_pages = self.config.max_pages,
                page_size,
                "Page bound reached before the registry reported its end"
            );
            self.finished = true;
        }

        match start.checked_add(page_size) {
            Some(next) => self.next_start = next,
            None => self.finished = true,
        }

        Ok(Some(page.rows.iter().map(normalize).collect()))
    }
}

/// Walk every page and return all normalized records in fetch order.
pub async fn collect_all(
    source: &dyn BasePageSource,
    config: PaginationConfig,
) -> UpstreamResult<Vec<Toilet>> {
    let mut walker = PageWalker::new(source, config);
    let mut toilets = Vec::new();

    while let Some(batch) = walker.next_batch().await? {
        toilets.extend(batch);
    }

    tracing::info!(
        pages = walker.pages_fetched(),
        records = toilets.len(),
        "Registry walk complete"
    );
    Ok(toilets)
}
