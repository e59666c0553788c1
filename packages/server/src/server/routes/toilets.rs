use axum::{
    extract::{Extension, Query},
    http::{header, StatusCode},
    response::{IntoResponse, Response},
    Json,
};
use serde::{Deserialize, Serialize};

use crate::domains::toilets::Toilet;
use crate::server::app::AxumAppState;

const DEFAULT_XML_CONTENT_TYPE: &str = "application/xml; charset=utf-8";

#[derive(Debug, Default, Deserialize)]
pub struct RangeQuery {
    pub start: Option<String>,
    pub end: Option<String>,
}

impl RangeQuery {
    /// Lenient window resolution: a missing, unparseable or non-positive
    /// `start` becomes 1; a missing, unparseable or backwards `end` becomes
    /// one page past `start`.
    pub fn resolve(&self, page_size: u32) -> (u32, u32) {
        fn parse(value: Option<&str>) -> Option<u32> {
            value.and_then(|v| v.trim().parse::<u32>().ok())
        }

        let start = parse(self.start.as_deref())
            .filter(|&start| start > 0)
            .unwrap_or(1);
        let default_end = start.saturating_add(page_size.max(1) - 1);
        let end = parse(self.end.as_deref())
            .filter(|&end| end >= start)
            .unwrap_or(default_end);

        (start, end)
    }
}

#[derive(Serialize)]
pub struct AllToiletsResponse<'a> {
    pub cached: bool,
    pub count: usize,
    pub rows: &'a [Toilet],
}

#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub detail: String,
}

fn internal_error(error: &str, detail: impl ToString) -> Response {
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: error.to_string(),
            detail: detail.to_string(),
        }),
    )
        .into_response()
}

/// Pass-through: one raw upstream page with its original content type.
pub async fn toilets_page_handler(
    Extension(state): Extension<AxumAppState>,
    Query(query): Query<RangeQuery>,
) -> Response {
    let (start, end) = query.resolve(state.page_size);

    match state.toilets.raw_page(start, end).await {
        Ok(raw) => {
            let content_type = raw
                .content_type
                .unwrap_or_else(|| DEFAULT_XML_CONTENT_TYPE.to_string());
            ([(header::CONTENT_TYPE, content_type)], raw.body).into_response()
        }
        Err(e) => {
            tracing::error!(start, end, error = %e, "Proxy fetch failed");
            internal_error("Failed to fetch Seoul API", e)
        }
    }
}

/// The whole registry, normalized and deduplicated, from cache when fresh.
pub async fn all_toilets_handler(Extension(state): Extension<AxumAppState>) -> Response {
    match state.toilets.all().await {
        Ok(snapshot) => {
            let rows = snapshot.value.toilets.as_slice();
            let last_modified = snapshot
                .captured_at
                .format("%a, %d %b %Y %H:%M:%S GMT")
                .to_string();
            tracing::debug!(
                cached = snapshot.cached,
                count = rows.len(),
                captured_at = %snapshot.captured_at,
                "Serving registry"
            );

            (
                [(header::LAST_MODIFIED, last_modified)],
                Json(AllToiletsResponse {
                    cached: snapshot.cached,
                    count: rows.len(),
                    rows,
                }),
            )
                .into_response()
        }
        Err(e) => {
            tracing::error!(error = %e, "Registry aggregation failed");
            internal_error("Failed to fetch all", e)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn query(start: Option<&str>, end: Option<&str>) -> RangeQuery {
        RangeQuery {
            start: start.map(str::to_string),
            end: end.map(str::to_string),
        }
    }

    #[test]
    fn defaults_to_first_page() {
        assert_eq!(query(None, None).resolve(1000), (1, 1000));
    }

    #[test]
    fn end_defaults_relative_to_start() {
        assert_eq!(query(Some("1001"), None).resolve(1000), (1001, 2000));
    }

    #[test]
    fn explicit_window_is_kept() {
        assert_eq!(query(Some("5"), Some("9")).resolve(1000), (5, 9));
        assert_eq!(query(Some("5"), Some("5")).resolve(1000), (5, 5));
    }

    #[test]
    fn backwards_end_is_coerced() {
        assert_eq!(query(Some("50"), Some("10")).resolve(60), (50, 109));
    }

    #[test]
    fn garbage_is_coerced() {
        assert_eq!(query(Some("abc"), Some("xyz")).resolve(60), (1, 60));
        assert_eq!(query(Some("0"), None).resolve(60), (1, 60));
        assert_eq!(query(Some("-3"), Some("20")).resolve(60), (1, 20));
    }
}
