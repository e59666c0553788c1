//! Router-level test harness.
//!
//! Builds the real application router on top of a scripted page source and
//! drives it in-process with `tower::ServiceExt::oneshot`, so no socket or
//! upstream is involved.

use std::time::Duration;

use axum::{
    body::{to_bytes, Body},
    http::{HeaderMap, Request, StatusCode},
    Router,
};
use bytes::Bytes;
use server_core::domains::toilets::{AggregationConfig, PaginationConfig};
use server_core::kernel::MockPageSource;
use server_core::server::{build_app, AxumAppState};
use tower::ServiceExt;

pub const TEST_PAGE_SIZE: u32 = 3;

/// Directory with a stand-in frontend bundle.
pub fn fixture_static_dir() -> String {
    format!("{}/tests/fixtures/public", env!("CARGO_MANIFEST_DIR"))
}

pub fn test_config() -> AggregationConfig {
    AggregationConfig {
        pagination: PaginationConfig {
            page_size: TEST_PAGE_SIZE,
            max_pages: 20,
            page_delay: Duration::ZERO,
        },
        cache_ttl: Duration::from_secs(60),
    }
}

pub struct TestResponse {
    pub status: StatusCode,
    pub headers: HeaderMap,
    pub body: Bytes,
}

impl TestResponse {
    pub fn json(&self) -> serde_json::Value {
        serde_json::from_slice(&self.body).expect("response body should be JSON")
    }

    pub fn content_type(&self) -> Option<&str> {
        self.headers
            .get(axum::http::header::CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
    }
}

pub struct TestHarness {
    pub source: MockPageSource,
    app: Router,
}

impl TestHarness {
    pub fn new(source: MockPageSource) -> Self {
        Self::build(source, None)
    }

    pub fn with_static_dir(source: MockPageSource) -> Self {
        Self::build(source, Some(fixture_static_dir()))
    }

    fn build(source: MockPageSource, static_dir: Option<String>) -> Self {
        // Run tests with: RUST_LOG=debug cargo test -- --nocapture
        let _ = tracing_subscriber::fmt()
            .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
            .with_test_writer()
            .try_init();

        let state = AxumAppState::new(&source.clone().into_deps(), test_config());
        let app = build_app(state, static_dir.as_deref());

        Self { source, app }
    }

    pub async fn get(&self, uri: &str) -> TestResponse {
        self.request(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
    }

    pub async fn request(&self, request: Request<Body>) -> TestResponse {
        let response = self
            .app
            .clone()
            .oneshot(request)
            .await
            .expect("router is infallible");

        let status = response.status();
        let headers = response.headers().clone();
        let body = to_bytes(response.into_body(), usize::MAX)
            .await
            .expect("body should be readable");

        TestResponse {
            status,
            headers,
            body,
        }
    }
}
