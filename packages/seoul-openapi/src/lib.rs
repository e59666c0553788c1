//! Seoul Open Data Plaza API client.
//!
//! A minimal client for the XML flavour of `openapi.seoul.go.kr`. Every
//! dataset is addressed as `{base}/{key}/xml/{service}/{start}/{end}/` with a
//! 1-based, inclusive row window.
//!
//! # Example
//!
//! ```rust,ignore
//! use seoul_openapi::{ClientOptions, PageRange, SeoulOpenApiClient, TOILET_POI_SERVICE};
//!
//! let client = SeoulOpenApiClient::with_options(ClientOptions::new("your-api-key", TOILET_POI_SERVICE))?;
//!
//! let page = client.fetch_page(PageRange::new(1, 1000)?).await?;
//! for row in &page.rows {
//!     println!("{:?}", row.get("CONTS_NAME"));
//! }
//! ```

pub mod error;
pub mod types;
pub mod xml;

pub use error::{OpenApiError, Result};
pub use types::{PageRange, PageResponse, RawResponse, RawRow};

use std::fmt;
use std::time::Duration;

use reqwest::header::CONTENT_TYPE;

pub const DEFAULT_BASE_URL: &str = "http://openapi.seoul.go.kr:8088";

/// Public toilet locations (MGIS points of interest).
pub const TOILET_POI_SERVICE: &str = "mgisToiletPoi";

const DEFAULT_TIMEOUT: Duration = Duration::from_secs(30);

#[derive(Clone)]
pub struct ClientOptions {
    pub base_url: String,
    pub api_key: String,
    pub service: String,
    pub timeout: Duration,
}

impl ClientOptions {
    pub fn new(api_key: impl Into<String>, service: impl Into<String>) -> Self {
        Self {
            base_url: DEFAULT_BASE_URL.to_string(),
            api_key: api_key.into(),
            service: service.into(),
            timeout: DEFAULT_TIMEOUT,
        }
    }

    pub fn with_base_url(mut self, base_url: impl Into<String>) -> Self {
        self.base_url = base_url.into();
        self
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout;
        self
    }
}

impl fmt::Debug for ClientOptions {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ClientOptions")
            .field("base_url", &self.base_url)
            .field("api_key", &"[REDACTED]")
            .field("service", &self.service)
            .field("timeout", &self.timeout)
            .finish()
    }
}

#[derive(Debug, Clone)]
pub struct SeoulOpenApiClient {
    client: reqwest::Client,
    options: ClientOptions,
}

impl SeoulOpenApiClient {
    pub fn with_options(options: ClientOptions) -> Result<Self> {
        let client = reqwest::Client::builder()
            .timeout(options.timeout)
            .build()?;
        Ok(Self { client, options })
    }

    fn page_url(&self, range: PageRange) -> String {
        format!(
            "{}/{}/xml/{}/{}/{}/",
            self.options.base_url.trim_end_matches('/'),
            self.options.api_key,
            self.options.service,
            range.start,
            range.end
        )
    }

    async fn get(&self, range: PageRange) -> Result<reqwest::Response> {
        let resp = self.client.get(self.page_url(range)).send().await?;

        let status = resp.status();
        if !status.is_success() {
            let body = resp.text().await.unwrap_or_default();
            return Err(OpenApiError::Api {
                status: status.as_u16(),
                message: body,
            });
        }

        Ok(resp)
    }

    /// Fetch one window untouched, keeping the upstream content type.
    pub async fn fetch_raw(&self, range: PageRange) -> Result<RawResponse> {
        let resp = self.get(range).await?;
        let content_type = resp
            .headers()
            .get(CONTENT_TYPE)
            .and_then(|v| v.to_str().ok())
            .map(str::to_string);
        let body = resp.bytes().await?;

        Ok(RawResponse { content_type, body })
    }

    /// Fetch one window and parse its rows.
    pub async fn fetch_page(&self, range: PageRange) -> Result<PageResponse> {
        let resp = self.get(range).await?;
        let body = resp.text().await?;

        let doc = xml::parse_document(&body)?;
        if doc.is_service_error() {
            return Err(OpenApiError::Service {
                code: doc.result_code.unwrap_or_default(),
                message: doc.result_message.unwrap_or_default(),
            });
        }

        tracing::debug!(
            service = %self.options.service,
            start = range.start,
            end = range.end,
            rows = doc.rows.len(),
            total = ?doc.total_count,
            "Fetched page"
        );

        Ok(PageResponse {
            range,
            total_count: doc.total_count,
            rows: doc.rows,
        })
    }
}
