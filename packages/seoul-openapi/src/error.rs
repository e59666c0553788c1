use thiserror::Error;

/// Errors returned by [`SeoulOpenApiClient`](crate::SeoulOpenApiClient).
#[derive(Debug, Error)]
pub enum OpenApiError {
    /// Transport failure: connect, timeout, body read.
    #[error("HTTP error: {0}")]
    Http(reqwest::Error),

    /// Non-success HTTP status.
    #[error("API error ({status}): {message}")]
    Api { status: u16, message: String },

    /// The service answered 200 but reported an `ERROR-*` result code.
    #[error("service error {code}: {message}")]
    Service { code: String, message: String },

    /// Body could not be parsed as an XML row listing.
    #[error("malformed response: {0}")]
    Malformed(String),

    /// `end` must not precede `start`, and both are 1-based.
    #[error("invalid page range {start}..={end}")]
    InvalidRange { start: u32, end: u32 },
}

impl From<reqwest::Error> for OpenApiError {
    fn from(err: reqwest::Error) -> Self {
        // Request URLs embed the API key.
        OpenApiError::Http(err.without_url())
    }
}

impl OpenApiError {
    /// True when the response body itself was unusable, as opposed to the
    /// upstream being unreachable or refusing the request.
    pub fn is_malformed(&self) -> bool {
        matches!(self, OpenApiError::Malformed(_))
    }
}

pub type Result<T> = std::result::Result<T, OpenApiError>;
