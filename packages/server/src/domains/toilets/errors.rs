use thiserror::Error;

/// Failures fetching a page from the registry. Any of these aborts the whole
/// refresh; nothing partial is ever published.
///
/// Messages are captured as text so a single failure can be handed to every
/// caller waiting on the same refresh.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum UpstreamError {
    /// Transport failure, non-success status, or a refusal from the service.
    #[error("upstream unavailable: {0}")]
    Unavailable(String),

    /// The body could not be parsed into rows at all.
    #[error("upstream response malformed: {0}")]
    Malformed(String),
}

pub type UpstreamResult<T> = std::result::Result<T, UpstreamError>;
