use std::collections::HashMap;

use bytes::Bytes;

use crate::error::{OpenApiError, Result};

/// One upstream row: child element names (upper-cased) to trimmed text.
pub type RawRow = HashMap<String, String>;

/// Inclusive, 1-based index window requested from the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PageRange {
    pub start: u32,
    pub end: u32,
}

impl PageRange {
    pub fn new(start: u32, end: u32) -> Result<Self> {
        if start == 0 || end < start {
            return Err(OpenApiError::InvalidRange { start, end });
        }
        Ok(Self { start, end })
    }
}

/// A parsed page of rows.
#[derive(Debug, Clone, PartialEq)]
pub struct PageResponse {
    pub range: PageRange,
    /// `list_total_count` as advertised by the service, if present.
    pub total_count: Option<u64>,
    pub rows: Vec<RawRow>,
}

/// An unparsed response body, forwarded as-is by proxies.
#[derive(Debug, Clone)]
pub struct RawResponse {
    pub content_type: Option<String>,
    pub body: Bytes,
}
