use std::collections::HashMap;

/// One upstream row as field name to text, before normalization.
pub type RawRow = HashMap<String, String>;

/// A batch of raw rows for the inclusive, 1-based window `start..=end`.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Page {
    pub start: u32,
    pub end: u32,
    pub total_count: Option<u64>,
    pub rows: Vec<RawRow>,
}

impl Page {
    pub fn new(start: u32, end: u32, rows: Vec<RawRow>) -> Self {
        Self {
            start,
            end,
            total_count: None,
            rows,
        }
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }
}

/// Upstream body forwarded verbatim by the proxy route.
#[derive(Debug, Clone)]
pub struct RawBody {
    pub content_type: Option<String>,
    pub body: bytes::Bytes,
}
