//! Row extraction from Seoul Open API XML documents.
//!
//! A successful listing looks like:
//!
//! ```xml
//! <mgisToiletPoi>
//!   <list_total_count>4950</list_total_count>
//!   <RESULT><CODE>INFO-000</CODE><MESSAGE>정상 처리되었습니다</MESSAGE></RESULT>
//!   <row><OBJECTID>1</OBJECTID><CONTS_NAME>...</CONTS_NAME></row>
//! </mgisToiletPoi>
//! ```
//!
//! Element casing is not stable across batches (`row` vs `Row`, mixed-case
//! field tags), so rows are matched case-insensitively and field names are
//! upper-cased.

use quick_xml::events::Event;
use quick_xml::Reader;

use crate::error::{OpenApiError, Result};
use crate::types::RawRow;

/// Everything of interest found in one response document.
#[derive(Debug, Default, Clone, PartialEq)]
pub struct ParsedDocument {
    pub rows: Vec<RawRow>,
    pub total_count: Option<u64>,
    pub result_code: Option<String>,
    pub result_message: Option<String>,
}

impl ParsedDocument {
    /// The service signals refusals (bad key, quota, bad range) with
    /// `ERROR-*` codes inside an otherwise successful response.
    pub fn is_service_error(&self) -> bool {
        self.result_code
            .as_deref()
            .is_some_and(|code| code.starts_with("ERROR"))
    }
}

fn local_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

/// Parse a response body into rows plus result metadata.
pub fn parse_document(xml: &str) -> Result<ParsedDocument> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut doc = ParsedDocument::default();
    let mut path: Vec<String> = Vec::new();
    let mut text = String::new();
    let mut saw_element = false;

    // Depth of the enclosing <row> and the row being filled.
    let mut row_depth = 0usize;
    let mut current_row: Option<RawRow> = None;

    loop {
        match reader.read_event() {
            Ok(Event::Start(e)) => {
                saw_element = true;
                let name = local_name(e.local_name().as_ref());
                if current_row.is_none() && name.eq_ignore_ascii_case("row") {
                    row_depth = path.len();
                    current_row = Some(RawRow::new());
                }
                path.push(name);
                text.clear();
            }
            Ok(Event::Empty(e)) => {
                saw_element = true;
                let name = local_name(e.local_name().as_ref());
                match current_row.as_mut() {
                    Some(row) if path.len() == row_depth + 1 => {
                        row.entry(name.to_uppercase()).or_default();
                    }
                    Some(_) => {}
                    None if name.eq_ignore_ascii_case("row") => doc.rows.push(RawRow::new()),
                    None => {}
                }
            }
            Ok(Event::Text(e)) => {
                let value = e
                    .unescape()
                    .map_err(|err| OpenApiError::Malformed(err.to_string()))?;
                text.push_str(&value);
            }
            Ok(Event::CData(e)) => {
                text.push_str(&String::from_utf8_lossy(&e.into_inner()));
            }
            Ok(Event::End(_)) => {
                let name = path.pop().unwrap_or_default();
                let value = text.trim();

                if current_row.is_some() {
                    if path.len() == row_depth {
                        doc.rows.extend(current_row.take());
                    } else if path.len() == row_depth + 1 {
                        if let Some(row) = current_row.as_mut() {
                            row.insert(name.to_uppercase(), value.to_string());
                        }
                    }
                } else if name.eq_ignore_ascii_case("list_total_count") {
                    doc.total_count = value.parse().ok();
                } else if path
                    .last()
                    .is_some_and(|parent| parent.eq_ignore_ascii_case("result"))
                {
                    if name.eq_ignore_ascii_case("code") {
                        doc.result_code = Some(value.to_string());
                    } else if name.eq_ignore_ascii_case("message") {
                        doc.result_message = Some(value.to_string());
                    }
                }
                text.clear();
            }
            Ok(Event::Eof) => break,
            Err(e) => {
                return Err(OpenApiError::Malformed(format!(
                    "XML parse error at byte {}: {e}",
                    reader.error_position()
                )));
            }
            _ => {}
        }
    }

    if !saw_element {
        return Err(OpenApiError::Malformed("no XML elements in body".into()));
    }
    if !path.is_empty() {
        return Err(OpenApiError::Malformed(format!(
            "document ended inside <{}>",
            path.join("/")
        )));
    }
    // Well-formed but not a listing, e.g. an HTML gateway page.
    if doc.rows.is_empty() && doc.result_code.is_none() && doc.total_count.is_none() {
        return Err(OpenApiError::Malformed(
            "body has no rows, result code or row count".into(),
        ));
    }

    Ok(doc)
}
