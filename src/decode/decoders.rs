//! Decoder implementations

use crate::error::{Error, Result};
use serde_json::{Map, Value};

// ============================================================================
// JSON Decoder
// ============================================================================

/// JSON decoder with optional record path extraction
#[derive(Debug, Clone, Default)]
pub struct JsonDecoder {
    /// JSONPath to extract records
    record_path: Option<String>,
}

impl JsonDecoder {
    /// Create a new JSON decoder
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a JSON decoder with a record path
    pub fn with_path(path: impl Into<String>) -> Self {
        Self {
            record_path: Some(path.into()),
        }
    }

    /// Parse a body into a JSON document
    pub fn parse(&self, body: &str) -> Result<Value> {
        serde_json::from_str(body).map_err(|e| Error::Decode {
            message: format!("Failed to parse JSON: {e}"),
        })
    }

    /// Extract records from an already parsed document
    pub fn records_from(&self, value: &Value) -> Result<Vec<Value>> {
        match &self.record_path {
            Some(path) => extract_records(value, path),
            None => match value {
                Value::Array(arr) => Ok(arr.clone()),
                _ => Ok(vec![value.clone()]),
            },
        }
    }
}

/// Extract records at `path`.
///
/// Wildcard paths (`$.podcasts[*]`) go through jsonpath-rust; anything else
/// is walked as a dot path. An array at the path yields its elements, any
/// other value yields one record and an absent path yields none.
pub fn extract_records(value: &Value, path: &str) -> Result<Vec<Value>> {
    if path.contains('*') && !path.contains("[-") {
        return extract_with_jsonpath(value, path);
    }

    match extract_simple_path(value, path) {
        Some(Value::Array(arr)) => Ok(arr),
        Some(Value::Null) | None => Ok(vec![]),
        Some(v) => Ok(vec![v]),
    }
}

// ============================================================================
// CSV Decoder
// ============================================================================

/// CSV decoder with a header row
///
/// Rows become objects keyed by header, in column order. A row shorter than
/// the header gets `null` for the missing columns. Quoted fields may span
/// lines.
#[derive(Debug, Clone, Copy, Default)]
pub struct CsvDecoder;

impl CsvDecoder {
    /// Create a new comma-delimited decoder
    pub fn new() -> Self {
        Self
    }

    /// Decode into row objects
    pub fn decode_rows(&self, body: &str) -> Result<Vec<Map<String, Value>>> {
        let mut reader = csv::ReaderBuilder::new()
            .has_headers(true)
            .flexible(true)
            .from_reader(body.trim_start_matches('\u{feff}').as_bytes());

        let headers: Vec<String> = reader
            .headers()
            .map_err(|e| Error::csv(e.to_string()))?
            .iter()
            .map(String::from)
            .collect();
        if headers.is_empty() {
            return Ok(Vec::new());
        }

        let mut rows = Vec::new();
        for record in reader.records() {
            let record = record.map_err(|e| Error::csv(e.to_string()))?;
            if record.iter().all(|field| field.trim().is_empty()) {
                continue;
            }

            let row = headers
                .iter()
                .enumerate()
                .map(|(i, header)| {
                    let value = record.get(i).map_or(Value::Null, |f| Value::String(f.to_string()));
                    (header.clone(), value)
                })
                .collect();
            rows.push(row);
        }

        Ok(rows)
    }
}

// ============================================================================
// Helper Functions
// ============================================================================

/// Extract a value using simple dot-notation path
pub fn extract_simple_path(value: &Value, path: &str) -> Option<Value> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    if path.is_empty() || path == "$" {
        return Some(value.clone());
    }

    let mut current = value;
    for part in path.split('.') {
        // Array indexing like "data[0]" or "items[-1]"
        if let Some(bracket_pos) = part.find('[') {
            let name = &part[..bracket_pos];
            let index_str = part[bracket_pos + 1..].trim_end_matches(']');

            if !name.is_empty() {
                current = current.get(name)?;
            }

            if index_str == "*" {
                return Some(current.clone());
            }

            let index = index_str.parse::<i64>().ok()?;
            let Value::Array(arr) = current else {
                return None;
            };
            #[allow(clippy::cast_possible_wrap)]
            let idx = if index < 0 {
                arr.len() as i64 + index
            } else {
                index
            };
            current = arr.get(usize::try_from(idx).ok()?)?;
        } else {
            current = current.get(part)?;
        }
    }

    Some(current.clone())
}

/// Extract records using jsonpath-rust
fn extract_with_jsonpath(value: &Value, path: &str) -> Result<Vec<Value>> {
    use jsonpath_rust::JsonPath;

    let jp = JsonPath::try_from(path)
        .map_err(|e| Error::json_path(format!("Invalid JSONPath '{path}': {e}")))?;

    match jp.find(value) {
        Value::Array(arr) => Ok(arr),
        Value::Null => Ok(vec![]),
        other => Ok(vec![other]),
    }
}
