//! Record extraction from response bodies

use serde_json::Value;

/// Pulls the record list out of a response body
#[derive(Debug, Clone, Default)]
pub struct RecordExtractor {
    /// Dot path of the key holding the records
    record_path: Option<String>,
}

impl RecordExtractor {
    /// Extractor for responses that are the records themselves
    pub fn new() -> Self {
        Self::default()
    }

    /// Extractor for an optional path
    pub fn from_key(path: Option<&str>) -> Self {
        Self {
            record_path: path.map(ToString::to_string),
        }
    }

    /// Records of one page
    ///
    /// A list is used directly; a non-empty object is a single record;
    /// anything else is an empty page.
    pub fn extract(&self, body: &Value) -> Vec<Value> {
        match &self.record_path {
            Some(path) => extract_simple_path(body, path)
                .map(as_records)
                .unwrap_or_default(),
            None => as_records(body),
        }
    }
}

/// Stable identity of a record: `id`, else `field.id`
///
/// Only null ids count as absent; `0` and `""` are identities. The identity
/// is the JSON rendering of the value, so `1` and `"1"` stay distinct.
pub fn record_identity(record: &Value) -> Option<String> {
    let id = non_null(record.get("id"))
        .or_else(|| non_null(record.get("field").and_then(|f| f.get("id"))))?;
    Some(id.to_string())
}

/// Total record count reported by an envelope's `metadata`
pub fn total_records(body: &Value) -> Option<u64> {
    body.get("metadata")?.get("totalRecords")?.as_u64()
}

fn non_null(value: Option<&Value>) -> Option<&Value> {
    value.filter(|v| !v.is_null())
}

fn as_records(value: &Value) -> Vec<Value> {
    match value {
        Value::Array(arr) => arr.clone(),
        Value::Object(map) if !map.is_empty() => vec![value.clone()],
        _ => vec![],
    }
}

/// Follow a dot-notation path
fn extract_simple_path<'a>(value: &'a Value, path: &str) -> Option<&'a Value> {
    let path = path.strip_prefix("$.").unwrap_or(path);
    let mut current = value;
    for part in path.split('.').filter(|p| !p.is_empty()) {
        current = current.as_object()?.get(part)?;
    }
    Some(current)
}
