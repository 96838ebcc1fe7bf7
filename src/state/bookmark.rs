//! Bookmark value handling
//!
//! Bookmarks are stored as raw JSON so numeric cursors survive a round trip,
//! but are usually ISO 8601 timestamps.

use crate::types::JsonValue;
use chrono::{DateTime, NaiveDate, NaiveDateTime, SecondsFormat, Utc};
use std::cmp::Ordering;

/// Parse an ISO 8601 timestamp, treating offset-less values as UTC
pub fn parse_timestamp(value: &str) -> Option<DateTime<Utc>> {
    let value = value.trim();
    if value.is_empty() {
        return None;
    }

    if let Ok(dt) = DateTime::parse_from_rfc3339(value) {
        return Some(dt.with_timezone(&Utc));
    }
    if let Ok(dt) = DateTime::parse_from_str(value, "%Y-%m-%dT%H:%M:%S%.f%z") {
        return Some(dt.with_timezone(&Utc));
    }
    for fmt in ["%Y-%m-%dT%H:%M:%S%.f", "%Y-%m-%d %H:%M:%S%.f"] {
        if let Ok(naive) = NaiveDateTime::parse_from_str(value, fmt) {
            return Some(naive.and_utc());
        }
    }
    NaiveDate::parse_from_str(value, "%Y-%m-%d")
        .ok()
        .and_then(|d| d.and_hms_opt(0, 0, 0))
        .map(|naive| naive.and_utc())
}

/// Render a timestamp as RFC 3339 UTC with a `Z` suffix
pub fn format_timestamp(value: &DateTime<Utc>) -> String {
    value.to_rfc3339_opts(SecondsFormat::AutoSi, true)
}

/// Timestamp carried by a JSON value, if it is a parseable string
pub fn value_as_timestamp(value: &JsonValue) -> Option<DateTime<Utc>> {
    value.as_str().and_then(parse_timestamp)
}

/// Order two bookmark values
///
/// Chronological when both are timestamps, numeric when both are numbers,
/// lexicographic on the rendered value otherwise.
pub fn compare_bookmarks(a: &JsonValue, b: &JsonValue) -> Ordering {
    if let (Some(ta), Some(tb)) = (value_as_timestamp(a), value_as_timestamp(b)) {
        return ta.cmp(&tb);
    }

    if let (JsonValue::Number(na), JsonValue::Number(nb)) = (a, b) {
        if let (Some(ia), Some(ib)) = (na.as_i64(), nb.as_i64()) {
            return ia.cmp(&ib);
        }
        if let (Some(fa), Some(fb)) = (na.as_f64(), nb.as_f64()) {
            return fa.partial_cmp(&fb).unwrap_or(Ordering::Equal);
        }
    }

    render(a).cmp(&render(b))
}

/// The greater of two bookmark values
pub fn max_bookmark(a: JsonValue, b: JsonValue) -> JsonValue {
    if compare_bookmarks(&b, &a) == Ordering::Greater {
        b
    } else {
        a
    }
}

fn render(value: &JsonValue) -> String {
    match value {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}
