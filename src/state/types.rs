//! State types for tracking sync progress
//!
//! These types are serialized to JSON and persisted between runs:
//!
//! ```json
//! {"bookmarks": {"apps": {"updated": "2024-01-01T00:00:00Z"}}, "currently_syncing": "apps"}
//! ```

use super::bookmark::compare_bookmarks;
use crate::types::JsonValue;
use serde::{Deserialize, Serialize};
use std::cmp::Ordering;
use std::collections::BTreeMap;

/// Cursor values of one stream, keyed by field name
pub type StreamBookmarks = BTreeMap<String, JsonValue>;

/// Complete persisted state
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct State {
    /// Per-stream bookmarks
    #[serde(default)]
    pub bookmarks: BTreeMap<String, StreamBookmarks>,

    /// Top-level stream that was running when the state was written
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub currently_syncing: Option<String>,
}

impl State {
    /// Create a new empty state
    pub fn new() -> Self {
        Self::default()
    }

    /// Get a bookmark value
    pub fn get_bookmark(&self, stream: &str, key: &str) -> Option<&JsonValue> {
        self.bookmarks.get(stream)?.get(key)
    }

    /// Write a bookmark, never moving it backwards
    ///
    /// Returns `true` when the stored value changed.
    pub fn write_bookmark(&mut self, stream: &str, key: &str, value: JsonValue) -> bool {
        let entry = self.bookmarks.entry(stream.to_string()).or_default();
        match entry.get(key) {
            Some(existing) if compare_bookmarks(&value, existing) != Ordering::Greater => false,
            _ => {
                entry.insert(key.to_string(), value);
                true
            }
        }
    }

    /// Whether any bookmark has been recorded
    pub fn has_bookmarks(&self) -> bool {
        self.bookmarks.values().any(|b| !b.is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_state_default() {
        let state = State::new();
        assert!(state.bookmarks.is_empty());
        assert!(state.currently_syncing.is_none());
        assert!(!state.has_bookmarks());
    }

    #[test]
    fn test_write_bookmark_max_wins() {
        let mut state = State::new();
        assert!(state.write_bookmark("apps", "updated", json!("2024-02-01T00:00:00Z")));
        assert!(!state.write_bookmark("apps", "updated", json!("2024-01-01T00:00:00Z")));
        assert!(!state.write_bookmark("apps", "updated", json!("2024-02-01T00:00:00Z")));
        assert_eq!(
            state.get_bookmark("apps", "updated"),
            Some(&json!("2024-02-01T00:00:00Z"))
        );
        assert!(state.write_bookmark("apps", "updated", json!("2024-03-01T00:00:00Z")));
        assert_eq!(
            state.get_bookmark("apps", "updated"),
            Some(&json!("2024-03-01T00:00:00Z"))
        );
    }

    #[test]
    fn test_state_serialization_shape() {
        let mut state = State::new();
        state.write_bookmark("tables", "updated", json!("2024-01-01T00:00:00Z"));
        state.currently_syncing = Some("apps".to_string());

        let value = serde_json::to_value(&state).unwrap();
        assert_eq!(
            value,
            json!({
                "bookmarks": {"tables": {"updated": "2024-01-01T00:00:00Z"}},
                "currently_syncing": "apps"
            })
        );

        let restored: State = serde_json::from_value(value).unwrap();
        assert_eq!(restored, state);
    }

    #[test]
    fn test_missing_sections_default() {
        let state: State = serde_json::from_str("{}").unwrap();
        assert_eq!(state, State::new());
    }
}
