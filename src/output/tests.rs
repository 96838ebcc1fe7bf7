//! Tests for the output module

use super::*;
use pretty_assertions::assert_eq;
use serde_json::json;

// ============================================================================
// Message Tests
// ============================================================================

#[test]
fn test_schema_message_shape() {
    let message = Message::schema(
        "apps",
        json!({"type": "object"}),
        &["id"],
        &["updated"],
    );
    assert_eq!(
        serde_json::to_value(&message).unwrap(),
        json!({
            "type": "SCHEMA",
            "stream": "apps",
            "schema": {"type": "object"},
            "key_properties": ["id"],
            "bookmark_properties": ["updated"]
        })
    );
}

#[test]
fn test_schema_without_bookmarks_omits_field() {
    let message = Message::schema("roles", json!({}), &["id"], &[]);
    let value = serde_json::to_value(&message).unwrap();
    assert!(value.get("bookmark_properties").is_none());
}

#[test]
fn test_record_message_shape() {
    let message = Message::record("roles", json!({"id": 1}));
    let value = serde_json::to_value(&message).unwrap();
    assert_eq!(value["type"], "RECORD");
    assert_eq!(value["stream"], "roles");
    assert_eq!(value["record"], json!({"id": 1}));
    assert!(value["time_extracted"].is_string());
    assert!(message.is_record());
    assert_eq!(message.stream(), Some("roles"));
}

#[test]
fn test_state_message_shape() {
    let message = Message::state(json!({"bookmarks": {}}));
    assert_eq!(
        serde_json::to_value(&message).unwrap(),
        json!({"type": "STATE", "value": {"bookmarks": {}}})
    );
    assert_eq!(message.stream(), None);
}

// ============================================================================
// Sink Tests
// ============================================================================

#[test]
fn test_json_lines_sink_writes_one_line_per_message() {
    let mut sink = JsonLinesSink::new(Vec::new());
    sink.emit(&Message::schema("roles", json!({}), &["id"], &[]))
        .unwrap();
    sink.emit(&Message::record("roles", json!({"id": 1}))).unwrap();
    sink.emit(&Message::state(json!({}))).unwrap();
    sink.flush().unwrap();

    let output = String::from_utf8(sink.into_inner()).unwrap();
    let lines: Vec<serde_json::Value> = output
        .lines()
        .map(|line| serde_json::from_str(line).unwrap())
        .collect();

    assert_eq!(lines.len(), 3);
    assert_eq!(lines[0]["type"], "SCHEMA");
    assert_eq!(lines[1]["type"], "RECORD");
    assert_eq!(lines[2]["type"], "STATE");
}

#[test]
fn test_collecting_sink_queries() {
    let mut sink = CollectingSink::new();
    sink.emit(&Message::schema("apps", json!({}), &["id"], &[]))
        .unwrap();
    sink.emit(&Message::record("apps", json!({"id": "a"}))).unwrap();
    sink.emit(&Message::record("roles", json!({"id": 1}))).unwrap();
    sink.emit(&Message::state(json!({"bookmarks": {}}))).unwrap();

    assert_eq!(sink.messages().len(), 4);
    assert_eq!(sink.schema_count("apps"), 1);
    assert_eq!(sink.schema_count("roles"), 0);
    assert_eq!(sink.records("apps"), vec![&json!({"id": "a"})]);
    assert_eq!(sink.record_streams(), vec!["apps", "roles"]);
    assert_eq!(sink.states().len(), 1);
}
