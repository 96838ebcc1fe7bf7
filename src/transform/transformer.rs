//! Schema-driven record transformer

use super::types::{JsonType, SchemaTypes};
use crate::catalog::CatalogEntry;
use crate::state::{format_timestamp, parse_timestamp};
use crate::types::{JsonObject, JsonValue};
use tracing::trace;

/// Shapes a raw record for emission
pub trait Transformer: Send + Sync {
    /// Transform `record` against `schema`, applying the field selection of
    /// `entry` when one is given
    fn transform(
        &self,
        record: JsonValue,
        schema: &JsonValue,
        entry: Option<&CatalogEntry>,
    ) -> JsonValue;
}

/// Coerces values to their JSON-schema types
///
/// Values that cannot be coerced are passed through unchanged.
#[derive(Debug, Clone, Copy, Default)]
pub struct SchemaTransformer;

impl SchemaTransformer {
    pub fn new() -> Self {
        Self
    }

    fn coerce(&self, value: JsonValue, schema: &JsonValue) -> JsonValue {
        if value.is_null() {
            return value;
        }

        let types = SchemaTypes::of(schema);
        let value = if types.accepts(&value) {
            value
        } else {
            types
                .non_null()
                .find_map(|t| convert(&value, t))
                .unwrap_or(value)
        };

        match value {
            JsonValue::String(s) if is_date_time(schema) => JsonValue::String(normalize_date_time(s)),
            JsonValue::Object(map) => match schema.get("properties") {
                Some(JsonValue::Object(props)) => JsonValue::Object(self.coerce_object(map, props)),
                _ => JsonValue::Object(map),
            },
            JsonValue::Array(items) => match schema.get("items") {
                Some(item_schema) => JsonValue::Array(
                    items
                        .into_iter()
                        .map(|item| self.coerce(item, item_schema))
                        .collect(),
                ),
                None => JsonValue::Array(items),
            },
            other => other,
        }
    }

    fn coerce_object(&self, map: JsonObject, properties: &JsonObject) -> JsonObject {
        map.into_iter()
            .map(|(key, value)| {
                let value = match properties.get(&key) {
                    Some(schema) => self.coerce(value, schema),
                    None => value,
                };
                (key, value)
            })
            .collect()
    }
}

impl Transformer for SchemaTransformer {
    fn transform(
        &self,
        record: JsonValue,
        schema: &JsonValue,
        entry: Option<&CatalogEntry>,
    ) -> JsonValue {
        let JsonValue::Object(map) = record else {
            return record;
        };

        let selected: JsonObject = match entry {
            Some(entry) => map
                .into_iter()
                .filter(|(key, _)| {
                    let keep = entry.is_field_selected(key);
                    if !keep {
                        trace!("Dropping deselected field {} from {}", key, entry.stream);
                    }
                    keep
                })
                .collect(),
            None => map,
        };

        let properties = schema.get("properties").and_then(JsonValue::as_object);
        match properties {
            Some(props) => JsonValue::Object(self.coerce_object(selected, props)),
            None => JsonValue::Object(selected),
        }
    }
}

fn is_date_time(schema: &JsonValue) -> bool {
    schema.get("format").and_then(JsonValue::as_str) == Some("date-time")
}

fn normalize_date_time(s: String) -> String {
    match parse_timestamp(&s) {
        Some(ts) => format_timestamp(&ts),
        None => s,
    }
}

fn convert(value: &JsonValue, target: JsonType) -> Option<JsonValue> {
    match (target, value) {
        (JsonType::Integer, JsonValue::String(s)) => s.trim().parse::<i64>().ok().map(JsonValue::from),
        (JsonType::Integer, JsonValue::Number(n)) => n
            .as_f64()
            .filter(|f| f.fract() == 0.0 && f.abs() < 9.0e15)
            .map(|f| JsonValue::from(f as i64)),
        (JsonType::Integer, JsonValue::Bool(b)) => Some(JsonValue::from(i64::from(*b))),
        (JsonType::Number, JsonValue::String(s)) => s
            .trim()
            .parse::<f64>()
            .ok()
            .filter(|f| f.is_finite())
            .map(JsonValue::from),
        (JsonType::Boolean, JsonValue::String(s)) => match s.trim().to_ascii_lowercase().as_str() {
            "true" | "1" => Some(JsonValue::Bool(true)),
            "false" | "0" => Some(JsonValue::Bool(false)),
            _ => None,
        },
        (JsonType::Boolean, JsonValue::Number(n)) => match n.as_i64() {
            Some(0) => Some(JsonValue::Bool(false)),
            Some(1) => Some(JsonValue::Bool(true)),
            _ => None,
        },
        (JsonType::String, JsonValue::Number(n)) => Some(JsonValue::String(n.to_string())),
        (JsonType::String, JsonValue::Bool(b)) => Some(JsonValue::String(b.to_string())),
        _ => None,
    }
}
