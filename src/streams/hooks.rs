//! Per-stream record modification

use crate::template::PathContext;
use crate::types::{JsonObject, JsonValue};

/// Change applied to each raw record before transformation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RecordHook {
    /// Pass the record through untouched
    #[default]
    None,
    /// Copy the parent's table id into `tableId`
    InjectTableId,
    /// Turn `{field: {id}, usage: {...}}` into `{id, ...usage}`
    FlattenFieldUsage,
    /// Flatten, then inject the table id
    FlattenAndInjectTableId,
}

impl RecordHook {
    /// Apply the hook
    ///
    /// Table ids are only injected when a parent record is present.
    pub fn apply(self, record: JsonValue, ctx: &PathContext<'_>) -> JsonValue {
        match self {
            Self::None => record,
            Self::InjectTableId => inject_table_id(record, ctx),
            Self::FlattenFieldUsage => flatten_field_usage(record),
            Self::FlattenAndInjectTableId => inject_table_id(flatten_field_usage(record), ctx),
        }
    }
}

fn inject_table_id(mut record: JsonValue, ctx: &PathContext<'_>) -> JsonValue {
    if ctx.parent.is_none() {
        return record;
    }
    if let (Some(map), Some(table_id)) = (record.as_object_mut(), ctx.table_id()) {
        map.insert("tableId".to_string(), JsonValue::String(table_id));
    }
    record
}

fn flatten_field_usage(record: JsonValue) -> JsonValue {
    let JsonValue::Object(map) = record else {
        return record;
    };
    if map.is_empty() {
        return JsonValue::Object(map);
    }

    let id = map
        .get("field")
        .and_then(|f| f.get("id"))
        .cloned()
        .unwrap_or(JsonValue::Null);

    let mut flat = JsonObject::new();
    flat.insert("id".to_string(), id);
    if let Some(JsonValue::Object(usage)) = map.get("usage") {
        for (key, value) in usage {
            flat.insert(key.clone(), value.clone());
        }
    }
    JsonValue::Object(flat)
}
