//! Catalog discovery from the stream registry

use super::types::{Catalog, CatalogEntry, Inclusion, MetadataEntry};
use crate::streams::{StreamDefinition, StreamKind};
use crate::types::{JsonObject, JsonValue, ReplicationMethod};
use serde_json::json;

/// Build the catalog of every stream
///
/// Nothing is selected; callers select streams before syncing.
pub fn discover() -> Catalog {
    Catalog {
        streams: StreamKind::ALL
            .into_iter()
            .map(|kind| entry_for(kind.definition()))
            .collect(),
    }
}

fn entry_for(def: &StreamDefinition) -> CatalogEntry {
    let schema = def.default_schema();
    let replication_key = match def.method {
        ReplicationMethod::Incremental => def.cursor_field().map(ToString::to_string),
        ReplicationMethod::FullTable | ReplicationMethod::PseudoIncremental => None,
    };

    CatalogEntry {
        tap_stream_id: def.id.to_string(),
        stream: def.id.to_string(),
        metadata: metadata_for(def, &schema, replication_key.as_deref()),
        schema,
        key_properties: def.key_properties.iter().map(ToString::to_string).collect(),
        replication_method: Some(def.method.catalog_name().to_string()),
        replication_key,
    }
}

fn metadata_for(
    def: &StreamDefinition,
    schema: &JsonValue,
    replication_key: Option<&str>,
) -> Vec<MetadataEntry> {
    let mut stream = JsonObject::new();
    stream.insert("table-key-properties".to_string(), json!(def.key_properties));
    stream.insert(
        "forced-replication-method".to_string(),
        json!(def.method.catalog_name()),
    );
    if let Some(key) = replication_key {
        stream.insert("valid-replication-keys".to_string(), json!([key]));
    }
    if let Some(parent) = def.parent {
        stream.insert("parent-tap-stream-id".to_string(), json!(parent.id()));
    }

    let mut entries = vec![MetadataEntry::stream(stream)];

    let properties = schema
        .get("properties")
        .and_then(JsonValue::as_object)
        .into_iter()
        .flat_map(|props| props.keys());
    for name in properties {
        let automatic =
            def.key_properties.contains(&name.as_str()) || replication_key == Some(name.as_str());
        let inclusion = if automatic {
            Inclusion::Automatic
        } else {
            Inclusion::Available
        };

        let mut field = JsonObject::new();
        field.insert("inclusion".to_string(), json!(inclusion));
        entries.push(MetadataEntry::field(name, field));
    }

    entries
}
