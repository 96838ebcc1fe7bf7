//! Catalog types

use crate::error::{Error, Result};
use crate::types::{JsonObject, JsonValue};
use serde::{Deserialize, Serialize};
use std::path::Path;

/// Field inclusion as advertised by discovery
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Inclusion {
    /// Always emitted, whatever the selection says
    Automatic,
    /// Emitted unless deselected
    Available,
    /// Never emitted
    Unsupported,
}

/// One metadata entry, keyed by its breadcrumb
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MetadataEntry {
    pub breadcrumb: Vec<String>,
    pub metadata: JsonObject,
}

impl MetadataEntry {
    /// Stream-level entry
    pub fn stream(metadata: JsonObject) -> Self {
        Self {
            breadcrumb: Vec::new(),
            metadata,
        }
    }

    /// Entry for a top-level property
    pub fn field(name: &str, metadata: JsonObject) -> Self {
        Self {
            breadcrumb: vec!["properties".to_string(), name.to_string()],
            metadata,
        }
    }

    fn is_field(&self, name: &str) -> bool {
        matches!(self.breadcrumb.as_slice(), [p, n] if p == "properties" && n == name)
    }
}

/// A stream as described by the catalog
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CatalogEntry {
    pub tap_stream_id: String,
    pub stream: String,
    pub schema: JsonValue,
    #[serde(default)]
    pub metadata: Vec<MetadataEntry>,
    #[serde(default)]
    pub key_properties: Vec<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_method: Option<String>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub replication_key: Option<String>,
}

impl CatalogEntry {
    /// Stream-level metadata
    pub fn stream_metadata(&self) -> Option<&JsonObject> {
        self.metadata
            .iter()
            .find(|m| m.breadcrumb.is_empty())
            .map(|m| &m.metadata)
    }

    /// Metadata of a top-level property
    pub fn field_metadata(&self, field: &str) -> Option<&JsonObject> {
        self.metadata
            .iter()
            .find(|m| m.is_field(field))
            .map(|m| &m.metadata)
    }

    /// Whether the stream is selected
    pub fn is_selected(&self) -> bool {
        self.stream_metadata()
            .and_then(|m| m.get("selected"))
            .and_then(JsonValue::as_bool)
            .unwrap_or(false)
    }

    /// Inclusion of a property, if the catalog declares one
    pub fn field_inclusion(&self, field: &str) -> Option<Inclusion> {
        self.field_metadata(field)
            .and_then(|m| m.get("inclusion"))
            .and_then(|v| serde_json::from_value(v.clone()).ok())
    }

    /// Whether a property should be emitted
    ///
    /// Automatic fields always are, unsupported ones never. Otherwise an
    /// explicit `selected` decides, and fields without one are kept.
    pub fn is_field_selected(&self, field: &str) -> bool {
        match self.field_inclusion(field) {
            Some(Inclusion::Automatic) => true,
            Some(Inclusion::Unsupported) => false,
            _ => self
                .field_metadata(field)
                .and_then(|m| m.get("selected"))
                .and_then(JsonValue::as_bool)
                .unwrap_or(true),
        }
    }

    /// Mark the stream selected or not
    pub fn set_selected(&mut self, selected: bool) {
        if let Some(entry) = self.metadata.iter_mut().find(|m| m.breadcrumb.is_empty()) {
            entry
                .metadata
                .insert("selected".to_string(), JsonValue::Bool(selected));
        } else {
            let mut metadata = JsonObject::new();
            metadata.insert("selected".to_string(), JsonValue::Bool(selected));
            self.metadata.insert(0, MetadataEntry::stream(metadata));
        }
    }
}

/// A full catalog
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Catalog {
    pub streams: Vec<CatalogEntry>,
}

impl Catalog {
    /// Load a catalog, YAML for `.yaml`/`.yml` files and JSON otherwise
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }

        let contents = std::fs::read_to_string(path)?;
        let is_yaml = path
            .extension()
            .and_then(|ext| ext.to_str())
            .is_some_and(|ext| ext.eq_ignore_ascii_case("yaml") || ext.eq_ignore_ascii_case("yml"));

        if is_yaml {
            Self::from_yaml(&contents)
        } else {
            Self::from_json(&contents)
        }
    }

    /// Parse a JSON catalog
    pub fn from_json(json: &str) -> Result<Self> {
        serde_json::from_str(json)
            .map_err(|e| Error::catalog(format!("Failed to parse catalog JSON: {e}")))
    }

    /// Parse a YAML catalog
    pub fn from_yaml(yaml: &str) -> Result<Self> {
        serde_yaml::from_str(yaml)
            .map_err(|e| Error::catalog(format!("Failed to parse catalog YAML: {e}")))
    }

    /// Look up an entry by stream id
    pub fn get(&self, tap_stream_id: &str) -> Option<&CatalogEntry> {
        self.streams
            .iter()
            .find(|entry| entry.tap_stream_id == tap_stream_id)
    }

    /// Selected stream ids in catalog order
    pub fn selected_streams(&self) -> Vec<&str> {
        self.streams
            .iter()
            .filter(|entry| entry.is_selected())
            .map(|entry| entry.tap_stream_id.as_str())
            .collect()
    }

    /// Mark every stream selected
    #[must_use]
    pub fn select_all(mut self) -> Self {
        for entry in &mut self.streams {
            entry.set_selected(true);
        }
        self
    }

    /// Pretty-printed JSON
    pub fn to_json_pretty(&self) -> Result<String> {
        serde_json::to_string_pretty(self)
            .map_err(|e| Error::catalog(format!("Failed to serialize catalog: {e}")))
    }
}
