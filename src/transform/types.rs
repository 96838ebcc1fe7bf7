//! JSON schema type handling

use crate::types::JsonValue;
use serde::{Deserialize, Serialize};

/// JSON Schema primitive type
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum JsonType {
    String,
    Number,
    Integer,
    Boolean,
    Object,
    Array,
    Null,
}

impl JsonType {
    /// Parse a type name
    pub fn from_name(name: &str) -> Option<Self> {
        match name {
            "string" => Some(Self::String),
            "number" => Some(Self::Number),
            "integer" => Some(Self::Integer),
            "boolean" => Some(Self::Boolean),
            "object" => Some(Self::Object),
            "array" => Some(Self::Array),
            "null" => Some(Self::Null),
            _ => None,
        }
    }

    /// Whether `value` already satisfies this type
    pub fn matches(&self, value: &JsonValue) -> bool {
        match self {
            Self::String => value.is_string(),
            Self::Number => value.is_number(),
            Self::Integer => value.is_i64() || value.is_u64(),
            Self::Boolean => value.is_boolean(),
            Self::Object => value.is_object(),
            Self::Array => value.is_array(),
            Self::Null => value.is_null(),
        }
    }
}

impl std::fmt::Display for JsonType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            JsonType::String => write!(f, "string"),
            JsonType::Number => write!(f, "number"),
            JsonType::Integer => write!(f, "integer"),
            JsonType::Boolean => write!(f, "boolean"),
            JsonType::Object => write!(f, "object"),
            JsonType::Array => write!(f, "array"),
            JsonType::Null => write!(f, "null"),
        }
    }
}

/// The `type` keyword of a schema, single or a list
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SchemaTypes(Vec<JsonType>);

impl SchemaTypes {
    /// Read the types declared by `schema`
    ///
    /// A missing or unrecognized `type` declares nothing, which accepts any value.
    pub fn of(schema: &JsonValue) -> Self {
        let types = match schema.get("type") {
            Some(JsonValue::String(name)) => JsonType::from_name(name).into_iter().collect(),
            Some(JsonValue::Array(names)) => names
                .iter()
                .filter_map(JsonValue::as_str)
                .filter_map(JsonType::from_name)
                .collect(),
            _ => Vec::new(),
        };
        Self(types)
    }

    /// Whether no type is declared
    pub fn is_any(&self) -> bool {
        self.0.is_empty()
    }

    /// Whether `t` is declared
    pub fn contains(&self, t: JsonType) -> bool {
        self.0.contains(&t)
    }

    /// Whether `value` satisfies any declared type
    pub fn accepts(&self, value: &JsonValue) -> bool {
        self.is_any() || self.0.iter().any(|t| t.matches(value))
    }

    /// Declared non-null types in declaration order
    pub fn non_null(&self) -> impl Iterator<Item = JsonType> + '_ {
        self.0.iter().copied().filter(|t| *t != JsonType::Null)
    }
}
