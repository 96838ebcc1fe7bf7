//! Common types used throughout quickbase-tap
//!
//! This module contains shared type definitions, type aliases,
//! and utility types used across multiple modules.

use serde::{Deserialize, Serialize};
use std::fmt;

// ============================================================================
// Type Aliases
// ============================================================================

/// JSON value type (re-exported from serde_json)
pub type JsonValue = serde_json::Value;

/// JSON object type
pub type JsonObject = serde_json::Map<String, JsonValue>;

// ============================================================================
// HTTP Types
// ============================================================================

/// HTTP method
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Method {
    #[default]
    GET,
    POST,
}

impl From<Method> for reqwest::Method {
    fn from(method: Method) -> Self {
        match method {
            Method::GET => reqwest::Method::GET,
            Method::POST => reqwest::Method::POST,
        }
    }
}

// ============================================================================
// Replication Method
// ============================================================================

/// How a stream tracks progress between runs
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ReplicationMethod {
    /// Re-read everything on every run
    FullTable,
    /// Server-side filter on a cursor field, bookmark kept
    Incremental,
    /// Fetch everything, filter locally against the bookmark
    PseudoIncremental,
}

impl ReplicationMethod {
    /// Whether the method persists a bookmark
    pub fn uses_bookmark(&self) -> bool {
        !matches!(self, Self::FullTable)
    }

    /// Name advertised in catalog metadata
    ///
    /// Pseudo-incremental streams read the whole collection upstream and
    /// filter locally, so they advertise `FULL_TABLE` with no replication key.
    pub fn catalog_name(&self) -> &'static str {
        match self {
            Self::Incremental => "INCREMENTAL",
            Self::FullTable | Self::PseudoIncremental => "FULL_TABLE",
        }
    }
}

impl fmt::Display for ReplicationMethod {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            Self::FullTable => "FULL_TABLE",
            Self::Incremental => "INCREMENTAL",
            Self::PseudoIncremental => "PSEUDO_INCREMENTAL",
        };
        f.write_str(name)
    }
}

// ============================================================================
// Dependency Role
// ============================================================================

/// Position of a stream in the parent/child tree of a run
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum DependencyRole {
    /// Top-level stream with attached children
    Root,
    /// Nested stream with attached children
    Parent,
    /// Nested stream with nothing attached
    Child,
    /// Top-level stream with nothing attached
    Leaf,
}

impl DependencyRole {
    /// Derive the role from tree position
    pub fn from_position(is_top_level: bool, has_children: bool) -> Self {
        match (is_top_level, has_children) {
            (true, true) => Self::Root,
            (true, false) => Self::Leaf,
            (false, true) => Self::Parent,
            (false, false) => Self::Child,
        }
    }

    /// Whether the stream runs once per parent record
    pub fn is_nested(&self) -> bool {
        matches!(self, Self::Parent | Self::Child)
    }

    /// Whether the stream fans out to attached children
    pub fn has_children(&self) -> bool {
        matches!(self, Self::Root | Self::Parent)
    }
}

// ============================================================================
// Backoff Type
// ============================================================================

/// Type of backoff for retries
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum BackoffType {
    /// Constant delay between retries
    Constant,
    /// Linear increase in delay
    Linear,
    /// Exponential increase in delay
    #[default]
    Exponential,
}

// ============================================================================
// Utilities
// ============================================================================

/// Extension trait for Option<String> to handle empty strings
pub trait OptionStringExt {
    /// Returns None if the string is empty
    fn none_if_empty(self) -> Option<String>;
}

impl OptionStringExt for Option<String> {
    fn none_if_empty(self) -> Option<String> {
        self.filter(|s| !s.trim().is_empty())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_method_conversion() {
        let get: reqwest::Method = Method::GET.into();
        assert_eq!(reqwest::Method::GET, get);
        assert_eq!(Method::default(), Method::GET);
    }

    #[test]
    fn test_replication_method_serde() {
        let method: ReplicationMethod = serde_json::from_str("\"PSEUDO_INCREMENTAL\"").unwrap();
        assert_eq!(method, ReplicationMethod::PseudoIncremental);

        let json = serde_json::to_string(&ReplicationMethod::FullTable).unwrap();
        assert_eq!(json, "\"FULL_TABLE\"");
    }

    #[test]
    fn test_replication_method_catalog_name() {
        assert_eq!(ReplicationMethod::PseudoIncremental.catalog_name(), "FULL_TABLE");
        assert_eq!(ReplicationMethod::Incremental.catalog_name(), "INCREMENTAL");
        assert_eq!(ReplicationMethod::FullTable.catalog_name(), "FULL_TABLE");
        assert!(!ReplicationMethod::FullTable.uses_bookmark());
        assert!(ReplicationMethod::PseudoIncremental.uses_bookmark());
    }

    #[test]
    fn test_dependency_role_from_position() {
        assert_eq!(DependencyRole::from_position(true, true), DependencyRole::Root);
        assert_eq!(DependencyRole::from_position(true, false), DependencyRole::Leaf);
        assert_eq!(DependencyRole::from_position(false, true), DependencyRole::Parent);
        assert_eq!(DependencyRole::from_position(false, false), DependencyRole::Child);
        assert!(DependencyRole::Child.is_nested());
        assert!(!DependencyRole::Leaf.has_children());
    }

    #[test]
    fn test_option_string_none_if_empty() {
        assert_eq!(
            Some("test".to_string()).none_if_empty(),
            Some("test".to_string())
        );
        assert_eq!(Some("  ".to_string()).none_if_empty(), None);
        assert_eq!(None::<String>.none_if_empty(), None);
    }
}
