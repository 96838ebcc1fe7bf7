//! Static stream definitions
//!
//! The set of streams is closed: every stream is a [`StreamKind`] and its
//! capabilities live in one table.

use super::hooks::RecordHook;
use crate::error::{Error, Result};
use crate::template::{self, PathContext};
use crate::types::{JsonValue, ReplicationMethod};
use serde_json::json;
use std::fmt;
use std::str::FromStr;

/// Server-side filter parameter for incremental streams
pub const UPDATED_SINCE_PARAM: &str = "updated_since";

/// Every stream this tap can extract
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StreamKind {
    Apps,
    Events,
    Roles,
    AppTables,
    Tables,
    TableRelationships,
    TableReports,
    Reports,
    Fields,
    FieldsUsage,
    GetFields,
    GetFieldUsage,
}

impl StreamKind {
    /// All streams, parents before their children
    pub const ALL: [StreamKind; 12] = [
        StreamKind::Apps,
        StreamKind::Events,
        StreamKind::Roles,
        StreamKind::AppTables,
        StreamKind::Tables,
        StreamKind::TableRelationships,
        StreamKind::TableReports,
        StreamKind::Reports,
        StreamKind::Fields,
        StreamKind::FieldsUsage,
        StreamKind::GetFields,
        StreamKind::GetFieldUsage,
    ];

    /// The stream's static definition
    pub fn definition(self) -> &'static StreamDefinition {
        // DEFINITIONS is laid out in declaration order
        &DEFINITIONS[self as usize]
    }

    /// Stream identifier
    pub fn id(self) -> &'static str {
        self.definition().id
    }

    /// Look up a stream by identifier
    pub fn from_id(id: &str) -> Option<Self> {
        Self::ALL.into_iter().find(|kind| kind.id() == id)
    }
}

impl fmt::Display for StreamKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.id())
    }
}

impl FromStr for StreamKind {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        Self::from_id(s).ok_or_else(|| Error::stream_not_found(s))
    }
}

/// Capabilities of one stream
#[derive(Debug)]
pub struct StreamDefinition {
    pub kind: StreamKind,
    pub id: &'static str,
    pub key_properties: &'static [&'static str],
    pub method: ReplicationMethod,
    /// Cursor fields, empty for full-table streams
    pub replication_keys: &'static [&'static str],
    /// Path template relative to the base URL
    pub path: &'static str,
    pub parent: Option<StreamKind>,
    pub children: &'static [StreamKind],
    /// Key holding the records in the response envelope
    pub data_key: Option<&'static str>,
    /// Endpoint returns one resource, no paging parameters
    pub single_resource: bool,
    pub hook: RecordHook,
    /// Server-side filter parameter carrying the bookmark
    pub filter_param: Option<&'static str>,
    /// Read the bookmark as the minimum over attached children
    pub aggregates_child_bookmarks: bool,
    /// Path needs the configured `app_id`
    pub requires_app_id: bool,
}

impl StreamDefinition {
    /// Primary cursor field
    pub fn cursor_field(&self) -> Option<&'static str> {
        self.replication_keys.first().copied()
    }

    /// Page size for requests, `None` for single resources
    pub fn page_size(&self, configured: u32) -> Option<u32> {
        (!self.single_resource).then_some(configured)
    }

    /// Resolve the request path for an optional parent record
    pub fn resolve_path(&self, app_id: Option<&str>, parent: Option<&JsonValue>) -> Result<String> {
        if self.requires_app_id && app_id.is_none() {
            return Err(Error::config(format!(
                "app_id is required in config to sync {}",
                self.id
            )));
        }
        template::render(self.path, &PathContext::new(app_id, parent))
    }

    /// Key under which a child stores this stream's aggregated bookmark
    ///
    /// `apps` with cursor `updated` gives `apps_updated`.
    pub fn child_bookmark_key(&self) -> Option<String> {
        self.cursor_field()
            .map(|field| format!("{}_{}", self.id, field))
    }

    /// Permissive schema used when no catalog schema is available
    pub fn default_schema(&self) -> JsonValue {
        let mut properties = serde_json::Map::new();
        for key in self.key_properties {
            let schema = if *key == "tableId" {
                json!({"type": ["null", "string"]})
            } else {
                json!({"type": ["null", "string", "integer"]})
            };
            properties.insert((*key).to_string(), schema);
        }
        for key in self.cursor_fields_in_records() {
            properties.insert(
                key.to_string(),
                json!({"type": ["null", "string"], "format": "date-time"}),
            );
        }

        json!({
            "type": ["null", "object"],
            "properties": properties,
            "additionalProperties": true
        })
    }

    /// Timestamp fields the stream orders by, including local-only cursors
    fn cursor_fields_in_records(&self) -> &'static [&'static str] {
        match self.method {
            ReplicationMethod::FullTable => &[],
            ReplicationMethod::Incremental => self.replication_keys,
            ReplicationMethod::PseudoIncremental => &[PSEUDO_CURSOR_FIELD],
        }
    }
}

/// Field pseudo-incremental streams filter on
pub const PSEUDO_CURSOR_FIELD: &str = "updated";

const ID_KEY: &[&str] = &["id"];
const TABLE_ID_KEY: &[&str] = &["tableId", "id"];
const UPDATED: &[&str] = &["updated"];

static DEFINITIONS: [StreamDefinition; 12] = [
    StreamDefinition {
        kind: StreamKind::Apps,
        id: "apps",
        key_properties: ID_KEY,
        method: ReplicationMethod::Incremental,
        replication_keys: UPDATED,
        path: "v1/apps/{appId}",
        parent: None,
        children: &[StreamKind::Events, StreamKind::Roles, StreamKind::AppTables],
        data_key: None,
        single_resource: true,
        hook: RecordHook::None,
        filter_param: Some(UPDATED_SINCE_PARAM),
        aggregates_child_bookmarks: true,
        requires_app_id: true,
    },
    StreamDefinition {
        kind: StreamKind::Events,
        id: "events",
        key_properties: ID_KEY,
        method: ReplicationMethod::FullTable,
        replication_keys: &[],
        path: "v1/apps/{appId}/events",
        parent: Some(StreamKind::Apps),
        children: &[],
        data_key: None,
        single_resource: false,
        hook: RecordHook::None,
        filter_param: None,
        aggregates_child_bookmarks: false,
        requires_app_id: false,
    },
    StreamDefinition {
        kind: StreamKind::Roles,
        id: "roles",
        key_properties: ID_KEY,
        method: ReplicationMethod::FullTable,
        replication_keys: &[],
        path: "v1/apps/{appId}/roles",
        parent: Some(StreamKind::Apps),
        children: &[],
        data_key: None,
        single_resource: false,
        hook: RecordHook::None,
        filter_param: None,
        aggregates_child_bookmarks: false,
        requires_app_id: false,
    },
    StreamDefinition {
        kind: StreamKind::AppTables,
        id: "app_tables",
        key_properties: ID_KEY,
        method: ReplicationMethod::PseudoIncremental,
        replication_keys: &[],
        path: "v1/tables?appId={appId}",
        parent: Some(StreamKind::Apps),
        children: &[
            StreamKind::Tables,
            StreamKind::TableRelationships,
            StreamKind::TableReports,
            StreamKind::Fields,
            StreamKind::FieldsUsage,
        ],
        data_key: None,
        single_resource: false,
        hook: RecordHook::None,
        filter_param: None,
        aggregates_child_bookmarks: false,
        requires_app_id: false,
    },
    StreamDefinition {
        kind: StreamKind::Tables,
        id: "tables",
        key_properties: ID_KEY,
        method: ReplicationMethod::Incremental,
        replication_keys: UPDATED,
        path: "v1/tables/{tableId}?appId={appId}",
        parent: Some(StreamKind::AppTables),
        children: &[],
        data_key: None,
        single_resource: true,
        hook: RecordHook::None,
        filter_param: Some(UPDATED_SINCE_PARAM),
        aggregates_child_bookmarks: false,
        requires_app_id: false,
    },
    StreamDefinition {
        kind: StreamKind::TableRelationships,
        id: "table_relationships",
        key_properties: ID_KEY,
        method: ReplicationMethod::FullTable,
        replication_keys: &[],
        path: "v1/tables/{tableId}/relationships",
        parent: Some(StreamKind::AppTables),
        children: &[],
        data_key: Some("relationships"),
        single_resource: false,
        hook: RecordHook::None,
        filter_param: None,
        aggregates_child_bookmarks: false,
        requires_app_id: false,
    },
    StreamDefinition {
        kind: StreamKind::TableReports,
        id: "table_reports",
        key_properties: TABLE_ID_KEY,
        method: ReplicationMethod::FullTable,
        replication_keys: &[],
        path: "v1/reports?tableId={tableId}",
        parent: Some(StreamKind::AppTables),
        children: &[StreamKind::Reports],
        data_key: None,
        single_resource: false,
        hook: RecordHook::InjectTableId,
        filter_param: None,
        aggregates_child_bookmarks: false,
        requires_app_id: false,
    },
    StreamDefinition {
        kind: StreamKind::Reports,
        id: "reports",
        key_properties: &["id", "tableId"],
        method: ReplicationMethod::FullTable,
        replication_keys: &[],
        path: "v1/reports/{reportId}?tableId={tableId}",
        parent: Some(StreamKind::TableReports),
        children: &[],
        data_key: None,
        single_resource: true,
        hook: RecordHook::InjectTableId,
        filter_param: None,
        aggregates_child_bookmarks: false,
        requires_app_id: false,
    },
    StreamDefinition {
        kind: StreamKind::Fields,
        id: "fields",
        key_properties: TABLE_ID_KEY,
        method: ReplicationMethod::FullTable,
        replication_keys: &[],
        path: "v1/fields?tableId={tableId}",
        parent: Some(StreamKind::AppTables),
        children: &[StreamKind::GetFields],
        data_key: None,
        single_resource: false,
        hook: RecordHook::InjectTableId,
        filter_param: None,
        aggregates_child_bookmarks: false,
        requires_app_id: false,
    },
    StreamDefinition {
        kind: StreamKind::FieldsUsage,
        id: "fields_usage",
        key_properties: TABLE_ID_KEY,
        method: ReplicationMethod::FullTable,
        replication_keys: &[],
        path: "v1/fields/usage?tableId={tableId}",
        parent: Some(StreamKind::AppTables),
        children: &[StreamKind::GetFieldUsage],
        data_key: None,
        single_resource: false,
        hook: RecordHook::FlattenAndInjectTableId,
        filter_param: None,
        aggregates_child_bookmarks: false,
        requires_app_id: false,
    },
    StreamDefinition {
        kind: StreamKind::GetFields,
        id: "get_fields",
        key_properties: ID_KEY,
        method: ReplicationMethod::FullTable,
        replication_keys: &[],
        path: "v1/fields/{fieldId}?tableId={tableId}",
        parent: Some(StreamKind::Fields),
        children: &[],
        data_key: None,
        single_resource: true,
        hook: RecordHook::None,
        filter_param: None,
        aggregates_child_bookmarks: false,
        requires_app_id: false,
    },
    StreamDefinition {
        kind: StreamKind::GetFieldUsage,
        id: "get_field_usage",
        key_properties: ID_KEY,
        method: ReplicationMethod::FullTable,
        replication_keys: &[],
        path: "v1/fields/usage/{fieldId}?tableId={tableId}",
        parent: Some(StreamKind::FieldsUsage),
        children: &[],
        data_key: None,
        single_resource: true,
        hook: RecordHook::FlattenFieldUsage,
        filter_param: None,
        aggregates_child_bookmarks: false,
        requires_app_id: false,
    },
];
