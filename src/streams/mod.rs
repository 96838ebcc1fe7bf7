//! Stream registry
//!
//! ```text
//! apps ─┬─ events
//!       ├─ roles
//!       └─ app_tables ─┬─ tables
//!                      ├─ table_relationships
//!                      ├─ table_reports ── reports
//!                      ├─ fields ── get_fields
//!                      └─ fields_usage ── get_field_usage
//! ```

mod hooks;
mod registry;

pub use hooks::RecordHook;
pub use registry::{
    StreamDefinition, StreamKind, PSEUDO_CURSOR_FIELD, UPDATED_SINCE_PARAM,
};
