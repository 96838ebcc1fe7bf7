//! Catalog module
//!
//! The catalog tells a sync which streams and fields to emit. Discovery
//! builds one from the stream registry; a sync reads one back from disk.
//!
//! Selection lives in the metadata list of each entry:
//!
//! ```text
//! breadcrumb []                     -> stream-level: selected, table-key-properties, ...
//! breadcrumb ["properties", "name"] -> field-level: selected, inclusion
//! ```

mod discover;
mod types;

pub use discover::discover;
pub use types::{Catalog, CatalogEntry, Inclusion, MetadataEntry};
