//! Response decoding
//!
//! Turns a parsed response body into the records of one page, and reads the
//! pieces of a record that pagination cares about.
//!
//! Response shapes seen upstream:
//! - a bare JSON array of records
//! - an envelope object with the records under a key (`relationships`, ...)
//!   and optional `metadata.totalRecords`
//! - a single resource object

mod extract;

pub use extract::{record_identity, total_records, RecordExtractor};
