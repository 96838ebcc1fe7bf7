//! Output module
//!
//! Serializes the sync's message stream.
//!
//! # Overview
//!
//! This module provides:
//! - `Message` - SCHEMA, RECORD and STATE messages
//! - `MessageSink` - where messages go
//! - `JsonLinesSink` - one JSON document per line, normally on stdout
//! - `CollectingSink` - in-memory sink for inspection

mod types;
mod writer;

pub use types::Message;
pub use writer::{CollectingSink, JsonLinesSink, MessageSink};

#[cfg(test)]
mod tests;
