//! State management module
//!
//! Handles bookmark tracking, checkpointing, and resumability.
//! State is persisted between sync runs to enable incremental syncs.
//!
//! # Overview
//!
//! The state module provides:
//! - `State` - Bookmarks per stream plus the "currently syncing" marker
//! - `StateStore` - Owned, file-backed persistence with atomic writes
//! - Bookmark ordering and timestamp helpers

mod bookmark;
mod manager;
mod types;

pub use bookmark::{
    compare_bookmarks, format_timestamp, max_bookmark, parse_timestamp, value_as_timestamp,
};
pub use manager::StateStore;
pub use types::{State, StreamBookmarks};
