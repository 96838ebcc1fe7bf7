// Allow common clippy pedantic lints that aren't critical for this codebase
#![allow(clippy::cast_possible_truncation)]
#![allow(clippy::cast_sign_loss)]
#![allow(clippy::cast_lossless)]
#![allow(clippy::too_many_lines)]
#![allow(clippy::ref_option)]
#![allow(clippy::unused_self)]
#![allow(clippy::struct_excessive_bools)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::items_after_statements)]
#![allow(clippy::unnecessary_wraps)]
#![allow(clippy::match_same_arms)]
#![allow(clippy::match_wildcard_for_single_variants)]
#![allow(clippy::needless_pass_by_value)]
#![allow(clippy::unused_async)]

//! # quickbase-tap
//!
//! Extracts application metadata from the Quickbase REST API (apps, tables,
//! fields, reports and their usage) as a stream of SCHEMA, RECORD and STATE
//! messages, one JSON document per line.
//!
//! ## Features
//!
//! - **Three replication modes**: full table, server-side incremental, and
//!   pseudo-incremental with local filtering
//! - **Parent/child streams**: child streams run once per parent record
//! - **Self-terminating pagination**: repeated pages and duplicate records end the
//!   enumeration instead of looping
//! - **Resumable state**: bookmarks persisted atomically at checkpoints
//!
//! ## Quick Start
//!
//! ```rust,ignore
//! use quickbase_tap::catalog::discover;
//! use quickbase_tap::config::TapConfig;
//! use quickbase_tap::engine::{Orchestrator, SyncContext};
//! use quickbase_tap::http::HttpClient;
//! use quickbase_tap::output::JsonLinesSink;
//! use quickbase_tap::state::StateStore;
//! use quickbase_tap::transform::SchemaTransformer;
//!
//! let config = TapConfig::from_file("config.json")?;
//! let catalog = discover().select_all();
//! let client = HttpClient::from_tap_config(&config)?;
//! let mut state = StateStore::from_file("state.json")?;
//! let mut sink = JsonLinesSink::stdout();
//!
//! let mut ctx = SyncContext::new(&client, &config, &mut state, &SchemaTransformer, &mut sink);
//! Orchestrator::new(&catalog).run(&mut ctx).await?;
//! ```
//!
//! ## Architecture
//!
//! ```text
//! ┌─────────────────────────────────────────────────────────────────┐
//! │                          Orchestrator                           │
//! │  selection → stream tree → SCHEMA / RECORD / STATE messages     │
//! └─────────────────────────────────────────────────────────────────┘
//!                                │
//! ┌──────────┬───────────┬───────┴───────┬───────────┬─────────────┐
//! │ Streams  │   HTTP    │   Paginate    │   State   │   Output    │
//! ├──────────┼───────────┼───────────────┼───────────┼─────────────┤
//! │ Registry │ GET/POST  │ skip/top      │ Bookmarks │ JSON lines  │
//! │ Hooks    │ Retry     │ Dedup         │ Max-wins  │ Catalog     │
//! │ Paths    │ Rate Limit│ Page repeats  │ Atomic IO │ Transform   │
//! └──────────┴───────────┴───────────────┴───────────┴─────────────┘
//! ```

#![warn(clippy::all)]
#![warn(clippy::pedantic)]
#![allow(clippy::module_name_repetitions)]
#![allow(clippy::must_use_candidate)]
#![allow(clippy::missing_errors_doc)]
#![allow(clippy::missing_panics_doc)]
#![allow(clippy::doc_markdown)]

// ============================================================================
// Module declarations
// ============================================================================

/// Error types for the tap
pub mod error;

/// Common types and type aliases
pub mod types;

/// Tap configuration
pub mod config;

/// URL path templates
pub mod template;

/// HTTP client with retry and rate limiting
pub mod http;

/// Response decoding
pub mod decode;

/// Offset pagination
pub mod pagination;

/// Bookmarks and state persistence
pub mod state;

/// Stream registry
pub mod streams;

/// Catalog and discovery
pub mod catalog;

/// Schema-driven record transformation
pub mod transform;

/// Message output
pub mod output;

/// Sync engine
pub mod engine;

/// Command-line interface
pub mod cli;

#[cfg(test)]
mod test_support;

// ============================================================================
// Re-exports
// ============================================================================

pub use error::{Error, Result};
pub use types::*;

/// Crate version
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

/// Crate name
pub const NAME: &str = env!("CARGO_PKG_NAME");
