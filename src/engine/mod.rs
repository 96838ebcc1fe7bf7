//! Sync engine
//!
//! Walks the selected streams, syncs each top-level stream through its
//! replication strategy, and fans every parent record out to the attached
//! children before moving on to the next one.
//!
//! # Overview
//!
//! ```text
//! Orchestrator ── StreamNode (apps, Root)
//!                   ├─ StreamNode (events, Child)
//!                   └─ StreamNode (app_tables, Parent)
//!                        └─ StreamNode (tables, Child)
//! ```
//!
//! The engine module provides:
//! - `Orchestrator` - stream selection and the top-level loop
//! - `SyncContext` - executor, state, sink and transformer for one run
//! - `ReplicationStrategy` - full-table, incremental and pseudo-incremental syncs
//! - `SyncStats` - counters for the run

pub mod bookmarks;
mod context;
mod orchestrator;
mod strategies;
mod types;

pub use context::{StreamNode, StreamRuntime, SyncContext};
pub use orchestrator::Orchestrator;
pub use strategies::{
    strategy_for, FullTableStrategy, IncrementalStrategy, PseudoIncrementalStrategy,
    ReplicationStrategy,
};
pub use types::SyncStats;
