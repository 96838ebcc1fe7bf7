//! Per-run sync context and the stream tree

use super::strategies::{strategy_for, ReplicationStrategy};
use super::types::SyncStats;
use crate::catalog::CatalogEntry;
use crate::config::TapConfig;
use crate::error::Result;
use crate::http::RequestExecutor;
use crate::output::{Message, MessageSink};
use crate::state::StateStore;
use crate::streams::{StreamDefinition, StreamKind};
use crate::transform::Transformer;
use crate::types::{DependencyRole, JsonValue, ReplicationMethod};
use std::collections::HashSet;
use tracing::debug;

/// Everything a running sync shares
///
/// Owns the run's mutable pieces by `&mut`: there is one state store, one
/// sink and one schema ledger per run.
pub struct SyncContext<'a> {
    pub executor: &'a dyn RequestExecutor,
    pub config: &'a TapConfig,
    pub state: &'a mut StateStore,
    pub transformer: &'a dyn Transformer,
    sink: &'a mut dyn MessageSink,
    announced: HashSet<StreamKind>,
    since_checkpoint: u64,
    stats: SyncStats,
}

impl<'a> SyncContext<'a> {
    pub fn new(
        executor: &'a dyn RequestExecutor,
        config: &'a TapConfig,
        state: &'a mut StateStore,
        transformer: &'a dyn Transformer,
        sink: &'a mut dyn MessageSink,
    ) -> Self {
        Self {
            executor,
            config,
            state,
            transformer,
            sink,
            announced: HashSet::new(),
            since_checkpoint: 0,
            stats: SyncStats::new(),
        }
    }

    /// Emit the stream's SCHEMA message, once per run and only when selected
    pub fn announce_schema(&mut self, stream: &StreamRuntime) -> Result<()> {
        if !stream.selected || !self.announced.insert(stream.kind) {
            return Ok(());
        }

        let def = stream.definition();
        let bookmark_properties: &[&str] = match def.method {
            ReplicationMethod::Incremental => def.replication_keys,
            ReplicationMethod::FullTable | ReplicationMethod::PseudoIncremental => &[],
        };
        self.sink.emit(&Message::schema(
            def.id,
            stream.schema.clone(),
            def.key_properties,
            bookmark_properties,
        ))
    }

    /// Emit one record, checkpointing every `checkpoint_interval` records
    pub async fn emit_record(&mut self, stream: &str, record: JsonValue) -> Result<()> {
        self.sink.emit(&Message::record(stream, record))?;
        self.stats.add_record(stream);
        self.since_checkpoint += 1;

        if self.config.checkpoint_interval > 0
            && self.since_checkpoint >= self.config.checkpoint_interval
        {
            debug!("Periodic checkpoint after {} records", self.since_checkpoint);
            self.checkpoint().await?;
        }
        Ok(())
    }

    /// Persist the state and emit it as a STATE message
    pub async fn checkpoint(&mut self) -> Result<()> {
        self.state.save().await?;
        let value = self.state.to_value()?;
        self.sink.emit(&Message::state(value))?;
        self.since_checkpoint = 0;
        self.stats.add_checkpoint();
        Ok(())
    }

    /// Flush the sink
    pub fn flush(&mut self) -> Result<()> {
        self.sink.flush()
    }

    pub fn stats(&self) -> &SyncStats {
        &self.stats
    }

    pub fn stats_mut(&mut self) -> &mut SyncStats {
        &mut self.stats
    }
}

impl std::fmt::Debug for SyncContext<'_> {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SyncContext")
            .field("announced", &self.announced)
            .field("since_checkpoint", &self.since_checkpoint)
            .field("stats", &self.stats)
            .finish_non_exhaustive()
    }
}

/// A stream as it runs: its definition plus what this run decided about it
#[derive(Debug)]
pub struct StreamRuntime {
    pub kind: StreamKind,
    pub schema: JsonValue,
    pub entry: Option<CatalogEntry>,
    pub selected: bool,
    pub role: DependencyRole,
    pub children: Vec<StreamNode>,
    /// Bookmark computed once per run for nested incremental streams
    pub(crate) bookmark_memo: Option<JsonValue>,
}

impl StreamRuntime {
    /// Runtime for `kind`, using the catalog entry's schema and selection
    ///
    /// Without an entry the registry's default schema is used and the
    /// stream runs unselected.
    pub fn new(kind: StreamKind, entry: Option<CatalogEntry>) -> Self {
        let schema = entry
            .as_ref()
            .map(|e| e.schema.clone())
            .filter(|s| !s.is_null())
            .unwrap_or_else(|| kind.definition().default_schema());
        let selected = entry.as_ref().is_some_and(CatalogEntry::is_selected);

        Self {
            kind,
            schema,
            entry,
            selected,
            role: DependencyRole::Leaf,
            children: Vec::new(),
            bookmark_memo: None,
        }
    }

    /// Attach children and derive the role from tree position
    #[must_use]
    pub fn with_children(mut self, children: Vec<StreamNode>, top_level: bool) -> Self {
        self.role = DependencyRole::from_position(top_level, !children.is_empty());
        self.children = children;
        self
    }

    pub fn definition(&self) -> &'static StreamDefinition {
        self.kind.definition()
    }

    pub fn id(&self) -> &'static str {
        self.kind.id()
    }
}

/// A stream paired with the strategy that syncs it
#[derive(Debug)]
pub struct StreamNode {
    pub strategy: Box<dyn ReplicationStrategy>,
    pub runtime: StreamRuntime,
}

impl StreamNode {
    pub fn new(runtime: StreamRuntime) -> Self {
        Self {
            strategy: strategy_for(runtime.definition().method),
            runtime,
        }
    }

    /// Sync the stream under an optional parent record
    pub async fn sync(
        &mut self,
        ctx: &mut SyncContext<'_>,
        parent: Option<&JsonValue>,
    ) -> Result<u64> {
        self.strategy.sync(&mut self.runtime, ctx, parent).await
    }

    /// Ids of this stream and every attached descendant, depth first
    pub fn stream_ids(&self) -> Vec<&'static str> {
        let mut ids = vec![self.runtime.id()];
        for child in &self.runtime.children {
            ids.extend(child.stream_ids());
        }
        ids
    }
}
