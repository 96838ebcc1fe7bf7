//! Stream selection and the top-level sync loop

use super::context::{StreamNode, StreamRuntime, SyncContext};
use crate::catalog::Catalog;
use crate::error::Result;
use crate::streams::StreamKind;
use std::time::Instant;
use tracing::{info, warn};

/// Runs the selected streams of a catalog
#[derive(Debug)]
pub struct Orchestrator<'c> {
    catalog: &'c Catalog,
}

impl<'c> Orchestrator<'c> {
    pub fn new(catalog: &'c Catalog) -> Self {
        Self { catalog }
    }

    /// Selected streams in catalog order
    ///
    /// Ids the registry does not know are skipped with a warning.
    pub fn selected_streams(&self) -> Vec<StreamKind> {
        self.catalog
            .selected_streams()
            .into_iter()
            .filter_map(|id| {
                let kind = StreamKind::from_id(id);
                if kind.is_none() {
                    warn!("Catalog selects unknown stream {}, ignoring", id);
                }
                kind
            })
            .collect()
    }

    /// Selected streams followed by every ancestor they need
    ///
    /// Ancestors are appended transitively, so a grandchild pulls in both its
    /// parent and its root even when the root was selected ahead of it.
    pub fn streams_to_sync(&self) -> Vec<StreamKind> {
        let mut queue = self.selected_streams();
        let mut index = 0;
        while index < queue.len() {
            if let Some(parent) = queue[index].definition().parent {
                if !queue.contains(&parent) {
                    queue.push(parent);
                }
            }
            index += 1;
        }
        queue
    }

    /// Build the tree under a top-level stream
    ///
    /// Only children present in `needed` are attached, recursively.
    pub fn build_tree(&self, kind: StreamKind, needed: &[StreamKind]) -> StreamNode {
        self.build_node(kind, needed, true)
    }

    fn build_node(&self, kind: StreamKind, needed: &[StreamKind], top_level: bool) -> StreamNode {
        let children = kind
            .definition()
            .children
            .iter()
            .filter(|child| needed.contains(child))
            .map(|child| self.build_node(*child, needed, false))
            .collect();

        let entry = self.catalog.get(kind.id()).cloned();
        StreamNode::new(StreamRuntime::new(kind, entry).with_children(children, top_level))
    }

    /// Sync every selected stream
    ///
    /// A selected child whose parent is not selected pulls the parent in;
    /// the parent runs unselected so only the child's records are emitted.
    /// Returns the number of records emitted by top-level streams.
    pub async fn run(&self, ctx: &mut SyncContext<'_>) -> Result<u64> {
        let started = Instant::now();
        let queue = self.streams_to_sync();
        info!(
            "streams to sync: {:?}",
            queue.iter().map(|k| k.id()).collect::<Vec<_>>()
        );
        if let Some(last) = ctx.state.currently_syncing() {
            info!("last/currently syncing stream: {}", last);
        }
        if !ctx.state.state().has_bookmarks() {
            info!("No bookmarks in state, syncing from start_date");
        }

        let mut total = 0;
        for &kind in &queue {
            if kind.definition().parent.is_some() {
                continue;
            }

            let mut node = self.build_tree(kind, &queue);
            ctx.announce_schema(&node.runtime)?;

            info!("START Syncing: {}", kind);
            ctx.state.set_currently_syncing(Some(kind.id()));
            ctx.checkpoint().await?;

            let count = node.sync(ctx, None).await?;

            ctx.state.set_currently_syncing(None);
            ctx.checkpoint().await?;
            ctx.stats_mut().add_stream();
            info!("FINISHED Syncing: {}, total_records: {}", kind, count);
            total += count;
        }

        ctx.flush()?;
        let elapsed = u64::try_from(started.elapsed().as_millis()).unwrap_or(u64::MAX);
        ctx.stats_mut().set_duration(elapsed);
        Ok(total)
    }
}
