//! Replication strategies
//!
//! Every stream syncs through exactly one strategy, chosen by its
//! replication method:
//!
//! - `FullTableStrategy` emits everything and keeps no bookmark
//! - `IncrementalStrategy` filters server-side on the bookmark and keeps the
//!   newest cursor value seen
//! - `PseudoIncrementalStrategy` fetches everything and filters locally

use super::bookmarks;
use super::context::{StreamNode, StreamRuntime, SyncContext};
use crate::decode::RecordExtractor;
use crate::error::{Error, Result};
use crate::pagination::{PageRequest, Paginator};
use crate::state::{compare_bookmarks, format_timestamp, max_bookmark, value_as_timestamp};
use crate::streams::PSEUDO_CURSOR_FIELD;
use crate::template::PathContext;
use crate::types::{JsonValue, ReplicationMethod};
use async_trait::async_trait;
use chrono::{DateTime, Duration, Utc};
use std::cmp::Ordering;
use tracing::{debug, info, warn};

/// How a stream pulls records and tracks progress
#[async_trait]
pub trait ReplicationStrategy: Send + Sync + std::fmt::Debug {
    /// The method this strategy implements
    fn method(&self) -> ReplicationMethod;

    /// Sync `stream` once, under `parent` when nested
    ///
    /// Returns the number of records emitted for the stream itself.
    async fn sync(
        &self,
        stream: &mut StreamRuntime,
        ctx: &mut SyncContext<'_>,
        parent: Option<&JsonValue>,
    ) -> Result<u64>;
}

/// Strategy for a replication method
pub fn strategy_for(method: ReplicationMethod) -> Box<dyn ReplicationStrategy> {
    match method {
        ReplicationMethod::FullTable => Box::new(FullTableStrategy),
        ReplicationMethod::Incremental => Box::new(IncrementalStrategy),
        ReplicationMethod::PseudoIncremental => Box::new(PseudoIncrementalStrategy),
    }
}

// ============================================================================
// Full Table
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct FullTableStrategy;

#[async_trait]
impl ReplicationStrategy for FullTableStrategy {
    fn method(&self) -> ReplicationMethod {
        ReplicationMethod::FullTable
    }

    async fn sync(
        &self,
        stream: &mut StreamRuntime,
        ctx: &mut SyncContext<'_>,
        parent: Option<&JsonValue>,
    ) -> Result<u64> {
        let mut pages = open_pages(stream, ctx, parent, None)?;
        let mut emitted = 0;

        while let Some(page) = pages.next_page(ctx.executor).await? {
            ctx.stats_mut().add_page();
            for record in page {
                let hooked = apply_hook(stream, ctx, record, parent);
                let transformed = transform(stream, ctx, &hooked);
                emitted += emit_and_fan_out(stream, ctx, &hooked, transformed).await?;
            }
        }

        Ok(emitted)
    }
}

// ============================================================================
// Incremental
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct IncrementalStrategy;

#[async_trait]
impl ReplicationStrategy for IncrementalStrategy {
    fn method(&self) -> ReplicationMethod {
        ReplicationMethod::Incremental
    }

    async fn sync(
        &self,
        stream: &mut StreamRuntime,
        ctx: &mut SyncContext<'_>,
        parent: Option<&JsonValue>,
    ) -> Result<u64> {
        let def = stream.definition();
        let cursor = def.cursor_field().ok_or_else(|| {
            Error::config(format!("Stream {} has no replication key", def.id))
        })?;

        let bookmark = bookmarks::read_bookmark(stream, ctx.state, ctx.config);
        debug!("Stream {}: syncing from bookmark {}", def.id, bookmark);

        let mut pages = open_pages(stream, ctx, parent, Some(filter_value(&bookmark)))?;
        let mut max_seen = bookmark.clone();
        let mut emitted = 0;

        while let Some(page) = pages.next_page(ctx.executor).await? {
            ctx.stats_mut().add_page();
            for record in page {
                let hooked = apply_hook(stream, ctx, record, parent);
                let transformed = transform(stream, ctx, &hooked);

                let Some(value) = transformed.get(cursor).filter(|v| !v.is_null()).cloned() else {
                    warn!("Record in {} missing '{}' field, skipping", def.id, cursor);
                    continue;
                };
                if compare_bookmarks(&value, &bookmark) == Ordering::Less {
                    continue;
                }

                max_seen = max_bookmark(max_seen, value);
                emitted += emit_and_fan_out(stream, ctx, &hooked, transformed).await?;
            }
        }

        if bookmarks::write_bookmark(stream, ctx.state, max_seen.clone()) {
            debug!("Stream {}: bookmark advanced to {}", def.id, max_seen);
        }
        Ok(emitted)
    }
}

// ============================================================================
// Pseudo-Incremental
// ============================================================================

#[derive(Debug, Clone, Copy, Default)]
pub struct PseudoIncrementalStrategy;

impl PseudoIncrementalStrategy {
    /// Records at or before this instant are filtered out
    ///
    /// One second before the bookmark, so records sharing the bookmark's
    /// timestamp are emitted again rather than lost.
    pub fn threshold(stream: &StreamRuntime, ctx: &SyncContext<'_>) -> DateTime<Utc> {
        let base = ctx
            .state
            .get_bookmark(stream.id(), PSEUDO_CURSOR_FIELD)
            .and_then(value_as_timestamp)
            .unwrap_or(ctx.config.start_date);
        base - Duration::seconds(1)
    }
}

#[async_trait]
impl ReplicationStrategy for PseudoIncrementalStrategy {
    fn method(&self) -> ReplicationMethod {
        ReplicationMethod::PseudoIncremental
    }

    async fn sync(
        &self,
        stream: &mut StreamRuntime,
        ctx: &mut SyncContext<'_>,
        parent: Option<&JsonValue>,
    ) -> Result<u64> {
        let id = stream.id();
        let threshold = Self::threshold(stream, ctx);
        info!(
            "Starting pseudo-incremental sync for {}. Last bookmark: {}",
            id,
            format_timestamp(&threshold)
        );

        let mut pages = open_pages(stream, ctx, parent, None)?;
        let mut max_seen: Option<DateTime<Utc>> = None;
        let mut emitted = 0;

        while let Some(page) = pages.next_page(ctx.executor).await? {
            ctx.stats_mut().add_page();
            for record in page {
                let hooked = apply_hook(stream, ctx, record, parent);

                let Some(raw) = hooked.get(PSEUDO_CURSOR_FIELD).filter(|v| !v.is_null()) else {
                    warn!(
                        "Record in {} missing '{}' field, skipping",
                        id, PSEUDO_CURSOR_FIELD
                    );
                    continue;
                };
                let Some(updated) = value_as_timestamp(raw) else {
                    warn!("Record in {} has unparseable '{}' value {}, skipping", id, PSEUDO_CURSOR_FIELD, raw);
                    continue;
                };
                if updated <= threshold {
                    continue;
                }

                if max_seen.map_or(true, |max| updated > max) {
                    max_seen = Some(updated);
                }
                let transformed = transform(stream, ctx, &hooked);
                emitted += emit_and_fan_out(stream, ctx, &hooked, transformed).await?;
            }
        }

        match max_seen {
            Some(max) => {
                let value = JsonValue::String(format_timestamp(&max));
                if ctx.state.write_bookmark(id, PSEUDO_CURSOR_FIELD, value) {
                    ctx.checkpoint().await?;
                }
                info!(
                    "Completed sync for {}. Records emitted: {}. New bookmark: {}",
                    id,
                    emitted,
                    format_timestamp(&max)
                );
            }
            None => info!("Completed sync for {}. No new records found. Bookmark unchanged", id),
        }

        Ok(emitted)
    }
}

// ============================================================================
// Shared steps
// ============================================================================

/// Paginator for one sync of `stream`
fn open_pages(
    stream: &StreamRuntime,
    ctx: &SyncContext<'_>,
    parent: Option<&JsonValue>,
    filter: Option<String>,
) -> Result<Paginator> {
    let def = stream.definition();
    let path = def.resolve_path(ctx.config.app_id.as_deref(), parent)?;

    let mut request = PageRequest::get(path, def.page_size(ctx.config.page_size));
    if let (Some(param), Some(value)) = (def.filter_param, filter) {
        request = request.param(param, value);
    }

    Ok(Paginator::new(
        def.id,
        request,
        RecordExtractor::from_key(def.data_key),
    ))
}

fn filter_value(bookmark: &JsonValue) -> String {
    match bookmark {
        JsonValue::String(s) => s.clone(),
        other => other.to_string(),
    }
}

fn apply_hook(
    stream: &StreamRuntime,
    ctx: &SyncContext<'_>,
    record: JsonValue,
    parent: Option<&JsonValue>,
) -> JsonValue {
    let path_ctx = PathContext::new(ctx.config.app_id.as_deref(), parent);
    stream.definition().hook.apply(record, &path_ctx)
}

fn transform(stream: &StreamRuntime, ctx: &SyncContext<'_>, record: &JsonValue) -> JsonValue {
    ctx.transformer
        .transform(record.clone(), &stream.schema, stream.entry.as_ref())
}

/// Emit the record when selected, then run every attached child under it
///
/// Children see the hooked record, before transformation.
async fn emit_and_fan_out(
    stream: &mut StreamRuntime,
    ctx: &mut SyncContext<'_>,
    hooked: &JsonValue,
    transformed: JsonValue,
) -> Result<u64> {
    let mut emitted = 0;
    if stream.selected {
        ctx.emit_record(stream.id(), transformed).await?;
        emitted = 1;
    }
    sync_children(&mut stream.children, ctx, hooked).await?;
    Ok(emitted)
}

/// Sync every child under one parent record
///
/// A child refused with 403 is skipped; its siblings still run.
pub(crate) async fn sync_children(
    children: &mut [StreamNode],
    ctx: &mut SyncContext<'_>,
    parent: &JsonValue,
) -> Result<()> {
    for child in children.iter_mut() {
        ctx.announce_schema(&child.runtime)?;
        match child.sync(ctx, Some(parent)).await {
            Ok(count) => debug!(
                "Stream {}: {} records under parent {}",
                child.runtime.id(),
                count,
                parent_label(parent)
            ),
            Err(e) if e.is_forbidden() => {
                warn!(
                    "Skipping {} for parent record {}: {}",
                    child.runtime.id(),
                    parent_label(parent),
                    e
                );
                ctx.stats_mut().add_forbidden_skip();
            }
            Err(e) => return Err(e),
        }
    }
    Ok(())
}

fn parent_label(parent: &JsonValue) -> String {
    match parent.get("id") {
        Some(JsonValue::String(s)) => s.clone(),
        Some(other) => other.to_string(),
        None => "<no id>".to_string(),
    }
}
