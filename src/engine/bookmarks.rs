//! Bookmark reads and writes for incremental streams
//!
//! A stream that aggregates child bookmarks reads the minimum over its own
//! bookmark and those stored under each attached child, so a child that
//! joined later never misses records. Writes go to every one of those keys.

use super::context::StreamRuntime;
use crate::config::TapConfig;
use crate::state::{compare_bookmarks, StateStore};
use crate::types::JsonValue;

/// Bookmark an incremental stream syncs from
///
/// Nested streams compute it once per run and reuse it for every parent
/// record.
pub fn read_bookmark(stream: &mut StreamRuntime, state: &StateStore, config: &TapConfig) -> JsonValue {
    if stream.definition().aggregates_child_bookmarks {
        return aggregated_bookmark(stream, state, config);
    }

    if stream.role.is_nested() {
        if let Some(memo) = &stream.bookmark_memo {
            return memo.clone();
        }
        let value = own_bookmark(stream, state, config);
        stream.bookmark_memo = Some(value.clone());
        return value;
    }

    own_bookmark(stream, state, config)
}

/// The stream's own bookmark, or `start_date`
pub fn own_bookmark(stream: &StreamRuntime, state: &StateStore, config: &TapConfig) -> JsonValue {
    stream
        .definition()
        .cursor_field()
        .and_then(|field| state.get_bookmark(stream.id(), field))
        .cloned()
        .unwrap_or_else(|| config.start_date_bookmark())
}

/// Minimum of the own bookmark (when selected) and every attached child's
/// derived bookmark
pub fn aggregated_bookmark(
    stream: &StreamRuntime,
    state: &StateStore,
    config: &TapConfig,
) -> JsonValue {
    let Some(key) = stream.definition().child_bookmark_key() else {
        return own_bookmark(stream, state, config);
    };

    let own = stream
        .selected
        .then(|| own_bookmark(stream, state, config));
    let children = stream.children.iter().map(|child| {
        state
            .get_bookmark(child.runtime.id(), &key)
            .cloned()
            .unwrap_or_else(|| config.start_date_bookmark())
    });

    own.into_iter()
        .chain(children)
        .min_by(|a, b| compare_bookmarks(a, b))
        .unwrap_or_else(|| config.start_date_bookmark())
}

/// Record the bookmark an incremental stream reached
///
/// Each key only moves forward. Returns whether anything changed.
pub fn write_bookmark(stream: &StreamRuntime, state: &mut StateStore, value: JsonValue) -> bool {
    let def = stream.definition();
    let Some(field) = def.cursor_field() else {
        return false;
    };

    if !def.aggregates_child_bookmarks {
        return state.write_bookmark(def.id, field, value);
    }

    let mut changed = false;
    if stream.selected {
        changed |= state.write_bookmark(def.id, field, value.clone());
    }
    if let Some(key) = def.child_bookmark_key() {
        for child in &stream.children {
            changed |= state.write_bookmark(child.runtime.id(), &key, value.clone());
        }
    }
    changed
}
