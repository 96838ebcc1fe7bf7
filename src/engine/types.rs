//! Engine types

use std::collections::BTreeMap;

/// Sync statistics
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct SyncStats {
    /// Records emitted, all streams
    pub records_emitted: u64,
    /// Records emitted per stream
    pub records_by_stream: BTreeMap<String, u64>,
    /// Non-empty pages processed
    pub pages_fetched: u64,
    /// Top-level streams completed
    pub streams_synced: u64,
    /// Child syncs skipped on a forbidden response
    pub forbidden_skips: u64,
    /// STATE messages emitted
    pub checkpoints: u64,
    /// Duration in milliseconds
    pub duration_ms: u64,
}

impl SyncStats {
    /// Create new stats
    pub fn new() -> Self {
        Self::default()
    }

    /// Count one emitted record
    pub fn add_record(&mut self, stream: &str) {
        self.records_emitted += 1;
        *self.records_by_stream.entry(stream.to_string()).or_default() += 1;
    }

    /// Records emitted for `stream`
    pub fn records_for(&self, stream: &str) -> u64 {
        self.records_by_stream.get(stream).copied().unwrap_or(0)
    }

    /// Add a page
    pub fn add_page(&mut self) {
        self.pages_fetched += 1;
    }

    /// Add a stream
    pub fn add_stream(&mut self) {
        self.streams_synced += 1;
    }

    /// Add a skipped child sync
    pub fn add_forbidden_skip(&mut self) {
        self.forbidden_skips += 1;
    }

    /// Add a checkpoint
    pub fn add_checkpoint(&mut self) {
        self.checkpoints += 1;
    }

    /// Set duration
    pub fn set_duration(&mut self, ms: u64) {
        self.duration_ms = ms;
    }
}
