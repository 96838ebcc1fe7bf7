//! State store implementation
//!
//! Provides file-based state persistence with atomic writes. The store is
//! owned by the running sync and handed around by `&mut`.

use super::types::State;
use crate::error::{Error, Result};
use crate::types::JsonValue;
use std::path::{Path, PathBuf};

/// Owner of the run's bookmarks
#[derive(Debug, Clone, Default)]
pub struct StateStore {
    /// Path to the state file, if persisted
    path: Option<PathBuf>,
    /// Current state
    state: State,
}

impl StateStore {
    /// Create an in-memory store (no file persistence)
    pub fn in_memory() -> Self {
        Self::default()
    }

    /// Create a store backed by `path`, loading existing state if present
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();
        let state = if path.exists() {
            let contents = std::fs::read_to_string(&path)
                .map_err(|e| Error::state(format!("Failed to read state file: {e}")))?;
            parse_state(&contents)?
        } else {
            State::new()
        };

        Ok(Self {
            path: Some(path),
            state,
        })
    }

    /// Create an in-memory store from a JSON string
    pub fn from_json(json: &str) -> Result<Self> {
        Ok(Self {
            path: None,
            state: parse_state(json)?,
        })
    }

    /// Persist future checkpoints to `path`
    #[must_use]
    pub fn with_path(mut self, path: impl AsRef<Path>) -> Self {
        self.path = Some(path.as_ref().to_path_buf());
        self
    }

    /// The current state
    pub fn state(&self) -> &State {
        &self.state
    }

    /// Get a bookmark value
    pub fn get_bookmark(&self, stream: &str, key: &str) -> Option<&JsonValue> {
        self.state.get_bookmark(stream, key)
    }

    /// Write a bookmark, never moving it backwards
    pub fn write_bookmark(&mut self, stream: &str, key: &str, value: JsonValue) -> bool {
        self.state.write_bookmark(stream, key, value)
    }

    /// Stream recorded as in progress
    pub fn currently_syncing(&self) -> Option<&str> {
        self.state.currently_syncing.as_deref()
    }

    /// Set or clear the in-progress marker
    pub fn set_currently_syncing(&mut self, stream: Option<&str>) {
        self.state.currently_syncing = stream.map(ToString::to_string);
    }

    /// State as a JSON value, for STATE messages
    pub fn to_value(&self) -> Result<JsonValue> {
        serde_json::to_value(&self.state)
            .map_err(|e| Error::state(format!("Failed to serialize state: {e}")))
    }

    /// Save current state to file
    pub async fn save(&self) -> Result<()> {
        let Some(path) = &self.path else {
            return Ok(()); // In-memory mode
        };

        let contents = serde_json::to_string_pretty(&self.state)
            .map_err(|e| Error::state(format!("Failed to serialize state: {e}")))?;

        // Write to temp file first, then rename for atomicity
        let temp_path = path.with_extension("tmp");
        tokio::fs::write(&temp_path, &contents)
            .await
            .map_err(|e| Error::state(format!("Failed to write state file: {e}")))?;

        tokio::fs::rename(&temp_path, path)
            .await
            .map_err(|e| Error::state(format!("Failed to rename state file: {e}")))?;

        Ok(())
    }

    /// Get the state file path
    pub fn path(&self) -> Option<&Path> {
        self.path.as_deref()
    }

    /// Check if using in-memory mode
    pub fn is_in_memory(&self) -> bool {
        self.path.is_none()
    }
}

fn parse_state(contents: &str) -> Result<State> {
    if contents.trim().is_empty() {
        return Ok(State::new());
    }
    serde_json::from_str(contents).map_err(|e| Error::state(format!("Failed to parse state: {e}")))
}
