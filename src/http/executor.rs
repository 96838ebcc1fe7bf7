//! The request boundary used by the sync engine
//!
//! Pagination and replication only ever talk to a [`RequestExecutor`]: one
//! call in, parsed JSON out, typed errors for non-success responses. Retries
//! and throttling stay behind this trait.

use crate::error::Result;
use crate::types::{JsonValue, Method};
use async_trait::async_trait;
use std::collections::HashMap;
use std::time::Duration;

/// Configuration for a single request
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RequestConfig {
    /// Query parameters
    pub query: HashMap<String, String>,
    /// Request headers
    pub headers: HashMap<String, String>,
    /// Request body (JSON)
    pub body: Option<JsonValue>,
    /// Override timeout for this request
    pub timeout: Option<Duration>,
}

impl RequestConfig {
    /// Create a new request config
    pub fn new() -> Self {
        Self::default()
    }

    /// Add a query parameter
    #[must_use]
    pub fn query(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.query.insert(key.into(), value.into());
        self
    }

    /// Merge a set of query parameters, later values winning
    #[must_use]
    pub fn queries<I, K, V>(mut self, params: I) -> Self
    where
        I: IntoIterator<Item = (K, V)>,
        K: Into<String>,
        V: Into<String>,
    {
        for (key, value) in params {
            self.query.insert(key.into(), value.into());
        }
        self
    }

    /// Add a header
    #[must_use]
    pub fn header(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.headers.insert(key.into(), value.into());
        self
    }

    /// Set JSON body
    #[must_use]
    pub fn json(mut self, body: JsonValue) -> Self {
        self.body = Some(body);
        self
    }

    /// Set timeout
    #[must_use]
    pub fn timeout(mut self, timeout: Duration) -> Self {
        self.timeout = Some(timeout);
        self
    }
}

/// Performs one logical request against the upstream API
///
/// Implementations return the parsed JSON body on success and
/// [`crate::Error::Api`] for any non-success status once retries are
/// exhausted.
#[async_trait]
pub trait RequestExecutor: Send + Sync {
    /// Execute a request against `path` (relative to the base URL, or absolute)
    async fn execute(&self, method: Method, path: &str, request: RequestConfig)
        -> Result<JsonValue>;
}
