//! Shared fixtures for unit tests

use crate::config::TapConfig;
use crate::error::{Error, Result};
use crate::http::{RequestConfig, RequestExecutor};
use crate::types::{JsonValue, Method};
use async_trait::async_trait;
use serde_json::json;
use std::collections::VecDeque;
use std::sync::Mutex;

/// A request seen by [`ScriptedExecutor`]
#[derive(Debug, Clone)]
pub struct RecordedRequest {
    pub method: Method,
    pub path: String,
    pub request: RequestConfig,
}

impl RecordedRequest {
    pub fn param(&self, key: &str) -> Option<&str> {
        self.request.query.get(key).map(String::as_str)
    }
}

type Responder = Box<dyn Fn(&str, &RequestConfig) -> Option<Result<JsonValue>> + Send + Sync>;

/// Executor serving canned responses
///
/// Responses are taken from routes first (matched on path prefix), then from
/// the FIFO queue. Unmatched requests fail with a 404.
#[derive(Default)]
pub struct ScriptedExecutor {
    queue: Mutex<VecDeque<Result<JsonValue>>>,
    routes: Vec<Responder>,
    requests: Mutex<Vec<RecordedRequest>>,
}

impl ScriptedExecutor {
    pub fn new() -> Self {
        Self::default()
    }

    /// Queue responses served in order
    pub fn with_pages(pages: impl IntoIterator<Item = JsonValue>) -> Self {
        let executor = Self::new();
        for page in pages {
            executor.push(Ok(page));
        }
        executor
    }

    pub fn push(&self, response: Result<JsonValue>) {
        self.queue.lock().unwrap().push_back(response);
    }

    /// Serve `body` for every request whose path starts with `prefix`
    #[must_use]
    pub fn route(mut self, prefix: &str, body: JsonValue) -> Self {
        let prefix = prefix.to_string();
        self.routes.push(Box::new(move |path, _| {
            path.starts_with(&prefix).then(|| Ok(body.clone()))
        }));
        self
    }

    /// Fail every request whose path starts with `prefix`
    #[must_use]
    pub fn route_status(mut self, prefix: &str, status: u16) -> Self {
        let prefix = prefix.to_string();
        self.routes.push(Box::new(move |path, _| {
            path.starts_with(&prefix).then(|| Err(Error::api(status, None)))
        }));
        self
    }

    /// Serve a computed response for matching paths
    #[must_use]
    pub fn route_with<F>(mut self, prefix: &str, f: F) -> Self
    where
        F: Fn(&RequestConfig) -> JsonValue + Send + Sync + 'static,
    {
        let prefix = prefix.to_string();
        self.routes.push(Box::new(move |path, request| {
            path.starts_with(&prefix).then(|| Ok(f(request)))
        }));
        self
    }

    pub fn requests(&self) -> Vec<RecordedRequest> {
        self.requests.lock().unwrap().clone()
    }

    pub fn request_count(&self) -> usize {
        self.requests.lock().unwrap().len()
    }

    pub fn paths(&self) -> Vec<String> {
        self.requests().into_iter().map(|r| r.path).collect()
    }
}

#[async_trait]
impl RequestExecutor for ScriptedExecutor {
    async fn execute(
        &self,
        method: Method,
        path: &str,
        request: RequestConfig,
    ) -> Result<JsonValue> {
        self.requests.lock().unwrap().push(RecordedRequest {
            method,
            path: path.to_string(),
            request: request.clone(),
        });

        for route in &self.routes {
            if let Some(response) = route(path, &request) {
                return response;
            }
        }

        self.queue
            .lock()
            .unwrap()
            .pop_front()
            .unwrap_or_else(|| Err(Error::api(404, Some("no scripted response"))))
    }
}

/// `count` records with sequential ids starting at `first`
pub fn records(first: u64, count: u64) -> Vec<JsonValue> {
    (first..first + count)
        .map(|id| json!({"id": id, "name": format!("record {id}")}))
        .collect()
}

pub fn page(first: u64, count: u64) -> JsonValue {
    JsonValue::Array(records(first, count))
}

pub fn tap_config(page_size: u32) -> TapConfig {
    TapConfig::from_value(json!({
        "access_token": "tok",
        "realm_hostname": "acme.quickbase.com",
        "start_date": "2024-01-01T00:00:00Z",
        "app_id": "app1",
        "page_size": page_size,
        "checkpoint_interval": 1000
    }))
    .unwrap()
}
