//! Tap configuration
//!
//! The config file is a flat JSON object. Required keys are validated up
//! front so that a run never starts with a half-usable client.

use crate::error::{Error, Result};
use crate::types::{JsonValue, OptionStringExt};
use chrono::{DateTime, Utc};
use serde::Deserialize;
use std::path::Path;
use std::time::Duration;

/// Default Quickbase REST endpoint
pub const DEFAULT_BASE_URL: &str = "https://api.quickbase.com";

/// Records fetched per request
pub const DEFAULT_PAGE_SIZE: u32 = 100;

/// Request timeout in seconds
pub const DEFAULT_REQUEST_TIMEOUT: u64 = 300;

/// Emitted records between periodic checkpoints
pub const DEFAULT_CHECKPOINT_INTERVAL: u64 = 1000;

const DEFAULT_MAX_RETRIES: u32 = 4;
const DEFAULT_INITIAL_BACKOFF_MS: u64 = 2000;

// ============================================================================
// Raw Config (as found on disk)
// ============================================================================

/// Config file contents before validation
///
/// Numeric settings are accepted as numbers or numeric strings.
#[derive(Debug, Clone, Default, Deserialize)]
struct RawConfig {
    #[serde(default)]
    access_token: Option<String>,
    #[serde(default)]
    realm_hostname: Option<String>,
    #[serde(default)]
    start_date: Option<String>,
    #[serde(default)]
    app_id: Option<String>,
    #[serde(default)]
    page_size: Option<JsonValue>,
    #[serde(default)]
    request_timeout: Option<JsonValue>,
    #[serde(default)]
    base_url: Option<String>,
    #[serde(default)]
    user_agent: Option<String>,
    #[serde(default)]
    checkpoint_interval: Option<JsonValue>,
    #[serde(default)]
    max_retries: Option<JsonValue>,
    #[serde(default)]
    initial_backoff_ms: Option<JsonValue>,
    #[serde(default)]
    requests_per_second: Option<JsonValue>,
}

// ============================================================================
// Validated Config
// ============================================================================

/// Validated tap configuration
#[derive(Clone)]
pub struct TapConfig {
    /// User token for the `QB-USER-TOKEN` authorization scheme
    pub access_token: String,
    /// Realm the token belongs to
    pub realm_hostname: String,
    /// Default cursor for streams without a bookmark
    pub start_date: DateTime<Utc>,
    /// Application to extract
    pub app_id: Option<String>,
    pub page_size: u32,
    pub request_timeout: Duration,
    pub base_url: String,
    pub user_agent: String,
    pub checkpoint_interval: u64,
    pub max_retries: u32,
    pub initial_backoff_ms: u64,
    pub requests_per_second: Option<u32>,
}

impl std::fmt::Debug for TapConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("TapConfig")
            .field("access_token", &"<redacted>")
            .field("realm_hostname", &self.realm_hostname)
            .field("start_date", &self.start_date)
            .field("app_id", &self.app_id)
            .field("page_size", &self.page_size)
            .field("request_timeout", &self.request_timeout)
            .field("base_url", &self.base_url)
            .finish_non_exhaustive()
    }
}

impl TapConfig {
    /// Load and validate a config file
    pub fn from_file(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        if !path.exists() {
            return Err(Error::FileNotFound {
                path: path.display().to_string(),
            });
        }
        let content = std::fs::read_to_string(path)
            .map_err(|e| Error::config(format!("Failed to read config file: {e}")))?;
        Self::from_json(&content)
    }

    /// Parse and validate a JSON config string
    pub fn from_json(json: &str) -> Result<Self> {
        let value: JsonValue = serde_json::from_str(json)
            .map_err(|e| Error::config(format!("Invalid config JSON: {e}")))?;
        Self::from_value(value)
    }

    /// Validate an already-parsed JSON config
    pub fn from_value(value: JsonValue) -> Result<Self> {
        let raw: RawConfig = serde_json::from_value(value)
            .map_err(|e| Error::config(format!("Invalid config: {e}")))?;

        let access_token = raw
            .access_token
            .none_if_empty()
            .ok_or_else(|| Error::missing_field("access_token"))?;
        let realm_hostname = raw
            .realm_hostname
            .none_if_empty()
            .ok_or_else(|| Error::missing_field("realm_hostname"))?;
        let start_date = raw
            .start_date
            .none_if_empty()
            .ok_or_else(|| Error::missing_field("start_date"))?;
        let start_date = parse_start_date(&start_date)?;

        let page_size = match read_u64("page_size", raw.page_size.as_ref())? {
            None => DEFAULT_PAGE_SIZE,
            Some(0) => {
                return Err(Error::invalid_value(
                    "page_size",
                    "must be a positive integer",
                ))
            }
            Some(n) => u32::try_from(n)
                .map_err(|_| Error::invalid_value("page_size", "value is too large"))?,
        };

        // An empty or zero timeout falls back to the default
        let request_timeout = match read_u64("request_timeout", raw.request_timeout.as_ref())? {
            None | Some(0) => DEFAULT_REQUEST_TIMEOUT,
            Some(n) => n,
        };

        let base_url = raw
            .base_url
            .none_if_empty()
            .unwrap_or_else(|| DEFAULT_BASE_URL.to_string());
        url::Url::parse(&base_url)
            .map_err(|e| Error::invalid_value("base_url", e.to_string()))?;

        let user_agent = raw
            .user_agent
            .none_if_empty()
            .unwrap_or_else(|| format!("{}/{}", crate::NAME, crate::VERSION));

        let checkpoint_interval =
            match read_u64("checkpoint_interval", raw.checkpoint_interval.as_ref())? {
                None | Some(0) => DEFAULT_CHECKPOINT_INTERVAL,
                Some(n) => n,
            };

        let max_retries = read_u64("max_retries", raw.max_retries.as_ref())?
            .map_or(DEFAULT_MAX_RETRIES, |n| n as u32);
        let initial_backoff_ms = read_u64("initial_backoff_ms", raw.initial_backoff_ms.as_ref())?
            .unwrap_or(DEFAULT_INITIAL_BACKOFF_MS);
        let requests_per_second =
            read_u64("requests_per_second", raw.requests_per_second.as_ref())?
                .filter(|n| *n > 0)
                .map(|n| n as u32);

        Ok(Self {
            access_token,
            realm_hostname,
            start_date,
            app_id: raw.app_id.none_if_empty(),
            page_size,
            request_timeout: Duration::from_secs(request_timeout),
            base_url,
            user_agent,
            checkpoint_interval,
            max_retries,
            initial_backoff_ms,
            requests_per_second,
        })
    }

    /// The `start_date` as a bookmark value
    pub fn start_date_bookmark(&self) -> JsonValue {
        JsonValue::String(crate::state::format_timestamp(&self.start_date))
    }

    /// The configured app id, or an error naming the operation that needs it
    pub fn require_app_id(&self) -> Result<&str> {
        self.app_id
            .as_deref()
            .ok_or_else(|| Error::missing_field("app_id"))
    }
}

fn parse_start_date(value: &str) -> Result<DateTime<Utc>> {
    crate::state::parse_timestamp(value).ok_or_else(|| {
        Error::invalid_value(
            "start_date",
            format!("'{value}' is not an ISO 8601 timestamp"),
        )
    })
}

/// Read an optional non-negative integer given as a number or a string
fn read_u64(field: &str, value: Option<&JsonValue>) -> Result<Option<u64>> {
    match value {
        None | Some(JsonValue::Null) => Ok(None),
        Some(JsonValue::Number(n)) => n
            .as_u64()
            .map(Some)
            .ok_or_else(|| Error::invalid_value(field, format!("'{n}' is not a positive integer"))),
        Some(JsonValue::String(s)) if s.trim().is_empty() => Ok(None),
        Some(JsonValue::String(s)) => s
            .trim()
            .parse::<u64>()
            .map(Some)
            .map_err(|_| Error::invalid_value(field, format!("'{s}' is not a positive integer"))),
        Some(other) => Err(Error::invalid_value(
            field,
            format!("expected an integer, got {other}"),
        )),
    }
}
