//! HTTP client module
//!
//! Provides the request executor boundary and its reqwest-backed
//! implementation with retry, rate limiting, and backoff.
//!
//! # Features
//!
//! - **Automatic Retries**: transient statuses, timeouts and connection errors
//! - **Rate Limiting**: Token bucket rate limiter using governor
//! - **Typed Errors**: every non-success status maps to an `ApiErrorKind`

mod client;
mod executor;
mod rate_limit;

pub use client::{HttpClient, HttpClientConfig, HttpClientConfigBuilder};
pub use executor::{RequestConfig, RequestExecutor};
pub use rate_limit::{RateLimiter, RateLimiterConfig};

#[cfg(test)]
mod tests;
