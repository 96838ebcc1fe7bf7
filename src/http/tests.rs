//! Tests for the HTTP client module

use super::*;
use crate::error::{ApiErrorKind, Error};
use crate::types::{BackoffType, Method};
use serde_json::json;
use std::time::Duration;
use test_case::test_case;
use wiremock::matchers::{header, method, path, query_param};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn test_client(server: &MockServer, max_retries: u32) -> HttpClient {
    let config = HttpClientConfig::builder()
        .base_url(server.uri())
        .max_retries(max_retries)
        .backoff(
            BackoffType::Exponential,
            Duration::from_millis(1),
            Duration::from_millis(5),
        )
        .build();
    HttpClient::with_config(config).unwrap()
}

#[test]
fn test_http_client_config_default() {
    let config = HttpClientConfig::default();
    assert_eq!(config.timeout, Duration::from_secs(300));
    assert_eq!(config.max_retries, 4);
    assert!(config.base_url.is_none());
    assert!(config.rate_limit.is_none());
}

#[test]
fn test_http_client_config_builder() {
    let config = HttpClientConfig::builder()
        .base_url("https://api.example.com")
        .timeout(Duration::from_secs(60))
        .max_retries(5)
        .backoff(
            BackoffType::Linear,
            Duration::from_millis(200),
            Duration::from_secs(30),
        )
        .header("X-Custom", "value")
        .user_agent("test-agent/1.0")
        .build();

    assert_eq!(config.base_url, Some("https://api.example.com".to_string()));
    assert_eq!(config.timeout, Duration::from_secs(60));
    assert_eq!(config.max_retries, 5);
    assert_eq!(config.backoff_type, BackoffType::Linear);
    assert_eq!(config.initial_backoff, Duration::from_millis(200));
    assert_eq!(
        config.default_headers.get("X-Custom"),
        Some(&"value".to_string())
    );
}

#[test]
fn test_config_from_tap_config() {
    let tap = crate::config::TapConfig::from_value(json!({
        "access_token": "tok",
        "realm_hostname": "acme.quickbase.com",
        "start_date": "2024-01-01T00:00:00Z",
        "requests_per_second": 3
    }))
    .unwrap();

    let config = HttpClientConfig::from_tap_config(&tap);
    assert_eq!(
        config.default_headers.get("Authorization"),
        Some(&"QB-USER-TOKEN tok".to_string())
    );
    assert_eq!(
        config.default_headers.get("QB-Realm-Hostname"),
        Some(&"acme.quickbase.com".to_string())
    );
    assert_eq!(config.initial_backoff, Duration::from_secs(2));
    assert_eq!(config.rate_limit, Some(RateLimiterConfig::per_second(3)));
}

#[test]
fn test_request_config_builder() {
    let config = RequestConfig::new()
        .query("skip", "0")
        .queries([("top", "100"), ("skip", "50")])
        .header("X-Request-Id", "abc123")
        .json(json!({"key": "value"}))
        .timeout(Duration::from_secs(10));

    assert_eq!(config.query.get("skip"), Some(&"50".to_string()));
    assert_eq!(config.query.get("top"), Some(&"100".to_string()));
    assert_eq!(
        config.headers.get("X-Request-Id"),
        Some(&"abc123".to_string())
    );
    assert!(config.body.is_some());
    assert_eq!(config.timeout, Some(Duration::from_secs(10)));
}

#[test]
fn test_calculate_backoff() {
    let config = HttpClientConfig::builder()
        .backoff(
            BackoffType::Exponential,
            Duration::from_secs(2),
            Duration::from_secs(60),
        )
        .build();
    let client = HttpClient::with_config(config).unwrap();

    assert_eq!(client.calculate_backoff(0), Duration::from_secs(2));
    assert_eq!(client.calculate_backoff(1), Duration::from_secs(4));
    assert_eq!(client.calculate_backoff(3), Duration::from_secs(16));
    assert_eq!(client.calculate_backoff(10), Duration::from_secs(60));
}

#[tokio::test]
async fn test_execute_sends_auth_headers_and_query() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/tables"))
        .and(query_param("appId", "bq8xyz"))
        .and(query_param("skip", "0"))
        .and(header("Authorization", "QB-USER-TOKEN tok"))
        .and(header("QB-Realm-Hostname", "acme.quickbase.com"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!([{"id": "t1"}])))
        .expect(1)
        .mount(&mock_server)
        .await;

    let tap = crate::config::TapConfig::from_value(json!({
        "access_token": "tok",
        "realm_hostname": "acme.quickbase.com",
        "start_date": "2024-01-01T00:00:00Z",
        "base_url": mock_server.uri()
    }))
    .unwrap();
    let client = HttpClient::from_tap_config(&tap).unwrap();

    let body = client
        .execute(
            Method::GET,
            "v1/tables?appId=bq8xyz",
            RequestConfig::new().query("skip", "0"),
        )
        .await
        .unwrap();

    assert_eq!(body, json!([{"id": "t1"}]));
}

#[tokio::test]
async fn test_absolute_url_bypasses_base() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/elsewhere"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"ok": true})))
        .mount(&mock_server)
        .await;

    let config = HttpClientConfig::builder()
        .base_url("https://unused.invalid")
        .build();
    let client = HttpClient::with_config(config).unwrap();
    let url = format!("{}/elsewhere", mock_server.uri());
    let body = client
        .execute(Method::GET, &url, RequestConfig::new())
        .await
        .unwrap();

    assert_eq!(body["ok"], true);
}

#[tokio::test]
async fn test_retries_server_error_then_succeeds() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/apps/a1"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(2)
        .mount(&mock_server)
        .await;

    Mock::given(method("GET"))
        .and(path("/v1/apps/a1"))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"id": "a1"})))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server, 4);
    let body = client
        .execute(Method::GET, "v1/apps/a1", RequestConfig::new())
        .await
        .unwrap();

    assert_eq!(body["id"], "a1");
}

#[tokio::test]
async fn test_retries_exhausted_after_five_attempts() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/apps/a1"))
        .respond_with(ResponseTemplate::new(429).set_body_json(json!({"message": "slow down"})))
        .expect(5)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server, 4);
    let err = client
        .execute(Method::GET, "v1/apps/a1", RequestConfig::new())
        .await
        .unwrap_err();

    assert_eq!(err.api_kind(), Some(ApiErrorKind::RateLimited));
    assert_eq!(err.to_string(), "HTTP-error-code: 429, Error: slow down");
}

#[test_case(400 ; "bad request")]
#[test_case(401 ; "unauthorized")]
#[test_case(403 ; "forbidden")]
#[test_case(404 ; "not found")]
#[test_case(409 ; "conflict")]
#[tokio::test]
async fn test_terminal_status_is_single_attempt(status: u16) {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/apps/a1"))
        .respond_with(ResponseTemplate::new(status))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server, 4);
    let err = client
        .execute(Method::GET, "v1/apps/a1", RequestConfig::new())
        .await
        .unwrap_err();

    assert_eq!(err.api_kind(), Some(ApiErrorKind::from_status(status)));
    assert!(!err.is_retryable());
}

#[tokio::test]
async fn test_error_field_preferred_over_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/tables/t1"))
        .respond_with(ResponseTemplate::new(404).set_body_json(json!({
            "error": "No such table",
            "message": "ignored"
        })))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server, 0);
    let err = client
        .execute(Method::GET, "v1/tables/t1", RequestConfig::new())
        .await
        .unwrap_err();

    assert_eq!(err.to_string(), "HTTP-error-code: 404, Error: No such table");
}

#[tokio::test]
async fn test_forbidden_default_message() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/fields"))
        .respond_with(ResponseTemplate::new(403).set_body_string("denied"))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server, 0);
    let err = client
        .execute(Method::GET, "v1/fields", RequestConfig::new())
        .await
        .unwrap_err();

    assert!(err.is_forbidden());
    assert!(matches!(err, Error::Api { .. }));
    assert!(err.to_string().contains("required scopes"));
}

#[tokio::test]
async fn test_empty_body_is_null() {
    let mock_server = MockServer::start().await;

    Mock::given(method("GET"))
        .and(path("/v1/empty"))
        .respond_with(ResponseTemplate::new(204))
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server, 0);
    let body = client
        .execute(Method::GET, "v1/empty", RequestConfig::new())
        .await
        .unwrap();

    assert!(body.is_null());
}

#[tokio::test]
async fn test_post_sends_json_body() {
    let mock_server = MockServer::start().await;

    Mock::given(method("POST"))
        .and(path("/v1/records/query"))
        .and(wiremock::matchers::body_json(json!({"from": "t1"})))
        .respond_with(ResponseTemplate::new(200).set_body_json(json!({"data": []})))
        .expect(1)
        .mount(&mock_server)
        .await;

    let client = test_client(&mock_server, 0);
    let body = client
        .execute(
            Method::POST,
            "v1/records/query",
            RequestConfig::new().json(json!({"from": "t1"})),
        )
        .await
        .unwrap();

    assert_eq!(body, json!({"data": []}));
}
