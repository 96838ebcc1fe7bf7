//! Tests for pagination module

use super::*;
use crate::decode::RecordExtractor;
use crate::error::Result;
use crate::http::RequestExecutor;
use crate::test_support::{page, records, ScriptedExecutor};
use crate::types::JsonValue;
use serde_json::json;
use std::collections::HashSet;

impl Paginator {
    /// Drain every remaining page
    async fn collect_all(&mut self, executor: &dyn RequestExecutor) -> Result<Vec<JsonValue>> {
        let mut all = Vec::new();
        while let Some(page) = self.next_page(executor).await? {
            all.extend(page);
        }
        Ok(all)
    }
}

fn paginator(page_size: Option<u32>) -> Paginator {
    Paginator::new(
        "widgets",
        PageRequest::get("v1/widgets", page_size),
        RecordExtractor::new(),
    )
}

// ============================================================================
// Signature Tests
// ============================================================================

#[test]
fn test_signature_from_ids() {
    let sig = PageSignature::of(&records(1, 3));
    assert_eq!(
        sig,
        PageSignature::Ids {
            first: "1".to_string(),
            last: "3".to_string(),
            len: 3
        }
    );
}

#[test]
fn test_signature_digest_without_ids() {
    let a = vec![json!({"name": "a", "n": 1})];
    let b = vec![json!({"n": 1, "name": "a"})];
    let c = vec![json!({"name": "b"})];

    assert!(matches!(PageSignature::of(&a), PageSignature::Digest(_)));
    assert_eq!(PageSignature::of(&a), PageSignature::of(&b));
    assert_ne!(PageSignature::of(&a), PageSignature::of(&c));
}

// ============================================================================
// Cursor Tests
// ============================================================================

#[test]
fn test_cursor_page_params() {
    let mut cursor = SyncCursor::new(Some(50));
    assert_eq!(
        cursor.page_params(),
        vec![(SKIP_PARAM, "0".to_string()), (TOP_PARAM, "50".to_string())]
    );
    cursor.advance(50, None);
    assert_eq!(cursor.offset, 50);
    assert!(!cursor.is_done());

    assert!(SyncCursor::new(None).page_params().is_empty());
}

#[test]
fn test_cursor_duplicate_counter_resets() {
    let mut cursor = SyncCursor::new(Some(2));
    let a = PageSignature::of(&records(1, 2));
    let b = PageSignature::of(&records(3, 2));

    assert_eq!(cursor.observe_signature(a.clone()), (false, false));
    assert_eq!(cursor.observe_signature(a.clone()), (true, false));
    assert_eq!(cursor.observe_signature(b), (false, false));
    assert_eq!(cursor.duplicate_pages, 0);
    assert_eq!(cursor.observe_signature(a.clone()), (false, false));
    assert_eq!(cursor.observe_signature(a.clone()), (true, false));
    assert_eq!(cursor.observe_signature(a), (true, true));
}

#[test]
fn test_cursor_dedup_keeps_identityless_records() {
    let mut cursor = SyncCursor::new(Some(10));
    let first = cursor.dedup(vec![json!({"id": 1}), json!({"name": "x"})]);
    let second = cursor.dedup(vec![json!({"id": 1}), json!({"name": "x"}), json!({"id": 2})]);

    assert_eq!(first.len(), 2);
    assert_eq!(second, vec![json!({"name": "x"}), json!({"id": 2})]);
    assert_eq!(cursor.records_yielded, 4);
}

#[test]
fn test_cursor_total_reached() {
    let mut cursor = SyncCursor::new(Some(50));
    cursor.advance(50, Some(100));
    assert!(!cursor.is_done());
    cursor.advance(50, Some(100));
    assert_eq!(cursor.stop_reason, Some(StopReason::TotalReached));
}

// ============================================================================
// Paginator Tests
// ============================================================================

#[tokio::test]
async fn test_three_pages_until_short_page() {
    let executor = ScriptedExecutor::with_pages([page(1, 50), page(51, 50), page(101, 30)]);
    let mut paginator = paginator(Some(50));

    let all = paginator.collect_all(&executor).await.unwrap();

    assert_eq!(all.len(), 130);
    assert_eq!(executor.request_count(), 3);
    assert_eq!(paginator.cursor().stop_reason, Some(StopReason::ShortPage));

    let skips: Vec<String> = executor
        .requests()
        .iter()
        .map(|r| r.param("skip").unwrap().to_string())
        .collect();
    assert_eq!(skips, vec!["0", "50", "100"]);
    assert!(executor.requests().iter().all(|r| r.param("top") == Some("50")));
}

#[tokio::test]
async fn test_repeated_page_stops_after_second_request() {
    let executor = ScriptedExecutor::with_pages([page(1, 50), page(1, 50), page(1, 50)]);
    let mut paginator = paginator(Some(50));

    let all = paginator.collect_all(&executor).await.unwrap();

    assert_eq!(all.len(), 50);
    assert_eq!(executor.request_count(), 2);
    assert_eq!(paginator.cursor().stop_reason, Some(StopReason::NoNewRecords));
}

#[tokio::test]
async fn test_identical_identityless_pages_hit_duplicate_limit() {
    let body: Vec<serde_json::Value> = (0..2).map(|i| json!({"n": i})).collect();
    let executor = ScriptedExecutor::new().route("v1/widgets", json!(body));
    let mut paginator = paginator(Some(2));

    let all = paginator.collect_all(&executor).await.unwrap();

    // Identity-less records cannot be de-duplicated, so only the page
    // signature ends this enumeration.
    assert_eq!(all.len(), 4);
    assert_eq!(executor.request_count(), 3);
    assert_eq!(
        paginator.cursor().stop_reason,
        Some(StopReason::DuplicatePages)
    );
}

#[tokio::test]
async fn test_overlapping_pages_yield_unique_records() {
    let executor = ScriptedExecutor::with_pages([page(1, 10), page(6, 10), page(16, 3)]);
    let mut paginator = paginator(Some(10));

    let all = paginator.collect_all(&executor).await.unwrap();

    let ids: HashSet<u64> = all.iter().map(|r| r["id"].as_u64().unwrap()).collect();
    assert_eq!(all.len(), 18);
    assert_eq!(ids.len(), 18);
}

#[tokio::test]
async fn test_empty_first_page() {
    let executor = ScriptedExecutor::with_pages([json!([])]);
    let mut paginator = paginator(Some(100));

    assert!(paginator.next_page(&executor).await.unwrap().is_none());
    assert_eq!(paginator.cursor().stop_reason, Some(StopReason::EmptyPage));
    assert!(paginator.next_page(&executor).await.unwrap().is_none());
    assert_eq!(executor.request_count(), 1);
}

#[tokio::test]
async fn test_total_records_ends_full_pages() {
    let executor = ScriptedExecutor::with_pages([
        json!({"data": records(1, 2), "metadata": {"totalRecords": 4}}),
        json!({"data": records(3, 2), "metadata": {"totalRecords": 4}}),
    ]);
    let mut paginator = Paginator::new(
        "widgets",
        PageRequest::get("v1/widgets", Some(2)),
        RecordExtractor::from_key(Some("data")),
    );

    let all = paginator.collect_all(&executor).await.unwrap();

    assert_eq!(all.len(), 4);
    assert_eq!(executor.request_count(), 2);
    assert_eq!(paginator.cursor().stop_reason, Some(StopReason::TotalReached));
}

#[tokio::test]
async fn test_single_resource_one_request_without_paging_params() {
    let executor = ScriptedExecutor::new().route("v1/apps/app1", json!({"id": "app1"}));
    let mut paginator = Paginator::new(
        "apps",
        PageRequest::get("v1/apps/app1", None).param("updated_since", "2024-01-01T00:00:00Z"),
        RecordExtractor::new(),
    );

    let all = paginator.collect_all(&executor).await.unwrap();

    assert_eq!(all, vec![json!({"id": "app1"})]);
    let requests = executor.requests();
    assert_eq!(requests.len(), 1);
    assert!(requests[0].param("skip").is_none());
    assert!(requests[0].param("top").is_none());
    assert_eq!(requests[0].param("updated_since"), Some("2024-01-01T00:00:00Z"));
}

#[tokio::test]
async fn test_iteration_ceiling() {
    let executor = ScriptedExecutor::new().route_with("v1/widgets", |request| {
        let skip: u64 = request.query["skip"].parse().unwrap();
        page(skip + 1, 2)
    });
    let mut paginator = paginator(Some(2)).with_max_iterations(5);

    let all = paginator.collect_all(&executor).await.unwrap();

    assert_eq!(all.len(), 10);
    assert_eq!(executor.request_count(), 5);
    assert_eq!(
        paginator.cursor().stop_reason,
        Some(StopReason::IterationCeiling)
    );
}

#[tokio::test]
async fn test_executor_error_propagates() {
    let executor = ScriptedExecutor::new().route_status("v1/widgets", 401);
    let mut paginator = paginator(Some(10));

    let err = paginator.next_page(&executor).await.unwrap_err();
    assert_eq!(err.api_kind(), Some(crate::error::ApiErrorKind::Unauthorized));
}
