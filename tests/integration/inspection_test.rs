//! Integration tests for the ledger and registry listings and the health check.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::TestApp;

#[tokio::test]
async fn test_unknown_user_has_empty_listings() {
    let app = TestApp::new();

    let ledger = app.request("GET", "/db/42", None, &[]).await;
    let registry = app.request("GET", "/registry/42", None, &[]).await;

    assert_eq!(ledger.status, StatusCode::OK);
    assert_eq!(ledger.body, json!([]));
    assert_eq!(registry.status, StatusCode::OK);
    assert_eq!(registry.body, json!([]));
}

#[tokio::test]
async fn test_listings_follow_pooled_allocation() {
    let app = TestApp::new();

    for _ in 0..3 {
        let response = app.reserve("5", TestApp::reserve_body(25.0)).await;
        assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    }

    let registry = app.request("GET", "/registry/5", None, &[]).await;
    let pooled = registry.body.as_array().expect("array");
    assert_eq!(pooled.len(), 1);
    assert_eq!(pooled[0]["amount"], json!(22500));
    assert_eq!(pooled[0]["version"], json!("splitted_rest"));

    // two standalone, the pooled parent, its remainder and the child
    let ledger = app.request("GET", "/db/5", None, &[]).await;
    let held = ledger.body.as_array().expect("array");
    assert_eq!(held.len(), 5);
    let released = held
        .iter()
        .filter(|r| r["status"] == json!("released"))
        .count();
    assert_eq!(released, 1);
}

#[tokio::test]
async fn test_listing_rejects_invalid_user() {
    let app = TestApp::new();

    let response = app.request("GET", "/registry/abc", None, &[]).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), Some("invalid_uri"));
}

#[tokio::test]
async fn test_health_reports_background_tasks() {
    let app = TestApp::new();

    let idle = app.request("GET", "/api/health", None, &[]).await;
    assert_eq!(idle.status, StatusCode::OK);
    assert_eq!(idle.body["status"], json!("ok"));
    assert_eq!(idle.body["background_tasks"], json!(0));

    app.reserve("3", TestApp::reserve_body(5.0)).await;

    let busy = app.request("GET", "/api/health", None, &[]).await;
    assert_eq!(busy.body["background_tasks"], json!(1));
    assert_eq!(app.config.allocator.overshoot_factor, 10);
}
