//! Integration tests for the reservation endpoint.

mod helpers;

use axum::http::StatusCode;
use serde_json::json;

use helpers::TestApp;

#[tokio::test]
async fn test_cold_user_gets_standalone_reserve() {
    let app = TestApp::new();

    let response = app.reserve("7", TestApp::reserve_body(25.0)).await;

    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["amount"], json!(2500));
    assert_eq!(response.body["version"], json!("standalone"));
    assert_eq!(response.body["status"], json!("reserved"));
    assert!(response.body["id"].as_i64().is_some());
    assert!(response.body.get("external_reference").is_none());
}

#[tokio::test]
async fn test_hot_user_is_served_from_pool() {
    let app = TestApp::new();

    for _ in 0..2 {
        let response = app.reserve("8", TestApp::reserve_body(25.0)).await;
        assert_eq!(response.body["version"], json!("standalone"));
    }

    let pooled = app.reserve("8", TestApp::reserve_body(25.0)).await;

    assert_eq!(pooled.status, StatusCode::OK, "{:?}", pooled.body);
    assert_eq!(pooled.body["version"], json!("splitted"));
    assert_eq!(pooled.body["amount"], json!(2500));

    let next = app.reserve("8", TestApp::reserve_body(25.0)).await;
    assert_eq!(next.body["version"], json!("splitted"));
}

#[tokio::test]
async fn test_failed_requests_still_heat_the_user() {
    let app = TestApp::new();

    for _ in 0..2 {
        let response = app
            .request(
                "POST",
                "/api/users/9/reserve",
                Some(TestApp::reserve_body(25.0)),
                &[("X-Client-Id", "client-1")],
            )
            .await;
        assert_eq!(response.status, StatusCode::BAD_REQUEST);
    }

    let response = app.reserve("9", TestApp::reserve_body(25.0)).await;
    assert_eq!(response.body["version"], json!("splitted"));
}

#[tokio::test]
async fn test_non_numeric_user_id_is_rejected() {
    let app = TestApp::new();

    let response = app.reserve("abc", TestApp::reserve_body(25.0)).await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), Some("invalid_uri"));
    assert_eq!(response.body["message"], json!("Invalid uri!"));
    assert_eq!(
        response.details(),
        vec![("user_id".to_string(), "numeric".to_string())]
    );
}

#[tokio::test]
async fn test_zero_user_id_is_rejected() {
    let app = TestApp::new();

    let response = app.reserve("0", TestApp::reserve_body(25.0)).await;

    assert_eq!(response.error_code(), Some("invalid_uri"));
    assert_eq!(
        response.details(),
        vec![("user_id".to_string(), "required".to_string())]
    );
}

#[tokio::test]
async fn test_invalid_body_lists_every_field() {
    let app = TestApp::new();

    let response = app
        .reserve(
            "7",
            json!({ "amount": -5.0, "mode": "sometimes", "reason": "reserve_for_payment" }),
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), Some("invalid_reserve"));
    assert_eq!(
        response.details(),
        vec![
            ("amount".to_string(), "range".to_string()),
            ("external_reference".to_string(), "required".to_string()),
            ("mode".to_string(), "invalid_mode".to_string()),
        ]
    );
}

#[tokio::test]
async fn test_unparseable_body_is_rejected() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/users/7/reserve",
            None,
            &[("X-Idempotency-Key", "idem-1"), ("X-Client-Id", "client-1")],
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), Some("invalid_reserve"));
}

#[tokio::test]
async fn test_body_is_checked_before_headers() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/users/7/reserve",
            Some(json!({ "amount": 25.0 })),
            &[],
        )
        .await;

    assert_eq!(response.error_code(), Some("invalid_reserve"));
}

#[tokio::test]
async fn test_missing_idempotency_key_is_rejected() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/users/7/reserve",
            Some(TestApp::reserve_body(25.0)),
            &[("X-Client-Id", "client-1")],
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), Some("invalid_header"));
    assert_eq!(
        response.details(),
        vec![("idempotency_key".to_string(), "required".to_string())]
    );
}

#[tokio::test]
async fn test_client_id_must_be_provided() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/users/7/reserve",
            Some(TestApp::reserve_body(25.0)),
            &[("X-Idempotency-Key", "idem-1")],
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), Some("absent_client_id"));
    assert_eq!(response.body["message"], json!("Should provide clientID"));
}

#[tokio::test]
async fn test_client_id_from_query_string() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/users/7/reserve?client.id=client-1",
            Some(TestApp::reserve_body(10.0)),
            &[("X-Idempotency-Key", "idem-1")],
        )
        .await;

    assert_eq!(response.status, StatusCode::OK, "{:?}", response.body);
    assert_eq!(response.body["amount"], json!(1000));
}

#[tokio::test]
async fn test_mismatching_client_ids_are_rejected() {
    let app = TestApp::new();

    let response = app
        .request(
            "POST",
            "/api/users/7/reserve?client.id=other",
            Some(TestApp::reserve_body(10.0)),
            &[("X-Idempotency-Key", "idem-1"), ("X-Client-Id", "client-1")],
        )
        .await;

    assert_eq!(response.status, StatusCode::BAD_REQUEST);
    assert_eq!(response.error_code(), Some("mismatching_client_ids"));
    assert_eq!(response.body["message"], json!("clientID does not match"));
}
