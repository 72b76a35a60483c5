//! Shared test helpers for integration tests.

use axum::Router;
use axum::body::Body;
use axum::http::{Request, StatusCode};
use serde_json::Value;
use tokio::sync::watch;
use tower::ServiceExt;

use reserve_core::config::{AppConfig, LedgerConfig};

/// Test application context
pub struct TestApp {
    /// The Axum router for making test requests
    pub router: Router,
    /// Application config
    pub config: AppConfig,
    /// Keeps background tasks alive for the duration of the test
    _shutdown: watch::Sender<bool>,
}

impl TestApp {
    /// Create a new test application over an instant, failure-free ledger
    pub fn new() -> Self {
        let mut config = AppConfig::default();
        config.ledger = LedgerConfig::instant();
        config.logging.format = "pretty".to_string();

        let (shutdown, shutdown_rx) = watch::channel(false);
        let state = reserve_api::build_state(config.clone(), shutdown_rx);
        let router = reserve_api::build_app(state);

        Self {
            router,
            config,
            _shutdown: shutdown,
        }
    }

    /// A valid reservation body for `amount` major units
    pub fn reserve_body(amount: f64) -> Value {
        serde_json::json!({
            "amount": amount,
            "mode": "total",
            "reason": "reserve_for_payment",
            "external_reference": "order-1",
        })
    }

    /// POST a reservation with the usual identification headers
    pub async fn reserve(&self, user: &str, body: Value) -> TestResponse {
        self.request(
            "POST",
            &format!("/api/users/{}/reserve", user),
            Some(body),
            &[("X-Idempotency-Key", "idem-1"), ("X-Client-Id", "client-1")],
        )
        .await
    }

    /// Make an HTTP request to the test app
    pub async fn request(
        &self,
        method: &str,
        path: &str,
        body: Option<Value>,
        headers: &[(&str, &str)],
    ) -> TestResponse {
        let body_str = body
            .map(|b| serde_json::to_string(&b).expect("Failed to serialize body"))
            .unwrap_or_default();

        let mut req = Request::builder()
            .method(method)
            .uri(path)
            .header("Content-Type", "application/json");

        for (name, value) in headers {
            req = req.header(*name, *value);
        }

        let req = req
            .body(Body::from(body_str))
            .expect("Failed to build request");

        let response = self
            .router
            .clone()
            .oneshot(req)
            .await
            .expect("Failed to send request");

        let status = response.status();
        let body_bytes = axum::body::to_bytes(response.into_body(), 1024 * 1024)
            .await
            .expect("Failed to read body");

        let body: Value = serde_json::from_slice(&body_bytes).unwrap_or(Value::Null);

        TestResponse { status, body }
    }
}

/// Response from a test request
#[derive(Debug)]
pub struct TestResponse {
    /// HTTP status code
    pub status: StatusCode,
    /// Parsed JSON body
    pub body: Value,
}

impl TestResponse {
    /// The `error` code of an error body
    pub fn error_code(&self) -> Option<&str> {
        self.body.get("error").and_then(|v| v.as_str())
    }

    /// `(field, code)` pairs of an error body's details
    pub fn details(&self) -> Vec<(String, String)> {
        self.body
            .get("details")
            .and_then(|v| v.as_array())
            .map(|details| {
                details
                    .iter()
                    .map(|d| {
                        (
                            d["field"].as_str().unwrap_or_default().to_string(),
                            d["code"].as_str().unwrap_or_default().to_string(),
                        )
                    })
                    .collect()
            })
            .unwrap_or_default()
    }
}
