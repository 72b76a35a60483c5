//! Access log middleware.

use std::time::Instant;

use axum::extract::Request;
use axum::middleware::Next;
use axum::response::Response;

use crate::extractors::client::{CLIENT_ID_HEADER, IDEMPOTENCY_KEY_HEADER};

/// Logs one line per request with its outcome and latency.
///
/// Client errors log at `debug`, server errors at `warn`, everything else at
/// `info`. Identification headers are included when present.
pub async fn request_logging(request: Request, next: Next) -> Response {
    let method = request.method().clone();
    let path = request.uri().path().to_string();
    let client_id = header(&request, CLIENT_ID_HEADER);
    let idempotency_key = header(&request, IDEMPOTENCY_KEY_HEADER);
    let start = Instant::now();

    let response = next.run(request).await;

    let status = response.status().as_u16();
    let elapsed_ms = start.elapsed().as_millis() as u64;

    if response.status().is_server_error() {
        tracing::warn!(%method, %path, status, elapsed_ms, ?client_id, ?idempotency_key, "Request failed");
    } else if response.status().is_client_error() {
        tracing::debug!(%method, %path, status, elapsed_ms, ?client_id, ?idempotency_key, "Request rejected");
    } else {
        tracing::info!(%method, %path, status, elapsed_ms, ?client_id, ?idempotency_key, "Request served");
    }

    response
}

fn header(request: &Request, name: &str) -> Option<String> {
    request
        .headers()
        .get(name)
        .and_then(|v| v.to_str().ok())
        .map(str::to_string)
}
