//! Heat recording middleware.

use axum::extract::{Request, State};
use axum::middleware::Next;
use axum::response::Response;

use crate::error::ApiError;
use crate::extractors::UserPath;
use crate::state::AppState;

/// Adds one completion to the user's heat after the handler has answered,
/// whatever the outcome. Requests without a usable user id are not counted.
pub async fn record_completion(
    State(state): State<AppState>,
    user: Result<UserPath, ApiError>,
    request: Request,
    next: Next,
) -> Response {
    let response = next.run(request).await;

    if let Ok(UserPath(user_id)) = user {
        let level = state.reserve_service.record_completion(user_id).await;
        tracing::trace!(user_id, level, status = %response.status(), "Completion recorded");
    }

    response
}
