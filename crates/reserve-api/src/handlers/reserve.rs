//! Reservation handlers.

use axum::Json;
use axum::extract::rejection::{JsonRejection, QueryRejection};
use axum::extract::{Query, State};

use reserve_core::types::Reserve;

use crate::dto::request::{CreateQuery, CreateReserveBody};
use crate::error::{ApiError, ValidationCode};
use crate::extractors::{ClientHeaders, UserPath};
use crate::state::AppState;

/// POST /api/users/{user_id}/reserve
///
/// Checks run in order: path, body, headers, query, client id.
pub async fn create_reserve(
    State(state): State<AppState>,
    user: Result<UserPath, ApiError>,
    headers: Result<ClientHeaders, ApiError>,
    query: Result<Query<CreateQuery>, QueryRejection>,
    body: Result<Json<CreateReserveBody>, JsonRejection>,
) -> Result<Json<Reserve>, ApiError> {
    let UserPath(user_id) = user?;

    let Json(body) = body.map_err(|e| {
        tracing::debug!(user_id, error = %e, "Unreadable reserve body");
        ApiError::invalid(ValidationCode::InvalidReserve)
    })?;
    body.check()?;

    let headers = headers?;
    let Query(query) = query.map_err(|e| {
        tracing::debug!(user_id, error = %e, "Unreadable query string");
        ApiError::invalid(ValidationCode::InvalidQueryParameters)
    })?;
    let client_id = headers.resolve_client_id(&query)?;

    let request = body.into_request(user_id, client_id, headers.idempotency_key)?;
    let reserve = state.reserve_service.reserve(request).await?;

    Ok(Json(reserve))
}

/// GET /db/{user_id}
pub async fn list_ledger(
    State(state): State<AppState>,
    UserPath(user_id): UserPath,
) -> Result<Json<Vec<Reserve>>, ApiError> {
    let reserves = state.reserve_service.list_from_ledger(user_id).await?;
    Ok(Json(reserves))
}

/// GET /registry/{user_id}
pub async fn list_registry(
    State(state): State<AppState>,
    UserPath(user_id): UserPath,
) -> Json<Vec<Reserve>> {
    Json(state.reserve_service.list_from_registry(user_id).await)
}
