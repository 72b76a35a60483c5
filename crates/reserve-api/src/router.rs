//! Route definitions for the reserve pool HTTP API.
//!
//! Reservation and health routes are mounted under `/api`; the ledger and
//! registry inspection routes sit at the root.

use axum::{
    Router,
    extract::DefaultBodyLimit,
    middleware as axum_middleware,
    routing::{get, post},
};

use crate::handlers;
use crate::middleware;
use crate::state::AppState;

/// Build the complete Axum router with all routes and middleware.
pub fn build_router(state: AppState) -> Router {
    let body_limit = state.config.server.body_limit_bytes;

    let api_routes = Router::new()
        .merge(reserve_routes(&state))
        .merge(health_routes());

    Router::new()
        .nest("/api", api_routes)
        .merge(inspection_routes())
        .layer(DefaultBodyLimit::max(body_limit))
        .layer(axum_middleware::from_fn(middleware::logging::request_logging))
        .with_state(state)
}

/// Reservation endpoint. Every completed call feeds the caller's heat.
fn reserve_routes(state: &AppState) -> Router<AppState> {
    Router::new()
        .route(
            "/users/{user_id}/reserve",
            post(handlers::reserve::create_reserve),
        )
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            middleware::heat::record_completion,
        ))
}

/// Ledger and pool listings
fn inspection_routes() -> Router<AppState> {
    Router::new()
        .route("/db/{user_id}", get(handlers::reserve::list_ledger))
        .route("/registry/{user_id}", get(handlers::reserve::list_registry))
}

/// Health check
fn health_routes() -> Router<AppState> {
    Router::new().route("/health", get(handlers::health::health))
}
