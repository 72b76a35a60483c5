//! # reserve-api
//!
//! HTTP API layer for the reserve pool service built on Axum.
//!
//! Provides the reservation and listing endpoints, request validation with
//! structured error codes, the heat-recording and logging middleware, and
//! the mapping from domain errors to HTTP responses.

pub mod app;
pub mod dto;
pub mod error;
pub mod extractors;
pub mod handlers;
pub mod middleware;
pub mod router;
pub mod state;

pub use app::{build_app, build_state};
pub use error::ApiError;
pub use state::AppState;
