//! Axum middleware stack.

pub mod heat;
pub mod logging;
