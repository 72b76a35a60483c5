//! Custom Axum extractors.

pub mod client;
pub mod path;

pub use client::ClientHeaders;
pub use path::UserPath;
