//! # reserve-core
//!
//! Core crate for the reserve pool service. Contains configuration schemas,
//! the reserve domain types, the ledger client trait, and the unified error
//! system.
//!
//! This crate has **no** internal dependencies on other workspace crates.

pub mod config;
pub mod error;
pub mod result;
pub mod traits;
pub mod types;

pub use error::AppError;
pub use result::AppResult;
