//! Typed path parameter extractors.

use std::collections::HashMap;

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;

use reserve_core::types::UserId;

use crate::error::{ApiError, ValidationCode};

/// The `{user_id}` path segment as a non-zero user id.
///
/// A missing, non-numeric or zero id is rejected with `invalid_uri`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct UserPath(pub UserId);

impl<S> FromRequestParts<S> for UserPath
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &S) -> Result<Self, Self::Rejection> {
        let rejected = |rule: &str| ApiError::invalid_field(ValidationCode::InvalidUri, rule, "user_id");

        let Path(params) = Path::<HashMap<String, String>>::from_request_parts(parts, state)
            .await
            .map_err(|_| rejected("required"))?;
        let raw = params.get("user_id").ok_or_else(|| rejected("required"))?;

        match raw.parse::<UserId>() {
            Ok(0) => Err(rejected("required")),
            Ok(user_id) => Ok(Self(user_id)),
            Err(_) => Err(rejected("numeric")),
        }
    }
}
