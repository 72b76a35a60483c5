//! Request DTOs with validation.

use serde::{Deserialize, Serialize};
use validator::{Validate, ValidationError};

use reserve_core::types::{Mode, Reason, ReserveRequest, UserId};

use crate::error::{ApiError, ValidationCode};

/// Minor units per major unit of the `amount` field.
const MINOR_UNITS: f64 = 100.0;

/// Reservation request body. `amount` is in major units.
#[derive(Debug, Clone, Serialize, Deserialize, Validate)]
pub struct CreateReserveBody {
    /// Amount to hold, at most one trillion major units.
    #[validate(required, range(exclusive_min = 0.0, max = 1_000_000_000_000.0))]
    pub amount: Option<f64>,
    /// Capture mode.
    #[validate(required, custom(function = "validate_mode"))]
    pub mode: Option<String>,
    /// Reason for the hold.
    #[validate(required, custom(function = "validate_reason"))]
    pub reason: Option<String>,
    /// Caller-side reference.
    #[validate(required, length(min = 1))]
    pub external_reference: Option<String>,
}

fn validate_mode(mode: &str) -> Result<(), ValidationError> {
    mode.parse::<Mode>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("invalid_mode"))
}

fn validate_reason(reason: &str) -> Result<(), ValidationError> {
    reason
        .parse::<Reason>()
        .map(|_| ())
        .map_err(|_| ValidationError::new("invalid_reason"))
}

impl CreateReserveBody {
    /// Validate every field, reporting all failures at once.
    pub fn check(&self) -> Result<(), ApiError> {
        self.validate()
            .map_err(|e| ApiError::from_validation(ValidationCode::InvalidReserve, &e))
    }

    /// Build the service request from a checked body.
    pub fn into_request(
        self,
        user_id: UserId,
        client_id: String,
        idempotency_key: String,
    ) -> Result<ReserveRequest, ApiError> {
        let missing =
            |field: &str| ApiError::invalid_field(ValidationCode::InvalidReserve, "required", field);
        let malformed =
            |field: &str| ApiError::invalid_field(ValidationCode::InvalidReserve, "invalid", field);

        let amount = self.amount.ok_or_else(|| missing("amount"))?;
        let mode = self
            .mode
            .ok_or_else(|| missing("mode"))?
            .parse::<Mode>()
            .map_err(|_| malformed("mode"))?;
        let reason = self
            .reason
            .ok_or_else(|| missing("reason"))?
            .parse::<Reason>()
            .map_err(|_| malformed("reason"))?;
        let external_reference = self
            .external_reference
            .ok_or_else(|| missing("external_reference"))?;

        Ok(ReserveRequest {
            amount: to_minor_units(amount),
            mode,
            reason,
            external_reference,
            idempotency_key,
            client_id,
            user_id,
        })
    }
}

/// Convert a major-unit amount to minor units, rounding to the nearest unit.
pub fn to_minor_units(amount: f64) -> i64 {
    (amount * MINOR_UNITS).round() as i64
}

/// Reservation query parameters.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct CreateQuery {
    /// Client id, alternative to the `X-Client-Id` header.
    #[serde(rename = "client.id")]
    pub client_id: Option<String>,
}
