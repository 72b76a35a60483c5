//! Maps domain and validation errors to HTTP responses.

use axum::Json;
use axum::http::StatusCode;
use axum::response::{IntoResponse, Response};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use validator::ValidationErrors;

use reserve_core::error::{AppError, ErrorKind};

/// Which part of a request was rejected.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ValidationCode {
    /// Path parameters.
    InvalidUri,
    /// JSON body.
    InvalidReserve,
    /// Request headers.
    InvalidHeader,
    /// Query string.
    InvalidQueryParameters,
    /// Neither the header nor the query carried a client id.
    AbsentClientId,
    /// Header and query carried different client ids.
    MismatchingClientIds,
}

impl ValidationCode {
    /// Machine-readable code.
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::InvalidUri => "invalid_uri",
            Self::InvalidReserve => "invalid_reserve",
            Self::InvalidHeader => "invalid_header",
            Self::InvalidQueryParameters => "invalid_query_parameters",
            Self::AbsentClientId => "absent_client_id",
            Self::MismatchingClientIds => "mismatching_client_ids",
        }
    }

    /// Human-readable message.
    pub fn message(&self) -> &'static str {
        match self {
            Self::InvalidUri => "Invalid uri!",
            Self::InvalidReserve => "Invalid reserve!",
            Self::InvalidHeader => "Invalid header!",
            Self::InvalidQueryParameters => "Invalid query parameters!",
            Self::AbsentClientId => "Should provide clientID",
            Self::MismatchingClientIds => "clientID does not match",
        }
    }
}

/// One rejected field and the rule it broke.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct FieldError {
    /// Rule code, e.g. `required` or `range`.
    pub code: String,
    /// Field name.
    pub field: String,
}

impl FieldError {
    /// Creates a field error.
    pub fn new(code: impl Into<String>, field: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            field: field.into(),
        }
    }
}

/// Standard API error response body.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ApiErrorResponse {
    /// Machine-readable error code.
    pub error: String,
    /// Human-readable message.
    pub message: String,
    /// Rejected fields, for validation errors.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<FieldError>>,
}

/// Error returned by handlers and extractors.
#[derive(Debug, Error)]
pub enum ApiError {
    /// A failure from the service layer.
    #[error(transparent)]
    Domain(#[from] AppError),
    /// The request was rejected before reaching the service layer.
    #[error("{}", .code.message())]
    Invalid {
        /// What was rejected.
        code: ValidationCode,
        /// Which fields, when known.
        details: Option<Vec<FieldError>>,
    },
}

impl ApiError {
    /// Rejection without field details.
    pub fn invalid(code: ValidationCode) -> Self {
        Self::Invalid {
            code,
            details: None,
        }
    }

    /// Rejection of a single field.
    pub fn invalid_field(code: ValidationCode, rule: &str, field: &str) -> Self {
        Self::Invalid {
            code,
            details: Some(vec![FieldError::new(rule, field)]),
        }
    }

    /// Rejection built from `validator` output, fields sorted by name.
    pub fn from_validation(code: ValidationCode, errors: &ValidationErrors) -> Self {
        let mut details: Vec<FieldError> = errors
            .field_errors()
            .into_iter()
            .flat_map(|(field, failures)| {
                failures
                    .iter()
                    .map(move |failure| FieldError::new(failure.code.to_string(), field.to_string()))
            })
            .collect();
        details.sort_by(|a, b| a.field.cmp(&b.field).then_with(|| a.code.cmp(&b.code)));

        Self::Invalid {
            code,
            details: Some(details),
        }
    }

    /// HTTP status for this error.
    pub fn status(&self) -> StatusCode {
        match self {
            Self::Invalid { .. } => StatusCode::BAD_REQUEST,
            Self::Domain(e) => match e.kind {
                ErrorKind::InsufficientAmount | ErrorKind::Ledger => StatusCode::BAD_REQUEST,
                ErrorKind::NotFound => StatusCode::NOT_FOUND,
                ErrorKind::AllocationExhausted => StatusCode::SERVICE_UNAVAILABLE,
                ErrorKind::Internal | ErrorKind::Configuration => StatusCode::INTERNAL_SERVER_ERROR,
            },
        }
    }
}

fn domain_code(kind: ErrorKind) -> &'static str {
    match kind {
        ErrorKind::NotFound => "not_found",
        ErrorKind::InsufficientAmount => "insufficient_amount",
        ErrorKind::Ledger => "ledger_error",
        ErrorKind::AllocationExhausted => "allocation_exhausted",
        ErrorKind::Internal | ErrorKind::Configuration => "internal_error",
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = self.status();

        let body = match self {
            Self::Invalid { code, details } => ApiErrorResponse {
                error: code.as_str().to_string(),
                message: code.message().to_string(),
                details,
            },
            Self::Domain(e) => {
                if status.is_server_error() {
                    tracing::error!(kind = %e.kind, error = %e.message, "Request failed");
                }
                ApiErrorResponse {
                    error: domain_code(e.kind).to_string(),
                    message: e.message,
                    details: None,
                }
            }
        };

        (status, Json(body)).into_response()
    }
}
