//! Client identification headers.

use axum::extract::FromRequestParts;
use axum::http::HeaderMap;
use axum::http::request::Parts;

use crate::dto::request::CreateQuery;
use crate::error::{ApiError, ValidationCode};

/// Idempotency key header, required.
pub const IDEMPOTENCY_KEY_HEADER: &str = "x-idempotency-key";
/// Client id header, optional when the query carries `client.id`.
pub const CLIENT_ID_HEADER: &str = "x-client-id";

/// Identification headers of a reservation request.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ClientHeaders {
    /// Value of `X-Idempotency-Key`.
    pub idempotency_key: String,
    /// Value of `X-Client-Id`, if present and non-empty.
    pub client_id: Option<String>,
}

impl ClientHeaders {
    /// Resolve the client id from the header and the query string.
    ///
    /// At least one must be present; when both are, they must agree.
    pub fn resolve_client_id(&self, query: &CreateQuery) -> Result<String, ApiError> {
        let from_query = query.client_id.as_deref().filter(|id| !id.is_empty());

        match (self.client_id.as_deref(), from_query) {
            (None, None) => Err(ApiError::invalid(ValidationCode::AbsentClientId)),
            (Some(header), Some(query)) if header != query => {
                Err(ApiError::invalid(ValidationCode::MismatchingClientIds))
            }
            (Some(id), _) | (None, Some(id)) => Ok(id.to_string()),
        }
    }
}

fn header_value(headers: &HeaderMap, name: &str, field: &str) -> Result<Option<String>, ApiError> {
    match headers.get(name) {
        None => Ok(None),
        Some(value) => value
            .to_str()
            .map(|v| Some(v.trim().to_string()).filter(|v| !v.is_empty()))
            .map_err(|_| ApiError::invalid_field(ValidationCode::InvalidHeader, "invalid", field)),
    }
}

impl<S> FromRequestParts<S> for ClientHeaders
where
    S: Send + Sync,
{
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, _state: &S) -> Result<Self, Self::Rejection> {
        let idempotency_key =
            header_value(&parts.headers, IDEMPOTENCY_KEY_HEADER, "idempotency_key")?.ok_or_else(
                || ApiError::invalid_field(ValidationCode::InvalidHeader, "required", "idempotency_key"),
            )?;
        let client_id = header_value(&parts.headers, CLIENT_ID_HEADER, "client_id")?;

        Ok(Self {
            idempotency_key,
            client_id,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn headers(client_id: Option<&str>) -> ClientHeaders {
        ClientHeaders {
            idempotency_key: "idem".to_string(),
            client_id: client_id.map(str::to_string),
        }
    }

    fn query(client_id: Option<&str>) -> CreateQuery {
        CreateQuery {
            client_id: client_id.map(str::to_string),
        }
    }

    fn code(result: Result<String, ApiError>) -> ValidationCode {
        match result {
            Err(ApiError::Invalid { code, .. }) => code,
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_client_id_from_either_source() {
        assert_eq!(headers(Some("a")).resolve_client_id(&query(None)).expect("header"), "a");
        assert_eq!(headers(None).resolve_client_id(&query(Some("b"))).expect("query"), "b");
        assert_eq!(
            headers(Some("c")).resolve_client_id(&query(Some("c"))).expect("both"),
            "c"
        );
    }

    #[test]
    fn test_absent_client_id() {
        assert_eq!(
            code(headers(None).resolve_client_id(&query(Some("")))),
            ValidationCode::AbsentClientId
        );
    }

    #[test]
    fn test_mismatching_client_ids() {
        assert_eq!(
            code(headers(Some("a")).resolve_client_id(&query(Some("b")))),
            ValidationCode::MismatchingClientIds
        );
    }
}
