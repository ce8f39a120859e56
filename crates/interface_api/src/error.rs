//! API error handling
//!
//! Domain errors map onto a stable HTTP vocabulary. Workflow pre-condition
//! failures become 409 with the required and observed statuses in the
//! details array, so a client that lost a concurrent race can see what the
//! winning writer did.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use serde::Serialize;
use thiserror::Error;

use core_kernel::PortError;
use domain_claims::ClaimError;
use domain_schemes::SchemeError;

/// API error types
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Bad request: {0}")]
    BadRequest(String),

    #[error("Unauthorized")]
    Unauthorized,

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Conflict: {0}")]
    Conflict(String),

    /// Workflow pre-condition failure with machine-readable detail
    #[error("{message}")]
    State {
        message: String,
        required: String,
        actual: String,
    },

    #[error("Collaborator failure: {0}")]
    Collaborator(String),

    #[error("Internal server error: {0}")]
    Internal(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),
}

/// Error response body
#[derive(Debug, Serialize)]
pub struct ErrorResponse {
    pub error: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub details: Option<Vec<String>>,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, error_type, message, details) = match self {
            ApiError::NotFound(msg) => (StatusCode::NOT_FOUND, "not_found", msg, None),
            ApiError::BadRequest(msg) => (StatusCode::BAD_REQUEST, "bad_request", msg, None),
            ApiError::Unauthorized => (
                StatusCode::UNAUTHORIZED,
                "unauthorized",
                "Unauthorized".to_string(),
                None,
            ),
            ApiError::Forbidden(msg) => (StatusCode::FORBIDDEN, "forbidden", msg, None),
            ApiError::Conflict(msg) => (StatusCode::CONFLICT, "conflict", msg, None),
            ApiError::State {
                message,
                required,
                actual,
            } => (
                StatusCode::CONFLICT,
                "state_error",
                message,
                Some(vec![
                    format!("required: {required}"),
                    format!("actual: {actual}"),
                ]),
            ),
            ApiError::Collaborator(msg) => (StatusCode::BAD_GATEWAY, "collaborator_failure", msg, None),
            ApiError::Internal(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "internal_error", msg, None),
            ApiError::Database(msg) => (StatusCode::INTERNAL_SERVER_ERROR, "database_error", msg, None),
            ApiError::Validation(msg) => (StatusCode::UNPROCESSABLE_ENTITY, "validation_error", msg, None),
        };

        let body = ErrorResponse {
            error: error_type.to_string(),
            message,
            details,
        };

        (status, Json(body)).into_response()
    }
}

impl From<ClaimError> for ApiError {
    fn from(err: ClaimError) -> Self {
        match err {
            ClaimError::NotFound(msg) => ApiError::NotFound(msg),
            ClaimError::Validation(msg) => ApiError::Validation(msg),
            ClaimError::Authorization(msg) => ApiError::Forbidden(msg),
            ClaimError::InvalidStatusTransition { ref from, ref to } => ApiError::State {
                message: err.to_string(),
                required: format!("a status that may move to {to}"),
                actual: from.clone(),
            },
            ClaimError::State {
                operation,
                required,
                actual,
            } => ApiError::State {
                message: format!("{operation} requires status {required}, but claim is {actual}"),
                required,
                actual,
            },
            ClaimError::DuplicateDocument(fingerprint) => ApiError::Conflict(format!(
                "Duplicate document: fingerprint {fingerprint} already attached"
            )),
            ClaimError::Collaborator { service, message } => {
                ApiError::Collaborator(format!("{service}: {message}"))
            }
            ClaimError::Storage(port) => port.into(),
        }
    }
}

impl From<SchemeError> for ApiError {
    fn from(err: SchemeError) -> Self {
        match err {
            SchemeError::NotFound(msg) => ApiError::NotFound(msg),
            SchemeError::Validation(msg) => ApiError::Validation(msg),
            SchemeError::InvalidRuleValue { .. } => ApiError::Internal(err.to_string()),
            SchemeError::Storage(port) => port.into(),
        }
    }
}

impl From<PortError> for ApiError {
    fn from(err: PortError) -> Self {
        if err.is_not_found() {
            ApiError::NotFound(err.to_string())
        } else if err.is_conflict() {
            ApiError::Conflict(err.to_string())
        } else {
            ApiError::Database(err.to_string())
        }
    }
}

impl From<validator::ValidationErrors> for ApiError {
    fn from(err: validator::ValidationErrors) -> Self {
        ApiError::Validation(err.to_string())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::http::StatusCode;

    fn status_of(err: ApiError) -> StatusCode {
        err.into_response().status()
    }

    #[test]
    fn state_errors_are_conflicts() {
        let err: ApiError = ClaimError::state("approve", "Verified", "Submitted").into();
        assert!(matches!(err, ApiError::State { .. }));
        assert_eq!(status_of(err), StatusCode::CONFLICT);
    }

    #[test]
    fn version_conflicts_are_conflicts() {
        let err: ApiError =
            ClaimError::Storage(PortError::conflict("Claim CLM-1 version mismatch")).into();
        assert_eq!(status_of(err), StatusCode::CONFLICT);
    }

    #[test]
    fn authorization_is_forbidden() {
        let err: ApiError = ClaimError::authorization("Citizens may not approve").into();
        assert_eq!(status_of(err), StatusCode::FORBIDDEN);
    }

    #[test]
    fn missing_claim_is_not_found() {
        let err: ApiError = ClaimError::NotFound("Claim not found: CLM-9".to_string()).into();
        assert_eq!(status_of(err), StatusCode::NOT_FOUND);
    }

    #[test]
    fn collaborator_failure_is_bad_gateway() {
        let err: ApiError = ClaimError::Collaborator {
            service: "asset-analysis".to_string(),
            message: "timed out".to_string(),
        }
        .into();
        assert_eq!(status_of(err), StatusCode::BAD_GATEWAY);
    }

    #[test]
    fn duplicate_document_is_conflict() {
        let err: ApiError = ClaimError::DuplicateDocument("abc123".to_string()).into();
        assert_eq!(status_of(err), StatusCode::CONFLICT);
    }
}
