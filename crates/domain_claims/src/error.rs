//! Claims domain errors

use core_kernel::PortError;
use thiserror::Error;

/// Errors that can occur in the claims domain
#[derive(Debug, Error)]
pub enum ClaimError {
    #[error("Claim not found: {0}")]
    NotFound(String),

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not authorized: {0}")]
    Authorization(String),

    #[error("Invalid status transition from {from} to {to}")]
    InvalidStatusTransition { from: String, to: String },

    /// A workflow pre-condition failed. Carries the claim's actual status so
    /// a losing concurrent writer can report what it observed.
    #[error("{operation} requires status {required}, but claim is {actual}")]
    State {
        operation: String,
        required: String,
        actual: String,
    },

    #[error("Duplicate document: fingerprint {0} already attached")]
    DuplicateDocument(String),

    #[error("{service} collaborator failed: {message}")]
    Collaborator { service: String, message: String },

    #[error("Storage error: {0}")]
    Storage(#[from] PortError),
}

impl ClaimError {
    pub fn validation(message: impl Into<String>) -> Self {
        ClaimError::Validation(message.into())
    }

    pub fn authorization(message: impl Into<String>) -> Self {
        ClaimError::Authorization(message.into())
    }

    pub fn state(
        operation: impl Into<String>,
        required: impl Into<String>,
        actual: impl Into<String>,
    ) -> Self {
        ClaimError::State {
            operation: operation.into(),
            required: required.into(),
            actual: actual.into(),
        }
    }

    pub fn collaborator(service: impl Into<String>, message: impl Into<String>) -> Self {
        ClaimError::Collaborator {
            service: service.into(),
            message: message.into(),
        }
    }
}
