//! Kernel-level failures shared by every domain crate
//!
//! Domain crates define their own error enums; `CoreError` covers the
//! cross-cutting cases that originate in kernel types themselves, such as
//! parcel geometry rejected at construction or a malformed prefixed
//! identifier arriving on the wire.

use crate::geometry::GeometryError;
use thiserror::Error;

/// Core error type for the kernel
#[derive(Debug, Error)]
pub enum CoreError {
    #[error("Geometry error: {0}")]
    Geometry(#[from] GeometryError),

    /// A prefixed identifier that failed to parse, such as `CLM-` followed
    /// by something that is not a UUID
    #[error("Invalid identifier '{value}': {detail}")]
    InvalidIdentifier { value: String, detail: String },

    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Invalid state transition: {from} -> {to}")]
    InvalidStateTransition { from: String, to: String },

    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    #[error("Configuration error: {0}")]
    Configuration(String),
}

impl CoreError {
    pub fn validation(message: impl Into<String>) -> Self {
        CoreError::Validation(message.into())
    }

    pub fn invalid_identifier(value: impl Into<String>, detail: impl Into<String>) -> Self {
        CoreError::InvalidIdentifier {
            value: value.into(),
            detail: detail.into(),
        }
    }

    pub fn invalid_transition(from: impl Into<String>, to: impl Into<String>) -> Self {
        CoreError::InvalidStateTransition {
            from: from.into(),
            to: to.into(),
        }
    }

    pub fn not_found(entity: impl Into<String>, id: impl Into<String>) -> Self {
        CoreError::NotFound {
            entity: entity.into(),
            id: id.into(),
        }
    }
}
