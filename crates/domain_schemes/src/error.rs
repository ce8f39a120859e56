//! Scheme domain errors

use core_kernel::PortError;
use thiserror::Error;

/// Errors that can occur in the schemes domain
#[derive(Debug, Error)]
pub enum SchemeError {
    #[error("Scheme not found: {0}")]
    NotFound(String),

    #[error("Validation failed: {0}")]
    Validation(String),

    /// A rule's stored value does not fit its criteria or operator.
    /// Evaluation surfaces this instead of treating the rule as false,
    /// so misconfigured schemes are visible rather than silently skipped.
    #[error("Invalid rule value for {criteria}: {detail}")]
    InvalidRuleValue { criteria: String, detail: String },

    #[error("Storage error: {0}")]
    Storage(#[from] PortError),
}

impl SchemeError {
    pub fn validation(message: impl Into<String>) -> Self {
        SchemeError::Validation(message.into())
    }

    pub fn invalid_rule(criteria: impl Into<String>, detail: impl Into<String>) -> Self {
        SchemeError::InvalidRuleValue {
            criteria: criteria.into(),
            detail: detail.into(),
        }
    }
}
