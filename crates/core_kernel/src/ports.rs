//! Port machinery shared by every domain crate
//!
//! Domains own their port traits (`ClaimStore`, `UserDirectory`,
//! `SchemeCatalog`, `AssetAnalyzer`, ...) and depend only on this module for
//! the pieces every port needs: the error taxonomy adapters translate into,
//! the `DomainPort` marker, per-operation metadata, and the health-check
//! surface the API exposes.
//!
//! Adapters live elsewhere (Postgres in `infra_db`, the satellite-analysis
//! client in `domain_claims::adapters`) and implement the domain traits:
//!
//! ```rust,ignore
//! #[async_trait]
//! pub trait ClaimStore: DomainPort + HealthCheckable {
//!     async fn get_claim(
//!         &self,
//!         id: ClaimId,
//!         metadata: Option<OperationMetadata>,
//!     ) -> Result<Claim, PortError>;
//! }
//!
//! impl ClaimStore for PostgresClaimStore { ... }
//! ```

use serde::{Deserialize, Serialize};
use std::fmt;
use thiserror::Error;

/// Unified error type returned through every port
///
/// Adapters map their native failures (sqlx codes, HTTP statuses, breaker
/// state) onto this taxonomy so the services can branch on meaning rather
/// than on backend.
#[derive(Debug, Error)]
pub enum PortError {
    /// No stored record matched the requested identifier
    #[error("No {entity_type} with id {id}")]
    NotFound {
        entity_type: String,
        id: String,
    },

    /// The payload failed a constraint before reaching storage
    #[error("Validation error: {message}")]
    Validation {
        message: String,
        field: Option<String>,
    },

    /// A write lost against concurrent state: stale version, duplicate key
    #[error("Conflict: {message}")]
    Conflict {
        message: String,
    },

    /// The backing system could not be reached
    #[error("Connection error: {message}")]
    Connection {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },

    /// The operation ran past its deadline
    #[error("{operation} timed out after {duration_ms}ms")]
    Timeout {
        operation: String,
        duration_ms: u64,
    },

    /// The caller is not allowed to perform this operation on the backend
    #[error("Unauthorized: {message}")]
    Unauthorized {
        message: String,
    },

    /// An upstream quota pushed back
    #[error("Rate limited for another {retry_after_secs}s")]
    RateLimited {
        retry_after_secs: u64,
    },

    /// The collaborator is down or its circuit breaker is open
    #[error("Service unavailable: {service}")]
    ServiceUnavailable {
        service: String,
    },

    /// Stored data could not be converted into the domain shape
    #[error("Data mapping failed: {message}")]
    Transformation {
        message: String,
    },

    /// Anything the adapter cannot classify more precisely
    #[error("Internal error: {message}")]
    Internal {
        message: String,
        #[source]
        source: Option<Box<dyn std::error::Error + Send + Sync>>,
    },
}

impl PortError {
    pub fn not_found(entity_type: impl Into<String>, id: impl fmt::Display) -> Self {
        PortError::NotFound {
            entity_type: entity_type.into(),
            id: id.to_string(),
        }
    }

    pub fn validation(message: impl Into<String>) -> Self {
        PortError::Validation {
            message: message.into(),
            field: None,
        }
    }

    pub fn validation_field(message: impl Into<String>, field: impl Into<String>) -> Self {
        PortError::Validation {
            message: message.into(),
            field: Some(field.into()),
        }
    }

    pub fn conflict(message: impl Into<String>) -> Self {
        PortError::Conflict {
            message: message.into(),
        }
    }

    pub fn connection(message: impl Into<String>) -> Self {
        PortError::Connection {
            message: message.into(),
            source: None,
        }
    }

    pub fn service_unavailable(service: impl Into<String>) -> Self {
        PortError::ServiceUnavailable {
            service: service.into(),
        }
    }

    pub fn internal(message: impl Into<String>) -> Self {
        PortError::Internal {
            message: message.into(),
            source: None,
        }
    }

    /// Whether a retry has a chance of succeeding
    pub fn is_transient(&self) -> bool {
        matches!(
            self,
            PortError::Connection { .. }
                | PortError::Timeout { .. }
                | PortError::RateLimited { .. }
                | PortError::ServiceUnavailable { .. }
        )
    }

    pub fn is_not_found(&self) -> bool {
        matches!(self, PortError::NotFound { .. })
    }

    /// Versioning or uniqueness conflict; the caller should reload and
    /// re-check its pre-conditions rather than retry blindly
    pub fn is_conflict(&self) -> bool {
        matches!(self, PortError::Conflict { .. })
    }
}

/// Marker trait every domain port extends
///
/// Guarantees ports can be held as `Arc<dyn ...>` across tasks.
pub trait DomainPort: Send + Sync + 'static {}

/// Per-operation audit context threaded through port calls
///
/// Optional on every port method; adapters attach it to their tracing spans
/// so a request can be followed from the HTTP layer into SQL.
#[derive(Debug, Clone, Default)]
pub struct OperationMetadata {
    pub correlation_id: Option<String>,
    /// User or system that initiated the operation
    pub initiated_by: Option<String>,
    pub source_system: Option<String>,
    pub context: std::collections::HashMap<String, String>,
}

impl OperationMetadata {
    pub fn with_correlation_id(correlation_id: impl Into<String>) -> Self {
        Self {
            correlation_id: Some(correlation_id.into()),
            ..Default::default()
        }
    }

    pub fn with_context(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.context.insert(key.into(), value.into());
        self
    }
}

/// Health of one adapter, as reported on `/health/detailed`
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AdapterHealth {
    Healthy,
    /// Operational but impaired, such as an open circuit breaker with a
    /// working fallback
    Degraded,
    Unhealthy,
    Unknown,
}

/// Outcome of probing one adapter
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct HealthCheckResult {
    pub adapter_id: String,
    pub status: AdapterHealth,
    pub latency_ms: u64,
    pub message: Option<String>,
    pub checked_at: chrono::DateTime<chrono::Utc>,
}

impl HealthCheckResult {
    /// Healthy result with no measured latency
    pub fn healthy(adapter_id: impl Into<String>) -> Self {
        Self {
            adapter_id: adapter_id.into(),
            status: AdapterHealth::Healthy,
            latency_ms: 0,
            message: None,
            checked_at: chrono::Utc::now(),
        }
    }

    /// Unhealthy result carrying the failure message
    pub fn unhealthy(adapter_id: impl Into<String>, message: impl Into<String>) -> Self {
        Self {
            adapter_id: adapter_id.into(),
            status: AdapterHealth::Unhealthy,
            latency_ms: 0,
            message: Some(message.into()),
            checked_at: chrono::Utc::now(),
        }
    }
}

/// Implemented by adapters that can be probed for liveness
#[async_trait::async_trait]
pub trait HealthCheckable: Send + Sync {
    async fn health_check(&self) -> HealthCheckResult;
}

/// Circuit breaker settings for external adapters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CircuitBreakerConfig {
    /// Consecutive failures before the circuit opens
    pub failure_threshold: u32,
    /// Seconds the circuit stays open before letting a probe through
    pub reset_timeout_secs: u64,
    /// Successes required to close again from half-open
    pub success_threshold: u32,
}

impl Default for CircuitBreakerConfig {
    fn default() -> Self {
        Self {
            failure_threshold: 5,
            reset_timeout_secs: 30,
            success_threshold: 3,
        }
    }
}
