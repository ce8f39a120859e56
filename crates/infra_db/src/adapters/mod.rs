//! Domain Adapters
//!
//! This module provides adapter implementations for domain ports,
//! connecting domain interfaces to the PostgreSQL database layer.
//!
//! # Architecture
//!
//! Each domain has a corresponding adapter that:
//! - Implements the domain's port trait
//! - Translates between domain models and database row types
//! - Uses the repository layer for database operations
//!
//! # Usage
//!
//! ```rust,ignore
//! use infra_db::adapters::PostgresClaimStore;
//! use domain_claims::ClaimStore;
//!
//! let store = PostgresClaimStore::new(pool);
//! let claim = store.get_claim(claim_id, None).await?;
//! ```

use core_kernel::PortError;

use crate::error::DatabaseError;

pub mod claims;
pub mod schemes;
pub mod users;

pub use claims::PostgresClaimStore;
pub use schemes::PostgresSchemeCatalog;
pub use users::PostgresUserDirectory;

/// Translate a storage-layer error into the port vocabulary.
///
/// Row-not-found and version-mismatch cases keep their identity so domain
/// services can branch on them; infrastructure faults collapse into the
/// transient or internal buckets.
pub(crate) fn db_to_port_error(err: DatabaseError) -> PortError {
    match err {
        DatabaseError::NotFound { entity, id } => PortError::not_found(entity, id),
        DatabaseError::StaleVersion { entity, id } => {
            PortError::conflict(format!("{entity} {id} version mismatch"))
        }
        DatabaseError::DuplicateEntry(message) => PortError::conflict(message),
        err if err.is_connection_error() => PortError::service_unavailable("postgres"),
        err => PortError::internal(err.to_string()),
    }
}

/// Serialize a domain value into a JSONB column payload.
pub(crate) fn encode_json<T: serde::Serialize>(
    value: &T,
) -> Result<serde_json::Value, DatabaseError> {
    serde_json::to_value(value).map_err(DatabaseError::serialization)
}

/// Serialize an optional domain value, keeping `None` as SQL NULL.
pub(crate) fn encode_json_opt<T: serde::Serialize>(
    value: &Option<T>,
) -> Result<Option<serde_json::Value>, DatabaseError> {
    value.as_ref().map(encode_json).transpose()
}

/// Deserialize a JSONB column payload back into a domain value.
pub(crate) fn decode_json<T: serde::de::DeserializeOwned>(
    value: serde_json::Value,
    context: &str,
) -> Result<T, DatabaseError> {
    serde_json::from_value(value)
        .map_err(|e| DatabaseError::Serialization(format!("{context}: {e}")))
}

/// Deserialize an optional JSONB column, keeping SQL NULL as `None`.
pub(crate) fn decode_json_opt<T: serde::de::DeserializeOwned>(
    value: Option<serde_json::Value>,
    context: &str,
) -> Result<Option<T>, DatabaseError> {
    value.map(|v| decode_json(v, context)).transpose()
}
