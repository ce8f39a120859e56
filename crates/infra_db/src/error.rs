//! Database error types
//!
//! [`DatabaseError`] is the error currency of the persistence layer. SQLx
//! errors are classified as they cross into this crate: PostgreSQL constraint
//! violations become their own variants so adapters can translate them to the
//! right `PortError` without string matching.

use thiserror::Error;

/// Errors produced by the database layer
#[derive(Error, Debug)]
pub enum DatabaseError {
    /// Could not establish a connection to PostgreSQL
    #[error("Database connection failed: {0}")]
    ConnectionFailed(String),

    /// The requested row does not exist
    #[error("{entity} not found: {id}")]
    NotFound { entity: String, id: String },

    /// A unique constraint rejected the write (PostgreSQL 23505)
    #[error("Duplicate entry: {0}")]
    DuplicateEntry(String),

    /// A referenced row is missing (PostgreSQL 23503)
    #[error("Foreign key violation: {0}")]
    ForeignKeyViolation(String),

    /// A CHECK constraint rejected the write (PostgreSQL 23514)
    #[error("Check constraint violation: {0}")]
    CheckViolation(String),

    /// An exclusion constraint rejected the write (PostgreSQL 23P01)
    #[error("Exclusion constraint violation: {0}")]
    ExclusionViolation(String),

    /// An optimistic-concurrency write found a newer version already stored
    #[error("Stale version writing {entity} {id}")]
    StaleVersion { entity: String, id: String },

    /// No connection became available within the acquire timeout
    #[error("Connection pool exhausted")]
    PoolExhausted,

    /// Schema migration could not be applied
    #[error("Migration failed: {0}")]
    MigrationFailed(String),

    /// A JSONB column could not be decoded into its domain type
    #[error("Row serialization failed: {0}")]
    Serialization(String),

    /// Any other SQLx failure
    #[error("Query failed: {0}")]
    QueryFailed(#[source] sqlx::Error),
}

impl DatabaseError {
    /// Creates a NotFound error
    ///
    /// # Arguments
    ///
    /// * `entity` - The type of entity (e.g., "Claim", "Scheme")
    /// * `id` - The identifier that was not found
    pub fn not_found(entity: impl Into<String>, id: impl std::fmt::Display) -> Self {
        DatabaseError::NotFound {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Creates a DuplicateEntry error for a known field collision
    pub fn duplicate(entity: &str, field: &str, value: impl std::fmt::Display) -> Self {
        DatabaseError::DuplicateEntry(format!("{entity} with {field} = {value} already exists"))
    }

    /// Creates a StaleVersion error
    pub fn stale_version(entity: impl Into<String>, id: impl std::fmt::Display) -> Self {
        DatabaseError::StaleVersion {
            entity: entity.into(),
            id: id.to_string(),
        }
    }

    /// Creates a Serialization error from any serde failure
    pub fn serialization(err: impl std::fmt::Display) -> Self {
        DatabaseError::Serialization(err.to_string())
    }

    /// Checks if this error indicates a missing row
    pub fn is_not_found(&self) -> bool {
        matches!(self, DatabaseError::NotFound { .. })
    }

    /// Checks if this error indicates a uniqueness collision
    pub fn is_duplicate(&self) -> bool {
        matches!(self, DatabaseError::DuplicateEntry(_))
    }

    /// Checks if this error indicates a lost optimistic-concurrency race
    pub fn is_stale_version(&self) -> bool {
        matches!(self, DatabaseError::StaleVersion { .. })
    }

    /// Checks if this error indicates the database itself is unreachable
    pub fn is_connection_error(&self) -> bool {
        matches!(
            self,
            DatabaseError::ConnectionFailed(_) | DatabaseError::PoolExhausted
        )
    }
}

/// Classifies SQLx errors into database-layer variants
///
/// Constraint violations are recognized by their PostgreSQL error code
/// (https://www.postgresql.org/docs/current/errcodes-appendix.html) so
/// callers can react to duplicates and broken references specifically.
impl From<sqlx::Error> for DatabaseError {
    fn from(err: sqlx::Error) -> Self {
        if matches!(err, sqlx::Error::PoolTimedOut) {
            return DatabaseError::PoolExhausted;
        }
        if let Some(db_err) = err.as_database_error() {
            let message = db_err.message().to_string();
            match db_err.code().as_deref() {
                Some("23505") => return DatabaseError::DuplicateEntry(message),
                Some("23503") => return DatabaseError::ForeignKeyViolation(message),
                Some("23514") => return DatabaseError::CheckViolation(message),
                Some("23P01") => return DatabaseError::ExclusionViolation(message),
                _ => {}
            }
        }
        DatabaseError::QueryFailed(err)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_not_found_formatting() {
        let err = DatabaseError::not_found("Claim", "CLM-123");
        assert!(err.is_not_found());
        assert_eq!(err.to_string(), "Claim not found: CLM-123");
    }

    #[test]
    fn test_duplicate_formatting() {
        let err = DatabaseError::duplicate("Document", "sha256", "abc123");
        assert!(err.is_duplicate());
        assert!(err.to_string().contains("sha256 = abc123"));
    }

    #[test]
    fn test_stale_version_is_distinct_from_duplicate() {
        let err = DatabaseError::stale_version("Claim", "CLM-123");
        assert!(err.is_stale_version());
        assert!(!err.is_duplicate());
        assert!(!err.is_not_found());
    }

    #[test]
    fn test_pool_timeout_classification() {
        let err = DatabaseError::from(sqlx::Error::PoolTimedOut);
        assert!(err.is_connection_error());
    }

    #[test]
    fn test_unclassified_errors_stay_query_failures() {
        let err = DatabaseError::from(sqlx::Error::RowNotFound);
        assert!(matches!(err, DatabaseError::QueryFailed(_)));
    }
}
