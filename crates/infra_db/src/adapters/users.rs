//! PostgreSQL User Directory Adapter
//!
//! Implements the `UserDirectory` port over the `users` table. Role lists
//! are stored as JSONB arrays of wire names, which is also how officer
//! lookups are expressed: a `@>` containment probe against the wanted role.
//!
//! Role strings nobody recognizes are skipped with a warning rather than
//! failing the lookup; a stale directory entry must not take routing down
//! with it.

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, instrument, warn};

use core_kernel::{
    AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable, OperationMetadata, PortError,
    Role, UserId,
};
use domain_claims::ports::{UserDirectory, UserRecord};

use crate::adapters::db_to_port_error;
use crate::error::DatabaseError;
use crate::pool::DatabasePool;
use crate::repositories::users::{UserRepository, UserRow};

/// PostgreSQL-backed implementation of the `UserDirectory` port
pub struct PostgresUserDirectory {
    repository: UserRepository,
    pool: DatabasePool,
}

impl PostgresUserDirectory {
    /// Creates a new adapter over the given connection pool
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            repository: UserRepository::new(pool.clone()),
            pool,
        }
    }

    /// Returns a reference to the underlying repository
    pub fn repository(&self) -> &UserRepository {
        &self.repository
    }
}

impl DomainPort for PostgresUserDirectory {}

#[async_trait]
impl HealthCheckable for PostgresUserDirectory {
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();
        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await;
        let latency_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(_) => HealthCheckResult {
                adapter_id: "postgres-user-directory".to_string(),
                status: AdapterHealth::Healthy,
                latency_ms,
                message: None,
                checked_at: Utc::now(),
            },
            Err(e) => HealthCheckResult {
                adapter_id: "postgres-user-directory".to_string(),
                status: AdapterHealth::Unhealthy,
                latency_ms,
                message: Some(format!("Database health check failed: {e}")),
                checked_at: Utc::now(),
            },
        }
    }
}

#[async_trait]
impl UserDirectory for PostgresUserDirectory {
    #[instrument(skip(self, _metadata), fields(user_id = %id))]
    async fn get_user(
        &self,
        id: UserId,
        _metadata: Option<OperationMetadata>,
    ) -> Result<UserRecord, PortError> {
        debug!("Fetching user");
        let row = self
            .repository
            .get_by_id(id.into())
            .await
            .map_err(db_to_port_error)?;
        row_to_record(row).map_err(db_to_port_error)
    }

    #[instrument(skip(self, _metadata), fields(role = %role))]
    async fn find_officers(
        &self,
        role: Role,
        district: Option<String>,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Vec<UserRecord>, PortError> {
        debug!("Finding officers");
        let probe = role_probe(role).map_err(db_to_port_error)?;
        let rows = self
            .repository
            .with_role(&probe, district.as_deref())
            .await
            .map_err(db_to_port_error)?;
        rows.into_iter()
            .map(|r| row_to_record(r).map_err(db_to_port_error))
            .collect()
    }

    #[instrument(skip(self, _metadata))]
    async fn super_admins(
        &self,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Vec<UserRecord>, PortError> {
        debug!("Finding super admins");
        let probe = role_probe(Role::SuperAdmin).map_err(db_to_port_error)?;
        let rows = self
            .repository
            .with_role(&probe, None)
            .await
            .map_err(db_to_port_error)?;
        rows.into_iter()
            .map(|r| row_to_record(r).map_err(db_to_port_error))
            .collect()
    }
}

// ============================================================================
// Conversion Functions
// ============================================================================

/// JSONB containment probe for one role, e.g. `["Field Worker"]`.
fn role_probe(role: Role) -> Result<serde_json::Value, DatabaseError> {
    serde_json::to_value(vec![role]).map_err(DatabaseError::serialization)
}

/// Converts a user row into the port record, dropping unknown role names.
fn row_to_record(row: UserRow) -> Result<UserRecord, DatabaseError> {
    let names: Vec<String> = serde_json::from_value(row.roles)
        .map_err(|e| DatabaseError::Serialization(format!("user roles: {e}")))?;

    let mut roles = Vec::with_capacity(names.len());
    for name in names {
        match name.parse::<Role>() {
            Ok(role) => roles.push(role),
            Err(_) => {
                warn!(user_id = %row.id, role = %name, "Skipping unknown role on user record");
            }
        }
    }

    Ok(UserRecord {
        id: UserId::from_uuid(row.id),
        name: row.name,
        email: row.email,
        roles,
        state: row.state,
        district: row.district,
        village: row.village,
        active: row.active,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn row_with_roles(roles: serde_json::Value) -> UserRow {
        UserRow {
            id: Uuid::new_v4(),
            name: "Asha Patel".to_string(),
            email: Some("asha@example.org".to_string()),
            roles,
            state: Some("Madhya Pradesh".to_string()),
            district: Some("Mandla".to_string()),
            village: None,
            active: true,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        }
    }

    #[test]
    fn role_probe_uses_wire_names() {
        let probe = role_probe(Role::DataEntryOfficer).unwrap();
        assert_eq!(probe, serde_json::json!(["Data Entry Officer"]));
    }

    #[test]
    fn known_roles_come_through() {
        let row = row_with_roles(serde_json::json!(["Field Worker", "Verification Officer"]));
        let record = row_to_record(row).unwrap();
        assert_eq!(
            record.roles,
            vec![Role::FieldWorker, Role::VerificationOfficer]
        );
        assert_eq!(record.district.as_deref(), Some("Mandla"));
    }

    #[test]
    fn unknown_role_is_skipped_not_fatal() {
        let row = row_with_roles(serde_json::json!(["Field Worker", "Time Traveller"]));
        let record = row_to_record(row).unwrap();
        assert_eq!(record.roles, vec![Role::FieldWorker]);
    }

    #[test]
    fn malformed_roles_payload_is_an_error() {
        let row = row_with_roles(serde_json::json!({"not": "a list"}));
        assert!(row_to_record(row).is_err());
    }
}
