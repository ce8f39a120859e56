//! PostgreSQL Scheme Catalog Adapter
//!
//! Implements the `SchemeCatalog` port over the `schemes` table. Eligibility
//! rule trees and benefit lists are JSONB payloads; statuses travel as their
//! wire names so the catalog can be filtered in SQL.

use async_trait::async_trait;
use chrono::Utc;
use tracing::{debug, instrument};
use uuid::Uuid;

use core_kernel::{
    AdapterHealth, DomainPort, HealthCheckResult, HealthCheckable, OperationMetadata, PortError,
    SchemeId,
};
use domain_schemes::{Scheme, SchemeCatalog, SchemeStatus};

use crate::adapters::{db_to_port_error, decode_json, encode_json};
use crate::error::DatabaseError;
use crate::pool::DatabasePool;
use crate::repositories::schemes::{SchemeRepository, SchemeRow};

/// PostgreSQL-backed implementation of the `SchemeCatalog` port
pub struct PostgresSchemeCatalog {
    repository: SchemeRepository,
    pool: DatabasePool,
}

impl PostgresSchemeCatalog {
    /// Creates a new adapter over the given connection pool
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            repository: SchemeRepository::new(pool.clone()),
            pool,
        }
    }

    /// Returns a reference to the underlying repository
    pub fn repository(&self) -> &SchemeRepository {
        &self.repository
    }
}

impl DomainPort for PostgresSchemeCatalog {}

#[async_trait]
impl HealthCheckable for PostgresSchemeCatalog {
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();
        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await;
        let latency_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(_) => HealthCheckResult {
                adapter_id: "postgres-scheme-catalog".to_string(),
                status: AdapterHealth::Healthy,
                latency_ms,
                message: None,
                checked_at: Utc::now(),
            },
            Err(e) => HealthCheckResult {
                adapter_id: "postgres-scheme-catalog".to_string(),
                status: AdapterHealth::Unhealthy,
                latency_ms,
                message: Some(format!("Database health check failed: {e}")),
                checked_at: Utc::now(),
            },
        }
    }
}

#[async_trait]
impl SchemeCatalog for PostgresSchemeCatalog {
    #[instrument(skip(self, _metadata), fields(scheme_id = %id))]
    async fn get_scheme(
        &self,
        id: SchemeId,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Scheme, PortError> {
        debug!("Fetching scheme");
        let row = self
            .repository
            .get_by_id(id.into())
            .await
            .map_err(db_to_port_error)?;
        row_to_scheme(row).map_err(db_to_port_error)
    }

    #[instrument(skip(self, _metadata))]
    async fn list_schemes(
        &self,
        status: Option<SchemeStatus>,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Vec<Scheme>, PortError> {
        debug!("Listing schemes");
        let rows = self
            .repository
            .list(status.map(|s| s.as_str()))
            .await
            .map_err(db_to_port_error)?;
        rows.into_iter()
            .map(|r| row_to_scheme(r).map_err(db_to_port_error))
            .collect()
    }
}

// ============================================================================
// Conversion Functions
// ============================================================================

fn row_to_scheme(row: SchemeRow) -> Result<Scheme, DatabaseError> {
    let status: SchemeStatus = row.status.parse().map_err(|_| {
        DatabaseError::Serialization(format!("Unknown scheme status in storage: {}", row.status))
    })?;

    Ok(Scheme {
        id: SchemeId::from_uuid(row.id),
        name: row.name,
        category: row.category,
        status,
        budget: row.budget,
        department: row.department,
        description: row.description,
        rules: decode_json(row.rules, "scheme rules")?,
        benefits: decode_json(row.benefits, "scheme benefits")?,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}

/// Flattens a scheme into its row representation; used by seeding and tests.
pub fn scheme_to_row(scheme: &Scheme) -> Result<SchemeRow, DatabaseError> {
    Ok(SchemeRow {
        id: Uuid::from(scheme.id),
        name: scheme.name.clone(),
        category: scheme.category.clone(),
        status: scheme.status.as_str().to_string(),
        budget: scheme.budget,
        department: scheme.department.clone(),
        description: scheme.description.clone(),
        rules: encode_json(&scheme.rules)?,
        benefits: encode_json(&scheme.benefits)?,
        created_at: scheme.created_at,
        updated_at: scheme.updated_at,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_schemes::{EligibilityRule, RuleCriteria, RuleOperator};
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn sample_scheme() -> Scheme {
        let now = Utc::now();
        Scheme {
            id: SchemeId::new(),
            name: "Van Dhan Vikas".to_string(),
            category: "Livelihood".to_string(),
            status: SchemeStatus::Active,
            budget: Some(dec!(5000000)),
            department: "Tribal Affairs".to_string(),
            description: "Value addition for forest produce".to_string(),
            rules: vec![EligibilityRule::new(
                RuleCriteria::HasApprovedClaim,
                RuleOperator::Eq,
                json!(true),
            )],
            benefits: vec!["Working capital grant".to_string()],
            created_at: now,
            updated_at: now,
        }
    }

    #[test]
    fn scheme_survives_row_round_trip() {
        let scheme = sample_scheme();
        let row = scheme_to_row(&scheme).unwrap();
        assert_eq!(row.status, "Active");

        let restored = row_to_scheme(row).unwrap();
        assert_eq!(
            serde_json::to_value(&scheme).unwrap(),
            serde_json::to_value(&restored).unwrap()
        );
    }

    #[test]
    fn unknown_status_in_storage_is_a_serialization_error() {
        let scheme = sample_scheme();
        let mut row = scheme_to_row(&scheme).unwrap();
        row.status = "Paused".to_string();

        let err = row_to_scheme(row).unwrap_err();
        assert!(err.to_string().contains("Unknown scheme status"));
    }
}
