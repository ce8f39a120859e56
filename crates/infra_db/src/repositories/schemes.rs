//! Scheme repository implementation
//!
//! Access to the `schemes` catalog table. Eligibility rules and benefit
//! lists are stored as JSONB in the shape the portal writes them; the
//! adapter layer parses them into typed rules.

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;

/// Repository for the benefit-scheme catalog
#[derive(Debug, Clone)]
pub struct SchemeRepository {
    pool: PgPool,
}

impl SchemeRepository {
    /// Creates a new SchemeRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Retrieves a scheme by its identifier
    pub async fn get_by_id(&self, scheme_id: Uuid) -> Result<SchemeRow, DatabaseError> {
        let scheme = sqlx::query_as::<_, SchemeRow>("SELECT * FROM schemes WHERE id = $1")
            .bind(scheme_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Scheme", scheme_id))?;

        Ok(scheme)
    }

    /// Lists schemes, optionally narrowed to one status, sorted by name
    pub async fn list(&self, status: Option<&str>) -> Result<Vec<SchemeRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, SchemeRow>(
            r#"
            SELECT * FROM schemes
            WHERE ($1::text IS NULL OR status = $1)
            ORDER BY name
            "#,
        )
        .bind(status)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Inserts a scheme row
    ///
    /// The catalog is normally seeded by migration; this exists for
    /// integration tests and admin tooling.
    pub async fn insert(&self, row: &SchemeRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO schemes (
                id, name, category, status, budget, department, description,
                rules, benefits, created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11)
            "#,
        )
        .bind(row.id)
        .bind(&row.name)
        .bind(&row.category)
        .bind(&row.status)
        .bind(row.budget)
        .bind(&row.department)
        .bind(&row.description)
        .bind(&row.rules)
        .bind(&row.benefits)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Database row for a benefit scheme
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct SchemeRow {
    pub id: Uuid,
    pub name: String,
    pub category: String,
    pub status: String,
    pub budget: Option<Decimal>,
    pub department: String,
    pub description: String,
    pub rules: serde_json::Value,
    pub benefits: serde_json::Value,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
