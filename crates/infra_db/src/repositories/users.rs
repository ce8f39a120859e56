//! User repository implementation
//!
//! Read-mostly access to the `users` table. The workflow only ever looks
//! actors up for ownership checks, work routing, and alert fan-out; account
//! management lives outside this service. Roles are stored as a JSONB array
//! of role names so officers can hold several roles without a join table.

use chrono::{DateTime, Utc};
use sqlx::PgPool;
use uuid::Uuid;

use crate::error::DatabaseError;

/// Repository for user lookups
#[derive(Debug, Clone)]
pub struct UserRepository {
    pool: PgPool,
}

impl UserRepository {
    /// Creates a new UserRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Retrieves a user by their identifier
    pub async fn get_by_id(&self, user_id: Uuid) -> Result<UserRow, DatabaseError> {
        let user = sqlx::query_as::<_, UserRow>("SELECT * FROM users WHERE id = $1")
            .bind(user_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("User", user_id))?;

        Ok(user)
    }

    /// Active users holding the given role, optionally narrowed to a district
    ///
    /// # Arguments
    ///
    /// * `role` - JSONB array containing the wanted role name, matched with
    ///   the `@>` containment operator
    /// * `district` - When set, only users posted to this district
    pub async fn with_role(
        &self,
        role: &serde_json::Value,
        district: Option<&str>,
    ) -> Result<Vec<UserRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, UserRow>(
            r#"
            SELECT * FROM users
            WHERE active
              AND roles @> $1
              AND ($2::text IS NULL OR lower(district) = lower($2))
            ORDER BY name
            "#,
        )
        .bind(role)
        .bind(district)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Inserts a user row
    ///
    /// Used by integration tests and seeding; the API itself never creates
    /// users.
    pub async fn insert(&self, row: &UserRow) -> Result<(), DatabaseError> {
        sqlx::query(
            r#"
            INSERT INTO users (
                id, name, email, roles, state, district, village, active,
                created_at, updated_at
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(row.id)
        .bind(&row.name)
        .bind(&row.email)
        .bind(&row.roles)
        .bind(&row.state)
        .bind(&row.district)
        .bind(&row.village)
        .bind(row.active)
        .bind(row.created_at)
        .bind(row.updated_at)
        .execute(&self.pool)
        .await?;

        Ok(())
    }
}

/// Database row for a user
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct UserRow {
    pub id: Uuid,
    pub name: String,
    pub email: Option<String>,
    pub roles: serde_json::Value,
    pub state: Option<String>,
    pub district: Option<String>,
    pub village: Option<String>,
    pub active: bool,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}
