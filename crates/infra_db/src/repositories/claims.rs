//! Claim repository implementation
//!
//! This module provides database access for the claims aggregate. One claim
//! spans three tables:
//!
//! - `claims`: scalar columns plus JSONB for the one-to-one nested records
//!   (geometry, Gram Sabha resolution, verification report, title deed,
//!   asset summary) and the remand history
//! - `claim_status_history`: append-only audit trail, ordered by `seq`
//! - `claim_documents`: append-only evidence list, ordered by `seq`
//!
//! The repository speaks rows and SQL only; translation to and from domain
//! types happens in the adapter layer. Writes against an existing claim go
//! through [`ClaimRepository::save`], which enforces the optimistic version
//! guard and appends only the child rows the caller added since loading.

use std::collections::HashMap;

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use sqlx::{PgPool, Postgres, QueryBuilder, Transaction};
use uuid::Uuid;

use crate::error::DatabaseError;

/// Repository for claim aggregate persistence
#[derive(Debug, Clone)]
pub struct ClaimRepository {
    pool: PgPool,
}

impl ClaimRepository {
    /// Creates a new ClaimRepository with the given connection pool
    pub fn new(pool: PgPool) -> Self {
        Self { pool }
    }

    /// Retrieves a claim with its status history and documents
    ///
    /// # Arguments
    ///
    /// * `claim_id` - The claim identifier
    ///
    /// # Returns
    ///
    /// The stored claim record or a NotFound error
    pub async fn get_by_id(&self, claim_id: Uuid) -> Result<ClaimRecord, DatabaseError> {
        let claim = sqlx::query_as::<_, ClaimRow>("SELECT * FROM claims WHERE id = $1")
            .bind(claim_id)
            .fetch_optional(&self.pool)
            .await?
            .ok_or_else(|| DatabaseError::not_found("Claim", claim_id))?;

        let history = self.history_for(vec![claim_id]).await?;
        let documents = self.documents_for(vec![claim_id]).await?;

        Ok(ClaimRecord {
            claim,
            history,
            documents,
        })
    }

    /// Finds claims matching the filter, newest first, paginated
    pub async fn find(&self, filter: &ClaimFilter) -> Result<Vec<ClaimRecord>, DatabaseError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM claims");
        push_filters(&mut builder, filter);
        builder.push(" ORDER BY created_at DESC");
        builder.push(" LIMIT ").push_bind(filter.limit);
        builder.push(" OFFSET ").push_bind(filter.offset);

        let claims = builder
            .build_query_as::<ClaimRow>()
            .fetch_all(&self.pool)
            .await?;

        self.attach_children(claims).await
    }

    /// Counts claims matching the filter, ignoring pagination
    pub async fn count(&self, filter: &ClaimFilter) -> Result<i64, DatabaseError> {
        let mut builder = QueryBuilder::<Postgres>::new("SELECT COUNT(*) FROM claims");
        push_filters(&mut builder, filter);

        let count = builder
            .build_query_scalar::<i64>()
            .fetch_one(&self.pool)
            .await?;

        Ok(count)
    }

    /// All claims whose status is in the given set
    ///
    /// Used by the deadline sweep, so this deliberately does not paginate.
    pub async fn by_statuses(&self, statuses: &[String]) -> Result<Vec<ClaimRecord>, DatabaseError> {
        let claims = sqlx::query_as::<_, ClaimRow>(
            "SELECT * FROM claims WHERE status = ANY($1) ORDER BY created_at",
        )
        .bind(statuses.to_vec())
        .fetch_all(&self.pool)
        .await?;

        self.attach_children(claims).await
    }

    /// Claims touched at or after the given instant
    pub async fn updated_since(
        &self,
        since: DateTime<Utc>,
    ) -> Result<Vec<ClaimRecord>, DatabaseError> {
        let claims = sqlx::query_as::<_, ClaimRow>(
            "SELECT * FROM claims WHERE updated_at >= $1 ORDER BY updated_at",
        )
        .bind(since)
        .fetch_all(&self.pool)
        .await?;

        self.attach_children(claims).await
    }

    /// Claims in a district that count as live parcels for overlap screening
    ///
    /// Only claims carrying geometry qualify. The caller supplies the status
    /// names that count as live; the repository does not know workflow rules.
    ///
    /// # Arguments
    ///
    /// * `district` - District to screen within (case-insensitive)
    /// * `exclude` - A claim to leave out, e.g. the one being resubmitted
    /// * `active_statuses` - Status names counted as live
    /// * `limit` - Upper bound on returned claims
    pub async fn for_screening(
        &self,
        district: &str,
        exclude: Option<Uuid>,
        active_statuses: &[String],
        limit: i64,
    ) -> Result<Vec<ClaimRecord>, DatabaseError> {
        let claims = sqlx::query_as::<_, ClaimRow>(
            r#"
            SELECT * FROM claims
            WHERE lower(district) = lower($1)
              AND status = ANY($2)
              AND geometry IS NOT NULL
              AND ($3::uuid IS NULL OR id <> $3)
            ORDER BY created_at
            LIMIT $4
            "#,
        )
        .bind(district)
        .bind(active_statuses.to_vec())
        .bind(exclude)
        .bind(limit)
        .fetch_all(&self.pool)
        .await?;

        self.attach_children(claims).await
    }

    /// Persists a brand-new claim with its initial history and documents
    ///
    /// Fails with `DatabaseError::DuplicateEntry` when the ID is taken.
    pub async fn insert(&self, record: &ClaimRecord) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;

        insert_claim_row(&mut tx, &record.claim).await?;
        insert_history_rows(&mut tx, &record.history).await?;
        insert_document_rows(&mut tx, &record.documents).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Saves an updated claim under the optimistic version guard
    ///
    /// In one transaction: updates the scalar and JSONB columns only while
    /// the stored row still carries `expected_version`, then appends the
    /// history and document rows beyond what is already stored. The children
    /// are append-only, so the stored row count is exactly the prefix the
    /// caller loaded.
    ///
    /// # Errors
    ///
    /// `DatabaseError::StaleVersion` when another writer got there first,
    /// `DatabaseError::NotFound` when the claim does not exist at all.
    pub async fn save(
        &self,
        record: &ClaimRecord,
        expected_version: i64,
    ) -> Result<(), DatabaseError> {
        let mut tx = self.pool.begin().await?;
        let row = &record.claim;

        let updated = sqlx::query(
            r#"
            UPDATE claims SET
                claimant_id = $2,
                claimant_name = $3,
                village = $4,
                district = $5,
                state = $6,
                survey_number = $7,
                claim_type = $8,
                land_size_claimed = $9,
                reason = $10,
                geometry = $11,
                village_centroid_fallback = $12,
                status = $13,
                gram_sabha_resolution = $14,
                verification_report = $15,
                remand_history = $16,
                verified_by = $17,
                verified_at = $18,
                verification_notes = $19,
                approved_by = $20,
                approved_at = $21,
                approval_notes = $22,
                rejection_reason = $23,
                title_deed = $24,
                asset_summary = $25,
                assigned_to = $26,
                version = $27,
                updated_at = $28
            WHERE id = $1 AND version = $29
            "#,
        )
        .bind(row.id)
        .bind(row.claimant_id)
        .bind(&row.claimant_name)
        .bind(&row.village)
        .bind(&row.district)
        .bind(&row.state)
        .bind(&row.survey_number)
        .bind(&row.claim_type)
        .bind(row.land_size_claimed)
        .bind(&row.reason)
        .bind(&row.geometry)
        .bind(row.village_centroid_fallback)
        .bind(&row.status)
        .bind(&row.gram_sabha_resolution)
        .bind(&row.verification_report)
        .bind(&row.remand_history)
        .bind(row.verified_by)
        .bind(row.verified_at)
        .bind(&row.verification_notes)
        .bind(row.approved_by)
        .bind(row.approved_at)
        .bind(&row.approval_notes)
        .bind(&row.rejection_reason)
        .bind(&row.title_deed)
        .bind(&row.asset_summary)
        .bind(row.assigned_to)
        .bind(row.version)
        .bind(row.updated_at)
        .bind(expected_version)
        .execute(&mut *tx)
        .await?;

        if updated.rows_affected() == 0 {
            let stored: Option<i64> = sqlx::query_scalar("SELECT version FROM claims WHERE id = $1")
                .bind(row.id)
                .fetch_optional(&mut *tx)
                .await?;
            return Err(match stored {
                Some(_) => DatabaseError::stale_version("Claim", row.id),
                None => DatabaseError::not_found("Claim", row.id),
            });
        }

        let stored_history: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM claim_status_history WHERE claim_id = $1")
                .bind(row.id)
                .fetch_one(&mut *tx)
                .await?;
        let new_history = record.history.get(stored_history as usize..).unwrap_or(&[]);
        insert_history_rows(&mut tx, new_history).await?;

        let stored_documents: i64 =
            sqlx::query_scalar("SELECT COUNT(*) FROM claim_documents WHERE claim_id = $1")
                .bind(row.id)
                .fetch_one(&mut *tx)
                .await?;
        let new_documents = record
            .documents
            .get(stored_documents as usize..)
            .unwrap_or(&[]);
        insert_document_rows(&mut tx, new_documents).await?;

        tx.commit().await?;
        Ok(())
    }

    /// Status history rows for a set of claims, in append order
    async fn history_for(
        &self,
        claim_ids: Vec<Uuid>,
    ) -> Result<Vec<StatusHistoryRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, StatusHistoryRow>(
            r#"
            SELECT claim_id, seq, status, changed_by, changed_at, reason
            FROM claim_status_history
            WHERE claim_id = ANY($1)
            ORDER BY claim_id, seq
            "#,
        )
        .bind(claim_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Document rows for a set of claims, in append order
    async fn documents_for(&self, claim_ids: Vec<Uuid>) -> Result<Vec<DocumentRow>, DatabaseError> {
        let rows = sqlx::query_as::<_, DocumentRow>(
            r#"
            SELECT id, claim_id, seq, name, kind, storage_ref, sha256,
                   uploaded_by, uploaded_at, extraction
            FROM claim_documents
            WHERE claim_id = ANY($1)
            ORDER BY claim_id, seq
            "#,
        )
        .bind(claim_ids)
        .fetch_all(&self.pool)
        .await?;

        Ok(rows)
    }

    /// Bundles child rows onto a page of claim rows with two batch queries
    async fn attach_children(
        &self,
        claims: Vec<ClaimRow>,
    ) -> Result<Vec<ClaimRecord>, DatabaseError> {
        if claims.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = claims.iter().map(|c| c.id).collect();

        let mut history_by_claim: HashMap<Uuid, Vec<StatusHistoryRow>> = HashMap::new();
        for row in self.history_for(ids.clone()).await? {
            history_by_claim.entry(row.claim_id).or_default().push(row);
        }

        let mut documents_by_claim: HashMap<Uuid, Vec<DocumentRow>> = HashMap::new();
        for row in self.documents_for(ids).await? {
            documents_by_claim.entry(row.claim_id).or_default().push(row);
        }

        Ok(claims
            .into_iter()
            .map(|claim| {
                let history = history_by_claim.remove(&claim.id).unwrap_or_default();
                let documents = documents_by_claim.remove(&claim.id).unwrap_or_default();
                ClaimRecord {
                    claim,
                    history,
                    documents,
                }
            })
            .collect())
    }
}

/// Appends the filter conditions to a claims query
fn push_filters(builder: &mut QueryBuilder<'_, Postgres>, filter: &ClaimFilter) {
    builder.push(" WHERE TRUE");

    if let Some(ref state) = filter.state {
        builder
            .push(" AND lower(state) = lower(")
            .push_bind(state.clone())
            .push(")");
    }
    if let Some(ref district) = filter.district {
        builder
            .push(" AND lower(district) = lower(")
            .push_bind(district.clone())
            .push(")");
    }
    if let Some(ref village) = filter.village {
        builder
            .push(" AND lower(village) = lower(")
            .push_bind(village.clone())
            .push(")");
    }
    if let Some(ref status) = filter.status {
        builder.push(" AND status = ").push_bind(status.clone());
    }
    if let Some(claimant_id) = filter.claimant_id {
        builder.push(" AND claimant_id = ").push_bind(claimant_id);
    }
    if let Some(ref search) = filter.search {
        let pattern = format!("%{}%", escape_like(search));
        builder
            .push(" AND (claimant_name ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR village ILIKE ")
            .push_bind(pattern.clone())
            .push(" OR survey_number ILIKE ")
            .push_bind(pattern)
            .push(")");
    }
}

/// Escapes LIKE wildcards so search terms match literally
fn escape_like(raw: &str) -> String {
    let mut escaped = String::with_capacity(raw.len());
    for ch in raw.chars() {
        if matches!(ch, '%' | '_' | '\\') {
            escaped.push('\\');
        }
        escaped.push(ch);
    }
    escaped
}

async fn insert_claim_row(
    tx: &mut Transaction<'_, Postgres>,
    row: &ClaimRow,
) -> Result<(), DatabaseError> {
    sqlx::query(
        r#"
        INSERT INTO claims (
            id, claimant_id, claimant_name, village, district, state,
            survey_number, claim_type, land_size_claimed, reason, geometry,
            village_centroid_fallback, status, gram_sabha_resolution,
            verification_report, remand_history, verified_by, verified_at,
            verification_notes, approved_by, approved_at, approval_notes,
            rejection_reason, title_deed, asset_summary, assigned_to,
            version, created_at, updated_at
        ) VALUES (
            $1, $2, $3, $4, $5, $6, $7, $8, $9, $10, $11, $12, $13, $14, $15,
            $16, $17, $18, $19, $20, $21, $22, $23, $24, $25, $26, $27, $28, $29
        )
        "#,
    )
    .bind(row.id)
    .bind(row.claimant_id)
    .bind(&row.claimant_name)
    .bind(&row.village)
    .bind(&row.district)
    .bind(&row.state)
    .bind(&row.survey_number)
    .bind(&row.claim_type)
    .bind(row.land_size_claimed)
    .bind(&row.reason)
    .bind(&row.geometry)
    .bind(row.village_centroid_fallback)
    .bind(&row.status)
    .bind(&row.gram_sabha_resolution)
    .bind(&row.verification_report)
    .bind(&row.remand_history)
    .bind(row.verified_by)
    .bind(row.verified_at)
    .bind(&row.verification_notes)
    .bind(row.approved_by)
    .bind(row.approved_at)
    .bind(&row.approval_notes)
    .bind(&row.rejection_reason)
    .bind(&row.title_deed)
    .bind(&row.asset_summary)
    .bind(row.assigned_to)
    .bind(row.version)
    .bind(row.created_at)
    .bind(row.updated_at)
    .execute(&mut **tx)
    .await?;

    Ok(())
}

async fn insert_history_rows(
    tx: &mut Transaction<'_, Postgres>,
    rows: &[StatusHistoryRow],
) -> Result<(), DatabaseError> {
    for row in rows {
        sqlx::query(
            r#"
            INSERT INTO claim_status_history (claim_id, seq, status, changed_by, changed_at, reason)
            VALUES ($1, $2, $3, $4, $5, $6)
            "#,
        )
        .bind(row.claim_id)
        .bind(row.seq)
        .bind(&row.status)
        .bind(row.changed_by)
        .bind(row.changed_at)
        .bind(&row.reason)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

async fn insert_document_rows(
    tx: &mut Transaction<'_, Postgres>,
    rows: &[DocumentRow],
) -> Result<(), DatabaseError> {
    for row in rows {
        sqlx::query(
            r#"
            INSERT INTO claim_documents (
                id, claim_id, seq, name, kind, storage_ref, sha256,
                uploaded_by, uploaded_at, extraction
            ) VALUES ($1, $2, $3, $4, $5, $6, $7, $8, $9, $10)
            "#,
        )
        .bind(row.id)
        .bind(row.claim_id)
        .bind(row.seq)
        .bind(&row.name)
        .bind(&row.kind)
        .bind(&row.storage_ref)
        .bind(&row.sha256)
        .bind(row.uploaded_by)
        .bind(row.uploaded_at)
        .bind(&row.extraction)
        .execute(&mut **tx)
        .await?;
    }
    Ok(())
}

// ============================================================================
// Row types
// ============================================================================

/// Database row for the claims table
///
/// Nested one-to-one records travel as JSONB; the adapter layer owns the
/// conversion to domain types.
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct ClaimRow {
    pub id: Uuid,
    pub claimant_id: Option<Uuid>,
    pub claimant_name: String,
    pub village: String,
    pub district: String,
    pub state: String,
    pub survey_number: Option<String>,
    pub claim_type: String,
    pub land_size_claimed: Decimal,
    pub reason: Option<String>,
    pub geometry: Option<serde_json::Value>,
    pub village_centroid_fallback: bool,
    pub status: String,
    pub gram_sabha_resolution: Option<serde_json::Value>,
    pub verification_report: Option<serde_json::Value>,
    pub remand_history: serde_json::Value,
    pub verified_by: Option<Uuid>,
    pub verified_at: Option<DateTime<Utc>>,
    pub verification_notes: Option<String>,
    pub approved_by: Option<Uuid>,
    pub approved_at: Option<DateTime<Utc>>,
    pub approval_notes: Option<String>,
    pub rejection_reason: Option<String>,
    pub title_deed: Option<serde_json::Value>,
    pub asset_summary: Option<serde_json::Value>,
    pub assigned_to: Option<Uuid>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Database row for one status history entry
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct StatusHistoryRow {
    pub claim_id: Uuid,
    pub seq: i32,
    pub status: String,
    pub changed_by: Uuid,
    pub changed_at: DateTime<Utc>,
    pub reason: Option<String>,
}

/// Database row for one attached document
#[derive(Debug, Clone, sqlx::FromRow)]
pub struct DocumentRow {
    pub id: Uuid,
    pub claim_id: Uuid,
    pub seq: i32,
    pub name: String,
    pub kind: String,
    pub storage_ref: String,
    pub sha256: String,
    pub uploaded_by: Uuid,
    pub uploaded_at: DateTime<Utc>,
    pub extraction: Option<serde_json::Value>,
}

/// A claim with its child rows, exactly as stored
#[derive(Debug, Clone)]
pub struct ClaimRecord {
    pub claim: ClaimRow,
    pub history: Vec<StatusHistoryRow>,
    pub documents: Vec<DocumentRow>,
}

/// Storage-level claim filter
///
/// The adapter derives this from the domain query; status names arrive
/// already rendered to their TEXT column form.
#[derive(Debug, Clone)]
pub struct ClaimFilter {
    pub state: Option<String>,
    pub district: Option<String>,
    pub village: Option<String>,
    pub status: Option<String>,
    pub claimant_id: Option<Uuid>,
    pub search: Option<String>,
    pub offset: i64,
    pub limit: i64,
}

impl Default for ClaimFilter {
    fn default() -> Self {
        Self {
            state: None,
            district: None,
            village: None,
            status: None,
            claimant_id: None,
            search: None,
            offset: 0,
            limit: 20,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_escape_like_neutralizes_wildcards() {
        assert_eq!(escape_like("55/3"), "55/3");
        assert_eq!(escape_like("100%"), "100\\%");
        assert_eq!(escape_like("sn_12"), "sn\\_12");
        assert_eq!(escape_like("a\\b"), "a\\\\b");
    }

    #[test]
    fn test_filter_defaults_to_first_page() {
        let filter = ClaimFilter::default();
        assert_eq!(filter.offset, 0);
        assert_eq!(filter.limit, 20);
        assert!(filter.status.is_none());
    }

    #[test]
    fn test_push_filters_includes_only_set_conditions() {
        let filter = ClaimFilter {
            district: Some("Mandla".to_string()),
            status: Some("Submitted".to_string()),
            ..Default::default()
        };
        let mut builder = QueryBuilder::<Postgres>::new("SELECT * FROM claims");
        push_filters(&mut builder, &filter);
        let sql = builder.sql();

        assert!(sql.contains("lower(district)"));
        assert!(sql.contains("status = "));
        assert!(!sql.contains("claimant_id"));
        assert!(!sql.contains("ILIKE"));
    }
}
