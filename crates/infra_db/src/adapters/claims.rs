//! PostgreSQL Claim Store Adapter
//!
//! Implements the `ClaimStore` port on top of [`ClaimRepository`].
//!
//! The adapter owns the boundary between the domain model and the
//! relational one: statuses travel as their wire names, nested records
//! (geometry, resolutions, reports, deeds) as JSONB payloads, and the
//! status history and document list as child-table rows keyed by
//! `(claim_id, seq)`. Sequence numbers are assigned here from list
//! position, which is what lets `save` persist only the appended tail.

use async_trait::async_trait;
use chrono::{DateTime, Utc};
use tracing::{debug, instrument};
use uuid::Uuid;

use core_kernel::{
    AdapterHealth, ClaimId, DocumentId, DomainPort, HealthCheckResult, HealthCheckable,
    OperationMetadata, PortError, UserId,
};
use domain_claims::claim::{Claim, ClaimStatus, ClaimType, StatusChange};
use domain_claims::ports::{ClaimQuery, ClaimStore};
use domain_claims::Document;

use crate::adapters::{db_to_port_error, decode_json, decode_json_opt, encode_json, encode_json_opt};
use crate::error::DatabaseError;
use crate::pool::DatabasePool;
use crate::repositories::claims::{
    ClaimFilter, ClaimRecord, ClaimRepository, ClaimRow, DocumentRow, StatusHistoryRow,
};

/// PostgreSQL-backed implementation of the `ClaimStore` port
pub struct PostgresClaimStore {
    repository: ClaimRepository,
    pool: DatabasePool,
}

impl PostgresClaimStore {
    /// Creates a new adapter over the given connection pool
    pub fn new(pool: DatabasePool) -> Self {
        Self {
            repository: ClaimRepository::new(pool.clone()),
            pool,
        }
    }

    /// Returns a reference to the underlying repository
    pub fn repository(&self) -> &ClaimRepository {
        &self.repository
    }
}

impl DomainPort for PostgresClaimStore {}

#[async_trait]
impl HealthCheckable for PostgresClaimStore {
    async fn health_check(&self) -> HealthCheckResult {
        let start = std::time::Instant::now();
        let result = sqlx::query_scalar::<_, i32>("SELECT 1")
            .fetch_one(&self.pool)
            .await;
        let latency_ms = start.elapsed().as_millis() as u64;

        match result {
            Ok(_) => HealthCheckResult {
                adapter_id: "postgres-claim-store".to_string(),
                status: AdapterHealth::Healthy,
                latency_ms,
                message: None,
                checked_at: Utc::now(),
            },
            Err(e) => HealthCheckResult {
                adapter_id: "postgres-claim-store".to_string(),
                status: AdapterHealth::Unhealthy,
                latency_ms,
                message: Some(format!("Database health check failed: {e}")),
                checked_at: Utc::now(),
            },
        }
    }
}

#[async_trait]
impl ClaimStore for PostgresClaimStore {
    #[instrument(skip(self, _metadata), fields(claim_id = %id))]
    async fn get_claim(
        &self,
        id: ClaimId,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Claim, PortError> {
        debug!("Fetching claim");
        let record = self
            .repository
            .get_by_id(id.into())
            .await
            .map_err(db_to_port_error)?;
        record_to_claim(record).map_err(db_to_port_error)
    }

    #[instrument(skip(self, _metadata))]
    async fn find_claims(
        &self,
        query: ClaimQuery,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Vec<Claim>, PortError> {
        debug!("Finding claims with query: {:?}", query);
        let filter = query_to_filter(&query);
        let records = self
            .repository
            .find(&filter)
            .await
            .map_err(db_to_port_error)?;
        records
            .into_iter()
            .map(|r| record_to_claim(r).map_err(db_to_port_error))
            .collect()
    }

    #[instrument(skip(self, _metadata))]
    async fn count_claims(
        &self,
        query: ClaimQuery,
        _metadata: Option<OperationMetadata>,
    ) -> Result<u64, PortError> {
        let filter = query_to_filter(&query);
        let count = self
            .repository
            .count(&filter)
            .await
            .map_err(db_to_port_error)?;
        Ok(count.max(0) as u64)
    }

    #[instrument(skip(self, _metadata, statuses))]
    async fn find_by_statuses(
        &self,
        statuses: &[ClaimStatus],
        _metadata: Option<OperationMetadata>,
    ) -> Result<Vec<Claim>, PortError> {
        debug!("Finding claims in {} statuses", statuses.len());
        let names: Vec<String> = statuses.iter().map(|s| s.as_str().to_string()).collect();
        let records = self
            .repository
            .by_statuses(&names)
            .await
            .map_err(db_to_port_error)?;
        records
            .into_iter()
            .map(|r| record_to_claim(r).map_err(db_to_port_error))
            .collect()
    }

    #[instrument(skip(self, _metadata))]
    async fn find_updated_since(
        &self,
        since: DateTime<Utc>,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Vec<Claim>, PortError> {
        debug!("Finding claims updated since {}", since);
        let records = self
            .repository
            .updated_since(since)
            .await
            .map_err(db_to_port_error)?;
        records
            .into_iter()
            .map(|r| record_to_claim(r).map_err(db_to_port_error))
            .collect()
    }

    #[instrument(skip(self, _metadata))]
    async fn active_for_screening(
        &self,
        district: &str,
        exclude: Option<ClaimId>,
        limit: u32,
        _metadata: Option<OperationMetadata>,
    ) -> Result<Vec<Claim>, PortError> {
        debug!("Loading active claims in district for overlap screening");
        let statuses = screening_statuses();
        let records = self
            .repository
            .for_screening(district, exclude.map(Uuid::from), &statuses, limit as i64)
            .await
            .map_err(db_to_port_error)?;
        records
            .into_iter()
            .map(|r| record_to_claim(r).map_err(db_to_port_error))
            .collect()
    }

    #[instrument(skip(self, claim, _metadata), fields(claim_id = %claim.id))]
    async fn insert_claim(
        &self,
        claim: &Claim,
        _metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError> {
        debug!("Inserting claim");
        let record = claim_to_record(claim).map_err(db_to_port_error)?;
        self.repository
            .insert(&record)
            .await
            .map_err(db_to_port_error)
    }

    #[instrument(
        skip(self, claim, _metadata),
        fields(claim_id = %claim.id, version = claim.version)
    )]
    async fn save_claim(
        &self,
        claim: &Claim,
        expected_version: i64,
        _metadata: Option<OperationMetadata>,
    ) -> Result<(), PortError> {
        debug!("Saving claim at expected version {}", expected_version);
        let record = claim_to_record(claim).map_err(db_to_port_error)?;
        self.repository
            .save(&record, expected_version)
            .await
            .map_err(db_to_port_error)
    }
}

// ============================================================================
// Conversion Functions
// ============================================================================

/// Statuses that participate in overlap screening.
///
/// Withdrawn-from-play stages (draft, conflict hold, rejection, remand) do
/// not block neighbouring claims.
fn screening_statuses() -> Vec<String> {
    ClaimStatus::all()
        .iter()
        .filter(|s| s.is_screening_active())
        .map(|s| s.as_str().to_string())
        .collect()
}

/// Maps a domain-level query onto the storage filter.
fn query_to_filter(query: &ClaimQuery) -> ClaimFilter {
    ClaimFilter {
        state: query.state.clone(),
        district: query.district.clone(),
        village: query.village.clone(),
        status: query.status.map(|s| s.as_str().to_string()),
        claimant_id: query.claimant.map(Uuid::from),
        search: query.search.clone(),
        offset: query.offset() as i64,
        limit: i64::from(query.limit.clamp(1, 100)),
    }
}

fn parse_status(raw: &str) -> Result<ClaimStatus, DatabaseError> {
    raw.parse()
        .map_err(|_| DatabaseError::Serialization(format!("Unknown claim status in storage: {raw}")))
}

/// Flattens a domain claim into its row representation.
///
/// Children get their `seq` from list position, so the rows written for an
/// unchanged prefix are always identical to what is already stored.
fn claim_to_record(claim: &Claim) -> Result<ClaimRecord, DatabaseError> {
    let claim_id = Uuid::from(claim.id);

    let history = claim
        .status_history
        .iter()
        .enumerate()
        .map(|(seq, change)| StatusHistoryRow {
            claim_id,
            seq: seq as i32,
            status: change.status.as_str().to_string(),
            changed_by: Uuid::from(change.changed_by),
            changed_at: change.changed_at,
            reason: change.reason.clone(),
        })
        .collect();

    let documents = claim
        .documents
        .iter()
        .enumerate()
        .map(|(seq, doc)| {
            Ok(DocumentRow {
                id: Uuid::from(doc.id),
                claim_id,
                seq: seq as i32,
                name: doc.name.clone(),
                kind: doc.kind.as_str().to_string(),
                storage_ref: doc.storage_ref.clone(),
                sha256: doc.sha256.clone(),
                uploaded_by: Uuid::from(doc.uploaded_by),
                uploaded_at: doc.uploaded_at,
                extraction: encode_json_opt(&doc.extraction)?,
            })
        })
        .collect::<Result<Vec<_>, DatabaseError>>()?;

    let row = ClaimRow {
        id: claim_id,
        claimant_id: claim.claimant_id.map(Uuid::from),
        claimant_name: claim.claimant_name.clone(),
        village: claim.village.clone(),
        district: claim.district.clone(),
        state: claim.state.clone(),
        survey_number: claim.survey_number.clone(),
        claim_type: claim.claim_type.as_str().to_string(),
        land_size_claimed: claim.land_size_claimed,
        reason: claim.reason.clone(),
        geometry: encode_json_opt(&claim.geometry)?,
        village_centroid_fallback: claim.village_centroid_fallback,
        status: claim.status.as_str().to_string(),
        gram_sabha_resolution: encode_json_opt(&claim.gram_sabha_resolution)?,
        verification_report: encode_json_opt(&claim.verification_report)?,
        remand_history: encode_json(&claim.remand_history)?,
        verified_by: claim.verified_by.map(Uuid::from),
        verified_at: claim.verified_at,
        verification_notes: claim.verification_notes.clone(),
        approved_by: claim.approved_by.map(Uuid::from),
        approved_at: claim.approved_at,
        approval_notes: claim.approval_notes.clone(),
        rejection_reason: claim.rejection_reason.clone(),
        title_deed: encode_json_opt(&claim.title_deed)?,
        asset_summary: encode_json_opt(&claim.asset_summary)?,
        assigned_to: claim.assigned_to.map(Uuid::from),
        version: claim.version,
        created_at: claim.created_at,
        updated_at: claim.updated_at,
    };

    Ok(ClaimRecord {
        claim: row,
        history,
        documents,
    })
}

/// Rehydrates a domain claim from its row representation.
fn record_to_claim(record: ClaimRecord) -> Result<Claim, DatabaseError> {
    let row = record.claim;

    let status = parse_status(&row.status)?;
    let claim_type: ClaimType = row.claim_type.parse().map_err(|_| {
        DatabaseError::Serialization(format!("Unknown claim type in storage: {}", row.claim_type))
    })?;

    let status_history = record
        .history
        .into_iter()
        .map(|h| {
            Ok(StatusChange {
                status: parse_status(&h.status)?,
                changed_by: UserId::from_uuid(h.changed_by),
                changed_at: h.changed_at,
                reason: h.reason,
            })
        })
        .collect::<Result<Vec<_>, DatabaseError>>()?;

    let documents = record
        .documents
        .into_iter()
        .map(|d| {
            Ok(Document {
                id: DocumentId::from_uuid(d.id),
                name: d.name,
                kind: d.kind.parse().map_err(|_| {
                    DatabaseError::Serialization(format!(
                        "Unknown document kind in storage: {}",
                        d.kind
                    ))
                })?,
                storage_ref: d.storage_ref,
                sha256: d.sha256,
                uploaded_by: UserId::from_uuid(d.uploaded_by),
                uploaded_at: d.uploaded_at,
                extraction: decode_json_opt(d.extraction, "document extraction")?,
            })
        })
        .collect::<Result<Vec<_>, DatabaseError>>()?;

    Ok(Claim {
        id: ClaimId::from_uuid(row.id),
        claimant_id: row.claimant_id.map(UserId::from_uuid),
        claimant_name: row.claimant_name,
        village: row.village,
        district: row.district,
        state: row.state,
        survey_number: row.survey_number,
        claim_type,
        land_size_claimed: row.land_size_claimed,
        reason: row.reason,
        geometry: decode_json_opt(row.geometry, "claim geometry")?,
        village_centroid_fallback: row.village_centroid_fallback,
        status,
        status_history,
        documents,
        gram_sabha_resolution: decode_json_opt(row.gram_sabha_resolution, "gram sabha resolution")?,
        verification_report: decode_json_opt(row.verification_report, "verification report")?,
        remand_history: decode_json(row.remand_history, "remand history")?,
        verified_by: row.verified_by.map(UserId::from_uuid),
        verified_at: row.verified_at,
        verification_notes: row.verification_notes,
        approved_by: row.approved_by.map(UserId::from_uuid),
        approved_at: row.approved_at,
        approval_notes: row.approval_notes,
        rejection_reason: row.rejection_reason,
        title_deed: decode_json_opt(row.title_deed, "title deed")?,
        asset_summary: decode_json_opt(row.asset_summary, "asset summary")?,
        assigned_to: row.assigned_to.map(UserId::from_uuid),
        version: row.version,
        created_at: row.created_at,
        updated_at: row.updated_at,
    })
}
