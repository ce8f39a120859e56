//! Claims DTOs

use chrono::{DateTime, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use validator::Validate;

use core_kernel::{GeoPoint, Geometry};
use domain_claims::claim::{
    Claim, ClaimPatch, ClaimStatus, ClaimType, GramSabhaResolution, NewClaim, RemandRecord,
    TitleDeed,
};
use domain_claims::ports::ClaimQuery;
use domain_claims::service::{ClaimPage, DocumentUpload, RiskReview, ScreenedClaim};
use domain_claims::verification::{Recommendation, SyncStatus, VerificationReport};
use domain_claims::{
    AssetSummary, ConflictReport, DocumentKind, ExtractionResult, RiskAssessment,
    VeracityAssessment,
};

use crate::dto::{parse_claim_id, parse_user_id};
use crate::error::ApiError;

use core_kernel::Actor;

// ============================================================================
// Requests
// ============================================================================

#[derive(Debug, Deserialize, Validate)]
pub struct CreateClaimRequest {
    pub claimant_id: Option<String>,
    #[validate(length(min = 1, max = 200))]
    pub claimant_name: String,
    #[validate(length(min = 1, max = 120))]
    pub village: String,
    #[validate(length(min = 1, max = 120))]
    pub district: String,
    #[validate(length(min = 1, max = 120))]
    pub state: String,
    pub survey_number: Option<String>,
    pub claim_type: ClaimType,
    pub land_size_claimed: Decimal,
    pub reason: Option<String>,
    pub geometry: Option<Geometry>,
    #[serde(default)]
    pub village_centroid_fallback: bool,
    pub assigned_to: Option<String>,
    /// Park the claim in `Draft` instead of submitting it
    #[serde(default)]
    pub save_as_draft: bool,
}

impl CreateClaimRequest {
    pub fn into_new_claim(self) -> Result<NewClaim, ApiError> {
        let claimant_id = self
            .claimant_id
            .as_deref()
            .map(parse_user_id)
            .transpose()?;
        let assigned_to = self
            .assigned_to
            .as_deref()
            .map(parse_user_id)
            .transpose()?;

        Ok(NewClaim {
            claimant_id,
            claimant_name: self.claimant_name,
            village: self.village,
            district: self.district,
            state: self.state,
            survey_number: self.survey_number,
            claim_type: self.claim_type,
            land_size_claimed: self.land_size_claimed,
            reason: self.reason,
            geometry: self.geometry,
            village_centroid_fallback: self.village_centroid_fallback,
            assigned_to,
        })
    }
}

/// Whitelisted claim fields; status moves only through workflow actions
#[derive(Debug, Default, Deserialize)]
pub struct UpdateClaimRequest {
    pub claimant_name: Option<String>,
    pub village: Option<String>,
    pub district: Option<String>,
    pub state: Option<String>,
    pub survey_number: Option<String>,
    pub claim_type: Option<ClaimType>,
    pub land_size_claimed: Option<Decimal>,
    pub reason: Option<String>,
    pub geometry: Option<Geometry>,
    pub village_centroid_fallback: Option<bool>,
}

impl From<UpdateClaimRequest> for ClaimPatch {
    fn from(request: UpdateClaimRequest) -> Self {
        ClaimPatch {
            claimant_name: request.claimant_name,
            village: request.village,
            district: request.district,
            state: request.state,
            survey_number: request.survey_number,
            claim_type: request.claim_type,
            land_size_claimed: request.land_size_claimed,
            reason: request.reason,
            geometry: request.geometry,
            village_centroid_fallback: request.village_centroid_fallback,
        }
    }
}

#[derive(Debug, Default, Deserialize)]
pub struct ListClaimsQuery {
    pub state: Option<String>,
    pub district: Option<String>,
    pub village: Option<String>,
    pub status: Option<String>,
    pub search: Option<String>,
    pub page: Option<u32>,
    pub limit: Option<u32>,
}

impl ListClaimsQuery {
    pub fn into_query(self) -> Result<ClaimQuery, ApiError> {
        let status = self
            .status
            .as_deref()
            .map(|raw| {
                raw.parse::<ClaimStatus>()
                    .map_err(|_| ApiError::Validation(format!("Unknown claim status: {raw}")))
            })
            .transpose()?;

        Ok(ClaimQuery {
            state: self.state,
            district: self.district,
            village: self.village,
            status,
            claimant: None,
            search: self.search,
            page: 1,
            limit: 20,
        }
        .paginate(self.page.unwrap_or(1), self.limit.unwrap_or(20)))
    }
}

#[derive(Debug, Deserialize)]
pub struct GramSabhaRequest {
    pub resolution_number: String,
    pub resolution_date: DateTime<Utc>,
    pub quorum_met: bool,
    pub frc_member_count: u32,
    pub approved_by: String,
}

impl From<GramSabhaRequest> for GramSabhaResolution {
    fn from(request: GramSabhaRequest) -> Self {
        GramSabhaResolution {
            resolution_number: request.resolution_number,
            resolution_date: request.resolution_date,
            quorum_met: request.quorum_met,
            frc_member_count: request.frc_member_count,
            approved_by: request.approved_by,
        }
    }
}

/// Field report payload; the reporting field worker is taken from the token
#[derive(Debug, Deserialize)]
pub struct ReportRequest {
    pub recommendation: Recommendation,
    pub forest_officer_name: Option<String>,
    pub forest_officer_signature: Option<String>,
    pub revenue_officer_name: Option<String>,
    pub revenue_officer_signature: Option<String>,
    pub site_photo_ref: Option<String>,
    pub satellite_snapshot_ref: Option<String>,
    pub ai_analysis: Option<String>,
    pub match_score: Option<u8>,
    pub location: Option<GeoPoint>,
    pub sync_status: Option<SyncStatus>,
    pub recorded_at: Option<DateTime<Utc>>,
}

impl ReportRequest {
    pub fn into_report(self, actor: &Actor) -> VerificationReport {
        VerificationReport {
            field_worker_id: actor.id,
            forest_officer_name: self.forest_officer_name,
            forest_officer_signature: self.forest_officer_signature,
            revenue_officer_name: self.revenue_officer_name,
            revenue_officer_signature: self.revenue_officer_signature,
            site_photo_ref: self.site_photo_ref,
            satellite_snapshot_ref: self.satellite_snapshot_ref,
            ai_analysis: self.ai_analysis,
            recommendation: self.recommendation,
            match_score: self.match_score,
            location: self.location,
            sync_status: self.sync_status.unwrap_or(SyncStatus::Synced),
            recorded_at: self.recorded_at.unwrap_or_else(Utc::now),
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct AdvanceRequest {
    pub target: ClaimStatus,
    pub notes: Option<String>,
}

#[derive(Debug, Default, Deserialize)]
pub struct NotesRequest {
    pub notes: Option<String>,
}

#[derive(Debug, Deserialize)]
pub struct ReasonRequest {
    pub reason: String,
}

#[derive(Debug, Deserialize, Validate)]
pub struct DocumentRequest {
    #[validate(length(min = 1, max = 255))]
    pub name: String,
    pub kind: DocumentKind,
    #[validate(length(min = 1))]
    pub storage_ref: String,
    /// Hex SHA-256 fingerprint of the stored file
    #[validate(length(equal = 64))]
    pub sha256: String,
    /// Extracted or OCR'd text to run field extraction over
    pub text_excerpt: Option<String>,
}

impl From<DocumentRequest> for DocumentUpload {
    fn from(request: DocumentRequest) -> Self {
        DocumentUpload {
            name: request.name,
            kind: request.kind,
            storage_ref: request.storage_ref,
            sha256: request.sha256,
            text_excerpt: request.text_excerpt,
        }
    }
}

#[derive(Debug, Deserialize)]
pub struct CheckConflictsRequest {
    pub geometry: Geometry,
    pub district: String,
    /// Claim to leave out of screening, for pre-submission re-checks
    pub exclude_claim_id: Option<String>,
}

impl CheckConflictsRequest {
    pub fn exclude(&self) -> Result<Option<core_kernel::ClaimId>, ApiError> {
        self.exclude_claim_id
            .as_deref()
            .map(parse_claim_id)
            .transpose()
    }
}

// ============================================================================
// Responses
// ============================================================================

/// Listing row
#[derive(Debug, Serialize)]
pub struct ClaimSummary {
    pub id: String,
    pub claimant_name: String,
    pub village: String,
    pub district: String,
    pub state: String,
    pub survey_number: Option<String>,
    pub claim_type: ClaimType,
    pub land_size_claimed: Decimal,
    pub status: ClaimStatus,
    pub village_centroid_fallback: bool,
    pub document_count: usize,
    pub assigned_to: Option<String>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Claim> for ClaimSummary {
    fn from(claim: &Claim) -> Self {
        Self {
            id: claim.id.to_string(),
            claimant_name: claim.claimant_name.clone(),
            village: claim.village.clone(),
            district: claim.district.clone(),
            state: claim.state.clone(),
            survey_number: claim.survey_number.clone(),
            claim_type: claim.claim_type,
            land_size_claimed: claim.land_size_claimed,
            status: claim.status,
            village_centroid_fallback: claim.village_centroid_fallback,
            document_count: claim.documents.len(),
            assigned_to: claim.assigned_to.map(|id| id.to_string()),
            version: claim.version,
            created_at: claim.created_at,
            updated_at: claim.updated_at,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct StatusChangeView {
    pub status: ClaimStatus,
    pub changed_by: String,
    pub changed_at: DateTime<Utc>,
    pub reason: Option<String>,
}

#[derive(Debug, Serialize)]
pub struct DocumentView {
    pub id: String,
    pub name: String,
    pub kind: DocumentKind,
    pub storage_ref: String,
    pub sha256: String,
    pub uploaded_by: String,
    pub uploaded_at: DateTime<Utc>,
    pub extraction: Option<ExtractionResult>,
}

/// Full claim view
#[derive(Debug, Serialize)]
pub struct ClaimDetail {
    pub id: String,
    pub claimant_id: Option<String>,
    pub claimant_name: String,
    pub village: String,
    pub district: String,
    pub state: String,
    pub survey_number: Option<String>,
    pub claim_type: ClaimType,
    pub land_size_claimed: Decimal,
    pub reason: Option<String>,
    pub geometry: Option<Geometry>,
    pub village_centroid_fallback: bool,
    pub status: ClaimStatus,
    pub status_history: Vec<StatusChangeView>,
    pub documents: Vec<DocumentView>,
    pub gram_sabha_resolution: Option<GramSabhaResolution>,
    pub verification_report: Option<VerificationReport>,
    pub remand_history: Vec<RemandRecord>,
    pub verified_by: Option<String>,
    pub verified_at: Option<DateTime<Utc>>,
    pub verification_notes: Option<String>,
    pub approved_by: Option<String>,
    pub approved_at: Option<DateTime<Utc>>,
    pub approval_notes: Option<String>,
    pub rejection_reason: Option<String>,
    pub title_deed: Option<TitleDeed>,
    pub asset_summary: Option<AssetSummary>,
    pub assigned_to: Option<String>,
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl From<&Claim> for ClaimDetail {
    fn from(claim: &Claim) -> Self {
        Self {
            id: claim.id.to_string(),
            claimant_id: claim.claimant_id.map(|id| id.to_string()),
            claimant_name: claim.claimant_name.clone(),
            village: claim.village.clone(),
            district: claim.district.clone(),
            state: claim.state.clone(),
            survey_number: claim.survey_number.clone(),
            claim_type: claim.claim_type,
            land_size_claimed: claim.land_size_claimed,
            reason: claim.reason.clone(),
            geometry: claim.geometry.clone(),
            village_centroid_fallback: claim.village_centroid_fallback,
            status: claim.status,
            status_history: claim
                .status_history
                .iter()
                .map(|change| StatusChangeView {
                    status: change.status,
                    changed_by: change.changed_by.to_string(),
                    changed_at: change.changed_at,
                    reason: change.reason.clone(),
                })
                .collect(),
            documents: claim
                .documents
                .iter()
                .map(|doc| DocumentView {
                    id: doc.id.to_string(),
                    name: doc.name.clone(),
                    kind: doc.kind,
                    storage_ref: doc.storage_ref.clone(),
                    sha256: doc.sha256.clone(),
                    uploaded_by: doc.uploaded_by.to_string(),
                    uploaded_at: doc.uploaded_at,
                    extraction: doc.extraction.clone(),
                })
                .collect(),
            gram_sabha_resolution: claim.gram_sabha_resolution.clone(),
            verification_report: claim.verification_report.clone(),
            remand_history: claim.remand_history.clone(),
            verified_by: claim.verified_by.map(|id| id.to_string()),
            verified_at: claim.verified_at,
            verification_notes: claim.verification_notes.clone(),
            approved_by: claim.approved_by.map(|id| id.to_string()),
            approved_at: claim.approved_at,
            approval_notes: claim.approval_notes.clone(),
            rejection_reason: claim.rejection_reason.clone(),
            title_deed: claim.title_deed.clone(),
            asset_summary: claim.asset_summary.clone(),
            assigned_to: claim.assigned_to.map(|id| id.to_string()),
            version: claim.version,
            created_at: claim.created_at,
            updated_at: claim.updated_at,
        }
    }
}

/// Claim plus the screening verdict when the operation ran the detector
#[derive(Debug, Serialize)]
pub struct ScreenedClaimResponse {
    pub claim: ClaimDetail,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub screening: Option<ConflictReport>,
}

impl From<ScreenedClaim> for ScreenedClaimResponse {
    fn from(screened: ScreenedClaim) -> Self {
        Self {
            claim: ClaimDetail::from(&screened.claim),
            screening: screened.screening,
        }
    }
}

#[derive(Debug, Serialize)]
pub struct ClaimPageResponse {
    pub claims: Vec<ClaimSummary>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

impl From<ClaimPage> for ClaimPageResponse {
    fn from(page: ClaimPage) -> Self {
        Self {
            claims: page.claims.iter().map(ClaimSummary::from).collect(),
            total: page.total,
            page: page.page,
            limit: page.limit,
        }
    }
}

/// Risk screen payload for the officer review view
#[derive(Debug, Serialize)]
pub struct RiskReviewResponse {
    pub assessment: RiskAssessment,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub veracity: Option<VeracityAssessment>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub draft_title: Option<String>,
}

impl From<RiskReview> for RiskReviewResponse {
    fn from(review: RiskReview) -> Self {
        Self {
            assessment: review.assessment,
            veracity: review.veracity,
            draft_title: review.draft_title,
        }
    }
}
