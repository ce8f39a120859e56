//! Claim aggregate
//!
//! The claim is the system of record for a land-rights application. Status
//! only ever changes through [`Claim::update_status`], which enforces the
//! transition graph and appends the paired history entry in the same call,
//! so the aggregate can never hold a status its history does not explain.

use chrono::{DateTime, Datelike, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use uuid::Uuid;

use core_kernel::{ClaimId, Geometry, UserId};

use crate::assets::AssetSummary;
use crate::document::Document;
use crate::error::ClaimError;
use crate::verification::VerificationReport;

/// Claim workflow status
///
/// Wire names match the values stored by the state forest-rights portals
/// (`SDLC_Scrutiny`, `Title_Issued`).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum ClaimStatus {
    /// Saved but not yet submitted
    Draft,
    /// Submission blocked by a high-severity boundary overlap
    ConflictDetected,
    /// Entered the workflow
    Submitted,
    /// Gram Sabha resolution recorded
    GramSabhaApproved,
    /// Field evidence collected on site
    FieldVerified,
    /// Joint verification by forest and revenue officers complete
    JointVerified,
    /// Under Sub-Divisional Level Committee scrutiny
    #[serde(rename = "SDLC_Scrutiny")]
    SdlcScrutiny,
    /// Verification complete, awaiting approval
    Verified,
    /// Approved by the district authority
    Approved,
    /// Rejected (may be resubmitted)
    Rejected,
    /// Sent back for re-verification
    Remanded,
    /// Title deed issued, terminal
    #[serde(rename = "Title_Issued")]
    TitleIssued,
}

impl ClaimStatus {
    /// All statuses in workflow order
    pub fn all() -> &'static [ClaimStatus] {
        &[
            ClaimStatus::Draft,
            ClaimStatus::ConflictDetected,
            ClaimStatus::Submitted,
            ClaimStatus::GramSabhaApproved,
            ClaimStatus::FieldVerified,
            ClaimStatus::JointVerified,
            ClaimStatus::SdlcScrutiny,
            ClaimStatus::Verified,
            ClaimStatus::Approved,
            ClaimStatus::Rejected,
            ClaimStatus::Remanded,
            ClaimStatus::TitleIssued,
        ]
    }

    /// The wire/database name for this status
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimStatus::Draft => "Draft",
            ClaimStatus::ConflictDetected => "ConflictDetected",
            ClaimStatus::Submitted => "Submitted",
            ClaimStatus::GramSabhaApproved => "GramSabhaApproved",
            ClaimStatus::FieldVerified => "FieldVerified",
            ClaimStatus::JointVerified => "JointVerified",
            ClaimStatus::SdlcScrutiny => "SDLC_Scrutiny",
            ClaimStatus::Verified => "Verified",
            ClaimStatus::Approved => "Approved",
            ClaimStatus::Rejected => "Rejected",
            ClaimStatus::Remanded => "Remanded",
            ClaimStatus::TitleIssued => "Title_Issued",
        }
    }

    /// Only an issued title ends the lifecycle; rejected claims can come back
    pub fn is_terminal(&self) -> bool {
        matches!(self, ClaimStatus::TitleIssued)
    }

    /// Statuses counted as live parcels during overlap screening
    pub fn is_screening_active(&self) -> bool {
        matches!(
            self,
            ClaimStatus::Submitted
                | ClaimStatus::GramSabhaApproved
                | ClaimStatus::FieldVerified
                | ClaimStatus::JointVerified
                | ClaimStatus::SdlcScrutiny
                | ClaimStatus::Verified
                | ClaimStatus::Approved
                | ClaimStatus::TitleIssued
        )
    }

    /// Stages where field evidence may still be attached
    pub fn is_verification_stage(&self) -> bool {
        matches!(
            self,
            ClaimStatus::Submitted
                | ClaimStatus::GramSabhaApproved
                | ClaimStatus::FieldVerified
                | ClaimStatus::JointVerified
                | ClaimStatus::SdlcScrutiny
        )
    }
}

impl fmt::Display for ClaimStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimStatus {
    type Err = ClaimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        ClaimStatus::all()
            .iter()
            .find(|status| status.as_str() == s)
            .copied()
            .ok_or_else(|| ClaimError::Validation(format!("Unknown claim status: {s}")))
    }
}

/// Individual or community forest-rights claim
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ClaimType {
    Individual,
    Community,
}

impl ClaimType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimType::Individual => "Individual",
            ClaimType::Community => "Community",
        }
    }
}

impl fmt::Display for ClaimType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for ClaimType {
    type Err = ClaimError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "Individual" => Ok(ClaimType::Individual),
            "Community" => Ok(ClaimType::Community),
            other => Err(ClaimError::Validation(format!(
                "Unknown claim type: {other}"
            ))),
        }
    }
}

/// One entry in the append-only status history
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct StatusChange {
    pub status: ClaimStatus,
    pub changed_by: UserId,
    pub changed_at: DateTime<Utc>,
    pub reason: Option<String>,
}

/// Record of the village assembly's decision on the claim
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct GramSabhaResolution {
    pub resolution_number: String,
    pub resolution_date: DateTime<Utc>,
    pub quorum_met: bool,
    pub frc_member_count: u32,
    pub approved_by: String,
}

/// One remand cycle: which stage the claim left and why
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RemandRecord {
    pub remanded_at: DateTime<Utc>,
    pub reason: String,
    pub remanded_by: UserId,
    pub from_status: ClaimStatus,
    pub to_status: ClaimStatus,
}

/// Title deed issued after final approval
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TitleDeed {
    /// Serial in the form `FRA-<year>-<8 hex>`
    pub serial_number: String,
    pub generated_at: DateTime<Utc>,
    pub generated_by: UserId,
    pub dlc_signature: Option<String>,
}

impl TitleDeed {
    pub fn generate(generated_by: UserId) -> Self {
        let now = Utc::now();
        let suffix = Uuid::new_v4().simple().to_string()[..8].to_uppercase();
        Self {
            serial_number: format!("FRA-{}-{}", now.year(), suffix),
            generated_at: now,
            generated_by,
            dlc_signature: None,
        }
    }
}

/// A land-rights claim
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Claim {
    /// Unique identifier
    pub id: ClaimId,
    /// Owning citizen account, when the claim was self-filed
    pub claimant_id: Option<UserId>,
    /// Claimant name as recorded on the application
    pub claimant_name: String,
    pub village: String,
    pub district: String,
    pub state: String,
    /// Revenue survey number of the parcel
    pub survey_number: Option<String>,
    pub claim_type: ClaimType,
    /// Declared extent in hectares
    pub land_size_claimed: Decimal,
    /// Free-text grounds for the claim
    pub reason: Option<String>,
    /// Parcel boundary; absent when capture failed entirely
    pub geometry: Option<Geometry>,
    /// True when the boundary is a village-centroid stand-in, not a survey
    pub village_centroid_fallback: bool,
    /// Workflow status; mutate only through `update_status`
    pub status: ClaimStatus,
    /// Append-only; the last entry always matches `status`
    pub status_history: Vec<StatusChange>,
    pub documents: Vec<Document>,
    pub gram_sabha_resolution: Option<GramSabhaResolution>,
    pub verification_report: Option<VerificationReport>,
    pub remand_history: Vec<RemandRecord>,
    pub verified_by: Option<UserId>,
    pub verified_at: Option<DateTime<Utc>>,
    pub verification_notes: Option<String>,
    pub approved_by: Option<UserId>,
    pub approved_at: Option<DateTime<Utc>>,
    pub approval_notes: Option<String>,
    pub rejection_reason: Option<String>,
    pub title_deed: Option<TitleDeed>,
    /// Land-cover estimate from the asset collaborator
    pub asset_summary: Option<AssetSummary>,
    /// Officer the claim is assigned to, if any
    pub assigned_to: Option<UserId>,
    /// Optimistic concurrency version, bumped on every persisted write
    pub version: i64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Details for a new claim
#[derive(Debug, Clone)]
pub struct NewClaim {
    pub claimant_id: Option<UserId>,
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
    pub assigned_to: Option<UserId>,
}

/// Whitelisted updatable fields; anything not listed here cannot be changed
/// through `update`
#[derive(Debug, Clone, Default)]
pub struct ClaimPatch {
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

impl Claim {
    /// Creates a claim in one of the entry statuses, writing the first
    /// history entry
    pub fn create(
        details: NewClaim,
        created_by: UserId,
        initial_status: ClaimStatus,
        reason: Option<String>,
    ) -> Result<Self, ClaimError> {
        if !matches!(
            initial_status,
            ClaimStatus::Draft | ClaimStatus::Submitted | ClaimStatus::ConflictDetected
        ) {
            return Err(ClaimError::Validation(format!(
                "Claims cannot be created in status {initial_status}"
            )));
        }
        validate_details(&details)?;

        let now = Utc::now();
        Ok(Self {
            id: ClaimId::new_v7(),
            claimant_id: details.claimant_id,
            claimant_name: details.claimant_name,
            village: details.village,
            district: details.district,
            state: details.state,
            survey_number: details.survey_number,
            claim_type: details.claim_type,
            land_size_claimed: details.land_size_claimed,
            reason: details.reason,
            geometry: details.geometry,
            village_centroid_fallback: details.village_centroid_fallback,
            status: initial_status,
            status_history: vec![StatusChange {
                status: initial_status,
                changed_by: created_by,
                changed_at: now,
                reason,
            }],
            documents: Vec::new(),
            gram_sabha_resolution: None,
            verification_report: None,
            remand_history: Vec::new(),
            verified_by: None,
            verified_at: None,
            verification_notes: None,
            approved_by: None,
            approved_at: None,
            approval_notes: None,
            rejection_reason: None,
            title_deed: None,
            asset_summary: None,
            assigned_to: details.assigned_to,
            version: 1,
            created_at: now,
            updated_at: now,
        })
    }

    /// Moves the claim to `status`, appending the paired history entry
    ///
    /// This is the only mutation path for `status` in the workspace.
    pub fn update_status(
        &mut self,
        status: ClaimStatus,
        changed_by: UserId,
        reason: Option<String>,
    ) -> Result<(), ClaimError> {
        if !self.can_transition_to(status) {
            return Err(ClaimError::InvalidStatusTransition {
                from: self.status.to_string(),
                to: status.to_string(),
            });
        }
        let now = Utc::now();
        self.status = status;
        self.status_history.push(StatusChange {
            status,
            changed_by,
            changed_at: now,
            reason,
        });
        self.updated_at = now;
        Ok(())
    }

    /// Checks if transition is valid
    pub fn can_transition_to(&self, target: ClaimStatus) -> bool {
        use ClaimStatus::*;
        matches!(
            (self.status, target),
            (Draft, Submitted)
                | (Draft, ConflictDetected)
                | (Draft, Rejected)
                | (ConflictDetected, Submitted)
                | (ConflictDetected, Rejected)
                | (Submitted, GramSabhaApproved)
                | (Submitted, Verified)
                | (Submitted, Rejected)
                | (GramSabhaApproved, FieldVerified)
                | (GramSabhaApproved, Verified)
                | (GramSabhaApproved, Rejected)
                | (FieldVerified, JointVerified)
                | (FieldVerified, SdlcScrutiny)
                | (FieldVerified, Verified)
                | (FieldVerified, Rejected)
                | (FieldVerified, Remanded)
                | (JointVerified, SdlcScrutiny)
                | (JointVerified, Verified)
                | (JointVerified, Rejected)
                | (JointVerified, Remanded)
                | (SdlcScrutiny, Verified)
                | (SdlcScrutiny, Rejected)
                | (SdlcScrutiny, Remanded)
                | (Verified, Approved)
                | (Verified, Rejected)
                | (Verified, Remanded)
                | (Approved, TitleIssued)
                | (Approved, Rejected)
                | (Remanded, GramSabhaApproved)
                | (Remanded, Rejected)
                | (Rejected, Submitted)
        )
    }

    /// Applies the update whitelist; returns true when the boundary changed
    /// (callers re-run overlap screening in that case)
    pub fn apply_patch(&mut self, patch: ClaimPatch) -> Result<bool, ClaimError> {
        if let Some(name) = patch.claimant_name {
            if name.trim().is_empty() {
                return Err(ClaimError::validation("Claimant name cannot be empty"));
            }
            self.claimant_name = name;
        }
        if let Some(village) = patch.village {
            if village.trim().is_empty() {
                return Err(ClaimError::validation("Village cannot be empty"));
            }
            self.village = village;
        }
        if let Some(district) = patch.district {
            if district.trim().is_empty() {
                return Err(ClaimError::validation("District cannot be empty"));
            }
            self.district = district;
        }
        if let Some(state) = patch.state {
            if state.trim().is_empty() {
                return Err(ClaimError::validation("State cannot be empty"));
            }
            self.state = state;
        }
        if let Some(survey_number) = patch.survey_number {
            self.survey_number = Some(survey_number);
        }
        if let Some(claim_type) = patch.claim_type {
            self.claim_type = claim_type;
        }
        if let Some(size) = patch.land_size_claimed {
            if size <= Decimal::ZERO {
                return Err(ClaimError::validation(
                    "Claimed land size must be greater than zero",
                ));
            }
            self.land_size_claimed = size;
        }
        if let Some(reason) = patch.reason {
            self.reason = Some(reason);
        }
        let mut geometry_changed = false;
        if let Some(geometry) = patch.geometry {
            geometry
                .validate()
                .map_err(|e| ClaimError::Validation(e.to_string()))?;
            geometry_changed = self.geometry.as_ref() != Some(&geometry);
            self.geometry = Some(geometry);
        }
        if let Some(fallback) = patch.village_centroid_fallback {
            self.village_centroid_fallback = fallback;
        }
        self.updated_at = Utc::now();
        Ok(geometry_changed)
    }

    /// Attaches a document, rejecting duplicate fingerprints
    pub fn attach_document(&mut self, document: Document) -> Result<(), ClaimError> {
        if self.documents.iter().any(|d| d.sha256 == document.sha256) {
            return Err(ClaimError::DuplicateDocument(document.sha256.clone()));
        }
        self.documents.push(document);
        self.updated_at = Utc::now();
        Ok(())
    }

    /// Sends the claim back for re-verification, recording the cycle
    pub fn remand(&mut self, reason: String, remanded_by: UserId) -> Result<(), ClaimError> {
        let from_status = self.status;
        self.update_status(ClaimStatus::Remanded, remanded_by, Some(reason.clone()))?;
        self.remand_history.push(RemandRecord {
            remanded_at: self.updated_at,
            reason,
            remanded_by,
            from_status,
            to_status: ClaimStatus::Remanded,
        });
        Ok(())
    }

    pub fn is_owned_by(&self, user: UserId) -> bool {
        self.claimant_id == Some(user)
    }

    /// When the claim entered the workflow (first `Submitted` entry)
    pub fn submitted_on(&self) -> DateTime<Utc> {
        self.status_history
            .iter()
            .find(|entry| entry.status == ClaimStatus::Submitted)
            .map(|entry| entry.changed_at)
            .unwrap_or(self.created_at)
    }

    /// Whole days spent in the current status
    pub fn days_in_current_status(&self, now: DateTime<Utc>) -> i64 {
        let since = self
            .status_history
            .last()
            .map(|entry| entry.changed_at)
            .unwrap_or(self.created_at);
        (now - since).num_days()
    }
}

fn validate_details(details: &NewClaim) -> Result<(), ClaimError> {
    if details.claimant_name.trim().is_empty() {
        return Err(ClaimError::validation("Claimant name is required"));
    }
    if details.village.trim().is_empty() {
        return Err(ClaimError::validation("Village is required"));
    }
    if details.district.trim().is_empty() {
        return Err(ClaimError::validation("District is required"));
    }
    if details.state.trim().is_empty() {
        return Err(ClaimError::validation("State is required"));
    }
    if details.land_size_claimed <= Decimal::ZERO {
        return Err(ClaimError::validation(
            "Claimed land size must be greater than zero",
        ));
    }
    if let Some(geometry) = &details.geometry {
        geometry
            .validate()
            .map_err(|e| ClaimError::Validation(e.to_string()))?;
    }
    Ok(())
}

/// Deterministic draft of the title certificate text, for review screens
/// once a claim reaches `Verified` or `Approved`
pub fn draft_title_document(claim: &Claim) -> String {
    let survey = claim.survey_number.as_deref().unwrap_or("unrecorded");
    format!(
        "DRAFT TITLE CERTIFICATE\n\
         Under the Scheduled Tribes and Other Traditional Forest Dwellers\n\
         (Recognition of Forest Rights) Act, 2006\n\n\
         Claimant: {}\n\
         Village: {}, District: {}, State: {}\n\
         Survey Number: {}\n\
         Claim Type: {}\n\
         Extent: {} hectares\n\
         Current Status: {}\n\n\
         This draft is system-generated for District Level Committee review.",
        claim.claimant_name,
        claim.village,
        claim.district,
        claim.state,
        survey,
        claim.claim_type,
        claim.land_size_claimed,
        claim.status,
    )
}
