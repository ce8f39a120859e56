//! Field verification reports
//!
//! A verification report is what a Field Worker brings back from the parcel:
//! officer counter-signatures, photo references, and the device-side AI
//! assessment. Reports are recorded against a claim without changing its
//! status; stage movement is a separate, explicit action.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{GeoPoint, UserId};

/// Outcome suggested by the verifying officer or the device-side analysis
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Recommendation {
    Approve,
    Reject,
    NeedsReview,
}

impl Recommendation {
    pub fn as_str(&self) -> &'static str {
        match self {
            Recommendation::Approve => "Approve",
            Recommendation::Reject => "Reject",
            Recommendation::NeedsReview => "NeedsReview",
        }
    }
}

impl fmt::Display for Recommendation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Whether an offline-captured report has reached the server of record
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SyncStatus {
    Pending,
    Synced,
}

/// Joint verification record captured during the field visit
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VerificationReport {
    pub field_worker_id: UserId,
    pub forest_officer_name: Option<String>,
    pub forest_officer_signature: Option<String>,
    pub revenue_officer_name: Option<String>,
    pub revenue_officer_signature: Option<String>,
    pub site_photo_ref: Option<String>,
    pub satellite_snapshot_ref: Option<String>,
    /// Narrative produced by the analysis collaborator; "Analysis Failed"
    /// when the collaborator was unavailable at capture time
    pub ai_analysis: Option<String>,
    pub recommendation: Recommendation,
    /// Site photo vs satellite agreement, 0..=100
    pub match_score: Option<u8>,
    /// Where the report was captured
    pub location: Option<GeoPoint>,
    pub sync_status: SyncStatus,
    pub recorded_at: DateTime<Utc>,
}

impl VerificationReport {
    pub fn new(field_worker_id: UserId, recommendation: Recommendation) -> Self {
        Self {
            field_worker_id,
            forest_officer_name: None,
            forest_officer_signature: None,
            revenue_officer_name: None,
            revenue_officer_signature: None,
            site_photo_ref: None,
            satellite_snapshot_ref: None,
            ai_analysis: None,
            recommendation,
            match_score: None,
            location: None,
            sync_status: SyncStatus::Synced,
            recorded_at: Utc::now(),
        }
    }

    /// Joint verification requires counter-signatures from both the forest
    /// and the revenue department
    pub fn is_joint_complete(&self) -> bool {
        self.forest_officer_signature.is_some() && self.revenue_officer_signature.is_some()
    }
}
