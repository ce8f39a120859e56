//! Domain events emitted after successful workflow actions
//!
//! Events are emitted after the claim is persisted, so consumers only ever
//! see transitions that actually happened. The default sink is the
//! structured log; an outbox can subscribe without touching the service.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, DocumentId, UserId};

use crate::claim::ClaimStatus;

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event", rename_all = "snake_case")]
pub enum ClaimEvent {
    Created {
        claim_id: ClaimId,
        claim_number: String,
        status: ClaimStatus,
        occurred_at: DateTime<Utc>,
    },
    Submitted {
        claim_id: ClaimId,
        occurred_at: DateTime<Utc>,
    },
    ConflictFlagged {
        claim_id: ClaimId,
        conflict_count: usize,
        occurred_at: DateTime<Utc>,
    },
    GramSabhaRecorded {
        claim_id: ClaimId,
        resolution_number: String,
        occurred_at: DateTime<Utc>,
    },
    ReportAttached {
        claim_id: ClaimId,
        field_worker: UserId,
        occurred_at: DateTime<Utc>,
    },
    StageAdvanced {
        claim_id: ClaimId,
        to: ClaimStatus,
        occurred_at: DateTime<Utc>,
    },
    Verified {
        claim_id: ClaimId,
        verified_by: UserId,
        occurred_at: DateTime<Utc>,
    },
    Approved {
        claim_id: ClaimId,
        approved_by: UserId,
        occurred_at: DateTime<Utc>,
    },
    Rejected {
        claim_id: ClaimId,
        reason: String,
        occurred_at: DateTime<Utc>,
    },
    Remanded {
        claim_id: ClaimId,
        reason: String,
        occurred_at: DateTime<Utc>,
    },
    Resubmitted {
        claim_id: ClaimId,
        occurred_at: DateTime<Utc>,
    },
    TitleIssued {
        claim_id: ClaimId,
        serial_number: String,
        occurred_at: DateTime<Utc>,
    },
    DocumentAttached {
        claim_id: ClaimId,
        document_id: DocumentId,
        occurred_at: DateTime<Utc>,
    },
    SlaBreached {
        claim_id: ClaimId,
        status: ClaimStatus,
        days_in_status: i64,
        occurred_at: DateTime<Utc>,
    },
}

impl ClaimEvent {
    pub fn claim_id(&self) -> ClaimId {
        match self {
            ClaimEvent::Created { claim_id, .. }
            | ClaimEvent::Submitted { claim_id, .. }
            | ClaimEvent::ConflictFlagged { claim_id, .. }
            | ClaimEvent::GramSabhaRecorded { claim_id, .. }
            | ClaimEvent::ReportAttached { claim_id, .. }
            | ClaimEvent::StageAdvanced { claim_id, .. }
            | ClaimEvent::Verified { claim_id, .. }
            | ClaimEvent::Approved { claim_id, .. }
            | ClaimEvent::Rejected { claim_id, .. }
            | ClaimEvent::Remanded { claim_id, .. }
            | ClaimEvent::Resubmitted { claim_id, .. }
            | ClaimEvent::TitleIssued { claim_id, .. }
            | ClaimEvent::DocumentAttached { claim_id, .. }
            | ClaimEvent::SlaBreached { claim_id, .. } => *claim_id,
        }
    }

    pub fn occurred_at(&self) -> DateTime<Utc> {
        match self {
            ClaimEvent::Created { occurred_at, .. }
            | ClaimEvent::Submitted { occurred_at, .. }
            | ClaimEvent::ConflictFlagged { occurred_at, .. }
            | ClaimEvent::GramSabhaRecorded { occurred_at, .. }
            | ClaimEvent::ReportAttached { occurred_at, .. }
            | ClaimEvent::StageAdvanced { occurred_at, .. }
            | ClaimEvent::Verified { occurred_at, .. }
            | ClaimEvent::Approved { occurred_at, .. }
            | ClaimEvent::Rejected { occurred_at, .. }
            | ClaimEvent::Remanded { occurred_at, .. }
            | ClaimEvent::Resubmitted { occurred_at, .. }
            | ClaimEvent::TitleIssued { occurred_at, .. }
            | ClaimEvent::DocumentAttached { occurred_at, .. }
            | ClaimEvent::SlaBreached { occurred_at, .. } => *occurred_at,
        }
    }

    /// Stable tag for log lines and outbox routing
    pub fn event_type(&self) -> &'static str {
        match self {
            ClaimEvent::Created { .. } => "claim.created",
            ClaimEvent::Submitted { .. } => "claim.submitted",
            ClaimEvent::ConflictFlagged { .. } => "claim.conflict_flagged",
            ClaimEvent::GramSabhaRecorded { .. } => "claim.gram_sabha_recorded",
            ClaimEvent::ReportAttached { .. } => "claim.report_attached",
            ClaimEvent::StageAdvanced { .. } => "claim.stage_advanced",
            ClaimEvent::Verified { .. } => "claim.verified",
            ClaimEvent::Approved { .. } => "claim.approved",
            ClaimEvent::Rejected { .. } => "claim.rejected",
            ClaimEvent::Remanded { .. } => "claim.remanded",
            ClaimEvent::Resubmitted { .. } => "claim.resubmitted",
            ClaimEvent::TitleIssued { .. } => "claim.title_issued",
            ClaimEvent::DocumentAttached { .. } => "claim.document_attached",
            ClaimEvent::SlaBreached { .. } => "claim.sla_breached",
        }
    }
}
