//! Stage deadlines and the escalation sweep
//!
//! Each workflow stage carries a warning and a breach deadline in whole
//! days. The periodic sweep classifies every in-flight claim, alerts the
//! responsible officers, and escalates breaches to district officers and
//! Super Admins. The sweep reads and notifies; it never mutates claims.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashSet;
use std::sync::Arc;
use tracing::{info, instrument, warn};

use core_kernel::{ClaimId, Role, UserId};

use crate::claim::{Claim, ClaimStatus};
use crate::error::ClaimError;
use crate::events::ClaimEvent;
use crate::ports::{ClaimStore, Notifier, UserDirectory, UserRecord};

/// Warning and breach deadlines for one stage, in whole days
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct SlaThreshold {
    pub warn_days: i64,
    pub breach_days: i64,
}

/// Stages the sweep watches, in workflow order
pub const MONITORED_STATUSES: &[ClaimStatus] = &[
    ClaimStatus::Submitted,
    ClaimStatus::GramSabhaApproved,
    ClaimStatus::FieldVerified,
    ClaimStatus::JointVerified,
    ClaimStatus::SdlcScrutiny,
    ClaimStatus::Verified,
    ClaimStatus::Approved,
];

/// Deadlines per stage; terminal and pre-workflow statuses have none
pub fn threshold_for(status: ClaimStatus) -> Option<SlaThreshold> {
    let (warn_days, breach_days) = match status {
        ClaimStatus::Submitted => (5, 7),
        ClaimStatus::GramSabhaApproved => (10, 14),
        ClaimStatus::FieldVerified => (15, 21),
        ClaimStatus::JointVerified => (7, 10),
        ClaimStatus::SdlcScrutiny => (5, 8),
        ClaimStatus::Verified => (7, 10),
        ClaimStatus::Approved => (3, 5),
        _ => return None,
    };
    Some(SlaThreshold {
        warn_days,
        breach_days,
    })
}

/// Which role is expected to move a claim out of each stage
pub fn responsible_role(status: ClaimStatus) -> Option<Role> {
    match status {
        ClaimStatus::Submitted => Some(Role::VerificationOfficer),
        ClaimStatus::GramSabhaApproved => Some(Role::FieldWorker),
        ClaimStatus::FieldVerified | ClaimStatus::JointVerified => Some(Role::VerificationOfficer),
        ClaimStatus::SdlcScrutiny | ClaimStatus::Verified | ClaimStatus::Approved => {
            Some(Role::ApprovingAuthority)
        }
        _ => None,
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum SlaState {
    OnTrack,
    AtRisk,
    Breached,
}

/// Strictly past the deadline counts, not the deadline day itself
pub fn classify(days_in_status: i64, threshold: &SlaThreshold) -> SlaState {
    if days_in_status > threshold.breach_days {
        SlaState::Breached
    } else if days_in_status > threshold.warn_days {
        SlaState::AtRisk
    } else {
        SlaState::OnTrack
    }
}

/// One claim's standing against its stage deadline
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlaEntry {
    pub claim_id: ClaimId,
    pub status: ClaimStatus,
    pub district: String,
    pub village: String,
    pub days_in_status: i64,
    pub warn_days: i64,
    pub breach_days: i64,
    pub state: SlaState,
    pub assigned_to: Option<UserId>,
}

/// Deadline standing across all in-flight claims
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlaReport {
    pub generated_at: DateTime<Utc>,
    pub total_monitored: usize,
    pub on_track: Vec<SlaEntry>,
    pub at_risk: Vec<SlaEntry>,
    pub breached: Vec<SlaEntry>,
}

fn entry_for(claim: &Claim, threshold: &SlaThreshold, now: DateTime<Utc>) -> SlaEntry {
    let days = claim.days_in_current_status(now);
    SlaEntry {
        claim_id: claim.id,
        status: claim.status,
        district: claim.district.clone(),
        village: claim.village.clone(),
        days_in_status: days,
        warn_days: threshold.warn_days,
        breach_days: threshold.breach_days,
        state: classify(days, threshold),
        assigned_to: claim.assigned_to,
    }
}

/// Builds the report without notifying anyone
pub fn build_report(claims: &[Claim], now: DateTime<Utc>) -> SlaReport {
    let mut on_track = Vec::new();
    let mut at_risk = Vec::new();
    let mut breached = Vec::new();

    for claim in claims {
        let Some(threshold) = threshold_for(claim.status) else {
            continue;
        };
        let entry = entry_for(claim, &threshold, now);
        match entry.state {
            SlaState::OnTrack => on_track.push(entry),
            SlaState::AtRisk => at_risk.push(entry),
            SlaState::Breached => breached.push(entry),
        }
    }

    // Worst offenders first within each bucket
    at_risk.sort_by(|a, b| b.days_in_status.cmp(&a.days_in_status));
    breached.sort_by(|a, b| b.days_in_status.cmp(&a.days_in_status));

    SlaReport {
        generated_at: now,
        total_monitored: on_track.len() + at_risk.len() + breached.len(),
        on_track,
        at_risk,
        breached,
    }
}

/// Counters returned by one sweep run
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct SlaSweepOutcome {
    pub checked: usize,
    pub at_risk: usize,
    pub breached: usize,
    pub notifications_sent: usize,
}

/// Periodic deadline monitor
///
/// Wire it to the same store and directory as the service and drive it
/// from a timer task; each run is independent.
pub struct SlaMonitor {
    store: Arc<dyn ClaimStore>,
    users: Arc<dyn UserDirectory>,
    notifier: Arc<dyn Notifier>,
}

impl SlaMonitor {
    pub fn new(
        store: Arc<dyn ClaimStore>,
        users: Arc<dyn UserDirectory>,
        notifier: Arc<dyn Notifier>,
    ) -> Self {
        Self {
            store,
            users,
            notifier,
        }
    }

    /// Classifies every monitored claim and sends warnings and escalations
    #[instrument(skip(self))]
    pub async fn run_sweep(&self) -> Result<SlaSweepOutcome, ClaimError> {
        let claims = self.store.find_by_statuses(MONITORED_STATUSES, None).await?;
        let now = Utc::now();
        let mut outcome = SlaSweepOutcome {
            checked: claims.len(),
            ..Default::default()
        };

        for claim in &claims {
            let Some(threshold) = threshold_for(claim.status) else {
                continue;
            };
            let days = claim.days_in_current_status(now);
            match classify(days, &threshold) {
                SlaState::OnTrack => {}
                SlaState::AtRisk => {
                    outcome.at_risk += 1;
                    let recipients = self.stage_officers(claim).await;
                    outcome.notifications_sent +=
                        self.alert(claim, days, false, &recipients).await;
                }
                SlaState::Breached => {
                    outcome.breached += 1;
                    let event = ClaimEvent::SlaBreached {
                        claim_id: claim.id,
                        status: claim.status,
                        days_in_status: days,
                        occurred_at: now,
                    };
                    info!(
                        event = event.event_type(),
                        claim_id = %event.claim_id(),
                        days_in_status = days,
                        "domain event"
                    );
                    let recipients = self.escalation_recipients(claim).await;
                    outcome.notifications_sent += self.alert(claim, days, true, &recipients).await;
                }
            }
        }

        info!(
            checked = outcome.checked,
            at_risk = outcome.at_risk,
            breached = outcome.breached,
            notifications = outcome.notifications_sent,
            "sla sweep complete"
        );
        Ok(outcome)
    }

    /// Officers of the stage's responsible role within the claim's district
    async fn stage_officers(&self, claim: &Claim) -> Vec<UserRecord> {
        let Some(role) = responsible_role(claim.status) else {
            return Vec::new();
        };
        match self
            .users
            .find_officers(role, Some(claim.district.clone()), None)
            .await
        {
            Ok(officers) => officers,
            Err(err) => {
                warn!(claim_id = %claim.id, error = %err, "officer lookup failed during sweep");
                Vec::new()
            }
        }
    }

    /// Breaches go to the assignee when present, otherwise to the stage
    /// officers, and always to Super Admins
    async fn escalation_recipients(&self, claim: &Claim) -> Vec<UserRecord> {
        let mut recipients = Vec::new();

        if let Some(assignee) = claim.assigned_to {
            match self.users.get_user(assignee, None).await {
                Ok(user) => recipients.push(user),
                Err(err) => {
                    warn!(claim_id = %claim.id, error = %err, "assignee lookup failed during sweep");
                }
            }
        }
        if recipients.is_empty() {
            recipients = self.stage_officers(claim).await;
        }

        match self.users.super_admins(None).await {
            Ok(admins) => recipients.extend(admins),
            Err(err) => {
                warn!(claim_id = %claim.id, error = %err, "super admin lookup failed during sweep");
            }
        }

        let mut seen = HashSet::new();
        recipients.retain(|user| seen.insert(user.id));
        recipients
    }

    /// Sends one alert per recipient; failures are logged and skipped
    async fn alert(
        &self,
        claim: &Claim,
        days: i64,
        breached: bool,
        recipients: &[UserRecord],
    ) -> usize {
        let mut sent = 0;
        for recipient in recipients {
            match self.notifier.sla_alert(recipient, claim, days, breached).await {
                Ok(()) => sent += 1,
                Err(err) => {
                    warn!(
                        claim_id = %claim.id,
                        recipient = %recipient.id,
                        error = %err,
                        "sla alert delivery failed"
                    );
                }
            }
        }
        sent
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_every_monitored_status_has_a_threshold() {
        for status in MONITORED_STATUSES {
            assert!(threshold_for(*status).is_some(), "{status} needs deadlines");
            assert!(responsible_role(*status).is_some(), "{status} needs an owner");
        }
    }

    #[test]
    fn test_terminal_and_parked_statuses_are_unmonitored() {
        for status in [
            ClaimStatus::Draft,
            ClaimStatus::ConflictDetected,
            ClaimStatus::Rejected,
            ClaimStatus::Remanded,
            ClaimStatus::TitleIssued,
        ] {
            assert!(threshold_for(status).is_none());
        }
    }

    #[test]
    fn test_classification_edges() {
        let threshold = SlaThreshold {
            warn_days: 5,
            breach_days: 7,
        };
        assert_eq!(classify(0, &threshold), SlaState::OnTrack);
        assert_eq!(classify(5, &threshold), SlaState::OnTrack);
        assert_eq!(classify(6, &threshold), SlaState::AtRisk);
        assert_eq!(classify(7, &threshold), SlaState::AtRisk);
        assert_eq!(classify(8, &threshold), SlaState::Breached);
    }

    #[test]
    fn test_submitted_claims_belong_to_verification_officers() {
        assert_eq!(
            responsible_role(ClaimStatus::Submitted),
            Some(Role::VerificationOfficer)
        );
        assert_eq!(
            responsible_role(ClaimStatus::GramSabhaApproved),
            Some(Role::FieldWorker)
        );
        assert_eq!(
            responsible_role(ClaimStatus::Approved),
            Some(Role::ApprovingAuthority)
        );
    }
}
