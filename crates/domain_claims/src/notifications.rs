//! Claimant-facing notification templates
//!
//! Every status change produces a subject, a long body for email-style
//! channels, and a short SMS line. Delivery goes through the [`Notifier`]
//! port; the default implementation writes structured log lines so the
//! workflow never blocks on a gateway.

use serde::{Deserialize, Serialize};
use tracing::info;

use core_kernel::PortError;

use crate::claim::{Claim, ClaimStatus};
use crate::ports::{Notifier, UserRecord};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationMessage {
    pub subject: String,
    pub body: String,
    pub sms: String,
}

/// Renders the claimant-facing message for the claim's current status
pub fn status_message(claim: &Claim) -> NotificationMessage {
    let number = claim.id.to_string();
    let village = &claim.village;

    let (subject, body, sms) = match claim.status {
        ClaimStatus::Draft => (
            "Claim saved as draft".to_string(),
            format!(
                "Your forest rights claim {number} for land in {village} has been saved as a draft. \
                 Submit it when you are ready to start verification."
            ),
            format!("Claim {number} saved as draft."),
        ),
        ClaimStatus::Submitted => (
            "Claim submitted".to_string(),
            format!(
                "Your forest rights claim {number} for land in {village} has been submitted. \
                 It will now be placed before the Gram Sabha for verification."
            ),
            format!("Claim {number} submitted for verification."),
        ),
        ClaimStatus::ConflictDetected => (
            "Claim needs attention".to_string(),
            format!(
                "Your claim {number} overlaps with land already claimed by others in {village}. \
                 An officer will review the boundaries; you may also correct the parcel map and resubmit."
            ),
            format!("Claim {number} flagged for boundary review."),
        ),
        ClaimStatus::GramSabhaApproved => (
            "Gram Sabha approval recorded".to_string(),
            format!(
                "The Gram Sabha of {village} has passed a resolution supporting your claim {number}. \
                 A field verification visit will follow."
            ),
            format!("Claim {number}: Gram Sabha resolution recorded."),
        ),
        ClaimStatus::FieldVerified => (
            "Field verification complete".to_string(),
            format!(
                "The field visit for your claim {number} is complete. \
                 The report now goes to the joint verification team."
            ),
            format!("Claim {number}: field verification done."),
        ),
        ClaimStatus::JointVerified => (
            "Joint verification complete".to_string(),
            format!(
                "Forest and revenue officials have jointly verified the parcel for claim {number}."
            ),
            format!("Claim {number}: joint verification done."),
        ),
        ClaimStatus::SdlcScrutiny => (
            "Claim under committee scrutiny".to_string(),
            format!(
                "Your claim {number} is being examined by the Sub-Divisional Level Committee."
            ),
            format!("Claim {number} under SDLC scrutiny."),
        ),
        ClaimStatus::Verified => (
            "Claim verified".to_string(),
            format!(
                "Your claim {number} has been verified and forwarded for approval."
            ),
            format!("Claim {number} verified."),
        ),
        ClaimStatus::Approved => (
            "Claim approved".to_string(),
            format!(
                "Congratulations. Your forest rights claim {number} has been approved. \
                 The title deed will be issued shortly."
            ),
            format!("Claim {number} approved."),
        ),
        ClaimStatus::Rejected => {
            let reason = claim
                .rejection_reason
                .as_deref()
                .unwrap_or("See the officer's remarks for details");
            (
                "Claim rejected".to_string(),
                format!(
                    "Your claim {number} has been rejected. Reason: {reason}. \
                     You may correct the application and resubmit."
                ),
                format!("Claim {number} rejected. You may resubmit."),
            )
        }
        ClaimStatus::Remanded => (
            "Claim sent back for re-verification".to_string(),
            format!(
                "Your claim {number} has been sent back to an earlier stage for another look. \
                 No action is needed from you right now."
            ),
            format!("Claim {number} sent back for re-verification."),
        ),
        ClaimStatus::TitleIssued => {
            let serial = claim
                .title_deed
                .as_ref()
                .map(|deed| deed.serial_number.clone())
                .unwrap_or_default();
            (
                "Title deed issued".to_string(),
                format!(
                    "The title deed for your forest rights claim {number} has been issued \
                     (serial {serial}). Collect the signed copy from the district office."
                ),
                format!("Title deed issued for claim {number}."),
            )
        }
    };

    NotificationMessage { subject, body, sms }
}

/// Renders an officer-facing deadline alert
pub fn sla_message(claim: &Claim, days_in_status: i64, breached: bool) -> NotificationMessage {
    let number = claim.id.to_string();
    let status = claim.status;
    if breached {
        NotificationMessage {
            subject: format!("SLA breached: claim {number}"),
            body: format!(
                "Claim {number} ({}, {}) has been in status {status} for {days_in_status} days, \
                 past its deadline. Immediate action is required.",
                claim.village, claim.district
            ),
            sms: format!("SLA BREACH: claim {number} stuck in {status} for {days_in_status}d."),
        }
    } else {
        NotificationMessage {
            subject: format!("SLA warning: claim {number}"),
            body: format!(
                "Claim {number} ({}, {}) has been in status {status} for {days_in_status} days \
                 and is approaching its deadline.",
                claim.village, claim.district
            ),
            sms: format!("SLA warning: claim {number} in {status} for {days_in_status}d."),
        }
    }
}

/// Notifier that records deliveries as structured log lines
#[derive(Debug, Default)]
pub struct TracingNotifier;

impl TracingNotifier {
    pub fn new() -> Self {
        Self
    }
}

#[async_trait::async_trait]
impl Notifier for TracingNotifier {
    async fn status_update(&self, recipient: &UserRecord, claim: &Claim) -> Result<(), PortError> {
        let message = status_message(claim);
        info!(
            recipient = %recipient.id,
            claim_id = %claim.id,
            status = %claim.status,
            subject = %message.subject,
            sms = %message.sms,
            "notification dispatched"
        );
        Ok(())
    }

    async fn sla_alert(
        &self,
        recipient: &UserRecord,
        claim: &Claim,
        days_in_status: i64,
        breached: bool,
    ) -> Result<(), PortError> {
        let message = sla_message(claim, days_in_status, breached);
        info!(
            recipient = %recipient.id,
            claim_id = %claim.id,
            status = %claim.status,
            days_in_status,
            breached,
            subject = %message.subject,
            "sla alert dispatched"
        );
        Ok(())
    }
}

impl core_kernel::DomainPort for TracingNotifier {}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claim::{ClaimType, NewClaim, TitleDeed};
    use core_kernel::UserId;
    use rust_decimal_macros::dec;

    fn claim_in(status: ClaimStatus) -> Claim {
        let details = NewClaim {
            claimant_name: "Dasru Uike".to_string(),
            claimant_id: Some(UserId::new()),
            claim_type: ClaimType::Community,
            village: "Chada".to_string(),
            district: "Mandla".to_string(),
            state: "Madhya Pradesh".to_string(),
            land_size_claimed: dec!(2.5),
            survey_number: None,
            reason: None,
            geometry: None,
            village_centroid_fallback: false,
            assigned_to: None,
        };
        let mut claim = Claim::create(details, UserId::new(), ClaimStatus::Draft, None).unwrap();
        claim.status = status;
        claim
    }

    #[test]
    fn test_every_status_renders_a_message() {
        for status in ClaimStatus::all() {
            let claim = claim_in(*status);
            let message = status_message(&claim);
            assert!(!message.subject.is_empty(), "{status} subject");
            assert!(
                message.body.contains(&claim.id.to_string()),
                "{status} body"
            );
            assert!(message.sms.len() < 160, "{status} sms must fit one segment");
        }
    }

    #[test]
    fn test_rejection_message_carries_reason() {
        let mut claim = claim_in(ClaimStatus::Rejected);
        claim.rejection_reason = Some("Parcel overlaps reserved forest".to_string());
        let message = status_message(&claim);
        assert!(message.body.contains("Parcel overlaps reserved forest"));
    }

    #[test]
    fn test_title_message_carries_serial() {
        let mut claim = claim_in(ClaimStatus::TitleIssued);
        claim.title_deed = Some(TitleDeed::generate(UserId::new()));
        let message = status_message(&claim);
        let serial = claim.title_deed.as_ref().unwrap().serial_number.clone();
        assert!(message.body.contains(&serial));
    }

    #[test]
    fn test_sla_messages_distinguish_warning_from_breach() {
        let claim = claim_in(ClaimStatus::Submitted);
        let warning = sla_message(&claim, 6, false);
        let breach = sla_message(&claim, 9, true);

        assert!(warning.subject.contains("warning"));
        assert!(breach.subject.contains("breached"));
        assert!(breach.body.contains("past its deadline"));
    }
}
