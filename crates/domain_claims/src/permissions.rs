//! Operation-level permission checks
//!
//! Every workflow operation is gated by a static role table. Checks run in
//! a fixed order: role membership first, then ownership for citizens. Super
//! Admins pass every check.

use core_kernel::{Actor, Role};

use crate::claim::Claim;

/// Everything an actor can ask the claims service to do
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ClaimOperation {
    View,
    Create,
    Update,
    Submit,
    Resubmit,
    AttachDocument,
    RecordGramSabha,
    AttachReport,
    AdvanceStage,
    Verify,
    Approve,
    Reject,
    Remand,
    IssueTitle,
    ViewRisk,
    CheckConflicts,
    SlaReport,
    AnomalyScan,
}

impl ClaimOperation {
    pub fn as_str(&self) -> &'static str {
        match self {
            ClaimOperation::View => "view",
            ClaimOperation::Create => "create",
            ClaimOperation::Update => "update",
            ClaimOperation::Submit => "submit",
            ClaimOperation::Resubmit => "resubmit",
            ClaimOperation::AttachDocument => "attach_document",
            ClaimOperation::RecordGramSabha => "record_gram_sabha",
            ClaimOperation::AttachReport => "attach_report",
            ClaimOperation::AdvanceStage => "advance_stage",
            ClaimOperation::Verify => "verify",
            ClaimOperation::Approve => "approve",
            ClaimOperation::Reject => "reject",
            ClaimOperation::Remand => "remand",
            ClaimOperation::IssueTitle => "issue_title",
            ClaimOperation::ViewRisk => "view_risk",
            ClaimOperation::CheckConflicts => "check_conflicts",
            ClaimOperation::SlaReport => "sla_report",
            ClaimOperation::AnomalyScan => "anomaly_scan",
        }
    }
}

/// Officer roles that may inspect screening and risk output
const SCREENING_ROLES: &[Role] = &[
    Role::DataEntryOfficer,
    Role::FieldWorker,
    Role::VerificationOfficer,
    Role::ApprovingAuthority,
    Role::SchemeAdmin,
];

/// Roles allowed to perform an operation; Super Admin is implicit
pub fn required_roles(operation: ClaimOperation) -> &'static [Role] {
    match operation {
        ClaimOperation::View => &[
            Role::Citizen,
            Role::DataEntryOfficer,
            Role::FieldWorker,
            Role::VerificationOfficer,
            Role::ApprovingAuthority,
            Role::NgoViewer,
            Role::SchemeAdmin,
        ],
        ClaimOperation::Create
        | ClaimOperation::Update
        | ClaimOperation::Submit
        | ClaimOperation::Resubmit => &[Role::Citizen, Role::DataEntryOfficer],
        ClaimOperation::AttachDocument => {
            &[Role::Citizen, Role::DataEntryOfficer, Role::FieldWorker]
        }
        ClaimOperation::RecordGramSabha | ClaimOperation::AdvanceStage | ClaimOperation::Verify => {
            &[Role::VerificationOfficer]
        }
        ClaimOperation::AttachReport => &[Role::FieldWorker, Role::VerificationOfficer],
        ClaimOperation::Approve | ClaimOperation::IssueTitle => &[Role::ApprovingAuthority],
        ClaimOperation::Reject | ClaimOperation::Remand => {
            &[Role::VerificationOfficer, Role::ApprovingAuthority]
        }
        ClaimOperation::ViewRisk | ClaimOperation::CheckConflicts => SCREENING_ROLES,
        ClaimOperation::SlaReport | ClaimOperation::AnomalyScan => &[Role::SuperAdmin],
    }
}

/// Whether `actor` may perform `operation`, optionally against `claim`
///
/// Pass `None` for claim-independent operations (create, screening,
/// reports). Citizens only pass for claims they own; every other
/// authorized role acts on any claim.
pub fn can(actor: &Actor, operation: ClaimOperation, claim: Option<&Claim>) -> bool {
    if actor.is_super_admin() {
        return true;
    }
    let allowed = required_roles(operation);
    if allowed
        .iter()
        .any(|role| *role != Role::Citizen && actor.has_role(*role))
    {
        return true;
    }
    if allowed.contains(&Role::Citizen) && actor.has_role(Role::Citizen) {
        return match claim {
            Some(claim) => claim.is_owned_by(actor.id),
            None => true,
        };
    }
    false
}

/// Whether listings for this actor must be scoped to claims they own.
/// True only for citizens holding no officer or admin role.
pub fn sees_only_own_claims(actor: &Actor) -> bool {
    !actor.is_super_admin()
        && actor.has_role(Role::Citizen)
        && !actor
            .roles
            .iter()
            .any(|role| *role != Role::Citizen)
}
