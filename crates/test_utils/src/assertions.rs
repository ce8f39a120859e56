//! Domain-aware assertions.
//!
//! Failure messages name the claim, the stage, or the risk band involved
//! so a failing workflow test reads like a bug report, not a diff of
//! two enum values.

use core_kernel::UserId;
use rust_decimal::Decimal;

use domain_claims::claim::{Claim, ClaimStatus};
use domain_claims::risk::STATUTORY_LIMIT_HA;
use domain_claims::{ConflictReport, RiskAssessment, RiskLevel};

/// Asserts that a claim sits in the expected workflow stage
///
/// # Panics
///
/// Panics with both stages named if they differ
pub fn assert_status(claim: &Claim, expected: ClaimStatus) {
    assert_eq!(
        claim.status, expected,
        "Claim {} is {}, expected {}",
        claim.id, claim.status, expected
    );
}

/// Asserts that the most recent history entry records `status`
pub fn assert_history_ends_with(claim: &Claim, status: ClaimStatus) {
    let last = claim
        .status_history
        .last()
        .unwrap_or_else(|| panic!("Claim {} has no status history", claim.id));
    assert_eq!(
        last.status, status,
        "Last history entry for claim {} is {}, expected {}",
        claim.id, last.status, status
    );
}

/// Asserts that some history entry records passage through `status`
pub fn assert_passed_through(claim: &Claim, status: ClaimStatus) {
    assert!(
        claim.status_history.iter().any(|c| c.status == status),
        "Claim {} never passed through {}; history: {:?}",
        claim.id,
        status,
        claim
            .status_history
            .iter()
            .map(|c| c.status)
            .collect::<Vec<_>>()
    );
}

/// Asserts that the claim belongs to the given claimant account
pub fn assert_owned_by(claim: &Claim, user: UserId) {
    assert!(
        claim.is_owned_by(user),
        "Claim {} is not owned by {} (claimant_id={:?})",
        claim.id,
        user,
        claim.claimant_id
    );
}

/// Asserts that an overlap screen found nothing blocking
pub fn assert_conflict_free(report: &ConflictReport) {
    assert!(
        report.allowed && report.conflicts.is_empty(),
        "Expected a clean overlap screen, got {} conflicts (allowed={}): {}",
        report.conflicts.len(),
        report.allowed,
        report.message
    );
}

/// Asserts that an overlap screen blocks submission
pub fn assert_conflict_blocked(report: &ConflictReport) {
    assert!(
        !report.allowed,
        "Expected the overlap screen to block, but it allowed: {}",
        report.message
    );
}

/// Asserts that the risk band is at or above `level`
pub fn assert_risk_at_least(assessment: &RiskAssessment, level: RiskLevel) {
    assert!(
        assessment.level >= level,
        "Risk level {} (score {}) is below expected {}",
        assessment.level,
        assessment.score,
        level
    );
}

/// Asserts that some risk flag message mentions `fragment`
pub fn assert_flag_mentions(assessment: &RiskAssessment, fragment: &str) {
    assert!(
        assessment.flags.iter().any(|f| f.message.contains(fragment)),
        "No risk flag mentions {:?}; flags: {:?}",
        fragment,
        assessment
            .flags
            .iter()
            .map(|f| f.message.as_str())
            .collect::<Vec<_>>()
    );
}

/// Asserts that a claimed extent respects the individual title ceiling
pub fn assert_within_statutory_limit(hectares: Decimal) {
    assert!(
        hectares <= STATUTORY_LIMIT_HA,
        "Extent {} ha exceeds the {} ha statutory ceiling",
        hectares,
        STATUTORY_LIMIT_HA
    );
}

/// Unwraps an `Ok`, panicking with the error otherwise
#[macro_export]
macro_rules! assert_ok {
    ($result:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("expected Ok, operation failed with {:?}", e),
        }
    };
    ($result:expr, $msg:expr) => {
        match $result {
            Ok(value) => value,
            Err(e) => panic!("{}: {:?}", $msg, e),
        }
    };
}

/// Unwraps an `Err`, panicking with the unexpected value otherwise
#[macro_export]
macro_rules! assert_err {
    ($result:expr) => {
        match $result {
            Ok(value) => panic!("expected failure, operation returned Ok({:?})", value),
            Err(e) => e,
        }
    };
    ($result:expr, $msg:expr) => {
        match $result {
            Ok(value) => panic!("{}: got Ok({:?})", $msg, value),
            Err(e) => e,
        }
    };
}

/// Asserts that a result failed with an error matching the pattern
#[macro_export]
macro_rules! assert_err_variant {
    ($result:expr, $pattern:pat) => {
        match $result {
            Ok(value) => panic!(
                "expected Err matching {}, got Ok({:?})",
                stringify!($pattern),
                value
            ),
            Err(ref e) => {
                assert!(
                    matches!(e, $pattern),
                    "error {:?} does not match pattern {}",
                    e,
                    stringify!($pattern)
                );
            }
        }
    };
}
