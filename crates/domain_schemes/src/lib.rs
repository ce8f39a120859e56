//! Benefit Schemes Domain
//!
//! This crate implements the scheme catalog and eligibility matching that
//! turn an approved forest-rights claim into welfare-scheme recommendations
//! (housing, income support, land development and similar convergence
//! programs).
//!
//! # Key Concepts
//!
//! - **Scheme**: a benefit program with eligibility rules and benefit lines
//! - **Eligibility rule**: one typed predicate over a claim snapshot
//! - **Claim facts**: the snapshot rules are evaluated against
//!
//! Recommendations are computed on read. Nothing in this crate writes to
//! claims or schemes; the catalog is a read-mostly reference data set.

pub mod error;
pub mod ports;
pub mod rules;
pub mod scheme;

pub use error::SchemeError;
pub use ports::SchemeCatalog;
pub use rules::{ClaimFacts, EligibilityRule, LogicalOp, RuleCriteria, RuleOperator};
pub use scheme::{Scheme, SchemeStatus};

use tracing::warn;

/// Active schemes whose rules the given facts satisfy
///
/// A scheme whose rules cannot be evaluated (malformed operand, wrong
/// operator for the criteria) is skipped with a warning rather than
/// failing the whole recommendation: one misconfigured scheme must not
/// take down matching for every other scheme.
pub async fn eligible_schemes(
    catalog: &dyn SchemeCatalog,
    facts: &ClaimFacts,
) -> Result<Vec<Scheme>, SchemeError> {
    let schemes = catalog
        .list_schemes(Some(SchemeStatus::Active), None)
        .await?;

    let mut eligible = Vec::new();
    for scheme in schemes {
        match rules::evaluate_rules(&scheme.rules, facts) {
            Ok(true) => eligible.push(scheme),
            Ok(false) => {}
            Err(error) => {
                warn!(
                    scheme_id = %scheme.id,
                    scheme_name = %scheme.name,
                    %error,
                    "Skipping scheme with unevaluable rules"
                );
            }
        }
    }
    Ok(eligible)
}
