//! Eligibility rule evaluation
//!
//! Each scheme carries an ordered list of predicates over a small claim
//! snapshot. Evaluation folds the list left to right: the first rule seeds
//! the verdict and every later rule combines with it through its own
//! `logicalOp` connector.
//!
//! Rule values arrive as `serde_json::Value` (the format scheme admins
//! author in the portal). Types are checked at evaluation time against the
//! criteria: a boolean criteria with a numeric operand, or an ordering
//! operator on a text field, surfaces [`SchemeError::InvalidRuleValue`]
//! rather than evaluating to false, so misconfigured schemes fail loudly.
//!
//! # Example
//!
//! ```rust
//! use domain_schemes::rules::{
//!     evaluate_rules, ClaimFacts, EligibilityRule, RuleCriteria, RuleOperator,
//! };
//! use rust_decimal_macros::dec;
//! use serde_json::json;
//!
//! let rules = vec![
//!     EligibilityRule::new(RuleCriteria::HasApprovedClaim, RuleOperator::Eq, json!(true)),
//!     EligibilityRule::new(RuleCriteria::LandSizeClaimed, RuleOperator::Lte, json!(2.0)),
//! ];
//! let facts = ClaimFacts {
//!     has_approved_claim: true,
//!     claim_type: "Individual".to_string(),
//!     land_size_claimed: dec!(1.5),
//!     village: "Kondagaon".to_string(),
//!     district: "Bastar".to_string(),
//! };
//! assert!(evaluate_rules(&rules, &facts).unwrap());
//! ```

use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::error::SchemeError;

/// Claim attributes a rule may test
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum RuleCriteria {
    /// Claim has reached `Approved` or `Title_Issued`
    HasApprovedClaim,
    /// Individual or Community
    ClaimType,
    /// Declared extent in hectares
    LandSizeClaimed,
    Village,
    District,
}

impl RuleCriteria {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleCriteria::HasApprovedClaim => "hasApprovedClaim",
            RuleCriteria::ClaimType => "claimType",
            RuleCriteria::LandSizeClaimed => "landSizeClaimed",
            RuleCriteria::Village => "village",
            RuleCriteria::District => "district",
        }
    }
}

/// Comparison operators; wire names match the stored portal rules
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum RuleOperator {
    #[serde(rename = "==")]
    Eq,
    #[serde(rename = "!=")]
    Ne,
    #[serde(rename = ">")]
    Gt,
    #[serde(rename = ">=")]
    Gte,
    #[serde(rename = "<")]
    Lt,
    #[serde(rename = "<=")]
    Lte,
    #[serde(rename = "in")]
    In,
}

impl RuleOperator {
    pub fn as_str(&self) -> &'static str {
        match self {
            RuleOperator::Eq => "==",
            RuleOperator::Ne => "!=",
            RuleOperator::Gt => ">",
            RuleOperator::Gte => ">=",
            RuleOperator::Lt => "<",
            RuleOperator::Lte => "<=",
            RuleOperator::In => "in",
        }
    }
}

/// Connector folding a rule into the running verdict
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum LogicalOp {
    #[default]
    And,
    Or,
}

/// One predicate in a scheme's eligibility list
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct EligibilityRule {
    pub criteria: RuleCriteria,
    pub operator: RuleOperator,
    /// Comparison operand; its type is checked against the criteria at
    /// evaluation time
    pub value: Value,
    #[serde(rename = "logicalOp", default)]
    pub logical_op: LogicalOp,
}

impl EligibilityRule {
    /// Rule joined with `AND` (the default connector)
    pub fn new(criteria: RuleCriteria, operator: RuleOperator, value: Value) -> Self {
        Self {
            criteria,
            operator,
            value,
            logical_op: LogicalOp::And,
        }
    }

    pub fn with_connector(mut self, connector: LogicalOp) -> Self {
        self.logical_op = connector;
        self
    }
}

/// Snapshot of the claim attributes rules are evaluated against
///
/// Built by the caller from a `Claim`; `has_approved_claim` is true for
/// `Approved` and `Title_Issued` statuses.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimFacts {
    pub has_approved_claim: bool,
    pub claim_type: String,
    pub land_size_claimed: Decimal,
    pub village: String,
    pub district: String,
}

/// Folds the rule list into a single verdict
///
/// An empty list is eligible: a scheme with no rules is open to every
/// claimant. Any type mismatch aborts evaluation with the offending rule's
/// criteria in the error.
pub fn evaluate_rules(rules: &[EligibilityRule], facts: &ClaimFacts) -> Result<bool, SchemeError> {
    let mut eligible = true;
    for rule in rules {
        let passed = evaluate_rule(rule, facts)?;
        eligible = match rule.logical_op {
            LogicalOp::And => eligible && passed,
            LogicalOp::Or => eligible || passed,
        };
    }
    Ok(eligible)
}

/// Evaluates one predicate against the facts
pub fn evaluate_rule(rule: &EligibilityRule, facts: &ClaimFacts) -> Result<bool, SchemeError> {
    match rule.criteria {
        RuleCriteria::HasApprovedClaim => {
            let expected = bool_operand(rule)?;
            match rule.operator {
                RuleOperator::Eq => Ok(facts.has_approved_claim == expected),
                RuleOperator::Ne => Ok(facts.has_approved_claim != expected),
                other => Err(operator_mismatch(rule.criteria, other)),
            }
        }
        RuleCriteria::ClaimType => compare_text(rule, &facts.claim_type),
        RuleCriteria::LandSizeClaimed => compare_number(rule, facts.land_size_claimed),
        RuleCriteria::Village => compare_text(rule, &facts.village),
        RuleCriteria::District => compare_text(rule, &facts.district),
    }
}

/// Text criteria support equality and membership, case-insensitively
/// (district and village casing varies across data-entry sources)
fn compare_text(rule: &EligibilityRule, actual: &str) -> Result<bool, SchemeError> {
    match rule.operator {
        RuleOperator::Eq => Ok(actual.eq_ignore_ascii_case(text_operand(rule)?)),
        RuleOperator::Ne => Ok(!actual.eq_ignore_ascii_case(text_operand(rule)?)),
        RuleOperator::In => {
            let options = list_operand(rule)?;
            let mut found = false;
            for option in options {
                let text = option.as_str().ok_or_else(|| {
                    SchemeError::invalid_rule(
                        rule.criteria.as_str(),
                        "'in' list for a text criteria must contain strings",
                    )
                })?;
                if actual.eq_ignore_ascii_case(text) {
                    found = true;
                }
            }
            Ok(found)
        }
        other => Err(operator_mismatch(rule.criteria, other)),
    }
}

fn compare_number(rule: &EligibilityRule, actual: Decimal) -> Result<bool, SchemeError> {
    match rule.operator {
        RuleOperator::In => {
            let options = list_operand(rule)?;
            let mut found = false;
            for option in options {
                if decimal_from(option, rule.criteria)? == actual {
                    found = true;
                }
            }
            Ok(found)
        }
        _ => {
            let expected = decimal_from(&rule.value, rule.criteria)?;
            Ok(match rule.operator {
                RuleOperator::Eq => actual == expected,
                RuleOperator::Ne => actual != expected,
                RuleOperator::Gt => actual > expected,
                RuleOperator::Gte => actual >= expected,
                RuleOperator::Lt => actual < expected,
                RuleOperator::Lte => actual <= expected,
                RuleOperator::In => unreachable!("handled above"),
            })
        }
    }
}

fn bool_operand(rule: &EligibilityRule) -> Result<bool, SchemeError> {
    rule.value.as_bool().ok_or_else(|| {
        SchemeError::invalid_rule(
            rule.criteria.as_str(),
            format!("expected a boolean operand, got {}", rule.value),
        )
    })
}

fn text_operand(rule: &EligibilityRule) -> Result<&str, SchemeError> {
    rule.value.as_str().ok_or_else(|| {
        SchemeError::invalid_rule(
            rule.criteria.as_str(),
            format!("expected a string operand, got {}", rule.value),
        )
    })
}

fn list_operand(rule: &EligibilityRule) -> Result<&Vec<Value>, SchemeError> {
    rule.value.as_array().ok_or_else(|| {
        SchemeError::invalid_rule(
            rule.criteria.as_str(),
            format!("'in' requires an array operand, got {}", rule.value),
        )
    })
}

fn decimal_from(value: &Value, criteria: RuleCriteria) -> Result<Decimal, SchemeError> {
    if let Some(i) = value.as_i64() {
        return Ok(Decimal::from(i));
    }
    if let Some(f) = value.as_f64() {
        return Decimal::try_from(f).map_err(|e| {
            SchemeError::invalid_rule(criteria.as_str(), format!("unrepresentable number: {e}"))
        });
    }
    Err(SchemeError::invalid_rule(
        criteria.as_str(),
        format!("expected a numeric operand, got {value}"),
    ))
}

fn operator_mismatch(criteria: RuleCriteria, operator: RuleOperator) -> SchemeError {
    SchemeError::invalid_rule(
        criteria.as_str(),
        format!("operator '{}' does not apply", operator.as_str()),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;
    use serde_json::json;

    fn facts() -> ClaimFacts {
        ClaimFacts {
            has_approved_claim: true,
            claim_type: "Individual".to_string(),
            land_size_claimed: dec!(2.5),
            village: "Kondagaon".to_string(),
            district: "Bastar".to_string(),
        }
    }

    #[test]
    fn test_approved_claim_rule() {
        let rule = EligibilityRule::new(
            RuleCriteria::HasApprovedClaim,
            RuleOperator::Eq,
            json!(true),
        );
        assert!(evaluate_rule(&rule, &facts()).unwrap());

        let mut no_title = facts();
        no_title.has_approved_claim = false;
        assert!(!evaluate_rule(&rule, &no_title).unwrap());
    }

    #[test]
    fn test_claim_type_equality_ignores_case() {
        let rule = EligibilityRule::new(
            RuleCriteria::ClaimType,
            RuleOperator::Eq,
            json!("individual"),
        );
        assert!(evaluate_rule(&rule, &facts()).unwrap());
    }

    #[test]
    fn test_claim_type_membership() {
        let rule = EligibilityRule::new(
            RuleCriteria::ClaimType,
            RuleOperator::In,
            json!(["Individual", "Community"]),
        );
        assert!(evaluate_rule(&rule, &facts()).unwrap());

        let narrow = EligibilityRule::new(
            RuleCriteria::ClaimType,
            RuleOperator::In,
            json!(["Community"]),
        );
        assert!(!evaluate_rule(&narrow, &facts()).unwrap());
    }

    #[test]
    fn test_land_size_comparisons() {
        let cases = [
            (RuleOperator::Gt, json!(2.0), true),
            (RuleOperator::Gt, json!(2.5), false),
            (RuleOperator::Gte, json!(2.5), true),
            (RuleOperator::Lt, json!(4), true),
            (RuleOperator::Lte, json!(2.5), true),
            (RuleOperator::Eq, json!(2.5), true),
            (RuleOperator::Ne, json!(4), true),
        ];
        for (operator, value, expected) in cases {
            let rule = EligibilityRule::new(RuleCriteria::LandSizeClaimed, operator, value);
            assert_eq!(
                evaluate_rule(&rule, &facts()).unwrap(),
                expected,
                "operator {}",
                operator.as_str()
            );
        }
    }

    #[test]
    fn test_district_rule() {
        let rule = EligibilityRule::new(RuleCriteria::District, RuleOperator::Eq, json!("bastar"));
        assert!(evaluate_rule(&rule, &facts()).unwrap());

        let elsewhere =
            EligibilityRule::new(RuleCriteria::District, RuleOperator::Ne, json!("Mandla"));
        assert!(evaluate_rule(&elsewhere, &facts()).unwrap());
    }

    #[test]
    fn test_type_mismatch_is_an_error_not_false() {
        // Numeric operand on a boolean criteria
        let rule = EligibilityRule::new(RuleCriteria::HasApprovedClaim, RuleOperator::Eq, json!(1));
        let err = evaluate_rule(&rule, &facts()).unwrap_err();
        assert!(matches!(err, SchemeError::InvalidRuleValue { .. }));

        // Ordering operator on a text criteria
        let rule = EligibilityRule::new(RuleCriteria::Village, RuleOperator::Gt, json!("Kondagaon"));
        assert!(matches!(
            evaluate_rule(&rule, &facts()),
            Err(SchemeError::InvalidRuleValue { .. })
        ));

        // String operand on a numeric criteria
        let rule = EligibilityRule::new(
            RuleCriteria::LandSizeClaimed,
            RuleOperator::Lte,
            json!("two"),
        );
        assert!(matches!(
            evaluate_rule(&rule, &facts()),
            Err(SchemeError::InvalidRuleValue { .. })
        ));
    }

    #[test]
    fn test_in_list_rejects_mixed_types() {
        let rule = EligibilityRule::new(
            RuleCriteria::Village,
            RuleOperator::In,
            json!(["Kondagaon", 7]),
        );
        assert!(matches!(
            evaluate_rule(&rule, &facts()),
            Err(SchemeError::InvalidRuleValue { .. })
        ));
    }

    #[test]
    fn test_empty_rule_list_is_eligible() {
        assert!(evaluate_rules(&[], &facts()).unwrap());
    }

    #[test]
    fn test_and_fold_requires_every_rule() {
        let rules = vec![
            EligibilityRule::new(
                RuleCriteria::HasApprovedClaim,
                RuleOperator::Eq,
                json!(true),
            ),
            EligibilityRule::new(RuleCriteria::LandSizeClaimed, RuleOperator::Lte, json!(2.0)),
        ];
        // Second rule fails: 2.5 > 2.0
        assert!(!evaluate_rules(&rules, &facts()).unwrap());
    }

    #[test]
    fn test_or_connector_rescues_failed_verdict() {
        let rules = vec![
            EligibilityRule::new(RuleCriteria::District, RuleOperator::Eq, json!("Mandla")),
            EligibilityRule::new(RuleCriteria::District, RuleOperator::Eq, json!("Bastar"))
                .with_connector(LogicalOp::Or),
        ];
        assert!(evaluate_rules(&rules, &facts()).unwrap());
    }

    #[test]
    fn test_fold_order_matters() {
        // OR first, then an AND that fails: verdict ends false
        let rules = vec![
            EligibilityRule::new(RuleCriteria::District, RuleOperator::Eq, json!("Bastar"))
                .with_connector(LogicalOp::Or),
            EligibilityRule::new(RuleCriteria::LandSizeClaimed, RuleOperator::Gt, json!(4)),
        ];
        assert!(!evaluate_rules(&rules, &facts()).unwrap());
    }

    #[test]
    fn test_error_in_later_rule_surfaces_even_when_already_ineligible() {
        let rules = vec![
            EligibilityRule::new(RuleCriteria::District, RuleOperator::Eq, json!("Mandla")),
            EligibilityRule::new(RuleCriteria::LandSizeClaimed, RuleOperator::Gt, json!("big")),
        ];
        assert!(matches!(
            evaluate_rules(&rules, &facts()),
            Err(SchemeError::InvalidRuleValue { .. })
        ));
    }

    #[test]
    fn test_rule_wire_format() {
        let rule = EligibilityRule::new(
            RuleCriteria::HasApprovedClaim,
            RuleOperator::Eq,
            json!(true),
        );
        let value = serde_json::to_value(&rule).unwrap();
        assert_eq!(value["criteria"], "hasApprovedClaim");
        assert_eq!(value["operator"], "==");
        assert_eq!(value["logicalOp"], "AND");
    }

    #[test]
    fn test_rule_deserializes_without_connector() {
        let raw = r#"{"criteria": "landSizeClaimed", "operator": "<=", "value": 4}"#;
        let rule: EligibilityRule = serde_json::from_str(raw).unwrap();
        assert_eq!(rule.logical_op, LogicalOp::And);
        assert_eq!(rule.operator, RuleOperator::Lte);
    }
}
