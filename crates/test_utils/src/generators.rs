//! Property-Based Test Generators
//!
//! Provides proptest strategies for generating random test data
//! that maintains domain invariants.

use chrono::{DateTime, Duration, TimeZone, Utc};
use core_kernel::{ClaimId, GeoPoint, Geometry, UserId};
use proptest::prelude::*;
use rust_decimal::Decimal;

use domain_claims::claim::{ClaimStatus, ClaimType};
use domain_schemes::rules::{ClaimFacts, EligibilityRule, LogicalOp, RuleCriteria, RuleOperator};

use crate::fixtures::{DISTRICTS, VILLAGES};

/// Strategy for generating claimed extents in hectares (0.01 to 10.00)
pub fn land_size_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..=1000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for extents at or under the individual title ceiling
pub fn within_limit_land_strategy() -> impl Strategy<Value = Decimal> {
    (1i64..=400i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for extents over the individual title ceiling
pub fn oversized_land_strategy() -> impl Strategy<Value = Decimal> {
    (401i64..=2000i64).prop_map(|n| Decimal::new(n, 2))
}

/// Strategy for generating claim types
pub fn claim_type_strategy() -> impl Strategy<Value = ClaimType> {
    prop_oneof![Just(ClaimType::Individual), Just(ClaimType::Community)]
}

/// Strategy over every workflow stage
pub fn claim_status_strategy() -> impl Strategy<Value = ClaimStatus> {
    proptest::sample::select(ClaimStatus::all())
}

/// Strategy for districts drawn from the fixture pool
pub fn district_strategy() -> impl Strategy<Value = String> {
    proptest::sample::select(DISTRICTS.clone()).prop_map(|d| d.to_string())
}

/// Strategy for villages drawn from the fixture pool
pub fn village_strategy() -> impl Strategy<Value = String> {
    proptest::sample::select(VILLAGES.clone()).prop_map(|v| v.to_string())
}

/// Strategy for revenue survey numbers ("123/4" style)
pub fn survey_number_strategy() -> impl Strategy<Value = String> {
    "[1-9][0-9]{0,2}/[1-9][0-9]?".prop_map(|s| s)
}

/// Strategy for coordinates inside the Indian mainland envelope
pub fn geo_point_strategy() -> impl Strategy<Value = GeoPoint> {
    (6900i64..9700i64, 900i64..3600i64)
        .prop_map(|(lon, lat)| GeoPoint::new(lon as f64 / 100.0, lat as f64 / 100.0))
}

/// Strategy for small rectangular parcels that pass geometry validation
///
/// Rings are closed and carry five vertices, the minimum shape the claim
/// intake accepts.
pub fn parcel_strategy() -> impl Strategy<Value = Geometry> {
    (geo_point_strategy(), 1i64..50i64).prop_map(|(origin, size)| {
        let d = size as f64 / 1000.0;
        let (lon, lat) = (origin.lon(), origin.lat());
        Geometry::polygon(vec![
            GeoPoint::new(lon, lat),
            GeoPoint::new(lon + d, lat),
            GeoPoint::new(lon + d, lat + d),
            GeoPoint::new(lon, lat + d),
            GeoPoint::new(lon, lat),
        ])
    })
}

/// Strategy for generating ClaimId
pub fn claim_id_strategy() -> impl Strategy<Value = ClaimId> {
    any::<[u8; 16]>().prop_map(|bytes| ClaimId::from_uuid(uuid::Uuid::from_bytes(bytes)))
}

/// Strategy for generating UserId
pub fn user_id_strategy() -> impl Strategy<Value = UserId> {
    any::<[u8; 16]>().prop_map(|bytes| UserId::from_uuid(uuid::Uuid::from_bytes(bytes)))
}

/// Strategy for filing timestamps within 2025
pub fn filing_timestamp_strategy() -> impl Strategy<Value = DateTime<Utc>> {
    (0i64..365i64).prop_map(|days| {
        Utc.with_ymd_and_hms(2025, 1, 1, 0, 0, 0).unwrap() + Duration::days(days)
    })
}

/// Strategy for logical connectors
pub fn logical_op_strategy() -> impl Strategy<Value = LogicalOp> {
    prop_oneof![Just(LogicalOp::And), Just(LogicalOp::Or)]
}

/// Strategy for well-typed eligibility rules
///
/// Operands match their criteria: booleans for the approved-claim flag,
/// strings or string lists for text criteria, numbers for the extent. The
/// evaluator rejects mistyped rules, so random rules must stay well typed
/// to exercise evaluation rather than the error path.
pub fn eligibility_rule_strategy() -> impl Strategy<Value = EligibilityRule> {
    let approved = (any::<bool>(), prop_oneof![Just(RuleOperator::Eq), Just(RuleOperator::Ne)])
        .prop_map(|(value, operator)| {
            EligibilityRule::new(
                RuleCriteria::HasApprovedClaim,
                operator,
                serde_json::json!(value),
            )
        });

    let claim_type = (
        prop_oneof![Just("Individual"), Just("Community")],
        prop_oneof![Just(RuleOperator::Eq), Just(RuleOperator::Ne)],
    )
        .prop_map(|(value, operator)| {
            EligibilityRule::new(RuleCriteria::ClaimType, operator, serde_json::json!(value))
        });

    let land_size = (
        1i64..=1000i64,
        prop_oneof![
            Just(RuleOperator::Eq),
            Just(RuleOperator::Ne),
            Just(RuleOperator::Gt),
            Just(RuleOperator::Gte),
            Just(RuleOperator::Lt),
            Just(RuleOperator::Lte),
        ],
    )
        .prop_map(|(cents, operator)| {
            EligibilityRule::new(
                RuleCriteria::LandSizeClaimed,
                operator,
                serde_json::json!(cents as f64 / 100.0),
            )
        });

    let district = (
        district_strategy(),
        prop_oneof![Just(RuleOperator::Eq), Just(RuleOperator::Ne)],
    )
        .prop_map(|(value, operator)| {
            EligibilityRule::new(RuleCriteria::District, operator, serde_json::json!(value))
        });

    let district_list = proptest::collection::vec(district_strategy(), 1..4).prop_map(|values| {
        EligibilityRule::new(
            RuleCriteria::District,
            RuleOperator::In,
            serde_json::json!(values),
        )
    });

    let village = (
        village_strategy(),
        prop_oneof![Just(RuleOperator::Eq), Just(RuleOperator::Ne)],
    )
        .prop_map(|(value, operator)| {
            EligibilityRule::new(RuleCriteria::Village, operator, serde_json::json!(value))
        });

    prop_oneof![approved, claim_type, land_size, district, district_list, village]
        .prop_flat_map(|rule| {
            logical_op_strategy().prop_map(move |op| rule.clone().with_connector(op))
        })
}

/// Strategy for a scheme's whole rule list
pub fn rule_list_strategy() -> impl Strategy<Value = Vec<EligibilityRule>> {
    proptest::collection::vec(eligibility_rule_strategy(), 0..5)
}

/// Strategy for claim fact snapshots
pub fn claim_facts_strategy() -> impl Strategy<Value = ClaimFacts> {
    (
        any::<bool>(),
        claim_type_strategy(),
        land_size_strategy(),
        village_strategy(),
        district_strategy(),
    )
        .prop_map(
            |(has_approved_claim, claim_type, land_size_claimed, village, district)| ClaimFacts {
                has_approved_claim,
                claim_type: claim_type.as_str().to_string(),
                land_size_claimed,
                village,
                district,
            },
        )
}

#[cfg(test)]
mod tests {
    use super::*;
    use domain_schemes::rules::evaluate_rules;
    use rust_decimal_macros::dec;

    proptest! {
        #[test]
        fn land_sizes_are_positive(size in land_size_strategy()) {
            prop_assert!(size > Decimal::ZERO);
        }

        #[test]
        fn within_limit_sizes_respect_the_ceiling(size in within_limit_land_strategy()) {
            prop_assert!(size <= dec!(4));
        }

        #[test]
        fn oversized_sizes_exceed_the_ceiling(size in oversized_land_strategy()) {
            prop_assert!(size > dec!(4));
        }

        #[test]
        fn generated_parcels_validate(parcel in parcel_strategy()) {
            prop_assert!(parcel.validate().is_ok());
        }

        #[test]
        fn survey_numbers_have_a_slash(number in survey_number_strategy()) {
            prop_assert!(number.contains('/'));
        }

        #[test]
        fn well_typed_rules_always_evaluate(
            rules in rule_list_strategy(),
            facts in claim_facts_strategy(),
        ) {
            // Any verdict is fine; a type error would be a strategy bug
            prop_assert!(evaluate_rules(&rules, &facts).is_ok());
        }

        #[test]
        fn empty_rule_lists_are_always_eligible(facts in claim_facts_strategy()) {
            prop_assert!(evaluate_rules(&[], &facts).unwrap());
        }
    }
}
