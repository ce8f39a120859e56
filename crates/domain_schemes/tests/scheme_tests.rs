//! Catalog and eligibility matching tests

use rust_decimal_macros::dec;
use serde_json::json;

use core_kernel::SchemeId;
use domain_schemes::ports::mock::MockSchemeCatalog;
use domain_schemes::{
    eligible_schemes, ClaimFacts, EligibilityRule, RuleCriteria, RuleOperator, Scheme,
    SchemeCatalog, SchemeStatus,
};

fn titled_facts() -> ClaimFacts {
    ClaimFacts {
        has_approved_claim: true,
        claim_type: "Individual".to_string(),
        land_size_claimed: dec!(1.8),
        village: "Kondagaon".to_string(),
        district: "Bastar".to_string(),
    }
}

fn housing_scheme() -> Scheme {
    Scheme::new(
        "PMAY-G",
        "Housing",
        "Ministry of Rural Development",
        "Construction assistance for rural households with recognized tenure",
    )
    .unwrap()
    .with_status(SchemeStatus::Active)
    .with_budget(dec!(120000))
    .with_rules(vec![EligibilityRule::new(
        RuleCriteria::HasApprovedClaim,
        RuleOperator::Eq,
        json!(true),
    )])
    .with_benefits(vec!["1.20 lakh construction assistance"])
}

fn smallholder_scheme() -> Scheme {
    Scheme::new(
        "PM-KISAN",
        "Agriculture",
        "Ministry of Agriculture",
        "Income support for small and marginal farmer families",
    )
    .unwrap()
    .with_status(SchemeStatus::Active)
    .with_rules(vec![
        EligibilityRule::new(
            RuleCriteria::HasApprovedClaim,
            RuleOperator::Eq,
            json!(true),
        ),
        EligibilityRule::new(RuleCriteria::LandSizeClaimed, RuleOperator::Lte, json!(2.0)),
    ])
    .with_benefits(vec!["6,000 per year income support"])
}

fn community_scheme() -> Scheme {
    Scheme::new(
        "Van Dhan Vikas",
        "Livelihood",
        "Ministry of Tribal Affairs",
        "Value addition for minor forest produce collectives",
    )
    .unwrap()
    .with_status(SchemeStatus::Active)
    .with_rules(vec![EligibilityRule::new(
        RuleCriteria::ClaimType,
        RuleOperator::Eq,
        json!("Community"),
    )])
}

fn draft_scheme() -> Scheme {
    Scheme::new(
        "Jal Jeevan Mission",
        "Water",
        "Ministry of Jal Shakti",
        "Piped water connection for every household",
    )
    .unwrap()
}

// ============================================================================
// Catalog Tests
// ============================================================================

mod catalog_tests {
    use super::*;

    #[tokio::test]
    async fn test_get_scheme() {
        let scheme = housing_scheme();
        let id = scheme.id;
        let catalog = MockSchemeCatalog::with_schemes(vec![scheme]).await;

        let loaded = catalog.get_scheme(id, None).await.unwrap();
        assert_eq!(loaded.name, "PMAY-G");
    }

    #[tokio::test]
    async fn test_get_missing_scheme() {
        let catalog = MockSchemeCatalog::new();
        let err = catalog.get_scheme(SchemeId::new(), None).await.unwrap_err();
        assert!(err.is_not_found());
    }

    #[tokio::test]
    async fn test_list_filters_by_status() {
        let catalog =
            MockSchemeCatalog::with_schemes(vec![housing_scheme(), draft_scheme()]).await;

        let active = catalog
            .list_schemes(Some(SchemeStatus::Active), None)
            .await
            .unwrap();
        assert_eq!(active.len(), 1);
        assert_eq!(active[0].name, "PMAY-G");

        let all = catalog.list_schemes(None, None).await.unwrap();
        assert_eq!(all.len(), 2);
    }

    #[tokio::test]
    async fn test_list_sorts_by_name() {
        let catalog = MockSchemeCatalog::with_schemes(vec![
            community_scheme(),
            housing_scheme(),
            smallholder_scheme(),
        ])
        .await;

        let names: Vec<String> = catalog
            .list_schemes(None, None)
            .await
            .unwrap()
            .into_iter()
            .map(|s| s.name)
            .collect();
        assert_eq!(names, vec!["PM-KISAN", "PMAY-G", "Van Dhan Vikas"]);
    }
}

// ============================================================================
// Eligibility Matching Tests
// ============================================================================

mod matching_tests {
    use super::*;

    #[tokio::test]
    async fn test_titled_smallholder_matches_housing_and_income_support() {
        let catalog = MockSchemeCatalog::with_schemes(vec![
            housing_scheme(),
            smallholder_scheme(),
            community_scheme(),
            draft_scheme(),
        ])
        .await;

        let matched = eligible_schemes(&catalog, &titled_facts()).await.unwrap();
        let names: Vec<&str> = matched.iter().map(|s| s.name.as_str()).collect();

        // Individual claim: the community produce scheme does not match,
        // and the draft scheme is not considered at all
        assert_eq!(names, vec!["PM-KISAN", "PMAY-G"]);
    }

    #[tokio::test]
    async fn test_unapproved_claim_matches_nothing() {
        let catalog =
            MockSchemeCatalog::with_schemes(vec![housing_scheme(), smallholder_scheme()]).await;

        let mut facts = titled_facts();
        facts.has_approved_claim = false;

        let matched = eligible_schemes(&catalog, &facts).await.unwrap();
        assert!(matched.is_empty());
    }

    #[tokio::test]
    async fn test_large_holding_fails_size_cap() {
        let catalog = MockSchemeCatalog::with_schemes(vec![smallholder_scheme()]).await;

        let mut facts = titled_facts();
        facts.land_size_claimed = dec!(3.5);

        let matched = eligible_schemes(&catalog, &facts).await.unwrap();
        assert!(matched.is_empty());
    }

    #[tokio::test]
    async fn test_community_claim_matches_produce_scheme() {
        let catalog =
            MockSchemeCatalog::with_schemes(vec![community_scheme(), smallholder_scheme()]).await;

        let mut facts = titled_facts();
        facts.claim_type = "Community".to_string();
        facts.land_size_claimed = dec!(40);

        let matched = eligible_schemes(&catalog, &facts).await.unwrap();
        let names: Vec<&str> = matched.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["Van Dhan Vikas"]);
    }

    #[tokio::test]
    async fn test_malformed_scheme_is_skipped_not_fatal() {
        let broken = Scheme::new(
            "Misconfigured",
            "General",
            "Unknown",
            "Rule value has the wrong type",
        )
        .unwrap()
        .with_status(SchemeStatus::Active)
        .with_rules(vec![EligibilityRule::new(
            RuleCriteria::LandSizeClaimed,
            RuleOperator::Gt,
            json!("lots"),
        )]);

        let catalog = MockSchemeCatalog::with_schemes(vec![broken, housing_scheme()]).await;

        let matched = eligible_schemes(&catalog, &titled_facts()).await.unwrap();
        let names: Vec<&str> = matched.iter().map(|s| s.name.as_str()).collect();
        assert_eq!(names, vec!["PMAY-G"]);
    }

    #[tokio::test]
    async fn test_scheme_without_rules_matches_everyone() {
        let open = Scheme::new(
            "Ayushman Bharat",
            "Health",
            "Ministry of Health",
            "Health coverage for eligible households",
        )
        .unwrap()
        .with_status(SchemeStatus::Active);

        let catalog = MockSchemeCatalog::with_schemes(vec![open]).await;

        let mut facts = titled_facts();
        facts.has_approved_claim = false;

        let matched = eligible_schemes(&catalog, &facts).await.unwrap();
        assert_eq!(matched.len(), 1);
    }
}

// ============================================================================
// Serde Tests
// ============================================================================

mod serde_tests {
    use super::*;

    #[test]
    fn test_scheme_round_trip() {
        let scheme = smallholder_scheme();
        let encoded = serde_json::to_string(&scheme).unwrap();
        let decoded: Scheme = serde_json::from_str(&encoded).unwrap();
        assert_eq!(decoded, scheme);
    }

    #[test]
    fn test_portal_rule_shape_parses() {
        // Shape produced by the scheme-admin portal
        let raw = json!([
            {"criteria": "hasApprovedClaim", "operator": "==", "value": true, "logicalOp": "AND"},
            {"criteria": "claimType", "operator": "in", "value": ["Individual", "Community"]},
            {"criteria": "landSizeClaimed", "operator": "<=", "value": 4}
        ]);
        let rules: Vec<EligibilityRule> = serde_json::from_value(raw).unwrap();
        assert_eq!(rules.len(), 3);
        assert_eq!(rules[0].criteria, RuleCriteria::HasApprovedClaim);
        assert_eq!(rules[1].operator, RuleOperator::In);
    }
}
