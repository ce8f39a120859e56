//! Integration Tests for the Land-Claims Workflow
//!
//! These tests verify cross-domain workflows and end-to-end scenarios
//! that involve multiple crates working together, driving the real
//! claims service over in-memory adapters.

use std::sync::Arc;

use core_kernel::{Actor, Role, UserId};
use rust_decimal_macros::dec;

use domain_claims::claim::{ClaimStatus, NewClaim};
use domain_claims::ports::mock::{MockClaimStore, MockUserDirectory, RecordingNotifier};
use domain_claims::{ClaimsService, HeuristicAssetAnalyzer, KeywordExtractor};

use test_utils::builders::{gram_sabha_resolution, ClaimBuilder, ReportBuilder, UserRecordBuilder};
use test_utils::fixtures::{GeoFixtures, StringFixtures, TemporalFixtures};
use test_utils::{assert_err_variant, assert_ok};

fn build_service(
    store: &Arc<MockClaimStore>,
    users: &Arc<MockUserDirectory>,
    notifier: &Arc<RecordingNotifier>,
) -> ClaimsService {
    ClaimsService::new(
        store.clone(),
        users.clone(),
        notifier.clone(),
        Arc::new(HeuristicAssetAnalyzer::new()),
        Arc::new(KeywordExtractor::new()),
    )
}

fn filing(claimant: UserId) -> NewClaim {
    NewClaim {
        claimant_id: Some(claimant),
        claimant_name: StringFixtures::claimant_name().to_string(),
        village: StringFixtures::village().to_string(),
        district: StringFixtures::district().to_string(),
        state: StringFixtures::state().to_string(),
        survey_number: Some(StringFixtures::survey_number().to_string()),
        claim_type: domain_claims::claim::ClaimType::Individual,
        land_size_claimed: dec!(2.5),
        reason: None,
        geometry: None,
        village_centroid_fallback: false,
        assigned_to: None,
    }
}

fn citizen(id: UserId) -> Actor {
    Actor::new(id, "Somari Bai", vec![Role::Citizen])
}

fn verifier() -> Actor {
    Actor::new(UserId::new(), "S Tirkey", vec![Role::VerificationOfficer])
        .with_district(StringFixtures::district())
}

fn authority() -> Actor {
    Actor::new(UserId::new(), "District Collector", vec![Role::ApprovingAuthority])
        .with_district(StringFixtures::district())
}

fn super_admin() -> Actor {
    Actor::new(UserId::new(), "State Nodal Officer", vec![Role::SuperAdmin])
}

mod claim_lifecycle {
    use super::*;
    use domain_claims::verification::Recommendation;
    use test_utils::assertions::assert_passed_through;

    /// Walks one claim from filing through every verification stage to a
    /// title deed
    #[tokio::test]
    async fn test_full_workflow_from_filing_to_title() {
        let store = Arc::new(MockClaimStore::new());
        let users = Arc::new(MockUserDirectory::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let service = build_service(&store, &users, &notifier);

        let claimant = UserId::new();
        let filed = assert_ok!(
            service
                .create_claim(&citizen(claimant), filing(claimant), false)
                .await
        );
        let id = filed.claim.id;
        assert_eq!(filed.claim.status, ClaimStatus::Submitted);
        assert!(filed.screening.is_none());

        let officer = verifier();
        let claim = assert_ok!(
            service
                .record_gram_sabha(&officer, id, gram_sabha_resolution())
                .await
        );
        assert_eq!(claim.status, ClaimStatus::GramSabhaApproved);

        // The field report is evidence; it moves nothing by itself
        let field_worker = Actor::new(UserId::new(), "D Kujur", vec![Role::FieldWorker]);
        let report = ReportBuilder::recommending(Recommendation::Approve)
            .by(field_worker.id)
            .with_joint_signatures()
            .build();
        let claim = assert_ok!(service.attach_report(&field_worker, id, report).await);
        assert_eq!(claim.status, ClaimStatus::GramSabhaApproved);
        assert!(claim.verification_report.is_some());

        for target in [
            ClaimStatus::FieldVerified,
            ClaimStatus::JointVerified,
            ClaimStatus::SdlcScrutiny,
        ] {
            assert_ok!(service.advance_stage(&officer, id, target, None).await);
        }

        let claim = assert_ok!(
            service
                .verify_claim(&officer, id, Some("Records consistent".to_string()))
                .await
        );
        assert_eq!(claim.status, ClaimStatus::Verified);

        let approver = authority();
        let claim = assert_ok!(service.approve_claim(&approver, id, None).await);
        assert_eq!(claim.status, ClaimStatus::Approved);

        let claim = assert_ok!(service.issue_title(&approver, id).await);
        assert_eq!(claim.status, ClaimStatus::TitleIssued);
        let deed = claim.title_deed.as_ref().expect("title deed generated");
        assert!(deed.serial_number.starts_with("FRA-"));

        assert_passed_through(&claim, ClaimStatus::GramSabhaApproved);
        assert_passed_through(&claim, ClaimStatus::SdlcScrutiny);

        // The store holds the same terminal state the service returned
        let stored = store.stored(id).await.expect("claim persisted");
        assert_eq!(stored.status, ClaimStatus::TitleIssued);
    }

    /// Remand sends a verified claim back; the Gram Sabha step then
    /// restarts verification
    #[tokio::test]
    async fn test_remand_restarts_verification() {
        let claim = ClaimBuilder::new().with_status(ClaimStatus::Verified).build();
        let id = claim.id;
        let store = Arc::new(MockClaimStore::with_claims(vec![claim]).await);
        let users = Arc::new(MockUserDirectory::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let service = build_service(&store, &users, &notifier);

        let officer = verifier();
        let claim = assert_ok!(
            service
                .remand_claim(&officer, id, "Boundary disputed by neighbour".to_string())
                .await
        );
        assert_eq!(claim.status, ClaimStatus::Remanded);

        let claim = assert_ok!(
            service
                .record_gram_sabha(&officer, id, gram_sabha_resolution())
                .await
        );
        assert_eq!(claim.status, ClaimStatus::GramSabhaApproved);
    }

    /// Rejection needs a reason, and only the claimant can resubmit
    #[tokio::test]
    async fn test_rejection_and_citizen_resubmission() {
        let claimant = UserId::new();
        let claim = ClaimBuilder::new().with_claimant(claimant).build();
        let id = claim.id;
        let store = Arc::new(MockClaimStore::with_claims(vec![claim]).await);
        let users = Arc::new(MockUserDirectory::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let service = build_service(&store, &users, &notifier);

        let officer = verifier();
        assert_err_variant!(
            service.reject_claim(&officer, id, "   ".to_string()).await,
            domain_claims::ClaimError::Validation(_)
        );

        let claim = assert_ok!(
            service
                .reject_claim(&officer, id, "No evidence of occupation".to_string())
                .await
        );
        assert_eq!(claim.status, ClaimStatus::Rejected);
        assert!(claim.rejection_reason.is_some());

        // A stranger cannot resubmit someone else's claim
        assert_err_variant!(
            service.resubmit_claim(&citizen(UserId::new()), id).await,
            domain_claims::ClaimError::Authorization(_)
        );

        let claim = assert_ok!(service.resubmit_claim(&citizen(claimant), id).await);
        assert_eq!(claim.status, ClaimStatus::Submitted);
        assert!(claim.rejection_reason.is_none());
    }

    /// Stage guards hold even for permitted roles
    #[tokio::test]
    async fn test_approval_requires_a_verified_claim() {
        let claim = ClaimBuilder::new().build();
        let id = claim.id;
        let store = Arc::new(MockClaimStore::with_claims(vec![claim]).await);
        let users = Arc::new(MockUserDirectory::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let service = build_service(&store, &users, &notifier);

        assert_err_variant!(
            service.approve_claim(&authority(), id, None).await,
            domain_claims::ClaimError::State { .. }
        );
    }

    /// Field verification cannot be reached without a report on file
    #[tokio::test]
    async fn test_advance_to_field_verified_needs_a_report() {
        let claim = ClaimBuilder::new()
            .with_status(ClaimStatus::GramSabhaApproved)
            .build();
        let id = claim.id;
        let store = Arc::new(MockClaimStore::with_claims(vec![claim]).await);
        let users = Arc::new(MockUserDirectory::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let service = build_service(&store, &users, &notifier);

        assert_err_variant!(
            service
                .advance_stage(&verifier(), id, ClaimStatus::FieldVerified, None)
                .await,
            domain_claims::ClaimError::State { .. }
        );
    }
}

mod conflict_screening {
    use super::*;
    use test_utils::assertions::{assert_conflict_blocked, assert_conflict_free};

    /// A parcel overlapping an active claim files as Conflict_Detected
    /// rather than Submitted
    #[tokio::test]
    async fn test_overlapping_filing_is_routed_to_conflict_detected() {
        let existing = ClaimBuilder::new()
            .with_geometry(GeoFixtures::dindori_parcel())
            .build();
        let store = Arc::new(MockClaimStore::with_claims(vec![existing]).await);
        let users = Arc::new(MockUserDirectory::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let service = build_service(&store, &users, &notifier);

        let claimant = UserId::new();
        let mut details = filing(claimant);
        details.geometry = Some(GeoFixtures::overlapping_parcel());

        let screened = assert_ok!(
            service
                .create_claim(&citizen(claimant), details, false)
                .await
        );
        assert_eq!(screened.claim.status, ClaimStatus::ConflictDetected);
        let report = screened.screening.expect("screening ran");
        assert_conflict_blocked(&report);
        assert_eq!(report.conflicts.len(), 1);
    }

    /// A distant parcel in the same district screens clean
    #[tokio::test]
    async fn test_distant_parcel_files_clean() {
        let existing = ClaimBuilder::new()
            .with_geometry(GeoFixtures::dindori_parcel())
            .build();
        let store = Arc::new(MockClaimStore::with_claims(vec![existing]).await);
        let users = Arc::new(MockUserDirectory::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let service = build_service(&store, &users, &notifier);

        let claimant = UserId::new();
        let mut details = filing(claimant);
        details.geometry = Some(GeoFixtures::distant_parcel());

        let screened = assert_ok!(
            service
                .create_claim(&citizen(claimant), details, false)
                .await
        );
        assert_eq!(screened.claim.status, ClaimStatus::Submitted);
        assert_conflict_free(&screened.screening.expect("screening ran"));
    }

    /// The standalone screen is officer territory
    #[tokio::test]
    async fn test_standalone_screening_denies_citizens() {
        let store = Arc::new(MockClaimStore::new());
        let users = Arc::new(MockUserDirectory::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let service = build_service(&store, &users, &notifier);

        let geometry = GeoFixtures::dindori_parcel();
        assert_err_variant!(
            service
                .check_conflicts(
                    &citizen(UserId::new()),
                    &geometry,
                    StringFixtures::district(),
                    None,
                )
                .await,
            domain_claims::ClaimError::Authorization(_)
        );

        let report = assert_ok!(
            service
                .check_conflicts(&verifier(), &geometry, StringFixtures::district(), None)
                .await
        );
        assert_conflict_free(&report);
    }
}

mod scheme_eligibility {
    use super::*;
    use domain_schemes::ports::mock::MockSchemeCatalog;
    use domain_schemes::rules::{ClaimFacts, EligibilityRule, RuleCriteria, RuleOperator};
    use serde_json::json;
    use test_utils::builders::active_scheme;

    fn facts_for(status: ClaimStatus) -> ClaimFacts {
        ClaimFacts {
            has_approved_claim: matches!(
                status,
                ClaimStatus::Approved | ClaimStatus::TitleIssued
            ),
            claim_type: "Individual".to_string(),
            land_size_claimed: dec!(2.5),
            village: StringFixtures::village().to_string(),
            district: StringFixtures::district().to_string(),
        }
    }

    /// Title holders unlock title-gated schemes; open schemes apply to all
    #[tokio::test]
    async fn test_title_gated_schemes_open_after_approval() {
        let gated = active_scheme(
            "PM Awas Yojana (Gramin)",
            vec![EligibilityRule::new(
                RuleCriteria::HasApprovedClaim,
                RuleOperator::Eq,
                json!(true),
            )],
        );
        let open = active_scheme("Van Dhan Vikas", vec![]);
        let catalog = MockSchemeCatalog::with_schemes(vec![gated, open]).await;

        let before = assert_ok!(
            domain_schemes::eligible_schemes(&catalog, &facts_for(ClaimStatus::Submitted)).await
        );
        assert_eq!(before.len(), 1);
        assert_eq!(before[0].name, "Van Dhan Vikas");

        let after = assert_ok!(
            domain_schemes::eligible_schemes(&catalog, &facts_for(ClaimStatus::TitleIssued)).await
        );
        assert_eq!(after.len(), 2);
    }

    /// District-restricted schemes match case-insensitively
    #[tokio::test]
    async fn test_district_restricted_scheme() {
        let scheme = active_scheme(
            "Tendu Patta Bonus",
            vec![EligibilityRule::new(
                RuleCriteria::District,
                RuleOperator::In,
                json!(["dindori", "Mandla"]),
            )],
        );
        let catalog = MockSchemeCatalog::with_schemes(vec![scheme]).await;

        let eligible = assert_ok!(
            domain_schemes::eligible_schemes(&catalog, &facts_for(ClaimStatus::Submitted)).await
        );
        assert_eq!(eligible.len(), 1);

        let mut elsewhere = facts_for(ClaimStatus::Submitted);
        elsewhere.district = "Balaghat".to_string();
        let eligible = assert_ok!(
            domain_schemes::eligible_schemes(&catalog, &elsewhere).await
        );
        assert!(eligible.is_empty());
    }
}

mod sla_monitoring {
    use super::*;
    use domain_claims::SlaMonitor;

    /// One aged, one warning, one fresh claim; the sweep classifies each
    /// and notifies the district officers plus the escalation chain
    #[tokio::test]
    async fn test_sweep_classifies_and_notifies() {
        let fresh = ClaimBuilder::new().build();

        let mut warning = ClaimBuilder::new().build();
        warning.status_history[0].changed_at = TemporalFixtures::days_ago(6);

        let mut breached = ClaimBuilder::new().build();
        breached.status_history[0].changed_at = TemporalFixtures::days_ago(10);

        let store =
            Arc::new(MockClaimStore::with_claims(vec![fresh, warning, breached]).await);
        let officer = UserRecordBuilder::officer(Role::VerificationOfficer).build();
        let admin = UserRecordBuilder::officer(Role::SuperAdmin).build();
        let users = Arc::new(MockUserDirectory::with_users(vec![officer, admin]).await);
        let notifier = Arc::new(RecordingNotifier::new());

        let monitor = SlaMonitor::new(store.clone(), users.clone(), notifier.clone());
        let outcome = assert_ok!(monitor.run_sweep().await);

        assert_eq!(outcome.checked, 3);
        assert_eq!(outcome.at_risk, 1);
        assert_eq!(outcome.breached, 1);
        // Warning goes to the stage officer; the breach also reaches the
        // super admin
        assert_eq!(outcome.notifications_sent, 3);

        let alerts = notifier.sla_alerts.read().await;
        assert_eq!(alerts.iter().filter(|(_, _, breached)| *breached).count(), 2);
        assert_eq!(alerts.iter().filter(|(_, _, breached)| !breached).count(), 1);
    }

    /// The aggregate report mirrors the sweep's classification
    #[tokio::test]
    async fn test_sla_report_totals() {
        let fresh = ClaimBuilder::new().build();
        let mut breached = ClaimBuilder::new().build();
        breached.status_history[0].changed_at = TemporalFixtures::days_ago(10);

        let store = Arc::new(MockClaimStore::with_claims(vec![fresh, breached]).await);
        let users = Arc::new(MockUserDirectory::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let service = build_service(&store, &users, &notifier);

        // Deadline reporting is super-admin only
        assert_err_variant!(
            service.sla_report(&verifier()).await,
            domain_claims::ClaimError::Authorization(_)
        );

        let report = assert_ok!(service.sla_report(&super_admin()).await);
        assert_eq!(report.total_monitored, 2);
        assert_eq!(report.on_track.len(), 1);
        assert_eq!(report.breached.len(), 1);
        assert!(report.at_risk.is_empty());
    }

    /// Draft and terminal claims sit outside the monitored set
    #[tokio::test]
    async fn test_drafts_and_titles_are_not_monitored() {
        let mut draft = ClaimBuilder::new().with_status(ClaimStatus::Draft).build();
        draft.status_history[0].changed_at = TemporalFixtures::days_ago(30);
        let mut titled = ClaimBuilder::new()
            .with_status(ClaimStatus::TitleIssued)
            .build();
        titled.status_history[0].changed_at = TemporalFixtures::days_ago(30);

        let store = Arc::new(MockClaimStore::with_claims(vec![draft, titled]).await);
        let users = Arc::new(MockUserDirectory::new());
        let notifier = Arc::new(RecordingNotifier::new());

        let monitor = SlaMonitor::new(store.clone(), users.clone(), notifier.clone());
        let outcome = assert_ok!(monitor.run_sweep().await);
        assert_eq!(outcome.checked, 0);
        assert_eq!(notifier.sla_alert_count().await, 0);
    }
}

mod anomaly_detection {
    use super::*;
    use domain_claims::anomaly::AnomalyKind;

    /// The same survey number claimed twice in one village is flagged
    #[tokio::test]
    async fn test_duplicate_survey_numbers_are_flagged() {
        let first = ClaimBuilder::new().build();
        let second = ClaimBuilder::new().with_random_claimant().build();
        let store = Arc::new(MockClaimStore::with_claims(vec![first, second]).await);
        let users = Arc::new(MockUserDirectory::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let service = build_service(&store, &users, &notifier);

        let anomalies = assert_ok!(service.scan_anomalies(&super_admin()).await);
        let duplicate = anomalies
            .iter()
            .find(|a| a.kind == AnomalyKind::DuplicateSurvey)
            .expect("duplicate survey flagged");
        assert_eq!(duplicate.claim_ids.len(), 2);
        assert!(duplicate.subject.contains("55/3"));
    }

    /// Distinct parcels raise nothing
    #[tokio::test]
    async fn test_distinct_surveys_pass_clean() {
        let first = ClaimBuilder::new().build();
        let second = ClaimBuilder::new().with_survey_number("102/1").build();
        let store = Arc::new(MockClaimStore::with_claims(vec![first, second]).await);
        let users = Arc::new(MockUserDirectory::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let service = build_service(&store, &users, &notifier);

        let anomalies = assert_ok!(service.scan_anomalies(&super_admin()).await);
        assert!(anomalies.is_empty());
    }

    /// The scan is super-admin territory
    #[tokio::test]
    async fn test_scan_denies_officers() {
        let store = Arc::new(MockClaimStore::new());
        let users = Arc::new(MockUserDirectory::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let service = build_service(&store, &users, &notifier);

        assert_err_variant!(
            service.scan_anomalies(&verifier()).await,
            domain_claims::ClaimError::Authorization(_)
        );
    }
}

mod risk_screening {
    use super::*;
    use domain_claims::RiskLevel;
    use test_utils::assertions::{assert_flag_mentions, assert_risk_at_least};
    use test_utils::fixtures::LandFixtures;

    /// An oversized, undocumented claim screens critical
    #[tokio::test]
    async fn test_oversized_claim_without_evidence_is_critical() {
        let claim = ClaimBuilder::new()
            .with_land_size(LandFixtures::oversized_holding())
            .build();
        let id = claim.id;
        let store = Arc::new(MockClaimStore::with_claims(vec![claim]).await);
        let users = Arc::new(MockUserDirectory::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let service = build_service(&store, &users, &notifier);

        let review = assert_ok!(service.risk_review(&verifier(), id).await);
        assert_risk_at_least(&review.assessment, RiskLevel::Critical);
        assert_flag_mentions(&review.assessment, "statutory limit");
        assert_flag_mentions(&review.assessment, "No supporting documents");
        assert!(review.draft_title.is_none());
    }

    /// Verified claims carry a draft title for the approving authority
    #[tokio::test]
    async fn test_verified_claim_offers_a_draft_title() {
        let claim = ClaimBuilder::new().with_status(ClaimStatus::Verified).build();
        let id = claim.id;
        let store = Arc::new(MockClaimStore::with_claims(vec![claim]).await);
        let users = Arc::new(MockUserDirectory::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let service = build_service(&store, &users, &notifier);

        let review = assert_ok!(service.risk_review(&verifier(), id).await);
        let draft = review.draft_title.expect("draft title present");
        assert!(draft.contains(StringFixtures::claimant_name()));
    }

    /// Citizens cannot see the risk screen, even on their own claim
    #[tokio::test]
    async fn test_risk_screen_denies_claimants() {
        let claimant = UserId::new();
        let claim = ClaimBuilder::new().with_claimant(claimant).build();
        let id = claim.id;
        let store = Arc::new(MockClaimStore::with_claims(vec![claim]).await);
        let users = Arc::new(MockUserDirectory::new());
        let notifier = Arc::new(RecordingNotifier::new());
        let service = build_service(&store, &users, &notifier);

        assert_err_variant!(
            service.risk_review(&citizen(claimant), id).await,
            domain_claims::ClaimError::Authorization(_)
        );
    }
}
