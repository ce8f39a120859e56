//! Test Data Builders
//!
//! Provides builder patterns for constructing test data with sensible
//! defaults. These builders allow tests to specify only the relevant
//! fields while using defaults for everything else.

use chrono::Utc;
use core_kernel::{Geometry, Role, UserId};
use fake::faker::name::en::Name;
use fake::Fake;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;

use domain_claims::claim::{Claim, ClaimStatus, ClaimType, GramSabhaResolution, NewClaim};
use domain_claims::verification::{Recommendation, SyncStatus, VerificationReport};
use domain_claims::UserRecord;
use domain_schemes::rules::EligibilityRule;
use domain_schemes::{Scheme, SchemeStatus};

use crate::fixtures::{IdFixtures, LandFixtures, StringFixtures};

/// Builder for constructing domain claims in any workflow stage
///
/// Claims are created through the real intake path and then moved to the
/// requested status, so invariants like the submission history entry hold
/// for every stage at or past `Submitted`.
pub struct ClaimBuilder {
    claimant_id: Option<UserId>,
    claimant_name: String,
    village: String,
    district: String,
    state: String,
    survey_number: Option<String>,
    claim_type: ClaimType,
    land_size_claimed: Decimal,
    reason: Option<String>,
    geometry: Option<Geometry>,
    village_centroid_fallback: bool,
    assigned_to: Option<UserId>,
    status: ClaimStatus,
    created_by: UserId,
}

impl Default for ClaimBuilder {
    fn default() -> Self {
        Self::new()
    }
}

impl ClaimBuilder {
    /// Creates a new builder with default values
    pub fn new() -> Self {
        let claimant = IdFixtures::claimant_id();
        Self {
            claimant_id: Some(claimant),
            claimant_name: StringFixtures::claimant_name().to_string(),
            village: StringFixtures::village().to_string(),
            district: StringFixtures::district().to_string(),
            state: StringFixtures::state().to_string(),
            survey_number: Some(StringFixtures::survey_number().to_string()),
            claim_type: ClaimType::Individual,
            land_size_claimed: LandFixtures::typical_holding(),
            reason: None,
            geometry: None,
            village_centroid_fallback: false,
            assigned_to: None,
            status: ClaimStatus::Submitted,
            created_by: claimant,
        }
    }

    /// Starts from a community forest claim instead of an individual one
    pub fn community() -> Self {
        Self::new()
            .with_claim_type(ClaimType::Community)
            .with_land_size(LandFixtures::community_forest())
            .with_claimant_name("Gram Sabha Bhilai Khurd")
    }

    /// Sets the claimant
    pub fn with_claimant(mut self, id: UserId) -> Self {
        self.claimant_id = Some(id);
        self.created_by = id;
        self
    }

    /// Clears the claimant link, as with paper filings entered by an officer
    pub fn without_claimant(mut self) -> Self {
        self.claimant_id = None;
        self
    }

    /// Sets the claimant name
    pub fn with_claimant_name(mut self, name: impl Into<String>) -> Self {
        self.claimant_name = name.into();
        self
    }

    /// Randomizes the claimant identity
    pub fn with_random_claimant(mut self) -> Self {
        self.claimant_name = Name().fake();
        let id = UserId::new();
        self.claimant_id = Some(id);
        self.created_by = id;
        self
    }

    /// Sets the village
    pub fn with_village(mut self, village: impl Into<String>) -> Self {
        self.village = village.into();
        self
    }

    /// Sets the district
    pub fn with_district(mut self, district: impl Into<String>) -> Self {
        self.district = district.into();
        self
    }

    /// Sets the claim type
    pub fn with_claim_type(mut self, claim_type: ClaimType) -> Self {
        self.claim_type = claim_type;
        self
    }

    /// Sets the claimed extent in hectares
    pub fn with_land_size(mut self, hectares: Decimal) -> Self {
        self.land_size_claimed = hectares;
        self
    }

    /// Sets the survey number
    pub fn with_survey_number(mut self, number: impl Into<String>) -> Self {
        self.survey_number = Some(number.into());
        self
    }

    /// Sets the parcel boundary
    pub fn with_geometry(mut self, geometry: Geometry) -> Self {
        self.geometry = Some(geometry);
        self
    }

    /// Sets the workflow status the built claim should be in
    pub fn with_status(mut self, status: ClaimStatus) -> Self {
        self.status = status;
        self
    }

    /// Assigns the claim to an officer
    pub fn assigned_to(mut self, officer: UserId) -> Self {
        self.assigned_to = Some(officer);
        self
    }

    /// Builds the claim
    pub fn build(self) -> Claim {
        let details = NewClaim {
            claimant_id: self.claimant_id,
            claimant_name: self.claimant_name,
            village: self.village,
            district: self.district,
            state: self.state,
            survey_number: self.survey_number,
            claim_type: self.claim_type,
            land_size_claimed: self.land_size_claimed,
            reason: self.reason,
            geometry: self.geometry,
            village_centroid_fallback: self.village_centroid_fallback,
            assigned_to: self.assigned_to,
        };

        // Draft claims are created as drafts; everything else enters as
        // Submitted so the submission history entry exists, then moves to
        // the requested stage.
        let initial = if self.status == ClaimStatus::Draft {
            ClaimStatus::Draft
        } else {
            ClaimStatus::Submitted
        };
        let mut claim = Claim::create(details, self.created_by, initial, None)
            .expect("builder produced invalid claim details");
        claim.status = self.status;
        claim
    }
}

/// Builder for directory user records
pub struct UserRecordBuilder {
    record: UserRecord,
}

impl UserRecordBuilder {
    /// A citizen claimant in the default village
    pub fn citizen() -> Self {
        Self {
            record: UserRecord {
                id: UserId::new(),
                name: StringFixtures::claimant_name().to_string(),
                email: None,
                roles: vec![Role::Citizen],
                state: Some(StringFixtures::state().to_string()),
                district: Some(StringFixtures::district().to_string()),
                village: Some(StringFixtures::village().to_string()),
                active: true,
            },
        }
    }

    /// An officer holding `role` in the default district
    pub fn officer(role: Role) -> Self {
        Self {
            record: UserRecord {
                id: UserId::new(),
                name: StringFixtures::officer_name().to_string(),
                email: Some("officer@example.gov.in".to_string()),
                roles: vec![role],
                state: Some(StringFixtures::state().to_string()),
                district: Some(StringFixtures::district().to_string()),
                village: None,
                active: true,
            },
        }
    }

    /// Sets the user id
    pub fn with_id(mut self, id: UserId) -> Self {
        self.record.id = id;
        self
    }

    /// Sets the name
    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.record.name = name.into();
        self
    }

    /// Randomizes the name
    pub fn with_random_name(mut self) -> Self {
        self.record.name = Name().fake();
        self
    }

    /// Sets the district
    pub fn with_district(mut self, district: impl Into<String>) -> Self {
        self.record.district = Some(district.into());
        self
    }

    /// Sets the village
    pub fn with_village(mut self, village: impl Into<String>) -> Self {
        self.record.village = Some(village.into());
        self
    }

    /// Adds a role on top of the starting one
    pub fn with_role(mut self, role: Role) -> Self {
        self.record.roles.push(role);
        self
    }

    /// Marks the account deactivated
    pub fn inactive(mut self) -> Self {
        self.record.active = false;
        self
    }

    /// Builds the record
    pub fn build(self) -> UserRecord {
        self.record
    }
}

/// Builder for field verification reports
pub struct ReportBuilder {
    report: VerificationReport,
}

impl ReportBuilder {
    /// A favourable report from the default officer
    pub fn recommending(recommendation: Recommendation) -> Self {
        Self {
            report: VerificationReport::new(IdFixtures::officer_id(), recommendation),
        }
    }

    /// Sets the reporting field worker
    pub fn by(mut self, field_worker: UserId) -> Self {
        self.report.field_worker_id = field_worker;
        self
    }

    /// Fills both joint-verification signatures
    pub fn with_joint_signatures(mut self) -> Self {
        self.report.forest_officer_name = Some("D Kujur".to_string());
        self.report.forest_officer_signature = Some("sig:forest:9912".to_string());
        self.report.revenue_officer_name = Some("M Sahu".to_string());
        self.report.revenue_officer_signature = Some("sig:revenue:3321".to_string());
        self
    }

    /// Sets the boundary match score
    pub fn with_match_score(mut self, score: u8) -> Self {
        self.report.match_score = Some(score);
        self
    }

    /// Attaches site evidence references
    pub fn with_site_evidence(mut self) -> Self {
        self.report.site_photo_ref = Some("s3://evidence/site-1.jpg".to_string());
        self.report.satellite_snapshot_ref = Some("s3://evidence/sat-1.png".to_string());
        self
    }

    /// Marks the report as captured offline and not yet synced
    pub fn pending_sync(mut self) -> Self {
        self.report.sync_status = SyncStatus::Pending;
        self
    }

    /// Builds the report
    pub fn build(self) -> VerificationReport {
        self.report
    }
}

/// A quorate Gram Sabha resolution with the standard fixture values
pub fn gram_sabha_resolution() -> GramSabhaResolution {
    GramSabhaResolution {
        resolution_number: StringFixtures::resolution_number().to_string(),
        resolution_date: Utc::now(),
        quorum_met: true,
        frc_member_count: 11,
        approved_by: "Gram Sabha Bhilai Khurd".to_string(),
    }
}

/// An active scheme with the given rules, ready for eligibility tests
pub fn active_scheme(name: &str, rules: Vec<EligibilityRule>) -> Scheme {
    Scheme::new(
        name,
        "Livelihood",
        "Ministry of Tribal Affairs",
        "Test scheme",
    )
    .expect("scheme name is non-empty")
    .with_status(SchemeStatus::Active)
    .with_budget(dec!(100000))
    .with_rules(rules)
    .with_benefits(vec!["Direct benefit transfer"])
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn claim_builder_defaults_are_a_submitted_individual_claim() {
        let claim = ClaimBuilder::new().build();
        assert_eq!(claim.status, ClaimStatus::Submitted);
        assert_eq!(claim.claim_type, ClaimType::Individual);
        assert_eq!(claim.district, "Dindori");
        assert!(claim.claimant_id.is_some());
        assert_eq!(claim.status_history.len(), 1);
    }

    #[test]
    fn claim_builder_keeps_the_submission_entry_for_later_stages() {
        let claim = ClaimBuilder::new()
            .with_status(ClaimStatus::Approved)
            .build();
        assert_eq!(claim.status, ClaimStatus::Approved);
        assert_eq!(claim.status_history[0].status, ClaimStatus::Submitted);
    }

    #[test]
    fn community_builder_switches_type_and_extent() {
        let claim = ClaimBuilder::community().build();
        assert_eq!(claim.claim_type, ClaimType::Community);
        assert_eq!(claim.land_size_claimed, LandFixtures::community_forest());
    }

    #[test]
    fn report_builder_joint_signatures_complete_the_report() {
        let report = ReportBuilder::recommending(Recommendation::Approve)
            .with_joint_signatures()
            .build();
        assert!(report.is_joint_complete());
    }

    #[test]
    fn officer_builder_sets_role_and_district() {
        let officer = UserRecordBuilder::officer(Role::FieldWorker)
            .with_district("Mandla")
            .build();
        assert!(officer.roles.contains(&Role::FieldWorker));
        assert_eq!(officer.district.as_deref(), Some("Mandla"));
    }
}
