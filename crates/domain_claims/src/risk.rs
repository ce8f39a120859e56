//! Claim risk scoring
//!
//! Additive rule-based scoring over the claim itself: statutory area limit,
//! documentary evidence, and the asset analyzer's cover signal. The score
//! is advisory and never blocks a workflow action.

use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::claim::Claim;

/// Ceiling for individual forest rights titles under the 2006 Act
pub const STATUTORY_LIMIT_HA: Decimal = dec!(4);

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum RiskLevel {
    Low,
    Medium,
    High,
    Critical,
}

impl fmt::Display for RiskLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            RiskLevel::Low => "LOW",
            RiskLevel::Medium => "MEDIUM",
            RiskLevel::High => "HIGH",
            RiskLevel::Critical => "CRITICAL",
        };
        f.write_str(s)
    }
}

/// One triggered rule with its band and operator-facing message
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskFlag {
    pub level: RiskLevel,
    pub message: String,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RiskAssessment {
    /// Additive score capped at 100
    pub score: u8,
    pub level: RiskLevel,
    pub flags: Vec<RiskFlag>,
}

/// Maps an additive score onto a level band
pub fn level_for_score(score: u8) -> RiskLevel {
    if score > 70 {
        RiskLevel::Critical
    } else if score > 40 {
        RiskLevel::High
    } else if score >= 20 {
        RiskLevel::Medium
    } else {
        RiskLevel::Low
    }
}

/// Scores a claim against the rule set
pub fn assess_claim(claim: &Claim) -> RiskAssessment {
    let mut score: u32 = 0;
    let mut flags = Vec::new();

    let land = claim.land_size_claimed;
    if land > STATUTORY_LIMIT_HA {
        score += 100;
        flags.push(RiskFlag {
            level: RiskLevel::Critical,
            message: format!(
                "Claimed area ({land} ha) exceeds the statutory limit of 4 hectares."
            ),
        });
    } else if land > dec!(3.5) {
        score += 60;
        flags.push(RiskFlag {
            level: RiskLevel::High,
            message: format!(
                "Claimed area ({land} ha) is close to the statutory limit of 4 hectares."
            ),
        });
    }

    match claim.documents.len() {
        0 => {
            score += 50;
            flags.push(RiskFlag {
                level: RiskLevel::High,
                message: "No supporting documents uploaded.".to_string(),
            });
        }
        1 => {
            score += 20;
            flags.push(RiskFlag {
                level: RiskLevel::Medium,
                message: "Weak evidence: only one supporting document provided.".to_string(),
            });
        }
        _ => {}
    }

    if let Some(summary) = &claim.asset_summary {
        if summary.has_no_signal() {
            score += 30;
            flags.push(RiskFlag {
                level: RiskLevel::Medium,
                message: "Satellite analysis shows no cultivation or habitation on the parcel."
                    .to_string(),
            });
        }
    }

    let score = score.min(100) as u8;
    RiskAssessment {
        score,
        level: level_for_score(score),
        flags,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::assets::AssetSummary;
    use crate::claim::{ClaimStatus, ClaimType, NewClaim};
    use crate::document::{Document, DocumentKind};
    use core_kernel::UserId;

    fn base_claim(land_ha: Decimal) -> Claim {
        let details = NewClaim {
            claimant_name: "Budhram Markam".to_string(),
            claimant_id: Some(UserId::new()),
            claim_type: ClaimType::Individual,
            village: "Bajag".to_string(),
            district: "Dindori".to_string(),
            state: "Madhya Pradesh".to_string(),
            land_size_claimed: land_ha,
            survey_number: Some("118/4".to_string()),
            reason: None,
            geometry: None,
            village_centroid_fallback: false,
            assigned_to: None,
        };
        Claim::create(details, UserId::new(), ClaimStatus::Submitted, None).unwrap()
    }

    fn with_documents(mut claim: Claim, count: usize) -> Claim {
        for i in 0..count {
            let sha = format!("{:064x}", i + 1);
            let doc = Document::new(
                format!("evidence-{i}.pdf"),
                DocumentKind::Other,
                format!("s3://docs/evidence-{i}.pdf"),
                sha,
                UserId::new(),
            )
            .unwrap();
            claim.attach_document(doc).unwrap();
        }
        claim
    }

    #[test]
    fn test_over_limit_area_is_critical() {
        let claim = with_documents(base_claim(dec!(4.5)), 2);
        let assessment = assess_claim(&claim);

        assert_eq!(assessment.score, 100);
        assert_eq!(assessment.level, RiskLevel::Critical);
        assert!(assessment.flags[0]
            .message
            .contains("exceeds the statutory limit"));
    }

    #[test]
    fn test_exactly_four_hectares_is_not_over_limit() {
        let claim = with_documents(base_claim(dec!(4)), 2);
        let assessment = assess_claim(&claim);
        assert!(assessment
            .flags
            .iter()
            .all(|f| f.level != RiskLevel::Critical));
        // 3.5 < 4 <= 4 still trips the near-limit rule
        assert_eq!(assessment.score, 60);
        assert_eq!(assessment.level, RiskLevel::High);
    }

    #[test]
    fn test_no_documents_scores_fifty() {
        let claim = base_claim(dec!(2));
        let assessment = assess_claim(&claim);

        assert_eq!(assessment.score, 50);
        assert_eq!(assessment.level, RiskLevel::High);
    }

    #[test]
    fn test_single_document_is_weak_evidence() {
        let claim = with_documents(base_claim(dec!(2)), 1);
        let assessment = assess_claim(&claim);

        assert_eq!(assessment.score, 20);
        assert_eq!(assessment.level, RiskLevel::Medium);
    }

    #[test]
    fn test_well_documented_small_claim_is_low_risk() {
        let claim = with_documents(base_claim(dec!(1.2)), 3);
        let assessment = assess_claim(&claim);

        assert_eq!(assessment.score, 0);
        assert_eq!(assessment.level, RiskLevel::Low);
        assert!(assessment.flags.is_empty());
    }

    #[test]
    fn test_empty_parcel_signal_adds_thirty() {
        let mut claim = with_documents(base_claim(dec!(1.2)), 3);
        claim.asset_summary = Some(AssetSummary {
            water_area_ha: 0.0,
            farmland_ha: 0.0,
            forest_ha: 0.0,
            homestead_count: 0,
            model_version: "test".to_string(),
        });
        let assessment = assess_claim(&claim);

        assert_eq!(assessment.score, 30);
        assert_eq!(assessment.level, RiskLevel::Medium);
    }

    #[test]
    fn test_score_caps_at_one_hundred() {
        // Over limit (100) + no documents (50) + empty parcel (30)
        let mut claim = base_claim(dec!(5));
        claim.asset_summary = Some(AssetSummary {
            water_area_ha: 0.0,
            farmland_ha: 0.0,
            forest_ha: 0.0,
            homestead_count: 0,
            model_version: "test".to_string(),
        });
        let assessment = assess_claim(&claim);

        assert_eq!(assessment.score, 100);
        assert_eq!(assessment.flags.len(), 3);
    }

    #[test]
    fn test_level_band_edges() {
        assert_eq!(level_for_score(0), RiskLevel::Low);
        assert_eq!(level_for_score(19), RiskLevel::Low);
        assert_eq!(level_for_score(20), RiskLevel::Medium);
        assert_eq!(level_for_score(40), RiskLevel::Medium);
        assert_eq!(level_for_score(41), RiskLevel::High);
        assert_eq!(level_for_score(70), RiskLevel::High);
        assert_eq!(level_for_score(71), RiskLevel::Critical);
        assert_eq!(level_for_score(100), RiskLevel::Critical);
    }
}
