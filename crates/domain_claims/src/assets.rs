//! Parcel asset summaries and veracity scoring
//!
//! The asset analyzer estimates land cover inside a claimed parcel. The
//! estimate feeds the risk engine (a parcel with no cultivation signal is
//! suspicious) and the veracity check that compares claimed area against
//! observed cover.

use serde::{Deserialize, Serialize};
use std::fmt;

use core_kernel::{Geometry, PortError};
use rust_decimal::prelude::ToPrimitive;

use crate::claim::Claim;
use crate::ports::AssetAnalyzer;

/// Approximate conversion from planar square degrees to hectares at the
/// latitudes the system operates in (1 degree ~ 111.32 km)
const SQ_DEG_TO_HA: f64 = 1_239_214.0;

/// Land-cover estimate for one parcel
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AssetSummary {
    pub water_area_ha: f64,
    pub farmland_ha: f64,
    pub forest_ha: f64,
    pub homestead_count: u32,
    /// Which analyzer produced the estimate
    pub model_version: String,
}

impl AssetSummary {
    pub fn total_cover_ha(&self) -> f64 {
        self.water_area_ha + self.farmland_ha + self.forest_ha
    }

    /// True when the parcel shows neither cultivation nor habitation
    pub fn has_no_signal(&self) -> bool {
        self.farmland_ha < 0.05 && self.forest_ha < 0.05 && self.homestead_count == 0
    }
}

/// Deterministic analyzer used when no imagery service is configured
///
/// Splits the parcel area into fixed cover fractions so that downstream
/// scoring has a stable signal to work with.
#[derive(Debug, Default)]
pub struct HeuristicAssetAnalyzer;

impl HeuristicAssetAnalyzer {
    pub const MODEL_VERSION: &'static str = "heuristic-v1";

    pub fn new() -> Self {
        Self
    }

    pub fn summarize(&self, geometry: &Geometry) -> AssetSummary {
        let area_ha = geometry.area() * SQ_DEG_TO_HA;
        if area_ha < 0.01 {
            // Point fallbacks and degenerate polygons carry no cover signal
            return AssetSummary {
                water_area_ha: 0.0,
                farmland_ha: 0.0,
                forest_ha: 0.0,
                homestead_count: 0,
                model_version: Self::MODEL_VERSION.to_string(),
            };
        }
        AssetSummary {
            water_area_ha: round2(area_ha * 0.05),
            farmland_ha: round2(area_ha * 0.55),
            forest_ha: round2(area_ha * 0.30),
            homestead_count: (area_ha / 2.0).round().max(1.0) as u32,
            model_version: Self::MODEL_VERSION.to_string(),
        }
    }
}

fn round2(value: f64) -> f64 {
    (value * 100.0).round() / 100.0
}

#[async_trait::async_trait]
impl AssetAnalyzer for HeuristicAssetAnalyzer {
    async fn analyze(&self, geometry: &Geometry) -> Result<AssetSummary, PortError> {
        Ok(self.summarize(geometry))
    }
}

impl core_kernel::DomainPort for HeuristicAssetAnalyzer {}

#[async_trait::async_trait]
impl core_kernel::HealthCheckable for HeuristicAssetAnalyzer {
    async fn health_check(&self) -> core_kernel::HealthCheckResult {
        core_kernel::HealthCheckResult::healthy("heuristic_asset_analyzer")
    }
}

/// Confidence bands for the veracity check
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum VeracityLevel {
    Low,
    Medium,
    High,
}

impl fmt::Display for VeracityLevel {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let s = match self {
            VeracityLevel::Low => "LOW",
            VeracityLevel::Medium => "MEDIUM",
            VeracityLevel::High => "HIGH",
        };
        f.write_str(s)
    }
}

/// How well the claimed parcel agrees with observed land cover
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VeracityAssessment {
    /// 0..=100, higher means more credible
    pub score: u8,
    pub level: VeracityLevel,
    pub warnings: Vec<String>,
}

/// Scores the agreement between a claim and its asset summary
///
/// Starts at full credibility and deducts for each mismatch between what
/// the claimant states and what the parcel shows.
pub fn score_veracity(claim: &Claim, summary: &AssetSummary) -> VeracityAssessment {
    let mut score: i32 = 100;
    let mut warnings = Vec::new();

    let claimed_ha = claim.land_size_claimed.to_f64().unwrap_or(0.0);
    let observed_ha = summary.total_cover_ha();

    if claimed_ha > 0.1 && observed_ha > 0.0 && claimed_ha > observed_ha * 1.5 {
        score -= 40;
        warnings.push(format!(
            "Claimed area ({claimed_ha:.2} ha) substantially exceeds observed land cover ({observed_ha:.2} ha)."
        ));
    }

    if observed_ha > 0.0 && summary.water_area_ha > observed_ha * 0.5 {
        score -= 30;
        warnings.push("Parcel is predominantly water body.".to_string());
    }

    if summary.has_no_signal() {
        score -= 30;
        warnings.push("No cultivation or habitation signal on the parcel.".to_string());
    }

    let score = score.clamp(0, 100) as u8;
    let level = if score >= 80 {
        VeracityLevel::High
    } else if score >= 50 {
        VeracityLevel::Medium
    } else {
        VeracityLevel::Low
    };

    VeracityAssessment {
        score,
        level,
        warnings,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claim::{Claim, ClaimStatus, ClaimType, NewClaim};
    use core_kernel::{GeoPoint, UserId};
    use rust_decimal_macros::dec;

    fn square(size_deg: f64) -> Geometry {
        Geometry::polygon(vec![
            GeoPoint::new(80.0, 22.0),
            GeoPoint::new(80.0 + size_deg, 22.0),
            GeoPoint::new(80.0 + size_deg, 22.0 + size_deg),
            GeoPoint::new(80.0, 22.0 + size_deg),
            GeoPoint::new(80.0, 22.0),
        ])
    }

    fn claim_with_area(ha: rust_decimal::Decimal) -> Claim {
        let details = NewClaim {
            claimant_name: "Sunita Baiga".to_string(),
            claimant_id: Some(UserId::new()),
            claim_type: ClaimType::Individual,
            village: "Karanjia".to_string(),
            district: "Dindori".to_string(),
            state: "Madhya Pradesh".to_string(),
            land_size_claimed: ha,
            survey_number: None,
            reason: None,
            geometry: None,
            village_centroid_fallback: false,
            assigned_to: None,
        };
        Claim::create(details, UserId::new(), ClaimStatus::Draft, None).unwrap()
    }

    #[test]
    fn test_heuristic_summary_is_deterministic() {
        let analyzer = HeuristicAssetAnalyzer::new();
        let geometry = square(0.002);
        let a = analyzer.summarize(&geometry);
        let b = analyzer.summarize(&geometry);
        assert_eq!(a, b);
        assert_eq!(a.model_version, "heuristic-v1");
        assert!(a.farmland_ha > 0.0);
    }

    #[test]
    fn test_point_geometry_has_no_signal() {
        let analyzer = HeuristicAssetAnalyzer::new();
        let summary = analyzer.summarize(&Geometry::point(80.0, 22.0));
        assert!(summary.has_no_signal());
        assert_eq!(summary.homestead_count, 0);
    }

    #[test]
    fn test_consistent_claim_scores_high() {
        let claim = claim_with_area(dec!(2.0));
        let summary = AssetSummary {
            water_area_ha: 0.1,
            farmland_ha: 1.5,
            forest_ha: 0.6,
            homestead_count: 1,
            model_version: "test".to_string(),
        };
        let assessment = score_veracity(&claim, &summary);
        assert_eq!(assessment.level, VeracityLevel::High);
        assert!(assessment.warnings.is_empty());
    }

    #[test]
    fn test_overclaimed_area_deducts() {
        let claim = claim_with_area(dec!(4.0));
        let summary = AssetSummary {
            water_area_ha: 0.0,
            farmland_ha: 1.0,
            forest_ha: 0.2,
            homestead_count: 1,
            model_version: "test".to_string(),
        };
        let assessment = score_veracity(&claim, &summary);
        assert!(assessment.score <= 60);
        assert!(!assessment.warnings.is_empty());
    }

    #[test]
    fn test_empty_parcel_is_low_veracity() {
        let claim = claim_with_area(dec!(3.0));
        let summary = AssetSummary {
            water_area_ha: 0.0,
            farmland_ha: 0.0,
            forest_ha: 0.0,
            homestead_count: 0,
            model_version: "test".to_string(),
        };
        let assessment = score_veracity(&claim, &summary);
        assert_eq!(assessment.level, VeracityLevel::Low);
    }
}
