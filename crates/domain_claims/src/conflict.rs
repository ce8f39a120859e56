//! Overlap screening between claimed parcels
//!
//! Before a claim enters the workflow its geometry is screened against
//! other active claims in the same district. Screening is advisory for
//! minor overlaps and blocking for high ones; a blocked claim lands in
//! `ConflictDetected` instead of `Submitted` and can be corrected and
//! resubmitted.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use core_kernel::{ClaimId, Geometry};

use crate::claim::{Claim, ClaimStatus};

/// Screening compares against at most this many nearby parcels
pub const MAX_SCREENING_CANDIDATES: usize = 20;

/// Overlap below this ratio is treated as survey noise
const OVERLAP_EPSILON: f64 = 1e-9;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum ConflictSeverity {
    Low,
    Medium,
    High,
}

/// Severity bands over the fraction of the new parcel already claimed
pub fn severity_for_ratio(ratio: f64) -> ConflictSeverity {
    if ratio > 0.30 {
        ConflictSeverity::High
    } else if ratio >= 0.10 {
        ConflictSeverity::Medium
    } else {
        ConflictSeverity::Low
    }
}

/// One existing claim whose parcel overlaps the candidate
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ClaimConflict {
    pub claim_id: ClaimId,
    pub claimant_name: String,
    pub village: String,
    pub status: ClaimStatus,
    pub submitted_on: DateTime<Utc>,
    /// Fraction of the candidate parcel covered by this claim
    pub overlap_ratio: f64,
    pub severity: ConflictSeverity,
}

/// Screening verdict returned alongside create and update responses
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ConflictReport {
    /// False when any overlap is HIGH; the claim is then routed to
    /// `ConflictDetected` rather than rejected outright
    pub allowed: bool,
    pub conflicts: Vec<ClaimConflict>,
    /// Worst severity across all conflicts
    pub severity_summary: Option<ConflictSeverity>,
    pub message: String,
}

impl ConflictReport {
    pub fn clear() -> Self {
        Self {
            allowed: true,
            conflicts: Vec::new(),
            severity_summary: None,
            message: "No conflicts detected. Claim can proceed.".to_string(),
        }
    }
}

/// Finds active claims whose parcels overlap `candidate`
///
/// Candidates are prefiltered by bounding box and capped at the
/// [`MAX_SCREENING_CANDIDATES`] nearest by centroid, so screening cost is
/// bounded regardless of district size.
pub fn detect_overlaps(
    candidate: &Geometry,
    exclude: Option<ClaimId>,
    active: &[Claim],
) -> Vec<ClaimConflict> {
    let Some(candidate_bbox) = candidate.bounding_box() else {
        return Vec::new();
    };
    let candidate_centroid = candidate.centroid();

    let mut nearby: Vec<(&Claim, &Geometry, f64)> = active
        .iter()
        .filter(|claim| Some(claim.id) != exclude)
        .filter(|claim| claim.status.is_screening_active())
        .filter_map(|claim| claim.geometry.as_ref().map(|g| (claim, g)))
        .filter(|(_, geometry)| {
            geometry
                .bounding_box()
                .map(|bbox| bbox.intersects(&candidate_bbox))
                .unwrap_or(false)
        })
        .map(|(claim, geometry)| {
            let distance = match (candidate_centroid, geometry.centroid()) {
                (Some(a), Some(b)) => {
                    let dx = a.lon() - b.lon();
                    let dy = a.lat() - b.lat();
                    dx * dx + dy * dy
                }
                _ => f64::MAX,
            };
            (claim, geometry, distance)
        })
        .collect();

    nearby.sort_by(|a, b| a.2.total_cmp(&b.2));
    nearby.truncate(MAX_SCREENING_CANDIDATES);

    let mut conflicts: Vec<ClaimConflict> = nearby
        .into_iter()
        .filter_map(|(claim, geometry, _)| {
            // Fraction of the candidate parcel that this claim covers
            let ratio = geometry.overlap_ratio(candidate);
            if ratio <= OVERLAP_EPSILON {
                return None;
            }
            Some(ClaimConflict {
                claim_id: claim.id,
                claimant_name: claim.claimant_name.clone(),
                village: claim.village.clone(),
                status: claim.status,
                submitted_on: claim.submitted_on(),
                overlap_ratio: ratio,
                severity: severity_for_ratio(ratio),
            })
        })
        .collect();

    conflicts.sort_by(|a, b| b.overlap_ratio.total_cmp(&a.overlap_ratio));
    conflicts
}

/// Full screening verdict for a parcel about to enter the workflow
pub fn validate_submission(
    candidate: &Geometry,
    exclude: Option<ClaimId>,
    active: &[Claim],
) -> ConflictReport {
    let conflicts = detect_overlaps(candidate, exclude, active);
    if conflicts.is_empty() {
        return ConflictReport::clear();
    }

    let severity_summary = conflicts.iter().map(|c| c.severity).max();
    let has_high = severity_summary == Some(ConflictSeverity::High);
    let count = conflicts.len();
    let message = if has_high {
        format!("High overlap detected with {count} existing claim(s). Manual review required.")
    } else {
        format!("Minor overlap detected with {count} existing claim(s). Proceeding with caution.")
    };

    ConflictReport {
        allowed: !has_high,
        conflicts,
        severity_summary,
        message,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::claim::{ClaimType, NewClaim};
    use core_kernel::{GeoPoint, UserId};
    use rust_decimal_macros::dec;

    fn square(min_lon: f64, min_lat: f64, size: f64) -> Geometry {
        Geometry::polygon(vec![
            GeoPoint::new(min_lon, min_lat),
            GeoPoint::new(min_lon + size, min_lat),
            GeoPoint::new(min_lon + size, min_lat + size),
            GeoPoint::new(min_lon, min_lat + size),
            GeoPoint::new(min_lon, min_lat),
        ])
    }

    fn active_claim(geometry: Geometry, status: ClaimStatus) -> Claim {
        let details = NewClaim {
            claimant_name: "Phoolmati Bai".to_string(),
            claimant_id: Some(UserId::new()),
            claim_type: ClaimType::Individual,
            village: "Samnapur".to_string(),
            district: "Dindori".to_string(),
            state: "Madhya Pradesh".to_string(),
            land_size_claimed: dec!(2),
            survey_number: None,
            reason: None,
            geometry: Some(geometry),
            village_centroid_fallback: false,
            assigned_to: None,
        };
        let mut claim =
            Claim::create(details, UserId::new(), ClaimStatus::Submitted, None).unwrap();
        if status != ClaimStatus::Submitted {
            claim.status = status;
        }
        claim
    }

    #[test]
    fn test_disjoint_parcels_do_not_conflict() {
        let existing = active_claim(square(80.0, 22.0, 0.01), ClaimStatus::Submitted);
        let report = validate_submission(&square(81.0, 23.0, 0.01), None, &[existing]);

        assert!(report.allowed);
        assert!(report.conflicts.is_empty());
        assert_eq!(report.message, "No conflicts detected. Claim can proceed.");
    }

    #[test]
    fn test_small_overlap_is_advisory() {
        // 5% of the candidate square is covered
        let existing = active_claim(square(80.0, 22.0, 0.10), ClaimStatus::Submitted);
        let candidate = square(80.095, 22.0, 0.10);
        let report = validate_submission(&candidate, None, &[existing]);

        assert!(report.allowed);
        assert_eq!(report.conflicts.len(), 1);
        assert_eq!(report.conflicts[0].severity, ConflictSeverity::Low);
        assert!(report.message.starts_with("Minor overlap"));
    }

    #[test]
    fn test_half_overlap_blocks_submission() {
        let existing = active_claim(square(80.0, 22.0, 0.10), ClaimStatus::Verified);
        let candidate = square(80.05, 22.0, 0.10);
        let report = validate_submission(&candidate, None, &[existing]);

        assert!(!report.allowed);
        assert_eq!(report.severity_summary, Some(ConflictSeverity::High));
        assert!(report.message.contains("Manual review required"));
    }

    #[test]
    fn test_rejected_and_draft_claims_are_skipped() {
        let candidate = square(80.0, 22.0, 0.10);
        let rejected = active_claim(square(80.0, 22.0, 0.10), ClaimStatus::Rejected);
        let draft = active_claim(square(80.0, 22.0, 0.10), ClaimStatus::Draft);

        let report = validate_submission(&candidate, None, &[rejected, draft]);
        assert!(report.allowed);
        assert!(report.conflicts.is_empty());
    }

    #[test]
    fn test_own_claim_is_excluded_on_resubmission() {
        let existing = active_claim(square(80.0, 22.0, 0.10), ClaimStatus::Submitted);
        let own_id = existing.id;
        let report = validate_submission(&square(80.0, 22.0, 0.10), Some(own_id), &[existing]);

        assert!(report.allowed);
        assert!(report.conflicts.is_empty());
    }

    #[test]
    fn test_point_fallback_inside_parcel_is_high() {
        let existing = active_claim(square(80.0, 22.0, 0.10), ClaimStatus::Submitted);
        let candidate = Geometry::point(80.05, 22.05);
        let conflicts = detect_overlaps(&candidate, None, &[existing]);

        assert_eq!(conflicts.len(), 1);
        assert_eq!(conflicts[0].overlap_ratio, 1.0);
        assert_eq!(conflicts[0].severity, ConflictSeverity::High);
    }

    #[test]
    fn test_candidate_cap_takes_nearest() {
        let candidate = square(80.0, 22.0, 0.10);
        // 30 overlapping parcels, progressively further away but all
        // intersecting; only the nearest 20 should be inspected
        let active: Vec<Claim> = (0..30)
            .map(|i| {
                let offset = i as f64 * 0.002;
                active_claim(square(80.0 + offset, 22.0, 0.10), ClaimStatus::Submitted)
            })
            .collect();

        let conflicts = detect_overlaps(&candidate, None, &active);
        assert_eq!(conflicts.len(), MAX_SCREENING_CANDIDATES);
    }

    #[test]
    fn test_conflicts_sorted_by_overlap_desc() {
        let candidate = square(80.0, 22.0, 0.10);
        let heavy = active_claim(square(80.01, 22.0, 0.10), ClaimStatus::Submitted);
        let light = active_claim(square(80.08, 22.0, 0.10), ClaimStatus::Submitted);

        let conflicts = detect_overlaps(&candidate, None, &[light, heavy]);
        assert_eq!(conflicts.len(), 2);
        assert!(conflicts[0].overlap_ratio > conflicts[1].overlap_ratio);
    }
}
