//! Fraud-pattern detection over recent claim activity
//!
//! The scan is a pure function over a window of claims; it flags patterns
//! for Super Admin review and never blocks or mutates anything.

use chrono::{DateTime, Duration, Utc};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;

use core_kernel::{ClaimId, UserId};

use crate::claim::{Claim, ClaimStatus};

/// How far back the scan looks
pub const SCAN_WINDOW_HOURS: i64 = 24;

/// An officer moving more claims than this through verification stages in
/// one window is flagged
pub const VELOCITY_THRESHOLD: usize = 10;

/// More rejections than this in one district in one window is flagged
pub const BULK_REJECTION_THRESHOLD: usize = 5;

/// Stage movements that count towards officer velocity
const VELOCITY_STATUSES: &[ClaimStatus] = &[
    ClaimStatus::GramSabhaApproved,
    ClaimStatus::FieldVerified,
    ClaimStatus::JointVerified,
    ClaimStatus::SdlcScrutiny,
    ClaimStatus::Verified,
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum AnomalyKind {
    /// One officer pushing an implausible number of claims through
    /// verification stages
    HighVelocity,
    /// Many rejections concentrated in one district
    BulkRejection,
    /// The same survey number claimed more than once in the same village
    DuplicateSurvey,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Anomaly {
    pub kind: AnomalyKind,
    /// Who or what the pattern centers on: an officer id, a district, or
    /// a survey/village pair
    pub subject: String,
    pub detail: String,
    pub claim_ids: Vec<ClaimId>,
    pub detected_at: DateTime<Utc>,
}

/// Scans a slice of recently-touched claims for suspicious patterns
///
/// Callers load claims updated within the window; history entries outside
/// it are ignored here, so passing a wider slice is harmless.
pub fn scan(claims: &[Claim], now: DateTime<Utc>) -> Vec<Anomaly> {
    let window_start = now - Duration::hours(SCAN_WINDOW_HOURS);
    let mut anomalies = Vec::new();

    anomalies.extend(scan_velocity(claims, window_start, now));
    anomalies.extend(scan_bulk_rejections(claims, window_start, now));
    anomalies.extend(scan_duplicate_surveys(claims, now));
    anomalies
}

fn scan_velocity(
    claims: &[Claim],
    window_start: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Vec<Anomaly> {
    let mut per_officer: HashMap<UserId, Vec<ClaimId>> = HashMap::new();

    for claim in claims {
        for entry in &claim.status_history {
            if entry.changed_at >= window_start && VELOCITY_STATUSES.contains(&entry.status) {
                per_officer.entry(entry.changed_by).or_default().push(claim.id);
            }
        }
    }

    per_officer
        .into_iter()
        .filter(|(_, touched)| touched.len() > VELOCITY_THRESHOLD)
        .map(|(officer, mut claim_ids)| {
            let count = claim_ids.len();
            claim_ids.sort();
            claim_ids.dedup();
            Anomaly {
                kind: AnomalyKind::HighVelocity,
                subject: officer.to_string(),
                detail: format!(
                    "Officer advanced claims through verification stages {count} times in \
                     {SCAN_WINDOW_HOURS}h, above the threshold of {VELOCITY_THRESHOLD}."
                ),
                claim_ids,
                detected_at: now,
            }
        })
        .collect()
}

fn scan_bulk_rejections(
    claims: &[Claim],
    window_start: DateTime<Utc>,
    now: DateTime<Utc>,
) -> Vec<Anomaly> {
    let mut per_district: HashMap<&str, Vec<ClaimId>> = HashMap::new();

    for claim in claims {
        let rejected_in_window = claim
            .status_history
            .iter()
            .any(|entry| entry.status == ClaimStatus::Rejected && entry.changed_at >= window_start);
        if rejected_in_window {
            per_district
                .entry(claim.district.as_str())
                .or_default()
                .push(claim.id);
        }
    }

    per_district
        .into_iter()
        .filter(|(_, rejected)| rejected.len() > BULK_REJECTION_THRESHOLD)
        .map(|(district, claim_ids)| Anomaly {
            kind: AnomalyKind::BulkRejection,
            subject: district.to_string(),
            detail: format!(
                "{} claims rejected in district {district} within {SCAN_WINDOW_HOURS}h, above \
                 the threshold of {BULK_REJECTION_THRESHOLD}.",
                claim_ids.len()
            ),
            claim_ids,
            detected_at: now,
        })
        .collect()
}

fn scan_duplicate_surveys(claims: &[Claim], now: DateTime<Utc>) -> Vec<Anomaly> {
    let mut per_parcel: HashMap<(String, String), Vec<ClaimId>> = HashMap::new();

    for claim in claims {
        if !claim.status.is_screening_active() {
            continue;
        }
        let Some(survey) = claim.survey_number.as_deref() else {
            continue;
        };
        let key = (
            survey.trim().to_lowercase(),
            claim.village.trim().to_lowercase(),
        );
        per_parcel.entry(key).or_default().push(claim.id);
    }

    per_parcel
        .into_iter()
        .filter(|(_, ids)| ids.len() >= 2)
        .map(|((survey, village), claim_ids)| Anomaly {
            kind: AnomalyKind::DuplicateSurvey,
            subject: format!("{survey} / {village}"),
            detail: format!(
                "Survey number {survey} in village {village} appears on {} active claims.",
                claim_ids.len()
            ),
            claim_ids,
            detected_at: now,
        })
        .collect()
}
