//! Pre-built Test Fixtures
//!
//! Provides ready-to-use test data for common entities across the
//! land-claims system. These fixtures are designed to be consistent and
//! predictable for unit tests.

use chrono::{DateTime, Duration, TimeZone, Utc};
use core_kernel::{ClaimId, DocumentId, GeoPoint, Geometry, SchemeId, UserId};
use once_cell::sync::Lazy;
use rust_decimal::Decimal;
use rust_decimal_macros::dec;
use uuid::Uuid;

/// Districts with active forest-rights claims, used by fixtures and
/// generators alike
pub static DISTRICTS: Lazy<Vec<&'static str>> =
    Lazy::new(|| vec!["Dindori", "Mandla", "Balaghat", "Shahdol", "Umaria"]);

/// Villages paired with the districts above
pub static VILLAGES: Lazy<Vec<&'static str>> = Lazy::new(|| {
    vec![
        "Bhilai Khurd",
        "Bamhni",
        "Karanjia",
        "Gorakhpur",
        "Silpidi",
        "Chada",
    ]
});

/// Fixture for temporal test data
pub struct TemporalFixtures;

impl TemporalFixtures {
    /// Standard filing timestamp (Jan 10, 2025)
    pub fn filing_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 1, 10, 9, 30, 0).unwrap()
    }

    /// Gram Sabha resolution timestamp, a month after filing
    pub fn resolution_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 2, 12, 11, 0, 0).unwrap()
    }

    /// Field verification timestamp
    pub fn field_visit_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 3, 5, 14, 15, 0).unwrap()
    }

    /// District-level decision timestamp
    pub fn decision_time() -> DateTime<Utc> {
        Utc.with_ymd_and_hms(2025, 5, 20, 16, 45, 0).unwrap()
    }

    /// A timestamp `days` before now, for staleness and deadline tests
    pub fn days_ago(days: i64) -> DateTime<Utc> {
        Utc::now() - Duration::days(days)
    }
}

/// Fixture for identifier test data
pub struct IdFixtures;

impl IdFixtures {
    /// Creates a deterministic claim ID for testing
    pub fn claim_id() -> ClaimId {
        ClaimId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440001").unwrap())
    }

    /// Creates a deterministic claimant ID for testing
    pub fn claimant_id() -> UserId {
        UserId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440002").unwrap())
    }

    /// Creates a deterministic officer ID for testing
    pub fn officer_id() -> UserId {
        UserId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440003").unwrap())
    }

    /// Creates a deterministic scheme ID for testing
    pub fn scheme_id() -> SchemeId {
        SchemeId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440004").unwrap())
    }

    /// Creates a deterministic document ID for testing
    pub fn document_id() -> DocumentId {
        DocumentId::from_uuid(Uuid::parse_str("550e8400-e29b-41d4-a716-446655440005").unwrap())
    }
}

/// Fixture for claimed land extents, in hectares
pub struct LandFixtures;

impl LandFixtures {
    /// A homestead-scale plot
    pub fn tiny_plot() -> Decimal {
        dec!(0.25)
    }

    /// Typical individual cultivation holding
    pub fn typical_holding() -> Decimal {
        dec!(2.5)
    }

    /// The statutory ceiling for individual claims
    pub fn statutory_limit() -> Decimal {
        dec!(4)
    }

    /// Above the statutory ceiling; should raise risk flags
    pub fn oversized_holding() -> Decimal {
        dec!(6.5)
    }

    /// Community forest resource extent
    pub fn community_forest() -> Decimal {
        dec!(120)
    }
}

/// Fixture for parcel geometries around the Dindori test area
///
/// All coordinates sit in eastern Madhya Pradesh. The three parcels are
/// arranged so that `overlapping_parcel` intersects `dindori_parcel` and
/// `distant_parcel` does not.
pub struct GeoFixtures;

impl GeoFixtures {
    /// A closed square parcel near Bhilai Khurd
    pub fn dindori_parcel() -> Geometry {
        Geometry::polygon(vec![
            GeoPoint::new(81.080, 22.940),
            GeoPoint::new(81.090, 22.940),
            GeoPoint::new(81.090, 22.950),
            GeoPoint::new(81.080, 22.950),
            GeoPoint::new(81.080, 22.940),
        ])
    }

    /// A parcel shifted half a side east, overlapping [`Self::dindori_parcel`]
    pub fn overlapping_parcel() -> Geometry {
        Geometry::polygon(vec![
            GeoPoint::new(81.085, 22.940),
            GeoPoint::new(81.095, 22.940),
            GeoPoint::new(81.095, 22.950),
            GeoPoint::new(81.085, 22.950),
            GeoPoint::new(81.085, 22.940),
        ])
    }

    /// A parcel two villages away, disjoint from the others
    pub fn distant_parcel() -> Geometry {
        Geometry::polygon(vec![
            GeoPoint::new(81.200, 23.100),
            GeoPoint::new(81.210, 23.100),
            GeoPoint::new(81.210, 23.110),
            GeoPoint::new(81.200, 23.110),
            GeoPoint::new(81.200, 23.100),
        ])
    }

    /// Village centroid fallback position
    pub fn village_centroid() -> Geometry {
        Geometry::point(81.085, 22.945)
    }
}

/// Fixture for string test data
pub struct StringFixtures;

impl StringFixtures {
    /// Standard state
    pub fn state() -> &'static str {
        "Madhya Pradesh"
    }

    /// Standard district
    pub fn district() -> &'static str {
        "Dindori"
    }

    /// Standard village
    pub fn village() -> &'static str {
        "Bhilai Khurd"
    }

    /// Standard survey number
    pub fn survey_number() -> &'static str {
        "55/3"
    }

    /// Standard claimant name
    pub fn claimant_name() -> &'static str {
        "Somari Bai"
    }

    /// Standard field officer name
    pub fn officer_name() -> &'static str {
        "S Tirkey"
    }

    /// Standard Gram Sabha resolution number
    pub fn resolution_number() -> &'static str {
        "GS/2025/041"
    }

    /// Standard uploaded-document storage reference
    pub fn storage_ref() -> &'static str {
        "s3://claims-evidence/CLM/patta-scan.pdf"
    }

    /// A well-formed (but fabricated) SHA-256 digest
    pub fn sha256() -> &'static str {
        "9f86d081884c7d659a2feaa0c55ad015a3bf4f1b2b0b822cd15d6c15b0f00a08"
    }
}
