//! Forest Rights Claims Domain
//!
//! This crate implements the claim lifecycle under the Forest Rights Act:
//! intake, conflict screening, Gram Sabha resolution, field and joint
//! verification, committee scrutiny, approval, and title issuance.
//!
//! # Claim Lifecycle
//!
//! ```text
//! Draft -> Submitted -> Gram Sabha Approved -> Field Verified
//!       -> Joint Verified -> SDLC Scrutiny -> Verified -> Approved
//!       -> Title Issued
//! ```
//!
//! Rejection is possible at every stage, remand from the verification
//! stages onward, and a blocking boundary overlap parks intake in
//! `Conflict_Detected` until the parcel is corrected.

pub mod adapters;
pub mod anomaly;
pub mod assets;
pub mod claim;
pub mod conflict;
pub mod document;
pub mod error;
pub mod events;
pub mod notifications;
pub mod permissions;
pub mod ports;
pub mod risk;
pub mod service;
pub mod sla;
pub mod verification;

pub use assets::{AssetSummary, HeuristicAssetAnalyzer, VeracityAssessment, VeracityLevel};
pub use claim::{
    Claim, ClaimPatch, ClaimStatus, ClaimType, GramSabhaResolution, NewClaim, StatusChange,
    TitleDeed,
};
pub use conflict::{ClaimConflict, ConflictReport, ConflictSeverity};
pub use document::{Document, DocumentKind, ExtractionResult, KeywordExtractor};
pub use error::ClaimError;
pub use events::ClaimEvent;
pub use ports::{
    AssetAnalyzer, ClaimQuery, ClaimStore, ClaimStoreExt, DocumentExtractor, Notifier,
    UserDirectory, UserRecord,
};
pub use risk::{RiskAssessment, RiskFlag, RiskLevel};
pub use service::{ClaimPage, ClaimsService, DocumentUpload, RiskReview, ScreenedClaim};
pub use sla::{SlaMonitor, SlaReport, SlaState, SlaSweepOutcome};
pub use verification::{Recommendation, SyncStatus, VerificationReport};
