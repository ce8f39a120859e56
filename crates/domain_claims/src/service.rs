//! Claim workflow orchestration
//!
//! `ClaimsService` is the single entry point for every workflow action. Each
//! operation runs the same gauntlet: role check, then ownership, then the
//! status guard, then one atomic read-modify-write against the store.
//!
//! # Concurrency
//!
//! Writes go through [`ClaimStore::save_claim`] with the version the claim
//! was loaded at. A lost race surfaces as a conflict; the service reloads
//! the winner's state and re-applies its mutation exactly once. If the
//! mutation's own pre-condition no longer holds on the fresh state, the
//! caller gets a state error naming the status it actually observed.
//!
//! # Collaborators
//!
//! Asset analysis and document extraction are best-effort: each call is
//! wrapped in a bounded timeout and degrades to a placeholder instead of
//! failing the workflow. Notifications are fire-and-forget on a spawned
//! task.

use std::sync::Arc;
use std::time::Duration;

use chrono::Utc;
use tracing::{info, instrument, warn};

use core_kernel::{Actor, ClaimId, Geometry};

use crate::anomaly::{self, Anomaly, SCAN_WINDOW_HOURS};
use crate::assets::{self, VeracityAssessment};
use crate::claim::{
    draft_title_document, Claim, ClaimPatch, ClaimStatus, GramSabhaResolution, NewClaim, TitleDeed,
};
use crate::conflict::{self, ConflictReport};
use crate::document::{Document, DocumentKind, ExtractionResult};
use crate::error::ClaimError;
use crate::events::ClaimEvent;
use crate::permissions::{can, ClaimOperation};
use crate::ports::{
    AssetAnalyzer, ClaimQuery, ClaimStore, ClaimStoreExt, DocumentExtractor, Notifier,
    UserDirectory,
};
use crate::risk::{self, RiskAssessment};
use crate::sla::{self, SlaReport, MONITORED_STATUSES};
use crate::verification::VerificationReport;

/// Upper bound on the district slice handed to the overlap detector; the
/// detector caps its own comparison set further
const SCREENING_FETCH_LIMIT: u32 = 200;

const DEFAULT_COLLABORATOR_TIMEOUT: Duration = Duration::from_secs(5);

/// A claim together with the screening verdict that accompanied the write
#[derive(Debug, Clone)]
pub struct ScreenedClaim {
    pub claim: Claim,
    /// Present when the operation ran the overlap detector
    pub screening: Option<ConflictReport>,
}

/// One page of a claim listing
#[derive(Debug, Clone)]
pub struct ClaimPage {
    pub claims: Vec<Claim>,
    pub total: u64,
    pub page: u32,
    pub limit: u32,
}

/// Risk output for the officer review screen
#[derive(Debug, Clone)]
pub struct RiskReview {
    pub assessment: RiskAssessment,
    /// Present when an asset summary exists for the parcel
    pub veracity: Option<VeracityAssessment>,
    /// Draft certificate text, rendered once the claim is `Verified` or
    /// `Approved`
    pub draft_title: Option<String>,
}

/// An uploaded document plus whatever text came with it
#[derive(Debug, Clone)]
pub struct DocumentUpload {
    pub name: String,
    pub kind: DocumentKind,
    pub storage_ref: String,
    pub sha256: String,
    pub text_excerpt: Option<String>,
}

pub struct ClaimsService {
    store: Arc<dyn ClaimStore>,
    users: Arc<dyn UserDirectory>,
    notifier: Arc<dyn Notifier>,
    assets: Arc<dyn AssetAnalyzer>,
    extractor: Arc<dyn DocumentExtractor>,
    collaborator_timeout: Duration,
}

impl ClaimsService {
    pub fn new(
        store: Arc<dyn ClaimStore>,
        users: Arc<dyn UserDirectory>,
        notifier: Arc<dyn Notifier>,
        assets: Arc<dyn AssetAnalyzer>,
        extractor: Arc<dyn DocumentExtractor>,
    ) -> Self {
        Self {
            store,
            users,
            notifier,
            assets,
            extractor,
            collaborator_timeout: DEFAULT_COLLABORATOR_TIMEOUT,
        }
    }

    /// Overrides the bounded timeout applied to asset analysis and document
    /// extraction calls
    pub fn with_collaborator_timeout(mut self, timeout: Duration) -> Self {
        self.collaborator_timeout = timeout;
        self
    }

    // ========================================================================
    // Intake
    // ========================================================================

    /// Files a new claim
    ///
    /// When geometry is present the overlap detector runs first; a blocking
    /// overlap routes the claim to `Conflict_Detected` instead of
    /// `Submitted`, but creation itself still succeeds. `save_as_draft`
    /// parks the claim in `Draft` regardless of screening.
    #[instrument(skip_all, fields(actor = %actor.id, district = %details.district))]
    pub async fn create_claim(
        &self,
        actor: &Actor,
        details: NewClaim,
        save_as_draft: bool,
    ) -> Result<ScreenedClaim, ClaimError> {
        self.authorize(actor, ClaimOperation::Create, None)?;

        let screening = match &details.geometry {
            Some(geometry) => Some(self.screen(geometry, &details.district, None).await?),
            None => None,
        };

        let (status, reason) = if save_as_draft {
            (ClaimStatus::Draft, "Saved as draft".to_string())
        } else {
            match &screening {
                Some(report) if !report.allowed => {
                    (ClaimStatus::ConflictDetected, report.message.clone())
                }
                Some(report) => (ClaimStatus::Submitted, report.message.clone()),
                None => (ClaimStatus::Submitted, "Claim submitted".to_string()),
            }
        };

        let mut claim = Claim::create(details, actor.id, status, Some(reason))?;
        self.enrich_assets(&mut claim).await;
        self.store.insert_claim(&claim, None).await?;

        self.emit(ClaimEvent::Created {
            claim_id: claim.id,
            claim_number: claim.id.to_string(),
            status: claim.status,
            occurred_at: claim.created_at,
        });
        if claim.status == ClaimStatus::ConflictDetected {
            self.emit(ClaimEvent::ConflictFlagged {
                claim_id: claim.id,
                conflict_count: screening.as_ref().map(|r| r.conflicts.len()).unwrap_or(0),
                occurred_at: claim.created_at,
            });
        }
        self.notify_claimant(&claim);

        Ok(ScreenedClaim { claim, screening })
    }

    /// Loads one claim, enforcing view permissions
    pub async fn get_claim(&self, actor: &Actor, id: ClaimId) -> Result<Claim, ClaimError> {
        let claim = self.load(id).await?;
        self.authorize(actor, ClaimOperation::View, Some(&claim))?;
        Ok(claim)
    }

    /// Lists claims; citizens without an officer role only ever see their own
    #[instrument(skip_all, fields(actor = %actor.id))]
    pub async fn list_claims(
        &self,
        actor: &Actor,
        mut query: ClaimQuery,
    ) -> Result<ClaimPage, ClaimError> {
        self.authorize(actor, ClaimOperation::View, None)?;
        if crate::permissions::sees_only_own_claims(actor) {
            query.claimant = Some(actor.id);
        }
        let page = query.page;
        let limit = query.limit;
        let (claims, total) = self.store.page(query, None).await?;
        Ok(ClaimPage {
            claims,
            total,
            page,
            limit,
        })
    }

    /// Applies the update whitelist
    ///
    /// A geometry change re-runs the overlap screen. Updates on a
    /// `Rejected` claim resubmit it; updates on a `Conflict_Detected` claim
    /// route to `Submitted` when the new boundary screens clean.
    #[instrument(skip_all, fields(claim_id = %id, actor = %actor.id))]
    pub async fn update_claim(
        &self,
        actor: &Actor,
        id: ClaimId,
        patch: ClaimPatch,
    ) -> Result<ScreenedClaim, ClaimError> {
        let claim = self.load(id).await?;
        self.authorize(actor, ClaimOperation::Update, Some(&claim))?;

        let screening = match &patch.geometry {
            Some(geometry) => {
                let district = patch.district.as_deref().unwrap_or(&claim.district);
                Some(self.screen(geometry, district, Some(id)).await?)
            }
            None => None,
        };

        let before = claim.status;
        let actor_id = actor.id;
        let verdict = screening.clone();
        let claim = self
            .commit(claim, move |c| {
                if !matches!(
                    c.status,
                    ClaimStatus::Draft
                        | ClaimStatus::ConflictDetected
                        | ClaimStatus::Submitted
                        | ClaimStatus::Rejected
                ) {
                    return Err(ClaimError::state(
                        "update",
                        "Draft, ConflictDetected, Submitted, or Rejected",
                        c.status.as_str(),
                    ));
                }
                c.apply_patch(patch.clone())?;
                match c.status {
                    ClaimStatus::Rejected => {
                        c.rejection_reason = None;
                        c.update_status(
                            ClaimStatus::Submitted,
                            actor_id,
                            Some("Resubmitted".to_string()),
                        )?;
                    }
                    ClaimStatus::ConflictDetected => {
                        if let Some(report) = verdict.as_ref().filter(|r| r.allowed) {
                            c.update_status(
                                ClaimStatus::Submitted,
                                actor_id,
                                Some(report.message.clone()),
                            )?;
                        }
                    }
                    _ => {}
                }
                Ok(())
            })
            .await?;

        if before != claim.status {
            match before {
                ClaimStatus::Rejected => self.emit(ClaimEvent::Resubmitted {
                    claim_id: claim.id,
                    occurred_at: claim.updated_at,
                }),
                _ => self.emit(ClaimEvent::Submitted {
                    claim_id: claim.id,
                    occurred_at: claim.updated_at,
                }),
            }
            self.notify_claimant(&claim);
        }

        Ok(ScreenedClaim { claim, screening })
    }

    /// Moves a parked claim into the workflow
    ///
    /// `Draft` and `Conflict_Detected` claims are re-screened; a blocking
    /// overlap parks the claim in `Conflict_Detected` instead. A `Rejected`
    /// claim is resubmitted as-is.
    #[instrument(skip_all, fields(claim_id = %id, actor = %actor.id))]
    pub async fn submit_claim(
        &self,
        actor: &Actor,
        id: ClaimId,
    ) -> Result<ScreenedClaim, ClaimError> {
        let claim = self.load(id).await?;
        self.authorize(actor, ClaimOperation::Submit, Some(&claim))?;

        if claim.status == ClaimStatus::Rejected {
            let claim = self.resubmit_loaded(actor, claim).await?;
            return Ok(ScreenedClaim {
                claim,
                screening: None,
            });
        }

        let screening = match &claim.geometry {
            Some(geometry) => Some(self.screen(geometry, &claim.district, Some(id)).await?),
            None => None,
        };

        let actor_id = actor.id;
        let verdict = screening.clone();
        let claim = self
            .commit(claim, move |c| {
                if !matches!(
                    c.status,
                    ClaimStatus::Draft | ClaimStatus::ConflictDetected
                ) {
                    return Err(ClaimError::state(
                        "submit",
                        "Draft or ConflictDetected",
                        c.status.as_str(),
                    ));
                }
                match &verdict {
                    Some(report) if !report.allowed => {
                        if c.status == ClaimStatus::Draft {
                            c.update_status(
                                ClaimStatus::ConflictDetected,
                                actor_id,
                                Some(report.message.clone()),
                            )?;
                        }
                        // Already parked in ConflictDetected: no status write
                        Ok(())
                    }
                    Some(report) => c.update_status(
                        ClaimStatus::Submitted,
                        actor_id,
                        Some(report.message.clone()),
                    ),
                    None => c.update_status(
                        ClaimStatus::Submitted,
                        actor_id,
                        Some("Claim submitted".to_string()),
                    ),
                }
            })
            .await?;

        match claim.status {
            ClaimStatus::Submitted => {
                self.emit(ClaimEvent::Submitted {
                    claim_id: claim.id,
                    occurred_at: claim.updated_at,
                });
                self.notify_claimant(&claim);
            }
            ClaimStatus::ConflictDetected => {
                self.emit(ClaimEvent::ConflictFlagged {
                    claim_id: claim.id,
                    conflict_count: screening.as_ref().map(|r| r.conflicts.len()).unwrap_or(0),
                    occurred_at: claim.updated_at,
                });
                self.notify_claimant(&claim);
            }
            _ => {}
        }

        Ok(ScreenedClaim { claim, screening })
    }

    /// Puts a corrected, previously rejected claim back into the queue
    pub async fn resubmit_claim(&self, actor: &Actor, id: ClaimId) -> Result<Claim, ClaimError> {
        let claim = self.load(id).await?;
        self.authorize(actor, ClaimOperation::Resubmit, Some(&claim))?;
        self.resubmit_loaded(actor, claim).await
    }

    async fn resubmit_loaded(&self, actor: &Actor, claim: Claim) -> Result<Claim, ClaimError> {
        let actor_id = actor.id;
        let claim = self
            .commit(claim, move |c| {
                if c.status != ClaimStatus::Rejected {
                    return Err(ClaimError::state(
                        "resubmit",
                        "Rejected",
                        c.status.as_str(),
                    ));
                }
                c.rejection_reason = None;
                c.update_status(
                    ClaimStatus::Submitted,
                    actor_id,
                    Some("Resubmitted".to_string()),
                )
            })
            .await?;

        self.emit(ClaimEvent::Resubmitted {
            claim_id: claim.id,
            occurred_at: claim.updated_at,
        });
        self.notify_claimant(&claim);
        Ok(claim)
    }

    // ========================================================================
    // Verification Stages
    // ========================================================================

    /// Records the Gram Sabha resolution and moves the claim forward
    #[instrument(skip_all, fields(claim_id = %id, actor = %actor.id))]
    pub async fn record_gram_sabha(
        &self,
        actor: &Actor,
        id: ClaimId,
        resolution: GramSabhaResolution,
    ) -> Result<Claim, ClaimError> {
        let claim = self.load(id).await?;
        self.authorize(actor, ClaimOperation::RecordGramSabha, Some(&claim))?;

        let actor_id = actor.id;
        let claim = self
            .commit(claim, move |c| {
                if !matches!(
                    c.status,
                    ClaimStatus::Submitted | ClaimStatus::Remanded
                ) {
                    return Err(ClaimError::state(
                        "record_gram_sabha",
                        "Submitted or Remanded",
                        c.status.as_str(),
                    ));
                }
                c.gram_sabha_resolution = Some(resolution.clone());
                c.update_status(
                    ClaimStatus::GramSabhaApproved,
                    actor_id,
                    Some(format!(
                        "Gram Sabha resolution {} recorded",
                        resolution.resolution_number
                    )),
                )
            })
            .await?;

        let resolution_number = claim
            .gram_sabha_resolution
            .as_ref()
            .map(|r| r.resolution_number.clone())
            .unwrap_or_default();
        self.emit(ClaimEvent::GramSabhaRecorded {
            claim_id: claim.id,
            resolution_number,
            occurred_at: claim.updated_at,
        });
        self.notify_claimant(&claim);
        Ok(claim)
    }

    /// Stores the field report against the claim without changing status
    ///
    /// Missing device-side analysis is filled from the asset collaborator;
    /// if that fails or times out the field reads `"Analysis Failed"`.
    #[instrument(skip_all, fields(claim_id = %id, actor = %actor.id))]
    pub async fn attach_report(
        &self,
        actor: &Actor,
        id: ClaimId,
        mut report: VerificationReport,
    ) -> Result<Claim, ClaimError> {
        let claim = self.load(id).await?;
        self.authorize(actor, ClaimOperation::AttachReport, Some(&claim))?;

        if !claim.status.is_verification_stage() {
            return Err(ClaimError::state(
                "attach_report",
                "a verification stage (Submitted through SDLC_Scrutiny)",
                claim.status.as_str(),
            ));
        }

        if report.ai_analysis.is_none() {
            report.ai_analysis = self.field_analysis(&claim).await;
        }

        let stored = report.clone();
        let claim = self
            .commit(claim, move |c| {
                if !c.status.is_verification_stage() {
                    return Err(ClaimError::state(
                        "attach_report",
                        "a verification stage (Submitted through SDLC_Scrutiny)",
                        c.status.as_str(),
                    ));
                }
                c.verification_report = Some(stored.clone());
                c.updated_at = Utc::now();
                Ok(())
            })
            .await?;

        self.emit(ClaimEvent::ReportAttached {
            claim_id: claim.id,
            field_worker: report.field_worker_id,
            occurred_at: claim.updated_at,
        });
        Ok(claim)
    }

    /// Moves a claim across an intermediate checkpoint
    ///
    /// Each target carries its own evidence guard; targets outside the
    /// checkpoint set are rejected outright.
    #[instrument(skip_all, fields(claim_id = %id, actor = %actor.id, target = %target))]
    pub async fn advance_stage(
        &self,
        actor: &Actor,
        id: ClaimId,
        target: ClaimStatus,
        notes: Option<String>,
    ) -> Result<Claim, ClaimError> {
        let claim = self.load(id).await?;
        self.authorize(actor, ClaimOperation::AdvanceStage, Some(&claim))?;

        let actor_id = actor.id;
        let claim = self
            .commit(claim, move |c| {
                check_advance_guard(c, target)?;
                c.update_status(target, actor_id, notes.clone())
            })
            .await?;

        self.emit(ClaimEvent::StageAdvanced {
            claim_id: claim.id,
            to: claim.status,
            occurred_at: claim.updated_at,
        });
        self.notify_claimant(&claim);
        Ok(claim)
    }

    /// Marks a claim `Verified` from any verification stage
    #[instrument(skip_all, fields(claim_id = %id, actor = %actor.id))]
    pub async fn verify_claim(
        &self,
        actor: &Actor,
        id: ClaimId,
        notes: Option<String>,
    ) -> Result<Claim, ClaimError> {
        let claim = self.load(id).await?;
        self.authorize(actor, ClaimOperation::Verify, Some(&claim))?;

        let actor_id = actor.id;
        let claim = self
            .commit(claim, move |c| {
                if !c.status.is_verification_stage() {
                    return Err(ClaimError::state(
                        "verify",
                        "a verification stage (Submitted through SDLC_Scrutiny)",
                        c.status.as_str(),
                    ));
                }
                c.verified_by = Some(actor_id);
                c.verified_at = Some(Utc::now());
                c.verification_notes = notes.clone();
                let reason = notes
                    .clone()
                    .unwrap_or_else(|| "Verification complete".to_string());
                c.update_status(ClaimStatus::Verified, actor_id, Some(reason))
            })
            .await?;

        self.emit(ClaimEvent::Verified {
            claim_id: claim.id,
            verified_by: actor.id,
            occurred_at: claim.updated_at,
        });
        self.notify_claimant(&claim);
        Ok(claim)
    }

    // ========================================================================
    // Decisions
    // ========================================================================

    /// Approves a verified claim
    #[instrument(skip_all, fields(claim_id = %id, actor = %actor.id))]
    pub async fn approve_claim(
        &self,
        actor: &Actor,
        id: ClaimId,
        notes: Option<String>,
    ) -> Result<Claim, ClaimError> {
        let claim = self.load(id).await?;
        self.authorize(actor, ClaimOperation::Approve, Some(&claim))?;

        let actor_id = actor.id;
        let claim = self
            .commit(claim, move |c| {
                if c.status != ClaimStatus::Verified {
                    return Err(ClaimError::state(
                        "approve",
                        "Verified",
                        c.status.as_str(),
                    ));
                }
                c.approved_by = Some(actor_id);
                c.approved_at = Some(Utc::now());
                c.approval_notes = notes.clone();
                let reason = notes.clone().unwrap_or_else(|| "Claim approved".to_string());
                c.update_status(ClaimStatus::Approved, actor_id, Some(reason))
            })
            .await?;

        self.emit(ClaimEvent::Approved {
            claim_id: claim.id,
            approved_by: actor.id,
            occurred_at: claim.updated_at,
        });
        self.notify_claimant(&claim);
        Ok(claim)
    }

    /// Rejects a claim with a mandatory reason
    #[instrument(skip_all, fields(claim_id = %id, actor = %actor.id))]
    pub async fn reject_claim(
        &self,
        actor: &Actor,
        id: ClaimId,
        reason: String,
    ) -> Result<Claim, ClaimError> {
        if reason.trim().is_empty() {
            return Err(ClaimError::validation("Rejection reason is required"));
        }
        let claim = self.load(id).await?;
        self.authorize(actor, ClaimOperation::Reject, Some(&claim))?;

        let actor_id = actor.id;
        let stored_reason = reason.clone();
        let claim = self
            .commit(claim, move |c| {
                if matches!(
                    c.status,
                    ClaimStatus::Rejected | ClaimStatus::TitleIssued
                ) {
                    return Err(ClaimError::state(
                        "reject",
                        "any status other than Rejected or Title_Issued",
                        c.status.as_str(),
                    ));
                }
                c.rejection_reason = Some(stored_reason.clone());
                c.update_status(ClaimStatus::Rejected, actor_id, Some(stored_reason.clone()))
            })
            .await?;

        self.emit(ClaimEvent::Rejected {
            claim_id: claim.id,
            reason,
            occurred_at: claim.updated_at,
        });
        self.notify_claimant(&claim);
        Ok(claim)
    }

    /// Sends a claim back for re-verification
    #[instrument(skip_all, fields(claim_id = %id, actor = %actor.id))]
    pub async fn remand_claim(
        &self,
        actor: &Actor,
        id: ClaimId,
        reason: String,
    ) -> Result<Claim, ClaimError> {
        if reason.trim().is_empty() {
            return Err(ClaimError::validation("Remand reason is required"));
        }
        let claim = self.load(id).await?;
        self.authorize(actor, ClaimOperation::Remand, Some(&claim))?;

        let actor_id = actor.id;
        let stored_reason = reason.clone();
        let claim = self
            .commit(claim, move |c| {
                if !matches!(
                    c.status,
                    ClaimStatus::FieldVerified
                        | ClaimStatus::JointVerified
                        | ClaimStatus::SdlcScrutiny
                        | ClaimStatus::Verified
                ) {
                    return Err(ClaimError::state(
                        "remand",
                        "Field_Verified, Joint_Verified, SDLC_Scrutiny, or Verified",
                        c.status.as_str(),
                    ));
                }
                c.remand(stored_reason.clone(), actor_id)
            })
            .await?;

        self.emit(ClaimEvent::Remanded {
            claim_id: claim.id,
            reason,
            occurred_at: claim.updated_at,
        });
        self.notify_claimant(&claim);
        Ok(claim)
    }

    /// Issues the title deed for an approved claim
    #[instrument(skip_all, fields(claim_id = %id, actor = %actor.id))]
    pub async fn issue_title(&self, actor: &Actor, id: ClaimId) -> Result<Claim, ClaimError> {
        let claim = self.load(id).await?;
        self.authorize(actor, ClaimOperation::IssueTitle, Some(&claim))?;

        let actor_id = actor.id;
        let claim = self
            .commit(claim, move |c| {
                if c.status != ClaimStatus::Approved {
                    return Err(ClaimError::state(
                        "issue_title",
                        "Approved",
                        c.status.as_str(),
                    ));
                }
                let deed = TitleDeed::generate(actor_id);
                let serial = deed.serial_number.clone();
                c.title_deed = Some(deed);
                c.update_status(
                    ClaimStatus::TitleIssued,
                    actor_id,
                    Some(format!("Title deed {serial} issued")),
                )
            })
            .await?;

        let serial_number = claim
            .title_deed
            .as_ref()
            .map(|deed| deed.serial_number.clone())
            .unwrap_or_default();
        self.emit(ClaimEvent::TitleIssued {
            claim_id: claim.id,
            serial_number,
            occurred_at: claim.updated_at,
        });
        self.notify_claimant(&claim);
        Ok(claim)
    }

    // ========================================================================
    // Evidence
    // ========================================================================

    /// Attaches a document, rejecting per-claim fingerprint duplicates
    #[instrument(skip_all, fields(claim_id = %id, actor = %actor.id))]
    pub async fn attach_document(
        &self,
        actor: &Actor,
        id: ClaimId,
        upload: DocumentUpload,
    ) -> Result<Claim, ClaimError> {
        let claim = self.load(id).await?;
        self.authorize(actor, ClaimOperation::AttachDocument, Some(&claim))?;

        let mut document = Document::new(
            upload.name.clone(),
            upload.kind,
            upload.storage_ref.clone(),
            upload.sha256.clone(),
            actor.id,
        )?;
        document.extraction = Some(self.run_extraction(&upload).await);
        let document_id = document.id;

        let claim = self
            .commit(claim, move |c| c.attach_document(document.clone()))
            .await?;

        self.emit(ClaimEvent::DocumentAttached {
            claim_id: claim.id,
            document_id,
            occurred_at: claim.updated_at,
        });
        Ok(claim)
    }

    // ========================================================================
    // Screening and Reports
    // ========================================================================

    /// Runs the overlap detector against a parcel without persisting anything
    pub async fn check_conflicts(
        &self,
        actor: &Actor,
        geometry: &Geometry,
        district: &str,
        exclude: Option<ClaimId>,
    ) -> Result<ConflictReport, ClaimError> {
        self.authorize(actor, ClaimOperation::CheckConflicts, None)?;
        geometry
            .validate()
            .map_err(|e| ClaimError::Validation(e.to_string()))?;
        self.screen(geometry, district, exclude).await
    }

    /// Risk assessment plus, when the stage allows, the draft title text
    pub async fn risk_review(&self, actor: &Actor, id: ClaimId) -> Result<RiskReview, ClaimError> {
        let claim = self.load(id).await?;
        self.authorize(actor, ClaimOperation::ViewRisk, Some(&claim))?;

        let assessment = risk::assess_claim(&claim);
        let veracity = claim
            .asset_summary
            .as_ref()
            .map(|summary| assets::score_veracity(&claim, summary));
        let draft_title = matches!(
            claim.status,
            ClaimStatus::Verified | ClaimStatus::Approved
        )
        .then(|| draft_title_document(&claim));

        Ok(RiskReview {
            assessment,
            veracity,
            draft_title,
        })
    }

    /// Deadline standing across all monitored claims
    pub async fn sla_report(&self, actor: &Actor) -> Result<SlaReport, ClaimError> {
        self.authorize(actor, ClaimOperation::SlaReport, None)?;
        let claims = self.store.find_by_statuses(MONITORED_STATUSES, None).await?;
        Ok(sla::build_report(&claims, Utc::now()))
    }

    /// Fraud-pattern scan over recently touched claims
    pub async fn scan_anomalies(&self, actor: &Actor) -> Result<Vec<Anomaly>, ClaimError> {
        self.authorize(actor, ClaimOperation::AnomalyScan, None)?;
        let now = Utc::now();
        let since = now - chrono::Duration::hours(SCAN_WINDOW_HOURS);
        let claims = self.store.find_updated_since(since, None).await?;
        Ok(anomaly::scan(&claims, now))
    }

    // ========================================================================
    // Internals
    // ========================================================================

    fn authorize(
        &self,
        actor: &Actor,
        operation: ClaimOperation,
        claim: Option<&Claim>,
    ) -> Result<(), ClaimError> {
        if can(actor, operation, claim) {
            Ok(())
        } else {
            Err(ClaimError::authorization(format!(
                "Not permitted to {}",
                operation.as_str()
            )))
        }
    }

    async fn load(&self, id: ClaimId) -> Result<Claim, ClaimError> {
        self.store.get_claim(id, None).await.map_err(|err| {
            if err.is_not_found() {
                ClaimError::NotFound(id.to_string())
            } else {
                ClaimError::Storage(err)
            }
        })
    }

    /// Bumps the version and saves; restores the version on failure so the
    /// caller can retry against a fresh load
    async fn persist(&self, claim: &mut Claim) -> Result<(), ClaimError> {
        let expected = claim.version;
        claim.version = expected + 1;
        if let Err(err) = self.store.save_claim(claim, expected, None).await {
            claim.version = expected;
            return Err(ClaimError::Storage(err));
        }
        Ok(())
    }

    /// Runs one read-modify-write, retrying once after a lost race
    ///
    /// The mutation must be pure over the claim so it can be replayed
    /// against the winner's state; its own pre-condition check is what turns
    /// a replay on a moved claim into the right state error.
    async fn commit<F>(&self, mut claim: Claim, mutate: F) -> Result<Claim, ClaimError>
    where
        F: Fn(&mut Claim) -> Result<(), ClaimError>,
    {
        let id = claim.id;
        mutate(&mut claim)?;
        match self.persist(&mut claim).await {
            Ok(()) => Ok(claim),
            Err(ClaimError::Storage(err)) if err.is_conflict() => {
                warn!(claim_id = %id, "concurrent write detected; replaying against fresh state");
                let mut fresh = self.load(id).await?;
                mutate(&mut fresh)?;
                self.persist(&mut fresh).await?;
                Ok(fresh)
            }
            Err(other) => Err(other),
        }
    }

    async fn screen(
        &self,
        geometry: &Geometry,
        district: &str,
        exclude: Option<ClaimId>,
    ) -> Result<ConflictReport, ClaimError> {
        let active = self
            .store
            .active_for_screening(district, exclude, SCREENING_FETCH_LIMIT, None)
            .await?;
        Ok(conflict::validate_submission(geometry, exclude, &active))
    }

    /// Best-effort asset summary; absence is recorded, never fatal
    async fn enrich_assets(&self, claim: &mut Claim) {
        let Some(geometry) = claim.geometry.clone() else {
            return;
        };
        match tokio::time::timeout(self.collaborator_timeout, self.assets.analyze(&geometry)).await
        {
            Ok(Ok(summary)) => claim.asset_summary = Some(summary),
            Ok(Err(err)) => {
                warn!(claim_id = %claim.id, error = %err, "asset analysis failed; continuing without summary");
            }
            Err(_) => {
                warn!(
                    claim_id = %claim.id,
                    timeout_ms = self.collaborator_timeout.as_millis() as u64,
                    "asset analysis timed out; continuing without summary"
                );
            }
        }
    }

    /// Narrative for a report whose capture device produced no analysis
    async fn field_analysis(&self, claim: &Claim) -> Option<String> {
        let geometry = claim.geometry.as_ref()?;
        match tokio::time::timeout(self.collaborator_timeout, self.assets.analyze(geometry)).await {
            Ok(Ok(summary)) => Some(format!(
                "Estimated cover: {:.2} ha farmland, {:.2} ha forest, {:.2} ha water, {} homestead(s).",
                summary.farmland_ha, summary.forest_ha, summary.water_area_ha, summary.homestead_count
            )),
            Ok(Err(err)) => {
                warn!(claim_id = %claim.id, error = %err, "report analysis failed");
                Some("Analysis Failed".to_string())
            }
            Err(_) => {
                warn!(claim_id = %claim.id, "report analysis timed out");
                Some("Analysis Failed".to_string())
            }
        }
    }

    async fn run_extraction(&self, upload: &DocumentUpload) -> ExtractionResult {
        match tokio::time::timeout(
            self.collaborator_timeout,
            self.extractor
                .extract(&upload.name, upload.text_excerpt.as_deref()),
        )
        .await
        {
            Ok(Ok(result)) => result,
            Ok(Err(err)) => {
                warn!(document = %upload.name, error = %err, "document extraction failed");
                ExtractionResult::degraded()
            }
            Err(_) => {
                warn!(document = %upload.name, "document extraction timed out");
                ExtractionResult::degraded()
            }
        }
    }

    fn emit(&self, event: ClaimEvent) {
        info!(
            event = event.event_type(),
            claim_id = %event.claim_id(),
            "domain event"
        );
    }

    /// Fire-and-forget status notification to the owning citizen
    fn notify_claimant(&self, claim: &Claim) {
        let Some(claimant) = claim.claimant_id else {
            return;
        };
        let users = Arc::clone(&self.users);
        let notifier = Arc::clone(&self.notifier);
        let claim = claim.clone();
        tokio::spawn(async move {
            match users.get_user(claimant, None).await {
                Ok(user) => {
                    if let Err(err) = notifier.status_update(&user, &claim).await {
                        warn!(claim_id = %claim.id, error = %err, "status notification failed");
                    }
                }
                Err(err) => {
                    warn!(claim_id = %claim.id, error = %err, "claimant lookup failed for notification");
                }
            }
        });
    }
}

/// Evidence guard for each advance target; status edges themselves are
/// enforced by `update_status`
fn check_advance_guard(claim: &Claim, target: ClaimStatus) -> Result<(), ClaimError> {
    match target {
        ClaimStatus::FieldVerified => {
            if claim.status != ClaimStatus::GramSabhaApproved {
                return Err(ClaimError::state(
                    "advance_stage",
                    "GramSabhaApproved",
                    claim.status.as_str(),
                ));
            }
            if claim.verification_report.is_none() {
                return Err(ClaimError::validation(
                    "Field verification requires an attached verification report",
                ));
            }
        }
        ClaimStatus::JointVerified => {
            if claim.status != ClaimStatus::FieldVerified {
                return Err(ClaimError::state(
                    "advance_stage",
                    "FieldVerified",
                    claim.status.as_str(),
                ));
            }
            let joint_complete = claim
                .verification_report
                .as_ref()
                .map(|r| r.is_joint_complete())
                .unwrap_or(false);
            if !joint_complete {
                return Err(ClaimError::validation(
                    "Joint verification requires signatures from both forest and revenue officers",
                ));
            }
        }
        ClaimStatus::SdlcScrutiny => {
            if !matches!(
                claim.status,
                ClaimStatus::FieldVerified | ClaimStatus::JointVerified
            ) {
                return Err(ClaimError::state(
                    "advance_stage",
                    "FieldVerified or JointVerified",
                    claim.status.as_str(),
                ));
            }
            let joint_complete = claim
                .verification_report
                .as_ref()
                .map(|r| r.is_joint_complete())
                .unwrap_or(false);
            if !joint_complete {
                return Err(ClaimError::validation(
                    "Committee scrutiny requires completed joint verification",
                ));
            }
            let quorum = claim
                .gram_sabha_resolution
                .as_ref()
                .map(|r| r.quorum_met)
                .unwrap_or(false);
            if !quorum {
                return Err(ClaimError::validation(
                    "Committee scrutiny requires a Gram Sabha resolution with quorum",
                ));
            }
        }
        ClaimStatus::GramSabhaApproved => {
            if claim.status != ClaimStatus::Remanded {
                return Err(ClaimError::state(
                    "advance_stage",
                    "Remanded",
                    claim.status.as_str(),
                ));
            }
            if claim.gram_sabha_resolution.is_none() {
                return Err(ClaimError::validation(
                    "Resuming from remand requires a Gram Sabha resolution on file",
                ));
            }
        }
        other => {
            return Err(ClaimError::validation(format!(
                "Cannot advance directly to {other}; use the dedicated operation"
            )));
        }
    }
    Ok(())
}
