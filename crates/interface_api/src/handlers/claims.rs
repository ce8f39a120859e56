//! Claim workflow handlers
//!
//! Routes mirror the claim lifecycle: intake and editing, the Gram Sabha
//! and field evidence stages, the scrutiny ladder, and terminal decisions.
//! Every handler requires an authenticated [`Actor`]; whether that actor
//! may act on that claim is the domain service's call.

use axum::extract::{Path, Query, State};
use axum::http::StatusCode;
use axum::{Extension, Json};
use validator::Validate;

use core_kernel::Actor;
use domain_claims::ConflictReport;

use crate::dto::claims::{
    AdvanceRequest, CheckConflictsRequest, ClaimDetail, ClaimPageResponse, CreateClaimRequest,
    DocumentRequest, GramSabhaRequest, ListClaimsQuery, NotesRequest, ReasonRequest,
    ReportRequest, RiskReviewResponse, ScreenedClaimResponse, UpdateClaimRequest,
};
use crate::dto::parse_claim_id;
use crate::error::ApiError;
use crate::AppState;

/// Registers a new claim, optionally parked as a draft
pub async fn create_claim(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<CreateClaimRequest>,
) -> Result<(StatusCode, Json<ScreenedClaimResponse>), ApiError> {
    request.validate()?;
    let save_as_draft = request.save_as_draft;
    let details = request.into_new_claim()?;
    let screened = state
        .service
        .create_claim(&actor, details, save_as_draft)
        .await?;
    Ok((StatusCode::CREATED, Json(screened.into())))
}

/// Lists claims visible to the caller, filtered and paged
pub async fn list_claims(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Query(query): Query<ListClaimsQuery>,
) -> Result<Json<ClaimPageResponse>, ApiError> {
    let page = state.service.list_claims(&actor, query.into_query()?).await?;
    Ok(Json(page.into()))
}

/// Fetches one claim with its full history and documents
pub async fn get_claim(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<Json<ClaimDetail>, ApiError> {
    let claim = state.service.get_claim(&actor, parse_claim_id(&id)?).await?;
    Ok(Json(ClaimDetail::from(&claim)))
}

/// Edits a claim that is still a draft or was remanded for correction
pub async fn update_claim(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(request): Json<UpdateClaimRequest>,
) -> Result<Json<ScreenedClaimResponse>, ApiError> {
    let screened = state
        .service
        .update_claim(&actor, parse_claim_id(&id)?, request.into())
        .await?;
    Ok(Json(screened.into()))
}

/// Moves a draft into the workflow, or resubmits a rejected claim
pub async fn submit_claim(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<Json<ScreenedClaimResponse>, ApiError> {
    let screened = state.service.submit_claim(&actor, parse_claim_id(&id)?).await?;
    Ok(Json(screened.into()))
}

/// Records the Gram Sabha resolution for a submitted claim
pub async fn record_gram_sabha(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(request): Json<GramSabhaRequest>,
) -> Result<Json<ClaimDetail>, ApiError> {
    let claim = state
        .service
        .record_gram_sabha(&actor, parse_claim_id(&id)?, request.into())
        .await?;
    Ok(Json(ClaimDetail::from(&claim)))
}

/// Attaches a field verification report to the claim
pub async fn attach_report(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(request): Json<ReportRequest>,
) -> Result<Json<ClaimDetail>, ApiError> {
    let report = request.into_report(&actor);
    let claim = state
        .service
        .attach_report(&actor, parse_claim_id(&id)?, report)
        .await?;
    Ok(Json(ClaimDetail::from(&claim)))
}

/// Advances the claim to an explicit next stage
pub async fn advance_stage(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(request): Json<AdvanceRequest>,
) -> Result<Json<ClaimDetail>, ApiError> {
    let claim = state
        .service
        .advance_stage(&actor, parse_claim_id(&id)?, request.target, request.notes)
        .await?;
    Ok(Json(ClaimDetail::from(&claim)))
}

/// Marks the claim verified at the sub-divisional level
pub async fn verify_claim(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(request): Json<NotesRequest>,
) -> Result<Json<ClaimDetail>, ApiError> {
    let claim = state
        .service
        .verify_claim(&actor, parse_claim_id(&id)?, request.notes)
        .await?;
    Ok(Json(ClaimDetail::from(&claim)))
}

/// Approves the claim at the district level
pub async fn approve_claim(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(request): Json<NotesRequest>,
) -> Result<Json<ClaimDetail>, ApiError> {
    let claim = state
        .service
        .approve_claim(&actor, parse_claim_id(&id)?, request.notes)
        .await?;
    Ok(Json(ClaimDetail::from(&claim)))
}

/// Rejects the claim with a mandatory reason
pub async fn reject_claim(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(request): Json<ReasonRequest>,
) -> Result<Json<ClaimDetail>, ApiError> {
    let claim = state
        .service
        .reject_claim(&actor, parse_claim_id(&id)?, request.reason)
        .await?;
    Ok(Json(ClaimDetail::from(&claim)))
}

/// Sends the claim back to the claimant for correction
pub async fn remand_claim(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(request): Json<ReasonRequest>,
) -> Result<Json<ClaimDetail>, ApiError> {
    let claim = state
        .service
        .remand_claim(&actor, parse_claim_id(&id)?, request.reason)
        .await?;
    Ok(Json(ClaimDetail::from(&claim)))
}

/// Issues the title deed for an approved claim
pub async fn issue_title(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<Json<ClaimDetail>, ApiError> {
    let claim = state.service.issue_title(&actor, parse_claim_id(&id)?).await?;
    Ok(Json(ClaimDetail::from(&claim)))
}

/// Attaches an uploaded document to the claim
pub async fn attach_document(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
    Json(request): Json<DocumentRequest>,
) -> Result<(StatusCode, Json<ClaimDetail>), ApiError> {
    request.validate()?;
    let claim = state
        .service
        .attach_document(&actor, parse_claim_id(&id)?, request.into())
        .await?;
    Ok((StatusCode::CREATED, Json(ClaimDetail::from(&claim))))
}

/// Screens a geometry for overlaps without creating anything
pub async fn check_conflicts(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Json(request): Json<CheckConflictsRequest>,
) -> Result<Json<ConflictReport>, ApiError> {
    let exclude = request.exclude()?;
    let report = state
        .service
        .check_conflicts(&actor, &request.geometry, &request.district, exclude)
        .await?;
    Ok(Json(report))
}

/// Risk and veracity panel for the officer review screen
pub async fn risk_review(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<Json<RiskReviewResponse>, ApiError> {
    let review = state.service.risk_review(&actor, parse_claim_id(&id)?).await?;
    Ok(Json(review.into()))
}
