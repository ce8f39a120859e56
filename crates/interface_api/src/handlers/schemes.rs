//! Scheme catalog and eligibility handlers

use axum::extract::{Path, Query, State};
use axum::{Extension, Json};

use core_kernel::Actor;
use domain_claims::ClaimStatus;
use domain_schemes::rules::ClaimFacts;

use crate::dto::parse_claim_id;
use crate::dto::schemes::{EligibleSchemesResponse, ListSchemesQuery, SchemeResponse};
use crate::error::ApiError;
use crate::AppState;

/// Lists government schemes, optionally restricted to one status
pub async fn list_schemes(
    State(state): State<AppState>,
    Query(query): Query<ListSchemesQuery>,
) -> Result<Json<Vec<SchemeResponse>>, ApiError> {
    let status = query.status()?;
    let schemes = state.catalog.list_schemes(status, None).await?;
    Ok(Json(schemes.iter().map(SchemeResponse::from).collect()))
}

/// Matches a claim against every active scheme's eligibility rules
///
/// Facts come from the claim as stored; the caller must be allowed to
/// view the claim in the first place.
pub async fn claim_schemes(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
    Path(id): Path<String>,
) -> Result<Json<EligibleSchemesResponse>, ApiError> {
    let claim = state.service.get_claim(&actor, parse_claim_id(&id)?).await?;

    let facts = ClaimFacts {
        has_approved_claim: matches!(
            claim.status,
            ClaimStatus::Approved | ClaimStatus::TitleIssued
        ),
        claim_type: claim.claim_type.as_str().to_string(),
        land_size_claimed: claim.land_size_claimed,
        village: claim.village.clone(),
        district: claim.district.clone(),
    };

    let eligible = domain_schemes::eligible_schemes(state.catalog.as_ref(), &facts).await?;
    Ok(Json(EligibleSchemesResponse {
        claim_id: claim.id.to_string(),
        eligible: eligible.iter().map(SchemeResponse::from).collect(),
    }))
}
