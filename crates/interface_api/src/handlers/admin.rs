//! Administrative oversight handlers
//!
//! Both endpoints are super-admin territory; the domain service rejects
//! everyone else with an authorization error.

use axum::extract::State;
use axum::{Extension, Json};

use core_kernel::Actor;
use domain_claims::anomaly::Anomaly;
use domain_claims::SlaReport;

use crate::error::ApiError;
use crate::AppState;

/// Deadline posture across all active claims
pub async fn sla_report(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<SlaReport>, ApiError> {
    let report = state.service.sla_report(&actor).await?;
    Ok(Json(report))
}

/// Scans recently-touched claims for suspicious processing patterns
pub async fn anomalies(
    State(state): State<AppState>,
    Extension(actor): Extension<Actor>,
) -> Result<Json<Vec<Anomaly>>, ApiError> {
    let findings = state.service.scan_anomalies(&actor).await?;
    Ok(Json(findings))
}
