//! Liveness and readiness probes.
//!
//! `/health` is for process supervisors; `/health/detailed` fans out to
//! the wired adapters and reports per-component status.

use axum::extract::State;
use axum::Json;
use serde::Serialize;

use core_kernel::ports::{AdapterHealth, HealthCheckResult};

use crate::AppState;

#[derive(Serialize)]
pub struct HealthResponse {
    pub status: String,
    pub version: String,
}

/// Liveness probe; answers without touching any backing service
pub async fn health_check() -> Json<HealthResponse> {
    Json(HealthResponse {
        status: "healthy".to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
    })
}

#[derive(Serialize)]
pub struct DetailedHealthResponse {
    pub status: String,
    pub version: String,
    pub components: Vec<HealthCheckResult>,
}

/// Readiness probe; asks every wired adapter to check its backing service
pub async fn detailed_health(State(state): State<AppState>) -> Json<DetailedHealthResponse> {
    let components = vec![
        state.store.health_check().await,
        state.users.health_check().await,
        state.catalog.health_check().await,
    ];

    let status = if components
        .iter()
        .all(|c| c.status == AdapterHealth::Healthy)
    {
        "healthy"
    } else {
        "degraded"
    };

    Json(DetailedHealthResponse {
        status: status.to_string(),
        version: env!("CARGO_PKG_VERSION").to_string(),
        components,
    })
}
