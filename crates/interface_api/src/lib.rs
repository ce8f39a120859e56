//! Axum REST API for the land-claims backend.
//!
//! Handlers (`handlers`) translate HTTP to service calls, `dto` holds the
//! request and response shapes, `middleware` does JWT authentication and
//! audit logging, and `error` maps domain failures onto status codes.
//!
//! Authorization is not middleware here. Handlers pass the authenticated
//! [`Actor`](core_kernel::Actor) down and the domain service decides what
//! that actor may do, so the API and any future interface enforce the same
//! rules.
//!
//! # Example
//!
//! ```rust,ignore
//! use interface_api::{create_router, AppState};
//!
//! let app = create_router(state);
//! axum::serve(listener, app).await?;
//! ```

pub mod auth;
pub mod config;
pub mod dto;
pub mod error;
pub mod handlers;
pub mod middleware;

use std::sync::Arc;

use axum::{
    middleware as axum_middleware,
    routing::{get, post, put},
    Router,
};
use tower_http::cors::{Any, CorsLayer};
use tower_http::trace::TraceLayer;

use domain_claims::{ClaimStore, ClaimsService, UserDirectory};
use domain_schemes::SchemeCatalog;

use crate::config::ApiConfig;
use crate::handlers::{admin, claims, health, schemes};
use crate::middleware::{audit_middleware, auth_middleware};

/// Application state shared across handlers
///
/// The raw ports ride along next to the service so the readiness probe and
/// the eligibility handler can reach them without going through claim
/// authorization.
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<ClaimsService>,
    pub store: Arc<dyn ClaimStore>,
    pub users: Arc<dyn UserDirectory>,
    pub catalog: Arc<dyn SchemeCatalog>,
    pub config: ApiConfig,
}

/// Builds the full application router.
///
/// Health probes stay outside `/api` and skip authentication; everything
/// under `/api` passes through the JWT and audit layers.
pub fn create_router(state: AppState) -> Router {
    let public_routes = Router::new()
        .route("/health", get(health::health_check))
        .route("/health/detailed", get(health::detailed_health));

    // Claim routes
    let claim_routes = Router::new()
        .route("/", post(claims::create_claim))
        .route("/", get(claims::list_claims))
        .route("/check-conflicts", post(claims::check_conflicts))
        .route("/:id", get(claims::get_claim))
        .route("/:id", put(claims::update_claim))
        .route("/:id/submit", post(claims::submit_claim))
        .route("/:id/gram-sabha", post(claims::record_gram_sabha))
        .route("/:id/report", post(claims::attach_report))
        .route("/:id/advance", post(claims::advance_stage))
        .route("/:id/verify", post(claims::verify_claim))
        .route("/:id/approve", post(claims::approve_claim))
        .route("/:id/reject", post(claims::reject_claim))
        .route("/:id/remand", post(claims::remand_claim))
        .route("/:id/title", post(claims::issue_title))
        .route("/:id/documents", post(claims::attach_document))
        .route("/:id/risk", get(claims::risk_review))
        .route("/:id/schemes", get(schemes::claim_schemes));

    // Scheme catalog routes
    let scheme_routes = Router::new().route("/", get(schemes::list_schemes));

    // Oversight routes
    let admin_routes = Router::new()
        .route("/sla-report", get(admin::sla_report))
        .route("/anomalies", get(admin::anomalies));

    // Auth runs before audit so the audit line can name the actor
    let api_routes = Router::new()
        .nest("/claims", claim_routes)
        .nest("/schemes", scheme_routes)
        .nest("/admin", admin_routes)
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            audit_middleware,
        ))
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            auth_middleware,
        ));

    Router::new()
        .merge(public_routes)
        .nest("/api", api_routes)
        .layer(TraceLayer::new_for_http())
        .layer(
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any),
        )
        .with_state(state)
}
