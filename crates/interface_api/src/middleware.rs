//! Request-level authentication and audit logging.

use std::time::Instant;

use axum::{
    body::Body,
    extract::State,
    http::{Request, StatusCode},
    middleware::Next,
    response::Response,
};
use core_kernel::Actor;
use tracing::{info, warn};

use crate::AppState;

/// Validates the bearer token and stores the resulting [`Actor`] in the
/// request extensions. Role checks happen in the domain layer; this only
/// establishes who is calling.
pub async fn auth_middleware(
    State(state): State<AppState>,
    mut request: Request<Body>,
    next: Next,
) -> Result<Response, StatusCode> {
    let token = request
        .headers()
        .get("Authorization")
        .and_then(|h| h.to_str().ok())
        .and_then(|h| h.strip_prefix("Bearer "));

    let Some(token) = token else {
        warn!("Missing or invalid Authorization header");
        return Err(StatusCode::UNAUTHORIZED);
    };

    let claims = match crate::auth::validate_token(token, &state.config.jwt_secret) {
        Ok(claims) => claims,
        Err(e) => {
            warn!("Token validation failed: {:?}", e);
            return Err(StatusCode::UNAUTHORIZED);
        }
    };

    match claims.to_actor() {
        Ok(actor) => {
            request.extensions_mut().insert(actor);
            Ok(next.run(request).await)
        }
        Err(e) => {
            warn!("Token subject rejected: {:?}", e);
            Err(StatusCode::UNAUTHORIZED)
        }
    }
}

/// Emits one structured line per request: who, what, outcome, duration.
/// The district comes along because officer actions are reviewed per
/// district.
pub async fn audit_middleware(
    State(_state): State<AppState>,
    request: Request<Body>,
    next: Next,
) -> Response {
    let method = request.method().clone();
    let uri = request.uri().clone();
    let (user_id, district) = request
        .extensions()
        .get::<Actor>()
        .map(|a| (a.id.to_string(), a.district.clone().unwrap_or_default()))
        .unwrap_or_else(|| ("anonymous".to_string(), String::new()));

    let started = Instant::now();
    let response = next.run(request).await;

    info!(
        method = %method,
        uri = %uri,
        user = %user_id,
        district = %district,
        status = %response.status().as_u16(),
        duration_ms = started.elapsed().as_millis() as u64,
        "request served"
    );

    response
}
