//! Static bearer token middleware

use crate::SharedState;
use axum::{
    extract::{Request, State},
    http::{header::AUTHORIZATION, StatusCode},
    middleware::Next,
    response::{IntoResponse, Response},
};
use tracing::warn;

/// Token carried by an `Authorization: Bearer <token>` header
fn bearer_token(request: &Request) -> Option<&str> {
    request
        .headers()
        .get(AUTHORIZATION)?
        .to_str()
        .ok()?
        .strip_prefix("Bearer ")
        .map(str::trim)
}

/// Reject requests whose bearer token does not match the configured one
pub async fn require_bearer(
    State(state): State<SharedState>,
    request: Request,
    next: Next,
) -> Response {
    let authorized = bearer_token(&request).is_some_and(|token| token == state.auth_token);
    if authorized {
        return next.run(request).await;
    }

    warn!("Rejected unauthenticated {} {}", request.method(), request.uri().path());
    metrics::counter!("bikeshare_unauthorized_requests_total").increment(1);
    (StatusCode::UNAUTHORIZED, "Unauthorized").into_response()
}
