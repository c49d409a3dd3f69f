//! Authentication middleware — Bearer token extraction and validation.

use axum::http::header::AUTHORIZATION;
use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use tracing::debug;

use passgate_core::auth::token::{self, TokenVerdict};
use passgate_core::claims::ClaimSet;

use crate::AppState;
use crate::error::ApiError;

/// Key used to store the validated claim set in request extensions.
#[derive(Debug, Clone)]
pub struct AuthenticatedPrincipal(pub ClaimSet);

/// Axum middleware: extracts `Authorization: Bearer <token>`, validates it,
/// and injects [`AuthenticatedPrincipal`] into request extensions.
///
/// A missing or malformed header short-circuits to 401 before any body
/// processing. All rejection reasons collapse to the same generic response so
/// the caller cannot tell which check failed.
pub async fn require_auth(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, ApiError> {
    let header = request
        .headers()
        .get(AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .ok_or_else(|| ApiError::Unauthorized("Missing authorization header".into()))?;

    let token = header
        .strip_prefix("Bearer ")
        .ok_or_else(|| ApiError::Unauthorized("Invalid authorization scheme".into()))?;

    match token::validate(token, state.config.signing_secret.as_bytes()) {
        TokenVerdict::Valid(claims) => {
            request
                .extensions_mut()
                .insert(AuthenticatedPrincipal(claims));
            Ok(next.run(request).await)
        }
        TokenVerdict::Rejected(reason) => {
            debug!(?reason, "bearer token rejected");
            Err(ApiError::Unauthorized("Invalid or expired token".into()))
        }
    }
}
