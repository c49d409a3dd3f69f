//! Application error types and the problem-details response shape.

use axum::{
    Json,
    http::StatusCode,
    response::{IntoResponse, Response},
};
use serde::Serialize;
use thiserror::Error;
use tracing::debug;
use uuid::Uuid;

use passgate_core::auth::AuthError;
use passgate_core::store::StoreError;

/// Convenience alias for handler return types.
pub type ApiResult<T> = Result<T, ApiError>;

/// Application-level errors with HTTP status mapping.
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("Validation error: {0}")]
    Validation(String),

    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Unauthorized: {0}")]
    Unauthorized(String),

    #[error("Forbidden: {0}")]
    Forbidden(String),

    #[error("Internal server error")]
    Internal(String),
}

/// RFC 7807-style problem payload. Every failure carries a correlation id;
/// raw error messages never cross the boundary for internal failures.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProblemDetails {
    pub title: String,
    pub detail: String,
    pub status: u16,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub instance: Option<String>,
    pub trace_id: String,
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let (status, title, detail) = match &self {
            ApiError::Validation(m) => (StatusCode::BAD_REQUEST, "Validation Failed", m.as_str()),
            ApiError::NotFound(m) => (StatusCode::NOT_FOUND, "Not Found", m.as_str()),
            ApiError::Unauthorized(m) => {
                (StatusCode::UNAUTHORIZED, "Authentication Failed", m.as_str())
            }
            ApiError::Forbidden(m) => (StatusCode::FORBIDDEN, "Permission Denied", m.as_str()),
            ApiError::Internal(_) => (
                StatusCode::INTERNAL_SERVER_ERROR,
                "Internal Server Error",
                "An unexpected error occurred.",
            ),
        };

        let trace_id = Uuid::new_v4().to_string();
        debug!(%trace_id, status = status.as_u16(), "request failed: {self}");

        let body = Json(ProblemDetails {
            title: title.to_string(),
            detail: detail.to_string(),
            status: status.as_u16(),
            instance: None,
            trace_id,
        });
        (status, body).into_response()
    }
}

impl From<AuthError> for ApiError {
    fn from(e: AuthError) -> Self {
        match e {
            // Unknown identities read the same as bad credentials so the
            // endpoint cannot be used to enumerate accounts.
            AuthError::IdentityNotFound => ApiError::Unauthorized("Invalid credentials".into()),
            AuthError::TokenError(msg) => ApiError::Unauthorized(msg),
            AuthError::ValidationError(msg) => ApiError::Validation(msg),
            AuthError::Store(e) => ApiError::from(e),
            AuthError::Internal(msg) => ApiError::Internal(msg),
        }
    }
}

impl From<StoreError> for ApiError {
    fn from(e: StoreError) -> Self {
        match e {
            StoreError::RoleNotFound(role) => ApiError::NotFound(format!("role `{role}`")),
            StoreError::DuplicateIdentity(id) => {
                ApiError::Validation(format!("identity `{id}` is already registered"))
            }
        }
    }
}
