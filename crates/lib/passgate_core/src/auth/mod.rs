//! Authentication logic: password hashing, token issuance and validation,
//! refresh token handling, and signing-secret resolution.

pub mod password;
pub mod refresh;
pub mod secret;
pub mod token;

use thiserror::Error;

use crate::store::StoreError;

/// Authentication errors.
#[derive(Debug, Error)]
pub enum AuthError {
    /// The identity a token was requested for cannot be resolved. Surfaced to
    /// callers as an authentication failure, never as a not-found.
    #[error("Identity not found")]
    IdentityNotFound,

    #[error("Token error: {0}")]
    TokenError(String),

    #[error("Validation error: {0}")]
    ValidationError(String),

    #[error("Store error: {0}")]
    Store(#[from] StoreError),

    #[error("Internal error: {0}")]
    Internal(String),
}
