//! Token issuance and validation (HS256).
//!
//! Validation returns a [`TokenVerdict`] rather than an error: an invalid
//! token is an expected outcome, not exceptional control flow.

use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{DecodingKey, EncodingKey, Header, Validation, decode, encode};
use tracing::debug;

use super::AuthError;
use crate::claims::{ClaimSet, TokenClaims};
use crate::store::CredentialStore;

/// Outcome of validating a presented token.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TokenVerdict {
    Valid(ClaimSet),
    Rejected(RejectReason),
}

/// Why a token was rejected. All reasons collapse to a generic unauthorized
/// response at the HTTP boundary.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RejectReason {
    Malformed,
    BadSignature,
    Expired,
}

/// Scope names that would collide with the typed payload fields when the
/// scope map is flattened onto the wire.
const RESERVED_SCOPE_NAMES: &[&str] = &["sub", "name", "iat", "exp", "permission"];

/// Issue a signed token for a machine client.
///
/// Claims carry the display name plus one `"true"` scope flag per granted
/// scope, lower-cased. Scopes named after a reserved payload field are
/// dropped rather than allowed to shadow it. Fails with
/// [`AuthError::IdentityNotFound`] when the client id does not resolve.
pub fn issue_for_client(
    store: &CredentialStore,
    client_id: &str,
    expires_at: DateTime<Utc>,
    secret: &[u8],
) -> Result<String, AuthError> {
    check_issuance_inputs(expires_at, secret)?;
    let app = store
        .find_client(client_id)
        .ok_or(AuthError::IdentityNotFound)?;

    let mut scopes = BTreeMap::new();
    for scope in &app.scopes {
        let scope = scope.trim().to_lowercase();
        if scope.is_empty() {
            continue;
        }
        if RESERVED_SCOPE_NAMES.contains(&scope.as_str()) {
            debug!(client_id, scope, "dropping reserved scope name");
            continue;
        }
        scopes.insert(scope, "true".to_string());
    }

    sign(
        &TokenClaims {
            sub: app.client_id.clone(),
            name: Some(app.display_name.clone()),
            iat: Utc::now().timestamp(),
            exp: expires_at.timestamp(),
            permission: Vec::new(),
            scopes,
        },
        secret,
    )
}

/// Issue a signed token for a user.
///
/// Claims carry the display name plus the user's effective permission names
/// (role claims and the implicit basic permissions) under the `permission`
/// claim type.
pub fn issue_for_user(
    store: &CredentialStore,
    user_id: &str,
    expires_at: DateTime<Utc>,
    secret: &[u8],
) -> Result<String, AuthError> {
    check_issuance_inputs(expires_at, secret)?;
    let user = store.find_user(user_id).ok_or(AuthError::IdentityNotFound)?;

    sign(
        &TokenClaims {
            sub: user.user_id.clone(),
            name: Some(user.display_name.clone()),
            iat: Utc::now().timestamp(),
            exp: expires_at.timestamp(),
            permission: store.effective_permissions(&user),
            scopes: BTreeMap::new(),
        },
        secret,
    )
}

fn check_issuance_inputs(expires_at: DateTime<Utc>, secret: &[u8]) -> Result<(), AuthError> {
    if secret.is_empty() {
        return Err(AuthError::Internal("signing secret is empty".into()));
    }
    if expires_at <= Utc::now() {
        return Err(AuthError::ValidationError(
            "token expiry must be in the future".into(),
        ));
    }
    Ok(())
}

fn sign(claims: &TokenClaims, secret: &[u8]) -> Result<String, AuthError> {
    encode(
        &Header::default(),
        claims,
        &EncodingKey::from_secret(secret),
    )
    .map_err(|e| AuthError::TokenError(format!("jwt encode: {e}")))
}

/// Validate a presented token: signature first, then expiry, then claims.
///
/// The signature is verified before any claim content is trusted, so a
/// tampered payload is rejected as [`RejectReason::BadSignature`] even when
/// the tampering touched the expiry. Zero clock-skew: a token is valid
/// through its exact `exp` second and rejected strictly after. Pure and
/// stateless; identical input always yields the same verdict.
pub fn validate(token: &str, secret: &[u8]) -> TokenVerdict {
    let key = DecodingKey::from_secret(secret);
    let mut validation = Validation::default();
    validation.validate_exp = true;
    validation.leeway = 0;

    match decode::<TokenClaims>(token, &key, &validation) {
        Ok(data) => TokenVerdict::Valid(data.claims.claim_set()),
        Err(e) => {
            let reason = match e.kind() {
                ErrorKind::InvalidSignature => RejectReason::BadSignature,
                ErrorKind::ExpiredSignature => RejectReason::Expired,
                _ => RejectReason::Malformed,
            };
            debug!(?reason, "token rejected");
            TokenVerdict::Rejected(reason)
        }
    }
}
