//! Token service — authentication and refresh flows over the credential
//! store.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use tracing::info;

use passgate_core::auth::password::verify_password;
use passgate_core::auth::{refresh, token};
use passgate_core::store::CredentialStore;

use crate::error::{ApiError, ApiResult};

/// Access token lifetime: 10 minutes.
const ACCESS_TOKEN_TTL_MINS: i64 = 10;

/// Refresh token lifetime: 30 days.
const REFRESH_TOKEN_TTL_DAYS: i64 = 30;

/// Token grant returned by all authentication flows.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenResponse {
    pub access_token: String,
    pub expires_at: DateTime<Utc>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub refresh_token: Option<String>,
}

/// Authenticate a machine client and issue a scope-claim token.
///
/// Client tokens are short-lived and carry no refresh token; clients
/// re-authenticate with their stored credentials instead.
pub fn authenticate_client(
    store: &CredentialStore,
    client_id: &str,
    client_secret: &str,
    signing_secret: &[u8],
) -> ApiResult<TokenResponse> {
    if !store.verify_client_secret(client_id, client_secret) {
        return Err(ApiError::Unauthorized("Invalid client credentials".into()));
    }

    let expires_at = Utc::now() + chrono::Duration::minutes(ACCESS_TOKEN_TTL_MINS);
    let access_token = token::issue_for_client(store, client_id, expires_at, signing_secret)?;

    info!(client_id, "client token issued");
    Ok(TokenResponse {
        access_token,
        expires_at,
        refresh_token: None,
    })
}

/// Authenticate a user and issue a permission-claim token plus a single-use
/// refresh token.
pub fn authenticate_user(
    store: &CredentialStore,
    user_name: &str,
    password: &str,
    signing_secret: &[u8],
) -> ApiResult<TokenResponse> {
    let user = match store.find_user_by_name(user_name) {
        // Generic error for unknown user: no account enumeration.
        None => return Err(ApiError::Unauthorized("Invalid credentials".into())),
        Some(u) => u,
    };

    if !user.is_active {
        return Err(ApiError::Unauthorized("Invalid credentials".into()));
    }

    if !verify_password(password, &user.password_hash).map_err(ApiError::from)? {
        return Err(ApiError::Unauthorized("Invalid credentials".into()));
    }

    issue_user_grant(store, &user.user_id, signing_secret)
}

/// Exchange an expired access token plus a live refresh token for a new pair.
///
/// The refresh token is consumed whether or not the exchange succeeds
/// (single-use rotation). Failures are 400s per the token endpoint contract.
pub fn refresh_grant(
    store: &CredentialStore,
    access_token: &str,
    refresh_token: &str,
    signing_secret: &[u8],
) -> ApiResult<TokenResponse> {
    // The access token may be expired, but it must be one we signed.
    let claims = refresh::read_expired_claims(access_token, signing_secret)
        .ok_or_else(|| ApiError::Validation("Invalid token".into()))?;

    if !refresh::redeem(store, refresh_token, &claims.sub) {
        return Err(ApiError::Validation("Invalid refresh token".into()));
    }

    issue_user_grant(store, &claims.sub, signing_secret)
        .map_err(|_| ApiError::Validation("Invalid refresh token".into()))
}

fn issue_user_grant(
    store: &CredentialStore,
    user_id: &str,
    signing_secret: &[u8],
) -> ApiResult<TokenResponse> {
    let expires_at = Utc::now() + chrono::Duration::minutes(ACCESS_TOKEN_TTL_MINS);
    let access_token = token::issue_for_user(store, user_id, expires_at, signing_secret)?;

    let refresh_expires = Utc::now() + chrono::Duration::days(REFRESH_TOKEN_TTL_DAYS);
    let refresh_token = refresh::issue(store, user_id, refresh_expires);

    info!(user_id, "user token issued");
    Ok(TokenResponse {
        access_token,
        expires_at,
        refresh_token: Some(refresh_token),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use passgate_core::seed;

    const SECRET: &[u8] = b"service-test-secret";

    fn seeded_store() -> CredentialStore {
        let store = CredentialStore::new();
        seed::seed(&store).unwrap();
        store
    }

    #[test]
    fn client_authentication_issues_scoped_token() {
        let store = seeded_store();
        let grant = authenticate_client(
            &store,
            seed::DEMO_CLIENT_ID,
            seed::DEMO_CLIENT_SECRET,
            SECRET,
        )
        .unwrap();

        assert!(grant.refresh_token.is_none());
        assert!(grant.expires_at > Utc::now());
        match token::validate(&grant.access_token, SECRET) {
            token::TokenVerdict::Valid(claims) => assert!(claims.has_scope("read")),
            other => panic!("expected valid token, got {other:?}"),
        }
    }

    #[test]
    fn wrong_client_secret_is_unauthorized() {
        let store = seeded_store();
        let err =
            authenticate_client(&store, seed::DEMO_CLIENT_ID, "wrong", SECRET).unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[test]
    fn inactive_user_cannot_authenticate() {
        let store = seeded_store();
        let user = store.find_user_by_name(seed::BASIC_USER_NAME).unwrap();
        store.set_user_active(&user.user_id, false);

        let err = authenticate_user(&store, seed::BASIC_USER_NAME, seed::SEED_PASSWORD, SECRET)
            .unwrap_err();
        assert!(matches!(err, ApiError::Unauthorized(_)));
    }

    #[test]
    fn refresh_rotates_the_token_pair() {
        let store = seeded_store();
        let grant =
            authenticate_user(&store, seed::ADMIN_USER_NAME, seed::SEED_PASSWORD, SECRET).unwrap();
        let refresh_token = grant.refresh_token.clone().unwrap();

        let renewed =
            refresh_grant(&store, &grant.access_token, &refresh_token, SECRET).unwrap();
        assert!(renewed.refresh_token.is_some());

        // The original refresh token was consumed by the rotation.
        let err = refresh_grant(&store, &grant.access_token, &refresh_token, SECRET).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }

    #[test]
    fn refresh_rejects_foreign_access_token() {
        let store = seeded_store();
        let grant =
            authenticate_user(&store, seed::ADMIN_USER_NAME, seed::SEED_PASSWORD, SECRET).unwrap();
        let refresh_token = grant.refresh_token.unwrap();

        let err = refresh_grant(&store, "garbage-token", &refresh_token, SECRET).unwrap_err();
        assert!(matches!(err, ApiError::Validation(_)));
    }
}
