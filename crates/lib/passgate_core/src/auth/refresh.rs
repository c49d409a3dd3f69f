//! Opaque refresh tokens: generation, hashing, and redemption.
//!
//! Refresh tokens are random strings stored by SHA-256 hash and rotated on
//! every use.

use chrono::{DateTime, Utc};
use rand::distr::Alphanumeric;
use rand::{Rng, rng};

use crate::claims::TokenClaims;
use crate::store::{CredentialStore, sha256_hex};

/// Generate a cryptographically random refresh token (64 alphanumeric chars).
pub fn generate_refresh_token() -> String {
    rng()
        .sample_iter(&Alphanumeric)
        .take(64)
        .map(char::from)
        .collect()
}

/// SHA-256 hash a refresh token for storage.
pub fn hash_refresh_token(token: &str) -> String {
    sha256_hex(token)
}

/// Read the claims of a possibly-expired access token without trusting its
/// lifetime. The signature is still required: refresh must prove the caller
/// once held a token we signed.
pub fn read_expired_claims(token: &str, secret: &[u8]) -> Option<TokenClaims> {
    let key = jsonwebtoken::DecodingKey::from_secret(secret);
    let mut validation = jsonwebtoken::Validation::default();
    validation.validate_exp = false;
    jsonwebtoken::decode::<TokenClaims>(token, &key, &validation)
        .ok()
        .map(|data| data.claims)
}

/// Redeem a refresh token for the given subject. Single use: the stored
/// record is consumed whether or not the subject matches.
pub fn redeem(store: &CredentialStore, refresh_token: &str, subject: &str) -> bool {
    let hash = hash_refresh_token(refresh_token);
    match store.take_refresh_token(&hash) {
        Some(record) => record.subject == subject,
        None => false,
    }
}

/// Issue and store a fresh refresh token for a subject.
pub fn issue(
    store: &CredentialStore,
    subject: &str,
    expires_at: DateTime<Utc>,
) -> String {
    let token = generate_refresh_token();
    store.store_refresh_token(&hash_refresh_token(&token), subject, expires_at);
    token
}
