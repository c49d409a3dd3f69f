//! Auth domain models.
//!
//! These are internal domain models; wire shapes (token claims, HTTP request
//! and response bodies) live with the code that serializes them.

use chrono::{DateTime, Utc};

/// A registered machine client (client-credentials identity).
///
/// The secret is stored as a SHA-256 hex digest, never in clear.
#[derive(Debug, Clone)]
pub struct ClientApp {
    pub client_id: String,
    pub display_name: String,
    pub client_secret_hash: String,
    /// Granted scope names (e.g. `["read", "write"]`).
    pub scopes: Vec<String>,
}

/// A registered human user.
#[derive(Debug, Clone)]
pub struct UserAccount {
    pub user_id: String,
    pub user_name: String,
    pub display_name: String,
    /// bcrypt hash.
    pub password_hash: String,
    pub is_active: bool,
    /// Names of roles the user belongs to.
    pub roles: Vec<String>,
}

/// A role with its attached permission claims.
#[derive(Debug, Clone)]
pub struct Role {
    pub name: String,
    pub description: String,
    pub claims: Vec<RoleClaim>,
}

/// Association between a role and a permission claim.
///
/// `(role, claim_value)` pairs are unique; the store enforces this on insert.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RoleClaim {
    pub role: String,
    /// Always `"permission"` for permission claims.
    pub claim_type: String,
    /// Canonical permission name, e.g. `Permissions.Roles.Read`.
    pub claim_value: String,
}

/// A stored refresh token, keyed in the store by the SHA-256 hash of the
/// opaque token string. Single-use: taken (removed) on redemption.
#[derive(Debug, Clone)]
pub struct RefreshTokenRecord {
    pub id: String,
    /// User id the token was issued to.
    pub subject: String,
    pub expires_at: DateTime<Utc>,
}
