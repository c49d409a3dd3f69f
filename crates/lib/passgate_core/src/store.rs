//! In-memory credential store.
//!
//! Holds registered caller identities, roles with their permission claims,
//! and outstanding refresh tokens. Read-mostly at steady state; writes happen
//! at seed time and through the role administration endpoints.

use std::collections::BTreeSet;

use chrono::{DateTime, Utc};
use dashmap::DashMap;
use dashmap::mapref::entry::Entry;
use sha2::{Digest, Sha256};
use thiserror::Error;
use uuid::Uuid;

use crate::models::{ClientApp, RefreshTokenRecord, Role, RoleClaim, UserAccount};
use crate::permissions;

/// Store errors.
#[derive(Debug, Error)]
pub enum StoreError {
    #[error("identity `{0}` is already registered")]
    DuplicateIdentity(String),

    #[error("role `{0}` not found")]
    RoleNotFound(String),
}

/// SHA-256 hex digest, used for client secrets and refresh tokens.
pub fn sha256_hex(input: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(input.as_bytes());
    format!("{:x}", hasher.finalize())
}

/// In-memory credential and role store.
#[derive(Debug, Default)]
pub struct CredentialStore {
    clients: DashMap<String, ClientApp>,
    users: DashMap<String, UserAccount>,
    /// user_name → user_id.
    user_names: DashMap<String, String>,
    roles: DashMap<String, Role>,
    /// token hash → record.
    refresh_tokens: DashMap<String, RefreshTokenRecord>,
}

impl CredentialStore {
    pub fn new() -> Self {
        Self::default()
    }

    // -----------------------------------------------------------------------
    // Clients
    // -----------------------------------------------------------------------

    /// Register a machine client. The secret is stored hashed.
    pub fn register_client(
        &self,
        client_id: &str,
        display_name: &str,
        client_secret: &str,
        scopes: &[&str],
    ) -> Result<(), StoreError> {
        match self.clients.entry(client_id.to_string()) {
            Entry::Occupied(_) => Err(StoreError::DuplicateIdentity(client_id.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(ClientApp {
                    client_id: client_id.to_string(),
                    display_name: display_name.to_string(),
                    client_secret_hash: sha256_hex(client_secret),
                    scopes: scopes.iter().map(|s| s.to_string()).collect(),
                });
                Ok(())
            }
        }
    }

    pub fn find_client(&self, client_id: &str) -> Option<ClientApp> {
        self.clients.get(client_id).map(|c| c.clone())
    }

    /// Verify a client secret. Unknown clients verify as false.
    pub fn verify_client_secret(&self, client_id: &str, client_secret: &str) -> bool {
        self.find_client(client_id)
            .is_some_and(|app| app.client_secret_hash == sha256_hex(client_secret))
    }

    // -----------------------------------------------------------------------
    // Users
    // -----------------------------------------------------------------------

    /// Register a user, returning the generated user id.
    ///
    /// `password_hash` must already be a bcrypt hash; hashing belongs to the
    /// auth layer.
    pub fn register_user(
        &self,
        user_name: &str,
        display_name: &str,
        password_hash: &str,
        roles: &[&str],
    ) -> Result<String, StoreError> {
        let user_id = Uuid::new_v4().to_string();
        match self.user_names.entry(user_name.to_string()) {
            Entry::Occupied(_) => return Err(StoreError::DuplicateIdentity(user_name.to_string())),
            Entry::Vacant(slot) => {
                slot.insert(user_id.clone());
            }
        }
        self.users.insert(
            user_id.clone(),
            UserAccount {
                user_id: user_id.clone(),
                user_name: user_name.to_string(),
                display_name: display_name.to_string(),
                password_hash: password_hash.to_string(),
                is_active: true,
                roles: roles.iter().map(|r| r.to_string()).collect(),
            },
        );
        Ok(user_id)
    }

    pub fn find_user(&self, user_id: &str) -> Option<UserAccount> {
        self.users.get(user_id).map(|u| u.clone())
    }

    pub fn find_user_by_name(&self, user_name: &str) -> Option<UserAccount> {
        let user_id = self.user_names.get(user_name)?.clone();
        self.find_user(&user_id)
    }

    /// Deactivate a user; inactive users fail credential verification.
    pub fn set_user_active(&self, user_id: &str, is_active: bool) {
        if let Some(mut user) = self.users.get_mut(user_id) {
            user.is_active = is_active;
        }
    }

    // -----------------------------------------------------------------------
    // Roles and role claims
    // -----------------------------------------------------------------------

    /// Create the role if missing. Returns whether it was created.
    pub fn upsert_role(&self, name: &str, description: &str) -> bool {
        match self.roles.entry(name.to_string()) {
            Entry::Occupied(_) => false,
            Entry::Vacant(slot) => {
                slot.insert(Role {
                    name: name.to_string(),
                    description: description.to_string(),
                    claims: Vec::new(),
                });
                true
            }
        }
    }

    pub fn role_names(&self) -> Vec<String> {
        let mut names: Vec<String> = self.roles.iter().map(|r| r.name.clone()).collect();
        names.sort();
        names
    }

    pub fn find_role(&self, name: &str) -> Option<Role> {
        self.roles.get(name).map(|r| r.clone())
    }

    /// Add a permission claim to a role unless the identical `(role,
    /// claim_value)` pair already exists. Returns whether a row was inserted,
    /// so callers can treat duplicates as already-seeded.
    pub fn add_role_claim(&self, role: &str, claim_value: &str) -> Result<bool, StoreError> {
        let mut entry = self
            .roles
            .get_mut(role)
            .ok_or_else(|| StoreError::RoleNotFound(role.to_string()))?;
        if entry.claims.iter().any(|c| c.claim_value == claim_value) {
            return Ok(false);
        }
        entry.claims.push(RoleClaim {
            role: role.to_string(),
            claim_type: crate::claims::PERMISSION_CLAIM_TYPE.to_string(),
            claim_value: claim_value.to_string(),
        });
        Ok(true)
    }

    /// Replace a role's permission claims with exactly the given set.
    /// Existing pairs are kept, missing ones added, extra ones removed.
    /// Repeated input values collapse to one row; no duplicate
    /// `(role, claim_value)` pair is ever stored.
    pub fn set_role_claims(&self, role: &str, claim_values: &[String]) -> Result<(), StoreError> {
        let wanted: BTreeSet<&str> = claim_values.iter().map(String::as_str).collect();
        let mut entry = self
            .roles
            .get_mut(role)
            .ok_or_else(|| StoreError::RoleNotFound(role.to_string()))?;
        entry
            .claims
            .retain(|c| wanted.contains(c.claim_value.as_str()));
        for value in wanted {
            if !entry.claims.iter().any(|c| c.claim_value == value) {
                entry.claims.push(RoleClaim {
                    role: role.to_string(),
                    claim_type: crate::claims::PERMISSION_CLAIM_TYPE.to_string(),
                    claim_value: value.to_string(),
                });
            }
        }
        Ok(())
    }

    /// All `(role, claim_value)` rows, sorted. Used to assert idempotence.
    pub fn all_role_claims(&self) -> Vec<(String, String)> {
        let mut rows: Vec<(String, String)> = self
            .roles
            .iter()
            .flat_map(|r| {
                r.claims
                    .iter()
                    .map(|c| (c.role.clone(), c.claim_value.clone()))
                    .collect::<Vec<_>>()
            })
            .collect();
        rows.sort();
        rows
    }

    /// Effective permission names for a user: claims of the user's roles plus
    /// the catalog's basic permissions, which every identity holds implicitly.
    pub fn effective_permissions(&self, user: &UserAccount) -> Vec<String> {
        let mut names: BTreeSet<String> =
            permissions::basic().map(|p| p.name()).collect();
        for role_name in &user.roles {
            if let Some(role) = self.roles.get(role_name) {
                for claim in &role.claims {
                    names.insert(claim.claim_value.clone());
                }
            }
        }
        names.into_iter().collect()
    }

    // -----------------------------------------------------------------------
    // Refresh tokens
    // -----------------------------------------------------------------------

    /// Store a refresh token by hash.
    pub fn store_refresh_token(
        &self,
        token_hash: &str,
        subject: &str,
        expires_at: DateTime<Utc>,
    ) {
        self.refresh_tokens.insert(
            token_hash.to_string(),
            RefreshTokenRecord {
                id: Uuid::new_v4().to_string(),
                subject: subject.to_string(),
                expires_at,
            },
        );
    }

    /// Redeem a refresh token: removes and returns it if present and not
    /// expired. Single use; a second call with the same hash returns `None`.
    pub fn take_refresh_token(&self, token_hash: &str) -> Option<RefreshTokenRecord> {
        let (_, record) = self.refresh_tokens.remove(token_hash)?;
        if record.expires_at <= Utc::now() {
            return None;
        }
        Some(record)
    }

    /// Revoke all refresh tokens issued to a subject.
    pub fn revoke_refresh_tokens_for(&self, subject: &str) {
        self.refresh_tokens.retain(|_, record| record.subject != subject);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn duplicate_client_id_is_rejected() {
        let store = CredentialStore::new();
        store.register_client("c1", "App One", "s1", &["read"]).unwrap();
        let err = store.register_client("c1", "App Two", "s2", &[]).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateIdentity(id) if id == "c1"));
    }

    #[test]
    fn client_secret_verification() {
        let store = CredentialStore::new();
        store.register_client("c1", "App", "s1", &["read"]).unwrap();
        assert!(store.verify_client_secret("c1", "s1"));
        assert!(!store.verify_client_secret("c1", "wrong"));
        assert!(!store.verify_client_secret("unknown", "s1"));
    }

    #[test]
    fn duplicate_user_name_is_rejected() {
        let store = CredentialStore::new();
        store.register_user("alice", "Alice", "hash", &[]).unwrap();
        let err = store.register_user("alice", "Alice 2", "hash", &[]).unwrap_err();
        assert!(matches!(err, StoreError::DuplicateIdentity(_)));
    }

    #[test]
    fn role_claim_insert_is_idempotent() {
        let store = CredentialStore::new();
        store.upsert_role("Admin", "Admin Role.");
        assert!(store.add_role_claim("Admin", "Permissions.Roles.Read").unwrap());
        assert!(!store.add_role_claim("Admin", "Permissions.Roles.Read").unwrap());
        assert_eq!(store.all_role_claims().len(), 1);
    }

    #[test]
    fn add_role_claim_to_missing_role_fails() {
        let store = CredentialStore::new();
        let err = store.add_role_claim("Ghost", "Permissions.Roles.Read").unwrap_err();
        assert!(matches!(err, StoreError::RoleNotFound(_)));
    }

    #[test]
    fn set_role_claims_replaces_exactly() {
        let store = CredentialStore::new();
        store.upsert_role("Admin", "Admin Role.");
        store.add_role_claim("Admin", "Permissions.Roles.Read").unwrap();
        store.add_role_claim("Admin", "Permissions.Roles.Delete").unwrap();
        store
            .set_role_claims(
                "Admin",
                &[
                    "Permissions.Roles.Read".to_string(),
                    "Permissions.Users.Read".to_string(),
                ],
            )
            .unwrap();
        let claims = store.find_role("Admin").unwrap().claims;
        let values: Vec<&str> = claims.iter().map(|c| c.claim_value.as_str()).collect();
        assert!(values.contains(&"Permissions.Roles.Read"));
        assert!(values.contains(&"Permissions.Users.Read"));
        assert!(!values.contains(&"Permissions.Roles.Delete"));
    }

    #[test]
    fn set_role_claims_collapses_repeated_input_values() {
        let store = CredentialStore::new();
        store.upsert_role("Basic", "Basic Role.");
        store
            .set_role_claims(
                "Basic",
                &[
                    "Permissions.Employees.Read".to_string(),
                    "Permissions.Employees.Read".to_string(),
                ],
            )
            .unwrap();
        assert_eq!(
            store.all_role_claims(),
            vec![("Basic".to_string(), "Permissions.Employees.Read".to_string())]
        );
    }

    #[test]
    fn effective_permissions_include_basic_without_assignment() {
        let store = CredentialStore::new();
        store.upsert_role("Basic", "Basic Role.");
        let user_id = store.register_user("bob", "Bob", "hash", &["Basic"]).unwrap();
        let user = store.find_user(&user_id).unwrap();
        let names = store.effective_permissions(&user);
        assert!(names.contains(&"Permissions.Employees.Read".to_string()));
    }

    #[test]
    fn refresh_token_is_single_use() {
        let store = CredentialStore::new();
        let expires = Utc::now() + chrono::Duration::days(1);
        store.store_refresh_token("hash1", "u1", expires);
        assert!(store.take_refresh_token("hash1").is_some());
        assert!(store.take_refresh_token("hash1").is_none());
    }

    #[test]
    fn expired_refresh_token_is_not_redeemable() {
        let store = CredentialStore::new();
        let expired = Utc::now() - chrono::Duration::seconds(1);
        store.store_refresh_token("hash1", "u1", expired);
        assert!(store.take_refresh_token("hash1").is_none());
    }
}
