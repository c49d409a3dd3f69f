//! Idempotent provisioning of default roles, role claims, and identities.
//!
//! Runs once at process start, before request traffic is accepted. Safe to
//! run on every restart: existing rows are left untouched and duplicate
//! insertions from racing instances are treated as already-seeded.

use tracing::{debug, info};

use crate::auth::AuthError;
use crate::auth::password::hash_password;
use crate::permissions;
use crate::store::{CredentialStore, StoreError};

/// Default role granted every privileged permission.
pub const ADMIN_ROLE: &str = "Admin";
/// Default role granted only the basic permissions.
pub const BASIC_ROLE: &str = "Basic";

pub const DEFAULT_ROLES: &[&str] = &[ADMIN_ROLE, BASIC_ROLE];

/// Development seed identities. Override or remove before exposing the
/// authority outside a trusted environment.
pub const ADMIN_USER_NAME: &str = "admin";
const ADMIN_DISPLAY_NAME: &str = "Administrator";
pub const BASIC_USER_NAME: &str = "johnd";
const BASIC_DISPLAY_NAME: &str = "John Doe";
pub const SEED_PASSWORD: &str = "Passgate123!";

pub const DEMO_CLIENT_ID: &str = "ef9073b5-06d6-438e-a8c3-e6e76170dfca";
const DEMO_CLIENT_NAME: &str = "WebApp";
pub const DEMO_CLIENT_SECRET: &str = "x8h3pS6hYkUu9n5Z";
const DEMO_CLIENT_SCOPES: &[&str] = &["read", "write", "delete"];

/// What a seeding run actually changed. A second run against the same store
/// reports all zeros.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct SeedReport {
    pub roles_created: usize,
    pub claims_added: usize,
    pub users_registered: usize,
    pub clients_registered: usize,
}

impl SeedReport {
    pub fn is_noop(&self) -> bool {
        *self == SeedReport::default()
    }
}

/// Provision default roles, their permission claims, and the development
/// identities. Check-before-insert throughout.
pub fn seed(store: &CredentialStore) -> Result<SeedReport, AuthError> {
    let mut report = SeedReport::default();

    seed_roles(store, &mut report)?;
    seed_users(store, &mut report)?;
    seed_demo_client(store, &mut report)?;

    info!(
        roles_created = report.roles_created,
        claims_added = report.claims_added,
        users_registered = report.users_registered,
        clients_registered = report.clients_registered,
        "seeding complete"
    );
    Ok(report)
}

fn seed_roles(store: &CredentialStore, report: &mut SeedReport) -> Result<(), AuthError> {
    for role_name in DEFAULT_ROLES {
        if store.upsert_role(role_name, &format!("{role_name} Role.")) {
            report.roles_created += 1;
        }

        let assigned: Vec<String> = if *role_name == ADMIN_ROLE {
            permissions::privileged().map(|p| p.name()).collect()
        } else {
            permissions::basic().map(|p| p.name()).collect()
        };

        for name in assigned {
            match store.add_role_claim(role_name, &name) {
                Ok(true) => report.claims_added += 1,
                Ok(false) => {
                    debug!(role = role_name, claim = %name, "role claim already seeded");
                }
                Err(e) => return Err(e.into()),
            }
        }
    }
    Ok(())
}

fn seed_users(store: &CredentialStore, report: &mut SeedReport) -> Result<(), AuthError> {
    let defaults = [
        (ADMIN_USER_NAME, ADMIN_DISPLAY_NAME, DEFAULT_ROLES),
        (BASIC_USER_NAME, BASIC_DISPLAY_NAME, &[BASIC_ROLE][..]),
    ];

    for (user_name, display_name, roles) in defaults {
        if store.find_user_by_name(user_name).is_some() {
            continue;
        }
        let password_hash = hash_password(SEED_PASSWORD)?;
        match store.register_user(user_name, display_name, &password_hash, roles) {
            Ok(_) => report.users_registered += 1,
            // A racing instance registered it first; already-seeded.
            Err(StoreError::DuplicateIdentity(name)) => {
                debug!(user = %name, "user already seeded");
            }
            Err(e) => return Err(e.into()),
        }
    }
    Ok(())
}

fn seed_demo_client(store: &CredentialStore, report: &mut SeedReport) -> Result<(), AuthError> {
    match store.register_client(
        DEMO_CLIENT_ID,
        DEMO_CLIENT_NAME,
        DEMO_CLIENT_SECRET,
        DEMO_CLIENT_SCOPES,
    ) {
        Ok(()) => report.clients_registered += 1,
        Err(StoreError::DuplicateIdentity(id)) => {
            debug!(client = %id, "client already seeded");
        }
        Err(e) => return Err(e.into()),
    }
    Ok(())
}
