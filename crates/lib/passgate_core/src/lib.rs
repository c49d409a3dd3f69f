//! # passgate_core
//!
//! Core auth domain logic for Passgate: credential store, permission catalog,
//! claims model, token issuance/validation, and role seeding.

pub mod auth;
pub mod claims;
pub mod models;
pub mod permissions;
pub mod seed;
pub mod store;

/// Returns the crate version.
pub fn version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
