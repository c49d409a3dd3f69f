//! Structured claim model and its wire shape.
//!
//! Internally claims are typed [`Claim`] entries collected in a [`ClaimSet`];
//! the flat string-keyed JWT payload ([`TokenClaims`]) exists only at the
//! wire boundary.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

/// Claim type under which permission names travel.
pub const PERMISSION_CLAIM_TYPE: &str = "permission";

/// A typed fact about an authenticated principal.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Claim {
    /// Display name of the principal.
    DisplayName(String),
    /// A granted permission, by canonical name.
    Permission(String),
    /// A scope flag, serialized as `{"<scope>": "true"}`.
    Scope(String),
}

/// The claims extracted from (or destined for) a token.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ClaimSet {
    subject: String,
    claims: Vec<Claim>,
}

impl ClaimSet {
    pub fn new(subject: impl Into<String>) -> Self {
        Self {
            subject: subject.into(),
            claims: Vec::new(),
        }
    }

    /// The token subject (`sub`): client id or user id.
    pub fn subject(&self) -> &str {
        &self.subject
    }

    pub fn push(&mut self, claim: Claim) {
        self.claims.push(claim);
    }

    pub fn with(mut self, claim: Claim) -> Self {
        self.push(claim);
        self
    }

    pub fn display_name(&self) -> Option<&str> {
        self.claims.iter().find_map(|c| match c {
            Claim::DisplayName(name) => Some(name.as_str()),
            _ => None,
        })
    }

    /// Whether a `"permission"`-typed claim with this exact value is present.
    pub fn has_permission(&self, name: &str) -> bool {
        self.claims
            .iter()
            .any(|c| matches!(c, Claim::Permission(v) if v == name))
    }

    /// Whether a scope flag with this name is present.
    pub fn has_scope(&self, name: &str) -> bool {
        self.claims
            .iter()
            .any(|c| matches!(c, Claim::Scope(v) if v == name))
    }

    pub fn iter(&self) -> impl Iterator<Item = &Claim> {
        self.claims.iter()
    }

    pub fn is_empty(&self) -> bool {
        self.claims.is_empty()
    }
}

/// Wire shape of the JWT payload: a flat string-keyed map.
///
/// Permission claims collect under the `permission` key; scope flags are
/// top-level `"true"`-valued entries captured by the flattened map.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct TokenClaims {
    /// Subject — client id or user id.
    pub sub: String,
    /// Display name of the principal.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    /// Issued at (unix timestamp).
    pub iat: i64,
    /// Expiry (unix timestamp).
    pub exp: i64,
    /// Canonical permission names granted to the principal.
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub permission: Vec<String>,
    /// Scope flags, e.g. `{"read": "true"}`.
    #[serde(flatten)]
    pub scopes: BTreeMap<String, String>,
}

impl TokenClaims {
    /// Convert the wire payload into the structured claim set.
    ///
    /// Scope entries whose value is not the literal `"true"` are dropped; a
    /// scope is granted or absent, never `"false"`.
    pub fn claim_set(&self) -> ClaimSet {
        let mut set = ClaimSet::new(self.sub.clone());
        if let Some(name) = &self.name {
            set.push(Claim::DisplayName(name.clone()));
        }
        for value in &self.permission {
            set.push(Claim::Permission(value.clone()));
        }
        for (key, value) in &self.scopes {
            if value == "true" {
                set.push(Claim::Scope(key.clone()));
            }
        }
        set
    }
}
