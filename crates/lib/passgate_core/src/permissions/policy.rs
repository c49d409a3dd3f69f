//! Permission policy evaluation.
//!
//! A pure decision function: no state, no retries, one call per protected
//! operation.

use crate::claims::ClaimSet;

use super::{Action, Feature};

/// Outcome of a policy evaluation.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Decision {
    Allow,
    Deny,
}

impl Decision {
    pub fn is_allowed(self) -> bool {
        matches!(self, Decision::Allow)
    }
}

/// Decide whether a claim set satisfies the `(feature, action)` permission.
///
/// Pairs absent from the catalog always deny; no permission can be silently
/// satisfied. A claim set allows either through a `"permission"` claim equal
/// to the canonical name, or through the scope flag used by client-credential
/// tokens (lower-cased action name with value `"true"`).
pub fn authorize(claims: &ClaimSet, feature: Feature, action: Action) -> Decision {
    let Some(permission) = super::find(feature, action) else {
        return Decision::Deny;
    };
    if claims.has_permission(&permission.name()) {
        return Decision::Allow;
    }
    if claims.has_scope(permission.action.scope_name()) {
        return Decision::Allow;
    }
    Decision::Deny
}
