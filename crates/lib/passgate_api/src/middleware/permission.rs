//! Permission guard for protected operations.

use passgate_core::permissions::policy::{self, Decision};
use passgate_core::permissions::{Action, Feature, name_for};

use super::auth::AuthenticatedPrincipal;
use crate::error::ApiError;

/// Require a `(feature, action)` permission for the current request.
///
/// Handlers call this first, declaring the permission the operation needs.
/// An authenticated caller without the permission gets 403, distinct from
/// the 401 an unauthenticated caller receives.
pub fn ensure_permission(
    principal: &AuthenticatedPrincipal,
    feature: Feature,
    action: Action,
) -> Result<(), ApiError> {
    match policy::authorize(&principal.0, feature, action) {
        Decision::Allow => Ok(()),
        Decision::Deny => Err(ApiError::Forbidden(format!(
            "Missing permission {}",
            name_for(feature, action)
        ))),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use passgate_core::claims::{Claim, ClaimSet};

    #[test]
    fn allowed_claim_passes_and_missing_claim_is_forbidden() {
        let principal = AuthenticatedPrincipal(
            ClaimSet::new("u1").with(Claim::Permission("Permissions.Roles.Read".into())),
        );
        assert!(ensure_permission(&principal, Feature::Roles, Action::Read).is_ok());

        let err = ensure_permission(&principal, Feature::Roles, Action::Delete).unwrap_err();
        assert!(matches!(err, ApiError::Forbidden(_)));
    }
}
