//! Role and role-claim management endpoints.
//!
//! Every handler declares the permission its operation requires before
//! touching the store.

use axum::{
    Extension, Json,
    extract::{Path, State},
};
use serde::{Deserialize, Serialize};
use tracing::info;

use passgate_core::permissions::{self, Action, Feature};

use crate::AppState;
use crate::error::{ApiError, ApiResult};
use crate::middleware::auth::AuthenticatedPrincipal;
use crate::middleware::permission::ensure_permission;

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleSummary {
    pub name: String,
    pub description: String,
}

#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RolePermissions {
    pub role: String,
    pub permissions: Vec<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UpdateRolePermissions {
    pub permissions: Vec<String>,
}

/// GET /api/roles — list defined roles.
pub async fn list_roles(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthenticatedPrincipal>,
) -> ApiResult<Json<Vec<RoleSummary>>> {
    ensure_permission(&principal, Feature::Roles, Action::Read)?;

    let mut roles: Vec<RoleSummary> = state
        .store
        .role_names()
        .into_iter()
        .filter_map(|name| state.store.find_role(&name))
        .map(|role| RoleSummary {
            name: role.name,
            description: role.description,
        })
        .collect();
    roles.sort_by(|a, b| a.name.cmp(&b.name));
    Ok(Json(roles))
}

/// GET /api/roles/{role}/permissions — permission claims granted to a role.
pub async fn role_permissions(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthenticatedPrincipal>,
    Path(role): Path<String>,
) -> ApiResult<Json<RolePermissions>> {
    ensure_permission(&principal, Feature::RoleClaims, Action::Read)?;

    let role = state
        .store
        .find_role(&role)
        .ok_or_else(|| ApiError::NotFound(format!("Role {role} not found")))?;

    let mut permissions: Vec<String> =
        role.claims.into_iter().map(|c| c.claim_value).collect();
    permissions.sort();
    Ok(Json(RolePermissions {
        role: role.name,
        permissions,
    }))
}

/// PUT /api/roles/{role}/permissions — replace a role's permission claims.
///
/// Every submitted name must be in the permission catalog; unknown names
/// reject the whole request rather than being silently dropped.
pub async fn update_role_permissions(
    State(state): State<AppState>,
    Extension(principal): Extension<AuthenticatedPrincipal>,
    Path(role): Path<String>,
    Json(body): Json<UpdateRolePermissions>,
) -> ApiResult<Json<RolePermissions>> {
    ensure_permission(&principal, Feature::RoleClaims, Action::Update)?;

    for name in &body.permissions {
        if !permissions::is_known_name(name) {
            return Err(ApiError::Validation(format!("Unknown permission {name}")));
        }
    }

    state.store.set_role_claims(&role, &body.permissions)?;
    info!(role, count = body.permissions.len(), "role permissions replaced");

    let mut permissions = body.permissions;
    permissions.sort();
    permissions.dedup();
    Ok(Json(RolePermissions { role, permissions }))
}
