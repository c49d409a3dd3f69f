//! The closed permission catalog.
//!
//! Every permission the system understands is a `(feature, action)` pair in
//! the constant table below. Basic permissions are granted to every identity
//! implicitly; the rest require explicit role membership.

pub mod policy;

use std::fmt;

/// Features gated by permissions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Feature {
    Users,
    UserRoles,
    Roles,
    RoleClaims,
    Employees,
}

impl Feature {
    pub fn as_str(self) -> &'static str {
        match self {
            Feature::Users => "Users",
            Feature::UserRoles => "UserRoles",
            Feature::Roles => "Roles",
            Feature::RoleClaims => "RoleClaims",
            Feature::Employees => "Employees",
        }
    }
}

impl fmt::Display for Feature {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Actions a permission can grant on a feature.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Action {
    Create,
    Read,
    Update,
    Delete,
}

impl Action {
    pub fn as_str(self) -> &'static str {
        match self {
            Action::Create => "Create",
            Action::Read => "Read",
            Action::Update => "Update",
            Action::Delete => "Delete",
        }
    }

    /// Scope flag name used by client-credential tokens (`read`, `write`...).
    pub fn scope_name(self) -> &'static str {
        match self {
            Action::Create => "create",
            Action::Read => "read",
            Action::Update => "update",
            Action::Delete => "delete",
        }
    }
}

impl fmt::Display for Action {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Grouping of permissions for presentation and role assignment.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PermissionGroup {
    SystemAccess,
    ManagementHierarchy,
}

/// An addressable `(feature, action)` capability.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Permission {
    pub feature: Feature,
    pub action: Action,
    pub group: PermissionGroup,
    pub description: &'static str,
    pub is_basic: bool,
}

impl Permission {
    const fn new(
        feature: Feature,
        action: Action,
        group: PermissionGroup,
        description: &'static str,
    ) -> Self {
        Self {
            feature,
            action,
            group,
            description,
            is_basic: false,
        }
    }

    const fn basic(
        feature: Feature,
        action: Action,
        group: PermissionGroup,
        description: &'static str,
    ) -> Self {
        Self {
            feature,
            action,
            group,
            description,
            is_basic: true,
        }
    }

    /// Canonical permission name: `Permissions.{feature}.{action}`.
    pub fn name(&self) -> String {
        name_for(self.feature, self.action)
    }
}

/// Canonical policy name for a `(feature, action)` pair.
pub fn name_for(feature: Feature, action: Action) -> String {
    format!("Permissions.{}.{}", feature.as_str(), action.as_str())
}

/// Every permission the system understands.
pub const ALL: &[Permission] = &[
    Permission::new(
        Feature::Users,
        Action::Create,
        PermissionGroup::SystemAccess,
        "Create Users",
    ),
    Permission::new(
        Feature::Users,
        Action::Read,
        PermissionGroup::SystemAccess,
        "Read Users",
    ),
    Permission::new(
        Feature::Users,
        Action::Update,
        PermissionGroup::SystemAccess,
        "Update Users",
    ),
    Permission::new(
        Feature::Users,
        Action::Delete,
        PermissionGroup::SystemAccess,
        "Delete Users",
    ),
    // User-role assignments are created by the application, so only read and
    // update are addressable.
    Permission::new(
        Feature::UserRoles,
        Action::Read,
        PermissionGroup::SystemAccess,
        "Read User Roles",
    ),
    Permission::new(
        Feature::UserRoles,
        Action::Update,
        PermissionGroup::SystemAccess,
        "Update User Roles",
    ),
    Permission::new(
        Feature::Roles,
        Action::Create,
        PermissionGroup::SystemAccess,
        "Create Roles",
    ),
    Permission::new(
        Feature::Roles,
        Action::Read,
        PermissionGroup::SystemAccess,
        "Read Roles",
    ),
    Permission::new(
        Feature::Roles,
        Action::Update,
        PermissionGroup::SystemAccess,
        "Update Roles",
    ),
    Permission::new(
        Feature::Roles,
        Action::Delete,
        PermissionGroup::SystemAccess,
        "Delete Roles",
    ),
    // Role claims follow the same rule as user roles.
    Permission::new(
        Feature::RoleClaims,
        Action::Read,
        PermissionGroup::SystemAccess,
        "Read Role Claims",
    ),
    Permission::new(
        Feature::RoleClaims,
        Action::Update,
        PermissionGroup::SystemAccess,
        "Update Role Claims",
    ),
    // Every identity may read employees, so this one is basic.
    Permission::basic(
        Feature::Employees,
        Action::Read,
        PermissionGroup::ManagementHierarchy,
        "Read Employees",
    ),
    Permission::new(
        Feature::Employees,
        Action::Create,
        PermissionGroup::ManagementHierarchy,
        "Create Employees",
    ),
    Permission::new(
        Feature::Employees,
        Action::Update,
        PermissionGroup::ManagementHierarchy,
        "Update Employees",
    ),
    Permission::new(
        Feature::Employees,
        Action::Delete,
        PermissionGroup::ManagementHierarchy,
        "Delete Employees",
    ),
];

/// Look up a catalog entry. `None` means the pair is not addressable.
pub fn find(feature: Feature, action: Action) -> Option<&'static Permission> {
    ALL.iter()
        .find(|p| p.feature == feature && p.action == action)
}

/// Whether a string is a canonical name of a catalog entry.
pub fn is_known_name(name: &str) -> bool {
    ALL.iter().any(|p| p.name() == name)
}

/// Permissions that require explicit role membership.
pub fn privileged() -> impl Iterator<Item = &'static Permission> {
    ALL.iter().filter(|p| !p.is_basic)
}

/// Permissions granted to every identity without explicit assignment.
pub fn basic() -> impl Iterator<Item = &'static Permission> {
    ALL.iter().filter(|p| p.is_basic)
}
