//! Role and Permission Models

use serde::{Deserialize, Serialize};

/// Role entity (RBAC 角色)
///
/// `store_id = None` means the role is global (seeded reference data);
/// otherwise it is scoped to a single store. Roles are immutable once
/// referenced by staff rows.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Role {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub store_id: Option<i64>,
}

/// Role with its granted permission names, for listings
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct RoleDetail {
    pub id: i64,
    pub name: String,
    pub description: Option<String>,
    pub store_id: Option<i64>,
    pub permissions: Vec<String>,
}

/// Permission reference data (`resource.action`, e.g. "products.view")
///
/// Seeded once at startup; effectively immutable.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Permission {
    pub id: i64,
    pub name: String,
    pub resource: String,
    pub action: String,
}

/// Per-staff permission override row
///
/// `granted = true` adds the permission on top of the role set,
/// `granted = false` removes it. An override is active iff `expires_at`
/// is null or in the future. At most one row exists per
/// (staff, permission) pair.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct PermissionOverride {
    pub id: i64,
    pub staff_id: i64,
    pub permission_id: i64,
    pub granted: bool,
    pub reason: Option<String>,
    pub created_at: i64,
    pub expires_at: Option<i64>,
}

/// Override row joined with the permission name, for breakdowns
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct OverrideDetail {
    pub permission: String,
    pub granted: bool,
    pub reason: Option<String>,
    pub expires_at: Option<i64>,
}

/// Full breakdown of a staff member's effective permissions
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PermissionBreakdown {
    pub staff_id: i64,
    pub role_name: Option<String>,
    pub role_permissions: Vec<String>,
    pub override_grants: Vec<String>,
    pub override_denies: Vec<String>,
    pub final_permissions: Vec<String>,
    pub overrides: Vec<OverrideDetail>,
}
