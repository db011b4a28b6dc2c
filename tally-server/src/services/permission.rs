//! Permission resolution engine
//!
//! A staff member's effective permission set is their role's permission
//! names combined with individually granted/denied overrides:
//!
//! ```text
//! effective = (role ∪ grants) \ denies
//! ```
//!
//! Deny always wins over a role grant, independent of the order the
//! override rows come back from the database. Expired overrides
//! (expires_at in the past) never participate; `expires_at = NULL`
//! never expires. The unique (staff_id, permission_id) index guarantees
//! at most one override per pair, so grant-then-deny leaves exactly one
//! row.

use std::collections::BTreeSet;

use sqlx::SqlitePool;

use crate::db::repository::{RepoResult, permission, role, staff};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{PermissionBreakdown, PermissionOverride};
use shared::util::now_millis;

/// Permission resolution and override management
#[derive(Clone)]
pub struct PermissionService {
    pool: SqlitePool,
}

impl PermissionService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Compute the effective permission set for a staff member.
    ///
    /// An unknown staff id or a staff with no role resolves to the
    /// empty set: a valid result, not an error.
    pub async fn resolve(&self, staff_id: i64) -> RepoResult<BTreeSet<String>> {
        let Some(staff) = staff::find_by_id(&self.pool, staff_id).await? else {
            return Ok(BTreeSet::new());
        };

        let mut permissions: BTreeSet<String> = match staff.role_id {
            Some(role_id) => role::permission_names(&self.pool, role_id)
                .await?
                .into_iter()
                .collect(),
            None => BTreeSet::new(),
        };

        let overrides = permission::active_overrides(&self.pool, staff_id, now_millis()).await?;

        // Grants first, then denies, so deny wins regardless of row order
        for (name, granted) in &overrides {
            if *granted {
                permissions.insert(name.clone());
            }
        }
        for (name, granted) in &overrides {
            if !*granted {
                permissions.remove(name);
            }
        }

        Ok(permissions)
    }

    /// Check a single permission
    pub async fn has_permission(&self, staff_id: i64, permission: &str) -> RepoResult<bool> {
        Ok(self.resolve(staff_id).await?.contains(permission))
    }

    /// Check whether the staff holds any of the given permissions
    pub async fn has_any(&self, staff_id: i64, permissions: &[&str]) -> RepoResult<bool> {
        let effective = self.resolve(staff_id).await?;
        Ok(permissions.iter().any(|p| effective.contains(*p)))
    }

    /// Check whether the staff holds all of the given permissions
    pub async fn has_all(&self, staff_id: i64, permissions: &[&str]) -> RepoResult<bool> {
        let effective = self.resolve(staff_id).await?;
        Ok(permissions.iter().all(|p| effective.contains(*p)))
    }

    /// `can(action, resource)`: sugar for `has_permission("{resource}.{action}")`
    pub async fn can(&self, staff_id: i64, action: &str, resource: &str) -> RepoResult<bool> {
        self.has_permission(staff_id, &format!("{resource}.{action}"))
            .await
    }

    /// Gate an action on a single permission
    pub async fn require(&self, staff_id: i64, permission: &str) -> AppResult<()> {
        if !self.has_permission(staff_id, permission).await? {
            return Err(AppError::forbidden(format!(
                "Permission denied. Required: {permission}"
            )));
        }
        Ok(())
    }

    /// Gate an action on any of the given permissions
    pub async fn require_any(&self, staff_id: i64, permissions: &[&str]) -> AppResult<()> {
        if !self.has_any(staff_id, permissions).await? {
            return Err(AppError::forbidden(format!(
                "Permission denied. Required any of: {}",
                permissions.join(", ")
            )));
        }
        Ok(())
    }

    /// Grant a permission override, replacing any existing override for
    /// the pair
    pub async fn grant(
        &self,
        staff_id: i64,
        permission_name: &str,
        reason: Option<String>,
        expires_at: Option<i64>,
    ) -> AppResult<PermissionOverride> {
        self.apply_override(staff_id, permission_name, true, reason, expires_at)
            .await
    }

    /// Deny a permission override, replacing any existing override for
    /// the pair
    pub async fn deny(
        &self,
        staff_id: i64,
        permission_name: &str,
        reason: Option<String>,
        expires_at: Option<i64>,
    ) -> AppResult<PermissionOverride> {
        self.apply_override(staff_id, permission_name, false, reason, expires_at)
            .await
    }

    async fn apply_override(
        &self,
        staff_id: i64,
        permission_name: &str,
        granted: bool,
        reason: Option<String>,
        expires_at: Option<i64>,
    ) -> AppResult<PermissionOverride> {
        let perm = permission::find_by_name(&self.pool, permission_name)
            .await?
            .ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::PermissionNotFound,
                    format!("Permission '{permission_name}' not found"),
                )
            })?;

        let row =
            permission::replace_override(&self.pool, staff_id, perm.id, granted, reason, expires_at)
                .await?;
        Ok(row)
    }

    /// Remove any override for (staff, permission), reverting to the
    /// role default. Returns whether a row existed.
    pub async fn remove_override(&self, staff_id: i64, permission_name: &str) -> AppResult<bool> {
        let perm = permission::find_by_name(&self.pool, permission_name)
            .await?
            .ok_or_else(|| {
                AppError::with_message(
                    ErrorCode::PermissionNotFound,
                    format!("Permission '{permission_name}' not found"),
                )
            })?;

        Ok(permission::delete_override(&self.pool, staff_id, perm.id).await?)
    }

    /// Administrative sweep deleting all expired override rows.
    /// Idempotent and safe to run concurrently; deleting zero rows is
    /// a valid outcome.
    pub async fn cleanup_expired(&self) -> RepoResult<u64> {
        permission::delete_expired(&self.pool, now_millis()).await
    }

    /// Detailed breakdown of a staff member's permissions and where
    /// each one comes from
    pub async fn details(&self, staff_id: i64) -> RepoResult<PermissionBreakdown> {
        let staff_row = staff::find_by_id(&self.pool, staff_id).await?;

        let (role_name, role_permissions) = match staff_row.as_ref().and_then(|s| s.role_id) {
            Some(role_id) => {
                let name = role::find_by_id(&self.pool, role_id)
                    .await?
                    .map(|r| r.name);
                let perms = role::permission_names(&self.pool, role_id).await?;
                (name, perms)
            }
            None => (None, Vec::new()),
        };

        let now = now_millis();
        let overrides = permission::active_override_details(&self.pool, staff_id, now).await?;

        let grants: BTreeSet<String> = overrides
            .iter()
            .filter(|o| o.granted)
            .map(|o| o.permission.clone())
            .collect();
        let denies: BTreeSet<String> = overrides
            .iter()
            .filter(|o| !o.granted)
            .map(|o| o.permission.clone())
            .collect();

        let role_set: BTreeSet<String> = role_permissions.iter().cloned().collect();
        let final_permissions: Vec<String> = role_set
            .union(&grants)
            .filter(|p| !denies.contains(*p))
            .cloned()
            .collect();

        Ok(PermissionBreakdown {
            staff_id,
            role_name,
            role_permissions,
            override_grants: grants.into_iter().collect(),
            override_denies: denies.into_iter().collect(),
            final_permissions,
            overrides,
        })
    }
}
