//! Reference data seeding
//!
//! Permissions are fixed `resource.action` pairs; the three global roles
//! carry their default permission sets. Seeding is idempotent: existing
//! rows are left untouched, so it runs unconditionally at every startup.

use super::repository::{RepoResult, permission, role};
use shared::util::snowflake_id;
use sqlx::SqlitePool;

/// All seeded permissions as (name, resource, action)
pub const PERMISSIONS: &[(&str, &str, &str)] = &[
    ("products.view", "products", "view"),
    ("products.create", "products", "create"),
    ("products.edit", "products", "edit"),
    ("products.delete", "products", "delete"),
    ("sales.view", "sales", "view"),
    ("sales.create", "sales", "create"),
    ("sales.delete", "sales", "delete"),
    ("sales.edit", "sales", "edit"),
    ("staff.view", "staff", "view"),
    ("staff.create", "staff", "create"),
    ("staff.invite", "staff", "invite"),
    ("staff.delete", "staff", "delete"),
    ("roles.manage", "roles", "manage"),
    ("analytics.view", "analytics", "view"),
];

/// Manager role default permission set
const MANAGER_PERMISSIONS: &[&str] = &[
    "products.view",
    "products.create",
    "products.edit",
    "sales.view",
    "sales.create",
    "sales.edit",
    "analytics.view",
];

/// Sales Rep role default permission set
const SALES_REP_PERMISSIONS: &[&str] = &[
    "products.view",
    "sales.view",
    "sales.create",
    "analytics.view",
];

/// Seed permissions and the global roles (Admin, Manager, Sales Rep)
pub async fn seed_reference_data(pool: &SqlitePool) -> RepoResult<()> {
    for (name, resource, action) in PERMISSIONS {
        if permission::find_by_name(pool, name).await?.is_none() {
            let id = snowflake_id();
            sqlx::query(
                "INSERT INTO permission (id, name, resource, action) VALUES (?, ?, ?, ?)",
            )
            .bind(id)
            .bind(name)
            .bind(resource)
            .bind(action)
            .execute(pool)
            .await?;
        }
    }

    let all: Vec<&str> = PERMISSIONS.iter().map(|(name, _, _)| *name).collect();
    seed_role(pool, "Admin", "Full access", &all).await?;
    seed_role(pool, "Manager", "Limited management access", MANAGER_PERMISSIONS).await?;
    seed_role(pool, "Sales Rep", "Limited sales access", SALES_REP_PERMISSIONS).await?;

    Ok(())
}

async fn seed_role(
    pool: &SqlitePool,
    name: &str,
    description: &str,
    permissions: &[&str],
) -> RepoResult<()> {
    let role_id = match role::find_by_name(pool, name).await? {
        Some(existing) => existing.id,
        None => {
            let id = snowflake_id();
            sqlx::query(
                "INSERT INTO role (id, name, description, store_id) VALUES (?, ?, ?, NULL)",
            )
            .bind(id)
            .bind(name)
            .bind(description)
            .execute(pool)
            .await?;
            tracing::info!(role = name, "Seeded role");
            id
        }
    };

    for perm_name in permissions {
        if let Some(perm) = permission::find_by_name(pool, perm_name).await? {
            sqlx::query(
                "INSERT OR IGNORE INTO role_permission (role_id, permission_id) VALUES (?, ?)",
            )
            .bind(role_id)
            .bind(perm.id)
            .execute(pool)
            .await?;
        }
    }

    Ok(())
}
