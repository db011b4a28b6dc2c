//! Role Repository
//!
//! Roles are reference data: seeded at startup, immutable once staff
//! rows point at them. Lookups only.

use super::RepoResult;
use shared::models::{Role, RoleDetail};
use sqlx::SqlitePool;

const ROLE_SELECT: &str = "SELECT id, name, description, store_id FROM role";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Role>> {
    let sql = format!("{ROLE_SELECT} WHERE id = ?");
    let role = sqlx::query_as::<_, Role>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(role)
}

pub async fn find_by_name(pool: &SqlitePool, name: &str) -> RepoResult<Option<Role>> {
    let sql = format!("{ROLE_SELECT} WHERE name = ? LIMIT 1");
    let role = sqlx::query_as::<_, Role>(&sql)
        .bind(name)
        .fetch_optional(pool)
        .await?;
    Ok(role)
}

/// Roles visible to a store: its own plus the global ones
pub async fn find_for_store(pool: &SqlitePool, store_id: i64) -> RepoResult<Vec<Role>> {
    let sql = format!("{ROLE_SELECT} WHERE store_id = ? OR store_id IS NULL ORDER BY name");
    let roles = sqlx::query_as::<_, Role>(&sql)
        .bind(store_id)
        .fetch_all(pool)
        .await?;
    Ok(roles)
}

/// Permission names granted to a role
pub async fn permission_names(pool: &SqlitePool, role_id: i64) -> RepoResult<Vec<String>> {
    let names: Vec<(String,)> = sqlx::query_as(
        "SELECT p.name FROM role_permission rp JOIN permission p ON rp.permission_id = p.id WHERE rp.role_id = ? ORDER BY p.name",
    )
    .bind(role_id)
    .fetch_all(pool)
    .await?;
    Ok(names.into_iter().map(|(name,)| name).collect())
}

/// Roles visible to a store with their permission sets attached
pub async fn details_for_store(pool: &SqlitePool, store_id: i64) -> RepoResult<Vec<RoleDetail>> {
    let roles = find_for_store(pool, store_id).await?;
    let mut details = Vec::with_capacity(roles.len());
    for role in roles {
        let permissions = permission_names(pool, role.id).await?;
        details.push(RoleDetail {
            id: role.id,
            name: role.name,
            description: role.description,
            store_id: role.store_id,
            permissions,
        });
    }
    Ok(details)
}
