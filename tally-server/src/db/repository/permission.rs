//! Permission and Override Repository
//!
//! Permission rows are seeded reference data. Override rows are the
//! per-staff grant/deny exceptions; the unique (staff_id, permission_id)
//! index keeps at most one logical override per pair, so replace is
//! delete-then-insert inside one transaction.

use super::RepoResult;
use shared::models::{OverrideDetail, Permission, PermissionOverride};
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;

const PERMISSION_SELECT: &str = "SELECT id, name, resource, action FROM permission";

pub async fn find_by_name(pool: &SqlitePool, name: &str) -> RepoResult<Option<Permission>> {
    let sql = format!("{PERMISSION_SELECT} WHERE name = ? LIMIT 1");
    let permission = sqlx::query_as::<_, Permission>(&sql)
        .bind(name)
        .fetch_optional(pool)
        .await?;
    Ok(permission)
}

pub async fn find_all(pool: &SqlitePool) -> RepoResult<Vec<Permission>> {
    let sql = format!("{PERMISSION_SELECT} ORDER BY name");
    let permissions = sqlx::query_as::<_, Permission>(&sql).fetch_all(pool).await?;
    Ok(permissions)
}

/// Active (non-expired) overrides for a staff member as
/// (permission name, granted) pairs, read in a single query so the
/// caller sees one consistent snapshot.
pub async fn active_overrides(
    pool: &SqlitePool,
    staff_id: i64,
    now: i64,
) -> RepoResult<Vec<(String, bool)>> {
    let rows: Vec<(String, bool)> = sqlx::query_as(
        "SELECT p.name, o.granted FROM staff_permission_override o \
         JOIN permission p ON o.permission_id = p.id \
         WHERE o.staff_id = ? AND (o.expires_at IS NULL OR o.expires_at > ?)",
    )
    .bind(staff_id)
    .bind(now)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Active overrides with reason and expiry, for permission breakdowns
pub async fn active_override_details(
    pool: &SqlitePool,
    staff_id: i64,
    now: i64,
) -> RepoResult<Vec<OverrideDetail>> {
    let rows = sqlx::query_as::<_, OverrideDetail>(
        "SELECT p.name AS permission, o.granted, o.reason, o.expires_at \
         FROM staff_permission_override o \
         JOIN permission p ON o.permission_id = p.id \
         WHERE o.staff_id = ? AND (o.expires_at IS NULL OR o.expires_at > ?) \
         ORDER BY p.name",
    )
    .bind(staff_id)
    .bind(now)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// All override rows for a staff member, expired included
pub async fn overrides_for_staff(
    pool: &SqlitePool,
    staff_id: i64,
) -> RepoResult<Vec<PermissionOverride>> {
    let rows = sqlx::query_as::<_, PermissionOverride>(
        "SELECT id, staff_id, permission_id, granted, reason, created_at, expires_at \
         FROM staff_permission_override WHERE staff_id = ? ORDER BY created_at",
    )
    .bind(staff_id)
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

/// Replace the override for (staff, permission): delete any existing
/// row(s) for the pair, then insert exactly one with the requested
/// `granted` value. Runs in its own transaction.
pub async fn replace_override(
    pool: &SqlitePool,
    staff_id: i64,
    permission_id: i64,
    granted: bool,
    reason: Option<String>,
    expires_at: Option<i64>,
) -> RepoResult<PermissionOverride> {
    let mut tx = pool.begin().await?;

    sqlx::query("DELETE FROM staff_permission_override WHERE staff_id = ? AND permission_id = ?")
        .bind(staff_id)
        .bind(permission_id)
        .execute(&mut *tx)
        .await?;

    let id = snowflake_id();
    let now = now_millis();
    sqlx::query(
        "INSERT INTO staff_permission_override (id, staff_id, permission_id, granted, reason, created_at, expires_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(staff_id)
    .bind(permission_id)
    .bind(granted)
    .bind(&reason)
    .bind(now)
    .bind(expires_at)
    .execute(&mut *tx)
    .await?;

    tx.commit().await?;

    Ok(PermissionOverride {
        id,
        staff_id,
        permission_id,
        granted,
        reason,
        created_at: now,
        expires_at,
    })
}

/// Delete the override for (staff, permission), reverting to the role
/// default. Returns whether a row was removed.
pub async fn delete_override(
    pool: &SqlitePool,
    staff_id: i64,
    permission_id: i64,
) -> RepoResult<bool> {
    let rows = sqlx::query(
        "DELETE FROM staff_permission_override WHERE staff_id = ? AND permission_id = ?",
    )
    .bind(staff_id)
    .bind(permission_id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Sweep-delete every override whose expiry has passed. Idempotent;
/// deleting zero rows is a valid outcome.
pub async fn delete_expired(pool: &SqlitePool, now: i64) -> RepoResult<u64> {
    let rows = sqlx::query(
        "DELETE FROM staff_permission_override WHERE expires_at IS NOT NULL AND expires_at <= ?",
    )
    .bind(now)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected())
}
