//! Staff Repository

use super::{RepoError, RepoResult};
use shared::error::ErrorCode;
use shared::models::{Staff, StaffDetail, StaffStatus};
use shared::util::{now_millis, snowflake_id};
use sqlx::{SqliteConnection, SqlitePool};

const STAFF_SELECT: &str =
    "SELECT id, user_id, store_id, role_id, status, is_active, created_at FROM staff";

const STAFF_DETAIL_SELECT: &str = "SELECT s.id, s.user_id, s.store_id, s.status, s.is_active, \
     r.name AS role, u.username AS name, u.email \
     FROM staff s \
     JOIN user u ON s.user_id = u.id \
     LEFT JOIN role r ON s.role_id = r.id";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Staff>> {
    let sql = format!("{STAFF_SELECT} WHERE id = ?");
    let staff = sqlx::query_as::<_, Staff>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(staff)
}

/// All staff memberships of one user, across stores
pub async fn find_by_user(pool: &SqlitePool, user_id: i64) -> RepoResult<Vec<Staff>> {
    let sql = format!("{STAFF_SELECT} WHERE user_id = ? ORDER BY created_at");
    let rows = sqlx::query_as::<_, Staff>(&sql)
        .bind(user_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn find_by_user_and_store(
    pool: &SqlitePool,
    user_id: i64,
    store_id: i64,
) -> RepoResult<Option<Staff>> {
    let sql = format!("{STAFF_SELECT} WHERE user_id = ? AND store_id = ? LIMIT 1");
    let staff = sqlx::query_as::<_, Staff>(&sql)
        .bind(user_id)
        .bind(store_id)
        .fetch_optional(pool)
        .await?;
    Ok(staff)
}

/// Insert a staff row inside the caller's transaction.
///
/// The unique (user_id, store_id) index is the authority on membership
/// uniqueness; a violation surfaces as [`RepoError::Business`] with
/// [`ErrorCode::StaffAlreadyExists`] so concurrent creates cannot race
/// past an application-level existence check.
pub async fn insert(
    conn: &mut SqliteConnection,
    user_id: i64,
    store_id: i64,
    role_id: Option<i64>,
    status: StaffStatus,
) -> RepoResult<Staff> {
    let id = snowflake_id();
    let now = now_millis();
    let result = sqlx::query(
        "INSERT INTO staff (id, user_id, store_id, role_id, status, is_active, created_at) VALUES (?, ?, ?, ?, ?, 1, ?)",
    )
    .bind(id)
    .bind(user_id)
    .bind(store_id)
    .bind(role_id)
    .bind(status)
    .bind(now)
    .execute(&mut *conn)
    .await;

    match result {
        Ok(_) => Ok(Staff {
            id,
            user_id,
            store_id,
            role_id,
            status,
            is_active: true,
            created_at: now,
        }),
        Err(err) => match RepoError::from(err) {
            RepoError::Duplicate(_) => Err(RepoError::Business(
                ErrorCode::StaffAlreadyExists,
                "Staff already exists for this user and store".into(),
            )),
            other => Err(other),
        },
    }
}

pub async fn set_status(pool: &SqlitePool, staff_id: i64, status: StaffStatus) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE staff SET status = ? WHERE id = ?")
        .bind(status)
        .bind(staff_id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::Business(
            ErrorCode::StaffNotFound,
            format!("Staff {staff_id} not found"),
        ));
    }
    Ok(())
}

/// Update status and/or role reference
pub async fn update(
    pool: &SqlitePool,
    staff_id: i64,
    status: Option<StaffStatus>,
    role_id: Option<i64>,
) -> RepoResult<Staff> {
    let rows = sqlx::query(
        "UPDATE staff SET status = COALESCE(?1, status), role_id = COALESCE(?2, role_id) WHERE id = ?3",
    )
    .bind(status)
    .bind(role_id)
    .bind(staff_id)
    .execute(pool)
    .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::Business(
            ErrorCode::StaffNotFound,
            format!("Staff {staff_id} not found"),
        ));
    }
    find_by_id(pool, staff_id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Staff {staff_id} not found")))
}

/// All active staff of a store, joined with user and role details
pub async fn details_for_store(pool: &SqlitePool, store_id: i64) -> RepoResult<Vec<StaffDetail>> {
    let sql = format!("{STAFF_DETAIL_SELECT} WHERE s.store_id = ? AND s.is_active = 1 ORDER BY s.created_at");
    let rows = sqlx::query_as::<_, StaffDetail>(&sql)
        .bind(store_id)
        .fetch_all(pool)
        .await?;
    Ok(rows)
}

pub async fn detail_by_id(pool: &SqlitePool, staff_id: i64) -> RepoResult<Option<StaffDetail>> {
    let sql = format!("{STAFF_DETAIL_SELECT} WHERE s.id = ?");
    let row = sqlx::query_as::<_, StaffDetail>(&sql)
        .bind(staff_id)
        .fetch_optional(pool)
        .await?;
    Ok(row)
}

/// Users to notify for a store: every staff member plus the owner
pub async fn notification_emails(pool: &SqlitePool, store_id: i64) -> RepoResult<Vec<String>> {
    let rows: Vec<(String,)> = sqlx::query_as(
        "SELECT DISTINCT u.email FROM user u \
         WHERE u.is_active = 1 AND (u.id IN (SELECT user_id FROM staff WHERE store_id = ?1 AND is_active = 1) \
            OR u.id = (SELECT owner_user_id FROM store WHERE id = ?1))",
    )
    .bind(store_id)
    .fetch_all(pool)
    .await?;
    Ok(rows.into_iter().map(|(email,)| email).collect())
}
