//! Store Repository

use super::RepoResult;
use shared::models::{Store, StoreCreate};
use shared::util::{now_millis, snowflake_id};
use sqlx::{SqliteConnection, SqlitePool};

const STORE_SELECT: &str =
    "SELECT id, name, category, staff_count_hint, owner_user_id, created_at FROM store";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Store>> {
    let sql = format!("{STORE_SELECT} WHERE id = ?");
    let store = sqlx::query_as::<_, Store>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(store)
}

pub async fn find_by_name(pool: &SqlitePool, name: &str) -> RepoResult<Option<Store>> {
    let sql = format!("{STORE_SELECT} WHERE name = ? LIMIT 1");
    let store = sqlx::query_as::<_, Store>(&sql)
        .bind(name)
        .fetch_optional(pool)
        .await?;
    Ok(store)
}

pub async fn find_by_owner(pool: &SqlitePool, owner_user_id: i64) -> RepoResult<Vec<Store>> {
    let sql = format!("{STORE_SELECT} WHERE owner_user_id = ? ORDER BY created_at");
    let stores = sqlx::query_as::<_, Store>(&sql)
        .bind(owner_user_id)
        .fetch_all(pool)
        .await?;
    Ok(stores)
}

/// Insert a store inside the caller's transaction.
///
/// The unique name index rejects duplicates; the caller maps
/// [`RepoError::Duplicate`] to its domain error.
pub async fn insert(
    conn: &mut SqliteConnection,
    owner_user_id: i64,
    data: &StoreCreate,
) -> RepoResult<Store> {
    let id = snowflake_id();
    let now = now_millis();
    sqlx::query(
        "INSERT INTO store (id, name, category, staff_count_hint, owner_user_id, created_at) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(&data.name)
    .bind(&data.category)
    .bind(&data.staff_count_hint)
    .bind(owner_user_id)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(Store {
        id,
        name: data.name.clone(),
        category: data.category.clone(),
        staff_count_hint: data.staff_count_hint.clone(),
        owner_user_id,
        created_at: now,
    })
}

/// Existence check usable mid-transaction
pub async fn exists(conn: &mut SqliteConnection, id: i64) -> RepoResult<bool> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM store WHERE id = ?")
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(row.is_some())
}
