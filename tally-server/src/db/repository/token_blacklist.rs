//! Revoked Token Repository
//!
//! Bearer tokens invalidated before their natural expiry: logout and
//! refresh rotation. Inserts are idempotent (revoking twice is fine).

use super::RepoResult;
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;

pub async fn contains(pool: &SqlitePool, token: &str) -> RepoResult<bool> {
    let row: Option<(i64,)> = sqlx::query_as("SELECT id FROM revoked_token WHERE token = ? LIMIT 1")
        .bind(token)
        .fetch_optional(pool)
        .await?;
    Ok(row.is_some())
}

pub async fn add(pool: &SqlitePool, token: &str) -> RepoResult<()> {
    let id = snowflake_id();
    let now = now_millis();
    sqlx::query("INSERT OR IGNORE INTO revoked_token (id, token, created_at) VALUES (?, ?, ?)")
        .bind(id)
        .bind(token)
        .bind(now)
        .execute(pool)
        .await?;
    Ok(())
}

pub async fn add_all(pool: &SqlitePool, tokens: &[&str]) -> RepoResult<()> {
    for token in tokens {
        add(pool, token).await?;
    }
    Ok(())
}

/// Drop rows older than the cutoff; revoked tokens past their natural
/// expiry no longer need the blacklist entry.
pub async fn prune_older_than(pool: &SqlitePool, cutoff: i64) -> RepoResult<u64> {
    let rows = sqlx::query("DELETE FROM revoked_token WHERE created_at < ?")
        .bind(cutoff)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected())
}
