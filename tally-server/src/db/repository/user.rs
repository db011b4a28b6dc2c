//! User Repository

use super::{RepoError, RepoResult};
use shared::error::ErrorCode;
use shared::models::{User, UserUpdate};
use shared::util::{now_millis, snowflake_id};
use sqlx::SqlitePool;

const USER_SELECT: &str = "SELECT id, username, email, password_hash, profile_image_url, is_active, created_at, updated_at FROM user";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<User>> {
    let sql = format!("{USER_SELECT} WHERE id = ?");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_by_email(pool: &SqlitePool, email: &str) -> RepoResult<Option<User>> {
    let sql = format!("{USER_SELECT} WHERE email = ? LIMIT 1");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(email)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_by_username(pool: &SqlitePool, username: &str) -> RepoResult<Option<User>> {
    let sql = format!("{USER_SELECT} WHERE username = ? LIMIT 1");
    let user = sqlx::query_as::<_, User>(&sql)
        .bind(username)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

/// Create a new user with an already-hashed password.
///
/// A soft-deleted account with the same email is reactivated in place
/// with the new username and password instead of raising a conflict.
pub async fn create(
    pool: &SqlitePool,
    username: &str,
    email: &str,
    password_hash: &str,
    is_active: bool,
) -> RepoResult<User> {
    let sql = format!("{USER_SELECT} WHERE username = ? OR email = ? LIMIT 1");
    let existing = sqlx::query_as::<_, User>(&sql)
        .bind(username)
        .bind(email)
        .fetch_optional(pool)
        .await?;

    if let Some(existing) = existing {
        if existing.username == username && existing.is_active {
            return Err(RepoError::Business(
                ErrorCode::UsernameExists,
                format!("Username '{username}' already exists"),
            ));
        }
        if existing.email == email {
            if existing.is_active {
                return Err(RepoError::Business(
                    ErrorCode::EmailExists,
                    format!("Email '{email}' already exists"),
                ));
            }
            // Reactivate with updated username and password
            let now = now_millis();
            sqlx::query(
                "UPDATE user SET username = ?, password_hash = ?, is_active = 1, updated_at = ? WHERE id = ?",
            )
            .bind(username)
            .bind(password_hash)
            .bind(now)
            .bind(existing.id)
            .execute(pool)
            .await?;
            return find_by_id(pool, existing.id)
                .await?
                .ok_or_else(|| RepoError::Database("Failed to reactivate user".into()));
        }
    }

    let id = snowflake_id();
    let now = now_millis();
    sqlx::query(
        "INSERT INTO user (id, username, email, password_hash, is_active, created_at, updated_at) VALUES (?, ?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(username)
    .bind(email)
    .bind(password_hash)
    .bind(is_active)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create user".into()))
}

/// Update username/email
pub async fn update(pool: &SqlitePool, id: i64, data: &UserUpdate) -> RepoResult<User> {
    let existing = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Business(ErrorCode::UserNotFound, format!("User {id} not found")))?;

    if !existing.is_active {
        return Err(RepoError::Business(
            ErrorCode::UserNotActive,
            "User is not active".into(),
        ));
    }

    if let Some(ref username) = data.username
        && username != &existing.username
        && find_by_username(pool, username).await?.is_some()
    {
        return Err(RepoError::Business(
            ErrorCode::UsernameExists,
            format!("Username '{username}' already exists"),
        ));
    }

    if let Some(ref email) = data.email
        && email != &existing.email
        && find_by_email(pool, email).await?.is_some()
    {
        return Err(RepoError::Business(
            ErrorCode::EmailExists,
            format!("Email '{email}' already exists"),
        ));
    }

    let now = now_millis();
    sqlx::query(
        "UPDATE user SET username = COALESCE(?1, username), email = COALESCE(?2, email), updated_at = ?3 WHERE id = ?4",
    )
    .bind(&data.username)
    .bind(&data.email)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("User {id} not found")))
}

pub async fn update_password(pool: &SqlitePool, id: i64, password_hash: &str) -> RepoResult<()> {
    let now = now_millis();
    let rows = sqlx::query("UPDATE user SET password_hash = ?, updated_at = ? WHERE id = ?")
        .bind(password_hash)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::Business(
            ErrorCode::UserNotFound,
            format!("User {id} not found"),
        ));
    }
    Ok(())
}

pub async fn update_profile_image(pool: &SqlitePool, id: i64, url: &str) -> RepoResult<()> {
    let now = now_millis();
    sqlx::query("UPDATE user SET profile_image_url = ?, updated_at = ? WHERE id = ?")
        .bind(url)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Soft delete: the row stays, `is_active = 0` gates all access
pub async fn soft_delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let now = now_millis();
    let rows = sqlx::query("UPDATE user SET is_active = 0, updated_at = ? WHERE id = ? AND is_active = 1")
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(rows.rows_affected() > 0)
}
