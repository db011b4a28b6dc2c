//! User account lifecycle: uniqueness, soft delete, reactivation.

mod common;

use common::{register_user, test_state, TEST_PASSWORD};
use shared::error::ErrorCode;
use tally_server::auth::password;
use tally_server::db::repository::{RepoError, token_blacklist, user};
use shared::util::now_millis;

#[tokio::test]
async fn duplicate_username_and_email_are_conflicts() {
    let state = test_state().await;
    register_user(&state, "taken", "taken@example.com").await;

    let hash = password::hash_password(TEST_PASSWORD).unwrap();
    let err = user::create(&state.pool, "taken", "other@example.com", &hash, true)
        .await
        .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Business(ErrorCode::UsernameExists, _)
    ));

    let err = user::create(&state.pool, "someone-else", "taken@example.com", &hash, true)
        .await
        .unwrap_err();
    assert!(matches!(err, RepoError::Business(ErrorCode::EmailExists, _)));
}

#[tokio::test]
async fn soft_deleted_email_reactivates_with_new_credentials() {
    let state = test_state().await;
    let original = register_user(&state, "old-name", "comeback@example.com").await;

    assert!(user::soft_delete(&state.pool, original.id).await.unwrap());
    // Deleting twice is a no-op
    assert!(!user::soft_delete(&state.pool, original.id).await.unwrap());

    let new_hash = password::hash_password("a-brand-new-password").unwrap();
    let revived = user::create(
        &state.pool,
        "new-name",
        "comeback@example.com",
        &new_hash,
        true,
    )
    .await
    .unwrap();

    // Same row, new identity and credentials
    assert_eq!(revived.id, original.id);
    assert_eq!(revived.username, "new-name");
    assert!(revived.is_active);
    assert!(password::verify_password("a-brand-new-password", &revived.password_hash).unwrap());
}

#[tokio::test]
async fn update_rejects_taken_username_and_inactive_user() {
    let state = test_state().await;
    let a = register_user(&state, "alpha", "alpha@example.com").await;
    let b = register_user(&state, "beta", "beta@example.com").await;

    let err = user::update(
        &state.pool,
        b.id,
        &shared::models::UserUpdate {
            username: Some("alpha".to_string()),
            email: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Business(ErrorCode::UsernameExists, _)
    ));

    user::soft_delete(&state.pool, a.id).await.unwrap();
    let err = user::update(
        &state.pool,
        a.id,
        &shared::models::UserUpdate {
            username: Some("gamma".to_string()),
            email: None,
        },
    )
    .await
    .unwrap_err();
    assert!(matches!(
        err,
        RepoError::Business(ErrorCode::UserNotActive, _)
    ));
}

#[tokio::test]
async fn revoked_tokens_are_remembered_until_pruned() {
    let state = test_state().await;

    token_blacklist::add(&state.pool, "token-a").await.unwrap();
    // Revoking twice is idempotent
    token_blacklist::add(&state.pool, "token-a").await.unwrap();
    token_blacklist::add_all(&state.pool, &["token-b", "token-c"])
        .await
        .unwrap();

    assert!(token_blacklist::contains(&state.pool, "token-a").await.unwrap());
    assert!(token_blacklist::contains(&state.pool, "token-b").await.unwrap());
    assert!(!token_blacklist::contains(&state.pool, "token-z").await.unwrap());

    // Everything is newer than a past cutoff
    assert_eq!(
        token_blacklist::prune_older_than(&state.pool, now_millis() - 60_000)
            .await
            .unwrap(),
        0
    );
    // A future cutoff sweeps all three
    assert_eq!(
        token_blacklist::prune_older_than(&state.pool, now_millis() + 60_000)
            .await
            .unwrap(),
        3
    );
    assert!(!token_blacklist::contains(&state.pool, "token-a").await.unwrap());
}
