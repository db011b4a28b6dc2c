//! Shared test fixtures: in-memory database, seeded reference data,
//! and a fully wired ServerState.

use tally_server::auth::{CurrentUser, password};
use tally_server::core::{Config, ServerState};
use tally_server::db::DbService;
use tally_server::db::repository::{staff, user};

use shared::models::{Staff, Store, StoreCreate, User};

pub const TEST_PASSWORD: &str = "test-password-123";

/// Fresh state over an in-memory database (migrated + seeded)
pub async fn test_state() -> ServerState {
    let mut config = Config::with_overrides(
        std::env::temp_dir()
            .join("tally-tests")
            .to_string_lossy()
            .into_owned(),
        0,
    );
    config.jwt.secret = "integration-test-secret-key-0123456789abcdef".to_string();

    let db = DbService::new_in_memory().await.expect("in-memory database");
    ServerState::with_db(config, db)
}

pub async fn register_user(state: &ServerState, username: &str, email: &str) -> User {
    let password_hash = password::hash_password(TEST_PASSWORD).unwrap();
    user::create(&state.pool, username, email, &password_hash, true)
        .await
        .expect("create user")
}

pub fn current(user: &User) -> CurrentUser {
    CurrentUser {
        id: user.id,
        username: user.username.clone(),
        email: user.email.clone(),
    }
}

/// Register an owner and create their store (bootstraps the active
/// Admin staff row)
pub async fn owner_with_store(
    state: &ServerState,
    username: &str,
    store_name: &str,
) -> (User, Store, Staff) {
    let owner = register_user(state, username, &format!("{username}@example.com")).await;
    let store = state
        .onboarding()
        .create_store(
            &current(&owner),
            StoreCreate {
                name: store_name.to_string(),
                category: Some("grocery".to_string()),
                staff_count_hint: Some("1-5".to_string()),
            },
        )
        .await
        .expect("create store");

    let membership = staff::find_by_user_and_store(&state.pool, owner.id, store.id)
        .await
        .unwrap()
        .expect("owner staff row");

    (owner, store, membership)
}
