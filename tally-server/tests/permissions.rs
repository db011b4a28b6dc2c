//! Permission resolution: role set plus grant/deny overrides with
//! expiry semantics.

mod common;

use std::collections::BTreeSet;

use common::{owner_with_store, register_user, test_state};
use shared::error::ErrorCode;
use shared::models::StaffStatus;
use shared::util::now_millis;
use tally_server::db::repository::permission as override_repo;
use tally_server::db::repository::staff;

fn set(names: &[&str]) -> BTreeSet<String> {
    names.iter().map(|s| s.to_string()).collect()
}

#[tokio::test]
async fn effective_permissions_are_role_union_grants_minus_denies() {
    let state = test_state().await;
    let (_owner, store, _) = owner_with_store(&state, "maria", "Corner Shop").await;

    let clerk = register_user(&state, "clerk", "clerk@example.com").await;
    let membership = state
        .onboarding()
        .create_staff(clerk.id, store.id, "Sales Rep", StaffStatus::Active)
        .await
        .unwrap();

    // Role baseline
    let effective = state.permissions().resolve(membership.id).await.unwrap();
    assert_eq!(
        effective,
        set(&["analytics.view", "products.view", "sales.create", "sales.view"])
    );

    // Grant a permission outside the role
    state
        .permissions()
        .grant(membership.id, "products.delete", None, None)
        .await
        .unwrap();
    // Deny one the role grants
    state
        .permissions()
        .deny(membership.id, "sales.view", Some("till audit".into()), None)
        .await
        .unwrap();

    let effective = state.permissions().resolve(membership.id).await.unwrap();
    assert_eq!(
        effective,
        set(&["analytics.view", "products.delete", "products.view", "sales.create"])
    );

    assert!(
        state
            .permissions()
            .has_permission(membership.id, "products.delete")
            .await
            .unwrap()
    );
    assert!(
        !state
            .permissions()
            .has_permission(membership.id, "sales.view")
            .await
            .unwrap()
    );
    assert!(
        state
            .permissions()
            .has_any(membership.id, &["sales.view", "sales.create"])
            .await
            .unwrap()
    );
    assert!(
        !state
            .permissions()
            .has_all(membership.id, &["sales.view", "sales.create"])
            .await
            .unwrap()
    );
    assert!(
        state
            .permissions()
            .can(membership.id, "view", "products")
            .await
            .unwrap()
    );
}

#[tokio::test]
async fn deny_override_wins_over_role_grant() {
    let state = test_state().await;
    let (_owner, store, _) = owner_with_store(&state, "li", "Li Mart").await;

    let rep = register_user(&state, "rep", "rep@example.com").await;
    let membership = state
        .onboarding()
        .create_staff(rep.id, store.id, "Sales Rep", StaffStatus::Active)
        .await
        .unwrap();

    state
        .permissions()
        .deny(membership.id, "sales.view", None, None)
        .await
        .unwrap();

    let effective = state.permissions().resolve(membership.id).await.unwrap();
    assert!(!effective.contains("sales.view"));
    assert!(effective.contains("products.view"));
}

#[tokio::test]
async fn expired_overrides_never_apply() {
    let state = test_state().await;
    let (_owner, store, _) = owner_with_store(&state, "ade", "Ade Stores").await;

    let rep = register_user(&state, "rep2", "rep2@example.com").await;
    let membership = state
        .onboarding()
        .create_staff(rep.id, store.id, "Sales Rep", StaffStatus::Active)
        .await
        .unwrap();

    // Already-expired deny: must not remove the permission
    state
        .permissions()
        .deny(membership.id, "sales.view", None, Some(now_millis() - 1_000))
        .await
        .unwrap();
    let effective = state.permissions().resolve(membership.id).await.unwrap();
    assert!(effective.contains("sales.view"));

    // Null expiry never expires
    state
        .permissions()
        .deny(membership.id, "sales.view", None, None)
        .await
        .unwrap();
    let effective = state.permissions().resolve(membership.id).await.unwrap();
    assert!(!effective.contains("sales.view"));

    // Future expiry applies until it passes
    state
        .permissions()
        .grant(
            membership.id,
            "staff.view",
            Some("covering the weekend".into()),
            Some(now_millis() + 60_000),
        )
        .await
        .unwrap();
    let effective = state.permissions().resolve(membership.id).await.unwrap();
    assert!(effective.contains("staff.view"));
}

#[tokio::test]
async fn grant_then_deny_leaves_exactly_one_row() {
    let state = test_state().await;
    let (_owner, store, _) = owner_with_store(&state, "ken", "Ken's Deli").await;

    let rep = register_user(&state, "rep3", "rep3@example.com").await;
    let membership = state
        .onboarding()
        .create_staff(rep.id, store.id, "Sales Rep", StaffStatus::Active)
        .await
        .unwrap();

    state
        .permissions()
        .grant(membership.id, "products.edit", None, None)
        .await
        .unwrap();
    state
        .permissions()
        .deny(membership.id, "products.edit", None, None)
        .await
        .unwrap();

    let rows = override_repo::overrides_for_staff(&state.pool, membership.id)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert!(!rows[0].granted);
}

#[tokio::test]
async fn cleanup_sweeps_only_expired_rows_and_is_idempotent() {
    let state = test_state().await;
    let (_owner, store, _) = owner_with_store(&state, "sam", "Samwise Goods").await;

    let rep = register_user(&state, "rep4", "rep4@example.com").await;
    let membership = state
        .onboarding()
        .create_staff(rep.id, store.id, "Sales Rep", StaffStatus::Active)
        .await
        .unwrap();

    state
        .permissions()
        .grant(membership.id, "products.edit", None, Some(now_millis() - 500))
        .await
        .unwrap();
    state
        .permissions()
        .deny(membership.id, "sales.view", None, None)
        .await
        .unwrap();

    assert_eq!(state.permissions().cleanup_expired().await.unwrap(), 1);
    // Deleting zero rows is a valid outcome, not an error
    assert_eq!(state.permissions().cleanup_expired().await.unwrap(), 0);

    let rows = override_repo::overrides_for_staff(&state.pool, membership.id)
        .await
        .unwrap();
    assert_eq!(rows.len(), 1);
    assert!(!rows[0].granted);
}

#[tokio::test]
async fn remove_override_reverts_to_role_default() {
    let state = test_state().await;
    let (_owner, store, _) = owner_with_store(&state, "ines", "Ines Market").await;

    let rep = register_user(&state, "rep5", "rep5@example.com").await;
    let membership = state
        .onboarding()
        .create_staff(rep.id, store.id, "Sales Rep", StaffStatus::Active)
        .await
        .unwrap();

    state
        .permissions()
        .deny(membership.id, "sales.view", None, None)
        .await
        .unwrap();
    assert!(
        !state
            .permissions()
            .resolve(membership.id)
            .await
            .unwrap()
            .contains("sales.view")
    );

    let removed = state
        .permissions()
        .remove_override(membership.id, "sales.view")
        .await
        .unwrap();
    assert!(removed);
    assert!(
        state
            .permissions()
            .resolve(membership.id)
            .await
            .unwrap()
            .contains("sales.view")
    );

    // Removing again finds nothing
    let removed = state
        .permissions()
        .remove_override(membership.id, "sales.view")
        .await
        .unwrap();
    assert!(!removed);
}

#[tokio::test]
async fn unknown_staff_and_roleless_staff_resolve_to_empty() {
    let state = test_state().await;
    let (_owner, store, _) = owner_with_store(&state, "noor", "Noor & Co").await;

    // Unknown staff id: empty set, not an error
    let effective = state.permissions().resolve(999_999).await.unwrap();
    assert!(effective.is_empty());

    // Staff with no role assigned
    let drifter = register_user(&state, "drifter", "drifter@example.com").await;
    let mut conn = state.pool.acquire().await.unwrap();
    let membership = staff::insert(&mut conn, drifter.id, store.id, None, StaffStatus::Active)
        .await
        .unwrap();
    drop(conn);

    let effective = state.permissions().resolve(membership.id).await.unwrap();
    assert!(effective.is_empty());
}

#[tokio::test]
async fn grant_of_unknown_permission_is_not_found() {
    let state = test_state().await;
    let (_owner, store, _) = owner_with_store(&state, "theo", "Theo's").await;

    let rep = register_user(&state, "rep6", "rep6@example.com").await;
    let membership = state
        .onboarding()
        .create_staff(rep.id, store.id, "Sales Rep", StaffStatus::Active)
        .await
        .unwrap();

    let err = state
        .permissions()
        .grant(membership.id, "warehouse.teleport", None, None)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::PermissionNotFound);
}

#[tokio::test]
async fn details_break_down_sources() {
    let state = test_state().await;
    let (_owner, store, _) = owner_with_store(&state, "vera", "Vera Foods").await;

    let rep = register_user(&state, "rep7", "rep7@example.com").await;
    let membership = state
        .onboarding()
        .create_staff(rep.id, store.id, "Sales Rep", StaffStatus::Active)
        .await
        .unwrap();

    state
        .permissions()
        .grant(membership.id, "products.delete", Some("stocktake".into()), None)
        .await
        .unwrap();
    state
        .permissions()
        .deny(membership.id, "sales.view", None, None)
        .await
        .unwrap();

    let breakdown = state.permissions().details(membership.id).await.unwrap();
    assert_eq!(breakdown.role_name.as_deref(), Some("Sales Rep"));
    assert!(breakdown.role_permissions.contains(&"sales.view".to_string()));
    assert_eq!(breakdown.override_grants, vec!["products.delete".to_string()]);
    assert_eq!(breakdown.override_denies, vec!["sales.view".to_string()]);
    assert!(!breakdown.final_permissions.contains(&"sales.view".to_string()));
    assert!(
        breakdown
            .final_permissions
            .contains(&"products.delete".to_string())
    );
    assert_eq!(breakdown.overrides.len(), 2);
}
