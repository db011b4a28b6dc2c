//! Store creation bootstrap and the staff invitation flow.

mod common;

use common::{current, owner_with_store, register_user, test_state, TEST_PASSWORD};
use http::StatusCode;
use shared::error::ErrorCode;
use shared::models::{StaffStatus, StaffUpdate, StoreCreate};
use tally_server::auth::{JwtConfig, JwtService};
use tally_server::db::repository::{staff, user};
use tally_server::db::seed;
use tally_server::services::{InviteAccept, StaffInvite};

#[tokio::test]
async fn store_creation_bootstraps_owner_as_active_admin() {
    let state = test_state().await;
    let (owner, store, membership) = owner_with_store(&state, "acme-owner", "Acme").await;

    assert_eq!(store.owner_user_id, owner.id);
    assert_eq!(membership.status, StaffStatus::Active);
    assert!(membership.is_active);

    // The owner immediately holds the full Admin permission set,
    // without any invitation step
    let effective = state.permissions().resolve(membership.id).await.unwrap();
    assert_eq!(effective.len(), seed::PERMISSIONS.len());
    for (name, _, _) in seed::PERMISSIONS {
        assert!(effective.contains(*name), "missing {name}");
    }
}

#[tokio::test]
async fn duplicate_store_name_is_a_conflict() {
    let state = test_state().await;
    let (_owner, _store, _) = owner_with_store(&state, "first", "Acme").await;

    let other = register_user(&state, "second", "second@example.com").await;
    let err = state
        .onboarding()
        .create_store(
            &current(&other),
            StoreCreate {
                name: "Acme".to_string(),
                category: None,
                staff_count_hint: None,
            },
        )
        .await
        .unwrap_err();

    assert_eq!(err.code, ErrorCode::StoreNameExists);
    assert_eq!(err.http_status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn duplicate_staff_membership_is_a_conflict_regardless_of_status() {
    let state = test_state().await;
    let (owner, store, _) = owner_with_store(&state, "dup-owner", "Dup Mart").await;

    // The owner already has an active membership
    let err = state
        .onboarding()
        .create_staff(owner.id, store.id, "Manager", StaffStatus::Pending)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::StaffAlreadyExists);

    // Same for a pending membership
    let clerk = register_user(&state, "dup-clerk", "dup-clerk@example.com").await;
    state
        .onboarding()
        .create_staff(clerk.id, store.id, "Sales Rep", StaffStatus::Pending)
        .await
        .unwrap();
    let err = state
        .onboarding()
        .create_staff(clerk.id, store.id, "Sales Rep", StaffStatus::Active)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::StaffAlreadyExists);
    assert_eq!(err.http_status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn create_staff_requires_existing_store_and_role() {
    let state = test_state().await;
    let (_owner, store, _) = owner_with_store(&state, "ref-owner", "Ref Shop").await;
    let clerk = register_user(&state, "ref-clerk", "ref-clerk@example.com").await;

    let err = state
        .onboarding()
        .create_staff(clerk.id, 424242, "Sales Rep", StaffStatus::Pending)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::StoreNotFound);

    let err = state
        .onboarding()
        .create_staff(clerk.id, store.id, "Janitor", StaffStatus::Pending)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::RoleNotFound);
}

#[tokio::test]
async fn invitation_creates_pending_staff_and_acceptance_activates() {
    let state = test_state().await;
    let (owner, store, _) = owner_with_store(&state, "inv-owner", "Invite Mart").await;

    // Invite an address with no existing account
    let membership = state
        .onboarding()
        .invite_staff(
            store.id,
            &current(&owner),
            StaffInvite {
                email: "newhire@example.com".to_string(),
                role: "Sales Rep".to_string(),
            },
        )
        .await
        .unwrap();
    assert_eq!(membership.status, StaffStatus::Pending);

    // The user was auto-created (with a generated password)
    let invited = user::find_by_email(&state.pool, "newhire@example.com")
        .await
        .unwrap()
        .expect("invited user exists");
    assert_eq!(invited.username, "newhire");

    // Redeem: pending -> active
    let token = state
        .jwt_service()
        .generate_invitation_token("newhire@example.com", store.id, "Sales Rep")
        .unwrap();
    let activated = state
        .onboarding()
        .accept_invitation(InviteAccept {
            token: token.clone(),
            username: "ignored".to_string(),
            password: "ignored-password".to_string(),
        })
        .await
        .unwrap();
    assert_eq!(activated.id, membership.id);
    assert_eq!(activated.status, StaffStatus::Active);

    // Redeeming again: membership exists and is no longer pending
    let err = state
        .onboarding()
        .accept_invitation(InviteAccept {
            token,
            username: "ignored".to_string(),
            password: "ignored-password".to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::StaffNotPending);
    assert_eq!(err.http_status(), StatusCode::CONFLICT);
}

#[tokio::test]
async fn accepting_without_prior_invite_row_creates_active_staff_directly() {
    let state = test_state().await;
    let (_owner, store, _) = owner_with_store(&state, "direct-owner", "Direct Shop").await;

    let token = state
        .jwt_service()
        .generate_invitation_token("walkin@example.com", store.id, "Manager")
        .unwrap();

    let membership = state
        .onboarding()
        .accept_invitation(InviteAccept {
            token,
            username: "walkin".to_string(),
            password: TEST_PASSWORD.to_string(),
        })
        .await
        .unwrap();

    // Exactly one new user and one active membership
    assert_eq!(membership.status, StaffStatus::Active);
    let joined = user::find_by_email(&state.pool, "walkin@example.com")
        .await
        .unwrap()
        .expect("user created");
    assert_eq!(joined.username, "walkin");
    let row = staff::find_by_user_and_store(&state.pool, joined.id, store.id)
        .await
        .unwrap()
        .expect("staff created");
    assert_eq!(row.id, membership.id);
}

#[tokio::test]
async fn expired_or_tampered_invitations_are_unauthorized() {
    let state = test_state().await;
    let (_owner, store, _) = owner_with_store(&state, "exp-owner", "Expired Mart").await;

    // Same secret, TTL already in the past
    let expired_issuer = JwtService::with_config(JwtConfig {
        invitation_expiration_minutes: -5,
        ..state.jwt_service().config.clone()
    });
    let token = expired_issuer
        .generate_invitation_token("late@example.com", store.id, "Sales Rep")
        .unwrap();

    let err = state
        .onboarding()
        .accept_invitation(InviteAccept {
            token,
            username: "late".to_string(),
            password: TEST_PASSWORD.to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvitationExpired);
    assert_eq!(err.http_status(), StatusCode::UNAUTHORIZED);

    // Signed with a different key
    let forged_issuer = JwtService::with_config(JwtConfig {
        secret: "a-wrong-secret-key-for-forged-invitations-1".to_string(),
        ..state.jwt_service().config.clone()
    });
    let token = forged_issuer
        .generate_invitation_token("forged@example.com", store.id, "Sales Rep")
        .unwrap();

    let err = state
        .onboarding()
        .accept_invitation(InviteAccept {
            token,
            username: "forged".to_string(),
            password: TEST_PASSWORD.to_string(),
        })
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::InvitationInvalid);
    assert_eq!(err.http_status(), StatusCode::UNAUTHORIZED);
}

#[tokio::test]
async fn reinviting_non_pending_staff_is_a_conflict() {
    let state = test_state().await;
    let (owner, store, _) = owner_with_store(&state, "re-owner", "Re Mart").await;

    let clerk = register_user(&state, "re-clerk", "re-clerk@example.com").await;
    state
        .onboarding()
        .create_staff(clerk.id, store.id, "Sales Rep", StaffStatus::Active)
        .await
        .unwrap();

    let err = state
        .onboarding()
        .invite_staff(
            store.id,
            &current(&owner),
            StaffInvite {
                email: "re-clerk@example.com".to_string(),
                role: "Sales Rep".to_string(),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::StaffNotPending);
}

#[tokio::test]
async fn resend_invitation_guards() {
    let state = test_state().await;
    let (owner, store, owner_staff) = owner_with_store(&state, "rs-owner", "Resend Mart").await;
    let (other_owner, other_store, _) =
        owner_with_store(&state, "rs-other", "Other Mart").await;

    // Pending invitee
    let membership = state
        .onboarding()
        .invite_staff(
            store.id,
            &current(&owner),
            StaffInvite {
                email: "resendee@example.com".to_string(),
                role: "Sales Rep".to_string(),
            },
        )
        .await
        .unwrap();

    // Happy path
    state
        .onboarding()
        .resend_invitation(store.id, &current(&owner), membership.id)
        .await
        .unwrap();

    // Wrong store
    let err = state
        .onboarding()
        .resend_invitation(other_store.id, &current(&other_owner), membership.id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::CrossStoreAccess);

    // Not pending (the owner's own membership is active)
    let err = state
        .onboarding()
        .resend_invitation(store.id, &current(&owner), owner_staff.id)
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::StaffNotPending);
}

#[tokio::test]
async fn staff_update_changes_status_and_role() {
    let state = test_state().await;
    let (_owner, store, _) = owner_with_store(&state, "up-owner", "Update Mart").await;

    let clerk = register_user(&state, "up-clerk", "up-clerk@example.com").await;
    let membership = state
        .onboarding()
        .create_staff(clerk.id, store.id, "Sales Rep", StaffStatus::Active)
        .await
        .unwrap();

    let updated = state
        .onboarding()
        .update_staff(
            store.id,
            StaffUpdate {
                staff_id: membership.id,
                status: Some(StaffStatus::Inactive),
                role: Some("Manager".to_string()),
            },
        )
        .await
        .unwrap();
    assert_eq!(updated.status, StaffStatus::Inactive);

    let effective = state.permissions().resolve(membership.id).await.unwrap();
    assert!(effective.contains("products.create")); // Manager set now

    // Unknown role
    let err = state
        .onboarding()
        .update_staff(
            store.id,
            StaffUpdate {
                staff_id: membership.id,
                status: None,
                role: Some("Astronaut".to_string()),
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::RoleNotFound);

    // Cross-store update rejected
    let (_o2, store2, _) = owner_with_store(&state, "up-other", "Update Other").await;
    let err = state
        .onboarding()
        .update_staff(
            store2.id,
            StaffUpdate {
                staff_id: membership.id,
                status: Some(StaffStatus::Active),
                role: None,
            },
        )
        .await
        .unwrap_err();
    assert_eq!(err.code, ErrorCode::CrossStoreAccess);
}
