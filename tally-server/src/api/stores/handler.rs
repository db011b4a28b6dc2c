//! Store API Handlers
//!
//! Store creation, the staff invitation flow, and staff listings

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use crate::auth::{CurrentUser, StoreStaff};
use crate::core::ServerState;
use crate::db::repository::{staff, store};
use crate::services::{InviteAccept, StaffInvite};
use crate::utils::validation::{MAX_SHORT_TEXT_LEN, validate_optional_text};
use shared::error::{ApiResponse, AppError, AppResult, ErrorCode};
use shared::models::{Staff, StaffDetail, StaffUpdate, Store, StoreCreate};

#[derive(Debug, Deserialize)]
pub struct ResendInvitation {
    pub staff_id: i64,
}

/// Create a store; the caller becomes its owner with an active Admin
/// membership
pub async fn create(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<StoreCreate>,
) -> AppResult<Json<Store>> {
    validate_optional_text(&payload.category, "category", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.staff_count_hint, "staff count", MAX_SHORT_TEXT_LEN)?;

    let new_store = state.onboarding().create_store(&user, payload).await?;
    Ok(Json(new_store))
}

/// List the caller's own stores
pub async fn list_own(
    State(state): State<ServerState>,
    user: CurrentUser,
) -> AppResult<Json<Vec<Store>>> {
    let stores = store::find_by_owner(&state.pool, user.id).await?;
    Ok(Json(stores))
}

/// Invite a staff member by email (staff.create or staff.invite)
pub async fn invite_staff(
    State(state): State<ServerState>,
    StoreStaff(current_staff): StoreStaff,
    user: CurrentUser,
    Path(store_id): Path<i64>,
    Json(payload): Json<StaffInvite>,
) -> AppResult<Json<Staff>> {
    state
        .permissions()
        .require_any(current_staff.id, &["staff.create", "staff.invite"])
        .await?;

    let membership = state
        .onboarding()
        .invite_staff(store_id, &user, payload)
        .await?;
    Ok(Json(membership))
}

/// Re-send the invitation mail for a pending staff member (staff.invite)
pub async fn resend_invitation(
    State(state): State<ServerState>,
    StoreStaff(current_staff): StoreStaff,
    user: CurrentUser,
    Path(store_id): Path<i64>,
    Json(payload): Json<ResendInvitation>,
) -> AppResult<ApiResponse<()>> {
    state
        .permissions()
        .require(current_staff.id, "staff.invite")
        .await?;

    state
        .onboarding()
        .resend_invitation(store_id, &user, payload.staff_id)
        .await?;
    Ok(ApiResponse::ok())
}

/// Redeem an invitation token (public route; the invited user may not
/// have credentials yet)
pub async fn accept_invitation(
    State(state): State<ServerState>,
    Json(payload): Json<InviteAccept>,
) -> AppResult<Json<Staff>> {
    let membership = state.onboarding().accept_invitation(payload).await?;
    Ok(Json(membership))
}

/// Update a staff member's status and/or role (roles.manage)
pub async fn update_staff(
    State(state): State<ServerState>,
    StoreStaff(current_staff): StoreStaff,
    Path(store_id): Path<i64>,
    Json(payload): Json<StaffUpdate>,
) -> AppResult<Json<Staff>> {
    state
        .permissions()
        .require(current_staff.id, "roles.manage")
        .await?;

    let updated = state.onboarding().update_staff(store_id, payload).await?;
    Ok(Json(updated))
}

/// List all active staff of the store
pub async fn list_staff(
    State(state): State<ServerState>,
    StoreStaff(_current_staff): StoreStaff,
    Path(store_id): Path<i64>,
) -> AppResult<Json<Vec<StaffDetail>>> {
    let members = staff::details_for_store(&state.pool, store_id).await?;
    Ok(Json(members))
}

/// Get one staff member's details
pub async fn staff_detail(
    State(state): State<ServerState>,
    StoreStaff(_current_staff): StoreStaff,
    Path((store_id, staff_id)): Path<(i64, i64)>,
) -> AppResult<Json<StaffDetail>> {
    let detail = staff::detail_by_id(&state.pool, staff_id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::StaffNotFound, format!("Staff {staff_id} not found"))
        })?;

    if detail.store_id != store_id {
        return Err(AppError::new(ErrorCode::CrossStoreAccess));
    }

    Ok(Json(detail))
}
