//! Permission API Handlers
//!
//! Effective-permission queries and per-staff override management

use axum::{
    Json,
    extract::{Path, State},
};
use serde::Deserialize;

use crate::auth::StoreStaff;
use crate::core::ServerState;
use crate::db::repository::staff;
use crate::utils::validation::{MAX_NOTE_LEN, validate_optional_text};
use shared::error::{ApiResponse, AppError, AppResult, ErrorCode};
use shared::models::{PermissionBreakdown, Staff};
use shared::util::now_millis;

/// Grant or deny one permission for a staff member
#[derive(Debug, Deserialize)]
pub struct OverrideRequest {
    pub permission: String,
    pub granted: bool,
    pub reason: Option<String>,
    /// UTC millis; omitted = never expires
    pub expires_at: Option<i64>,
}

/// The target staff must belong to the store addressed in the path
async fn resolve_target(
    state: &ServerState,
    store_id: i64,
    staff_id: i64,
) -> AppResult<Staff> {
    let target = staff::find_by_id(&state.pool, staff_id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::StaffNotFound, format!("Staff {staff_id} not found"))
        })?;
    if target.store_id != store_id {
        return Err(AppError::new(ErrorCode::CrossStoreAccess));
    }
    Ok(target)
}

/// Effective permission names for a staff member
pub async fn effective(
    State(state): State<ServerState>,
    StoreStaff(_current_staff): StoreStaff,
    Path((store_id, staff_id)): Path<(i64, i64)>,
) -> AppResult<Json<Vec<String>>> {
    resolve_target(&state, store_id, staff_id).await?;
    let permissions = state.permissions().resolve(staff_id).await?;
    Ok(Json(permissions.into_iter().collect()))
}

/// Full breakdown: role permissions, grants, denies, final set
pub async fn details(
    State(state): State<ServerState>,
    StoreStaff(_current_staff): StoreStaff,
    Path((store_id, staff_id)): Path<(i64, i64)>,
) -> AppResult<Json<PermissionBreakdown>> {
    resolve_target(&state, store_id, staff_id).await?;
    let breakdown = state.permissions().details(staff_id).await?;
    Ok(Json(breakdown))
}

/// Apply a grant/deny override (roles.manage)
pub async fn apply_override(
    State(state): State<ServerState>,
    StoreStaff(current_staff): StoreStaff,
    Path((store_id, staff_id)): Path<(i64, i64)>,
    Json(payload): Json<OverrideRequest>,
) -> AppResult<Json<PermissionBreakdown>> {
    state
        .permissions()
        .require(current_staff.id, "roles.manage")
        .await?;
    resolve_target(&state, store_id, staff_id).await?;

    validate_optional_text(&payload.reason, "reason", MAX_NOTE_LEN)?;
    if let Some(expires_at) = payload.expires_at
        && expires_at <= now_millis()
    {
        return Err(AppError::validation("expires_at must be in the future"));
    }

    if payload.granted {
        state
            .permissions()
            .grant(staff_id, &payload.permission, payload.reason, payload.expires_at)
            .await?;
    } else {
        state
            .permissions()
            .deny(staff_id, &payload.permission, payload.reason, payload.expires_at)
            .await?;
    }

    let breakdown = state.permissions().details(staff_id).await?;
    Ok(Json(breakdown))
}

/// Remove an override, reverting to the role default (roles.manage)
pub async fn remove_override(
    State(state): State<ServerState>,
    StoreStaff(current_staff): StoreStaff,
    Path((store_id, staff_id, permission)): Path<(i64, i64, String)>,
) -> AppResult<ApiResponse<()>> {
    state
        .permissions()
        .require(current_staff.id, "roles.manage")
        .await?;
    resolve_target(&state, store_id, staff_id).await?;

    state
        .permissions()
        .remove_override(staff_id, &permission)
        .await?;
    Ok(ApiResponse::ok())
}
