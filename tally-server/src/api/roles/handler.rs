//! Role API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::auth::StoreStaff;
use crate::core::ServerState;
use crate::db::repository::role;
use shared::error::AppResult;
use shared::models::RoleDetail;

/// List roles visible to the store (its own plus global roles) with
/// their permission sets
pub async fn list(
    State(state): State<ServerState>,
    StoreStaff(_current_staff): StoreStaff,
    Path(store_id): Path<i64>,
) -> AppResult<Json<Vec<RoleDetail>>> {
    let roles = role::details_for_store(&state.pool, store_id).await?;
    Ok(Json(roles))
}
