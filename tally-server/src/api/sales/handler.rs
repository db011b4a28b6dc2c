//! Sales API Handlers

use axum::{
    Json,
    extract::{Path, State},
};

use crate::auth::StoreStaff;
use crate::core::ServerState;
use crate::db::repository::sale;
use crate::utils::validation::{MAX_SHORT_TEXT_LEN, validate_required_text};
use shared::error::{ApiResponse, AppError, AppResult, ErrorCode};
use shared::models::{SaleCreate, SaleWithItems, SalesStats};

/// Record a sale (sales.create)
pub async fn create(
    State(state): State<ServerState>,
    StoreStaff(current_staff): StoreStaff,
    Path(store_id): Path<i64>,
    Json(payload): Json<SaleCreate>,
) -> AppResult<Json<SaleWithItems>> {
    state
        .permissions()
        .require(current_staff.id, "sales.create")
        .await?;

    validate_required_text(&payload.payment_method, "payment method", MAX_SHORT_TEXT_LEN)?;
    if payload.amount_paid < 0.0 {
        return Err(AppError::validation("amount paid must be non-negative"));
    }
    for line in &payload.items {
        if line.quantity <= 0 {
            return Err(AppError::validation("item quantity must be positive"));
        }
        if line.unit_price < 0.0 {
            return Err(AppError::validation("unit price must be non-negative"));
        }
    }

    let recorded = state
        .sales()
        .create_sale(store_id, current_staff.user_id, payload)
        .await?;
    Ok(Json(recorded))
}

/// List the store's sales, newest first (sales.view)
pub async fn list(
    State(state): State<ServerState>,
    StoreStaff(current_staff): StoreStaff,
    Path(store_id): Path<i64>,
) -> AppResult<Json<Vec<SaleWithItems>>> {
    state
        .permissions()
        .require(current_staff.id, "sales.view")
        .await?;

    let sales = sale::find_by_store(&state.pool, store_id).await?;
    Ok(Json(sales))
}

/// Soft-delete a sale (sales.delete)
pub async fn delete(
    State(state): State<ServerState>,
    StoreStaff(current_staff): StoreStaff,
    Path((store_id, sale_id)): Path<(i64, i64)>,
) -> AppResult<ApiResponse<()>> {
    state
        .permissions()
        .require(current_staff.id, "sales.delete")
        .await?;

    let existing = sale::find_by_id(&state.pool, sale_id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::SaleNotFound, format!("Sale {sale_id} not found"))
        })?;
    if existing.store_id != store_id {
        return Err(AppError::new(ErrorCode::CrossStoreAccess));
    }

    sale::soft_delete(&state.pool, sale_id, current_staff.user_id).await?;
    Ok(ApiResponse::ok())
}

/// Aggregate statistics (analytics.view)
pub async fn stats(
    State(state): State<ServerState>,
    StoreStaff(current_staff): StoreStaff,
    Path(store_id): Path<i64>,
) -> AppResult<Json<SalesStats>> {
    state
        .permissions()
        .require(current_staff.id, "analytics.view")
        .await?;

    let stats = sale::stats(&state.pool, store_id).await?;
    Ok(Json(stats))
}
