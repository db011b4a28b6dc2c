//! Inventory API Handlers

use axum::{
    Json,
    extract::{Multipart, Path, State},
};

use crate::auth::StoreStaff;
use crate::core::ServerState;
use crate::db::repository::{inventory, staff};
use crate::utils::validation::{
    MAX_NAME_LEN, MAX_NOTE_LEN, MAX_SHORT_TEXT_LEN, validate_optional_text,
    validate_required_text,
};
use shared::error::{ApiResponse, AppError, AppResult, ErrorCode};
use shared::models::{InventoryCreate, InventoryItem, InventoryUpdate};

/// Create an inventory item (products.create)
pub async fn create(
    State(state): State<ServerState>,
    StoreStaff(current_staff): StoreStaff,
    Path(store_id): Path<i64>,
    Json(payload): Json<InventoryCreate>,
) -> AppResult<Json<InventoryItem>> {
    state
        .permissions()
        .require(current_staff.id, "products.create")
        .await?;

    validate_required_text(&payload.product_name, "product name", MAX_NAME_LEN)?;
    validate_required_text(&payload.sku, "sku", MAX_SHORT_TEXT_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;
    if payload.selling_price < 0.0 || payload.quantity < 0 {
        return Err(AppError::validation(
            "selling price and quantity must be non-negative",
        ));
    }

    let item = inventory::create(
        &state.pool,
        store_id,
        current_staff.user_id,
        &payload,
        None,
    )
    .await?;

    tracing::info!(item_id = item.id, store_id, sku = %item.sku, "Inventory item created");

    Ok(Json(item))
}

/// List the store's active inventory (products.view)
pub async fn list(
    State(state): State<ServerState>,
    StoreStaff(current_staff): StoreStaff,
    Path(store_id): Path<i64>,
) -> AppResult<Json<Vec<InventoryItem>>> {
    state
        .permissions()
        .require(current_staff.id, "products.view")
        .await?;

    let items = inventory::find_by_store(&state.pool, store_id).await?;
    Ok(Json(items))
}

/// Get one inventory item (products.view)
pub async fn get_by_id(
    State(state): State<ServerState>,
    StoreStaff(current_staff): StoreStaff,
    Path((store_id, item_id)): Path<(i64, i64)>,
) -> AppResult<Json<InventoryItem>> {
    state
        .permissions()
        .require(current_staff.id, "products.view")
        .await?;

    let item = find_store_item(&state, store_id, item_id).await?;
    Ok(Json(item))
}

/// Update an inventory item (products.edit)
///
/// Falling to or below the low-stock threshold alerts the store's
/// staff and owner by mail, off the request path.
pub async fn update(
    State(state): State<ServerState>,
    StoreStaff(current_staff): StoreStaff,
    Path((store_id, item_id)): Path<(i64, i64)>,
    Json(payload): Json<InventoryUpdate>,
) -> AppResult<Json<InventoryItem>> {
    state
        .permissions()
        .require(current_staff.id, "products.edit")
        .await?;

    find_store_item(&state, store_id, item_id).await?;
    validate_optional_text(&payload.product_name, "product name", MAX_NAME_LEN)?;
    validate_optional_text(&payload.description, "description", MAX_NOTE_LEN)?;

    let item = inventory::update(&state.pool, item_id, &payload).await?;

    if item.is_low_stock() {
        let recipients = staff::notification_emails(&state.pool, store_id).await?;
        for email in recipients {
            state.mailer().send_async(
                email,
                format!("Low Stock Alert: {}", item.product_name),
                format!(
                    "The inventory for {} is low (current: {}). Please restock soon.",
                    item.product_name, item.quantity
                ),
            );
        }
    }

    Ok(Json(item))
}

/// Soft-delete an inventory item (products.delete)
pub async fn delete(
    State(state): State<ServerState>,
    StoreStaff(current_staff): StoreStaff,
    Path((store_id, item_id)): Path<(i64, i64)>,
) -> AppResult<ApiResponse<()>> {
    state
        .permissions()
        .require(current_staff.id, "products.delete")
        .await?;

    find_store_item(&state, store_id, item_id).await?;
    inventory::soft_delete(&state.pool, item_id).await?;
    Ok(ApiResponse::ok())
}

/// Attach a product image (products.edit; multipart field `file`)
pub async fn upload_image(
    State(state): State<ServerState>,
    StoreStaff(current_staff): StoreStaff,
    Path((store_id, item_id)): Path<(i64, i64)>,
    mut multipart: Multipart,
) -> AppResult<Json<InventoryItem>> {
    state
        .permissions()
        .require(current_staff.id, "products.edit")
        .await?;

    find_store_item(&state, store_id, item_id).await?;

    let mut field_data: Option<(Vec<u8>, Option<String>)> = None;
    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Invalid multipart request: {e}")))?
    {
        let name = field.name().map(|s| s.to_string());
        if name.as_deref() == Some("file") || name.as_deref() == Some("") {
            let content_type = field.content_type().map(|s| s.to_string());
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
                .to_vec();
            field_data = Some((bytes, content_type));
            break;
        }
    }

    let (data, content_type) =
        field_data.ok_or_else(|| AppError::new(ErrorCode::NoFileProvided))?;

    let image_url = state.assets().store_image(&data, content_type.as_deref())?;
    inventory::set_image_url(&state.pool, item_id, &image_url).await?;

    let item = find_store_item(&state, store_id, item_id).await?;
    Ok(Json(item))
}

/// Load an item and verify it belongs to the addressed store
async fn find_store_item(
    state: &ServerState,
    store_id: i64,
    item_id: i64,
) -> AppResult<InventoryItem> {
    let item = inventory::find_by_id(&state.pool, item_id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(
                ErrorCode::ItemNotFound,
                format!("Inventory item {item_id} not found"),
            )
        })?;
    if item.store_id != store_id {
        return Err(AppError::new(ErrorCode::CrossStoreAccess));
    }
    Ok(item)
}
