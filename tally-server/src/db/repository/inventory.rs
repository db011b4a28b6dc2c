//! Inventory Repository

use super::{RepoError, RepoResult};
use shared::error::ErrorCode;
use shared::models::{InventoryCreate, InventoryItem, InventoryUpdate};
use shared::util::{now_millis, snowflake_id};
use sqlx::{SqliteConnection, SqlitePool};

const ITEM_SELECT: &str = "SELECT id, store_id, product_name, sku, cost_price, selling_price, \
     quantity, low_stock_threshold, high_stock_threshold, status, description, image_url, \
     expires_at, created_by, is_active, created_at, updated_at FROM inventory_item";

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<InventoryItem>> {
    let sql = format!("{ITEM_SELECT} WHERE id = ?");
    let item = sqlx::query_as::<_, InventoryItem>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(item)
}

pub async fn find_by_sku(pool: &SqlitePool, sku: &str) -> RepoResult<Option<InventoryItem>> {
    let sql = format!("{ITEM_SELECT} WHERE sku = ? LIMIT 1");
    let item = sqlx::query_as::<_, InventoryItem>(&sql)
        .bind(sku)
        .fetch_optional(pool)
        .await?;
    Ok(item)
}

/// All active items of a store
pub async fn find_by_store(pool: &SqlitePool, store_id: i64) -> RepoResult<Vec<InventoryItem>> {
    let sql = format!("{ITEM_SELECT} WHERE store_id = ? AND is_active = 1 ORDER BY product_name");
    let items = sqlx::query_as::<_, InventoryItem>(&sql)
        .bind(store_id)
        .fetch_all(pool)
        .await?;
    Ok(items)
}

pub async fn create(
    pool: &SqlitePool,
    store_id: i64,
    created_by: i64,
    data: &InventoryCreate,
    image_url: Option<String>,
) -> RepoResult<InventoryItem> {
    let id = snowflake_id();
    let now = now_millis();
    let status = data.status.clone().unwrap_or_else(|| "available".to_string());
    let result = sqlx::query(
        "INSERT INTO inventory_item (id, store_id, product_name, sku, cost_price, selling_price, \
         quantity, low_stock_threshold, high_stock_threshold, status, description, image_url, \
         expires_at, created_by, is_active, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, 1, ?, ?)",
    )
    .bind(id)
    .bind(store_id)
    .bind(&data.product_name)
    .bind(&data.sku)
    .bind(data.cost_price)
    .bind(data.selling_price)
    .bind(data.quantity)
    .bind(data.low_stock_threshold)
    .bind(data.high_stock_threshold)
    .bind(&status)
    .bind(&data.description)
    .bind(&image_url)
    .bind(data.expires_at)
    .bind(created_by)
    .bind(now)
    .bind(now)
    .execute(pool)
    .await;

    if let Err(err) = result {
        return match RepoError::from(err) {
            RepoError::Duplicate(_) => Err(RepoError::Business(
                ErrorCode::SkuExists,
                format!("SKU '{}' already exists", data.sku),
            )),
            other => Err(other),
        };
    }

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create inventory item".into()))
}

pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: &InventoryUpdate,
) -> RepoResult<InventoryItem> {
    let existing = find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Business(ErrorCode::ItemNotFound, format!("Inventory item {id} not found")))?;

    if !existing.is_active {
        return Err(RepoError::Business(
            ErrorCode::ItemNotActive,
            "Inventory item is not active".into(),
        ));
    }

    let now = now_millis();
    sqlx::query(
        "UPDATE inventory_item SET \
         product_name = COALESCE(?1, product_name), \
         cost_price = COALESCE(?2, cost_price), \
         selling_price = COALESCE(?3, selling_price), \
         quantity = COALESCE(?4, quantity), \
         low_stock_threshold = COALESCE(?5, low_stock_threshold), \
         high_stock_threshold = COALESCE(?6, high_stock_threshold), \
         status = COALESCE(?7, status), \
         description = COALESCE(?8, description), \
         expires_at = COALESCE(?9, expires_at), \
         updated_at = ?10 \
         WHERE id = ?11",
    )
    .bind(&data.product_name)
    .bind(data.cost_price)
    .bind(data.selling_price)
    .bind(data.quantity)
    .bind(data.low_stock_threshold)
    .bind(data.high_stock_threshold)
    .bind(&data.status)
    .bind(&data.description)
    .bind(data.expires_at)
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("Inventory item {id} not found")))
}

pub async fn set_image_url(pool: &SqlitePool, id: i64, image_url: &str) -> RepoResult<()> {
    let now = now_millis();
    sqlx::query("UPDATE inventory_item SET image_url = ?, updated_at = ? WHERE id = ?")
        .bind(image_url)
        .bind(now)
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Soft delete
pub async fn soft_delete(pool: &SqlitePool, id: i64) -> RepoResult<bool> {
    let now = now_millis();
    let rows = sqlx::query(
        "UPDATE inventory_item SET is_active = 0, updated_at = ? WHERE id = ? AND is_active = 1",
    )
    .bind(now)
    .bind(id)
    .execute(pool)
    .await?;
    Ok(rows.rows_affected() > 0)
}

/// Fetch an item mid-transaction
pub async fn find_by_id_tx(
    conn: &mut SqliteConnection,
    id: i64,
) -> RepoResult<Option<InventoryItem>> {
    let sql = format!("{ITEM_SELECT} WHERE id = ?");
    let item = sqlx::query_as::<_, InventoryItem>(&sql)
        .bind(id)
        .fetch_optional(&mut *conn)
        .await?;
    Ok(item)
}

/// Guarded stock decrement inside the caller's transaction.
///
/// The `quantity >= ?` predicate makes the decrement atomic: a
/// concurrent sale cannot take the same stock twice. Returns false when
/// stock was insufficient.
pub async fn decrement_stock(
    conn: &mut SqliteConnection,
    id: i64,
    quantity: i64,
) -> RepoResult<bool> {
    let now = now_millis();
    let rows = sqlx::query(
        "UPDATE inventory_item SET quantity = quantity - ?1, updated_at = ?2 \
         WHERE id = ?3 AND is_active = 1 AND quantity >= ?1",
    )
    .bind(quantity)
    .bind(now)
    .bind(id)
    .execute(&mut *conn)
    .await?;
    Ok(rows.rows_affected() > 0)
}
