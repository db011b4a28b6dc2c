//! Sales Repository

use super::{RepoError, RepoResult};
use shared::error::ErrorCode;
use shared::models::{Sale, SaleItem, SaleWithItems, SalesStats};
use shared::util::{now_millis, snowflake_id};
use sqlx::{SqliteConnection, SqlitePool};

const SALE_SELECT: &str = "SELECT id, store_id, total_amount, amount_paid, change_given, \
     outstanding_balance, payment_method, created_by, created_at, is_deleted, deleted_by FROM sale";

/// Insert a sale header inside the caller's transaction
#[allow(clippy::too_many_arguments)]
pub async fn insert(
    conn: &mut SqliteConnection,
    store_id: i64,
    total_amount: f64,
    amount_paid: f64,
    change_given: f64,
    outstanding_balance: f64,
    payment_method: &str,
    created_by: i64,
) -> RepoResult<Sale> {
    let id = snowflake_id();
    let now = now_millis();
    sqlx::query(
        "INSERT INTO sale (id, store_id, total_amount, amount_paid, change_given, outstanding_balance, payment_method, created_by, created_at, is_deleted) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, 0)",
    )
    .bind(id)
    .bind(store_id)
    .bind(total_amount)
    .bind(amount_paid)
    .bind(change_given)
    .bind(outstanding_balance)
    .bind(payment_method)
    .bind(created_by)
    .bind(now)
    .execute(&mut *conn)
    .await?;

    Ok(Sale {
        id,
        store_id,
        total_amount,
        amount_paid,
        change_given,
        outstanding_balance,
        payment_method: payment_method.to_string(),
        created_by,
        created_at: now,
        is_deleted: false,
        deleted_by: None,
    })
}

/// Insert one line item inside the caller's transaction
pub async fn insert_item(
    conn: &mut SqliteConnection,
    sale_id: i64,
    inventory_item_id: i64,
    product_name: &str,
    quantity: i64,
    unit_price: f64,
) -> RepoResult<SaleItem> {
    let id = snowflake_id();
    sqlx::query(
        "INSERT INTO sale_item (id, sale_id, inventory_item_id, product_name, quantity, unit_price) VALUES (?, ?, ?, ?, ?, ?)",
    )
    .bind(id)
    .bind(sale_id)
    .bind(inventory_item_id)
    .bind(product_name)
    .bind(quantity)
    .bind(unit_price)
    .execute(&mut *conn)
    .await?;

    Ok(SaleItem {
        id,
        sale_id,
        inventory_item_id,
        product_name: product_name.to_string(),
        quantity,
        unit_price,
    })
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Sale>> {
    let sql = format!("{SALE_SELECT} WHERE id = ?");
    let sale = sqlx::query_as::<_, Sale>(&sql)
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(sale)
}

pub async fn items_for_sale(pool: &SqlitePool, sale_id: i64) -> RepoResult<Vec<SaleItem>> {
    let items = sqlx::query_as::<_, SaleItem>(
        "SELECT id, sale_id, inventory_item_id, product_name, quantity, unit_price FROM sale_item WHERE sale_id = ?",
    )
    .bind(sale_id)
    .fetch_all(pool)
    .await?;
    Ok(items)
}

/// All non-deleted sales of a store, newest first, with line items
pub async fn find_by_store(pool: &SqlitePool, store_id: i64) -> RepoResult<Vec<SaleWithItems>> {
    let sql = format!("{SALE_SELECT} WHERE store_id = ? AND is_deleted = 0 ORDER BY created_at DESC");
    let sales = sqlx::query_as::<_, Sale>(&sql)
        .bind(store_id)
        .fetch_all(pool)
        .await?;

    let mut result = Vec::with_capacity(sales.len());
    for sale in sales {
        let items = items_for_sale(pool, sale.id).await?;
        result.push(SaleWithItems { sale, items });
    }
    Ok(result)
}

/// Soft delete, recording who deleted it
pub async fn soft_delete(pool: &SqlitePool, sale_id: i64, deleted_by: i64) -> RepoResult<()> {
    let rows = sqlx::query("UPDATE sale SET is_deleted = 1, deleted_by = ? WHERE id = ? AND is_deleted = 0")
        .bind(deleted_by)
        .bind(sale_id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::Business(
            ErrorCode::SaleNotFound,
            format!("Sale {sale_id} not found"),
        ));
    }
    Ok(())
}

/// Aggregate statistics over a store's non-deleted sales
pub async fn stats(pool: &SqlitePool, store_id: i64) -> RepoResult<SalesStats> {
    let (total_sales, revenue_generated, outstanding_balance): (i64, f64, f64) = sqlx::query_as(
        "SELECT COUNT(*), COALESCE(SUM(total_amount), 0), COALESCE(SUM(outstanding_balance), 0) \
         FROM sale WHERE store_id = ? AND is_deleted = 0",
    )
    .bind(store_id)
    .fetch_one(pool)
    .await?;

    let avg_sale_value = if total_sales > 0 {
        revenue_generated / total_sales as f64
    } else {
        0.0
    };

    Ok(SalesStats {
        total_sales,
        revenue_generated,
        avg_sale_value,
        outstanding_balance,
    })
}
