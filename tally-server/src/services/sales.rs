//! Sale recording
//!
//! A sale decrements stock for every line item and writes the header
//! and lines in one transaction. The guarded decrement
//! (`quantity >= ?`) makes concurrent sales of the same item race-free:
//! the losing request fails with insufficient stock instead of driving
//! the quantity negative.

use sqlx::SqlitePool;

use crate::db::repository::{inventory, sale};
use shared::error::{AppError, AppResult, ErrorCode};
use shared::models::{SaleCreate, SaleWithItems};

/// Point-of-sale transaction recording
#[derive(Clone)]
pub struct SalesService {
    pool: SqlitePool,
}

impl SalesService {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    /// Record a sale: validate every line against the store's stock,
    /// decrement, and persist atomically
    pub async fn create_sale(
        &self,
        store_id: i64,
        created_by: i64,
        data: SaleCreate,
    ) -> AppResult<SaleWithItems> {
        if data.items.is_empty() {
            return Err(AppError::new(ErrorCode::SaleEmpty));
        }

        let mut tx = self
            .pool
            .begin()
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        let mut total = 0.0;
        let mut resolved = Vec::with_capacity(data.items.len());
        for line in &data.items {
            let item = inventory::find_by_id_tx(&mut tx, line.inventory_item_id)
                .await?
                .ok_or_else(|| {
                    AppError::with_message(
                        ErrorCode::ItemNotFound,
                        format!("Inventory item {} not found", line.inventory_item_id),
                    )
                })?;
            if item.store_id != store_id {
                return Err(AppError::new(ErrorCode::CrossStoreAccess));
            }

            let decremented = inventory::decrement_stock(&mut tx, item.id, line.quantity).await?;
            if !decremented {
                return Err(AppError::with_message(
                    ErrorCode::InsufficientStock,
                    format!("Insufficient stock for {}", item.product_name),
                ));
            }

            total += line.unit_price * line.quantity as f64;
            resolved.push((item, line));
        }

        let change_given = (data.amount_paid - total).max(0.0);
        let outstanding_balance = (total - data.amount_paid).max(0.0);

        let new_sale = sale::insert(
            &mut tx,
            store_id,
            total,
            data.amount_paid,
            change_given,
            outstanding_balance,
            &data.payment_method,
            created_by,
        )
        .await?;

        let mut items = Vec::with_capacity(resolved.len());
        for (item, line) in resolved {
            items.push(
                sale::insert_item(
                    &mut tx,
                    new_sale.id,
                    item.id,
                    &item.product_name,
                    line.quantity,
                    line.unit_price,
                )
                .await?,
            );
        }

        tx.commit()
            .await
            .map_err(|e| AppError::database(e.to_string()))?;

        tracing::info!(
            sale_id = new_sale.id,
            store_id,
            total = new_sale.total_amount,
            "Sale recorded"
        );

        Ok(SaleWithItems {
            sale: new_sale,
            items,
        })
    }
}
