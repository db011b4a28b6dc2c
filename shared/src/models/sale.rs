//! Sales Models

use serde::{Deserialize, Serialize};

/// Sale: one point-of-sale transaction
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Sale {
    pub id: i64,
    pub store_id: i64,
    pub total_amount: f64,
    pub amount_paid: f64,
    pub change_given: f64,
    pub outstanding_balance: f64,
    pub payment_method: String,
    pub created_by: i64,
    pub created_at: i64,
    pub is_deleted: bool,
    pub deleted_by: Option<i64>,
}

/// Sale line item; unit price captured at time of sale
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct SaleItem {
    pub id: i64,
    pub sale_id: i64,
    pub inventory_item_id: i64,
    pub product_name: String,
    pub quantity: i64,
    pub unit_price: f64,
}

/// One line of a sale creation request
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleItemInput {
    pub inventory_item_id: i64,
    pub quantity: i64,
    pub unit_price: f64,
}

/// Create sale payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleCreate {
    pub payment_method: String,
    pub amount_paid: f64,
    pub items: Vec<SaleItemInput>,
}

/// Sale with its line items
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SaleWithItems {
    #[serde(flatten)]
    pub sale: Sale,
    pub items: Vec<SaleItem>,
}

/// Aggregated sales statistics for a store
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct SalesStats {
    pub total_sales: i64,
    pub revenue_generated: f64,
    pub avg_sale_value: f64,
    pub outstanding_balance: f64,
}
