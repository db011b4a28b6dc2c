//! Inventory Model

use serde::{Deserialize, Serialize};

/// Inventory item: one stocked product in a store
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct InventoryItem {
    pub id: i64,
    pub store_id: i64,
    pub product_name: String,
    pub sku: String,
    pub cost_price: Option<f64>,
    pub selling_price: f64,
    pub quantity: i64,
    pub low_stock_threshold: Option<i64>,
    pub high_stock_threshold: Option<i64>,
    pub status: String,
    pub description: Option<String>,
    pub image_url: Option<String>,
    /// Product expiration date (UTC millis), if perishable
    pub expires_at: Option<i64>,
    pub created_by: i64,
    pub is_active: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl InventoryItem {
    /// Whether the current quantity is at or below the low-stock threshold
    pub fn is_low_stock(&self) -> bool {
        self.low_stock_threshold
            .is_some_and(|threshold| self.quantity <= threshold)
    }

    /// Whether the current quantity is at or above the high-stock threshold
    pub fn is_overstocked(&self) -> bool {
        self.high_stock_threshold
            .is_some_and(|threshold| self.quantity >= threshold)
    }
}

/// Create inventory item payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct InventoryCreate {
    pub product_name: String,
    pub sku: String,
    pub cost_price: Option<f64>,
    pub selling_price: f64,
    pub quantity: i64,
    pub low_stock_threshold: Option<i64>,
    pub high_stock_threshold: Option<i64>,
    #[serde(default)]
    pub status: Option<String>,
    pub description: Option<String>,
    pub expires_at: Option<i64>,
}

/// Update inventory item payload, listing exactly the mutable fields
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct InventoryUpdate {
    pub product_name: Option<String>,
    pub cost_price: Option<f64>,
    pub selling_price: Option<f64>,
    pub quantity: Option<i64>,
    pub low_stock_threshold: Option<i64>,
    pub high_stock_threshold: Option<i64>,
    pub status: Option<String>,
    pub description: Option<String>,
    pub expires_at: Option<i64>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn item(quantity: i64, low: Option<i64>, high: Option<i64>) -> InventoryItem {
        InventoryItem {
            id: 1,
            store_id: 1,
            product_name: "Beans".into(),
            sku: "SKU-1".into(),
            cost_price: None,
            selling_price: 2.5,
            quantity,
            low_stock_threshold: low,
            high_stock_threshold: high,
            status: "available".into(),
            description: None,
            image_url: None,
            expires_at: None,
            created_by: 1,
            is_active: true,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_low_stock_at_threshold() {
        assert!(item(5, Some(5), None).is_low_stock());
        assert!(item(4, Some(5), None).is_low_stock());
        assert!(!item(6, Some(5), None).is_low_stock());
        // No threshold configured: never low
        assert!(!item(0, None, None).is_low_stock());
    }

    #[test]
    fn test_overstocked() {
        assert!(item(100, None, Some(100)).is_overstocked());
        assert!(!item(99, None, Some(100)).is_overstocked());
        assert!(!item(1000, None, None).is_overstocked());
    }
}
