//! Store Model

use serde::{Deserialize, Serialize};

/// Store entity: one tenant of the back-office
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Store {
    pub id: i64,
    pub name: String,
    pub category: Option<String>,
    /// Free-form staff headcount hint captured at registration ("1-5", "20+")
    pub staff_count_hint: Option<String>,
    /// Owning user (the creator)
    pub owner_user_id: i64,
    pub created_at: i64,
}

/// Create store payload
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StoreCreate {
    pub name: String,
    pub category: Option<String>,
    pub staff_count_hint: Option<String>,
}
