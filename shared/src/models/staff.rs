//! Staff Model

use serde::{Deserialize, Serialize};

/// Staff membership status
///
/// `pending`: invited but not yet onboarded.
/// `active`: invitation accepted (or owner bootstrap).
/// `inactive`: administratively deactivated.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum StaffStatus {
    Pending,
    Active,
    Inactive,
}

impl StaffStatus {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Pending => "pending",
            Self::Active => "active",
            Self::Inactive => "inactive",
        }
    }
}

/// Staff entity: a user's membership record in one store
///
/// At most one row exists per (user, store) pair. `is_active` gates
/// access independently of `status`.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct Staff {
    pub id: i64,
    pub user_id: i64,
    pub store_id: i64,
    pub role_id: Option<i64>,
    pub status: StaffStatus,
    pub is_active: bool,
    pub created_at: i64,
}

/// Update staff payload, listing exactly the mutable fields
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct StaffUpdate {
    pub staff_id: i64,
    pub status: Option<StaffStatus>,
    /// Role referenced by name
    pub role: Option<String>,
}

/// Staff row joined with user and role details for listings
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
pub struct StaffDetail {
    pub id: i64,
    pub user_id: i64,
    pub store_id: i64,
    pub status: StaffStatus,
    pub is_active: bool,
    pub role: Option<String>,
    pub name: String,
    pub email: String,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_serde_lowercase() {
        assert_eq!(
            serde_json::to_string(&StaffStatus::Pending).unwrap(),
            "\"pending\""
        );
        let status: StaffStatus = serde_json::from_str("\"active\"").unwrap();
        assert_eq!(status, StaffStatus::Active);
    }

    #[test]
    fn test_status_rejects_unknown_value() {
        assert!(serde_json::from_str::<StaffStatus>("\"fired\"").is_err());
    }
}
