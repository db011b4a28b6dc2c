//! Data models
//!
//! Shared between the server and API clients.
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY), all timestamps are
//! UTC Unix millis.

pub mod inventory;
pub mod role;
pub mod sale;
pub mod staff;
pub mod store;
pub mod user;

// Re-exports
pub use inventory::*;
pub use role::*;
pub use sale::*;
pub use staff::*;
pub use store::*;
pub use user::*;
