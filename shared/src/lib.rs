//! Shared types for the Tally back-office
//!
//! Common types used across crates: data models, the unified error
//! system, and small utilities (IDs, timestamps).

pub mod error;
pub mod models;
pub mod util;

// Re-exports
pub use serde::{Deserialize, Serialize};

pub use error::{ApiResponse, AppError, AppResult, ErrorCategory, ErrorCode};
