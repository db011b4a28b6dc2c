//! Role API Module

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

/// Role router
pub fn router() -> Router<ServerState> {
    Router::new().route("/api/stores/{store_id}/roles", get(handler::list))
}
