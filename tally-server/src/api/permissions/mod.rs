//! Permission API Module

mod handler;

use axum::{
    Router,
    routing::{delete, get},
};

use crate::core::ServerState;

/// Permission router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/stores/{store_id}/permissions", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route(
            "/{staff_id}",
            get(handler::effective).put(handler::apply_override),
        )
        .route("/{staff_id}/details", get(handler::details))
        .route("/{staff_id}/{permission}", delete(handler::remove_override))
}
