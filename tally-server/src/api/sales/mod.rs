//! Sales API Module

mod handler;

use axum::{
    Router,
    routing::{delete, get, post},
};

use crate::core::ServerState;

/// Sales router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/stores/{store_id}/sales", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create).get(handler::list))
        .route("/stats", get(handler::stats))
        .route("/{sale_id}", delete(handler::delete))
}
