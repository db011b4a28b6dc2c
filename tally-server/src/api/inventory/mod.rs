//! Inventory API Module

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Inventory router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/stores/{store_id}/inventory", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create).get(handler::list))
        .route(
            "/{item_id}",
            get(handler::get_by_id)
                .patch(handler::update)
                .delete(handler::delete),
        )
        .route("/{item_id}/image", post(handler::upload_image))
}
