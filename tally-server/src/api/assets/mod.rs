//! Asset API Module
//!
//! Serves uploaded images back by filename.

use axum::{
    Router,
    extract::{Path, State},
    http::header,
    response::{IntoResponse, Response},
    routing::get,
};

use crate::core::ServerState;
use shared::error::{AppError, AppResult};

/// Asset router
pub fn router() -> Router<ServerState> {
    Router::new().route("/api/assets/{filename}", get(serve))
}

async fn serve(
    State(state): State<ServerState>,
    Path(filename): Path<String>,
) -> AppResult<Response> {
    let path = state.assets().resolve(&filename)?;
    let bytes = tokio::fs::read(&path)
        .await
        .map_err(|e| AppError::internal(format!("Failed to read asset: {e}")))?;

    // Everything in the store is re-encoded JPEG
    Ok(([(header::CONTENT_TYPE, "image/jpeg")], bytes).into_response())
}
