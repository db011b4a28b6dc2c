//! User API Module

mod handler;

use axum::{
    Router,
    routing::{get, patch, post},
};

use crate::core::ServerState;

/// User router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/users", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        // 公共路由（中间件跳过认证）
        .route("/register", post(handler::register))
        .route("/login", post(handler::login))
        .route("/token/refresh", post(handler::refresh_token))
        .route("/reset-password", patch(handler::request_password_reset))
        .route("/reset-password/confirm", patch(handler::confirm_password_reset))
        // 认证路由
        .route("/logout", post(handler::logout))
        .route("/change-password", patch(handler::change_password))
        .route("/profile-image", post(handler::upload_profile_image))
        .route(
            "/{user_id}",
            get(handler::get_by_id)
                .patch(handler::update)
                .delete(handler::delete_account),
        )
}
