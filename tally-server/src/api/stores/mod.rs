//! Store API Module

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

/// Store router
pub fn router() -> Router<ServerState> {
    Router::new().nest("/api/stores", routes())
}

fn routes() -> Router<ServerState> {
    Router::new()
        .route("/", post(handler::create).get(handler::list_own))
        // 公共路由（中间件跳过认证）：受邀者此时可能还没有账号
        .route("/accept-invitation", post(handler::accept_invitation))
        .route(
            "/{store_id}/staff",
            post(handler::invite_staff)
                .get(handler::list_staff)
                .patch(handler::update_staff),
        )
        .route(
            "/{store_id}/staff/resend-invitation",
            post(handler::resend_invitation),
        )
        .route("/{store_id}/staff/{staff_id}", get(handler::staff_detail))
}
