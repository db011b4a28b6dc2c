//! Request extractors
//!
//! [`CurrentUser`] and [`BearerToken`] read what the authentication
//! middleware injected; [`StoreStaff`] additionally resolves the
//! caller's staff membership for the `{store_id}` in the request path.

use axum::extract::{FromRequestParts, Path};
use axum::http::request::Parts;
use std::collections::HashMap;

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::staff;
use shared::error::{AppError, ErrorCode};
use shared::models::Staff;

impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        // Populated by require_auth; absence means the route was wired
        // outside the authenticated router
        parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(AppError::unauthorized)
    }
}

/// The raw bearer token of the current request (for revocation)
#[derive(Debug, Clone)]
pub struct BearerToken(pub String);

impl FromRequestParts<ServerState> for BearerToken {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        _state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        parts
            .extensions
            .get::<BearerToken>()
            .cloned()
            .ok_or_else(AppError::unauthorized)
    }
}

/// The caller's staff membership in the store addressed by the
/// `{store_id}` path parameter.
///
/// Rejections: not a member → [`ErrorCode::NotStoreStaff`],
/// deactivated membership → [`ErrorCode::StaffNotActive`]. Handlers
/// that need a permission on top call the permission service.
pub struct StoreStaff(pub Staff);

impl FromRequestParts<ServerState> for StoreStaff {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        let user = parts
            .extensions
            .get::<CurrentUser>()
            .cloned()
            .ok_or_else(AppError::unauthorized)?;

        let Path(params): Path<HashMap<String, String>> =
            Path::from_request_parts(parts, state)
                .await
                .map_err(|_| AppError::validation("Missing store_id path parameter"))?;

        let store_id: i64 = params
            .get("store_id")
            .and_then(|v| v.parse().ok())
            .ok_or_else(|| AppError::validation("Invalid store_id path parameter"))?;

        let staff = staff::find_by_user_and_store(&state.pool, user.id, store_id)
            .await?
            .ok_or_else(|| AppError::new(ErrorCode::NotStoreStaff))?;

        if !staff.is_active {
            return Err(AppError::new(ErrorCode::StaffNotActive));
        }

        Ok(StoreStaff(staff))
    }
}
