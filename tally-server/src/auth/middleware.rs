//! 认证中间件
//!
//! 从 `Authorization: Bearer <token>` 头提取并验证 JWT。
//! 验证成功后加载用户行（吊销列表 + is_active 检查），将
//! [`CurrentUser`] 和原始令牌注入请求扩展。
//!
//! # 跳过认证的路径
//!
//! - `OPTIONS *` (CORS 预检)
//! - 非 `/api/` 路径
//! - 公共接口（注册、登录、刷新、重置密码、接受邀请、健康检查）

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};

use crate::auth::jwt::TOKEN_TYPE_ACCESS;
use crate::auth::{BearerToken, CurrentUser, JwtError, JwtService};
use crate::core::ServerState;
use crate::db::repository::{token_blacklist, user};
use crate::security_log;
use shared::error::{AppError, ErrorCode};

/// 认证中间件 - 要求用户登录
pub async fn require_auth(
    State(state): State<ServerState>,
    mut req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let path = req.uri().path();

    // 允许 CORS 预检的 OPTIONS 请求 (跳过认证)
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    // 非 API 路由跳过认证 (让它们正常返回 404)
    if !path.starts_with("/api/") {
        return Ok(next.run(req).await);
    }

    // 公共 API 路由跳过认证
    let is_public_api_route = matches!(
        path,
        "/api/health"
            | "/api/users/register"
            | "/api/users/login"
            | "/api/users/token/refresh"
            | "/api/users/reset-password"
            | "/api/users/reset-password/confirm"
            | "/api/stores/accept-invitation"
    );
    if is_public_api_route {
        return Ok(next.run(req).await);
    }

    let jwt_service = state.jwt_service();
    let auth_header = req
        .headers()
        .get(http::header::AUTHORIZATION)
        .and_then(|h| h.to_str().ok());

    let token = match auth_header {
        Some(header) => JwtService::extract_from_header(header)
            .ok_or_else(|| AppError::invalid_token("Invalid authorization header"))?,
        None => {
            security_log!("WARN", "auth_missing", uri = format!("{:?}", req.uri()));
            return Err(AppError::unauthorized());
        }
    };

    // 吊销列表检查（登出 / 刷新轮换后的令牌）
    if token_blacklist::contains(&state.pool, token).await? {
        security_log!("WARN", "auth_revoked", uri = format!("{:?}", req.uri()));
        return Err(AppError::new(ErrorCode::TokenRevoked));
    }

    // 验证令牌
    let claims = match jwt_service.validate_token(token, TOKEN_TYPE_ACCESS) {
        Ok(claims) => claims,
        Err(e) => {
            security_log!(
                "WARN",
                "auth_failed",
                error = format!("{}", e),
                uri = format!("{:?}", req.uri())
            );

            return Err(match e {
                JwtError::ExpiredToken => AppError::token_expired(),
                _ => AppError::invalid_token("Invalid token"),
            });
        }
    };

    let user_id: i64 = claims
        .sub
        .parse()
        .map_err(|_| AppError::invalid_token("Malformed subject claim"))?;

    // 令牌有效但用户必须仍然存在且未被停用
    let user = user::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::invalid_token("Unknown user"))?;

    if !user.is_active {
        security_log!("WARN", "auth_inactive_user", user_id = user.id);
        return Err(AppError::new(ErrorCode::UserNotActive));
    }

    // Raw bearer kept for logout / refresh rotation revocation; materialize it
    // here so the borrow of `req` (via the auth header) ends before the
    // mutable `extensions_mut` borrows below.
    let bearer = token.to_string();
    req.extensions_mut().insert(CurrentUser {
        id: user.id,
        username: user.username,
        email: user.email,
    });
    req.extensions_mut().insert(BearerToken(bearer));

    Ok(next.run(req).await)
}
