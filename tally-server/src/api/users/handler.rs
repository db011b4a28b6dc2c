//! User API Handlers
//!
//! Registration, login, token lifecycle, and account management

use std::time::Duration;

use axum::{
    Json,
    extract::{Multipart, Path, State},
};
use serde::{Deserialize, Serialize};

use crate::auth::jwt::{TOKEN_TYPE_REFRESH, TOKEN_TYPE_RESET};
use crate::auth::{BearerToken, CurrentUser, password};
use crate::core::ServerState;
use crate::db::repository::{staff, store, token_blacklist, user};
use crate::utils::validation::{
    MAX_NAME_LEN, validate_email, validate_password, validate_required_text,
};
use shared::error::{ApiResponse, AppError, AppResult, ErrorCode};
use shared::models::{Staff, Store, User, UserCreate, UserUpdate};

/// Fixed delay for authentication to prevent timing attacks
const AUTH_FIXED_DELAY_MS: u64 = 500;

/// Access/refresh token pair
#[derive(Debug, Serialize)]
pub struct TokenPair {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Serialize)]
pub struct AuthResponse {
    pub user: User,
    pub token: TokenPair,
}

#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct RefreshRequest {
    pub access_token: String,
    pub refresh_token: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetRequest {
    pub email: String,
}

#[derive(Debug, Deserialize)]
pub struct ResetConfirmRequest {
    pub token: String,
    pub password: String,
}

#[derive(Debug, Deserialize)]
pub struct ChangePasswordRequest {
    pub password: String,
}

/// Everything a profile page needs about one user
#[derive(Debug, Serialize)]
pub struct UserProfile {
    pub user: User,
    pub stores: Vec<Store>,
    pub staff_memberships: Vec<Staff>,
}

fn issue_token_pair(state: &ServerState, user: &User) -> AppResult<TokenPair> {
    let jwt = state.jwt_service();
    let access_token = jwt
        .generate_access_token(user.id, &user.email)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;
    let refresh_token = jwt
        .generate_refresh_token(user.id, &user.email)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;
    Ok(TokenPair {
        access_token,
        refresh_token,
    })
}

/// Register a new user account
pub async fn register(
    State(state): State<ServerState>,
    Json(payload): Json<UserCreate>,
) -> AppResult<Json<AuthResponse>> {
    validate_required_text(&payload.username, "username", MAX_NAME_LEN)?;
    validate_email(&payload.email)?;
    validate_password(&payload.password)?;

    let password_hash = password::hash_password(&payload.password)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))?;

    let new_user = user::create(
        &state.pool,
        &payload.username,
        &payload.email,
        &password_hash,
        true,
    )
    .await?;

    let token = issue_token_pair(&state, &new_user)?;

    state.mailer().send_async(
        new_user.email.clone(),
        "Welcome to Tally".to_string(),
        format!(
            "Hello {},\n\nThank you for registering with Tally! We're excited to have you on board.\n\nBest regards,\nThe Tally Team",
            new_user.username
        ),
    );

    tracing::info!(user_id = new_user.id, username = %new_user.username, "User registered");

    Ok(Json(AuthResponse {
        user: new_user,
        token,
    }))
}

/// Authenticate with email and password
pub async fn login(
    State(state): State<ServerState>,
    Json(payload): Json<LoginRequest>,
) -> AppResult<Json<AuthResponse>> {
    let found = user::find_by_email(&state.pool, &payload.email).await?;

    // Fixed delay to prevent timing attacks (before checking result)
    tokio::time::sleep(Duration::from_millis(AUTH_FIXED_DELAY_MS)).await;

    // Unified error message to prevent account enumeration
    let found = match found {
        Some(u) => u,
        None => {
            tracing::warn!(email = %payload.email, "Login failed - user not found");
            return Err(AppError::invalid_credentials());
        }
    };

    let password_valid = password::verify_password(&payload.password, &found.password_hash)
        .map_err(|e| AppError::internal(format!("Password verification failed: {e}")))?;

    if !password_valid {
        tracing::warn!(user_id = found.id, "Login failed - invalid credentials");
        return Err(AppError::invalid_credentials());
    }

    if !found.is_active {
        return Err(AppError::new(ErrorCode::UserNotActive));
    }

    let token = issue_token_pair(&state, &found)?;

    state.mailer().send_async(
        found.email.clone(),
        "Login Notification".to_string(),
        format!(
            "Hello {},\n\nYou have successfully logged in to your Tally account.\n\nBest regards,\nThe Tally Team",
            found.username
        ),
    );

    tracing::info!(user_id = found.id, username = %found.username, "User logged in");

    Ok(Json(AuthResponse { user: found, token }))
}

/// Rotate a refresh token: both presented tokens are revoked and a
/// fresh pair is issued
pub async fn refresh_token(
    State(state): State<ServerState>,
    Json(payload): Json<RefreshRequest>,
) -> AppResult<Json<TokenPair>> {
    if token_blacklist::contains(&state.pool, &payload.refresh_token).await? {
        return Err(AppError::new(ErrorCode::TokenRevoked));
    }

    let jwt = state.jwt_service();
    let refresh_claims = jwt
        .validate_token(&payload.refresh_token, TOKEN_TYPE_REFRESH)
        .map_err(|_| AppError::invalid_token("Invalid refresh token"))?;

    // The paired access token may already be expired; only its subject
    // must match
    let access_claims = jwt
        .decode_ignoring_expiry(&payload.access_token)
        .map_err(|_| AppError::invalid_token("Invalid access token"))?;
    if access_claims.sub != refresh_claims.sub {
        return Err(AppError::invalid_token("Token does not match user"));
    }

    let user_id: i64 = refresh_claims
        .sub
        .parse()
        .map_err(|_| AppError::invalid_token("Malformed subject claim"))?;
    let account = user::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::invalid_token("Unknown user"))?;
    if !account.is_active {
        return Err(AppError::new(ErrorCode::UserNotActive));
    }

    // Rotation: both old tokens become unusable
    token_blacklist::add_all(
        &state.pool,
        &[payload.access_token.as_str(), payload.refresh_token.as_str()],
    )
    .await?;

    let token = issue_token_pair(&state, &account)?;
    Ok(Json(token))
}

/// Revoke the current bearer token
pub async fn logout(
    State(state): State<ServerState>,
    user: CurrentUser,
    BearerToken(token): BearerToken,
) -> AppResult<ApiResponse<()>> {
    token_blacklist::add(&state.pool, &token).await?;
    tracing::info!(user_id = user.id, username = %user.username, "User logged out");
    Ok(ApiResponse::ok())
}

/// Mail a password-reset token to the account's address
pub async fn request_password_reset(
    State(state): State<ServerState>,
    Json(payload): Json<ResetRequest>,
) -> AppResult<ApiResponse<()>> {
    let account = user::find_by_email(&state.pool, &payload.email)
        .await?
        .ok_or_else(|| AppError::with_message(ErrorCode::UserNotFound, "User does not exist"))?;

    let reset_token = state
        .jwt_service()
        .generate_reset_token(account.id, &account.email)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;
    let reset_link = format!(
        "{}/reset_password?token={}",
        state.config.frontend_url, reset_token
    );

    state.mailer().send_async(
        account.email.clone(),
        "Tally: Password reset request".to_string(),
        format!(
            "Hello {},\n\nSomeone (hopefully you) requested a password reset for your Tally account.\n\n\
             If you made this request, please click the link below to reset your password:\n\n{}\n\n\
             This link will expire in {} minutes for your security.\n\
             If you didn't request a password reset, you can safely ignore this email.\n\n\
             Best regards,\nThe Tally Team",
            account.username, reset_link, state.config.jwt.invitation_expiration_minutes
        ),
    );

    Ok(ApiResponse::ok())
}

/// Redeem a password-reset token
pub async fn confirm_password_reset(
    State(state): State<ServerState>,
    Json(payload): Json<ResetConfirmRequest>,
) -> AppResult<ApiResponse<()>> {
    if token_blacklist::contains(&state.pool, &payload.token).await? {
        return Err(AppError::new(ErrorCode::TokenRevoked));
    }

    let claims = state
        .jwt_service()
        .validate_token(&payload.token, TOKEN_TYPE_RESET)
        .map_err(|_| AppError::invalid_token("Invalid reset token"))?;

    let user_id: i64 = claims
        .sub
        .parse()
        .map_err(|_| AppError::invalid_token("Malformed subject claim"))?;
    let account = user::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::invalid_token("Unknown user"))?;
    if !account.is_active {
        return Err(AppError::new(ErrorCode::UserNotActive));
    }

    validate_password(&payload.password)?;
    let password_hash = password::hash_password(&payload.password)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))?;
    user::update_password(&state.pool, account.id, &password_hash).await?;

    // Reset tokens are single-use
    token_blacklist::add(&state.pool, &payload.token).await?;

    Ok(ApiResponse::ok())
}

/// Change the authenticated user's password
pub async fn change_password(
    State(state): State<ServerState>,
    user: CurrentUser,
    Json(payload): Json<ChangePasswordRequest>,
) -> AppResult<ApiResponse<()>> {
    validate_password(&payload.password)?;
    let password_hash = password::hash_password(&payload.password)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))?;
    user::update_password(&state.pool, user.id, &password_hash).await?;
    Ok(ApiResponse::ok())
}

/// Get a user's profile with their stores and staff memberships
pub async fn get_by_id(
    State(state): State<ServerState>,
    Path(user_id): Path<i64>,
) -> AppResult<Json<UserProfile>> {
    let account = user::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| {
            AppError::with_message(ErrorCode::UserNotFound, format!("User {user_id} not found"))
        })?;

    let stores = store::find_by_owner(&state.pool, user_id).await?;
    let staff_memberships = staff::find_by_user(&state.pool, user_id).await?;

    Ok(Json(UserProfile {
        user: account,
        stores,
        staff_memberships,
    }))
}

/// Update the authenticated user's own profile fields
pub async fn update(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(user_id): Path<i64>,
    Json(payload): Json<UserUpdate>,
) -> AppResult<Json<User>> {
    if user.id != user_id {
        return Err(AppError::forbidden(
            "You are not authorized to update this account",
        ));
    }
    if let Some(email) = &payload.email {
        validate_email(email)?;
    }
    if let Some(username) = &payload.username {
        validate_required_text(username, "username", MAX_NAME_LEN)?;
    }

    let updated = user::update(&state.pool, user_id, &payload).await?;
    Ok(Json(updated))
}

/// Soft-delete the authenticated user's own account
pub async fn delete_account(
    State(state): State<ServerState>,
    user: CurrentUser,
    Path(user_id): Path<i64>,
) -> AppResult<ApiResponse<()>> {
    if user.id != user_id {
        return Err(AppError::forbidden(
            "You are not authorized to delete this account",
        ));
    }
    let removed = user::soft_delete(&state.pool, user_id).await?;
    if !removed {
        return Err(AppError::with_message(
            ErrorCode::UserNotFound,
            format!("User {user_id} not found"),
        ));
    }
    Ok(ApiResponse::ok())
}

/// Upload a profile image (multipart field `file`)
pub async fn upload_profile_image(
    State(state): State<ServerState>,
    user: CurrentUser,
    mut multipart: Multipart,
) -> AppResult<Json<serde_json::Value>> {
    let mut field_data: Option<(Vec<u8>, Option<String>)> = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| AppError::validation(format!("Invalid multipart request: {e}")))?
    {
        let name = field.name().map(|s| s.to_string());
        if name.as_deref() == Some("file") || name.as_deref() == Some("") {
            let content_type = field.content_type().map(|s| s.to_string());
            let bytes = field
                .bytes()
                .await
                .map_err(|e| AppError::validation(format!("Multipart error: {e}")))?
                .to_vec();
            field_data = Some((bytes, content_type));
            break;
        }
    }

    let (data, content_type) =
        field_data.ok_or_else(|| AppError::new(ErrorCode::NoFileProvided))?;

    let image_url = state.assets().store_image(&data, content_type.as_deref())?;
    user::update_profile_image(&state.pool, user.id, &image_url).await?;

    Ok(Json(serde_json::json!({ "image_url": image_url })))
}
