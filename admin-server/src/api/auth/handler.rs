//! Authentication Handlers

use axum::{Json, extract::State};
use shared::models::{LoginRequest, RefreshTokenRequest, UserInfo};

use crate::auth::{CurrentUser, TokenPair};
use crate::core::ServerState;
use crate::services::auth;
use crate::utils::{AppError, AppResult};

/// POST /api/v1/auth/login
pub async fn login(
    State(state): State<ServerState>,
    Json(req): Json<LoginRequest>,
) -> AppResult<Json<TokenPair>> {
    if req.user_name.trim().is_empty() || req.password.is_empty() {
        return Err(AppError::validation("userName and password are required"));
    }
    let tokens = auth::login(&state, req.user_name.trim(), &req.password).await?;
    Ok(Json(tokens))
}

/// POST /api/v1/auth/refresh-token
pub async fn refresh_token(
    State(state): State<ServerState>,
    Json(req): Json<RefreshTokenRequest>,
) -> AppResult<Json<TokenPair>> {
    let tokens = auth::refresh(&state, &req.refresh_token).await?;
    Ok(Json(tokens))
}

/// GET /api/v1/auth/me
///
/// `CurrentUser` 由提取器读取 (require_auth 已缓存在请求扩展中)
pub async fn me(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<UserInfo>> {
    let info = auth::me(&state, current_user.id).await?;
    Ok(Json(info))
}

/// POST /api/v1/auth/logout
pub async fn logout(
    State(state): State<ServerState>,
    current_user: CurrentUser,
) -> AppResult<Json<()>> {
    auth::logout(&state, current_user.id).await;
    Ok(Json(()))
}
