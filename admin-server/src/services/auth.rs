//! 认证服务 - 登录、刷新令牌、当前用户信息、登出
//!
//! 登录失败统一返回 `InvalidCredentials`，不区分用户不存在与密码错误；
//! 结果返回前固定等待 `LOGIN_DELAY_MS`，响应时间不泄露用户是否存在。

use std::time::Duration;

use shared::error::{AppError, ErrorCode};
use shared::models::{LogDetailType, UserInfo};

use crate::auth::jwt::TokenPair;
use crate::auth::password::verify_password;
use crate::auth::JwtError;
use crate::core::ServerState;
use crate::db::repository::user;
use crate::services::audit;

/// Authenticate by user name and password, returning a token pair
pub async fn login(state: &ServerState, user_name: &str, password: &str) -> Result<TokenPair, AppError> {
    let found = user::find_by_user_name(&state.pool, user_name).await?;

    // 先等待再判断结果
    tokio::time::sleep(Duration::from_millis(state.config.login_delay_ms)).await;

    let Some(found) = found else {
        audit::user(&state.pool, None, LogDetailType::UserLoginUserNameInvalid).await;
        tracing::warn!(user_name = %user_name, "Login failed - user not found");
        return Err(AppError::invalid_credentials());
    };

    let password_valid = verify_password(password, &found.password)
        .map_err(|e| AppError::internal(format!("Password verification failed: {e}")))?;
    if !password_valid {
        audit::user(&state.pool, Some(found.id), LogDetailType::UserLoginErrorPassword).await;
        tracing::warn!(user_name = %user_name, "Login failed - invalid credentials");
        return Err(AppError::invalid_credentials());
    }

    if !found.is_enabled() {
        audit::user(&state.pool, Some(found.id), LogDetailType::UserLoginForbid).await;
        tracing::warn!(user_id = found.id, user_name = %user_name, "Login failed - account disabled");
        return Err(AppError::account_disabled());
    }

    let tokens = state
        .jwt_service
        .generate_token_pair(found.id, &found.user_name)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;
    user::touch_last_login(&state.pool, found.id).await?;

    audit::user(&state.pool, Some(found.id), LogDetailType::UserLoginSuccess).await;
    tracing::info!(user_id = found.id, user_name = %found.user_name, "User logged in successfully");

    Ok(tokens)
}

/// Exchange a refresh token for a new token pair
pub async fn refresh(state: &ServerState, refresh_token: &str) -> Result<TokenPair, AppError> {
    let claims = state
        .jwt_service
        .decode_refresh(refresh_token)
        .map_err(refresh_error)?;

    let found = user::find_by_id(&state.pool, claims.user_id)
        .await?
        .ok_or_else(|| AppError::user_not_found(claims.user_id))?;
    if !found.is_enabled() {
        tracing::warn!(user_id = found.id, "Token refresh refused - account disabled");
        return Err(AppError::account_disabled());
    }

    let tokens = state
        .jwt_service
        .generate_token_pair(found.id, &found.user_name)
        .map_err(|e| AppError::internal(format!("Failed to generate token: {e}")))?;

    audit::user(&state.pool, Some(found.id), LogDetailType::UserAuthRefreshTokenSuccess).await;
    tracing::debug!(user_id = found.id, "Token refreshed");
    Ok(tokens)
}

fn refresh_error(err: JwtError) -> AppError {
    match err {
        JwtError::ExpiredToken => AppError::token_expired(),
        JwtError::WrongTokenType { .. } => AppError::new(ErrorCode::TokenTypeMismatch),
        other => AppError::invalid_token(other.to_string()),
    }
}

/// Profile of the signed-in user with role and button codes
pub async fn me(state: &ServerState, user_id: i64) -> Result<UserInfo, AppError> {
    let found = user::find_by_id(&state.pool, user_id)
        .await?
        .ok_or_else(|| AppError::user_not_found(user_id))?;

    let roles = user::roles(&state.pool, user_id)
        .await?
        .into_iter()
        .map(|r| r.role_code)
        .collect();
    let buttons = user::button_codes(&state.pool, user_id).await?;

    audit::user(&state.pool, Some(user_id), LogDetailType::UserLoginGetUserInfo).await;

    Ok(UserInfo {
        user_id: found.id,
        user_name: found.user_name,
        nick_name: found.nick_name,
        user_email: found.user_email,
        roles,
        buttons,
    })
}

/// 令牌无状态，登出只写审计日志
pub async fn logout(state: &ServerState, user_id: i64) {
    audit::user(&state.pool, Some(user_id), LogDetailType::Logout).await;
    tracing::info!(user_id, "User logged out");
}
