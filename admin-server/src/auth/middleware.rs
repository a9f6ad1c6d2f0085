//! 认证中间件
//!
//! 为 JWT 认证和 API 授权提供 Axum 中间件

use axum::{
    extract::{Request, State},
    middleware::Next,
    response::Response,
};
use shared::AppError;

use super::jwt::CurrentUser;
use super::permission::Access;
use super::resolver::resolve_current_user;
use crate::core::ServerState;
use crate::security_log;

/// 无需登录的 API 路径
const PUBLIC_API_PATHS: &[&str] = &[
    "/api/v1/auth/login",
    "/api/v1/auth/refresh-token",
    "/api/v1/route/constant-routes",
];

/// 认证中间件 - 要求用户登录
///
/// 从 `Authorization: Bearer <token>` 头解析用户，成功后将 [`CurrentUser`]
/// 注入请求扩展 (同时写入响应扩展)。
///
/// # 跳过认证的路径
///
/// - `OPTIONS *` (CORS 预检)
/// - 非 `/api/` 路径 (`/health` 等)
/// - [`PUBLIC_API_PATHS`]
///
/// # 错误处理
///
/// | 错误 | 错误码 |
/// |------|--------|
/// | 无 Authorization 头 | 1001 NotAuthenticated |
/// | 令牌过期 | 1003 TokenExpired |
/// | 无效令牌 | 1004 TokenInvalid |
/// | 用户不存在 | 1008 UserNotFound |
pub async fn require_auth(
    State(state): State<ServerState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    if req.method() == http::Method::OPTIONS {
        return Ok(next.run(req).await);
    }

    let path = req.uri().path();
    if !path.starts_with("/api/") || PUBLIC_API_PATHS.contains(&path) {
        return Ok(next.run(req).await);
    }

    let (mut parts, body) = req.into_parts();
    let jwt = state.get_jwt_service();
    let user = match resolve_current_user(
        &parts.headers,
        &mut parts.extensions,
        jwt.as_ref(),
        state.store.as_ref(),
    )
    .await
    {
        Ok(user) => user,
        Err(e) => {
            security_log!(
                "WARN",
                e.event(),
                error = format!("{}", e),
                uri = format!("{:?}", parts.uri)
            );
            return Err(e.into());
        }
    };

    let mut response = next.run(Request::from_parts(parts, body)).await;
    // 供外层请求日志读取
    response.extensions_mut().insert(user);
    Ok(response)
}

/// API 权限中间件 - 按角色授予的 API 判定 `(method, path)`
///
/// 必须位于 [`require_auth`] 之后 (需要扩展中的 [`CurrentUser`])。
///
/// # 错误
///
/// | 错误 | 错误码 |
/// |------|--------|
/// | 未绑定角色 | 2006 NoRoleBound |
/// | 无匹配授权 | 2001 PermissionDenied |
/// | 授权 API 已禁用 | 2007 ApiDisabled |
pub async fn require_api_permission(
    State(state): State<ServerState>,
    req: Request,
    next: Next,
) -> Result<Response, AppError> {
    let user = req
        .extensions()
        .get::<CurrentUser>()
        .cloned()
        .ok_or_else(AppError::unauthorized)?;

    let method = req.method().as_str().to_ascii_lowercase();
    let path = req.uri().path().to_string();

    match state
        .engine
        .authorize(state.store.as_ref(), user.id, &method, &path)
        .await
    {
        Ok(access) => {
            if let Access::Granted { api_id } = access {
                tracing::debug!(user_id = user.id, api_id, %method, %path, "Api access granted");
            }
            Ok(next.run(req).await)
        }
        Err(e) => {
            security_log!(
                "WARN",
                e.event(),
                user_id = user.id,
                user_name = user.user_name.clone(),
                method = method.clone(),
                path = path.clone()
            );
            Err(e.into())
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_public_paths_are_api_paths() {
        assert!(PUBLIC_API_PATHS.iter().all(|p| p.starts_with("/api/v1/")));
        assert!(!PUBLIC_API_PATHS.contains(&"/api/v1/auth/me"));
    }
}
