//! 路由装配
//!
//! [`build_router`] 注册全部路由；[`build_app`] 叠加中间件，HTTP 服务器和
//! 集成测试共用同一个入口。

use axum::Router;
use axum::middleware as axum_middleware;
use http::{HeaderName, HeaderValue};
use tower_http::compression::CompressionLayer;
use tower_http::cors::CorsLayer;
use tower_http::request_id::{
    MakeRequestId, PropagateRequestIdLayer, RequestId, SetRequestIdLayer,
};
use tower_http::trace::TraceLayer;
use uuid::Uuid;

use crate::api;
use crate::auth::{require_api_permission, require_auth};
use crate::core::ServerState;
use crate::middleware::logging_middleware;
use crate::services::ApiCatalogEntry;

const REQUEST_ID_HEADER: &str = "x-request-id";

/// Custom request ID generator
#[derive(Clone)]
struct XRequestId;

impl MakeRequestId for XRequestId {
    fn make_request_id<B>(&mut self, _request: &http::Request<B>) -> Option<RequestId> {
        let id = Uuid::new_v4().to_string();
        HeaderValue::from_str(&id).ok().map(RequestId::new)
    }
}

/// 系统管理路由 - 逐个接口校验角色授权
fn system_router(state: &ServerState) -> Router<ServerState> {
    Router::new()
        .merge(api::user::router())
        .merge(api::role::router())
        .merge(api::menu::router())
        .merge(api::apis::router())
        .merge(api::button::router())
        .merge(api::department::router())
        .merge(api::log::router())
        .route_layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_api_permission,
        ))
}

/// Build a router with all routes registered (no global middleware)
pub fn build_router(state: &ServerState) -> Router<ServerState> {
    Router::new()
        // Health API - public route
        .merge(api::health::router())
        // Auth API - login / refresh public, the rest authenticated
        .merge(api::auth::router())
        // Route API - navigation for the frontend
        .merge(api::route::router())
        // System API - authenticated + api permission
        .merge(system_router(state))
}

/// Build a fully configured application with all middleware and state
///
/// 中间件由内向外: 认证 → 请求日志 → Trace → 请求 ID → 压缩 → CORS。
/// 请求日志位于认证外层，401 同样会被记录。
pub fn build_app(state: ServerState) -> Router {
    build_router(&state)
        // ========== Application Middleware ==========
        // Get user context (JWT authentication) - injects CurrentUser
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            require_auth,
        ))
        // Request logging + api_logs
        .layer(axum_middleware::from_fn_with_state(
            state.clone(),
            logging_middleware,
        ))
        // ========== Tower HTTP Middleware ==========
        // Trace - Request tracing
        .layer(TraceLayer::new_for_http())
        // Propagate request ID to response
        .layer(PropagateRequestIdLayer::new(HeaderName::from_static(
            REQUEST_ID_HEADER,
        )))
        // Request ID - Generate unique ID for each request
        .layer(SetRequestIdLayer::new(
            HeaderName::from_static(REQUEST_ID_HEADER),
            XRequestId,
        ))
        // Compression - Gzip compress responses
        .layer(CompressionLayer::new())
        // CORS - Handle cross-origin requests
        .layer(CorsLayer::permissive())
        .with_state(state)
}

/// 全部受权限保护的接口
///
/// 与 `apis` 表对齐 (见 `POST /api/v1/system/apis/refresh`)。
pub fn api_catalog() -> Vec<ApiCatalogEntry> {
    [
        api::user::CATALOG,
        api::role::CATALOG,
        api::menu::CATALOG,
        api::apis::CATALOG,
        api::button::CATALOG,
        api::department::CATALOG,
        api::log::CATALOG,
    ]
    .concat()
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashSet;

    #[test]
    fn test_catalog_entries_are_unique() {
        let catalog = api_catalog();
        assert_eq!(catalog.len(), 52);

        let keys: HashSet<_> = catalog.iter().map(|e| (e.method, e.path)).collect();
        assert_eq!(keys.len(), catalog.len());
    }

    #[test]
    fn test_catalog_covers_system_paths_only() {
        for entry in api_catalog() {
            assert!(entry.path.starts_with("/api/v1/system/"), "{}", entry.path);
            assert_eq!(entry.tags.first(), Some(&"System Manage"));
        }
    }
}
