//! 请求日志中间件
//!
//! 记录所有进入的 HTTP 请求，包含时间、用户信息和状态码；
//! 开启 `API_LOG_ENABLED` 时为 `/api/` 请求写入一行 `api_logs`。

use std::net::SocketAddr;
use std::time::Instant;

use axum::{
    extract::{ConnectInfo, MatchedPath, Request, State},
    middleware::Next,
    response::Response,
};
use http::HeaderMap;
use shared::models::NewApiLog;
use tracing::{info, warn};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::log;
use crate::services::audit;

fn header_str<'a>(headers: &'a HeaderMap, name: &str) -> Option<&'a str> {
    headers.get(name).and_then(|v| v.to_str().ok())
}

/// Client address: first `x-forwarded-for` hop, then the socket peer
fn client_ip(req: &Request) -> String {
    if let Some(forwarded) = header_str(req.headers(), "x-forwarded-for")
        && let Some(first) = forwarded.split(',').next()
        && !first.trim().is_empty()
    {
        return first.trim().to_string();
    }
    req.extensions()
        .get::<ConnectInfo<SocketAddr>>()
        .map(|ConnectInfo(addr)| addr.ip().to_string())
        .unwrap_or_else(|| "unknown".to_string())
}

/// 请求日志中间件
///
/// 记录请求开始和结束，包含以下信息：
/// - 请求 ID (x-request-id)
/// - HTTP 方法和路径
/// - 用户代理 (User Agent)
/// - 认证用户 (如果存在)
/// - 响应状态码
/// - 请求延迟 (毫秒)
pub async fn logging_middleware(
    State(state): State<ServerState>,
    req: Request,
    next: Next,
) -> Response {
    let start = Instant::now();

    let request_id = header_str(req.headers(), "x-request-id")
        .map(|s| s.to_string())
        .unwrap_or_else(|| uuid::Uuid::new_v4().to_string());

    let method = req.method().clone();
    let uri = req.uri().clone();
    let path = req
        .extensions()
        .get::<MatchedPath>()
        .map(|p| p.as_str().to_string())
        .unwrap_or_else(|| uri.path().to_string());

    let user_agent = header_str(req.headers(), "user-agent")
        .unwrap_or("unknown")
        .to_string();
    let ip_address = client_ip(&req);

    info!(
        request_id = %request_id,
        method = %method,
        path = %path,
        user_agent = %user_agent,
        "Request started"
    );

    let (response, audit_ids) = audit::scope(next.run(req)).await;

    let latency = start.elapsed();
    let status = response.status();
    // 认证在内层完成，require_auth 把用户放进响应扩展
    let user_info = response
        .extensions()
        .get::<CurrentUser>()
        .map(|u| format!("{}({})", u.user_name, u.id));

    // 根据状态码使用不同级别记录日志
    if status.is_server_error() {
        warn!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = %status.as_u16(),
            latency_ms = %latency.as_millis(),
            user = ?user_info,
            "Request completed with server error"
        );
    } else if status.is_client_error() {
        warn!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = %status.as_u16(),
            latency_ms = %latency.as_millis(),
            user = ?user_info,
            "Request completed with client error"
        );
    } else {
        info!(
            request_id = %request_id,
            method = %method,
            path = %path,
            status = %status.as_u16(),
            latency_ms = %latency.as_millis(),
            user = ?user_info,
            "Request completed successfully"
        );
    }

    if state.config.api_log_enabled && uri.path().starts_with("/api/") {
        let entry = NewApiLog {
            ip_address,
            user_agent,
            request_url: uri.to_string(),
            request_method: method.as_str().to_ascii_lowercase(),
            response_code: i64::from(status.as_u16()),
            process_time: latency.as_secs_f64() * 1000.0,
        };
        match log::insert_api_log(&state.pool, &entry).await {
            Ok(api_log_id) => {
                if let Err(e) = log::link_api_log(&state.pool, api_log_id, &audit_ids).await {
                    warn!(error = %e, api_log_id, "Failed to link audit rows to api log");
                }
            }
            Err(e) => warn!(error = %e, path = %path, "Failed to write api log"),
        }
    }

    response
}
