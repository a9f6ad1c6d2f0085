//! Route API Module
//!
//! 前端动态路由: 常量路由公开，用户路由与路由存在检查需要登录。

mod handler;

use axum::{Router, routing::get};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/v1/route/constant-routes", get(handler::constant_routes))
        .route("/api/v1/route/user-routes", get(handler::user_routes))
        .route("/api/v1/route/{route_name}/exists", get(handler::route_exists))
}
