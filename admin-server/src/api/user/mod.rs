//! User API Module

mod handler;

use axum::{Router, routing::get};

use shared::models::MethodType;

use crate::core::ServerState;
use crate::services::ApiCatalogEntry;

const TAGS: &[&str] = &["System Manage", "User Manage"];

/// Permission-checked endpoints of this router
pub const CATALOG: &[ApiCatalogEntry] = &[
    ApiCatalogEntry::new(MethodType::Get, "/api/v1/system/users", "Get user list", TAGS),
    ApiCatalogEntry::new(MethodType::Post, "/api/v1/system/users", "Create user", TAGS),
    ApiCatalogEntry::new(MethodType::Get, "/api/v1/system/users/{id}", "Get user", TAGS),
    ApiCatalogEntry::new(MethodType::Patch, "/api/v1/system/users/{id}", "Update user", TAGS),
    ApiCatalogEntry::new(MethodType::Delete, "/api/v1/system/users/{id}", "Delete user", TAGS),
    ApiCatalogEntry::new(MethodType::Delete, "/api/v1/system/users", "Batch delete users", TAGS),
];

/// 用户管理路由 (需要 API 权限)
pub fn router() -> Router<ServerState> {
    Router::new()
        .route(
            "/api/v1/system/users",
            get(handler::list)
                .post(handler::create)
                .delete(handler::batch_delete),
        )
        .route(
            "/api/v1/system/users/{id}",
            get(handler::get_by_id)
                .patch(handler::update)
                .delete(handler::delete),
        )
}
