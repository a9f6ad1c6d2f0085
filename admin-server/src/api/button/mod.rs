//! Button API Module

mod handler;

use axum::{Router, routing::get};

use shared::models::MethodType;

use crate::core::ServerState;
use crate::services::ApiCatalogEntry;

const TAGS: &[&str] = &["System Manage", "Button Manage"];

/// Permission-checked endpoints of this router
pub const CATALOG: &[ApiCatalogEntry] = &[
    ApiCatalogEntry::new(MethodType::Get, "/api/v1/system/buttons", "Get button list", TAGS),
    ApiCatalogEntry::new(MethodType::Post, "/api/v1/system/buttons", "Create button", TAGS),
    ApiCatalogEntry::new(MethodType::Get, "/api/v1/system/buttons/{id}", "Get button", TAGS),
    ApiCatalogEntry::new(MethodType::Patch, "/api/v1/system/buttons/{id}", "Update button", TAGS),
    ApiCatalogEntry::new(MethodType::Delete, "/api/v1/system/buttons/{id}", "Delete button", TAGS),
    ApiCatalogEntry::new(MethodType::Delete, "/api/v1/system/buttons", "Batch delete buttons", TAGS),
];

/// 按钮管理路由 (需要 API 权限)
pub fn router() -> Router<ServerState> {
    Router::new()
        .route(
            "/api/v1/system/buttons",
            get(handler::list)
                .post(handler::create)
                .delete(handler::batch_delete),
        )
        .route(
            "/api/v1/system/buttons/{id}",
            get(handler::get_by_id)
                .patch(handler::update)
                .delete(handler::delete),
        )
}
