//! Department API Module

mod handler;

use axum::{Router, routing::get};

use shared::models::MethodType;

use crate::core::ServerState;
use crate::services::ApiCatalogEntry;

const TAGS: &[&str] = &["System Manage", "Department Manage"];

/// Permission-checked endpoints of this router
pub const CATALOG: &[ApiCatalogEntry] = &[
    ApiCatalogEntry::new(MethodType::Get, "/api/v1/system/departments", "Get department list", TAGS),
    ApiCatalogEntry::new(MethodType::Post, "/api/v1/system/departments", "Create department", TAGS),
    ApiCatalogEntry::new(MethodType::Delete, "/api/v1/system/departments", "Batch delete departments", TAGS),
    ApiCatalogEntry::new(MethodType::Get, "/api/v1/system/departments/tree", "Get department tree", TAGS),
    ApiCatalogEntry::new(MethodType::Get, "/api/v1/system/departments/{id}", "Get department", TAGS),
    ApiCatalogEntry::new(MethodType::Patch, "/api/v1/system/departments/{id}", "Update department", TAGS),
    ApiCatalogEntry::new(MethodType::Delete, "/api/v1/system/departments/{id}", "Delete department", TAGS),
];

/// 部门管理路由 (需要 API 权限)
pub fn router() -> Router<ServerState> {
    Router::new()
        .route(
            "/api/v1/system/departments",
            get(handler::list)
                .post(handler::create)
                .delete(handler::batch_delete),
        )
        .route("/api/v1/system/departments/tree", get(handler::tree))
        .route(
            "/api/v1/system/departments/{id}",
            get(handler::get_by_id)
                .patch(handler::update)
                .delete(handler::delete),
        )
}
