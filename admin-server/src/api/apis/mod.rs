//! Api API Module
//!
//! API 资源管理、分组树以及目录同步。

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use shared::models::MethodType;

use crate::core::ServerState;
use crate::services::ApiCatalogEntry;

const TAGS: &[&str] = &["System Manage", "API Manage"];

/// Permission-checked endpoints of this router
pub const CATALOG: &[ApiCatalogEntry] = &[
    ApiCatalogEntry::new(MethodType::Get, "/api/v1/system/apis", "Get api list", TAGS),
    ApiCatalogEntry::new(MethodType::Post, "/api/v1/system/apis", "Create api", TAGS),
    ApiCatalogEntry::new(MethodType::Get, "/api/v1/system/apis/tree", "Get api tree", TAGS),
    ApiCatalogEntry::new(MethodType::Post, "/api/v1/system/apis/refresh", "Refresh apis", TAGS),
    ApiCatalogEntry::new(MethodType::Get, "/api/v1/system/apis/{id}", "Get api", TAGS),
    ApiCatalogEntry::new(MethodType::Patch, "/api/v1/system/apis/{id}", "Update api", TAGS),
    ApiCatalogEntry::new(MethodType::Delete, "/api/v1/system/apis/{id}", "Delete api", TAGS),
    ApiCatalogEntry::new(MethodType::Delete, "/api/v1/system/apis", "Batch delete apis", TAGS),
];

/// API 管理路由 (需要 API 权限)
pub fn router() -> Router<ServerState> {
    Router::new()
        .route(
            "/api/v1/system/apis",
            get(handler::list)
                .post(handler::create)
                .delete(handler::batch_delete),
        )
        .route("/api/v1/system/apis/tree", get(handler::tree))
        .route("/api/v1/system/apis/refresh", post(handler::refresh))
        .route(
            "/api/v1/system/apis/{id}",
            get(handler::get_by_id)
                .patch(handler::update)
                .delete(handler::delete),
        )
}
