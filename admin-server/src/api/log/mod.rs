//! Log API Module
//!
//! 审计日志只读 + 删除。

mod handler;

use axum::{Router, routing::get};

use shared::models::MethodType;

use crate::core::ServerState;
use crate::services::ApiCatalogEntry;

const TAGS: &[&str] = &["System Manage", "Log Manage"];

/// Permission-checked endpoints of this router
pub const CATALOG: &[ApiCatalogEntry] = &[
    ApiCatalogEntry::new(MethodType::Get, "/api/v1/system/logs", "Get log list", TAGS),
    ApiCatalogEntry::new(MethodType::Get, "/api/v1/system/logs/{id}", "Get log", TAGS),
    ApiCatalogEntry::new(MethodType::Delete, "/api/v1/system/logs/{id}", "Delete log", TAGS),
    ApiCatalogEntry::new(MethodType::Delete, "/api/v1/system/logs", "Batch delete logs", TAGS),
];

pub fn router() -> Router<ServerState> {
    Router::new()
        .route(
            "/api/v1/system/logs",
            get(handler::list).delete(handler::batch_delete),
        )
        .route(
            "/api/v1/system/logs/{id}",
            get(handler::get_by_id).delete(handler::delete),
        )
}
