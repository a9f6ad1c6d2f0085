//! Menu API Module

mod handler;

use axum::{Router, routing::get};

use shared::models::MethodType;

use crate::core::ServerState;
use crate::services::ApiCatalogEntry;

const TAGS: &[&str] = &["System Manage", "Menu Manage"];

/// Permission-checked endpoints of this router
pub const CATALOG: &[ApiCatalogEntry] = &[
    ApiCatalogEntry::new(MethodType::Get, "/api/v1/system/menus", "Get menu list", TAGS),
    ApiCatalogEntry::new(MethodType::Post, "/api/v1/system/menus", "Create menu", TAGS),
    ApiCatalogEntry::new(MethodType::Get, "/api/v1/system/menus/tree", "Get menu tree", TAGS),
    ApiCatalogEntry::new(MethodType::Get, "/api/v1/system/menus/pages", "Get menu pages", TAGS),
    ApiCatalogEntry::new(MethodType::Get, "/api/v1/system/menus/buttons/tree", "Get menu button tree", TAGS),
    ApiCatalogEntry::new(MethodType::Get, "/api/v1/system/menus/{id}", "Get menu", TAGS),
    ApiCatalogEntry::new(MethodType::Patch, "/api/v1/system/menus/{id}", "Update menu", TAGS),
    ApiCatalogEntry::new(MethodType::Delete, "/api/v1/system/menus/{id}", "Delete menu", TAGS),
    ApiCatalogEntry::new(MethodType::Delete, "/api/v1/system/menus", "Batch delete menus", TAGS),
];

/// 菜单管理路由 (需要 API 权限)
///
/// 固定路径 (`tree`, `pages`, `buttons/tree`) 优先于 `{id}` 匹配。
pub fn router() -> Router<ServerState> {
    Router::new()
        .route(
            "/api/v1/system/menus",
            get(handler::list)
                .post(handler::create)
                .delete(handler::batch_delete),
        )
        .route("/api/v1/system/menus/tree", get(handler::tree))
        .route("/api/v1/system/menus/pages", get(handler::pages))
        .route("/api/v1/system/menus/buttons/tree", get(handler::buttons_tree))
        .route(
            "/api/v1/system/menus/{id}",
            get(handler::get_by_id)
                .patch(handler::update)
                .delete(handler::delete),
        )
}
