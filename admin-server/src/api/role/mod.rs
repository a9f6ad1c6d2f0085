//! Role API Module
//!
//! 角色 CRUD 以及菜单 / API / 按钮授权。

mod handler;

use axum::{Router, routing::get};

use shared::models::MethodType;

use crate::core::ServerState;
use crate::services::ApiCatalogEntry;

const TAGS: &[&str] = &["System Manage", "Role Manage"];

/// Permission-checked endpoints of this router
pub const CATALOG: &[ApiCatalogEntry] = &[
    ApiCatalogEntry::new(MethodType::Get, "/api/v1/system/roles", "Get role list", TAGS),
    ApiCatalogEntry::new(MethodType::Post, "/api/v1/system/roles", "Create role", TAGS),
    ApiCatalogEntry::new(MethodType::Get, "/api/v1/system/roles/{id}", "Get role", TAGS),
    ApiCatalogEntry::new(MethodType::Patch, "/api/v1/system/roles/{id}", "Update role", TAGS),
    ApiCatalogEntry::new(MethodType::Delete, "/api/v1/system/roles/{id}", "Delete role", TAGS),
    ApiCatalogEntry::new(MethodType::Get, "/api/v1/system/roles/{id}/menus", "Get role menus", TAGS),
    ApiCatalogEntry::new(MethodType::Patch, "/api/v1/system/roles/{id}/menus", "Update role menus", TAGS),
    ApiCatalogEntry::new(MethodType::Get, "/api/v1/system/roles/{id}/apis", "Get role apis", TAGS),
    ApiCatalogEntry::new(MethodType::Patch, "/api/v1/system/roles/{id}/apis", "Update role apis", TAGS),
    ApiCatalogEntry::new(MethodType::Get, "/api/v1/system/roles/{id}/buttons", "Get role buttons", TAGS),
    ApiCatalogEntry::new(MethodType::Patch, "/api/v1/system/roles/{id}/buttons", "Update role buttons", TAGS),
    ApiCatalogEntry::new(MethodType::Delete, "/api/v1/system/roles", "Batch delete roles", TAGS),
];

/// 角色管理路由 (需要 API 权限)
pub fn router() -> Router<ServerState> {
    Router::new()
        .route(
            "/api/v1/system/roles",
            get(handler::list)
                .post(handler::create)
                .delete(handler::batch_delete),
        )
        .route(
            "/api/v1/system/roles/{id}",
            get(handler::get_by_id)
                .patch(handler::update)
                .delete(handler::delete),
        )
        .route(
            "/api/v1/system/roles/{id}/menus",
            get(handler::get_menus).patch(handler::update_menus),
        )
        .route(
            "/api/v1/system/roles/{id}/apis",
            get(handler::get_apis).patch(handler::update_apis),
        )
        .route(
            "/api/v1/system/roles/{id}/buttons",
            get(handler::get_buttons).patch(handler::update_buttons),
        )
}
