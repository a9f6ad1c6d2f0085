//! Role API Handlers

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use shared::models::{
    LogDetailType, Page, PageQuery, Role, RoleApis, RoleButtons, RoleCreate, RoleMenus,
    RoleMenusUpdate, RoleQuery, RoleUpdate,
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::role;
use crate::services::{audit, role_grants};
use crate::utils::{AppError, AppResult, BatchDeleted, BatchIds, Deleted};

/// GET /api/v1/system/roles
pub async fn list(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Query(page): Query<PageQuery>,
    Query(query): Query<RoleQuery>,
) -> AppResult<Json<Page<Role>>> {
    let (roles, total) = role::list(&state.pool, &query, &page).await?;
    audit::admin(&state.pool, current_user.id, LogDetailType::RoleGetList).await;
    Ok(Json(Page::new(roles, total, &page)))
}

/// GET /api/v1/system/roles/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Role>> {
    let found = role::get(&state.pool, id).await?;
    audit::admin(&state.pool, current_user.id, LogDetailType::RoleGetOne).await;
    Ok(Json(found))
}

/// POST /api/v1/system/roles
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<RoleCreate>,
) -> AppResult<Json<Role>> {
    if payload.role_code.trim().is_empty() || payload.role_name.trim().is_empty() {
        return Err(AppError::validation("roleName and roleCode are required"));
    }

    let created = role::create(&state.pool, payload).await?;
    tracing::info!(
        user_id = current_user.id,
        role_id = created.id,
        role_code = %created.role_code,
        "Role created"
    );
    audit::admin_with(
        &state.pool,
        current_user.id,
        LogDetailType::RoleCreateOne,
        format!("role {}", created.id),
    )
    .await;
    Ok(Json(created))
}

/// PATCH /api/v1/system/roles/{id}
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<RoleUpdate>,
) -> AppResult<Json<Role>> {
    let updated = role::update(&state.pool, id, payload).await?;
    tracing::info!(user_id = current_user.id, role_id = id, "Role updated");
    audit::admin_with(
        &state.pool,
        current_user.id,
        LogDetailType::RoleUpdateOne,
        format!("role {id}"),
    )
    .await;
    Ok(Json(updated))
}

/// DELETE /api/v1/system/roles/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Deleted>> {
    role::delete(&state.pool, id).await?;
    tracing::info!(user_id = current_user.id, role_id = id, "Role deleted");
    audit::admin_with(
        &state.pool,
        current_user.id,
        LogDetailType::RoleDeleteOne,
        format!("role {id}"),
    )
    .await;
    Ok(Json(Deleted::new(id)))
}

// ========== Grants ==========

/// GET /api/v1/system/roles/{id}/menus
pub async fn get_menus(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<RoleMenus>> {
    let menus = role_grants::get_role_menus(&state.pool, id).await?;
    audit::admin(&state.pool, current_user.id, LogDetailType::RoleGetMenus).await;
    Ok(Json(menus))
}

/// PATCH /api/v1/system/roles/{id}/menus
pub async fn update_menus(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<RoleMenusUpdate>,
) -> AppResult<Json<RoleMenus>> {
    let menus = role_grants::update_role_menus(&state.pool, &state.grant_locks, id, payload).await?;
    audit::admin_with(
        &state.pool,
        current_user.id,
        LogDetailType::RoleUpdateMenus,
        format!("role {id}: {} menus", menus.menu_ids.len()),
    )
    .await;
    Ok(Json(menus))
}

/// GET /api/v1/system/roles/{id}/apis
pub async fn get_apis(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<RoleApis>> {
    let apis = role_grants::get_role_apis(&state.pool, id).await?;
    audit::admin(&state.pool, current_user.id, LogDetailType::RoleGetApis).await;
    Ok(Json(apis))
}

/// PATCH /api/v1/system/roles/{id}/apis
pub async fn update_apis(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<RoleApis>,
) -> AppResult<Json<RoleApis>> {
    let apis =
        role_grants::update_role_apis(&state.pool, &state.grant_locks, id, payload.api_ids).await?;
    audit::admin_with(
        &state.pool,
        current_user.id,
        LogDetailType::RoleUpdateApis,
        format!("role {id}: {} apis", apis.api_ids.len()),
    )
    .await;
    Ok(Json(apis))
}

/// GET /api/v1/system/roles/{id}/buttons
pub async fn get_buttons(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<RoleButtons>> {
    let buttons = role_grants::get_role_buttons(&state.pool, id).await?;
    audit::admin(&state.pool, current_user.id, LogDetailType::RoleGetButtons).await;
    Ok(Json(buttons))
}

/// PATCH /api/v1/system/roles/{id}/buttons
pub async fn update_buttons(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<RoleButtons>,
) -> AppResult<Json<RoleButtons>> {
    let buttons =
        role_grants::update_role_buttons(&state.pool, &state.grant_locks, id, payload.button_ids)
            .await?;
    audit::admin_with(
        &state.pool,
        current_user.id,
        LogDetailType::RoleUpdateButtons,
        format!("role {id}: {} buttons", buttons.button_ids.len()),
    )
    .await;
    Ok(Json(buttons))
}

/// DELETE /api/v1/system/roles?ids=1,2,3
pub async fn batch_delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Query(batch): Query<BatchIds>,
) -> AppResult<Json<BatchDeleted>> {
    let ids = batch.require()?;
    role::delete_many(&state.pool, &ids).await?;
    tracing::info!(user_id = current_user.id, count = ids.len(), "Roles deleted");
    audit::admin_with(
        &state.pool,
        current_user.id,
        LogDetailType::RoleBatchDelete,
        format!("roles {:?}", ids.to_vec()),
    )
    .await;
    Ok(Json(BatchDeleted::from(&ids)))
}
