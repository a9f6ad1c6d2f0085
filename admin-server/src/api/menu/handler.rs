//! Menu API Handlers

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use serde::Serialize;
use shared::models::{
    LogDetailType, Menu, MenuCreate, MenuFilter, MenuUpdate, Page, PageQuery, ROOT_MENU_ID,
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::menu;
use crate::navigation::{
    ButtonTreeNode, MenuLabel, MenuTreeNode, build_button_tree, build_menu_tree, group_buttons,
    label_tree,
};
use crate::services::audit;
use crate::utils::{AppError, AppResult, BatchDeleted, BatchIds, Deleted};

/// 菜单列表默认每页根节点数
const DEFAULT_MENU_PAGE_SIZE: u32 = 100;

/// Menu with the ids of its attached buttons
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuDetail {
    #[serde(flatten)]
    menu: Menu,
    button_ids: Vec<i64>,
}

async fn detail(state: &ServerState, menu: Menu) -> AppResult<MenuDetail> {
    let button_ids = menu::button_ids(&state.pool, menu.id).await?.to_vec();
    Ok(MenuDetail { menu, button_ids })
}

/// GET /api/v1/system/menus
///
/// Full tree with buttons; paging applies to the root menus.
pub async fn list(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<Page<MenuTreeNode>>> {
    let page = PageQuery {
        current: page.current,
        size: page.size.or(Some(DEFAULT_MENU_PAGE_SIZE)),
    };

    let menus = menu::list(&state.pool, MenuFilter::all()).await?;
    let buttons = group_buttons(menu::menu_buttons(&state.pool).await?);
    let roots = build_menu_tree(&menus, &buttons, false);

    let total = roots.len() as i64;
    let records = roots
        .into_iter()
        .skip(page.offset() as usize)
        .take(page.limit() as usize)
        .collect();

    audit::admin(&state.pool, current_user.id, LogDetailType::MenuGetList).await;
    Ok(Json(Page::new(records, total, &page)))
}

/// GET /api/v1/system/menus/tree
pub async fn tree(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<MenuLabel>>> {
    let menus = menu::list(&state.pool, MenuFilter::dynamic()).await?;
    audit::admin(&state.pool, current_user.id, LogDetailType::MenuGetTree).await;
    Ok(Json(label_tree(&menus)))
}

/// GET /api/v1/system/menus/pages
///
/// Route names of the first-level non-constant menus
pub async fn pages(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<String>>> {
    let filter = MenuFilter {
        constant: Some(false),
        parent_id: Some(ROOT_MENU_ID),
        ..MenuFilter::default()
    };
    let names = menu::list(&state.pool, filter)
        .await?
        .into_iter()
        .map(|m| m.route_name)
        .collect();
    audit::admin(&state.pool, current_user.id, LogDetailType::MenuGetPages).await;
    Ok(Json(names))
}

/// GET /api/v1/system/menus/buttons/tree
pub async fn buttons_tree(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<ButtonTreeNode>>> {
    let menus = menu::list(&state.pool, MenuFilter::all()).await?;
    let menu_buttons = menu::menu_buttons(&state.pool).await?;
    audit::admin(&state.pool, current_user.id, LogDetailType::MenuGetButtonsTree).await;
    Ok(Json(build_button_tree(&menus, menu_buttons)))
}

/// GET /api/v1/system/menus/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<MenuDetail>> {
    let found = menu::get(&state.pool, id).await?;
    audit::admin(&state.pool, current_user.id, LogDetailType::MenuGetOne).await;
    Ok(Json(detail(&state, found).await?))
}

/// POST /api/v1/system/menus
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<MenuCreate>,
) -> AppResult<Json<MenuDetail>> {
    if payload.menu_name.trim().is_empty() || payload.route_name.trim().is_empty() {
        return Err(AppError::validation("menuName and routeName are required"));
    }

    let created = menu::create(&state.pool, payload).await?;
    tracing::info!(
        user_id = current_user.id,
        menu_id = created.id,
        route_name = %created.route_name,
        "Menu created"
    );
    audit::admin_with(
        &state.pool,
        current_user.id,
        LogDetailType::MenuCreateOne,
        format!("menu {}", created.id),
    )
    .await;
    Ok(Json(detail(&state, created).await?))
}

/// PATCH /api/v1/system/menus/{id}
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<MenuUpdate>,
) -> AppResult<Json<MenuDetail>> {
    let updated = menu::update(&state.pool, id, payload).await?;
    tracing::info!(user_id = current_user.id, menu_id = id, "Menu updated");
    audit::admin_with(
        &state.pool,
        current_user.id,
        LogDetailType::MenuUpdateOne,
        format!("menu {id}"),
    )
    .await;
    Ok(Json(detail(&state, updated).await?))
}

/// DELETE /api/v1/system/menus/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Deleted>> {
    menu::delete(&state.pool, id).await?;
    tracing::info!(user_id = current_user.id, menu_id = id, "Menu deleted");
    audit::admin_with(
        &state.pool,
        current_user.id,
        LogDetailType::MenuDeleteOne,
        format!("menu {id}"),
    )
    .await;
    Ok(Json(Deleted::new(id)))
}

/// DELETE /api/v1/system/menus?ids=1,2,3
pub async fn batch_delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Query(batch): Query<BatchIds>,
) -> AppResult<Json<BatchDeleted>> {
    let ids = batch.require()?;
    menu::delete_many(&state.pool, &ids).await?;
    tracing::info!(user_id = current_user.id, count = ids.len(), "Menus deleted");
    audit::admin_with(
        &state.pool,
        current_user.id,
        LogDetailType::MenuBatchDelete,
        format!("menus {:?}", ids.to_vec()),
    )
    .await;
    Ok(Json(BatchDeleted::from(&ids)))
}
