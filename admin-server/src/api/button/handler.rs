//! Button API Handlers

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use shared::models::{Button, ButtonCreate, ButtonUpdate, LogDetailType, Page, PageQuery};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::button;
use crate::services::audit;
use crate::utils::{AppError, AppResult, BatchDeleted, BatchIds, Deleted};

/// GET /api/v1/system/buttons
pub async fn list(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Query(page): Query<PageQuery>,
) -> AppResult<Json<Page<Button>>> {
    let (buttons, total) = button::list(&state.pool, &page).await?;
    audit::admin(&state.pool, current_user.id, LogDetailType::ButtonGetList).await;
    Ok(Json(Page::new(buttons, total, &page)))
}

/// GET /api/v1/system/buttons/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Button>> {
    let found = button::get(&state.pool, id).await?;
    audit::admin(&state.pool, current_user.id, LogDetailType::ButtonGetOne).await;
    Ok(Json(found))
}

/// POST /api/v1/system/buttons
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<ButtonCreate>,
) -> AppResult<Json<Button>> {
    if payload.button_code.trim().is_empty() {
        return Err(AppError::invalid_field("buttonCode", "buttonCode must not be empty"));
    }

    let created = button::create(&state.pool, payload).await?;
    tracing::info!(
        user_id = current_user.id,
        button_id = created.id,
        button_code = %created.button_code,
        "Button created"
    );
    audit::admin_with(
        &state.pool,
        current_user.id,
        LogDetailType::ButtonCreateOne,
        format!("button {}", created.id),
    )
    .await;
    Ok(Json(created))
}

/// PATCH /api/v1/system/buttons/{id}
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<ButtonUpdate>,
) -> AppResult<Json<Button>> {
    let updated = button::update(&state.pool, id, payload).await?;
    audit::admin_with(
        &state.pool,
        current_user.id,
        LogDetailType::ButtonUpdateOne,
        format!("button {id}"),
    )
    .await;
    Ok(Json(updated))
}

/// DELETE /api/v1/system/buttons/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Deleted>> {
    button::delete(&state.pool, id).await?;
    tracing::info!(user_id = current_user.id, button_id = id, "Button deleted");
    audit::admin_with(
        &state.pool,
        current_user.id,
        LogDetailType::ButtonDeleteOne,
        format!("button {id}"),
    )
    .await;
    Ok(Json(Deleted::new(id)))
}

/// DELETE /api/v1/system/buttons?ids=1,2,3
pub async fn batch_delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Query(batch): Query<BatchIds>,
) -> AppResult<Json<BatchDeleted>> {
    let ids = batch.require()?;
    button::delete_many(&state.pool, &ids).await?;
    tracing::info!(user_id = current_user.id, count = ids.len(), "Buttons deleted");
    audit::admin_with(
        &state.pool,
        current_user.id,
        LogDetailType::ButtonBatchDelete,
        format!("buttons {:?}", ids.to_vec()),
    )
    .await;
    Ok(Json(BatchDeleted::from(&ids)))
}
