//! Api API Handlers

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use shared::models::{
    Api, ApiCreate, ApiQuery, ApiRefreshSummary, ApiUpdate, LogDetailType, Page, PageQuery,
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::{RepoError, api};
use crate::navigation::{ApiTreeNode, build_api_tree};
use crate::services::{api_sync, audit};
use crate::utils::{AppError, AppResult, BatchDeleted, BatchIds, Deleted};

/// GET /api/v1/system/apis
pub async fn list(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Query(page): Query<PageQuery>,
    Query(query): Query<ApiQuery>,
) -> AppResult<Json<Page<Api>>> {
    let (apis, total) = api::list(&state.pool, &query, &page).await?;
    audit::admin(&state.pool, current_user.id, LogDetailType::ApiGetList).await;
    Ok(Json(Page::new(apis, total, &page)))
}

/// GET /api/v1/system/apis/tree
pub async fn tree(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<ApiTreeNode>>> {
    let mut conn = state.pool.acquire().await.map_err(RepoError::from)?;
    let apis = api::all(&mut conn).await?;
    drop(conn);

    audit::admin(&state.pool, current_user.id, LogDetailType::ApiGetTree).await;
    Ok(Json(build_api_tree(&apis)))
}

/// POST /api/v1/system/apis/refresh
pub async fn refresh(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<ApiRefreshSummary>> {
    let summary = api_sync::refresh_apis(&state.pool, &state.catalog).await?;
    tracing::info!(
        user_id = current_user.id,
        created = summary.created,
        updated = summary.updated,
        deleted = summary.deleted,
        "API catalog refreshed"
    );
    audit::admin_with(
        &state.pool,
        current_user.id,
        LogDetailType::ApiRefresh,
        format!(
            "created {}, updated {}, deleted {}",
            summary.created, summary.updated, summary.deleted
        ),
    )
    .await;
    Ok(Json(summary))
}

/// GET /api/v1/system/apis/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Api>> {
    let found = api::get(&state.pool, id).await?;
    audit::admin(&state.pool, current_user.id, LogDetailType::ApiGetOne).await;
    Ok(Json(found))
}

/// POST /api/v1/system/apis
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<ApiCreate>,
) -> AppResult<Json<Api>> {
    if !payload.path.starts_with('/') {
        return Err(AppError::invalid_field("path", "Api path must start with '/'"));
    }

    let created = api::create(&state.pool, payload).await?;
    tracing::info!(
        user_id = current_user.id,
        api_id = created.id,
        method = %created.method,
        path = %created.path,
        "Api created"
    );
    audit::admin_with(
        &state.pool,
        current_user.id,
        LogDetailType::ApiCreateOne,
        format!("api {}", created.id),
    )
    .await;
    Ok(Json(created))
}

/// PATCH /api/v1/system/apis/{id}
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<ApiUpdate>,
) -> AppResult<Json<Api>> {
    if payload.path.as_deref().is_some_and(|p| !p.starts_with('/')) {
        return Err(AppError::invalid_field("path", "Api path must start with '/'"));
    }

    let updated = api::update(&state.pool, id, payload).await?;
    tracing::info!(user_id = current_user.id, api_id = id, "Api updated");
    audit::admin_with(
        &state.pool,
        current_user.id,
        LogDetailType::ApiUpdateOne,
        format!("api {id}"),
    )
    .await;
    Ok(Json(updated))
}

/// DELETE /api/v1/system/apis/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Deleted>> {
    api::delete(&state.pool, id).await?;
    tracing::info!(user_id = current_user.id, api_id = id, "Api deleted");
    audit::admin_with(
        &state.pool,
        current_user.id,
        LogDetailType::ApiDeleteOne,
        format!("api {id}"),
    )
    .await;
    Ok(Json(Deleted::new(id)))
}

/// DELETE /api/v1/system/apis?ids=1,2,3
pub async fn batch_delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Query(batch): Query<BatchIds>,
) -> AppResult<Json<BatchDeleted>> {
    let ids = batch.require()?;
    api::delete_many(&state.pool, &ids).await?;
    tracing::info!(user_id = current_user.id, count = ids.len(), "Apis deleted");
    audit::admin_with(
        &state.pool,
        current_user.id,
        LogDetailType::ApiBatchDelete,
        format!("apis {:?}", ids.to_vec()),
    )
    .await;
    Ok(Json(BatchDeleted::from(&ids)))
}
