//! Log API Handlers

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use serde::Serialize;
use shared::models::{ApiLog, Log, LogDetailType, LogQuery, Page, PageQuery};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::log;
use crate::services::audit;
use crate::utils::{AppResult, BatchDeleted, BatchIds, Deleted};

/// Audit row with the request it was written for
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LogDetail {
    #[serde(flatten)]
    log: Log,
    #[serde(skip_serializing_if = "Option::is_none")]
    api_log: Option<ApiLog>,
}

/// GET /api/v1/system/logs
pub async fn list(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Query(page): Query<PageQuery>,
    Query(query): Query<LogQuery>,
) -> AppResult<Json<Page<Log>>> {
    let (logs, total) = log::list(&state.pool, &query, &page).await?;
    audit::admin(&state.pool, current_user.id, LogDetailType::LogGetList).await;
    Ok(Json(Page::new(logs, total, &page)))
}

/// GET /api/v1/system/logs/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<LogDetail>> {
    let found = log::get(&state.pool, id).await?;
    let api_log = match found.api_log_id {
        Some(api_log_id) => log::find_api_log(&state.pool, api_log_id).await?,
        None => None,
    };
    audit::admin(&state.pool, current_user.id, LogDetailType::LogGetOne).await;
    Ok(Json(LogDetail { log: found, api_log }))
}

/// DELETE /api/v1/system/logs/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Deleted>> {
    log::delete(&state.pool, id).await?;
    tracing::info!(user_id = current_user.id, log_id = id, "Audit log deleted");
    audit::admin_with(
        &state.pool,
        current_user.id,
        LogDetailType::LogDeleteOne,
        format!("log {id}"),
    )
    .await;
    Ok(Json(Deleted::new(id)))
}

/// DELETE /api/v1/system/logs?ids=1,2,3
pub async fn batch_delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Query(batch): Query<BatchIds>,
) -> AppResult<Json<BatchDeleted>> {
    let ids = batch.require()?;
    log::delete_many(&state.pool, &ids).await?;
    tracing::info!(user_id = current_user.id, count = ids.len(), "Audit logs deleted");
    audit::admin_with(
        &state.pool,
        current_user.id,
        LogDetailType::LogBatchDelete,
        format!("logs {:?}", ids.to_vec()),
    )
    .await;
    Ok(Json(BatchDeleted::from(&ids)))
}
