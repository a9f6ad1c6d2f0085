//! Department API Handlers

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use shared::models::{
    Department, DepartmentCreate, DepartmentQuery, DepartmentUpdate, LogDetailType, Page,
    PageQuery,
};

use crate::auth::CurrentUser;
use crate::core::ServerState;
use crate::db::repository::department;
use crate::navigation::{DepartmentNode, build_department_tree};
use crate::services::audit;
use crate::utils::{AppError, AppResult, BatchDeleted, BatchIds, Deleted};

/// GET /api/v1/system/departments
pub async fn list(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Query(page): Query<PageQuery>,
    Query(query): Query<DepartmentQuery>,
) -> AppResult<Json<Page<Department>>> {
    let (departments, total) = department::list(&state.pool, &query, &page).await?;
    audit::admin(&state.pool, current_user.id, LogDetailType::DepartmentGetList).await;
    Ok(Json(Page::new(departments, total, &page)))
}

/// GET /api/v1/system/departments/tree
pub async fn tree(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
) -> AppResult<Json<Vec<DepartmentNode>>> {
    let departments = department::all(&state.pool).await?;
    audit::admin(&state.pool, current_user.id, LogDetailType::DepartmentGetTree).await;
    Ok(Json(build_department_tree(&departments)))
}

/// GET /api/v1/system/departments/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Department>> {
    let found = department::get(&state.pool, id).await?;
    audit::admin(&state.pool, current_user.id, LogDetailType::DepartmentGetOne).await;
    Ok(Json(found))
}

/// POST /api/v1/system/departments
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<DepartmentCreate>,
) -> AppResult<Json<Department>> {
    if payload.name.trim().is_empty() {
        return Err(AppError::invalid_field("name", "name must not be empty"));
    }

    let created = department::create(&state.pool, payload).await?;
    tracing::info!(
        user_id = current_user.id,
        department_id = created.id,
        parent_id = created.parent_id,
        "Department created"
    );
    audit::admin_with(
        &state.pool,
        current_user.id,
        LogDetailType::DepartmentCreateOne,
        format!("department {}", created.id),
    )
    .await;
    Ok(Json(created))
}

/// PATCH /api/v1/system/departments/{id}
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<DepartmentUpdate>,
) -> AppResult<Json<Department>> {
    if payload.name.as_deref().is_some_and(|n| n.trim().is_empty()) {
        return Err(AppError::invalid_field("name", "name must not be empty"));
    }

    let updated = department::update(&state.pool, id, payload).await?;
    audit::admin_with(
        &state.pool,
        current_user.id,
        LogDetailType::DepartmentUpdateOne,
        format!("department {id}"),
    )
    .await;
    Ok(Json(updated))
}

/// DELETE /api/v1/system/departments/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Deleted>> {
    department::delete(&state.pool, id).await?;
    tracing::info!(user_id = current_user.id, department_id = id, "Department deleted");
    audit::admin_with(
        &state.pool,
        current_user.id,
        LogDetailType::DepartmentDeleteOne,
        format!("department {id}"),
    )
    .await;
    Ok(Json(Deleted::new(id)))
}

/// DELETE /api/v1/system/departments?ids=1,2,3
pub async fn batch_delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Query(batch): Query<BatchIds>,
) -> AppResult<Json<BatchDeleted>> {
    let ids = batch.require()?;
    department::delete_many(&state.pool, &ids).await?;
    tracing::info!(user_id = current_user.id, count = ids.len(), "Departments deleted");
    audit::admin_with(
        &state.pool,
        current_user.id,
        LogDetailType::DepartmentBatchDelete,
        format!("departments {:?}", ids.to_vec()),
    )
    .await;
    Ok(Json(BatchDeleted::from(&ids)))
}
