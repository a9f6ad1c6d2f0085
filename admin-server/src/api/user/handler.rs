//! User API Handlers

use axum::Json;
use axum::extract::{Extension, Path, Query, State};
use shared::models::{
    LogDetailType, Page, PageQuery, User, UserCreate, UserQuery, UserUpdate, UserWithRoles,
};

use crate::auth::CurrentUser;
use crate::auth::password::hash_password;
use crate::core::ServerState;
use crate::db::repository::user;
use crate::services::audit;
use crate::utils::{AppError, AppResult, BatchDeleted, BatchIds, Deleted, ErrorCode};

async fn with_roles(state: &ServerState, user: User) -> AppResult<UserWithRoles> {
    let role_ids = user::role_ids(&state.pool, user.id).await?.to_vec();
    Ok(UserWithRoles { user, role_ids })
}

fn hash(password: &str) -> AppResult<String> {
    if password.is_empty() {
        return Err(AppError::invalid_field("password", "Password must not be empty"));
    }
    hash_password(password).map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))
}

/// GET /api/v1/system/users
pub async fn list(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Query(page): Query<PageQuery>,
    Query(query): Query<UserQuery>,
) -> AppResult<Json<Page<UserWithRoles>>> {
    let (users, total) = user::list(&state.pool, &query, &page).await?;
    let mut records = Vec::with_capacity(users.len());
    for u in users {
        records.push(with_roles(&state, u).await?);
    }
    audit::admin(&state.pool, current_user.id, LogDetailType::UserGetList).await;
    Ok(Json(Page::new(records, total, &page)))
}

/// GET /api/v1/system/users/{id}
pub async fn get_by_id(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<UserWithRoles>> {
    let found = user::find_by_id(&state.pool, id)
        .await?
        .ok_or_else(|| AppError::with_message(ErrorCode::UserNotFound, format!("User {id} not found")))?;
    audit::admin(&state.pool, current_user.id, LogDetailType::UserGetOne).await;
    Ok(Json(with_roles(&state, found).await?))
}

/// POST /api/v1/system/users
pub async fn create(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Json(payload): Json<UserCreate>,
) -> AppResult<Json<UserWithRoles>> {
    if payload.user_name.trim().is_empty() {
        return Err(AppError::invalid_field("userName", "userName must not be empty"));
    }
    let password_hash = hash(&payload.password)?;

    let created = user::create(&state.pool, payload, password_hash).await?;
    tracing::info!(
        user_id = current_user.id,
        created_id = created.id,
        user_name = %created.user_name,
        "User created"
    );
    audit::admin_with(
        &state.pool,
        current_user.id,
        LogDetailType::UserCreateOne,
        format!("user {}", created.id),
    )
    .await;
    Ok(Json(with_roles(&state, created).await?))
}

/// PATCH /api/v1/system/users/{id}
pub async fn update(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
    Json(payload): Json<UserUpdate>,
) -> AppResult<Json<UserWithRoles>> {
    let password_hash = match payload.password.as_deref() {
        Some(p) => Some(hash(p)?),
        None => None,
    };

    let updated = user::update(&state.pool, id, payload, password_hash).await?;
    tracing::info!(user_id = current_user.id, updated_id = id, "User updated");
    audit::admin_with(
        &state.pool,
        current_user.id,
        LogDetailType::UserUpdateOne,
        format!("user {id}"),
    )
    .await;
    Ok(Json(with_roles(&state, updated).await?))
}

/// DELETE /api/v1/system/users/{id}
pub async fn delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Path(id): Path<i64>,
) -> AppResult<Json<Deleted>> {
    if id == current_user.id {
        return Err(AppError::new(ErrorCode::CannotDeleteSelf));
    }

    user::delete(&state.pool, id).await?;
    tracing::info!(user_id = current_user.id, deleted_id = id, "User deleted");
    audit::admin_with(
        &state.pool,
        current_user.id,
        LogDetailType::UserDeleteOne,
        format!("user {id}"),
    )
    .await;
    Ok(Json(Deleted::new(id)))
}

/// DELETE /api/v1/system/users?ids=1,2,3
pub async fn batch_delete(
    State(state): State<ServerState>,
    Extension(current_user): Extension<CurrentUser>,
    Query(batch): Query<BatchIds>,
) -> AppResult<Json<BatchDeleted>> {
    let ids = batch.require()?;
    if ids.contains(current_user.id) {
        return Err(AppError::new(ErrorCode::CannotDeleteSelf));
    }

    user::delete_many(&state.pool, &ids).await?;
    tracing::info!(user_id = current_user.id, count = ids.len(), "Users deleted");
    audit::admin_with(
        &state.pool,
        current_user.id,
        LogDetailType::UserBatchDelete,
        format!("users {:?}", ids.to_vec()),
    )
    .await;
    Ok(Json(BatchDeleted::from(&ids)))
}
