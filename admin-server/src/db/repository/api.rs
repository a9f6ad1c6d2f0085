//! Api Repository

use super::{RepoError, RepoResult, delete_ids, ensure_ids_exist};
use shared::IdSet;
use shared::error::ErrorCode;
use shared::models::{Api, ApiCreate, ApiQuery, ApiUpdate, PageQuery, now_millis};
use sqlx::types::Json;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

pub(crate) const API_COLUMNS: &str =
    "id, path, method, summary, tags, status, created_at, updated_at";

fn map_unique(err: RepoError) -> RepoError {
    match err {
        RepoError::Duplicate(_) => RepoError::Business(
            ErrorCode::ApiExists,
            "An api with this method and path already exists".into(),
        ),
        other => other,
    }
}

fn api_not_found(id: i64) -> RepoError {
    RepoError::Business(ErrorCode::ApiNotFound, format!("Api {id} not found"))
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Api>> {
    let api = sqlx::query_as::<_, Api>(&format!("SELECT {API_COLUMNS} FROM apis WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(api)
}

pub async fn get(pool: &SqlitePool, id: i64) -> RepoResult<Api> {
    find_by_id(pool, id).await?.ok_or_else(|| api_not_found(id))
}

/// All apis ordered by id
pub async fn all(conn: &mut SqliteConnection) -> RepoResult<Vec<Api>> {
    let apis = sqlx::query_as::<_, Api>(&format!("SELECT {API_COLUMNS} FROM apis ORDER BY id"))
        .fetch_all(&mut *conn)
        .await?;
    Ok(apis)
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, query: &ApiQuery) {
    qb.push(" WHERE 1 = 1");
    if let Some(path) = &query.path {
        qb.push(" AND path LIKE ").push_bind(format!("%{path}%"));
    }
    if let Some(method) = query.method {
        qb.push(" AND method = ").push_bind(method);
    }
    if let Some(status) = query.status {
        qb.push(" AND status = ").push_bind(status);
    }
}

pub async fn list(
    pool: &SqlitePool,
    query: &ApiQuery,
    page: &PageQuery,
) -> RepoResult<(Vec<Api>, i64)> {
    let mut count_qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM apis");
    push_filters(&mut count_qb, query);
    let total: i64 = count_qb.build_query_scalar().fetch_one(pool).await?;

    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {API_COLUMNS} FROM apis"));
    push_filters(&mut qb, query);
    qb.push(" ORDER BY id LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
    let apis = qb.build_query_as::<Api>().fetch_all(pool).await?;

    Ok((apis, total))
}

pub async fn insert(conn: &mut SqliteConnection, data: &ApiCreate) -> RepoResult<i64> {
    let now = now_millis();
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO apis (path, method, summary, tags, status, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&data.path)
    .bind(data.method)
    .bind(&data.summary)
    .bind(Json(&data.tags))
    .bind(data.status.unwrap_or_default())
    .bind(now)
    .bind(now)
    .fetch_one(&mut *conn)
    .await
    .map_err(|e| map_unique(e.into()))?;
    Ok(id)
}

pub async fn create(pool: &SqlitePool, data: ApiCreate) -> RepoResult<Api> {
    let mut conn = pool.acquire().await?;
    let id = insert(&mut conn, &data).await?;
    drop(conn);
    get(pool, id).await
}

/// Overwrite summary and tags (catalog reconciliation)
pub async fn update_meta(
    conn: &mut SqliteConnection,
    id: i64,
    summary: &str,
    tags: &[String],
) -> RepoResult<()> {
    sqlx::query("UPDATE apis SET summary = ?, tags = ?, updated_at = ? WHERE id = ?")
        .bind(summary)
        .bind(Json(tags))
        .bind(now_millis())
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

pub async fn update(pool: &SqlitePool, id: i64, data: ApiUpdate) -> RepoResult<Api> {
    let rows = sqlx::query(
        "UPDATE apis SET path = COALESCE(?1, path), method = COALESCE(?2, method), \
         summary = COALESCE(?3, summary), tags = COALESCE(?4, tags), \
         status = COALESCE(?5, status), updated_at = ?6 WHERE id = ?7",
    )
    .bind(&data.path)
    .bind(data.method)
    .bind(&data.summary)
    .bind(data.tags.as_ref().map(Json))
    .bind(data.status)
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| map_unique(e.into()))?;

    if rows.rows_affected() == 0 {
        return Err(api_not_found(id));
    }
    get(pool, id).await
}

pub async fn delete_in(conn: &mut SqliteConnection, id: i64) -> RepoResult<bool> {
    let rows = sqlx::query("DELETE FROM apis WHERE id = ?")
        .bind(id)
        .execute(&mut *conn)
        .await?;
    Ok(rows.rows_affected() > 0)
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let mut conn = pool.acquire().await?;
    if delete_in(&mut conn, id).await? {
        Ok(())
    } else {
        Err(api_not_found(id))
    }
}

/// Delete several apis at once; role grants cascade
pub async fn delete_many(pool: &SqlitePool, ids: &IdSet) -> RepoResult<()> {
    let mut tx = pool.begin().await?;
    ensure_ids_exist(&mut *tx, "apis", ids, ErrorCode::ApiNotFound).await?;
    delete_ids(&mut tx, "apis", ids).await?;
    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use shared::models::{MethodType, StatusType};

    fn new_api(path: &str, method: MethodType) -> ApiCreate {
        ApiCreate {
            path: path.into(),
            method,
            summary: "test".into(),
            tags: vec!["A".into(), "B".into()],
            status: None,
        }
    }

    #[tokio::test]
    async fn test_create_and_duplicate() {
        let db = DbService::in_memory().await.unwrap();
        let api = create(&db.pool, new_api("/x/{id}", MethodType::Get))
            .await
            .unwrap();
        assert_eq!(api.tags, vec!["A".to_string(), "B".to_string()]);
        assert_eq!(api.status, StatusType::Enable);

        let err = create(&db.pool, new_api("/x/{id}", MethodType::Get))
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::ApiExists, _)));

        // Same path, other method is a different api
        create(&db.pool, new_api("/x/{id}", MethodType::Delete))
            .await
            .unwrap();
    }

    #[tokio::test]
    async fn test_list_filters_by_method() {
        let db = DbService::in_memory().await.unwrap();
        let page = PageQuery {
            current: Some(1),
            size: Some(100),
        };
        let query = ApiQuery {
            path: Some("/system/logs".into()),
            method: Some(MethodType::Delete),
            status: None,
        };
        let (apis, total) = list(&db.pool, &query, &page).await.unwrap();
        assert_eq!(total, 1);
        assert_eq!(apis[0].path, "/api/v1/system/logs/{id}");
    }

    #[tokio::test]
    async fn test_update_and_delete_missing() {
        let db = DbService::in_memory().await.unwrap();
        let err = update(&db.pool, 9999, ApiUpdate::default()).await.unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::ApiNotFound, _)));
        let err = delete(&db.pool, 9999).await.unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::ApiNotFound, _)));
    }

    #[tokio::test]
    async fn test_disable_api() {
        let db = DbService::in_memory().await.unwrap();
        let api = create(&db.pool, new_api("/y", MethodType::Post)).await.unwrap();
        let updated = update(
            &db.pool,
            api.id,
            ApiUpdate {
                status: Some(StatusType::Disable),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.status, StatusType::Disable);
        assert_eq!(updated.path, "/y");
    }
}
