//! Button Repository

use super::{RepoError, RepoResult, delete_ids, ensure_ids_exist};
use shared::IdSet;
use shared::error::ErrorCode;
use shared::models::{Button, ButtonCreate, ButtonUpdate, PageQuery};
use sqlx::SqlitePool;

const BUTTON_COLUMNS: &str = "id, button_code, button_desc, status";

fn map_unique(err: RepoError) -> RepoError {
    match err {
        RepoError::Duplicate(_) => {
            RepoError::Business(ErrorCode::ButtonCodeExists, "Button code already exists".into())
        }
        other => other,
    }
}

fn button_not_found(id: i64) -> RepoError {
    RepoError::Business(ErrorCode::ButtonNotFound, format!("Button {id} not found"))
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Button>> {
    let button = sqlx::query_as::<_, Button>(&format!(
        "SELECT {BUTTON_COLUMNS} FROM buttons WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(button)
}

pub async fn get(pool: &SqlitePool, id: i64) -> RepoResult<Button> {
    find_by_id(pool, id).await?.ok_or_else(|| button_not_found(id))
}

pub async fn list(pool: &SqlitePool, page: &PageQuery) -> RepoResult<(Vec<Button>, i64)> {
    let total = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM buttons")
        .fetch_one(pool)
        .await?;
    let buttons = sqlx::query_as::<_, Button>(&format!(
        "SELECT {BUTTON_COLUMNS} FROM buttons ORDER BY id LIMIT ? OFFSET ?"
    ))
    .bind(page.limit())
    .bind(page.offset())
    .fetch_all(pool)
    .await?;
    Ok((buttons, total))
}

pub async fn create(pool: &SqlitePool, data: ButtonCreate) -> RepoResult<Button> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO buttons (button_code, button_desc, status) VALUES (?, ?, ?) RETURNING id",
    )
    .bind(&data.button_code)
    .bind(&data.button_desc)
    .bind(data.status.unwrap_or_default())
    .fetch_one(pool)
    .await
    .map_err(|e| map_unique(e.into()))?;

    get(pool, id).await
}

pub async fn update(pool: &SqlitePool, id: i64, data: ButtonUpdate) -> RepoResult<Button> {
    let rows = sqlx::query(
        "UPDATE buttons SET button_code = COALESCE(?1, button_code), \
         button_desc = COALESCE(?2, button_desc), status = COALESCE(?3, status) WHERE id = ?4",
    )
    .bind(&data.button_code)
    .bind(&data.button_desc)
    .bind(data.status)
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| map_unique(e.into()))?;

    if rows.rows_affected() == 0 {
        return Err(button_not_found(id));
    }
    get(pool, id).await
}

/// Delete a button; menu links and role grants cascade
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM buttons WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(button_not_found(id));
    }
    Ok(())
}

/// Delete several buttons at once; menu links and role grants cascade
pub async fn delete_many(pool: &SqlitePool, ids: &IdSet) -> RepoResult<()> {
    let mut tx = pool.begin().await?;
    ensure_ids_exist(&mut *tx, "buttons", ids, ErrorCode::ButtonNotFound).await?;
    delete_ids(&mut tx, "buttons", ids).await?;
    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::repository::role;

    #[tokio::test]
    async fn test_button_crud() {
        let db = DbService::in_memory().await.unwrap();
        let button = create(
            &db.pool,
            ButtonCreate {
                button_code: "B_LOG_EXPORT".into(),
                button_desc: "Export logs".into(),
                status: None,
            },
        )
        .await
        .unwrap();
        assert_eq!(button.button_code, "B_LOG_EXPORT");

        let err = create(
            &db.pool,
            ButtonCreate {
                button_code: "B_LOG_EXPORT".into(),
                button_desc: "again".into(),
                status: None,
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::ButtonCodeExists, _)));

        let updated = update(
            &db.pool,
            button.id,
            ButtonUpdate {
                button_desc: Some("Export audit logs".into()),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.button_desc, "Export audit logs");
        assert_eq!(updated.button_code, "B_LOG_EXPORT");
    }

    #[tokio::test]
    async fn test_delete_cascades_grants() {
        let db = DbService::in_memory().await.unwrap();
        delete(&db.pool, 1).await.unwrap();

        let admin_buttons = role::button_ids(&db.pool, 2).await.unwrap();
        assert!(!admin_buttons.contains(1));
        assert_eq!(admin_buttons.len(), 5);

        let err = delete(&db.pool, 1).await.unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::ButtonNotFound, _)));
    }

    #[tokio::test]
    async fn test_delete_many_rejects_unknown() {
        let db = DbService::in_memory().await.unwrap();
        let err = delete_many(&db.pool, &IdSet::from(vec![1, 404])).await.unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::ButtonNotFound, _)));
        assert!(find_by_id(&db.pool, 1).await.unwrap().is_some());

        delete_many(&db.pool, &IdSet::from(vec![4, 5, 6])).await.unwrap();
        assert_eq!(role::button_ids(&db.pool, 2).await.unwrap().to_vec(), vec![1, 2, 3]);
    }
}
