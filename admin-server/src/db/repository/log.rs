//! Audit Log Repository
//!
//! `logs` and `api_logs` are append-only; only the admin delete endpoint
//! removes rows.

use super::{RepoError, RepoResult, delete_ids, ensure_ids_exist};
use shared::IdSet;
use shared::error::ErrorCode;
use shared::models::{ApiLog, Log, LogQuery, NewApiLog, NewLog, PageQuery, now_millis};
use sqlx::{QueryBuilder, Sqlite, SqlitePool};

const LOG_COLUMNS: &str =
    "id, log_type, by_user_id, api_log_id, log_detail_type, detail, created_at";

pub async fn insert(pool: &SqlitePool, log: &NewLog) -> RepoResult<i64> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO logs (log_type, by_user_id, api_log_id, log_detail_type, detail, created_at) \
         VALUES (?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(log.log_type)
    .bind(log.by_user_id)
    .bind(log.api_log_id)
    .bind(log.log_detail_type)
    .bind(&log.detail)
    .bind(now_millis())
    .fetch_one(pool)
    .await?;
    Ok(id)
}

pub async fn insert_api_log(pool: &SqlitePool, log: &NewApiLog) -> RepoResult<i64> {
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO api_logs (ip_address, user_agent, request_url, request_method, response_code, process_time, created_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&log.ip_address)
    .bind(&log.user_agent)
    .bind(&log.request_url)
    .bind(&log.request_method)
    .bind(log.response_code)
    .bind(log.process_time)
    .bind(now_millis())
    .fetch_one(pool)
    .await?;
    Ok(id)
}

pub async fn find_api_log(pool: &SqlitePool, id: i64) -> RepoResult<Option<ApiLog>> {
    let row = sqlx::query_as::<_, ApiLog>(
        "SELECT id, ip_address, user_agent, request_url, request_method, response_code, process_time, created_at \
         FROM api_logs WHERE id = ?",
    )
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(row)
}

/// Point audit rows at the request log they were written under
pub async fn link_api_log(pool: &SqlitePool, api_log_id: i64, log_ids: &[i64]) -> RepoResult<u64> {
    if log_ids.is_empty() {
        return Ok(0);
    }
    let sql = format!(
        "UPDATE logs SET api_log_id = ? WHERE id IN ({})",
        super::placeholders(log_ids.len())
    );
    let mut query = sqlx::query(&sql).bind(api_log_id);
    for id in log_ids {
        query = query.bind(id);
    }
    Ok(query.execute(pool).await?.rows_affected())
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Log>> {
    let log = sqlx::query_as::<_, Log>(&format!("SELECT {LOG_COLUMNS} FROM logs WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(log)
}

pub async fn get(pool: &SqlitePool, id: i64) -> RepoResult<Log> {
    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Business(ErrorCode::LogNotFound, format!("Log {id} not found")))
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, query: &LogQuery) {
    qb.push(" WHERE 1 = 1");
    if let Some(log_type) = query.log_type {
        qb.push(" AND log_type = ").push_bind(log_type);
    }
    if let Some(user_id) = query.by_user_id {
        qb.push(" AND by_user_id = ").push_bind(user_id);
    }
    if let Some(detail) = query.log_detail_type {
        qb.push(" AND log_detail_type = ").push_bind(detail);
    }
}

/// Newest first
pub async fn list(
    pool: &SqlitePool,
    query: &LogQuery,
    page: &PageQuery,
) -> RepoResult<(Vec<Log>, i64)> {
    let mut count_qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM logs");
    push_filters(&mut count_qb, query);
    let total: i64 = count_qb.build_query_scalar().fetch_one(pool).await?;

    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {LOG_COLUMNS} FROM logs"));
    push_filters(&mut qb, query);
    qb.push(" ORDER BY created_at DESC, id DESC LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
    let logs = qb.build_query_as::<Log>().fetch_all(pool).await?;

    Ok((logs, total))
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let rows = sqlx::query("DELETE FROM logs WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::Business(
            ErrorCode::LogNotFound,
            format!("Log {id} not found"),
        ));
    }
    Ok(())
}

pub async fn delete_many(pool: &SqlitePool, ids: &IdSet) -> RepoResult<()> {
    let mut tx = pool.begin().await?;
    ensure_ids_exist(&mut *tx, "logs", ids, ErrorCode::LogNotFound).await?;
    delete_ids(&mut tx, "logs", ids).await?;
    tx.commit().await?;
    Ok(())
}
