//! Repository Module
//!
//! Explicit SQL per entity. Every function takes a `&SqlitePool` (or an open
//! transaction) and returns [`RepoResult`].

pub mod api;
pub mod button;
pub mod department;
pub mod log;
pub mod menu;
pub mod role;
pub mod user;

use shared::IdSet;
use shared::error::{AppError, ErrorCode};
use sqlx::{Encode, Executor, QueryBuilder, Sqlite, SqliteConnection, Type};
use thiserror::Error;

/// Repository error types
#[derive(Debug, Error)]
pub enum RepoError {
    #[error("Not found: {0}")]
    NotFound(String),

    #[error("Duplicate: {0}")]
    Duplicate(String),

    #[error("Database error: {0}")]
    Database(String),

    #[error("Validation error: {0}")]
    Validation(String),

    /// Domain rule violation carrying its own error code
    #[error("{1}")]
    Business(ErrorCode, String),
}

impl From<sqlx::Error> for RepoError {
    fn from(err: sqlx::Error) -> Self {
        match err {
            sqlx::Error::RowNotFound => RepoError::NotFound("Record not found".into()),
            sqlx::Error::Database(ref db) if db.is_unique_violation() => {
                RepoError::Duplicate(db.message().to_string())
            }
            other => RepoError::Database(other.to_string()),
        }
    }
}

impl From<RepoError> for AppError {
    fn from(err: RepoError) -> Self {
        match err {
            RepoError::NotFound(msg) => AppError::with_message(ErrorCode::NotFound, msg),
            RepoError::Duplicate(msg) => AppError::duplicate(msg),
            RepoError::Database(msg) => AppError::database(msg),
            RepoError::Validation(msg) => AppError::validation(msg),
            RepoError::Business(code, msg) => AppError::with_message(code, msg),
        }
    }
}

/// Result type for repository operations
pub type RepoResult<T> = Result<T, RepoError>;

/// Build `?, ?, ?` for an `IN (...)` clause
pub(crate) fn placeholders(n: usize) -> String {
    vec!["?"; n].join(", ")
}

/// Reject ids that have no row in `table`
///
/// `table` is always a crate constant, never user input.
pub(crate) async fn ensure_ids_exist<'e, E>(
    executor: E,
    table: &'static str,
    ids: &IdSet,
    code: ErrorCode,
) -> RepoResult<()>
where
    E: Executor<'e, Database = Sqlite>,
{
    if ids.is_empty() {
        return Ok(());
    }

    let sql = format!(
        "SELECT id FROM {table} WHERE id IN ({})",
        placeholders(ids.len())
    );
    let mut query = sqlx::query_scalar::<_, i64>(&sql);
    for id in ids.iter() {
        query = query.bind(id);
    }
    let found: IdSet = query.fetch_all(executor).await?.into_iter().collect();

    let missing = ids.difference(&found);
    if missing.is_empty() {
        Ok(())
    } else {
        Err(RepoError::Business(
            code,
            format!("Unknown {table} ids: {:?}", missing.to_vec()),
        ))
    }
}

/// Append `, column = ?` to an `UPDATE ... SET` when the field is present
pub(crate) fn push_set<T>(qb: &mut QueryBuilder<'static, Sqlite>, column: &str, value: Option<T>)
where
    T: 'static + Encode<'static, Sqlite> + Type<Sqlite> + Send,
{
    if let Some(value) = value {
        qb.push(", ").push(column).push(" = ").push_bind(value);
    }
}

/// Count rows of `sql`; every `{ids}` expands to the id placeholders
///
/// `sql` is always a crate constant, never user input.
pub(crate) async fn count_with_ids(
    conn: &mut SqliteConnection,
    sql: &str,
    ids: &IdSet,
) -> RepoResult<i64> {
    if ids.is_empty() {
        return Ok(0);
    }
    let occurrences = sql.matches("{ids}").count();
    let sql = sql.replace("{ids}", &placeholders(ids.len()));
    let mut query = sqlx::query_scalar::<_, i64>(&sql);
    for _ in 0..occurrences {
        for id in ids.iter() {
            query = query.bind(id);
        }
    }
    Ok(query.fetch_one(&mut *conn).await?)
}

/// Delete every row of `table` whose id is in `ids`
pub(crate) async fn delete_ids(
    conn: &mut SqliteConnection,
    table: &'static str,
    ids: &IdSet,
) -> RepoResult<u64> {
    if ids.is_empty() {
        return Ok(0);
    }
    let sql = format!("DELETE FROM {table} WHERE id IN ({})", placeholders(ids.len()));
    let mut query = sqlx::query(&sql);
    for id in ids.iter() {
        query = query.bind(id);
    }
    Ok(query.execute(&mut *conn).await?.rows_affected())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_placeholders() {
        assert_eq!(placeholders(1), "?");
        assert_eq!(placeholders(3), "?, ?, ?");
    }

    #[test]
    fn test_business_error_keeps_code() {
        let err: AppError =
            RepoError::Business(ErrorCode::MenuCycleDetected, "cycle".into()).into();
        assert_eq!(err.code, ErrorCode::MenuCycleDetected);
        assert_eq!(err.message, "cycle");
    }

    #[test]
    fn test_duplicate_maps_to_already_exists() {
        let err: AppError = RepoError::Duplicate("users.user_name".into()).into();
        assert_eq!(err.code, ErrorCode::AlreadyExists);
    }
}
