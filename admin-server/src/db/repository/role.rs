//! Role Repository
//!
//! Roles own their grant rows (`role_menus`, `role_apis`, `role_buttons`).
//! The grant writers take an open connection so that callers can wrap a
//! whole edit in one transaction.

use super::{RepoError, RepoResult, count_with_ids, delete_ids, ensure_ids_exist};
use super::{api::API_COLUMNS, menu::MENU_COLUMNS};
use shared::IdSet;
use shared::error::ErrorCode;
use shared::models::{
    Api, DEFAULT_ROLE_HOME, Menu, PageQuery, Role, RoleCreate, RoleQuery, RoleUpdate,
    SUPER_ADMIN_ROLE_CODE, now_millis,
};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

const ROLE_COLUMNS: &str =
    "id, role_name, role_code, role_desc, role_home, status, created_at, updated_at";

fn map_unique(err: RepoError) -> RepoError {
    match err {
        RepoError::Duplicate(msg) if msg.contains("role_code") => {
            RepoError::Business(ErrorCode::RoleCodeExists, "Role code already exists".into())
        }
        RepoError::Duplicate(msg) if msg.contains("role_name") => {
            RepoError::Business(ErrorCode::RoleNameExists, "Role name already exists".into())
        }
        other => other,
    }
}

fn role_not_found(id: i64) -> RepoError {
    RepoError::Business(ErrorCode::RoleNotFound, format!("Role {id} not found"))
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Role>> {
    let role = sqlx::query_as::<_, Role>(&format!("SELECT {ROLE_COLUMNS} FROM roles WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(role)
}

/// Like [`find_by_id`] but absent is an error
pub async fn get(pool: &SqlitePool, id: i64) -> RepoResult<Role> {
    find_by_id(pool, id).await?.ok_or_else(|| role_not_found(id))
}

pub async fn find_by_code(pool: &SqlitePool, role_code: &str) -> RepoResult<Option<Role>> {
    let role = sqlx::query_as::<_, Role>(&format!(
        "SELECT {ROLE_COLUMNS} FROM roles WHERE role_code = ? LIMIT 1"
    ))
    .bind(role_code)
    .fetch_optional(pool)
    .await?;
    Ok(role)
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, query: &RoleQuery) {
    qb.push(" WHERE 1 = 1");
    if let Some(name) = &query.role_name {
        qb.push(" AND role_name LIKE ").push_bind(format!("%{name}%"));
    }
    if let Some(code) = &query.role_code {
        qb.push(" AND role_code LIKE ").push_bind(format!("%{code}%"));
    }
    if let Some(status) = query.status {
        qb.push(" AND status = ").push_bind(status);
    }
}

pub async fn list(
    pool: &SqlitePool,
    query: &RoleQuery,
    page: &PageQuery,
) -> RepoResult<(Vec<Role>, i64)> {
    let mut count_qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM roles");
    push_filters(&mut count_qb, query);
    let total: i64 = count_qb.build_query_scalar().fetch_one(pool).await?;

    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {ROLE_COLUMNS} FROM roles"));
    push_filters(&mut qb, query);
    qb.push(" ORDER BY id LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
    let roles = qb.build_query_as::<Role>().fetch_all(pool).await?;

    Ok((roles, total))
}

pub async fn create(pool: &SqlitePool, data: RoleCreate) -> RepoResult<Role> {
    let now = now_millis();
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO roles (role_name, role_code, role_desc, role_home, status, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&data.role_name)
    .bind(&data.role_code)
    .bind(&data.role_desc)
    .bind(data.role_home.as_deref().unwrap_or(DEFAULT_ROLE_HOME))
    .bind(data.status.unwrap_or_default())
    .bind(now)
    .bind(now)
    .fetch_one(pool)
    .await
    .map_err(|e| map_unique(e.into()))?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create role".into()))
}

pub async fn update(pool: &SqlitePool, id: i64, data: RoleUpdate) -> RepoResult<Role> {
    let existing = get(pool, id).await?;

    // The super role keeps its code and stays enabled
    if existing.is_super_admin {
        let code_changed = data
            .role_code
            .as_deref()
            .is_some_and(|c| c != existing.role_code);
        let disabled = data.status.is_some_and(|s| !s.is_enabled());
        if code_changed || disabled {
            return Err(RepoError::Business(
                ErrorCode::SuperRoleImmutable,
                "Cannot change the code or status of the super role".into(),
            ));
        }
    }

    sqlx::query(
        "UPDATE roles SET role_name = COALESCE(?1, role_name), role_code = COALESCE(?2, role_code), \
         role_desc = COALESCE(?3, role_desc), role_home = COALESCE(?4, role_home), \
         status = COALESCE(?5, status), updated_at = ?6 WHERE id = ?7",
    )
    .bind(&data.role_name)
    .bind(&data.role_code)
    .bind(&data.role_desc)
    .bind(&data.role_home)
    .bind(data.status)
    .bind(now_millis())
    .bind(id)
    .execute(pool)
    .await
    .map_err(|e| map_unique(e.into()))?;

    get(pool, id).await
}

pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let existing = get(pool, id).await?;
    if existing.is_super_admin {
        return Err(RepoError::Business(
            ErrorCode::SuperRoleImmutable,
            "Cannot delete the super role".into(),
        ));
    }

    let bound = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM user_roles WHERE role_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    if bound > 0 {
        return Err(RepoError::Business(
            ErrorCode::RoleInUse,
            format!("Role {id} is bound to {bound} user(s)"),
        ));
    }

    sqlx::query("DELETE FROM roles WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Delete several roles at once; all or nothing
pub async fn delete_many(pool: &SqlitePool, ids: &IdSet) -> RepoResult<()> {
    let mut tx = pool.begin().await?;
    ensure_ids_exist(&mut *tx, "roles", ids, ErrorCode::RoleNotFound).await?;

    let sql = format!(
        "SELECT COUNT(*) FROM roles WHERE role_code = '{SUPER_ADMIN_ROLE_CODE}' AND id IN ({{ids}})"
    );
    if count_with_ids(&mut tx, &sql, ids).await? > 0 {
        return Err(RepoError::Business(
            ErrorCode::SuperRoleImmutable,
            "Cannot delete the super role".into(),
        ));
    }

    let bound =
        count_with_ids(&mut tx, "SELECT COUNT(*) FROM user_roles WHERE role_id IN ({ids})", ids)
            .await?;
    if bound > 0 {
        return Err(RepoError::Business(
            ErrorCode::RoleInUse,
            format!("Roles are bound to {bound} user(s)"),
        ));
    }

    delete_ids(&mut tx, "roles", ids).await?;
    tx.commit().await?;
    Ok(())
}

// ========== Grants (read) ==========

async fn grant_ids(pool: &SqlitePool, sql: &str, role_id: i64) -> RepoResult<IdSet> {
    let ids = sqlx::query_scalar::<_, i64>(sql)
        .bind(role_id)
        .fetch_all(pool)
        .await?;
    Ok(ids.into_iter().collect())
}

pub async fn menu_ids(pool: &SqlitePool, role_id: i64) -> RepoResult<IdSet> {
    grant_ids(pool, "SELECT menu_id FROM role_menus WHERE role_id = ?", role_id).await
}

pub async fn api_ids(pool: &SqlitePool, role_id: i64) -> RepoResult<IdSet> {
    grant_ids(pool, "SELECT api_id FROM role_apis WHERE role_id = ?", role_id).await
}

pub async fn button_ids(pool: &SqlitePool, role_id: i64) -> RepoResult<IdSet> {
    grant_ids(pool, "SELECT button_id FROM role_buttons WHERE role_id = ?", role_id).await
}

/// Apis granted to a role, any status
pub async fn apis(pool: &SqlitePool, role_id: i64) -> RepoResult<Vec<Api>> {
    let apis = sqlx::query_as::<_, Api>(&format!(
        "SELECT {API_COLUMNS} FROM apis a JOIN role_apis ra ON ra.api_id = a.id \
         WHERE ra.role_id = ? ORDER BY a.id"
    ))
    .bind(role_id)
    .fetch_all(pool)
    .await?;
    Ok(apis)
}

/// Menus directly granted to a role, any status
pub async fn menus(pool: &SqlitePool, role_id: i64) -> RepoResult<Vec<Menu>> {
    let menus = sqlx::query_as::<_, Menu>(&format!(
        "SELECT {MENU_COLUMNS} FROM menus m JOIN role_menus rm ON rm.menu_id = m.id \
         WHERE rm.role_id = ? ORDER BY m.id"
    ))
    .bind(role_id)
    .fetch_all(pool)
    .await?;
    Ok(menus)
}

// ========== Grants (write, inside a transaction) ==========

/// Lock the role row for the rest of the transaction and check it exists
pub async fn get_for_update(conn: &mut SqliteConnection, id: i64) -> RepoResult<Role> {
    // SQLite has no SELECT ... FOR UPDATE; touching the row takes the write lock
    let rows = sqlx::query("UPDATE roles SET updated_at = ? WHERE id = ?")
        .bind(now_millis())
        .bind(id)
        .execute(&mut *conn)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(role_not_found(id));
    }

    let role = sqlx::query_as::<_, Role>(&format!("SELECT {ROLE_COLUMNS} FROM roles WHERE id = ?"))
        .bind(id)
        .fetch_one(&mut *conn)
        .await?;
    Ok(role)
}

pub async fn set_home(conn: &mut SqliteConnection, role_id: i64, role_home: &str) -> RepoResult<()> {
    sqlx::query("UPDATE roles SET role_home = ? WHERE id = ?")
        .bind(role_home)
        .bind(role_id)
        .execute(&mut *conn)
        .await?;
    Ok(())
}

async fn replace_grants(
    conn: &mut SqliteConnection,
    role_id: i64,
    table: &'static str,
    column: &'static str,
    ids: &IdSet,
) -> RepoResult<()> {
    sqlx::query(&format!("DELETE FROM {table} WHERE role_id = ?"))
        .bind(role_id)
        .execute(&mut *conn)
        .await?;

    let insert = format!("INSERT INTO {table} (role_id, {column}) VALUES (?, ?)");
    for id in ids.iter() {
        sqlx::query(&insert)
            .bind(role_id)
            .bind(id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

pub async fn replace_menus(conn: &mut SqliteConnection, role_id: i64, ids: &IdSet) -> RepoResult<()> {
    ensure_ids_exist(&mut *conn, "menus", ids, ErrorCode::MenuNotFound).await?;
    replace_grants(conn, role_id, "role_menus", "menu_id", ids).await
}

pub async fn replace_apis(conn: &mut SqliteConnection, role_id: i64, ids: &IdSet) -> RepoResult<()> {
    ensure_ids_exist(&mut *conn, "apis", ids, ErrorCode::ApiNotFound).await?;
    replace_grants(conn, role_id, "role_apis", "api_id", ids).await
}

pub async fn replace_buttons(conn: &mut SqliteConnection, role_id: i64, ids: &IdSet) -> RepoResult<()> {
    ensure_ids_exist(&mut *conn, "buttons", ids, ErrorCode::ButtonNotFound).await?;
    replace_grants(conn, role_id, "role_buttons", "button_id", ids).await
}
