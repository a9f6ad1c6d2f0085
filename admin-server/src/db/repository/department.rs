//! Department Repository
//!
//! Same parent graph rules as menus: `parent_id = 0` is a root, no FK,
//! writes refuse a missing parent or a cycle.

use super::{RepoError, RepoResult, count_with_ids, delete_ids, ensure_ids_exist, push_set};
use shared::IdSet;
use shared::error::ErrorCode;
use shared::models::{
    Department, DepartmentCreate, DepartmentQuery, DepartmentUpdate, PageQuery,
    ROOT_DEPARTMENT_ID, now_millis,
};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use std::collections::{HashMap, HashSet};

const DEPARTMENT_COLUMNS: &str =
    "id, name, manager_name, manager_id, \"order\", parent_id, created_at, updated_at";

fn department_not_found(id: i64) -> RepoError {
    RepoError::Business(ErrorCode::DepartmentNotFound, format!("Department {id} not found"))
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Department>> {
    let department = sqlx::query_as::<_, Department>(&format!(
        "SELECT {DEPARTMENT_COLUMNS} FROM departments WHERE id = ?"
    ))
    .bind(id)
    .fetch_optional(pool)
    .await?;
    Ok(department)
}

pub async fn get(pool: &SqlitePool, id: i64) -> RepoResult<Department> {
    find_by_id(pool, id).await?.ok_or_else(|| department_not_found(id))
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, query: &DepartmentQuery) {
    qb.push(" WHERE 1 = 1");
    if let Some(name) = &query.name {
        qb.push(" AND name LIKE ").push_bind(format!("%{name}%"));
    }
}

/// Flat page ordered by (`order`, `id`)
pub async fn list(
    pool: &SqlitePool,
    query: &DepartmentQuery,
    page: &PageQuery,
) -> RepoResult<(Vec<Department>, i64)> {
    let mut count_qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM departments");
    push_filters(&mut count_qb, query);
    let total: i64 = count_qb.build_query_scalar().fetch_one(pool).await?;

    let mut qb =
        QueryBuilder::<Sqlite>::new(format!("SELECT {DEPARTMENT_COLUMNS} FROM departments"));
    push_filters(&mut qb, query);
    qb.push(" ORDER BY \"order\", id LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
    let departments = qb.build_query_as::<Department>().fetch_all(pool).await?;

    Ok((departments, total))
}

/// Every department, for the tree
pub async fn all(pool: &SqlitePool) -> RepoResult<Vec<Department>> {
    let departments = sqlx::query_as::<_, Department>(&format!(
        "SELECT {DEPARTMENT_COLUMNS} FROM departments ORDER BY \"order\", id"
    ))
    .fetch_all(pool)
    .await?;
    Ok(departments)
}

/// Reject a parent that is missing or lies below `department_id`
async fn check_parent(
    conn: &mut SqliteConnection,
    department_id: Option<i64>,
    parent_id: i64,
) -> RepoResult<()> {
    if parent_id == ROOT_DEPARTMENT_ID {
        return Ok(());
    }
    let rows = sqlx::query_as::<_, (i64, i64)>("SELECT id, parent_id FROM departments")
        .fetch_all(&mut *conn)
        .await?;
    let parents: HashMap<i64, i64> = rows.into_iter().collect();
    if !parents.contains_key(&parent_id) {
        return Err(RepoError::Business(
            ErrorCode::DepartmentParentNotFound,
            format!("Parent department {parent_id} not found"),
        ));
    }

    let Some(department_id) = department_id else {
        return Ok(());
    };
    let mut visited = HashSet::new();
    let mut current = parent_id;
    while current != ROOT_DEPARTMENT_ID && visited.insert(current) {
        if current == department_id {
            return Err(RepoError::Business(
                ErrorCode::DepartmentCycleDetected,
                format!("Department {department_id} cannot be placed under {parent_id}"),
            ));
        }
        match parents.get(&current) {
            Some(&next) => current = next,
            None => break,
        }
    }
    Ok(())
}

fn check_name(name: &str) -> RepoResult<()> {
    if name.trim().is_empty() {
        return Err(RepoError::Validation("Department name must not be empty".into()));
    }
    Ok(())
}

pub async fn create(pool: &SqlitePool, data: DepartmentCreate) -> RepoResult<Department> {
    check_name(&data.name)?;
    let mut tx = pool.begin().await?;
    check_parent(&mut tx, None, data.parent_id).await?;

    let now = now_millis();
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO departments (name, manager_name, manager_id, \"order\", parent_id, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&data.name)
    .bind(&data.manager_name)
    .bind(data.manager_id)
    .bind(data.order)
    .bind(data.parent_id)
    .bind(now)
    .bind(now)
    .fetch_one(&mut *tx)
    .await?;
    tx.commit().await?;

    get(pool, id).await
}

/// Partial update; `Some(None)` clears a manager field
pub async fn update(pool: &SqlitePool, id: i64, data: DepartmentUpdate) -> RepoResult<Department> {
    if let Some(name) = &data.name {
        check_name(name)?;
    }
    let mut tx = pool.begin().await?;

    let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM departments WHERE id = ?")
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
    if exists == 0 {
        return Err(department_not_found(id));
    }
    if let Some(parent_id) = data.parent_id {
        check_parent(&mut tx, Some(id), parent_id).await?;
    }

    let mut qb: QueryBuilder<'static, Sqlite> =
        QueryBuilder::new("UPDATE departments SET updated_at = ");
    qb.push_bind(now_millis());
    push_set(&mut qb, "name", data.name);
    push_set(&mut qb, "manager_name", data.manager_name);
    push_set(&mut qb, "manager_id", data.manager_id);
    push_set(&mut qb, "\"order\"", data.order);
    push_set(&mut qb, "parent_id", data.parent_id);
    qb.push(" WHERE id = ").push_bind(id);
    qb.build().execute(&mut *tx).await?;
    tx.commit().await?;

    get(pool, id).await
}

/// Delete a department without children
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    get(pool, id).await?;

    let children =
        sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM departments WHERE parent_id = ?")
            .bind(id)
            .fetch_one(pool)
            .await?;
    if children > 0 {
        return Err(RepoError::Business(
            ErrorCode::DepartmentHasChildren,
            format!("Department {id} has {children} child department(s)"),
        ));
    }

    sqlx::query("DELETE FROM departments WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Delete several departments; children must be in the same batch
pub async fn delete_many(pool: &SqlitePool, ids: &IdSet) -> RepoResult<()> {
    let mut tx = pool.begin().await?;
    ensure_ids_exist(&mut *tx, "departments", ids, ErrorCode::DepartmentNotFound).await?;

    let orphaned = count_with_ids(
        &mut tx,
        "SELECT COUNT(*) FROM departments WHERE parent_id IN ({ids}) AND id NOT IN ({ids})",
        ids,
    )
    .await?;
    if orphaned > 0 {
        return Err(RepoError::Business(
            ErrorCode::DepartmentHasChildren,
            format!("{orphaned} child department(s) would be left without a parent"),
        ));
    }

    delete_ids(&mut tx, "departments", ids).await?;
    tx.commit().await?;
    Ok(())
}
