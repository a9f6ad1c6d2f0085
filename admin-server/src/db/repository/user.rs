//! User Repository

use super::{RepoError, RepoResult, count_with_ids, delete_ids, ensure_ids_exist};
use shared::IdSet;
use shared::error::ErrorCode;
use shared::models::{
    GenderType, PageQuery, Role, StatusType, User, UserCreate, UserQuery, UserUpdate, now_millis,
};
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};

const USER_COLUMNS: &str = "id, user_name, password, nick_name, user_gender, user_email, user_phone, last_login, status, created_at, updated_at";

/// Map unique-constraint failures to user-specific codes
fn map_unique(err: RepoError) -> RepoError {
    match err {
        RepoError::Duplicate(msg) if msg.contains("user_email") => {
            RepoError::Business(ErrorCode::EmailExists, "Email already in use".into())
        }
        RepoError::Duplicate(msg) if msg.contains("user_name") => {
            RepoError::Business(ErrorCode::UsernameExists, "Username already exists".into())
        }
        other => other,
    }
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!("SELECT {USER_COLUMNS} FROM users WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(user)
}

pub async fn find_by_user_name(pool: &SqlitePool, user_name: &str) -> RepoResult<Option<User>> {
    let user = sqlx::query_as::<_, User>(&format!(
        "SELECT {USER_COLUMNS} FROM users WHERE user_name = ? LIMIT 1"
    ))
    .bind(user_name)
    .fetch_optional(pool)
    .await?;
    Ok(user)
}

pub async fn count(pool: &SqlitePool) -> RepoResult<i64> {
    let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM users")
        .fetch_one(pool)
        .await?;
    Ok(n)
}

fn push_filters(qb: &mut QueryBuilder<'_, Sqlite>, query: &UserQuery) {
    qb.push(" WHERE 1 = 1");
    if let Some(name) = &query.user_name {
        qb.push(" AND user_name LIKE ").push_bind(format!("%{name}%"));
    }
    if let Some(nick) = &query.nick_name {
        qb.push(" AND nick_name LIKE ").push_bind(format!("%{nick}%"));
    }
    if let Some(status) = query.status {
        qb.push(" AND status = ").push_bind(status);
    }
}

/// One page of users matching the filter, newest first
pub async fn list(
    pool: &SqlitePool,
    query: &UserQuery,
    page: &PageQuery,
) -> RepoResult<(Vec<User>, i64)> {
    let mut count_qb = QueryBuilder::<Sqlite>::new("SELECT COUNT(*) FROM users");
    push_filters(&mut count_qb, query);
    let total: i64 = count_qb.build_query_scalar().fetch_one(pool).await?;

    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {USER_COLUMNS} FROM users"));
    push_filters(&mut qb, query);
    qb.push(" ORDER BY id DESC LIMIT ")
        .push_bind(page.limit())
        .push(" OFFSET ")
        .push_bind(page.offset());
    let users = qb.build_query_as::<User>().fetch_all(pool).await?;

    Ok((users, total))
}

/// Role ids bound to a user
pub async fn role_ids(pool: &SqlitePool, user_id: i64) -> RepoResult<IdSet> {
    let ids = sqlx::query_scalar::<_, i64>("SELECT role_id FROM user_roles WHERE user_id = ?")
        .bind(user_id)
        .fetch_all(pool)
        .await?;
    Ok(ids.into_iter().collect())
}

/// Roles bound to a user, ascending id
pub async fn roles(pool: &SqlitePool, user_id: i64) -> RepoResult<Vec<Role>> {
    let roles = sqlx::query_as::<_, Role>(
        "SELECT r.id, r.role_name, r.role_code, r.role_desc, r.role_home, r.status, r.created_at, r.updated_at \
         FROM roles r JOIN user_roles ur ON ur.role_id = r.id \
         WHERE ur.user_id = ? ORDER BY r.id",
    )
    .bind(user_id)
    .fetch_all(pool)
    .await?;
    Ok(roles)
}

/// Enabled button codes granted to a user through its enabled roles
pub async fn button_codes(pool: &SqlitePool, user_id: i64) -> RepoResult<Vec<String>> {
    let codes = sqlx::query_scalar::<_, String>(
        "SELECT DISTINCT b.button_code FROM buttons b \
         JOIN role_buttons rb ON rb.button_id = b.id \
         JOIN roles r ON r.id = rb.role_id \
         JOIN user_roles ur ON ur.role_id = r.id \
         WHERE ur.user_id = ? AND b.status = ? AND r.status = ? \
         ORDER BY b.button_code",
    )
    .bind(user_id)
    .bind(StatusType::Enable)
    .bind(StatusType::Enable)
    .fetch_all(pool)
    .await?;
    Ok(codes)
}

async fn replace_roles(conn: &mut SqliteConnection, user_id: i64, role_ids: &IdSet) -> RepoResult<()> {
    ensure_ids_exist(&mut *conn, "roles", role_ids, ErrorCode::RoleNotFound).await?;

    sqlx::query("DELETE FROM user_roles WHERE user_id = ?")
        .bind(user_id)
        .execute(&mut *conn)
        .await?;
    for role_id in role_ids.iter() {
        sqlx::query("INSERT INTO user_roles (user_id, role_id) VALUES (?, ?)")
            .bind(user_id)
            .bind(role_id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

/// Create a user with an already hashed password and its role bindings
pub async fn create(pool: &SqlitePool, data: UserCreate, password_hash: String) -> RepoResult<User> {
    let now = now_millis();
    let mut tx = pool.begin().await?;

    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO users (user_name, password, nick_name, user_gender, user_email, user_phone, status, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&data.user_name)
    .bind(&password_hash)
    .bind(&data.nick_name)
    .bind(data.user_gender.unwrap_or(GenderType::Unknown))
    .bind(&data.user_email)
    .bind(&data.user_phone)
    .bind(data.status.unwrap_or_default())
    .bind(now)
    .bind(now)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| map_unique(e.into()))?;

    replace_roles(&mut tx, id, &IdSet::from(data.role_ids)).await?;
    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::Database("Failed to create user".into()))
}

/// Partial update; `role_ids` replaces the bindings when present
pub async fn update(
    pool: &SqlitePool,
    id: i64,
    data: UserUpdate,
    password_hash: Option<String>,
) -> RepoResult<User> {
    let mut tx = pool.begin().await?;

    let rows = sqlx::query(
        "UPDATE users SET user_name = COALESCE(?1, user_name), password = COALESCE(?2, password), \
         nick_name = COALESCE(?3, nick_name), user_gender = COALESCE(?4, user_gender), \
         user_email = COALESCE(?5, user_email), user_phone = COALESCE(?6, user_phone), \
         status = COALESCE(?7, status), updated_at = ?8 WHERE id = ?9",
    )
    .bind(&data.user_name)
    .bind(&password_hash)
    .bind(&data.nick_name)
    .bind(data.user_gender)
    .bind(&data.user_email)
    .bind(&data.user_phone)
    .bind(data.status)
    .bind(now_millis())
    .bind(id)
    .execute(&mut *tx)
    .await
    .map_err(|e| map_unique(e.into()))?;

    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {id} not found")));
    }

    if let Some(role_ids) = data.role_ids {
        replace_roles(&mut tx, id, &IdSet::from(role_ids)).await?;
    }
    tx.commit().await?;

    find_by_id(pool, id)
        .await?
        .ok_or_else(|| RepoError::NotFound(format!("User {id} not found")))
}

pub async fn touch_last_login(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    sqlx::query("UPDATE users SET last_login = ? WHERE id = ?")
        .bind(now_millis())
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Hard delete, refused while audit rows reference the user
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    let referenced = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM logs WHERE by_user_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    if referenced > 0 {
        return Err(RepoError::Business(
            ErrorCode::UserInUse,
            format!("User {id} is referenced by {referenced} audit log(s), disable it instead"),
        ));
    }

    let rows = sqlx::query("DELETE FROM users WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    if rows.rows_affected() == 0 {
        return Err(RepoError::NotFound(format!("User {id} not found")));
    }
    Ok(())
}

/// Delete several users at once; all or nothing
pub async fn delete_many(pool: &SqlitePool, ids: &IdSet) -> RepoResult<()> {
    let mut tx = pool.begin().await?;
    ensure_ids_exist(&mut *tx, "users", ids, ErrorCode::NotFound).await?;

    let referenced =
        count_with_ids(&mut tx, "SELECT COUNT(*) FROM logs WHERE by_user_id IN ({ids})", ids).await?;
    if referenced > 0 {
        return Err(RepoError::Business(
            ErrorCode::UserInUse,
            format!("Users are referenced by {referenced} audit log(s), disable them instead"),
        ));
    }

    delete_ids(&mut tx, "users", ids).await?;
    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    fn new_user(name: &str, role_ids: Vec<i64>) -> UserCreate {
        UserCreate {
            user_name: name.into(),
            password: "unused".into(),
            nick_name: None,
            user_gender: None,
            user_email: Some(format!("{name}@example.com")),
            user_phone: None,
            status: None,
            role_ids,
        }
    }

    #[tokio::test]
    async fn test_create_binds_roles() {
        let db = DbService::in_memory().await.unwrap();
        let user = create(&db.pool, new_user("alice", vec![2, 3]), "hash".into())
            .await
            .unwrap();

        assert_eq!(user.status, StatusType::Enable);
        assert_eq!(role_ids(&db.pool, user.id).await.unwrap().to_vec(), vec![2, 3]);
        let codes: Vec<String> = roles(&db.pool, user.id)
            .await
            .unwrap()
            .into_iter()
            .map(|r| r.role_code)
            .collect();
        assert_eq!(codes, vec!["R_ADMIN", "R_USER"]);
    }

    #[tokio::test]
    async fn test_create_rejects_unknown_role() {
        let db = DbService::in_memory().await.unwrap();
        let err = create(&db.pool, new_user("bob", vec![99]), "hash".into())
            .await
            .unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::RoleNotFound, _)));
        assert!(find_by_user_name(&db.pool, "bob").await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_duplicate_user_name() {
        let db = DbService::in_memory().await.unwrap();
        create(&db.pool, new_user("carol", vec![]), "h".into()).await.unwrap();
        let mut again = new_user("carol", vec![]);
        again.user_email = None;
        let err = create(&db.pool, again, "h".into()).await.unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::UsernameExists, _)));
    }

    #[tokio::test]
    async fn test_update_replaces_roles() {
        let db = DbService::in_memory().await.unwrap();
        let user = create(&db.pool, new_user("dave", vec![3]), "h".into()).await.unwrap();

        let updated = update(
            &db.pool,
            user.id,
            UserUpdate {
                nick_name: Some("Dave".into()),
                role_ids: Some(vec![2]),
                ..Default::default()
            },
            None,
        )
        .await
        .unwrap();

        assert_eq!(updated.nick_name.as_deref(), Some("Dave"));
        assert_eq!(updated.password, "h");
        assert_eq!(role_ids(&db.pool, user.id).await.unwrap().to_vec(), vec![2]);
    }

    #[tokio::test]
    async fn test_button_codes_through_roles() {
        let db = DbService::in_memory().await.unwrap();
        let admin = create(&db.pool, new_user("erin", vec![2]), "h".into()).await.unwrap();
        let plain = create(&db.pool, new_user("frank", vec![3]), "h".into()).await.unwrap();

        let codes = button_codes(&db.pool, admin.id).await.unwrap();
        assert!(codes.contains(&"B_USER_ADD".to_string()));
        assert!(button_codes(&db.pool, plain.id).await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_delete_refused_when_logged() {
        let db = DbService::in_memory().await.unwrap();
        let user = create(&db.pool, new_user("gina", vec![]), "h".into()).await.unwrap();
        sqlx::query("INSERT INTO logs (log_type, by_user_id, created_at) VALUES ('2', ?, 0)")
            .bind(user.id)
            .execute(&db.pool)
            .await
            .unwrap();

        let err = delete(&db.pool, user.id).await.unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::UserInUse, _)));

        let other = create(&db.pool, new_user("hank", vec![3]), "h".into()).await.unwrap();
        delete(&db.pool, other.id).await.unwrap();
        assert!(find_by_id(&db.pool, other.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_many_is_all_or_nothing() {
        let db = DbService::in_memory().await.unwrap();
        let a = create(&db.pool, new_user("ivy", vec![3]), "h".into()).await.unwrap();
        let b = create(&db.pool, new_user("jon", vec![]), "h".into()).await.unwrap();

        // unknown id rejects the whole batch
        let err = delete_many(&db.pool, &IdSet::from(vec![a.id, 9999])).await.unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::NotFound, _)));
        assert!(find_by_id(&db.pool, a.id).await.unwrap().is_some());

        delete_many(&db.pool, &IdSet::from(vec![a.id, b.id])).await.unwrap();
        assert!(find_by_id(&db.pool, a.id).await.unwrap().is_none());
        assert!(find_by_id(&db.pool, b.id).await.unwrap().is_none());
    }
}
