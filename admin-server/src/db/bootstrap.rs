//! First-run bootstrap
//!
//! 数据库中没有任何用户时，创建超级管理员并绑定 `R_SUPER`。

use shared::AppError;
use shared::models::{SUPER_ADMIN_ROLE_CODE, User, UserCreate};
use sqlx::SqlitePool;

use super::repository::{role, user};
use crate::auth::password::hash_password;

/// Create the super admin account when the user table is empty
///
/// Returns the created user, or `None` when users already exist.
pub async fn ensure_super_admin(
    pool: &SqlitePool,
    user_name: &str,
    password: &str,
) -> Result<Option<User>, AppError> {
    if user::count(pool).await? > 0 {
        return Ok(None);
    }

    let super_role = role::find_by_code(pool, SUPER_ADMIN_ROLE_CODE)
        .await?
        .ok_or_else(|| AppError::internal("Super admin role missing from seed data"))?;

    let hash = hash_password(password)
        .map_err(|e| AppError::internal(format!("Failed to hash password: {e}")))?;

    let created = user::create(
        pool,
        UserCreate {
            user_name: user_name.to_string(),
            password: String::new(),
            nick_name: Some("Super Admin".to_string()),
            user_gender: None,
            user_email: None,
            user_phone: None,
            status: None,
            role_ids: vec![super_role.id],
        },
        hash,
    )
    .await?;

    tracing::warn!(
        user_id = created.id,
        user_name = %created.user_name,
        "Created initial super admin account, change its password"
    );
    Ok(Some(created))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::password::verify_password;
    use crate::db::DbService;

    #[tokio::test]
    async fn test_bootstrap_runs_once() {
        let db = DbService::in_memory().await.unwrap();

        let admin = ensure_super_admin(&db.pool, "admin", "admin123")
            .await
            .unwrap()
            .unwrap();
        assert!(verify_password("admin123", &admin.password).unwrap());

        let roles = user::roles(&db.pool, admin.id).await.unwrap();
        assert_eq!(roles.len(), 1);
        assert!(roles[0].is_super_admin);

        let again = ensure_super_admin(&db.pool, "other", "x").await.unwrap();
        assert!(again.is_none());
        assert_eq!(user::count(&db.pool).await.unwrap(), 1);
    }
}
