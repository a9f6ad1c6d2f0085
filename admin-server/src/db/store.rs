//! Identity Store
//!
//! Read-only view of users, roles, grants and menus used by the permission
//! engine and the menu-tree builder. Writes go through [`super::repository`].

use async_trait::async_trait;
use shared::models::{Api, Menu, MenuFilter, Role, User};
use sqlx::SqlitePool;

use super::repository::{RepoResult, menu, role, user};

/// 身份数据读取接口
#[async_trait]
pub trait IdentityStore: Send + Sync {
    async fn get_user(&self, id: i64) -> RepoResult<Option<User>>;

    /// Roles bound to a user, ordered by id (any status)
    async fn get_roles_for_user(&self, user_id: i64) -> RepoResult<Vec<Role>>;

    /// Api grants of a role (any status)
    async fn get_apis_for_role(&self, role_id: i64) -> RepoResult<Vec<Api>>;

    /// Menus directly granted to a role, no ancestors
    async fn get_menus_for_role(&self, role_id: i64) -> RepoResult<Vec<Menu>>;

    async fn get_menu(&self, id: i64) -> RepoResult<Option<Menu>>;

    async fn list_menus(&self, filter: MenuFilter) -> RepoResult<Vec<Menu>>;
}

/// [`IdentityStore`] over the SQLite pool
#[derive(Clone, Debug)]
pub struct SqliteIdentityStore {
    pool: SqlitePool,
}

impl SqliteIdentityStore {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }
}

#[async_trait]
impl IdentityStore for SqliteIdentityStore {
    async fn get_user(&self, id: i64) -> RepoResult<Option<User>> {
        user::find_by_id(&self.pool, id).await
    }

    async fn get_roles_for_user(&self, user_id: i64) -> RepoResult<Vec<Role>> {
        user::roles(&self.pool, user_id).await
    }

    async fn get_apis_for_role(&self, role_id: i64) -> RepoResult<Vec<Api>> {
        role::apis(&self.pool, role_id).await
    }

    async fn get_menus_for_role(&self, role_id: i64) -> RepoResult<Vec<Menu>> {
        role::menus(&self.pool, role_id).await
    }

    async fn get_menu(&self, id: i64) -> RepoResult<Option<Menu>> {
        menu::find_by_id(&self.pool, id).await
    }

    async fn list_menus(&self, filter: MenuFilter) -> RepoResult<Vec<Menu>> {
        menu::list(&self.pool, filter).await
    }
}


#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;

    #[tokio::test]
    async fn test_sqlite_store_reads_seed() {
        let db = DbService::in_memory().await.unwrap();
        let store = SqliteIdentityStore::new(db.pool.clone());

        let admin_apis = store.get_apis_for_role(2).await.unwrap();
        assert!(!admin_apis.is_empty());
        assert!(admin_apis.iter().all(|a| !a.path.starts_with("/api/v1/system/apis")));

        let menus = store.list_menus(MenuFilter::dynamic()).await.unwrap();
        assert_eq!(menus.len(), 9);

        assert!(store.get_menu(6).await.unwrap().is_some());
        assert!(store.get_menu(999).await.unwrap().is_none());
        assert!(store.get_user(1).await.unwrap().is_none());
    }
}
