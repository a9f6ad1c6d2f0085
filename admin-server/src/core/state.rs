use std::sync::Arc;

use dashmap::DashMap;
use sqlx::SqlitePool;
use tokio::sync::Mutex;

use crate::auth::{JwtService, PermissionEngine};
use crate::core::{Config, Result};
use crate::db::{DbService, SqliteIdentityStore, bootstrap};
use crate::routes::api_catalog;
use crate::services::api_sync::{self, ApiCatalogEntry};

/// 角色授权编辑锁
///
/// 每个角色一把异步锁，同一角色的授权修改串行执行；不同角色互不阻塞。
/// 锁在首次使用时创建，之后一直保留 (角色数量很小)。
#[derive(Debug, Default)]
pub struct RoleGrantLocks {
    locks: DashMap<i64, Arc<Mutex<()>>>,
}

impl RoleGrantLocks {
    pub fn new() -> Self {
        Self::default()
    }

    /// 获取指定角色的锁
    pub fn lock_for(&self, role_id: i64) -> Arc<Mutex<()>> {
        self.locks
            .entry(role_id)
            .or_insert_with(|| Arc::new(Mutex::new(())))
            .clone()
    }
}

/// 服务器状态 - 持有所有服务的共享引用
///
/// 使用 Arc 实现浅拷贝，每个请求克隆一次。
///
/// | 字段 | 类型 | 说明 |
/// |------|------|------|
/// | config | Config | 配置项 (不可变) |
/// | pool | SqlitePool | 数据库连接池 |
/// | jwt_service | Arc<JwtService> | JWT 认证服务 |
/// | store | Arc<SqliteIdentityStore> | 权限/菜单读取 |
/// | engine | PermissionEngine | 权限判定 |
/// | grant_locks | Arc<RoleGrantLocks> | 角色授权编辑锁 |
/// | catalog | Arc<Vec<ApiCatalogEntry>> | 受保护路由目录 |
#[derive(Clone, Debug)]
pub struct ServerState {
    pub config: Config,
    pub pool: SqlitePool,
    pub jwt_service: Arc<JwtService>,
    pub store: Arc<SqliteIdentityStore>,
    pub engine: PermissionEngine,
    pub grant_locks: Arc<RoleGrantLocks>,
    pub catalog: Arc<Vec<ApiCatalogEntry>>,
}

impl ServerState {
    /// 基于已打开的数据库构造状态 (不做初始化)
    pub fn new(config: Config, db: DbService) -> Self {
        let jwt_service = Arc::new(JwtService::with_config(config.jwt.clone()));
        let store = Arc::new(SqliteIdentityStore::new(db.pool.clone()));
        let engine = PermissionEngine::new(config.path_match);

        Self {
            pool: db.pool,
            jwt_service,
            store,
            engine,
            grant_locks: Arc::new(RoleGrantLocks::new()),
            catalog: Arc::new(api_catalog()),
            config,
        }
    }

    /// 初始化服务器状态
    ///
    /// 按顺序执行：
    /// 1. 打开数据库并执行迁移 (内存库用于测试)
    /// 2. 无用户时创建超级管理员
    /// 3. 按配置同步 API 目录
    pub async fn initialize(config: &Config) -> Result<Self> {
        let db = if config.database_url.contains(":memory:") {
            DbService::in_memory().await?
        } else {
            DbService::new(&config.database_url).await?
        };

        bootstrap::ensure_super_admin(
            &db.pool,
            &config.super_admin_user_name,
            &config.super_admin_password,
        )
        .await?;

        let state = Self::new(config.clone(), db);

        if config.api_sync_on_startup {
            let summary = api_sync::refresh_apis(&state.pool, &state.catalog).await?;
            tracing::info!(
                created = summary.created,
                updated = summary.updated,
                deleted = summary.deleted,
                "API catalog synchronized"
            );
        }

        Ok(state)
    }

    pub fn get_jwt_service(&self) -> Arc<JwtService> {
        self.jwt_service.clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_same_role_shares_lock() {
        let locks = RoleGrantLocks::new();
        let a = locks.lock_for(1);
        let b = locks.lock_for(1);
        let c = locks.lock_for(2);
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));

        let _guard = a.lock().await;
        assert!(b.try_lock().is_err());
        assert!(c.try_lock().is_ok());
    }

    #[tokio::test]
    async fn test_initialize_in_memory() {
        let state = ServerState::initialize(&Config::for_testing()).await.unwrap();
        let users: i64 = sqlx::query_scalar("SELECT COUNT(*) FROM users")
            .fetch_one(&state.pool)
            .await
            .unwrap();
        assert_eq!(users, 1);
        assert!(!state.catalog.is_empty());
    }
}
