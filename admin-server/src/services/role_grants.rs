//! Role grant editing
//!
//! 每次修改: 先取该角色的进程内锁，再在一个事务中整体替换授权集合。
//! 同一角色的并发修改因此串行执行，不会丢失更新。

use shared::IdSet;
use shared::models::{MenuFilter, RoleApis, RoleButtons, RoleMenus, RoleMenusUpdate};
use sqlx::SqlitePool;

use crate::core::RoleGrantLocks;
use crate::db::repository::{RepoResult, menu, role};

/// Menu grants; the super role reports every non-constant menu
pub async fn get_role_menus(pool: &SqlitePool, role_id: i64) -> RepoResult<RoleMenus> {
    let role = role::get(pool, role_id).await?;
    let menu_ids = if role.is_super_admin {
        menu::list(pool, MenuFilter::dynamic())
            .await?
            .into_iter()
            .map(|m| m.id)
            .collect()
    } else {
        role::menu_ids(pool, role_id).await?
    };
    Ok(RoleMenus {
        role_home: role.role_home,
        menu_ids,
    })
}

/// Replace menu grants with `menu_ids` plus all their ancestors
pub async fn update_role_menus(
    pool: &SqlitePool,
    locks: &RoleGrantLocks,
    role_id: i64,
    data: RoleMenusUpdate,
) -> RepoResult<RoleMenus> {
    let lock = locks.lock_for(role_id);
    let _guard = lock.lock().await;

    let mut tx = pool.begin().await?;
    role::get_for_update(&mut tx, role_id).await?;

    let ancestors = menu::ancestors(&mut tx, &data.menu_ids).await?;
    let granted = data.menu_ids.union(&ancestors);
    role::replace_menus(&mut tx, role_id, &granted).await?;
    if let Some(home) = &data.role_home {
        role::set_home(&mut tx, role_id, home).await?;
    }
    tx.commit().await?;

    tracing::info!(
        role_id,
        menus = granted.len(),
        added_ancestors = ancestors.difference(&data.menu_ids).len(),
        "Role menu grants replaced"
    );
    get_role_menus(pool, role_id).await
}

pub async fn get_role_apis(pool: &SqlitePool, role_id: i64) -> RepoResult<RoleApis> {
    role::get(pool, role_id).await?;
    Ok(RoleApis {
        api_ids: role::api_ids(pool, role_id).await?,
    })
}

pub async fn update_role_apis(
    pool: &SqlitePool,
    locks: &RoleGrantLocks,
    role_id: i64,
    api_ids: IdSet,
) -> RepoResult<RoleApis> {
    let lock = locks.lock_for(role_id);
    let _guard = lock.lock().await;

    let mut tx = pool.begin().await?;
    role::get_for_update(&mut tx, role_id).await?;
    role::replace_apis(&mut tx, role_id, &api_ids).await?;
    tx.commit().await?;

    tracing::info!(role_id, apis = api_ids.len(), "Role api grants replaced");
    Ok(RoleApis { api_ids })
}

pub async fn get_role_buttons(pool: &SqlitePool, role_id: i64) -> RepoResult<RoleButtons> {
    role::get(pool, role_id).await?;
    Ok(RoleButtons {
        button_ids: role::button_ids(pool, role_id).await?,
    })
}

pub async fn update_role_buttons(
    pool: &SqlitePool,
    locks: &RoleGrantLocks,
    role_id: i64,
    button_ids: IdSet,
) -> RepoResult<RoleButtons> {
    let lock = locks.lock_for(role_id);
    let _guard = lock.lock().await;

    let mut tx = pool.begin().await?;
    role::get_for_update(&mut tx, role_id).await?;
    role::replace_buttons(&mut tx, role_id, &button_ids).await?;
    tx.commit().await?;

    tracing::info!(role_id, buttons = button_ids.len(), "Role button grants replaced");
    Ok(RoleButtons { button_ids })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use crate::db::repository::RepoError;
    use shared::ErrorCode;
    use std::sync::Arc;

    #[tokio::test]
    async fn test_update_menus_adds_ancestors() {
        let db = DbService::in_memory().await.unwrap();
        let locks = RoleGrantLocks::new();

        // 8 = user manage, child of 7 (system manage)
        let updated = update_role_menus(
            &db.pool,
            &locks,
            3,
            RoleMenusUpdate {
                role_home: Some("manage_user".into()),
                menu_ids: vec![8].into(),
            },
        )
        .await
        .unwrap();

        assert_eq!(updated.menu_ids.to_vec(), vec![7, 8]);
        assert_eq!(updated.role_home, "manage_user");
    }

    #[tokio::test]
    async fn test_unknown_menu_keeps_old_grants() {
        let db = DbService::in_memory().await.unwrap();
        let locks = RoleGrantLocks::new();
        let before = get_role_menus(&db.pool, 3).await.unwrap();

        let err = update_role_menus(
            &db.pool,
            &locks,
            3,
            RoleMenusUpdate {
                role_home: None,
                menu_ids: vec![6, 999].into(),
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::MenuNotFound, _)));

        let after = get_role_menus(&db.pool, 3).await.unwrap();
        assert_eq!(before.menu_ids, after.menu_ids);
    }

    #[tokio::test]
    async fn test_super_role_reports_all_dynamic_menus() {
        let db = DbService::in_memory().await.unwrap();
        let menus = get_role_menus(&db.pool, 1).await.unwrap();
        assert_eq!(menus.menu_ids.len(), 9);
        assert!(!menus.menu_ids.contains(1));
    }

    #[tokio::test]
    async fn test_unknown_role() {
        let db = DbService::in_memory().await.unwrap();
        let err = get_role_apis(&db.pool, 42).await.unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::RoleNotFound, _)));
    }

    #[tokio::test]
    async fn test_concurrent_edits_serialize() {
        let db = DbService::in_memory().await.unwrap();
        let locks = Arc::new(RoleGrantLocks::new());

        let mut handles = Vec::new();
        for ids in [vec![1, 2], vec![3, 4], vec![5, 6]] {
            let pool = db.pool.clone();
            let locks = locks.clone();
            handles.push(tokio::spawn(async move {
                update_role_buttons(&pool, &locks, 3, ids.into()).await
            }));
        }
        for h in handles {
            h.await.unwrap().unwrap();
        }

        // Last writer wins as a whole set, never a mix
        let final_ids = get_role_buttons(&db.pool, 3).await.unwrap().button_ids.to_vec();
        assert!(
            final_ids == vec![1, 2] || final_ids == vec![3, 4] || final_ids == vec![5, 6],
            "unexpected grant set {final_ids:?}"
        );
    }

    #[tokio::test]
    async fn test_api_grants_roundtrip() {
        let db = DbService::in_memory().await.unwrap();
        let locks = RoleGrantLocks::new();
        update_role_apis(&db.pool, &locks, 3, vec![1, 2].into())
            .await
            .unwrap();
        assert_eq!(
            get_role_apis(&db.pool, 3).await.unwrap().api_ids.to_vec(),
            vec![1, 2]
        );
    }
}
