//! Role-scoped navigation
//!
//! 角色菜单 = 直接授权的菜单 + 所有祖先菜单 (超级管理员: 全部非常量菜单)

use std::collections::{BTreeMap, HashSet};

use serde::Serialize;
use shared::models::{DEFAULT_ROLE_HOME, Menu, MenuFilter, ROOT_MENU_ID, Role};

use super::projection::{SimpleRoute, route_tree};
use crate::db::IdentityStore;
use crate::db::repository::RepoResult;

/// `{home, routes}` returned to the frontend router
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct UserRoutes {
    pub home: String,
    pub routes: Vec<SimpleRoute>,
}

/// Menus visible to a role, ancestors included, ordered by id
pub async fn resolve_role_menus<S>(store: &S, role: &Role) -> RepoResult<Vec<Menu>>
where
    S: IdentityStore + ?Sized,
{
    if role.is_super_admin {
        return store.list_menus(MenuFilter::dynamic()).await;
    }

    let granted = store.get_menus_for_role(role.id).await?;
    let mut collected: BTreeMap<i64, Menu> = BTreeMap::new();
    collect_with_ancestors(store, granted, &mut collected).await?;
    Ok(collected.into_values().collect())
}

/// Add `menus` and every reachable ancestor to `collected`
///
/// Ancestors already collected are not fetched again; a missing parent ends
/// its chain with a warning.
async fn collect_with_ancestors<S>(
    store: &S,
    menus: Vec<Menu>,
    collected: &mut BTreeMap<i64, Menu>,
) -> RepoResult<()>
where
    S: IdentityStore + ?Sized,
{
    let mut walked: HashSet<i64> = HashSet::new();
    let starts: Vec<(i64, i64)> = menus.iter().map(|m| (m.id, m.parent_id)).collect();
    for menu in menus {
        collected.entry(menu.id).or_insert(menu);
    }

    for (id, parent_id) in starts {
        if !walked.insert(id) {
            continue;
        }
        let mut cursor = parent_id;
        while cursor != ROOT_MENU_ID && walked.insert(cursor) {
            if let Some(known) = collected.get(&cursor) {
                cursor = known.parent_id;
                continue;
            }
            match store.get_menu(cursor).await? {
                Some(parent) => {
                    cursor = parent.parent_id;
                    collected.insert(parent.id, parent);
                }
                None => {
                    tracing::warn!(
                        menu_id = id,
                        parent_id = cursor,
                        "Tree integrity: ancestor menu missing"
                    );
                    break;
                }
            }
        }
    }
    Ok(())
}

/// Route tree of a single role
pub async fn build_role_menu_tree<S>(store: &S, role: &Role) -> RepoResult<UserRoutes>
where
    S: IdentityStore + ?Sized,
{
    let menus = resolve_role_menus(store, role).await?;
    Ok(UserRoutes {
        home: role.role_home.clone(),
        routes: route_tree(&menus),
    })
}

/// Union of the routes of all roles bound to a user
///
/// Role status is not consulted, matching the permission engine. `home`
/// comes from the lowest-id role.
pub async fn build_user_routes<S>(store: &S, user_id: i64) -> RepoResult<UserRoutes>
where
    S: IdentityStore + ?Sized,
{
    let mut roles: Vec<Role> = store.get_roles_for_user(user_id).await?;
    roles.sort_by_key(|r| r.id);

    let home = roles
        .first()
        .map(|r| r.role_home.clone())
        .unwrap_or_else(|| DEFAULT_ROLE_HOME.to_string());

    let mut merged: BTreeMap<i64, Menu> = BTreeMap::new();
    for role in &roles {
        for menu in resolve_role_menus(store, role).await? {
            merged.entry(menu.id).or_insert(menu);
        }
    }
    let menus: Vec<Menu> = merged.into_values().collect();

    Ok(UserRoutes {
        home,
        routes: route_tree(&menus),
    })
}
