//! Menu Repository
//!
//! The parent graph is application-maintained (`parent_id = 0` is a root,
//! no FK). Writes keep it acyclic; [`ancestors`] still guards against
//! cycles that predate the check.

use super::{RepoError, RepoResult, count_with_ids, delete_ids, ensure_ids_exist, push_set};
use shared::IdSet;
use shared::error::ErrorCode;
use shared::models::{
    Menu, MenuButton, MenuCreate, MenuFilter, MenuUpdate, ROOT_MENU_ID, now_millis,
};
use sqlx::types::Json;
use sqlx::{QueryBuilder, Sqlite, SqliteConnection, SqlitePool};
use std::collections::{HashMap, HashSet};

pub(crate) const MENU_COLUMNS: &str = "id, menu_name, menu_type, route_name, route_path, path_param, route_param, \
     \"order\", component, parent_id, i18n_key, icon, icon_type, href, multi_tab, keep_alive, \
     hide_in_menu, active_menu, fixed_index_in_tab, status, redirect, props, constant, created_at, updated_at";

fn map_unique(err: RepoError) -> RepoError {
    match err {
        RepoError::Duplicate(msg) if msg.contains("route_name") => {
            RepoError::Duplicate("Route name already exists".into())
        }
        other => other,
    }
}

fn menu_not_found(id: i64) -> RepoError {
    RepoError::Business(ErrorCode::MenuNotFound, format!("Menu {id} not found"))
}

pub async fn find_by_id(pool: &SqlitePool, id: i64) -> RepoResult<Option<Menu>> {
    let menu = sqlx::query_as::<_, Menu>(&format!("SELECT {MENU_COLUMNS} FROM menus WHERE id = ?"))
        .bind(id)
        .fetch_optional(pool)
        .await?;
    Ok(menu)
}

pub async fn get(pool: &SqlitePool, id: i64) -> RepoResult<Menu> {
    find_by_id(pool, id).await?.ok_or_else(|| menu_not_found(id))
}

/// Menus matching `filter`, ordered by (`order`, `id`)
pub async fn list(pool: &SqlitePool, filter: MenuFilter) -> RepoResult<Vec<Menu>> {
    let mut qb = QueryBuilder::<Sqlite>::new(format!("SELECT {MENU_COLUMNS} FROM menus WHERE 1 = 1"));
    if let Some(constant) = filter.constant {
        qb.push(" AND constant = ").push_bind(constant);
    }
    if let Some(status) = filter.status {
        qb.push(" AND status = ").push_bind(status);
    }
    if let Some(parent_id) = filter.parent_id {
        qb.push(" AND parent_id = ").push_bind(parent_id);
    }
    qb.push(" ORDER BY \"order\", id");

    let menus = qb.build_query_as::<Menu>().fetch_all(pool).await?;
    Ok(menus)
}

pub async fn route_exists(pool: &SqlitePool, route_name: &str) -> RepoResult<bool> {
    let n = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM menus WHERE route_name = ?")
        .bind(route_name)
        .fetch_one(pool)
        .await?;
    Ok(n > 0)
}

/// Every (menu, button) attachment, ordered by menu then button id
pub async fn menu_buttons(pool: &SqlitePool) -> RepoResult<Vec<MenuButton>> {
    let rows = sqlx::query_as::<_, MenuButton>(
        "SELECT mb.menu_id, b.id, b.button_code, b.button_desc, b.status \
         FROM menu_buttons mb JOIN buttons b ON b.id = mb.button_id \
         ORDER BY mb.menu_id, b.id",
    )
    .fetch_all(pool)
    .await?;
    Ok(rows)
}

pub async fn button_ids(pool: &SqlitePool, menu_id: i64) -> RepoResult<IdSet> {
    let ids = sqlx::query_scalar::<_, i64>("SELECT button_id FROM menu_buttons WHERE menu_id = ?")
        .bind(menu_id)
        .fetch_all(pool)
        .await?;
    Ok(ids.into_iter().collect())
}

async fn parent_map(conn: &mut SqliteConnection) -> RepoResult<HashMap<i64, i64>> {
    let rows = sqlx::query_as::<_, (i64, i64)>("SELECT id, parent_id FROM menus")
        .fetch_all(&mut *conn)
        .await?;
    Ok(rows.into_iter().collect())
}

/// Walk up from each id and collect every ancestor (ids themselves excluded
/// unless one is an ancestor of another)
///
/// Missing parents end a chain; a visited set ends cycles.
pub async fn ancestors(conn: &mut SqliteConnection, ids: &IdSet) -> RepoResult<IdSet> {
    let parents = parent_map(conn).await?;
    Ok(collect_ancestors(&parents, ids))
}

fn collect_ancestors(parents: &HashMap<i64, i64>, ids: &IdSet) -> IdSet {
    let mut out = IdSet::new();
    let mut visited = HashSet::new();

    for id in ids.iter() {
        let mut current = id;
        while visited.insert(current) {
            let Some(&parent) = parents.get(&current) else {
                break;
            };
            if parent == ROOT_MENU_ID {
                break;
            }
            if !parents.contains_key(&parent) {
                tracing::warn!(menu_id = current, parent_id = parent, "Menu parent missing");
                break;
            }
            out.insert(parent);
            current = parent;
        }
    }
    out
}

/// Reject `parent_id` values that are missing or would close a cycle
async fn check_parent(
    conn: &mut SqliteConnection,
    menu_id: Option<i64>,
    parent_id: i64,
) -> RepoResult<()> {
    if parent_id == ROOT_MENU_ID {
        return Ok(());
    }
    let parents = parent_map(conn).await?;
    if !parents.contains_key(&parent_id) {
        return Err(RepoError::Business(
            ErrorCode::MenuParentNotFound,
            format!("Parent menu {parent_id} not found"),
        ));
    }

    let Some(menu_id) = menu_id else {
        return Ok(());
    };
    let mut visited = HashSet::new();
    let mut current = parent_id;
    while current != ROOT_MENU_ID && visited.insert(current) {
        if current == menu_id {
            return Err(RepoError::Business(
                ErrorCode::MenuCycleDetected,
                format!("Menu {menu_id} cannot be placed under {parent_id}"),
            ));
        }
        match parents.get(&current) {
            Some(&next) => current = next,
            None => break,
        }
    }
    Ok(())
}

async fn replace_buttons(conn: &mut SqliteConnection, menu_id: i64, ids: &IdSet) -> RepoResult<()> {
    ensure_ids_exist(&mut *conn, "buttons", ids, ErrorCode::ButtonNotFound).await?;

    sqlx::query("DELETE FROM menu_buttons WHERE menu_id = ?")
        .bind(menu_id)
        .execute(&mut *conn)
        .await?;
    for button_id in ids.iter() {
        sqlx::query("INSERT INTO menu_buttons (menu_id, button_id) VALUES (?, ?)")
            .bind(menu_id)
            .bind(button_id)
            .execute(&mut *conn)
            .await?;
    }
    Ok(())
}

pub async fn create(pool: &SqlitePool, data: MenuCreate) -> RepoResult<Menu> {
    let mut tx = pool.begin().await?;
    check_parent(&mut tx, None, data.parent_id).await?;

    let now = now_millis();
    let id = sqlx::query_scalar::<_, i64>(
        "INSERT INTO menus (menu_name, menu_type, route_name, route_path, path_param, route_param, \
         \"order\", component, parent_id, i18n_key, icon, icon_type, href, multi_tab, keep_alive, \
         hide_in_menu, active_menu, fixed_index_in_tab, status, redirect, props, constant, created_at, updated_at) \
         VALUES (?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?, ?) RETURNING id",
    )
    .bind(&data.menu_name)
    .bind(data.menu_type)
    .bind(&data.route_name)
    .bind(&data.route_path)
    .bind(&data.path_param)
    .bind(Json(&data.route_param))
    .bind(data.order)
    .bind(&data.component)
    .bind(data.parent_id)
    .bind(&data.i18n_key)
    .bind(&data.icon)
    .bind(data.icon_type)
    .bind(&data.href)
    .bind(data.multi_tab)
    .bind(data.keep_alive)
    .bind(data.hide_in_menu)
    .bind(&data.active_menu)
    .bind(data.fixed_index_in_tab)
    .bind(data.status)
    .bind(&data.redirect)
    .bind(data.props)
    .bind(data.constant)
    .bind(now)
    .bind(now)
    .fetch_one(&mut *tx)
    .await
    .map_err(|e| map_unique(e.into()))?;

    let button_ids: IdSet = data.button_ids.into_iter().collect();
    replace_buttons(&mut tx, id, &button_ids).await?;
    tx.commit().await?;

    get(pool, id).await
}

/// Partial update; nullable columns are cleared by `Some(None)`
pub async fn update(pool: &SqlitePool, id: i64, mut data: MenuUpdate) -> RepoResult<Menu> {
    let mut tx = pool.begin().await?;

    let exists = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM menus WHERE id = ?")
        .bind(id)
        .fetch_one(&mut *tx)
        .await?;
    if exists == 0 {
        return Err(menu_not_found(id));
    }
    if let Some(parent_id) = data.parent_id {
        check_parent(&mut tx, Some(id), parent_id).await?;
    }
    let button_ids = data.button_ids.take();

    let mut qb: QueryBuilder<'static, Sqlite> = QueryBuilder::new("UPDATE menus SET updated_at = ");
    qb.push_bind(now_millis());
    push_set(&mut qb, "menu_name", data.menu_name);
    push_set(&mut qb, "menu_type", data.menu_type);
    push_set(&mut qb, "route_name", data.route_name);
    push_set(&mut qb, "route_path", data.route_path);
    push_set(&mut qb, "path_param", data.path_param);
    push_set(&mut qb, "route_param", data.route_param.map(Json));
    push_set(&mut qb, "\"order\"", data.order);
    push_set(&mut qb, "component", data.component);
    push_set(&mut qb, "parent_id", data.parent_id);
    push_set(&mut qb, "i18n_key", data.i18n_key);
    push_set(&mut qb, "icon", data.icon);
    push_set(&mut qb, "icon_type", data.icon_type);
    push_set(&mut qb, "href", data.href);
    push_set(&mut qb, "multi_tab", data.multi_tab);
    push_set(&mut qb, "keep_alive", data.keep_alive);
    push_set(&mut qb, "hide_in_menu", data.hide_in_menu);
    push_set(&mut qb, "active_menu", data.active_menu);
    push_set(&mut qb, "fixed_index_in_tab", data.fixed_index_in_tab);
    push_set(&mut qb, "status", data.status);
    push_set(&mut qb, "redirect", data.redirect);
    push_set(&mut qb, "props", data.props);
    push_set(&mut qb, "constant", data.constant);
    qb.push(" WHERE id = ").push_bind(id);

    qb.build()
        .execute(&mut *tx)
        .await
        .map_err(|e| map_unique(e.into()))?;

    if let Some(button_ids) = button_ids {
        let button_ids: IdSet = button_ids.into_iter().collect();
        replace_buttons(&mut tx, id, &button_ids).await?;
    }
    tx.commit().await?;

    get(pool, id).await
}

/// Delete a leaf menu; grants and button links cascade
pub async fn delete(pool: &SqlitePool, id: i64) -> RepoResult<()> {
    get(pool, id).await?;

    let children = sqlx::query_scalar::<_, i64>("SELECT COUNT(*) FROM menus WHERE parent_id = ?")
        .bind(id)
        .fetch_one(pool)
        .await?;
    if children > 0 {
        return Err(RepoError::Business(
            ErrorCode::MenuHasChildren,
            format!("Menu {id} has {children} child menu(s)"),
        ));
    }

    sqlx::query("DELETE FROM menus WHERE id = ?")
        .bind(id)
        .execute(pool)
        .await?;
    Ok(())
}

/// Delete several menus at once; all or nothing
///
/// A menu may only go when all of its children go with it.
pub async fn delete_many(pool: &SqlitePool, ids: &IdSet) -> RepoResult<()> {
    let mut tx = pool.begin().await?;
    ensure_ids_exist(&mut *tx, "menus", ids, ErrorCode::MenuNotFound).await?;

    let orphaned = count_with_ids(
        &mut tx,
        "SELECT COUNT(*) FROM menus WHERE parent_id IN ({ids}) AND id NOT IN ({ids})",
        ids,
    )
    .await?;
    if orphaned > 0 {
        return Err(RepoError::Business(
            ErrorCode::MenuHasChildren,
            format!("{orphaned} child menu(s) would be left without a parent"),
        ));
    }

    delete_ids(&mut tx, "menus", ids).await?;
    tx.commit().await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::DbService;
    use shared::models::{MenuType, StatusType};

    fn new_menu(route_name: &str, parent_id: i64) -> MenuCreate {
        MenuCreate {
            menu_name: route_name.to_uppercase(),
            menu_type: MenuType::Menu,
            route_name: route_name.into(),
            route_path: format!("/{route_name}"),
            path_param: None,
            route_param: vec![],
            order: 0,
            component: Some(format!("view.{route_name}")),
            parent_id,
            i18n_key: None,
            icon: None,
            icon_type: None,
            href: None,
            multi_tab: false,
            keep_alive: false,
            hide_in_menu: false,
            active_menu: None,
            fixed_index_in_tab: None,
            status: StatusType::Enable,
            redirect: None,
            props: false,
            constant: false,
            button_ids: vec![],
        }
    }

    #[test]
    fn test_collect_ancestors_stops_on_cycle_and_missing() {
        // 1 <- 2 <- 3, 4 <-> 5, 6 -> 999 (missing)
        let parents: HashMap<i64, i64> =
            [(1, 0), (2, 1), (3, 2), (4, 5), (5, 4), (6, 999)].into_iter().collect();

        let up = collect_ancestors(&parents, &IdSet::from(vec![3]));
        assert_eq!(up.to_vec(), vec![1, 2]);

        let up = collect_ancestors(&parents, &IdSet::from(vec![4]));
        assert_eq!(up.to_vec(), vec![4, 5]);

        let up = collect_ancestors(&parents, &IdSet::from(vec![6]));
        assert!(up.is_empty());
    }

    #[tokio::test]
    async fn test_list_filters_and_order() {
        let db = DbService::in_memory().await.unwrap();

        let constant = list(&db.pool, MenuFilter::constant()).await.unwrap();
        assert_eq!(constant.len(), 5);
        assert!(constant.iter().all(|m| m.constant));

        let children = list(
            &db.pool,
            MenuFilter {
                parent_id: Some(7),
                ..MenuFilter::default()
            },
        )
        .await
        .unwrap();
        let names: Vec<_> = children.iter().map(|m| m.route_name.as_str()).collect();
        assert_eq!(
            names,
            vec![
                "manage_user",
                "manage_role",
                "manage_menu",
                "manage_api",
                "manage_log",
                "manage_user-detail"
            ]
        );
    }

    #[tokio::test]
    async fn test_create_with_buttons_and_route_param() {
        let db = DbService::in_memory().await.unwrap();
        let mut data = new_menu("report", 0);
        data.route_param = vec![shared::models::RouteParam {
            key: "tab".into(),
            value: "daily".into(),
        }];
        data.button_ids = vec![1, 2];

        let menu = create(&db.pool, data).await.unwrap();
        assert_eq!(menu.route_param.len(), 1);
        assert_eq!(menu.route_param[0].value, "daily");
        assert_eq!(button_ids(&db.pool, menu.id).await.unwrap().to_vec(), vec![1, 2]);
        assert!(route_exists(&db.pool, "report").await.unwrap());
    }

    #[tokio::test]
    async fn test_create_rejects_missing_parent() {
        let db = DbService::in_memory().await.unwrap();
        let err = create(&db.pool, new_menu("orphan", 999)).await.unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::MenuParentNotFound, _)));
    }

    #[tokio::test]
    async fn test_update_rejects_cycle() {
        let db = DbService::in_memory().await.unwrap();
        let parent = create(&db.pool, new_menu("p", 0)).await.unwrap();
        let child = create(&db.pool, new_menu("c", parent.id)).await.unwrap();

        let err = update(
            &db.pool,
            parent.id,
            MenuUpdate {
                parent_id: Some(child.id),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::MenuCycleDetected, _)));

        let err = update(
            &db.pool,
            parent.id,
            MenuUpdate {
                parent_id: Some(parent.id),
                ..Default::default()
            },
        )
        .await
        .unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::MenuCycleDetected, _)));
    }

    #[tokio::test]
    async fn test_update_keeps_absent_fields() {
        let db = DbService::in_memory().await.unwrap();
        let menu = create(&db.pool, new_menu("keep", 0)).await.unwrap();
        let updated = update(
            &db.pool,
            menu.id,
            MenuUpdate {
                order: Some(42),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.order, 42);
        assert_eq!(updated.route_path, "/keep");
        assert_eq!(updated.component.as_deref(), Some("view.keep"));
    }

    #[tokio::test]
    async fn test_update_clears_nullable_fields() {
        let db = DbService::in_memory().await.unwrap();
        let mut data = new_menu("clearable", 0);
        data.icon = Some("mdi:file".into());
        data.redirect = Some("/clearable/first".into());
        data.fixed_index_in_tab = Some(2);
        let menu = create(&db.pool, data).await.unwrap();

        let updated = update(
            &db.pool,
            menu.id,
            MenuUpdate {
                icon: Some(None),
                redirect: Some(None),
                component: Some(Some("view.clearable_v2".into())),
                ..Default::default()
            },
        )
        .await
        .unwrap();
        assert_eq!(updated.icon, None);
        assert_eq!(updated.redirect, None);
        assert_eq!(updated.component.as_deref(), Some("view.clearable_v2"));
        // absent stays
        assert_eq!(updated.fixed_index_in_tab, Some(2));
    }

    #[tokio::test]
    async fn test_delete_refuses_parent() {
        let db = DbService::in_memory().await.unwrap();
        let err = delete(&db.pool, 7).await.unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::MenuHasChildren, _)));

        delete(&db.pool, 14).await.unwrap();
        assert!(find_by_id(&db.pool, 14).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_delete_many_takes_whole_subtrees() {
        let db = DbService::in_memory().await.unwrap();
        let parent = create(&db.pool, new_menu("batch_p", 0)).await.unwrap();
        let child = create(&db.pool, new_menu("batch_c", parent.id)).await.unwrap();

        let err = delete_many(&db.pool, &IdSet::from(vec![parent.id])).await.unwrap_err();
        assert!(matches!(err, RepoError::Business(ErrorCode::MenuHasChildren, _)));

        delete_many(&db.pool, &IdSet::from(vec![parent.id, child.id])).await.unwrap();
        assert!(find_by_id(&db.pool, parent.id).await.unwrap().is_none());
        assert!(find_by_id(&db.pool, child.id).await.unwrap().is_none());
    }

    #[tokio::test]
    async fn test_ancestors_from_seed() {
        let db = DbService::in_memory().await.unwrap();
        let mut conn = db.pool.acquire().await.unwrap();
        let up = ancestors(&mut conn, &IdSet::from(vec![8, 13, 6]))
            .await
            .unwrap();
        assert_eq!(up.to_vec(), vec![7]);
    }
}
