//! Menu Model
//!
//! Menus form an application-level tree through `parent_id` (0 = root).

use super::common::{IconType, MenuType, StatusType};
use super::serde_helpers::nullable;
use serde::{Deserialize, Serialize};

/// Parent id of a root menu
pub const ROOT_MENU_ID: i64 = 0;

/// Route query parameter (`{key, value}`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RouteParam {
    pub key: String,
    pub value: String,
}

/// Menu entity (菜单/路由)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Menu {
    pub id: i64,
    pub menu_name: String,
    pub menu_type: MenuType,
    pub route_name: String,
    pub route_path: String,
    pub path_param: Option<String>,
    /// JSON array of `{key, value}`
    #[cfg_attr(feature = "db", sqlx(json))]
    pub route_param: Vec<RouteParam>,
    pub order: i64,
    pub component: Option<String>,
    pub parent_id: i64,
    pub i18n_key: Option<String>,
    pub icon: Option<String>,
    pub icon_type: Option<IconType>,
    pub href: Option<String>,
    pub multi_tab: bool,
    pub keep_alive: bool,
    pub hide_in_menu: bool,
    pub active_menu: Option<String>,
    pub fixed_index_in_tab: Option<i64>,
    pub status: StatusType,
    pub redirect: Option<String>,
    pub props: bool,
    pub constant: bool,
    pub created_at: i64,
    pub updated_at: i64,
}

impl Menu {
    pub fn is_root(&self) -> bool {
        self.parent_id == ROOT_MENU_ID
    }
}

/// Create menu payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuCreate {
    pub menu_name: String,
    #[serde(default)]
    pub menu_type: MenuType,
    pub route_name: String,
    pub route_path: String,
    pub path_param: Option<String>,
    #[serde(default)]
    pub route_param: Vec<RouteParam>,
    #[serde(default)]
    pub order: i64,
    pub component: Option<String>,
    #[serde(default)]
    pub parent_id: i64,
    pub i18n_key: Option<String>,
    pub icon: Option<String>,
    pub icon_type: Option<IconType>,
    pub href: Option<String>,
    #[serde(default)]
    pub multi_tab: bool,
    #[serde(default)]
    pub keep_alive: bool,
    #[serde(default)]
    pub hide_in_menu: bool,
    pub active_menu: Option<String>,
    pub fixed_index_in_tab: Option<i64>,
    #[serde(default)]
    pub status: StatusType,
    pub redirect: Option<String>,
    #[serde(default)]
    pub props: bool,
    #[serde(default)]
    pub constant: bool,
    /// Buttons attached to the menu
    #[serde(default)]
    pub button_ids: Vec<i64>,
}

/// Update menu payload
///
/// Absent fields are left unchanged. Nullable columns are tri-state: an
/// explicit `null` clears them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MenuUpdate {
    pub menu_name: Option<String>,
    pub menu_type: Option<MenuType>,
    pub route_name: Option<String>,
    pub route_path: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub path_param: Option<Option<String>>,
    pub route_param: Option<Vec<RouteParam>>,
    pub order: Option<i64>,
    #[serde(default, deserialize_with = "nullable")]
    pub component: Option<Option<String>>,
    pub parent_id: Option<i64>,
    #[serde(default, deserialize_with = "nullable")]
    pub i18n_key: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub icon: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub icon_type: Option<Option<IconType>>,
    #[serde(default, deserialize_with = "nullable")]
    pub href: Option<Option<String>>,
    pub multi_tab: Option<bool>,
    pub keep_alive: Option<bool>,
    pub hide_in_menu: Option<bool>,
    #[serde(default, deserialize_with = "nullable")]
    pub active_menu: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub fixed_index_in_tab: Option<Option<i64>>,
    pub status: Option<StatusType>,
    #[serde(default, deserialize_with = "nullable")]
    pub redirect: Option<Option<String>>,
    pub props: Option<bool>,
    pub constant: Option<bool>,
    /// Replaces the attached buttons when present
    pub button_ids: Option<Vec<i64>>,
}

/// Filter for listing menus; `None` means "any"
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct MenuFilter {
    pub constant: Option<bool>,
    pub status: Option<StatusType>,
    pub parent_id: Option<i64>,
}

impl MenuFilter {
    pub fn all() -> Self {
        Self::default()
    }

    /// Non-constant menus (the grantable navigation)
    pub fn dynamic() -> Self {
        Self {
            constant: Some(false),
            ..Self::default()
        }
    }

    /// Constant routes (login, 403, 404 ...)
    pub fn constant() -> Self {
        Self {
            constant: Some(true),
            ..Self::default()
        }
    }

    pub fn matches(&self, menu: &Menu) -> bool {
        self.constant.is_none_or(|c| menu.constant == c)
            && self.status.is_none_or(|s| menu.status == s)
            && self.parent_id.is_none_or(|p| menu.parent_id == p)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_filter_matches() {
        let menu: Menu = serde_json::from_value(serde_json::json!({
            "id": 1, "menuName": "首页", "menuType": "2", "routeName": "home",
            "routePath": "/home", "pathParam": null, "routeParam": [],
            "order": 1, "component": "layout.base$view.home", "parentId": 0,
            "i18nKey": "route.home", "icon": "mdi:monitor-dashboard",
            "iconType": "1", "href": null, "multiTab": false, "keepAlive": false,
            "hideInMenu": false, "activeMenu": null, "fixedIndexInTab": null,
            "status": "1", "redirect": null, "props": false, "constant": false,
            "createdAt": 0, "updatedAt": 0
        }))
        .unwrap();

        assert!(menu.is_root());
        assert!(MenuFilter::all().matches(&menu));
        assert!(MenuFilter::dynamic().matches(&menu));
        assert!(!MenuFilter::constant().matches(&menu));
        assert!(!MenuFilter {
            status: Some(StatusType::Disable),
            ..MenuFilter::default()
        }
        .matches(&menu));
    }

    #[test]
    fn test_update_null_clears_absent_keeps() {
        let update: MenuUpdate = serde_json::from_value(serde_json::json!({
            "icon": null, "href": "https://example.com", "order": 3
        }))
        .unwrap();
        assert_eq!(update.icon, Some(None));
        assert_eq!(update.href, Some(Some("https://example.com".to_string())));
        assert_eq!(update.redirect, None);
        assert_eq!(update.component, None);
        assert_eq!(update.order, Some(3));
    }
}
