//! Menu tree projections
//!
//! - [`SimpleRoute`]: what the frontend router consumes
//! - [`FullMenu`]: every menu field plus attached buttons (menu management)
//! - [`MenuLabel`]: `{id, label, pId}` for the menu picker

use std::collections::HashMap;

use serde::Serialize;
use shared::models::{Button, IconType, Menu, MenuButton, ROOT_MENU_ID};

use super::tree::build_tree;

/// Buttons keyed by the menu they are attached to
pub type ButtonsByMenu = HashMap<i64, Vec<Button>>;

pub fn group_buttons(rows: Vec<MenuButton>) -> ButtonsByMenu {
    let mut grouped = ButtonsByMenu::new();
    for row in rows {
        grouped.entry(row.menu_id).or_default().push(row.into_button());
    }
    grouped
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RouteMeta {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub i18n_key: Option<String>,
    pub order: i64,
    pub keep_alive: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub icon_type: Option<IconType>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub href: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub active_menu: Option<String>,
    pub multi_tab: bool,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub fixed_index_in_tab: Option<i64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub layout: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hide_in_menu: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub constant: Option<bool>,
}

/// Frontend route node
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct SimpleRoute {
    pub name: String,
    pub path: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub component: Option<String>,
    pub meta: RouteMeta,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub props: Option<bool>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub redirect: Option<String>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<SimpleRoute>,
}

impl SimpleRoute {
    pub fn from_menu(menu: &Menu, children: Vec<SimpleRoute>) -> Self {
        let meta = RouteMeta {
            title: menu.menu_name.clone(),
            i18n_key: menu.i18n_key.clone(),
            order: menu.order,
            keep_alive: menu.keep_alive,
            icon: menu.icon.clone(),
            icon_type: menu.icon_type,
            href: menu.href.clone(),
            active_menu: menu.active_menu.clone(),
            multi_tab: menu.multi_tab,
            fixed_index_in_tab: menu.fixed_index_in_tab,
            layout: menu.component.as_deref().and_then(layout_of),
            hide_in_menu: (menu.hide_in_menu && !menu.constant).then_some(true),
            constant: menu.constant.then_some(true),
        };

        Self {
            name: menu.route_name.clone(),
            path: menu.route_path.clone(),
            component: menu.component.clone(),
            meta,
            props: menu.props.then_some(true),
            redirect: menu.redirect.clone(),
            children,
        }
    }
}

/// `"layout.base$view.home"` → `"base"`
pub fn layout_of(component: &str) -> Option<String> {
    let (layout, _view) = component.split_once('$')?;
    let name = layout.strip_prefix("layout.").unwrap_or(layout);
    (!name.is_empty()).then(|| name.to_string())
}

/// Menu with its buttons, as listed by menu management
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct FullMenu {
    #[serde(flatten)]
    pub menu: Menu,
    pub buttons: Vec<Button>,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<FullMenu>,
}

/// Menu picker node
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct MenuLabel {
    pub id: i64,
    pub label: String,
    #[serde(rename = "pId")]
    pub p_id: i64,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub children: Vec<MenuLabel>,
}

/// Either projection of [`build_menu_tree`]
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
pub enum MenuTreeNode {
    Simple(SimpleRoute),
    Full(FullMenu),
}

pub fn route_tree(menus: &[Menu]) -> Vec<SimpleRoute> {
    build_tree(menus, ROOT_MENU_ID, SimpleRoute::from_menu)
}

pub fn full_tree(menus: &[Menu], buttons: &ButtonsByMenu) -> Vec<FullMenu> {
    build_tree(menus, ROOT_MENU_ID, |menu, children| FullMenu {
        menu: menu.clone(),
        buttons: buttons.get(&menu.id).cloned().unwrap_or_default(),
        children,
    })
}

pub fn label_tree(menus: &[Menu]) -> Vec<MenuLabel> {
    build_tree(menus, ROOT_MENU_ID, |menu, children| MenuLabel {
        id: menu.id,
        label: menu.menu_name.clone(),
        p_id: menu.parent_id,
        children,
    })
}

/// Simple (route) or full projection of the whole menu forest
pub fn build_menu_tree(menus: &[Menu], buttons: &ButtonsByMenu, simple: bool) -> Vec<MenuTreeNode> {
    if simple {
        route_tree(menus).into_iter().map(MenuTreeNode::Simple).collect()
    } else {
        full_tree(menus, buttons)
            .into_iter()
            .map(MenuTreeNode::Full)
            .collect()
    }
}
