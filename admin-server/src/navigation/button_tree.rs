//! Menu → button tree for the role button-grant picker

use std::collections::{HashMap, HashSet};

use serde::Serialize;
use shared::models::{Menu, MenuButton, ROOT_MENU_ID};

use super::projection::group_buttons;
use super::tree::build_tree;

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum ButtonTreeNode {
    Menu {
        /// `"parent$<menuId>"`
        id: String,
        label: String,
        #[serde(rename = "pId")]
        p_id: i64,
        #[serde(skip_serializing_if = "Vec::is_empty")]
        children: Vec<ButtonTreeNode>,
    },
    Button {
        id: i64,
        label: String,
        #[serde(rename = "pId")]
        p_id: i64,
    },
}

/// Menus owning buttons, plus their ancestors
///
/// A menu without child menus lists its buttons as children.
pub fn build_button_tree(menus: &[Menu], menu_buttons: Vec<MenuButton>) -> Vec<ButtonTreeNode> {
    let buttons = group_buttons(menu_buttons);
    let by_id: HashMap<i64, &Menu> = menus.iter().map(|m| (m.id, m)).collect();

    let mut keep: HashSet<i64> = HashSet::new();
    for menu_id in buttons.keys() {
        let mut cursor = *menu_id;
        while cursor != ROOT_MENU_ID && keep.insert(cursor) {
            match by_id.get(&cursor) {
                Some(menu) => cursor = menu.parent_id,
                None => break,
            }
        }
    }

    let selected: Vec<Menu> = menus
        .iter()
        .filter(|m| keep.contains(&m.id))
        .cloned()
        .collect();

    build_tree(&selected, ROOT_MENU_ID, |menu, children| {
        let children = if children.is_empty() {
            buttons
                .get(&menu.id)
                .into_iter()
                .flatten()
                .map(|b| ButtonTreeNode::Button {
                    id: b.id,
                    label: b.button_code.clone(),
                    p_id: menu.id,
                })
                .collect()
        } else {
            children
        };
        ButtonTreeNode::Menu {
            id: format!("parent${}", menu.id),
            label: menu.menu_name.clone(),
            p_id: menu.parent_id,
            children,
        }
    })
}
