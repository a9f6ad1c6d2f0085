//! Button Model

use super::common::StatusType;
use serde::{Deserialize, Serialize};

/// Button permission entity (按钮权限)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Button {
    pub id: i64,
    pub button_code: String,
    pub button_desc: String,
    pub status: StatusType,
}

/// Button attached to a menu (join row of `menu_buttons`)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct MenuButton {
    pub menu_id: i64,
    pub id: i64,
    pub button_code: String,
    pub button_desc: String,
    pub status: StatusType,
}

impl MenuButton {
    pub fn into_button(self) -> Button {
        Button {
            id: self.id,
            button_code: self.button_code,
            button_desc: self.button_desc,
            status: self.status,
        }
    }
}

/// Create button payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonCreate {
    pub button_code: String,
    pub button_desc: String,
    pub status: Option<StatusType>,
}

/// Update button payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ButtonUpdate {
    pub button_code: Option<String>,
    pub button_desc: Option<String>,
    pub status: Option<StatusType>,
}
