//! Role Model

use super::common::StatusType;
use serde::{Deserialize, Serialize};

/// Role code that bypasses every permission check
pub const SUPER_ADMIN_ROLE_CODE: &str = "R_SUPER";

/// Default home route of a role
pub const DEFAULT_ROLE_HOME: &str = "home";

/// Role entity (RBAC 角色)
///
/// `is_super_admin` is derived from `role_code` when the row is read and
/// is never taken from client input.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Role {
    pub id: i64,
    pub role_name: String,
    pub role_code: String,
    pub role_desc: Option<String>,
    pub role_home: String,
    pub status: StatusType,
    pub created_at: i64,
    pub updated_at: i64,
    #[serde(skip_deserializing)]
    pub is_super_admin: bool,
}

impl Role {
    /// Build an enabled role with default home, deriving the super flag
    pub fn new(id: i64, role_code: impl Into<String>, role_name: impl Into<String>) -> Self {
        let role_code = role_code.into();
        Self {
            id,
            is_super_admin: is_super_admin_code(&role_code),
            role_name: role_name.into(),
            role_code,
            role_desc: None,
            role_home: DEFAULT_ROLE_HOME.to_string(),
            status: StatusType::Enable,
            created_at: 0,
            updated_at: 0,
        }
    }
}

pub fn is_super_admin_code(role_code: &str) -> bool {
    role_code == SUPER_ADMIN_ROLE_CODE
}

#[cfg(feature = "db")]
impl<'r> sqlx::FromRow<'r, sqlx::sqlite::SqliteRow> for Role {
    fn from_row(row: &'r sqlx::sqlite::SqliteRow) -> Result<Self, sqlx::Error> {
        use sqlx::Row;

        let role_code: String = row.try_get("role_code")?;
        Ok(Self {
            id: row.try_get("id")?,
            role_name: row.try_get("role_name")?,
            is_super_admin: is_super_admin_code(&role_code),
            role_code,
            role_desc: row.try_get("role_desc")?,
            role_home: row.try_get("role_home")?,
            status: row.try_get("status")?,
            created_at: row.try_get("created_at")?,
            updated_at: row.try_get("updated_at")?,
        })
    }
}

/// Create role payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleCreate {
    pub role_name: String,
    pub role_code: String,
    pub role_desc: Option<String>,
    pub role_home: Option<String>,
    pub status: Option<StatusType>,
}

/// Update role payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleUpdate {
    pub role_name: Option<String>,
    pub role_code: Option<String>,
    pub role_desc: Option<String>,
    pub role_home: Option<String>,
    pub status: Option<StatusType>,
}

/// Role list filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleQuery {
    pub role_name: Option<String>,
    pub role_code: Option<String>,
    pub status: Option<StatusType>,
}

/// Menu grants of a role (`GET/PATCH /roles/{id}/menus`)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleMenus {
    pub role_home: String,
    pub menu_ids: crate::IdSet,
}

/// Menu grant update payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleMenusUpdate {
    pub role_home: Option<String>,
    pub menu_ids: crate::IdSet,
}

/// Api grants of a role
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleApis {
    pub api_ids: crate::IdSet,
}

/// Button grants of a role
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RoleButtons {
    pub button_ids: crate::IdSet,
}
