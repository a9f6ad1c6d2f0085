//! Department Model
//!
//! Departments form their own tree through `parent_id` (0 = root). A
//! department's manager is free text plus an optional user id; neither is
//! checked against `users`.

use super::serde_helpers::nullable;
use serde::{Deserialize, Serialize};

/// Parent id of a root department
pub const ROOT_DEPARTMENT_ID: i64 = 0;

/// Department entity (部门)
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Department {
    pub id: i64,
    pub name: String,
    pub manager_name: Option<String>,
    pub manager_id: Option<i64>,
    pub order: i64,
    pub parent_id: i64,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create department payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentCreate {
    pub name: String,
    pub manager_name: Option<String>,
    pub manager_id: Option<i64>,
    #[serde(default)]
    pub order: i64,
    #[serde(default)]
    pub parent_id: i64,
}

/// Update department payload
///
/// The manager fields are tri-state: an explicit `null` clears them.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentUpdate {
    pub name: Option<String>,
    #[serde(default, deserialize_with = "nullable")]
    pub manager_name: Option<Option<String>>,
    #[serde(default, deserialize_with = "nullable")]
    pub manager_id: Option<Option<i64>>,
    pub order: Option<i64>,
    pub parent_id: Option<i64>,
}

/// List filter: substring match on the name
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DepartmentQuery {
    pub name: Option<String>,
}
