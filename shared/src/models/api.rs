//! Api Model

use super::common::{MethodType, StatusType};
use serde::{Deserialize, Serialize};

/// Routable API entity
///
/// `path` is an axum path template (`/api/v1/system/users/{id}`).
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Api {
    pub id: i64,
    pub path: String,
    pub method: MethodType,
    pub summary: String,
    /// Ordered tag path, e.g. `["系统管理", "用户管理"]`
    #[cfg_attr(feature = "db", sqlx(json))]
    pub tags: Vec<String>,
    pub status: StatusType,
    pub created_at: i64,
    pub updated_at: i64,
}

/// Create api payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiCreate {
    pub path: String,
    pub method: MethodType,
    pub summary: String,
    #[serde(default)]
    pub tags: Vec<String>,
    pub status: Option<StatusType>,
}

/// Update api payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiUpdate {
    pub path: Option<String>,
    pub method: Option<MethodType>,
    pub summary: Option<String>,
    pub tags: Option<Vec<String>>,
    pub status: Option<StatusType>,
}

/// Api list filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ApiQuery {
    pub path: Option<String>,
    pub method: Option<MethodType>,
    pub status: Option<StatusType>,
}

/// Result of reconciling the route catalog with stored apis
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct ApiRefreshSummary {
    pub created: usize,
    pub updated: usize,
    pub deleted: usize,
}
