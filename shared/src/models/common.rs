//! Common enums and paging types
//!
//! Enum values are string codes, persisted as TEXT and sent as-is over the
//! wire (`"1"` / `"2"` for status and friends, lowercase for HTTP methods).

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

/// Enable / disable flag shared by users, roles, menus, apis and buttons
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
pub enum StatusType {
    #[default]
    #[serde(rename = "1")]
    #[cfg_attr(feature = "db", sqlx(rename = "1"))]
    Enable,
    #[serde(rename = "2")]
    #[cfg_attr(feature = "db", sqlx(rename = "2"))]
    Disable,
}

impl StatusType {
    pub fn is_enabled(&self) -> bool {
        matches!(self, StatusType::Enable)
    }
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
pub enum GenderType {
    #[serde(rename = "1")]
    #[cfg_attr(feature = "db", sqlx(rename = "1"))]
    Male,
    #[serde(rename = "2")]
    #[cfg_attr(feature = "db", sqlx(rename = "2"))]
    Female,
    #[default]
    #[serde(rename = "3")]
    #[cfg_attr(feature = "db", sqlx(rename = "3"))]
    Unknown,
}

/// Menu node kind
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
pub enum MenuType {
    /// Directory node (目录)
    #[serde(rename = "1")]
    #[cfg_attr(feature = "db", sqlx(rename = "1"))]
    Catalog,
    /// Routable page (菜单)
    #[default]
    #[serde(rename = "2")]
    #[cfg_attr(feature = "db", sqlx(rename = "2"))]
    Menu,
    #[serde(rename = "3")]
    #[cfg_attr(feature = "db", sqlx(rename = "3"))]
    Button,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
pub enum IconType {
    #[serde(rename = "1")]
    #[cfg_attr(feature = "db", sqlx(rename = "1"))]
    Iconify,
    #[serde(rename = "2")]
    #[cfg_attr(feature = "db", sqlx(rename = "2"))]
    Local,
}

/// HTTP method of a routable API, always lowercase
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
#[cfg_attr(feature = "db", sqlx(rename_all = "lowercase"))]
pub enum MethodType {
    Get,
    Post,
    Put,
    Patch,
    Delete,
}

impl MethodType {
    pub fn as_str(&self) -> &'static str {
        match self {
            MethodType::Get => "get",
            MethodType::Post => "post",
            MethodType::Put => "put",
            MethodType::Patch => "patch",
            MethodType::Delete => "delete",
        }
    }
}

impl fmt::Display for MethodType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Error for a method outside [`MethodType`]
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("unsupported http method: {0}")]
pub struct UnsupportedMethod(pub String);

impl FromStr for MethodType {
    type Err = UnsupportedMethod;

    /// Case-insensitive, so `GET` and `get` both parse
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "get" => Ok(MethodType::Get),
            "post" => Ok(MethodType::Post),
            "put" => Ok(MethodType::Put),
            "patch" => Ok(MethodType::Patch),
            "delete" => Ok(MethodType::Delete),
            _ => Err(UnsupportedMethod(s.to_string())),
        }
    }
}

/// Paging query (`?current=1&size=10`)
#[derive(Debug, Clone, Copy, Serialize, Deserialize)]
pub struct PageQuery {
    pub current: Option<u32>,
    pub size: Option<u32>,
}

impl PageQuery {
    pub const DEFAULT_SIZE: u32 = 10;
    pub const MAX_SIZE: u32 = 1000;

    /// 1-based page number
    pub fn current(&self) -> u32 {
        self.current.unwrap_or(1).max(1)
    }

    pub fn size(&self) -> u32 {
        self.size
            .unwrap_or(Self::DEFAULT_SIZE)
            .clamp(1, Self::MAX_SIZE)
    }

    pub fn offset(&self) -> i64 {
        i64::from(self.current() - 1) * i64::from(self.size())
    }

    pub fn limit(&self) -> i64 {
        i64::from(self.size())
    }
}

/// One page of records
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Page<T> {
    pub records: Vec<T>,
    pub total: i64,
    pub current: u32,
    pub size: u32,
}

impl<T> Page<T> {
    pub fn new(records: Vec<T>, total: i64, query: &PageQuery) -> Self {
        Self {
            records,
            total,
            current: query.current(),
            size: query.size(),
        }
    }
}

/// Current time as Unix milliseconds
pub fn now_millis() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
