//! Audit Log Models
//!
//! `logs` and `api_logs` are append-only.

use serde::{Deserialize, Serialize};

/// Audit log kind
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
pub enum LogType {
    #[serde(rename = "1")]
    #[cfg_attr(feature = "db", sqlx(rename = "1"))]
    ApiLog,
    #[serde(rename = "2")]
    #[cfg_attr(feature = "db", sqlx(rename = "2"))]
    UserLog,
    #[serde(rename = "3")]
    #[cfg_attr(feature = "db", sqlx(rename = "3"))]
    AdminLog,
    #[serde(rename = "4")]
    #[cfg_attr(feature = "db", sqlx(rename = "4"))]
    SystemLog,
}

/// Audit event detail code
///
/// 1xxx built-in, 12xx user session, 13xx department, 14xx menu, 15xx role,
/// 16xx user admin, 17xx log, 18xx route, 19xx api and button.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::Type))]
pub enum LogDetailType {
    #[serde(rename = "0000")]
    #[cfg_attr(feature = "db", sqlx(rename = "0000"))]
    Default,
    /// 登录
    #[serde(rename = "1001")]
    #[cfg_attr(feature = "db", sqlx(rename = "1001"))]
    Login,
    /// 登出
    #[serde(rename = "1004")]
    #[cfg_attr(feature = "db", sqlx(rename = "1004"))]
    Logout,
    /// 系统启动
    #[serde(rename = "1101")]
    #[cfg_attr(feature = "db", sqlx(rename = "1101"))]
    SystemStart,
    /// 系统停止
    #[serde(rename = "1102")]
    #[cfg_attr(feature = "db", sqlx(rename = "1102"))]
    SystemStop,
    /// 登录成功
    #[serde(rename = "1201")]
    #[cfg_attr(feature = "db", sqlx(rename = "1201"))]
    UserLoginSuccess,
    /// 刷新令牌
    #[serde(rename = "1202")]
    #[cfg_attr(feature = "db", sqlx(rename = "1202"))]
    UserAuthRefreshTokenSuccess,
    /// 获取用户信息
    #[serde(rename = "1203")]
    #[cfg_attr(feature = "db", sqlx(rename = "1203"))]
    UserLoginGetUserInfo,
    /// 用户名不存在
    #[serde(rename = "1211")]
    #[cfg_attr(feature = "db", sqlx(rename = "1211"))]
    UserLoginUserNameInvalid,
    /// 密码错误
    #[serde(rename = "1212")]
    #[cfg_attr(feature = "db", sqlx(rename = "1212"))]
    UserLoginErrorPassword,
    /// 账号已禁用
    #[serde(rename = "1213")]
    #[cfg_attr(feature = "db", sqlx(rename = "1213"))]
    UserLoginForbid,
    #[serde(rename = "1301")]
    #[cfg_attr(feature = "db", sqlx(rename = "1301"))]
    DepartmentGetList,
    #[serde(rename = "1311")]
    #[cfg_attr(feature = "db", sqlx(rename = "1311"))]
    DepartmentGetOne,
    #[serde(rename = "1312")]
    #[cfg_attr(feature = "db", sqlx(rename = "1312"))]
    DepartmentCreateOne,
    #[serde(rename = "1313")]
    #[cfg_attr(feature = "db", sqlx(rename = "1313"))]
    DepartmentUpdateOne,
    #[serde(rename = "1314")]
    #[cfg_attr(feature = "db", sqlx(rename = "1314"))]
    DepartmentDeleteOne,
    #[serde(rename = "1315")]
    #[cfg_attr(feature = "db", sqlx(rename = "1315"))]
    DepartmentBatchDelete,
    #[serde(rename = "1316")]
    #[cfg_attr(feature = "db", sqlx(rename = "1316"))]
    DepartmentGetTree,
    #[serde(rename = "1401")]
    #[cfg_attr(feature = "db", sqlx(rename = "1401"))]
    MenuGetList,
    #[serde(rename = "1402")]
    #[cfg_attr(feature = "db", sqlx(rename = "1402"))]
    MenuGetTree,
    #[serde(rename = "1403")]
    #[cfg_attr(feature = "db", sqlx(rename = "1403"))]
    MenuGetPages,
    #[serde(rename = "1404")]
    #[cfg_attr(feature = "db", sqlx(rename = "1404"))]
    MenuGetButtonsTree,
    #[serde(rename = "1411")]
    #[cfg_attr(feature = "db", sqlx(rename = "1411"))]
    MenuGetOne,
    #[serde(rename = "1412")]
    #[cfg_attr(feature = "db", sqlx(rename = "1412"))]
    MenuCreateOne,
    #[serde(rename = "1413")]
    #[cfg_attr(feature = "db", sqlx(rename = "1413"))]
    MenuUpdateOne,
    #[serde(rename = "1414")]
    #[cfg_attr(feature = "db", sqlx(rename = "1414"))]
    MenuDeleteOne,
    #[serde(rename = "1415")]
    #[cfg_attr(feature = "db", sqlx(rename = "1415"))]
    MenuBatchDelete,
    #[serde(rename = "1501")]
    #[cfg_attr(feature = "db", sqlx(rename = "1501"))]
    RoleGetList,
    #[serde(rename = "1502")]
    #[cfg_attr(feature = "db", sqlx(rename = "1502"))]
    RoleGetMenus,
    #[serde(rename = "1503")]
    #[cfg_attr(feature = "db", sqlx(rename = "1503"))]
    RoleUpdateMenus,
    #[serde(rename = "1504")]
    #[cfg_attr(feature = "db", sqlx(rename = "1504"))]
    RoleGetButtons,
    #[serde(rename = "1505")]
    #[cfg_attr(feature = "db", sqlx(rename = "1505"))]
    RoleUpdateButtons,
    #[serde(rename = "1506")]
    #[cfg_attr(feature = "db", sqlx(rename = "1506"))]
    RoleGetApis,
    #[serde(rename = "1507")]
    #[cfg_attr(feature = "db", sqlx(rename = "1507"))]
    RoleUpdateApis,
    #[serde(rename = "1511")]
    #[cfg_attr(feature = "db", sqlx(rename = "1511"))]
    RoleGetOne,
    #[serde(rename = "1512")]
    #[cfg_attr(feature = "db", sqlx(rename = "1512"))]
    RoleCreateOne,
    #[serde(rename = "1513")]
    #[cfg_attr(feature = "db", sqlx(rename = "1513"))]
    RoleUpdateOne,
    #[serde(rename = "1514")]
    #[cfg_attr(feature = "db", sqlx(rename = "1514"))]
    RoleDeleteOne,
    #[serde(rename = "1515")]
    #[cfg_attr(feature = "db", sqlx(rename = "1515"))]
    RoleBatchDelete,
    #[serde(rename = "1601")]
    #[cfg_attr(feature = "db", sqlx(rename = "1601"))]
    UserGetList,
    #[serde(rename = "1611")]
    #[cfg_attr(feature = "db", sqlx(rename = "1611"))]
    UserGetOne,
    #[serde(rename = "1612")]
    #[cfg_attr(feature = "db", sqlx(rename = "1612"))]
    UserCreateOne,
    #[serde(rename = "1613")]
    #[cfg_attr(feature = "db", sqlx(rename = "1613"))]
    UserUpdateOne,
    #[serde(rename = "1614")]
    #[cfg_attr(feature = "db", sqlx(rename = "1614"))]
    UserDeleteOne,
    #[serde(rename = "1615")]
    #[cfg_attr(feature = "db", sqlx(rename = "1615"))]
    UserBatchDelete,
    #[serde(rename = "1701")]
    #[cfg_attr(feature = "db", sqlx(rename = "1701"))]
    LogGetList,
    #[serde(rename = "1711")]
    #[cfg_attr(feature = "db", sqlx(rename = "1711"))]
    LogGetOne,
    #[serde(rename = "1713")]
    #[cfg_attr(feature = "db", sqlx(rename = "1713"))]
    LogDeleteOne,
    #[serde(rename = "1714")]
    #[cfg_attr(feature = "db", sqlx(rename = "1714"))]
    LogBatchDelete,
    #[serde(rename = "1802")]
    #[cfg_attr(feature = "db", sqlx(rename = "1802"))]
    RouteExists,
    #[serde(rename = "1803")]
    #[cfg_attr(feature = "db", sqlx(rename = "1803"))]
    RouteGetUserRoutes,
    #[serde(rename = "1804")]
    #[cfg_attr(feature = "db", sqlx(rename = "1804"))]
    RouteGetConstantRoutes,
    #[serde(rename = "1901")]
    #[cfg_attr(feature = "db", sqlx(rename = "1901"))]
    ApiGetList,
    #[serde(rename = "1902")]
    #[cfg_attr(feature = "db", sqlx(rename = "1902"))]
    ApiGetTree,
    #[serde(rename = "1903")]
    #[cfg_attr(feature = "db", sqlx(rename = "1903"))]
    ApiRefresh,
    #[serde(rename = "1911")]
    #[cfg_attr(feature = "db", sqlx(rename = "1911"))]
    ApiGetOne,
    #[serde(rename = "1912")]
    #[cfg_attr(feature = "db", sqlx(rename = "1912"))]
    ApiCreateOne,
    #[serde(rename = "1913")]
    #[cfg_attr(feature = "db", sqlx(rename = "1913"))]
    ApiUpdateOne,
    #[serde(rename = "1914")]
    #[cfg_attr(feature = "db", sqlx(rename = "1914"))]
    ApiDeleteOne,
    #[serde(rename = "1915")]
    #[cfg_attr(feature = "db", sqlx(rename = "1915"))]
    ApiBatchDelete,
    #[serde(rename = "1951")]
    #[cfg_attr(feature = "db", sqlx(rename = "1951"))]
    ButtonGetList,
    #[serde(rename = "1961")]
    #[cfg_attr(feature = "db", sqlx(rename = "1961"))]
    ButtonGetOne,
    #[serde(rename = "1962")]
    #[cfg_attr(feature = "db", sqlx(rename = "1962"))]
    ButtonCreateOne,
    #[serde(rename = "1963")]
    #[cfg_attr(feature = "db", sqlx(rename = "1963"))]
    ButtonUpdateOne,
    #[serde(rename = "1964")]
    #[cfg_attr(feature = "db", sqlx(rename = "1964"))]
    ButtonDeleteOne,
    #[serde(rename = "1965")]
    #[cfg_attr(feature = "db", sqlx(rename = "1965"))]
    ButtonBatchDelete,
}

impl LogDetailType {
    pub fn code(&self) -> &'static str {
        match self {
            Self::Default => "0000",
            Self::Login => "1001",
            Self::Logout => "1004",
            Self::SystemStart => "1101",
            Self::SystemStop => "1102",
            Self::UserLoginSuccess => "1201",
            Self::UserAuthRefreshTokenSuccess => "1202",
            Self::UserLoginGetUserInfo => "1203",
            Self::UserLoginUserNameInvalid => "1211",
            Self::UserLoginErrorPassword => "1212",
            Self::UserLoginForbid => "1213",
            Self::DepartmentGetList => "1301",
            Self::DepartmentGetOne => "1311",
            Self::DepartmentCreateOne => "1312",
            Self::DepartmentUpdateOne => "1313",
            Self::DepartmentDeleteOne => "1314",
            Self::DepartmentBatchDelete => "1315",
            Self::DepartmentGetTree => "1316",
            Self::MenuGetList => "1401",
            Self::MenuGetTree => "1402",
            Self::MenuGetPages => "1403",
            Self::MenuGetButtonsTree => "1404",
            Self::MenuGetOne => "1411",
            Self::MenuCreateOne => "1412",
            Self::MenuUpdateOne => "1413",
            Self::MenuDeleteOne => "1414",
            Self::MenuBatchDelete => "1415",
            Self::RoleGetList => "1501",
            Self::RoleGetMenus => "1502",
            Self::RoleUpdateMenus => "1503",
            Self::RoleGetButtons => "1504",
            Self::RoleUpdateButtons => "1505",
            Self::RoleGetApis => "1506",
            Self::RoleUpdateApis => "1507",
            Self::RoleGetOne => "1511",
            Self::RoleCreateOne => "1512",
            Self::RoleUpdateOne => "1513",
            Self::RoleDeleteOne => "1514",
            Self::RoleBatchDelete => "1515",
            Self::UserGetList => "1601",
            Self::UserGetOne => "1611",
            Self::UserCreateOne => "1612",
            Self::UserUpdateOne => "1613",
            Self::UserDeleteOne => "1614",
            Self::UserBatchDelete => "1615",
            Self::LogGetList => "1701",
            Self::LogGetOne => "1711",
            Self::LogDeleteOne => "1713",
            Self::LogBatchDelete => "1714",
            Self::RouteExists => "1802",
            Self::RouteGetUserRoutes => "1803",
            Self::RouteGetConstantRoutes => "1804",
            Self::ApiGetList => "1901",
            Self::ApiGetTree => "1902",
            Self::ApiRefresh => "1903",
            Self::ApiGetOne => "1911",
            Self::ApiCreateOne => "1912",
            Self::ApiUpdateOne => "1913",
            Self::ApiDeleteOne => "1914",
            Self::ApiBatchDelete => "1915",
            Self::ButtonGetList => "1951",
            Self::ButtonGetOne => "1961",
            Self::ButtonCreateOne => "1962",
            Self::ButtonUpdateOne => "1963",
            Self::ButtonDeleteOne => "1964",
            Self::ButtonBatchDelete => "1965",
        }
    }
}

/// Audit log row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct Log {
    pub id: i64,
    pub log_type: LogType,
    /// Acting user, kept as a plain id so logs survive user changes
    pub by_user_id: Option<i64>,
    pub api_log_id: Option<i64>,
    pub log_detail_type: Option<LogDetailType>,
    pub detail: Option<String>,
    pub created_at: i64,
}

/// HTTP request log row
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct ApiLog {
    pub id: i64,
    pub ip_address: String,
    pub user_agent: String,
    pub request_url: String,
    pub request_method: String,
    pub response_code: i64,
    /// Milliseconds
    pub process_time: f64,
    pub created_at: i64,
}

/// New audit row
#[derive(Debug, Clone)]
pub struct NewLog {
    pub log_type: LogType,
    pub by_user_id: Option<i64>,
    pub api_log_id: Option<i64>,
    pub log_detail_type: Option<LogDetailType>,
    pub detail: Option<String>,
}

impl NewLog {
    pub fn user(user_id: Option<i64>, detail_type: LogDetailType) -> Self {
        Self {
            log_type: LogType::UserLog,
            by_user_id: user_id,
            api_log_id: None,
            log_detail_type: Some(detail_type),
            detail: None,
        }
    }

    pub fn admin(user_id: i64, detail_type: LogDetailType) -> Self {
        Self {
            log_type: LogType::AdminLog,
            by_user_id: Some(user_id),
            api_log_id: None,
            log_detail_type: Some(detail_type),
            detail: None,
        }
    }

    pub fn system(detail_type: LogDetailType) -> Self {
        Self {
            log_type: LogType::SystemLog,
            by_user_id: None,
            api_log_id: None,
            log_detail_type: Some(detail_type),
            detail: None,
        }
    }

    pub fn with_detail(mut self, detail: impl Into<String>) -> Self {
        self.detail = Some(detail.into());
        self
    }
}

/// New request log row
#[derive(Debug, Clone)]
pub struct NewApiLog {
    pub ip_address: String,
    pub user_agent: String,
    pub request_url: String,
    pub request_method: String,
    pub response_code: i64,
    pub process_time: f64,
}

/// Log list filter
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LogQuery {
    pub log_type: Option<LogType>,
    pub by_user_id: Option<i64>,
    pub log_detail_type: Option<LogDetailType>,
}
