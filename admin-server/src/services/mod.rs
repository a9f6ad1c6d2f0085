//! 服务模块 - 跨仓储的业务流程
//!
//! - [`auth`] - 登录 / 刷新 / 当前用户
//! - [`audit`] - 审计日志写入
//! - [`api_sync`] - API 目录与数据库同步
//! - [`role_grants`] - 角色授权编辑

pub mod api_sync;
pub mod audit;
pub mod auth;
pub mod role_grants;

pub use api_sync::{ApiCatalogEntry, refresh_apis};
