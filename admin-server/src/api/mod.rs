//! API 路由模块
//!
//! # 结构
//!
//! - [`health`] - 健康检查 (公开)
//! - [`auth`] - 登录 / 刷新令牌 / 当前用户
//! - [`route`] - 前端动态路由
//! - [`user`] - 用户管理
//! - [`role`] - 角色管理及授权
//! - [`menu`] - 菜单管理
//! - [`apis`] - API 资源管理
//! - [`button`] - 按钮管理
//! - [`department`] - 部门管理
//! - [`log`] - 审计日志
//!
//! `/api/v1/system/*` 下的路由都经过 API 权限判定。

pub mod apis;
pub mod auth;
pub mod button;
pub mod department;
pub mod health;
pub mod log;
pub mod menu;
pub mod role;
pub mod route;
pub mod user;
