//! 认证授权模块
//!
//! 提供 JWT 认证、API 权限判定和中间件：
//! - [`JwtService`] - JWT 令牌服务 (access / refresh)
//! - [`CurrentUser`] - 当前用户上下文
//! - [`PermissionEngine`] - 角色 → API 授权判定
//! - [`require_auth`] - 认证中间件
//! - [`require_api_permission`] - API 权限中间件

pub mod extractor;
pub mod jwt;
pub mod middleware;
pub mod password;
pub mod path_match;
pub mod permission;
pub mod resolver;

pub use jwt::{Claims, CurrentUser, JwtConfig, JwtError, JwtService, TokenPair};
pub use middleware::{require_api_permission, require_auth};
pub use path_match::PathMatchMode;
pub use permission::{Access, AuthError, PermissionEngine};
pub use resolver::{authenticate, resolve_current_user};
