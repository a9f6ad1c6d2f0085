//! Admin Server - 后台管理系统服务端
//!
//! # 架构概述
//!
//! - **认证** (`auth`): JWT 双令牌 + Argon2 密码哈希
//! - **权限** (`auth::permission`): 角色 → API 授权，按 `(method, path)` 判定
//! - **导航** (`navigation`): 菜单树、前端路由投影、按钮树
//! - **数据库** (`db`): SQLite (sqlx)，迁移内置
//! - **HTTP API** (`api`): RESTful 管理接口
//!
//! # 模块结构
//!
//! ```text
//! admin-server/src/
//! ├── core/          # 配置、状态、错误、服务器
//! ├── auth/          # JWT、密码、权限判定、中间件
//! ├── db/            # 连接池、仓储、初始化
//! ├── navigation/    # 菜单/接口/按钮树构建
//! ├── services/      # 登录、授权编辑、API 目录同步、审计
//! ├── api/           # HTTP 路由和处理器
//! ├── middleware/    # 请求日志
//! ├── routes/        # 路由装配
//! └── utils/         # 日志初始化、公共类型
//! ```

pub mod api;
pub mod auth;
pub mod core;
pub mod db;
pub mod middleware;
pub mod navigation;
pub mod routes;
pub mod services;
pub mod utils;

// Re-export 公共类型
pub use auth::{CurrentUser, JwtService};
pub use core::{Config, Server, ServerState};
pub use routes::{api_catalog, build_app};
pub use utils::{AppError, AppResult};

// Re-export unified error types from shared
pub use utils::{ErrorBody, ErrorCategory, ErrorCode};

// Re-export logger functions
pub use utils::logger::init_logger;

// Security logging macro - 支持 tracing 格式说明符
#[macro_export]
macro_rules! security_log {
    ($level:expr, $event:expr, $($key:ident = $value:expr),*) => {
        tracing::info!(
            target: "security",
            level = $level,
            event = $event,
            $($key = $value),*
        );
    };
}

pub fn print_banner() {
    println!(
        r#"
    ___       __          _
   /   | ____/ /___ ___  (_)___
  / /| |/ __  / __ `__ \/ / __ \
 / ___ / /_/ / / / / / / / / / /
/_/  |_\__,_/_/ /_/ /_/_/_/ /_/
    "#
    );
}
