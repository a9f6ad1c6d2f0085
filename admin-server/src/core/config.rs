use std::str::FromStr;

use crate::auth::{JwtConfig, PathMatchMode};
use crate::core::ServerError;

/// 开发环境的默认超级管理员密码
const DEV_SUPER_ADMIN_PASSWORD: &str = "123456";

/// 服务器配置
///
/// # 环境变量
///
/// 启动时先读取 `.env` (dotenvy)，再从环境变量加载：
///
/// | 环境变量 | 默认值 | 说明 |
/// |----------|--------|------|
/// | HTTP_HOST | 0.0.0.0 | 监听地址 |
/// | HTTP_PORT | 9999 | HTTP 服务端口 |
/// | DATABASE_URL | sqlite://data/admin.db | SQLite 数据库 |
/// | ENVIRONMENT | development | 运行环境 |
/// | JWT_SECRET | 开发环境随机生成 | 见 [`JwtConfig::from_env`] |
/// | JWT_ALGORITHM | HS256 | |
/// | JWT_ACCESS_EXPIRE_MINUTES | 720 | |
/// | JWT_REFRESH_EXPIRE_MINUTES | 10080 | |
/// | PERMISSION_PATH_MATCH | exact | exact / prefix |
/// | LOGIN_DELAY_MS | 500 | 登录固定延迟 |
/// | SUPER_ADMIN_USERNAME | admin | 首次启动创建的超级管理员 |
/// | SUPER_ADMIN_PASSWORD | 生产环境必填 | |
/// | API_SYNC_ON_STARTUP | true | 启动时同步 API 目录 |
/// | API_LOG_ENABLED | true | 记录 API 请求日志 |
/// | LOG_LEVEL | info | `RUST_LOG` 未设置时的级别 |
/// | LOG_JSON | false | JSON 格式日志 |
/// | LOG_DIR | - | 按天滚动的日志目录 |
///
/// # 示例
///
/// ```ignore
/// HTTP_PORT=8080 DATABASE_URL=sqlite://admin.db cargo run -p admin-server
/// ```
#[derive(Debug, Clone)]
pub struct Config {
    pub http_host: String,
    pub http_port: u16,
    pub database_url: String,
    /// 运行环境: development | staging | production
    pub environment: String,
    pub jwt: JwtConfig,
    /// 权限路径匹配方式
    pub path_match: PathMatchMode,
    pub login_delay_ms: u64,
    pub super_admin_user_name: String,
    pub super_admin_password: String,
    pub api_sync_on_startup: bool,
    pub api_log_enabled: bool,
    pub log_level: String,
    pub log_json: bool,
    pub log_dir: Option<String>,
}

impl Config {
    /// 从环境变量加载配置
    pub fn from_env() -> Result<Self, ServerError> {
        let environment = env_or("ENVIRONMENT", "development");
        let production = environment == "production";

        let path_match = match std::env::var("PERMISSION_PATH_MATCH") {
            Ok(v) => PathMatchMode::from_str(&v).map_err(ServerError::Config)?,
            Err(_) => PathMatchMode::default(),
        };

        let super_admin_password = match std::env::var("SUPER_ADMIN_PASSWORD") {
            Ok(p) if !p.is_empty() => p,
            _ if production => {
                return Err(ServerError::Config(
                    "SUPER_ADMIN_PASSWORD must be set in production".into(),
                ));
            }
            _ => DEV_SUPER_ADMIN_PASSWORD.to_string(),
        };

        Ok(Self {
            http_host: env_or("HTTP_HOST", "0.0.0.0"),
            http_port: env_parse("HTTP_PORT", 9999),
            database_url: env_or("DATABASE_URL", "sqlite://data/admin.db"),
            environment,
            jwt: JwtConfig::from_env()?,
            path_match,
            login_delay_ms: env_parse("LOGIN_DELAY_MS", 500),
            super_admin_user_name: env_or("SUPER_ADMIN_USERNAME", "admin"),
            super_admin_password,
            api_sync_on_startup: env_parse("API_SYNC_ON_STARTUP", true),
            api_log_enabled: env_parse("API_LOG_ENABLED", true),
            log_level: env_or("LOG_LEVEL", "info"),
            log_json: env_parse("LOG_JSON", false),
            log_dir: std::env::var("LOG_DIR").ok().filter(|d| !d.is_empty()),
        })
    }

    /// 不读取环境变量的固定配置
    ///
    /// 常用于测试场景: 内存数据库，无登录延迟，不记录 API 日志
    pub fn for_testing() -> Self {
        Self {
            http_host: "127.0.0.1".into(),
            http_port: 0,
            database_url: "sqlite::memory:".into(),
            environment: "test".into(),
            jwt: JwtConfig::with_secret("test-secret-key-for-admin-server-0123456789"),
            path_match: PathMatchMode::Exact,
            login_delay_ms: 0,
            super_admin_user_name: "admin".into(),
            super_admin_password: DEV_SUPER_ADMIN_PASSWORD.into(),
            api_sync_on_startup: true,
            api_log_enabled: false,
            log_level: "debug".into(),
            log_json: false,
            log_dir: None,
        }
    }

    /// 是否生产环境
    pub fn is_production(&self) -> bool {
        self.environment == "production"
    }

    /// 是否开发环境
    pub fn is_development(&self) -> bool {
        self.environment == "development"
    }

    pub fn bind_addr(&self) -> String {
        format!("{}:{}", self.http_host, self.http_port)
    }
}

fn env_or(key: &str, default: &str) -> String {
    std::env::var(key).unwrap_or_else(|_| default.to_string())
}

fn env_parse<T: FromStr>(key: &str, default: T) -> T {
    std::env::var(key)
        .ok()
        .and_then(|v| v.trim().parse().ok())
        .unwrap_or(default)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_testing_config() {
        let config = Config::for_testing();
        assert!(!config.is_production());
        assert!(!config.is_development());
        assert_eq!(config.path_match, PathMatchMode::Exact);
        assert_eq!(config.bind_addr(), "127.0.0.1:0");
    }

    #[test]
    fn test_env_parse_falls_back() {
        assert_eq!(env_parse("ADMIN_SERVER_TEST_UNSET_PORT", 9999u16), 9999);
        assert!(env_parse("ADMIN_SERVER_TEST_UNSET_FLAG", true));
    }
}
