//! JWT 令牌服务
//!
//! 处理访问令牌 / 刷新令牌的生成、验证和解析。编解码是纯函数，无 I/O。

use chrono::{Duration, Utc};
use jsonwebtoken::errors::ErrorKind;
use jsonwebtoken::{Algorithm, DecodingKey, EncodingKey, Header, Validation, decode, encode};
use ring::rand::{SecureRandom, SystemRandom};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use thiserror::Error;

/// 默认访问令牌有效期 (分钟, 12 小时)
pub const DEFAULT_ACCESS_EXPIRE_MINUTES: i64 = 720;
/// 默认刷新令牌有效期 (分钟, 7 天)
pub const DEFAULT_REFRESH_EXPIRE_MINUTES: i64 = 10080;

const MIN_SECRET_LEN: usize = 32;

/// JWT 配置
#[derive(Debug, Clone)]
pub struct JwtConfig {
    /// JWT 密钥 (至少 32 字节)
    pub secret: String,
    /// 签名算法 (HS256 / HS384 / HS512)
    pub algorithm: Algorithm,
    /// 访问令牌过期时间 (分钟)
    pub access_expire_minutes: i64,
    /// 刷新令牌过期时间 (分钟)
    pub refresh_expire_minutes: i64,
}

impl JwtConfig {
    /// 从环境变量加载
    ///
    /// | 环境变量 | 默认值 |
    /// |----------|--------|
    /// | JWT_SECRET | 开发环境随机生成 / 生产环境必填 |
    /// | JWT_ALGORITHM | HS256 |
    /// | JWT_ACCESS_EXPIRE_MINUTES | 720 |
    /// | JWT_REFRESH_EXPIRE_MINUTES | 10080 |
    pub fn from_env() -> Result<Self, JwtError> {
        let algorithm = match std::env::var("JWT_ALGORITHM") {
            Ok(name) => parse_algorithm(&name)?,
            Err(_) => Algorithm::HS256,
        };

        Ok(Self {
            secret: load_jwt_secret()?,
            algorithm,
            access_expire_minutes: std::env::var("JWT_ACCESS_EXPIRE_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_ACCESS_EXPIRE_MINUTES),
            refresh_expire_minutes: std::env::var("JWT_REFRESH_EXPIRE_MINUTES")
                .ok()
                .and_then(|s| s.parse().ok())
                .unwrap_or(DEFAULT_REFRESH_EXPIRE_MINUTES),
        })
    }

    /// HS256 + 默认有效期
    pub fn with_secret(secret: impl Into<String>) -> Self {
        Self {
            secret: secret.into(),
            algorithm: Algorithm::HS256,
            access_expire_minutes: DEFAULT_ACCESS_EXPIRE_MINUTES,
            refresh_expire_minutes: DEFAULT_REFRESH_EXPIRE_MINUTES,
        }
    }
}

/// 仅支持对称 HMAC 算法
fn parse_algorithm(name: &str) -> Result<Algorithm, JwtError> {
    let algorithm = Algorithm::from_str(name.trim())
        .map_err(|_| JwtError::ConfigError(format!("Unknown JWT_ALGORITHM: {name}")))?;

    match algorithm {
        Algorithm::HS256 | Algorithm::HS384 | Algorithm::HS512 => Ok(algorithm),
        other => Err(JwtError::ConfigError(format!(
            "JWT_ALGORITHM {other:?} needs a key pair, only HS256/HS384/HS512 are supported"
        ))),
    }
}

/// 令牌类型
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum TokenType {
    AccessToken,
    RefreshToken,
}

/// 存储在令牌中的 JWT Claims
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Claims {
    /// 用户 ID
    pub user_id: i64,
    /// 用户名
    pub user_name: String,
    /// 令牌类型
    pub token_type: TokenType,
    /// 过期时间戳 (秒)
    pub exp: i64,
}

/// 登录 / 刷新返回的令牌对
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TokenPair {
    pub token: String,
    pub refresh_token: String,
}

/// JWT 错误
#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum JwtError {
    #[error("无效令牌: {0}")]
    Malformed(String),

    #[error("令牌已过期")]
    ExpiredToken,

    #[error("无效签名")]
    InvalidSignature,

    #[error("令牌类型错误: 需要 {expected:?}")]
    WrongTokenType { expected: TokenType },

    #[error("令牌生成失败: {0}")]
    GenerationFailed(String),

    #[error("密钥生成失败: {0}")]
    KeyGenerationFailed(String),

    #[error("配置错误: {0}")]
    ConfigError(String),
}

/// 生成可打印的安全 JWT 密钥 (用于开发环境)
pub fn generate_secure_printable_jwt_secret() -> Result<String, JwtError> {
    const ALLOWED: &[u8] =
        b"ABCDEFGHIJKLMNOPQRSTUVWXYZabcdefghijklmnopqrstuvwxyz0123456789!@#$%^&*()-_=+[]{}|;:,.<>?";

    let rng = SystemRandom::new();
    let mut bytes = [0u8; 64];
    rng.fill(&mut bytes).map_err(|_| {
        JwtError::KeyGenerationFailed("Failed to generate secure random key".to_string())
    })?;

    Ok(bytes
        .iter()
        .map(|b| ALLOWED[*b as usize % ALLOWED.len()] as char)
        .collect())
}

/// 从环境变量安全地加载 JWT 密钥
fn load_jwt_secret() -> Result<String, JwtError> {
    match std::env::var("JWT_SECRET") {
        Ok(secret) => {
            if secret.len() < MIN_SECRET_LEN {
                return Err(JwtError::ConfigError(format!(
                    "JWT_SECRET must be at least {MIN_SECRET_LEN} characters long"
                )));
            }
            Ok(secret)
        }
        Err(_) => {
            #[cfg(debug_assertions)]
            {
                tracing::warn!(
                    "⚠️  JWT_SECRET not set! Generating secure temporary key for development."
                );
                generate_secure_printable_jwt_secret()
            }
            #[cfg(not(debug_assertions))]
            {
                Err(JwtError::ConfigError(
                    "JWT_SECRET environment variable must be set in production!".to_string(),
                ))
            }
        }
    }
}

/// JWT 令牌服务
#[derive(Clone)]
pub struct JwtService {
    pub config: JwtConfig,
    encoding_key: EncodingKey,
    decoding_key: DecodingKey,
}

impl std::fmt::Debug for JwtService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("JwtService")
            .field("algorithm", &self.config.algorithm)
            .field("access_expire_minutes", &self.config.access_expire_minutes)
            .field("refresh_expire_minutes", &self.config.refresh_expire_minutes)
            .finish_non_exhaustive()
    }
}

impl JwtService {
    /// 使用指定配置创建新的 JWT 服务
    pub fn with_config(config: JwtConfig) -> Self {
        let encoding_key = EncodingKey::from_secret(config.secret.as_bytes());
        let decoding_key = DecodingKey::from_secret(config.secret.as_bytes());

        Self {
            config,
            encoding_key,
            decoding_key,
        }
    }

    /// 签发令牌，`expire_minutes` 后过期
    pub fn encode(
        &self,
        user_id: i64,
        user_name: &str,
        token_type: TokenType,
        expire_minutes: i64,
    ) -> Result<String, JwtError> {
        let exp = Utc::now() + Duration::minutes(expire_minutes);
        let claims = Claims {
            user_id,
            user_name: user_name.to_string(),
            token_type,
            exp: exp.timestamp(),
        };

        encode(
            &Header::new(self.config.algorithm),
            &claims,
            &self.encoding_key,
        )
        .map_err(|e| JwtError::GenerationFailed(e.to_string()))
    }

    pub fn generate_access_token(&self, user_id: i64, user_name: &str) -> Result<String, JwtError> {
        self.encode(
            user_id,
            user_name,
            TokenType::AccessToken,
            self.config.access_expire_minutes,
        )
    }

    pub fn generate_refresh_token(
        &self,
        user_id: i64,
        user_name: &str,
    ) -> Result<String, JwtError> {
        self.encode(
            user_id,
            user_name,
            TokenType::RefreshToken,
            self.config.refresh_expire_minutes,
        )
    }

    /// 生成访问令牌 + 刷新令牌
    pub fn generate_token_pair(&self, user_id: i64, user_name: &str) -> Result<TokenPair, JwtError> {
        Ok(TokenPair {
            token: self.generate_access_token(user_id, user_name)?,
            refresh_token: self.generate_refresh_token(user_id, user_name)?,
        })
    }

    /// 验证并解码令牌 (不检查令牌类型)
    ///
    /// 过期判断无宽限期 (leeway = 0)。
    pub fn decode(&self, token: &str) -> Result<Claims, JwtError> {
        let mut validation = Validation::new(self.config.algorithm);
        validation.leeway = 0;
        validation.set_required_spec_claims(&["exp"]);

        let token_data = decode::<Claims>(token, &self.decoding_key, &validation).map_err(|e| {
            match e.kind() {
                ErrorKind::ExpiredSignature => JwtError::ExpiredToken,
                ErrorKind::InvalidSignature => JwtError::InvalidSignature,
                _ => JwtError::Malformed(e.to_string()),
            }
        })?;

        Ok(token_data.claims)
    }

    /// 解码访问令牌
    pub fn decode_access(&self, token: &str) -> Result<Claims, JwtError> {
        self.decode_typed(token, TokenType::AccessToken)
    }

    /// 解码刷新令牌
    pub fn decode_refresh(&self, token: &str) -> Result<Claims, JwtError> {
        self.decode_typed(token, TokenType::RefreshToken)
    }

    fn decode_typed(&self, token: &str, expected: TokenType) -> Result<Claims, JwtError> {
        let claims = self.decode(token)?;
        if claims.token_type != expected {
            return Err(JwtError::WrongTokenType { expected });
        }
        Ok(claims)
    }

    /// 从 Authorization 头提取令牌
    pub fn extract_from_header(header: &str) -> Option<&str> {
        header
            .strip_prefix("Bearer ")
            .map(str::trim)
            .filter(|t| !t.is_empty())
    }
}

/// 当前用户上下文 (认证解析结果)
///
/// 由认证中间件写入请求扩展，处理函数通过 `Extension<CurrentUser>` 或
/// 提取器读取；同一请求内不会重复解码。
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CurrentUser {
    /// 用户 ID
    pub id: i64,
    /// 用户名
    pub user_name: String,
}

impl From<&shared::models::User> for CurrentUser {
    fn from(user: &shared::models::User) -> Self {
        Self {
            id: user.id,
            user_name: user.user_name.clone(),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const SECRET: &str = "unit-test-secret-key-0123456789-abcdefghij";

    fn service() -> JwtService {
        JwtService::with_config(JwtConfig::with_secret(SECRET))
    }

    #[test]
    fn test_access_token_round_trip() {
        let service = service();
        let token = service
            .generate_access_token(42, "alice")
            .expect("Failed to generate test token");

        let claims = service
            .decode_access(&token)
            .expect("Failed to validate test token");

        assert_eq!(claims.user_id, 42);
        assert_eq!(claims.user_name, "alice");
        assert_eq!(claims.token_type, TokenType::AccessToken);
    }

    #[test]
    fn test_claims_wire_names() {
        let claims = Claims {
            user_id: 1,
            user_name: "a".into(),
            token_type: TokenType::RefreshToken,
            exp: 10,
        };
        let json = serde_json::to_value(&claims).unwrap();
        assert_eq!(json["userId"], 1);
        assert_eq!(json["userName"], "a");
        assert_eq!(json["tokenType"], "refreshToken");
    }

    #[test]
    fn test_expired_token() {
        let service = service();
        let token = service
            .encode(1, "alice", TokenType::AccessToken, -1)
            .unwrap();

        assert_eq!(service.decode(&token), Err(JwtError::ExpiredToken));
    }

    #[test]
    fn test_tampered_signature() {
        let token = service().generate_access_token(1, "alice").unwrap();
        let other = JwtService::with_config(JwtConfig::with_secret(
            "another-secret-key-0123456789-abcdefghijk",
        ));

        assert_eq!(other.decode(&token), Err(JwtError::InvalidSignature));
    }

    #[test]
    fn test_missing_user_id_is_malformed() {
        #[derive(Serialize)]
        #[serde(rename_all = "camelCase")]
        struct Partial {
            user_name: String,
            token_type: TokenType,
            exp: i64,
        }

        let partial = Partial {
            user_name: "alice".into(),
            token_type: TokenType::AccessToken,
            exp: (Utc::now() + Duration::minutes(5)).timestamp(),
        };
        let token = encode(
            &Header::new(Algorithm::HS256),
            &partial,
            &EncodingKey::from_secret(SECRET.as_bytes()),
        )
        .unwrap();

        assert!(matches!(service().decode(&token), Err(JwtError::Malformed(_))));
    }

    #[test]
    fn test_garbage_is_malformed() {
        assert!(matches!(
            service().decode("not-a-token"),
            Err(JwtError::Malformed(_))
        ));
    }

    #[test]
    fn test_refresh_token_rejected_as_access() {
        let service = service();
        let pair = service.generate_token_pair(3, "bob").unwrap();

        assert_eq!(
            service.decode_access(&pair.refresh_token),
            Err(JwtError::WrongTokenType {
                expected: TokenType::AccessToken
            })
        );
        assert!(service.decode_refresh(&pair.refresh_token).is_ok());
        assert!(service.decode_refresh(&pair.token).is_err());
    }

    #[test]
    fn test_extract_from_header() {
        assert_eq!(JwtService::extract_from_header("Bearer abc"), Some("abc"));
        assert_eq!(JwtService::extract_from_header("Bearer "), None);
        assert_eq!(JwtService::extract_from_header("Basic abc"), None);
    }

    #[test]
    fn test_printable_secret_generation() {
        let a = generate_secure_printable_jwt_secret().unwrap();
        let b = generate_secure_printable_jwt_secret().unwrap();
        assert_eq!(a.len(), 64);
        assert!(a.chars().all(|c| c.is_ascii_graphic()));
        assert_ne!(a, b);
    }

    #[test]
    fn test_only_hmac_algorithms_accepted() {
        assert_eq!(parse_algorithm("HS512"), Ok(Algorithm::HS512));
        assert!(parse_algorithm("RS256").is_err());
        assert!(parse_algorithm("nope").is_err());
    }
}
