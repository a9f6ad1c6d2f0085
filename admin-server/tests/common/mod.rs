//! 集成测试公共工具
//!
//! 每个测试使用独立的内存数据库 (`Config::for_testing`)。

#![allow(dead_code)]

use admin_server::{Config, ServerState, build_app};
use axum::Router;
use axum::body::Body;
use http::{Method, Request, StatusCode, header};
use http_body_util::BodyExt;
use serde_json::{Value, json};
use tower::ServiceExt;

pub struct TestApp {
    pub state: ServerState,
    pub router: Router,
}

impl TestApp {
    pub async fn new() -> Self {
        Self::with_config(Config::for_testing()).await
    }

    pub async fn with_config(config: Config) -> Self {
        let state = ServerState::initialize(&config)
            .await
            .expect("failed to initialize state");
        let router = build_app(state.clone());
        Self { state, router }
    }

    /// 发送请求，返回状态码和 JSON body (空 body 为 Null)
    pub async fn request(
        &self,
        method: Method,
        uri: &str,
        token: Option<&str>,
        body: Option<Value>,
    ) -> (StatusCode, Value) {
        let mut builder = Request::builder().method(method).uri(uri);
        if let Some(token) = token {
            builder = builder.header(header::AUTHORIZATION, format!("Bearer {token}"));
        }
        let request = match body {
            Some(body) => builder
                .header(header::CONTENT_TYPE, "application/json")
                .body(Body::from(body.to_string()))
                .unwrap(),
            None => builder.body(Body::empty()).unwrap(),
        };

        let response = self.router.clone().oneshot(request).await.unwrap();
        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let value = if bytes.is_empty() {
            Value::Null
        } else {
            serde_json::from_slice(&bytes).unwrap()
        };
        (status, value)
    }

    pub async fn get(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::GET, uri, Some(token), None).await
    }

    pub async fn post(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::POST, uri, Some(token), Some(body)).await
    }

    pub async fn patch(&self, uri: &str, token: &str, body: Value) -> (StatusCode, Value) {
        self.request(Method::PATCH, uri, Some(token), Some(body)).await
    }

    pub async fn delete(&self, uri: &str, token: &str) -> (StatusCode, Value) {
        self.request(Method::DELETE, uri, Some(token), None).await
    }

    /// 登录，返回 (token, refreshToken)
    pub async fn login(&self, user_name: &str, password: &str) -> (String, String) {
        let (status, body) = self
            .request(
                Method::POST,
                "/api/v1/auth/login",
                None,
                Some(json!({ "userName": user_name, "password": password })),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "login failed: {body}");
        (
            body["token"].as_str().unwrap().to_string(),
            body["refreshToken"].as_str().unwrap().to_string(),
        )
    }

    pub async fn login_admin(&self) -> String {
        self.login("admin", "123456").await.0
    }

    /// 通过管理接口创建用户，返回用户 id
    pub async fn create_user(&self, admin_token: &str, user_name: &str, role_ids: &[i64]) -> i64 {
        let (status, body) = self
            .post(
                "/api/v1/system/users",
                admin_token,
                json!({
                    "userName": user_name,
                    "password": "secret-pass",
                    "roleIds": role_ids,
                }),
            )
            .await;
        assert_eq!(status, StatusCode::OK, "create user failed: {body}");
        body["id"].as_i64().unwrap()
    }
}

/// 错误响应中的业务错误码
pub fn error_code(body: &Value) -> u64 {
    body["code"].as_u64().unwrap_or_default()
}
