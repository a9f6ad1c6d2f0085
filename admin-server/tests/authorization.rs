//! 认证与 API 授权的端到端测试

mod common;

use common::{TestApp, error_code};
use http::{Method, StatusCode};
use serde_json::json;

#[tokio::test]
async fn test_missing_token_is_rejected() {
    let app = TestApp::new().await;

    let (status, body) = app
        .request(Method::GET, "/api/v1/system/users", None, None)
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), 1001);
}

#[tokio::test]
async fn test_garbage_token_is_rejected() {
    let app = TestApp::new().await;

    let (status, body) = app.get("/api/v1/auth/me", "not-a-jwt").await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), 1004);
}

#[tokio::test]
async fn test_refresh_token_cannot_authenticate() {
    let app = TestApp::new().await;
    let (_, refresh) = app.login("admin", "123456").await;

    let (status, body) = app.get("/api/v1/auth/me", &refresh).await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_ne!(error_code(&body), 0);
}

#[tokio::test]
async fn test_super_admin_bypasses_grants() {
    let app = TestApp::new().await;
    let token = app.login_admin().await;

    // super role has no rows in role_apis
    let (status, body) = app.get("/api/v1/system/apis/tree", &token).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert!(body.as_array().is_some_and(|a| !a.is_empty()));
}

#[tokio::test]
async fn test_user_without_grant_is_denied() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    app.create_user(&admin, "reader", &[3]).await;
    let (token, _) = app.login("reader", "secret-pass").await;

    let (status, body) = app.get("/api/v1/system/users", &token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), 2001);

    // granted: GET /api/v1/system/logs
    let (status, body) = app.get("/api/v1/system/logs", &token).await;
    assert_eq!(status, StatusCode::OK, "{body}");
}

#[tokio::test]
async fn test_templated_path_matches_concrete_id() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    app.create_user(&admin, "operator", &[2]).await;
    let (token, _) = app.login("operator", "secret-pass").await;

    let (status, body) = app.get("/api/v1/system/roles/3", &token).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["roleCode"], "R_USER");

    // R_ADMIN has no grants on the api catalog
    let (status, body) = app.get("/api/v1/system/apis/1", &token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), 2001);
}

#[tokio::test]
async fn test_user_without_role_gets_no_role_bound() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    app.create_user(&admin, "nobody", &[]).await;
    let (token, _) = app.login("nobody", "secret-pass").await;

    let (status, body) = app.get("/api/v1/system/logs", &token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), 2006);

    // Authenticated routes outside the system tree still work
    let (status, body) = app.get("/api/v1/auth/me", &token).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["roles"], json!([]));
}

#[tokio::test]
async fn test_disabled_role_keeps_its_grants() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    app.create_user(&admin, "reader", &[3]).await;
    let (token, _) = app.login("reader", "secret-pass").await;

    let (status, body) = app
        .patch("/api/v1/system/roles/3", &admin, json!({ "status": "2" }))
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["status"], "2");

    // Role status is not part of the access decision
    let (status, body) = app.get("/api/v1/system/logs", &token).await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, body) = app.get("/api/v1/auth/me", &token).await;
    assert_eq!(status, StatusCode::OK, "{body}");
    assert_eq!(body["roles"], json!(["R_USER"]));
}

#[tokio::test]
async fn test_disabled_api_is_reported() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    app.create_user(&admin, "reader", &[3]).await;
    let (token, _) = app.login("reader", "secret-pass").await;

    let (status, body) = app
        .get("/api/v1/system/apis?path=/api/v1/system/logs&method=get", &admin)
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");
    let api_id = body["records"]
        .as_array()
        .unwrap()
        .iter()
        .find(|a| a["path"] == "/api/v1/system/logs" && a["method"] == "get")
        .and_then(|a| a["id"].as_i64())
        .unwrap();

    let (status, body) = app
        .patch(
            &format!("/api/v1/system/apis/{api_id}"),
            &admin,
            json!({ "status": "2" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK, "{body}");

    let (status, body) = app.get("/api/v1/system/logs", &token).await;
    assert_eq!(status, StatusCode::FORBIDDEN);
    assert_eq!(error_code(&body), 2007);
}

#[tokio::test]
async fn test_disabled_account_cannot_login() {
    let app = TestApp::new().await;
    let admin = app.login_admin().await;
    let id = app.create_user(&admin, "leaver", &[3]).await;

    let (status, _) = app
        .patch(
            &format!("/api/v1/system/users/{id}"),
            &admin,
            json!({ "status": "2" }),
        )
        .await;
    assert_eq!(status, StatusCode::OK);

    let (status, body) = app
        .request(
            Method::POST,
            "/api/v1/auth/login",
            None,
            Some(json!({ "userName": "leaver", "password": "secret-pass" })),
        )
        .await;
    assert_eq!(status, StatusCode::UNAUTHORIZED);
    assert_eq!(error_code(&body), 1007);
}
