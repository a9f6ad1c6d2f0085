//! 权限解析引擎
//!
//! Decides whether a resolved user may call `(method, path)`:
//!
//! 1. Load every role bound to the user. Role status is not consulted.
//! 2. Any super-admin role allows unconditionally.
//! 3. No roles fails with [`AuthError::NoRoleBound`].
//! 4. Api grants of all roles are unioned and de-duplicated by
//!    `(method, path, status)`, then scanned in that order.
//! 5. The first grant whose method matches and whose path template covers
//!    the request path decides: disabled denies, enabled allows.
//! 6. Nothing matched fails with [`AuthError::PermissionDenied`].
//!
//! The engine reads through [`IdentityStore`] and never writes.

use std::collections::BTreeMap;

use shared::error::{AppError, ErrorCode};
use shared::models::{Api, MethodType, StatusType};
use thiserror::Error;

use super::jwt::JwtError;
use super::path_match::{PathMatchMode, TemplateCache};
use crate::db::IdentityStore;
use crate::db::repository::RepoError;

/// Successful authorization
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Access {
    /// Allowed through a super-admin role
    SuperAdmin,
    /// Allowed by the api grant `api_id`
    Granted { api_id: i64 },
}

/// Authentication / authorization failures
///
/// Every variant is terminal for the request.
#[derive(Debug, Error)]
pub enum AuthError {
    #[error("Missing authorization token")]
    MissingToken,

    #[error("Unauthenticated: {0}")]
    Unauthenticated(#[from] JwtError),

    #[error("User {0} not found")]
    UserNotFound(i64),

    #[error("The user is not bound to a role")]
    NoRoleBound,

    #[error("Permission denied: {method} {path}")]
    PermissionDenied { method: String, path: String },

    #[error("Api disabled: {method} {path}")]
    ApiDisabled { method: String, path: String },

    #[error("Identity store error: {0}")]
    Store(#[from] RepoError),
}

impl AuthError {
    pub fn code(&self) -> ErrorCode {
        match self {
            AuthError::MissingToken => ErrorCode::NotAuthenticated,
            AuthError::Unauthenticated(JwtError::ExpiredToken) => ErrorCode::TokenExpired,
            AuthError::Unauthenticated(_) => ErrorCode::TokenInvalid,
            AuthError::UserNotFound(_) => ErrorCode::UserNotFound,
            AuthError::NoRoleBound => ErrorCode::NoRoleBound,
            AuthError::PermissionDenied { .. } => ErrorCode::PermissionDenied,
            AuthError::ApiDisabled { .. } => ErrorCode::ApiDisabled,
            AuthError::Store(_) => ErrorCode::DatabaseError,
        }
    }

    /// Short name for the security log
    pub fn event(&self) -> &'static str {
        match self {
            AuthError::MissingToken => "auth_missing",
            AuthError::Unauthenticated(_) => "auth_failed",
            AuthError::UserNotFound(_) => "auth_user_not_found",
            AuthError::NoRoleBound => "no_role_bound",
            AuthError::PermissionDenied { .. } => "permission_denied",
            AuthError::ApiDisabled { .. } => "api_disabled",
            AuthError::Store(_) => "auth_store_error",
        }
    }
}

impl From<AuthError> for AppError {
    fn from(err: AuthError) -> Self {
        let code = err.code();
        match err {
            AuthError::Store(e) => e.into(),
            AuthError::Unauthenticated(JwtError::ExpiredToken) => AppError::token_expired(),
            AuthError::Unauthenticated(_) => AppError::invalid_token("Invalid token"),
            AuthError::UserNotFound(user_id) => AppError::user_not_found(user_id),
            AuthError::PermissionDenied { ref method, ref path }
            | AuthError::ApiDisabled { ref method, ref path } => {
                AppError::api_refused(code, err.to_string(), method, path)
            }
            other => AppError::with_message(code, other.to_string()),
        }
    }
}

/// Role → api permission engine
///
/// Holds the compiled grant templates; clones share them.
#[derive(Debug, Clone, Default)]
pub struct PermissionEngine {
    templates: TemplateCache,
}

impl PermissionEngine {
    pub fn new(mode: PathMatchMode) -> Self {
        Self {
            templates: TemplateCache::new(mode),
        }
    }

    pub fn mode(&self) -> PathMatchMode {
        self.templates.mode()
    }

    pub fn templates(&self) -> &TemplateCache {
        &self.templates
    }

    /// Authorize `user_id` for a lowercase `method` and concrete `path`
    pub async fn authorize<S>(
        &self,
        store: &S,
        user_id: i64,
        method: &str,
        path: &str,
    ) -> Result<Access, AuthError>
    where
        S: IdentityStore + ?Sized,
    {
        let roles = store.get_roles_for_user(user_id).await?;

        // 超级管理员优先于一切检查 (包括空角色)
        if roles.iter().any(|r| r.is_super_admin) {
            return Ok(Access::SuperAdmin);
        }
        if roles.is_empty() {
            return Err(AuthError::NoRoleBound);
        }

        let mut grants = Vec::new();
        for role in &roles {
            grants.extend(store.get_apis_for_role(role.id).await?);
        }

        decide(&grants, method, path, &self.templates)
    }
}

/// Match a request against the union of api grants
pub fn decide(
    grants: &[Api],
    method: &str,
    path: &str,
    templates: &TemplateCache,
) -> Result<Access, AuthError> {
    let denied = || AuthError::PermissionDenied {
        method: method.to_string(),
        path: path.to_string(),
    };

    // Methods outside the api vocabulary (HEAD, OPTIONS ...) are never granted
    let request_method: MethodType = method.parse().map_err(|_| denied())?;

    // (method, path, status) -> smallest api id
    let mut unique: BTreeMap<(MethodType, &str, StatusType), i64> = BTreeMap::new();
    for api in grants {
        unique
            .entry((api.method, api.path.as_str(), api.status))
            .and_modify(|id| *id = (*id).min(api.id))
            .or_insert(api.id);
    }

    for ((grant_method, template, status), api_id) in unique {
        if grant_method != request_method || !templates.matches(template, path) {
            continue;
        }
        if !status.is_enabled() {
            return Err(AuthError::ApiDisabled {
                method: method.to_string(),
                path: path.to_string(),
            });
        }
        return Ok(Access::Granted { api_id });
    }

    Err(denied())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::db::store::memory::{MemoryStore, api};
    use shared::models::Role;

    fn engine() -> PermissionEngine {
        PermissionEngine::default()
    }

    fn exact() -> TemplateCache {
        TemplateCache::new(PathMatchMode::Exact)
    }

    #[tokio::test]
    async fn test_super_admin_without_grants() {
        let store = MemoryStore::default()
            .with_role(Role::new(1, "R_SUPER", "超级管理员"))
            .with_user(10, &[1]);

        for (method, path) in [("get", "/anything"), ("delete", "/api/v1/system/users/1")] {
            let access = engine().authorize(&store, 10, method, path).await.unwrap();
            assert_eq!(access, Access::SuperAdmin);
        }
    }

    #[tokio::test]
    async fn test_super_admin_wins_over_other_roles() {
        let store = MemoryStore::default()
            .with_role(Role::new(2, "R_USER", "普通用户"))
            .with_role(Role::new(1, "R_SUPER", "超级管理员"))
            .with_user(10, &[2, 1]);

        let access = engine().authorize(&store, 10, "post", "/x").await.unwrap();
        assert_eq!(access, Access::SuperAdmin);
    }

    #[tokio::test]
    async fn test_no_roles() {
        let store = MemoryStore::default().with_user(10, &[]);
        let err = engine().authorize(&store, 10, "get", "/x").await.unwrap_err();
        assert!(matches!(err, AuthError::NoRoleBound));
        assert_eq!(err.code(), ErrorCode::NoRoleBound);
    }

    #[tokio::test]
    async fn test_disabled_super_role_still_bypasses() {
        let mut disabled_super = Role::new(1, "R_SUPER", "超级管理员");
        disabled_super.status = StatusType::Disable;
        let store = MemoryStore::default()
            .with_role(disabled_super)
            .with_user(10, &[1]);

        let access = engine().authorize(&store, 10, "get", "/x").await.unwrap();
        assert_eq!(access, Access::SuperAdmin);
    }

    #[tokio::test]
    async fn test_disabled_role_grants_still_decide() {
        let mut role = Role::new(2, "R_ITEMS", "items");
        role.status = StatusType::Disable;
        let store = MemoryStore::default()
            .with_role(role)
            .with_apis(2, vec![api(5, MethodType::Get, "/items", StatusType::Enable)])
            .with_user(10, &[2]);

        let access = engine().authorize(&store, 10, "get", "/items").await.unwrap();
        assert_eq!(access, Access::Granted { api_id: 5 });

        let err = engine().authorize(&store, 10, "get", "/other").await.unwrap_err();
        assert!(matches!(err, AuthError::PermissionDenied { .. }));
    }

    #[tokio::test]
    async fn test_engine_reuses_compiled_templates() {
        let store = MemoryStore::default()
            .with_role(Role::new(2, "R_ITEMS", "items"))
            .with_apis(
                2,
                vec![
                    api(5, MethodType::Get, "/items/{id}", StatusType::Enable),
                    api(6, MethodType::Post, "/items", StatusType::Enable),
                ],
            )
            .with_user(10, &[2]);

        let engine = engine();
        let shared = engine.clone();
        for id in 0..20 {
            let path = format!("/items/{id}");
            let access = shared.authorize(&store, 10, "get", &path).await.unwrap();
            assert_eq!(access, Access::Granted { api_id: 5 });
        }
        // Only the GET template is ever tested against a GET request
        assert_eq!(engine.templates().len(), 1);

        engine.authorize(&store, 10, "post", "/items").await.unwrap();
        assert_eq!(engine.templates().len(), 2);
    }

    #[tokio::test]
    async fn test_get_vs_post_on_template() {
        let store = MemoryStore::default()
            .with_role(Role::new(2, "R_ITEMS", "items"))
            .with_apis(2, vec![api(5, MethodType::Get, "/items/{id}", StatusType::Enable)])
            .with_user(10, &[2]);

        let access = engine().authorize(&store, 10, "get", "/items/42").await.unwrap();
        assert_eq!(access, Access::Granted { api_id: 5 });

        let err = engine()
            .authorize(&store, 10, "post", "/items/42")
            .await
            .unwrap_err();
        match err {
            AuthError::PermissionDenied { method, path } => {
                assert_eq!(method, "post");
                assert_eq!(path, "/items/42");
            }
            other => panic!("expected PermissionDenied, got {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_disabled_grant_never_allows() {
        let store = MemoryStore::default()
            .with_role(Role::new(2, "R_ITEMS", "items"))
            .with_apis(2, vec![api(5, MethodType::Get, "/items", StatusType::Disable)])
            .with_user(10, &[2]);

        let err = engine().authorize(&store, 10, "get", "/items").await.unwrap_err();
        assert!(matches!(err, AuthError::ApiDisabled { .. }));
        assert_eq!(err.code(), ErrorCode::ApiDisabled);
    }

    #[test]
    fn test_grant_order_does_not_matter() {
        let a = api(1, MethodType::Get, "/a/{id}", StatusType::Enable);
        let b = api(2, MethodType::Get, "/a/{id}", StatusType::Enable);
        let c = api(3, MethodType::Post, "/a", StatusType::Enable);

        let forward = decide(&[a.clone(), b.clone(), c.clone()], "get", "/a/1", &exact()).unwrap();
        let backward = decide(&[c, b, a], "get", "/a/1", &exact()).unwrap();
        assert_eq!(forward, backward);
        assert_eq!(forward, Access::Granted { api_id: 1 });
    }

    #[test]
    fn test_first_match_in_sorted_order() {
        // Enabled sorts before disabled for the same (method, path)
        let grants = [
            api(7, MethodType::Get, "/a", StatusType::Disable),
            api(8, MethodType::Get, "/a", StatusType::Enable),
        ];
        assert_eq!(
            decide(&grants, "get", "/a", &exact()).unwrap(),
            Access::Granted { api_id: 8 }
        );
    }

    #[test]
    fn test_exact_vs_prefix_mode() {
        let grants = [api(1, MethodType::Get, "/a/b", StatusType::Enable)];
        assert!(matches!(
            decide(&grants, "get", "/a/b/extra", &exact()),
            Err(AuthError::PermissionDenied { .. })
        ));
        assert_eq!(
            decide(&grants, "get", "/a/b/extra", &TemplateCache::new(PathMatchMode::Prefix)).unwrap(),
            Access::Granted { api_id: 1 }
        );
    }

    #[test]
    fn test_unknown_method_is_denied() {
        let grants = [api(1, MethodType::Get, "/a", StatusType::Enable)];
        assert!(matches!(
            decide(&grants, "head", "/a", &exact()),
            Err(AuthError::PermissionDenied { .. })
        ));
    }

    #[test]
    fn test_app_error_mapping() {
        let err: AppError = AuthError::Unauthenticated(JwtError::ExpiredToken).into();
        assert_eq!(err.code, ErrorCode::TokenExpired);

        let err: AppError = AuthError::Unauthenticated(JwtError::InvalidSignature).into();
        assert_eq!(err.code, ErrorCode::TokenInvalid);

        let err: AppError = AuthError::PermissionDenied {
            method: "get".into(),
            path: "/x".into(),
        }
        .into();
        assert_eq!(err.code, ErrorCode::PermissionDenied);
        assert_eq!(err.http_status(), http::StatusCode::FORBIDDEN);

        let err: AppError = AuthError::UserNotFound(3).into();
        assert_eq!(err.code, ErrorCode::UserNotFound);
        assert_eq!(err.http_status(), http::StatusCode::UNAUTHORIZED);
    }
}
