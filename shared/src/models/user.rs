//! User Model

use super::common::{GenderType, StatusType};
use serde::{Deserialize, Serialize};

/// User entity (后台用户)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[cfg_attr(feature = "db", derive(sqlx::FromRow))]
#[serde(rename_all = "camelCase")]
pub struct User {
    pub id: i64,
    pub user_name: String,
    /// argon2 PHC hash, never sent over the wire
    #[serde(skip_serializing, default)]
    pub password: String,
    pub nick_name: Option<String>,
    pub user_gender: GenderType,
    pub user_email: Option<String>,
    pub user_phone: Option<String>,
    pub last_login: Option<i64>,
    pub status: StatusType,
    pub created_at: i64,
    pub updated_at: i64,
}

impl User {
    pub fn is_enabled(&self) -> bool {
        self.status.is_enabled()
    }
}

/// User with its bound role codes (list / detail responses)
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserWithRoles {
    #[serde(flatten)]
    pub user: User,
    pub role_ids: Vec<i64>,
}

/// Create user payload
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserCreate {
    pub user_name: String,
    pub password: String,
    pub nick_name: Option<String>,
    pub user_gender: Option<GenderType>,
    pub user_email: Option<String>,
    pub user_phone: Option<String>,
    pub status: Option<StatusType>,
    #[serde(default)]
    pub role_ids: Vec<i64>,
}

/// Update user payload
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserUpdate {
    pub user_name: Option<String>,
    pub password: Option<String>,
    pub nick_name: Option<String>,
    pub user_gender: Option<GenderType>,
    pub user_email: Option<String>,
    pub user_phone: Option<String>,
    pub status: Option<StatusType>,
    /// Replaces the role bindings when present
    pub role_ids: Option<Vec<i64>>,
}

/// User list filter (`?userName=&status=`)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserQuery {
    pub user_name: Option<String>,
    pub nick_name: Option<String>,
    pub status: Option<StatusType>,
}

/// `POST /api/v1/auth/login` body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginRequest {
    pub user_name: String,
    pub password: String,
}

/// `POST /api/v1/auth/refresh-token` body
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshTokenRequest {
    pub refresh_token: String,
}

/// Response of `GET /api/v1/auth/me`
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserInfo {
    pub user_id: i64,
    pub user_name: String,
    pub nick_name: Option<String>,
    pub user_email: Option<String>,
    /// Role codes
    pub roles: Vec<String>,
    /// Button codes granted through the roles
    pub buttons: Vec<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample() -> User {
        User {
            id: 7,
            user_name: "alice".into(),
            password: "$argon2id$v=19$...".into(),
            nick_name: Some("Alice".into()),
            user_gender: GenderType::Female,
            user_email: None,
            user_phone: None,
            last_login: None,
            status: StatusType::Enable,
            created_at: 0,
            updated_at: 0,
        }
    }

    #[test]
    fn test_password_never_serialized() {
        let json = serde_json::to_value(sample()).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["userName"], "alice");
        assert_eq!(json["userGender"], "2");
    }

    #[test]
    fn test_with_roles_flattens() {
        let json = serde_json::to_value(UserWithRoles {
            user: sample(),
            role_ids: vec![1, 2],
        })
        .unwrap();
        assert_eq!(json["id"], 7);
        assert_eq!(json["roleIds"], serde_json::json!([1, 2]));
    }
}
