//! HTTP status code mapping for error codes

use super::codes::ErrorCode;
use http::StatusCode;

impl ErrorCode {
    /// Get the appropriate HTTP status code for this error code
    pub fn http_status(&self) -> StatusCode {
        match self {
            // Success
            Self::Success => StatusCode::OK,

            // 404 Not Found
            Self::NotFound
            | Self::RoleNotFound
            | Self::MenuNotFound
            | Self::MenuParentNotFound
            | Self::ApiNotFound
            | Self::ButtonNotFound
            | Self::LogNotFound
            | Self::DepartmentNotFound
            | Self::DepartmentParentNotFound => StatusCode::NOT_FOUND,

            // 409 Conflict
            Self::AlreadyExists
            | Self::UsernameExists
            | Self::EmailExists
            | Self::UserInUse
            | Self::RoleCodeExists
            | Self::RoleNameExists
            | Self::RoleInUse
            | Self::MenuHasChildren
            | Self::ApiExists
            | Self::ButtonCodeExists
            | Self::DepartmentHasChildren => StatusCode::CONFLICT,

            // 401 Unauthorized
            Self::NotAuthenticated
            | Self::InvalidCredentials
            | Self::TokenExpired
            | Self::TokenInvalid
            | Self::TokenTypeMismatch
            | Self::AccountDisabled
            | Self::UserNotFound => StatusCode::UNAUTHORIZED,

            // 403 Forbidden
            Self::PermissionDenied
            | Self::NoRoleBound
            | Self::ApiDisabled
            | Self::CannotDeleteSelf
            | Self::SuperRoleImmutable => StatusCode::FORBIDDEN,

            // 500 Internal Server Error
            Self::InternalError | Self::DatabaseError | Self::ConfigError => {
                StatusCode::INTERNAL_SERVER_ERROR
            }

            // 400 Bad Request (default for validation/business errors)
            _ => StatusCode::BAD_REQUEST,
        }
    }
}
