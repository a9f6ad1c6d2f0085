//! Unified error codes for the admin backend
//!
//! This module defines all error codes returned by the server.
//! Error codes are organized by category:
//! - 0xxx: General errors
//! - 1xxx: Authentication errors
//! - 2xxx: Permission errors
//! - 3xxx: User errors
//! - 4xxx: Role errors
//! - 5xxx: Menu errors
//! - 6xxx: API / button errors
//! - 7xxx: Log errors
//! - 8xxx: Department errors
//! - 9xxx: System errors

use serde::{Deserialize, Serialize};
use std::fmt;

/// Unified error code enum
///
/// All error codes are represented as u16 values for efficient serialization
/// and cross-language compatibility (Rust, TypeScript, etc.)
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "u16", try_from = "u16")]
#[repr(u16)]
pub enum ErrorCode {
    // ==================== 0xxx: General ====================
    /// Operation completed successfully
    Success = 0,
    /// Unknown error
    Unknown = 1,
    /// Validation failed
    ValidationFailed = 2,
    /// Resource not found
    NotFound = 3,
    /// Resource already exists
    AlreadyExists = 4,
    /// Invalid request
    InvalidRequest = 5,
    /// Invalid format
    InvalidFormat = 6,
    /// Required field missing
    RequiredField = 7,

    // ==================== 1xxx: Auth ====================
    /// User is not authenticated
    NotAuthenticated = 1001,
    /// Invalid credentials (username/password)
    InvalidCredentials = 1002,
    /// Token has expired
    TokenExpired = 1003,
    /// Token is invalid
    TokenInvalid = 1004,
    /// Account is disabled
    AccountDisabled = 1007,
    /// Token is valid but its user no longer exists
    UserNotFound = 1008,
    /// Token type does not fit the endpoint (refresh token used as access token)
    TokenTypeMismatch = 1009,

    // ==================== 2xxx: Permission ====================
    /// Permission denied
    PermissionDenied = 2001,
    /// Authenticated user is not bound to any role
    NoRoleBound = 2006,
    /// Matching API grant exists but the API is disabled
    ApiDisabled = 2007,

    // ==================== 3xxx: User ====================
    /// Username already taken
    UsernameExists = 3001,
    /// Email already taken
    EmailExists = 3002,
    /// Users cannot delete their own account
    CannotDeleteSelf = 3003,
    /// User is referenced by audit logs
    UserInUse = 3004,

    // ==================== 4xxx: Role ====================
    /// Role not found
    RoleNotFound = 4001,
    /// Role code already exists
    RoleCodeExists = 4002,
    /// Role name already exists
    RoleNameExists = 4003,
    /// Role is still bound to users
    RoleInUse = 4004,
    /// The super administrator role cannot be changed
    SuperRoleImmutable = 4005,

    // ==================== 5xxx: Menu ====================
    /// Menu not found
    MenuNotFound = 5001,
    /// Parent menu not found
    MenuParentNotFound = 5002,
    /// Parent assignment would create a cycle
    MenuCycleDetected = 5003,
    /// Menu still has child menus
    MenuHasChildren = 5004,

    // ==================== 6xxx: API / Button ====================
    /// API not found
    ApiNotFound = 6001,
    /// API (method, path) already exists
    ApiExists = 6002,
    /// Button not found
    ButtonNotFound = 6101,
    /// Button code already exists
    ButtonCodeExists = 6102,

    // ==================== 7xxx: Log ====================
    /// Log entry not found
    LogNotFound = 7001,

    // ==================== 8xxx: Department ====================
    /// Department not found
    DepartmentNotFound = 8001,
    /// Parent department not found
    DepartmentParentNotFound = 8002,
    /// Parent assignment would create a cycle
    DepartmentCycleDetected = 8003,
    /// Department still has sub-departments
    DepartmentHasChildren = 8004,

    // ==================== 9xxx: System ====================
    /// Internal server error
    InternalError = 9001,
    /// Database error
    DatabaseError = 9002,
    /// Configuration error
    ConfigError = 9005,
}

impl ErrorCode {
    /// Get the numeric code value
    #[inline]
    pub const fn code(&self) -> u16 {
        *self as u16
    }

    /// Check if this is a success code
    #[inline]
    pub const fn is_success(&self) -> bool {
        matches!(self, ErrorCode::Success)
    }

    /// Get the default message for this error code
    pub const fn message(&self) -> &'static str {
        match self {
            // General
            ErrorCode::Success => "Operation completed successfully",
            ErrorCode::Unknown => "An unknown error occurred",
            ErrorCode::ValidationFailed => "Validation failed",
            ErrorCode::NotFound => "Resource not found",
            ErrorCode::AlreadyExists => "Resource already exists",
            ErrorCode::InvalidRequest => "Invalid request",
            ErrorCode::InvalidFormat => "Invalid format",
            ErrorCode::RequiredField => "Required field is missing",

            // Auth
            ErrorCode::NotAuthenticated => "User is not authenticated",
            ErrorCode::InvalidCredentials => "Invalid username or password",
            ErrorCode::TokenExpired => "Authentication token has expired",
            ErrorCode::TokenInvalid => "Authentication token is invalid",
            ErrorCode::AccountDisabled => "Account is disabled",
            ErrorCode::UserNotFound => "User not found",
            ErrorCode::TokenTypeMismatch => "Token type is not accepted here",

            // Permission
            ErrorCode::PermissionDenied => "Permission denied",
            ErrorCode::NoRoleBound => "The user is not bound to a role",
            ErrorCode::ApiDisabled => "The API has been disabled",

            // User
            ErrorCode::UsernameExists => "Username already exists",
            ErrorCode::EmailExists => "Email already exists",
            ErrorCode::CannotDeleteSelf => "Cannot delete own account",
            ErrorCode::UserInUse => "User is referenced by audit logs",

            // Role
            ErrorCode::RoleNotFound => "Role not found",
            ErrorCode::RoleCodeExists => "Role code already exists",
            ErrorCode::RoleNameExists => "Role name already exists",
            ErrorCode::RoleInUse => "Role is currently in use",
            ErrorCode::SuperRoleImmutable => "The super administrator role cannot be modified",

            // Menu
            ErrorCode::MenuNotFound => "Menu not found",
            ErrorCode::MenuParentNotFound => "Parent menu not found",
            ErrorCode::MenuCycleDetected => "Menu parent chain would form a cycle",
            ErrorCode::MenuHasChildren => "Menu has child menus",

            // API / Button
            ErrorCode::ApiNotFound => "API not found",
            ErrorCode::ApiExists => "API already exists",
            ErrorCode::ButtonNotFound => "Button not found",
            ErrorCode::ButtonCodeExists => "Button code already exists",

            // Log
            ErrorCode::LogNotFound => "Log not found",

            // Department
            ErrorCode::DepartmentNotFound => "Department not found",
            ErrorCode::DepartmentParentNotFound => "Parent department not found",
            ErrorCode::DepartmentCycleDetected => "Department parent chain would form a cycle",
            ErrorCode::DepartmentHasChildren => "Department has sub-departments",

            // System
            ErrorCode::InternalError => "Internal server error",
            ErrorCode::DatabaseError => "Database error",
            ErrorCode::ConfigError => "Configuration error",
        }
    }
}

impl From<ErrorCode> for u16 {
    #[inline]
    fn from(code: ErrorCode) -> Self {
        code.code()
    }
}

/// Error returned when converting an unknown u16 to [`ErrorCode`]
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct InvalidErrorCode(pub u16);

impl fmt::Display for InvalidErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "invalid error code: {}", self.0)
    }
}

impl std::error::Error for InvalidErrorCode {}

impl TryFrom<u16> for ErrorCode {
    type Error = InvalidErrorCode;

    fn try_from(value: u16) -> Result<Self, Self::Error> {
        match value {
            // General
            0 => Ok(ErrorCode::Success),
            1 => Ok(ErrorCode::Unknown),
            2 => Ok(ErrorCode::ValidationFailed),
            3 => Ok(ErrorCode::NotFound),
            4 => Ok(ErrorCode::AlreadyExists),
            5 => Ok(ErrorCode::InvalidRequest),
            6 => Ok(ErrorCode::InvalidFormat),
            7 => Ok(ErrorCode::RequiredField),

            // Auth
            1001 => Ok(ErrorCode::NotAuthenticated),
            1002 => Ok(ErrorCode::InvalidCredentials),
            1003 => Ok(ErrorCode::TokenExpired),
            1004 => Ok(ErrorCode::TokenInvalid),
            1007 => Ok(ErrorCode::AccountDisabled),
            1008 => Ok(ErrorCode::UserNotFound),
            1009 => Ok(ErrorCode::TokenTypeMismatch),

            // Permission
            2001 => Ok(ErrorCode::PermissionDenied),
            2006 => Ok(ErrorCode::NoRoleBound),
            2007 => Ok(ErrorCode::ApiDisabled),

            // User
            3001 => Ok(ErrorCode::UsernameExists),
            3002 => Ok(ErrorCode::EmailExists),
            3003 => Ok(ErrorCode::CannotDeleteSelf),
            3004 => Ok(ErrorCode::UserInUse),

            // Role
            4001 => Ok(ErrorCode::RoleNotFound),
            4002 => Ok(ErrorCode::RoleCodeExists),
            4003 => Ok(ErrorCode::RoleNameExists),
            4004 => Ok(ErrorCode::RoleInUse),
            4005 => Ok(ErrorCode::SuperRoleImmutable),

            // Menu
            5001 => Ok(ErrorCode::MenuNotFound),
            5002 => Ok(ErrorCode::MenuParentNotFound),
            5003 => Ok(ErrorCode::MenuCycleDetected),
            5004 => Ok(ErrorCode::MenuHasChildren),

            // API / Button
            6001 => Ok(ErrorCode::ApiNotFound),
            6002 => Ok(ErrorCode::ApiExists),
            6101 => Ok(ErrorCode::ButtonNotFound),
            6102 => Ok(ErrorCode::ButtonCodeExists),

            // Log
            7001 => Ok(ErrorCode::LogNotFound),

            // Department
            8001 => Ok(ErrorCode::DepartmentNotFound),
            8002 => Ok(ErrorCode::DepartmentParentNotFound),
            8003 => Ok(ErrorCode::DepartmentCycleDetected),
            8004 => Ok(ErrorCode::DepartmentHasChildren),

            // System
            9001 => Ok(ErrorCode::InternalError),
            9002 => Ok(ErrorCode::DatabaseError),
            9005 => Ok(ErrorCode::ConfigError),

            _ => Err(InvalidErrorCode(value)),
        }
    }
}

impl fmt::Display for ErrorCode {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_error_code_values() {
        assert_eq!(ErrorCode::Success.code(), 0);
        assert_eq!(ErrorCode::NotFound.code(), 3);
        assert_eq!(ErrorCode::NotAuthenticated.code(), 1001);
        assert_eq!(ErrorCode::TokenExpired.code(), 1003);
        assert_eq!(ErrorCode::UserNotFound.code(), 1008);
        assert_eq!(ErrorCode::PermissionDenied.code(), 2001);
        assert_eq!(ErrorCode::NoRoleBound.code(), 2006);
        assert_eq!(ErrorCode::ApiDisabled.code(), 2007);
        assert_eq!(ErrorCode::MenuCycleDetected.code(), 5003);
        assert_eq!(ErrorCode::DatabaseError.code(), 9002);
    }

    #[test]
    fn test_is_success() {
        assert!(ErrorCode::Success.is_success());
        assert!(!ErrorCode::NotFound.is_success());
        assert!(!ErrorCode::InternalError.is_success());
    }

    #[test]
    fn test_try_from_valid() {
        assert_eq!(ErrorCode::try_from(0), Ok(ErrorCode::Success));
        assert_eq!(ErrorCode::try_from(2007), Ok(ErrorCode::ApiDisabled));
        assert_eq!(ErrorCode::try_from(4005), Ok(ErrorCode::SuperRoleImmutable));
        assert_eq!(ErrorCode::try_from(8004), Ok(ErrorCode::DepartmentHasChildren));
        assert_eq!(ErrorCode::try_from(9001), Ok(ErrorCode::InternalError));
    }

    #[test]
    fn test_try_from_invalid() {
        assert_eq!(ErrorCode::try_from(999), Err(InvalidErrorCode(999)));
        assert_eq!(ErrorCode::try_from(2002), Err(InvalidErrorCode(2002)));
    }

    #[test]
    fn test_serialize_as_number() {
        let json = serde_json::to_string(&ErrorCode::PermissionDenied).unwrap();
        assert_eq!(json, "2001");
    }

    #[test]
    fn test_deserialize() {
        let code: ErrorCode = serde_json::from_str("2006").unwrap();
        assert_eq!(code, ErrorCode::NoRoleBound);
    }

    #[test]
    fn test_deserialize_invalid() {
        let result: Result<ErrorCode, _> = serde_json::from_str("12345");
        assert!(result.is_err());
    }

    #[test]
    fn test_display() {
        assert_eq!(format!("{}", ErrorCode::Success), "0");
        assert_eq!(format!("{}", ErrorCode::MenuNotFound), "5001");
    }

    #[test]
    fn test_message() {
        assert_eq!(ErrorCode::NotFound.message(), "Resource not found");
        assert_eq!(
            ErrorCode::NoRoleBound.message(),
            "The user is not bound to a role"
        );
        assert_eq!(ErrorCode::ApiDisabled.message(), "The API has been disabled");
    }

    #[test]
    fn test_invalid_error_code_display() {
        let err = InvalidErrorCode(999);
        assert_eq!(format!("{}", err), "invalid error code: 999");
    }
}
