//! Shared types for the admin backend
//!
//! Common types used by the server and its clients: the unified error
//! system, the persisted data models and the id-set abstraction used for
//! many-to-many grants.

pub mod error;
pub mod id_set;
pub mod models;

// Re-exports
pub use axum::{Json, body};
pub use http;
pub use serde::{Deserialize, Serialize};

pub use error::{AppError, AppResult, ErrorBody, ErrorCategory, ErrorCode};
pub use id_set::IdSet;
