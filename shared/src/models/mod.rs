//! Data models
//!
//! Shared between admin-server and frontend (via API).
//! DB row types use `#[cfg_attr(feature = "db", derive(sqlx::FromRow))]`.
//! All IDs are `i64` (SQLite INTEGER PRIMARY KEY), timestamps are Unix millis.
//! Wire format is camelCase.

pub mod api;
pub mod button;
pub mod common;
pub mod department;
pub mod log;
pub mod menu;
pub mod role;
pub mod serde_helpers;
pub mod user;

// Re-exports
pub use api::*;
pub use button::*;
pub use common::*;
pub use department::*;
pub use log::*;
pub use menu::*;
pub use role::*;
pub use user::*;
