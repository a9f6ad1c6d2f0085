//! Auth API Module
//!
//! - /api/v1/auth/login, /api/v1/auth/refresh-token: public
//! - /api/v1/auth/me, /api/v1/auth/logout: require auth

mod handler;

use axum::{
    Router,
    routing::{get, post},
};

use crate::core::ServerState;

pub fn router() -> Router<ServerState> {
    Router::new()
        .route("/api/v1/auth/login", post(handler::login))
        .route("/api/v1/auth/refresh-token", post(handler::refresh_token))
        .route("/api/v1/auth/me", get(handler::me))
        .route("/api/v1/auth/logout", post(handler::logout))
}
