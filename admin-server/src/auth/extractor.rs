//! CurrentUser extractor
//!
//! Handlers behind [`super::middleware::require_auth`] find the user already
//! in the request extensions; the extractor resolves it otherwise.

use axum::{extract::FromRequestParts, http::request::Parts};
use shared::AppError;

use super::jwt::CurrentUser;
use super::resolver::resolve_current_user;
use crate::core::ServerState;
use crate::security_log;

impl FromRequestParts<ServerState> for CurrentUser {
    type Rejection = AppError;

    async fn from_request_parts(
        parts: &mut Parts,
        state: &ServerState,
    ) -> Result<Self, Self::Rejection> {
        let jwt = state.get_jwt_service();
        match resolve_current_user(
            &parts.headers,
            &mut parts.extensions,
            jwt.as_ref(),
            state.store.as_ref(),
        )
        .await
        {
            Ok(user) => Ok(user),
            Err(e) => {
                security_log!(
                    "WARN",
                    e.event(),
                    error = format!("{}", e),
                    uri = format!("{:?}", parts.uri)
                );
                Err(e.into())
            }
        }
    }
}
