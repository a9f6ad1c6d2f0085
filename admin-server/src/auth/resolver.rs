//! Authentication resolver
//!
//! Bearer token → [`User`]. The resolved [`CurrentUser`] is cached in the
//! request extensions so the middleware and the extractor decode once per
//! request.

use http::{Extensions, HeaderMap, header::AUTHORIZATION};
use shared::models::User;

use super::jwt::{CurrentUser, JwtError, JwtService};
use super::permission::AuthError;
use crate::db::IdentityStore;

/// Decode an access token and load its user
pub async fn authenticate<S>(jwt: &JwtService, store: &S, token: &str) -> Result<User, AuthError>
where
    S: IdentityStore + ?Sized,
{
    let claims = jwt.decode_access(token)?;
    store
        .get_user(claims.user_id)
        .await?
        .ok_or(AuthError::UserNotFound(claims.user_id))
}

/// Token of the `Authorization: Bearer <token>` header
pub fn bearer_token(headers: &HeaderMap) -> Result<&str, AuthError> {
    let header = headers.get(AUTHORIZATION).ok_or(AuthError::MissingToken)?;
    let value = header
        .to_str()
        .map_err(|_| JwtError::Malformed("Authorization header is not ASCII".into()))?;
    JwtService::extract_from_header(value)
        .ok_or_else(|| JwtError::Malformed("Invalid authorization header".into()).into())
}

/// Resolve the caller once per request
pub async fn resolve_current_user<S>(
    headers: &HeaderMap,
    extensions: &mut Extensions,
    jwt: &JwtService,
    store: &S,
) -> Result<CurrentUser, AuthError>
where
    S: IdentityStore + ?Sized,
{
    if let Some(user) = extensions.get::<CurrentUser>() {
        return Ok(user.clone());
    }

    let token = bearer_token(headers)?;
    let user = authenticate(jwt, store, token).await?;
    let current = CurrentUser::from(&user);
    extensions.insert(current.clone());
    Ok(current)
}
