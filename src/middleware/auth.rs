use axum::{
    async_trait,
    extract::FromRequestParts,
    http::{header::AUTHORIZATION, request::Parts, HeaderMap},
};

use crate::error::ApiError;
use crate::state::AppState;

/// Authenticated user resolved from the bearer token
///
/// Taking `AuthUser` as a handler argument makes the route require
/// authentication. It runs before the body is read, so a request without a
/// valid token is answered with 401 whatever its payload.
#[derive(Clone, Debug)]
pub struct AuthUser {
    pub id: i64,
    pub username: String,
}

#[async_trait]
impl FromRequestParts<AppState> for AuthUser {
    type Rejection = ApiError;

    async fn from_request_parts(parts: &mut Parts, state: &AppState) -> Result<Self, Self::Rejection> {
        let token = extract_jwt_from_headers(&parts.headers).map_err(ApiError::unauthorized)?;

        let user_id = state.credentials.verify_token(token)?;

        // A valid signature is not enough: the account must still exist
        let user = state.store.find_user(user_id).await?.ok_or_else(|| {
            tracing::warn!("Token subject {} does not match any user", user_id);
            ApiError::unauthorized("Invalid token")
        })?;

        tracing::debug!("Authenticated request as '{}' ({})", user.username, user.id);

        Ok(AuthUser {
            id: user.id,
            username: user.username,
        })
    }
}

/// Extract JWT token from Authorization header
fn extract_jwt_from_headers(headers: &HeaderMap) -> Result<&str, &'static str> {
    let auth_header = headers
        .get(AUTHORIZATION)
        .ok_or("Not authenticated")?;

    let auth_str = auth_header
        .to_str()
        .map_err(|_| "Invalid Authorization header format")?;

    let (scheme, token) = auth_str
        .split_once(' ')
        .ok_or("Authorization header must use Bearer token format")?;

    if !scheme.eq_ignore_ascii_case("bearer") {
        return Err("Authorization header must use Bearer token format");
    }

    let token = token.trim();
    if token.is_empty() {
        return Err("Empty JWT token");
    }
    Ok(token)
}
