//! Bearer-token authentication.
//!
//! A token resolves to an account by a single lookup. There is no session
//! expiry and no refresh.

mod credentials;

pub use credentials::*;

use axum::{
    extract::{Request, State},
    http::header,
    middleware::Next,
    response::Response,
};

use crate::errors::AppError;
use crate::models::User;
use crate::AppState;

/// Account resolved from the request's bearer token.
#[derive(Debug, Clone)]
pub struct AuthUser {
    pub user: User,
}

/// Extract the token from an `Authorization: Bearer <token>` header value.
pub fn bearer_token(value: &str) -> Option<&str> {
    value
        .strip_prefix("Bearer ")
        .map(str::trim)
        .filter(|token| !token.is_empty())
}

/// Resolve a token to its account.
pub async fn resolve(state: &AppState, token: &str) -> Result<User, AppError> {
    state
        .repo
        .get_user_by_token(token)
        .await?
        .ok_or_else(|| AppError::Unauthorized("Invalid token".to_string()))
}

/// Middleware that requires a valid bearer token.
pub async fn require_user(
    State(state): State<AppState>,
    mut request: Request,
    next: Next,
) -> Result<Response, AppError> {
    let token = request
        .headers()
        .get(header::AUTHORIZATION)
        .and_then(|v| v.to_str().ok())
        .and_then(bearer_token)
        .map(|s| s.to_string())
        .ok_or_else(|| AppError::Unauthorized("No token provided".to_string()))?;

    let user = resolve(&state, &token).await?;
    tracing::debug!(user_id = %user.id, "Authenticated request");

    request.extensions_mut().insert(AuthUser { user });
    Ok(next.run(request).await)
}
