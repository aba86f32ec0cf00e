//! REST API module.
//!
//! Contains all routes and handlers of the game client contract plus the
//! server-rendered deck pages.

mod battle;
mod captures;
mod items;
mod users;
mod views;

pub use battle::*;
pub use captures::*;
pub use items::*;
pub use users::*;
pub use views::*;

use axum::{
    extract::{FromRequest, OriginalUri},
    http::{Method, StatusCode},
    Json,
};
use serde::Serialize;

use crate::errors::AppError;
use crate::models::{Profile, User};
use crate::AppState;

/// JSON body extractor whose rejections use the error envelope.
#[derive(FromRequest)]
#[from_request(via(axum::Json), rejection(AppError))]
pub struct ApiJson<T>(pub T);

/// Response type of every JSON handler.
pub type ApiResult<T> = Result<Json<T>, AppError>;

/// Response type of handlers that create something.
pub type CreatedResult<T> = Result<(StatusCode, Json<T>), AppError>;

/// Create a successful API response.
pub fn success<T: Serialize>(data: T) -> ApiResult<T> {
    Ok(Json(data))
}

/// Create a `201 Created` API response.
pub fn created<T: Serialize>(data: T) -> CreatedResult<T> {
    Ok((StatusCode::CREATED, Json(data)))
}

/// Progress row of an authenticated account.
pub(crate) async fn require_profile(state: &AppState, user: &User) -> Result<Profile, AppError> {
    state
        .repo
        .get_profile(&user.id)
        .await?
        .ok_or_else(|| AppError::ProfileMissing("No user found".to_string()))
}

/// Body of the catch-all 404 response.
#[derive(Debug, Serialize)]
pub struct RouteNotFound {
    pub error: &'static str,
}

/// Fallback for unknown routes.
pub async fn route_not_found(
    method: Method,
    OriginalUri(uri): OriginalUri,
) -> (StatusCode, Json<RouteNotFound>) {
    tracing::warn!(%method, path = %uri.path(), "API route not found");
    (
        StatusCode::NOT_FOUND,
        Json(RouteNotFound {
            error: "API route not found",
        }),
    )
}
