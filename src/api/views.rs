//! Server-rendered login form and deck gallery.

use axum::{
    extract::State,
    http::StatusCode,
    response::{Html, IntoResponse, Redirect, Response},
    Form,
};
use axum_extra::extract::cookie::{Cookie, CookieJar};

use super::authenticate;
use crate::deck::{render_deck, render_login, render_page, sort_for_display};
use crate::errors::AppError;
use crate::models::LoginRequest;
use crate::progression::{load_snapshot, now_ms};
use crate::AppState;

/// Cookie holding the bearer token of the browser session.
pub const AUTH_COOKIE: &str = "authToken";

/// GET /app/login - The login form.
pub async fn login_page() -> Html<String> {
    Html(render_login(None))
}

/// POST /app/login - Check the form and start a browser session.
pub async fn login_submit(
    State(state): State<AppState>,
    jar: CookieJar,
    Form(request): Form<LoginRequest>,
) -> Result<Response, AppError> {
    let user = match authenticate(&state, request.email.trim(), &request.password).await {
        Ok(user) => user,
        Err(AppError::Unauthorized(_)) => {
            return Ok((
                StatusCode::UNAUTHORIZED,
                Html(render_login(Some("Invalid email or password"))),
            )
                .into_response());
        }
        Err(e) => return Err(e),
    };

    let cookie = Cookie::build((AUTH_COOKIE, user.token))
        .path("/")
        .http_only(true);

    tracing::debug!(user_id = %user.id, "Browser session started");
    Ok((jar.add(cookie), Redirect::to("/app/deck")).into_response())
}

/// GET /app/deck - The caller's cards, highest XP first.
pub async fn deck_page(State(state): State<AppState>, jar: CookieJar) -> Result<Response, AppError> {
    let Some(token) = jar.get(AUTH_COOKIE).map(|c| c.value().to_string()) else {
        return Ok(Redirect::to("/app/login").into_response());
    };

    let Some(user) = state.repo.get_user_by_token(&token).await? else {
        return Ok(user_not_found());
    };

    let snapshot = match load_snapshot(&state.repo, &user.id, now_ms()).await {
        Ok(snapshot) => snapshot,
        Err(AppError::NotFound(_)) => return Ok(user_not_found()),
        Err(e) => return Err(e),
    };

    let mut cards = snapshot.cards;
    sort_for_display(&mut cards);

    Ok(Html(render_deck(&cards, &state.models, &state.config.asset_base_url)).into_response())
}

fn user_not_found() -> Response {
    (
        StatusCode::NOT_FOUND,
        Html(render_page("Deck", "<p>User not found</p>")),
    )
        .into_response()
}
