//! Capture submission endpoint.

use axum::{extract::State, Extension};
use serde::Serialize;

use super::{created, require_profile, ApiJson, CreatedResult};
use crate::auth::AuthUser;
use crate::economy::capture_reward;
use crate::errors::AppError;
use crate::models::{Achievement, Capture, CaptureRequest, CardSummary, Mission};
use crate::progression::{build_card, group_missions, now_ms};
use crate::AppState;

/// A stored capture as echoed back to the client.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureView {
    pub user_id: String,
    #[serde(flatten)]
    pub capture: Capture,
}

/// Response of `POST /captures/3`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureResponse {
    pub card: CardSummary,
    pub capture: CaptureView,
    /// Client-credited coins plus the balance before this capture
    pub coins: i64,
    pub user_xp: i64,
    pub achievements: Vec<Achievement>,
    pub missions: Vec<Mission>,
}

/// POST /captures/3 - Record a sighting.
pub async fn submit_capture(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ApiJson(request): ApiJson<CaptureRequest>,
) -> CreatedResult<CaptureResponse> {
    request.validate().map_err(AppError::Validation)?;

    let profile = require_profile(&state, &auth.user).await?;
    let outcome = state
        .repo
        .submit_capture(&profile.id, &request, now_ms())
        .await?;

    let card = build_card(outcome.card, outcome.card_captures);

    let (user_xp, achievements, missions, mission_data) = tokio::try_join!(
        state.repo.total_xp(&profile.id),
        state.repo.get_achievements(&profile.id),
        state.repo.get_missions(&profile.id),
        state.repo.get_mission_data(&profile.id),
    )?;

    tracing::info!(
        user_id = %auth.user.id,
        card_id = %card.id,
        model = %card.aircraft_id,
        reward = capture_reward(request.coverage, request.cloudiness),
        card_xp = card.xp,
        "Capture recorded"
    );

    created(CaptureResponse {
        card: card.summary(),
        capture: CaptureView {
            user_id: card.user_id.clone(),
            capture: outcome.capture,
        },
        coins: request.coins.saturating_add(profile.coins),
        user_xp,
        achievements,
        missions: group_missions(missions, mission_data),
    })
}
