//! Account and profile endpoints.

use axum::{extract::State, Extension};
use serde::Serialize;
use serde_json::{json, Value};

use super::{created, require_profile, success, ApiJson, ApiResult, CreatedResult};
use crate::auth::{hash_password, issue_token, verify_password, AuthUser};
use crate::economy::{find_boost_product, RELOCATION_DURATION_SECS};
use crate::errors::AppError;
use crate::models::{
    ConsumePhotoRequest, Countdowns, LoginRequest, MessagingTokenRequest, Mission,
    ProgressSnapshot, PurchaseRequest, RelocateRequest, Relocation, RenameRequest, SignupRequest,
    User,
};
use crate::progression::{captured_regs, include_owned_models, load_snapshot, now_ms};
use crate::AppState;

/// Response of `POST /users/create`.
#[derive(Debug, Serialize)]
pub struct SignupResponse {
    pub token: String,
}

/// Response of login and `GET /users`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct LoginEnvelope {
    pub token: String,
    pub user_data: ProgressSnapshot,
    pub relocation: Relocation,
    pub captured_regs: Vec<String>,
    pub missions: Vec<Mission>,
}

/// Response of `PATCH /users`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagingTokenResponse {
    pub messaging_token: Option<String>,
    pub last_film_handout_time_left: i64,
    pub last_capture: i64,
    pub relocation: Relocation,
    pub is_verified: bool,
    pub has_pending_friend_requests: bool,
    #[serde(flatten)]
    pub countdowns: Countdowns,
}

/// Response of `GET /users/refresh`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct RefreshResponse {
    pub xp: i64,
    pub coins: i64,
    pub num_exposures: i64,
    pub last_film_handout_time_left: i64,
    #[serde(flatten)]
    pub countdowns: Countdowns,
}

/// Response of `POST /users/consume/photo`.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ConsumePhotoResponse {
    pub num_exposures: i64,
    pub last_film_handout_time_left: i64,
    #[serde(flatten)]
    pub countdowns: Countdowns,
}

/// Response of boost purchases and relocation.
#[derive(Debug, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct BoostResponse {
    pub coins: i64,
    pub photos_unlimited: Value,
    pub last_film_handout_time_left: i64,
    #[serde(flatten)]
    pub countdowns: Countdowns,
}

/// Check an email/password pair and return the account.
pub async fn authenticate(state: &AppState, email: &str, password: &str) -> Result<User, AppError> {
    let invalid = || AppError::Unauthorized("Invalid username or password".to_string());

    let user = state
        .repo
        .get_user_by_email(email)
        .await?
        .ok_or_else(invalid)?;

    let password = password.to_string();
    let hash = user.hashed_password.clone();
    let matches = tokio::task::spawn_blocking(move || verify_password(&password, &hash))
        .await
        .map_err(|e| AppError::Internal(format!("Password check failed: {}", e)))?
        .unwrap_or(false);

    if !matches {
        tracing::debug!(email = %email, "Rejected login");
        return Err(invalid());
    }
    Ok(user)
}

/// Build the login envelope for an account.
async fn login_envelope(state: &AppState, user: &User) -> Result<LoginEnvelope, AppError> {
    let mut snapshot = load_snapshot(&state.repo, &user.id, now_ms()).await?;
    include_owned_models(&mut snapshot);

    Ok(LoginEnvelope {
        token: user.token.clone(),
        relocation: snapshot.relocation.clone(),
        captured_regs: captured_regs(&snapshot),
        missions: snapshot.missions.clone(),
        user_data: snapshot,
    })
}

/// POST /users/create - Register an account.
pub async fn signup(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<SignupRequest>,
) -> CreatedResult<SignupResponse> {
    let email = request.email.trim();
    if email.is_empty() || !email.contains('@') {
        return Err(AppError::Validation("A valid email is required".to_string()));
    }
    if request.password.is_empty() {
        return Err(AppError::Validation("Password is required".to_string()));
    }

    let cost = state.config.bcrypt_cost;
    let password = request.password;
    let hashed = tokio::task::spawn_blocking(move || hash_password(&password, cost))
        .await
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))??;

    let token = issue_token(email, &state.config.token_secret)?;
    let user = state
        .repo
        .create_account(email, &hashed, &token, now_ms())
        .await?;

    tracing::info!(user_id = %user.id, "Account created");
    created(SignupResponse { token: user.token })
}

/// POST /users - Log in with email and password.
pub async fn login(
    State(state): State<AppState>,
    ApiJson(request): ApiJson<LoginRequest>,
) -> CreatedResult<LoginEnvelope> {
    let user = authenticate(&state, request.email.trim(), &request.password).await?;
    created(login_envelope(&state, &user).await?)
}

/// GET /users - Full progress of the caller.
pub async fn get_user(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<LoginEnvelope> {
    success(login_envelope(&state, &auth.user).await?)
}

/// PATCH /users - Store the push messaging token.
pub async fn update_messaging_token(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ApiJson(request): ApiJson<MessagingTokenRequest>,
) -> ApiResult<MessagingTokenResponse> {
    let profile = state
        .repo
        .update_messaging_token(&auth.user.id, &request.messaging_token)
        .await?
        .ok_or_else(|| AppError::ProfileMissing("No user found".to_string()))?;

    success(MessagingTokenResponse {
        countdowns: Countdowns::for_profile(&profile, now_ms()),
        messaging_token: profile.messaging_token,
        last_film_handout_time_left: profile.last_film_handout_time_left,
        last_capture: profile.last_capture,
        relocation: Relocation {
            airport_id: profile.relocation_airport_id,
            airport: profile.relocation_airport,
            timestamp: profile.relocation_timestamp,
        },
        is_verified: profile.is_verified,
        has_pending_friend_requests: profile.has_pending_friend_requests,
    })
}

/// GET /users/refresh - Balance, XP and countdowns.
pub async fn refresh(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
) -> ApiResult<RefreshResponse> {
    let profile = require_profile(&state, &auth.user).await?;
    let xp = state.repo.total_xp(&profile.id).await?;

    success(RefreshResponse {
        xp,
        coins: profile.coins,
        num_exposures: profile.num_exposures,
        last_film_handout_time_left: profile.last_film_handout_time_left,
        countdowns: Countdowns::for_profile(&profile, now_ms()),
    })
}

/// POST /users/name - Change the display name.
pub async fn rename(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ApiJson(request): ApiJson<RenameRequest>,
) -> ApiResult<Value> {
    let name = request.name.trim();
    if name.is_empty() {
        return Err(AppError::Validation("Name is required".to_string()));
    }

    require_profile(&state, &auth.user).await?;

    if state.repo.name_taken_by_other(name, &auth.user.id).await? {
        return Err(AppError::Conflict("Name already taken".to_string()));
    }

    state.repo.update_name(&auth.user.id, name).await?;
    success(json!({}))
}

/// POST /users/consume/photo - Spend film exposures.
pub async fn consume_photo(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ApiJson(request): ApiJson<ConsumePhotoRequest>,
) -> ApiResult<ConsumePhotoResponse> {
    request.validate().map_err(AppError::Validation)?;

    let profile = state
        .repo
        .consume_photos(&auth.user.id, request.amount)
        .await?
        .ok_or_else(|| AppError::ProfileMissing("No user found".to_string()))?;

    success(ConsumePhotoResponse {
        num_exposures: profile.num_exposures,
        last_film_handout_time_left: profile.last_film_handout_time_left,
        countdowns: Countdowns::for_profile(&profile, now_ms()),
    })
}

/// POST /users/purchase - Buy a time-boxed boost.
///
/// The reported balance is the one before the purchase; the client
/// subtracts the cost itself.
pub async fn purchase_boost(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ApiJson(request): ApiJson<PurchaseRequest>,
) -> ApiResult<BoostResponse> {
    let product = find_boost_product(&request.product_id)
        .ok_or_else(|| AppError::NotFound(format!("No package found: {}", request.product_id)))?;
    let profile = require_profile(&state, &auth.user).await?;

    let now = now_ms();
    let updated = state.repo.purchase_boost(&profile.id, product, now).await?;

    tracing::info!(
        user_id = %auth.user.id,
        product_id = product.id,
        cost = product.cost,
        coins = updated.coins,
        "Boost purchased"
    );

    success(BoostResponse {
        coins: profile.coins,
        photos_unlimited: json!(product.photos),
        last_film_handout_time_left: updated.last_film_handout_time_left,
        countdowns: Countdowns::for_profile(&updated, now),
    })
}

/// POST /users/relocate - Move the radar to another airport.
pub async fn relocate(
    State(state): State<AppState>,
    Extension(auth): Extension<AuthUser>,
    ApiJson(request): ApiJson<RelocateRequest>,
) -> ApiResult<BoostResponse> {
    request.validate().map_err(AppError::Validation)?;
    let profile = require_profile(&state, &auth.user).await?;

    let now = now_ms();
    let updated = state
        .repo
        .relocate(
            &profile.id,
            request.destination_id,
            request.cost,
            RELOCATION_DURATION_SECS,
            now,
        )
        .await?;

    tracing::info!(
        user_id = %auth.user.id,
        destination = request.destination.as_deref().unwrap_or(""),
        destination_id = request.destination_id,
        cost = request.cost,
        coins = updated.coins,
        "Relocated"
    );

    success(BoostResponse {
        coins: updated.coins,
        photos_unlimited: json!(updated.unlimited_photos_expiry_time > now),
        last_film_handout_time_left: updated.last_film_handout_time_left,
        countdowns: Countdowns::for_profile(&updated, now),
    })
}
