//! Account and profile models.

use serde::{Deserialize, Serialize};

use super::MAX_CLIENT_AMOUNT;

/// Avatar descriptor handed to every new player.
pub const DEFAULT_AVATAR: &str = "0,0,0,0,0,0,0,0,0,12:#FAD5B5,#FAD5B5";

/// Display name handed to every new player.
pub const DEFAULT_NAME: &str = "User";

/// Film exposures handed to every new player.
pub const DEFAULT_EXPOSURES: i64 = 5;

/// A registered account. Never serialized to clients as-is.
#[derive(Debug, Clone)]
pub struct User {
    pub id: String,
    pub email: String,
    pub hashed_password: String,
    pub token: String,
}

/// The per-user progress row ("user data").
///
/// Timestamps are Unix epoch milliseconds. Counters such as `xp` and
/// `num_aircraft_models` are stored but recomputed whenever a snapshot is
/// assembled.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Profile {
    pub id: String,
    pub user_id: String,
    pub name: String,
    pub email: String,
    pub messaging_token: Option<String>,
    pub xp: i64,
    pub num_exposures: i64,
    pub last_film_handout: i64,
    pub last_film_handout_time_left: i64,
    pub coins: i64,
    pub last_capture: i64,
    pub battle_onboarding_completed: bool,
    pub username_completed: bool,
    pub radar_expand_expiry_time: i64,
    pub unlimited_photos_expiry_time: i64,
    pub relocation_airport_id: Option<i64>,
    pub relocation_airport: i64,
    pub relocation_timestamp: i64,
    pub relocation_expiry_time: i64,
    pub avatar: String,
    pub is_verified: bool,
    pub friend_code: String,
    pub num_aircraft_models: i64,
    pub num_destinations: i64,
    pub num_battle_wins: i64,
    pub num_achievements: i64,
    pub has_pending_friend_requests: bool,
}

/// Request body for `POST /users/create`.
#[derive(Debug, Clone, Deserialize)]
pub struct SignupRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `POST /users` (and the HTML login form).
#[derive(Debug, Clone, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub password: String,
}

/// Request body for `POST /users/name`.
#[derive(Debug, Clone, Deserialize)]
pub struct RenameRequest {
    pub name: String,
}

/// Request body for `PATCH /users`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MessagingTokenRequest {
    pub messaging_token: String,
}

/// Request body for `POST /users/consume/photo`.
#[derive(Debug, Clone, Deserialize)]
pub struct ConsumePhotoRequest {
    pub amount: i64,
}

impl ConsumePhotoRequest {
    pub fn validate(&self) -> Result<(), String> {
        if !(0..=MAX_CLIENT_AMOUNT).contains(&self.amount) {
            return Err(format!("Amount must be between 0 and {}", MAX_CLIENT_AMOUNT));
        }
        Ok(())
    }
}

/// Request body for `POST /users/relocate`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct RelocateRequest {
    /// Display name of the target airport
    #[serde(default)]
    pub destination: Option<String>,
    pub destination_id: i64,
    pub cost: i64,
}

impl RelocateRequest {
    pub fn validate(&self) -> Result<(), String> {
        if !(0..=MAX_CLIENT_AMOUNT).contains(&self.cost) {
            return Err(format!("Cost must be between 0 and {}", MAX_CLIENT_AMOUNT));
        }
        Ok(())
    }
}
