//! Card and capture models.

use serde::{Deserialize, Serialize};

use super::{MAX_CAPTURE_XP, MAX_CLIENT_AMOUNT};

/// Card finish, derived from the card's total XP.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Paper,
    Silver,
    Gold,
}

impl Tier {
    pub fn as_str(&self) -> &'static str {
        match self {
            Tier::Paper => "paper",
            Tier::Silver => "silver",
            Tier::Gold => "gold",
        }
    }
}

/// One sighting event. Immutable once stored.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Capture {
    pub id: String,
    pub card_id: String,
    pub lat: f64,
    pub lon: f64,
    pub alt: f64,
    pub speed: f64,
    pub destination: Option<String>,
    pub destination_id: Option<i64>,
    pub origin: Option<String>,
    pub origin_id: Option<i64>,
    pub flight: Option<String>,
    pub reg: String,
    pub callsign: String,
    pub gps_lat: f64,
    pub gps_lon: f64,
    pub distance: f64,
    pub radar_lat: f64,
    pub radar_lon: f64,
    pub radar_range: f64,
    pub associated_airport_id: i64,
    pub flight_id: i64,
    pub track: f64,
    pub icon: i64,
    pub status: i64,
    pub timestamp: i64,
    pub on_ground: bool,
    pub source: i64,
    pub model: String,
    pub xp: i64,
    pub xp_user_bonus: i64,
    pub coverage: i64,
    pub cloudiness: i64,
    pub image_large: Option<String>,
    pub image_thumb: Option<String>,
    pub image_copy: Option<String>,
    pub glow: bool,
}

/// A stored card row: one per (user, aircraft model).
#[derive(Debug, Clone)]
pub struct CardRow {
    pub id: String,
    pub user_id: String,
    pub aircraft_id: String,
}

/// A card decorated with the aggregate of its captures.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Card {
    pub id: String,
    pub user_id: String,
    pub aircraft_id: String,
    pub tier: Tier,
    pub cloudiness: f64,
    pub coverage: f64,
    pub glow: bool,
    pub glow_count: usize,
    pub xp: i64,
    pub captures: Vec<Capture>,
}

/// Request body for `POST /captures/3`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct CaptureRequest {
    pub lat: f64,
    pub lon: f64,
    pub alt: f64,
    pub speed: f64,
    pub reg: String,
    pub callsign: String,
    pub gps_lat: f64,
    pub gps_lon: f64,
    pub distance: f64,
    pub radar_lat: f64,
    pub radar_lon: f64,
    pub radar_range: f64,
    pub associated_airport_id: i64,
    pub flight_id: i64,
    pub track: f64,
    pub icon: i64,
    pub status: i64,
    pub timestamp: i64,
    pub on_ground: bool,
    pub source: i64,
    pub model: String,
    pub xp: i64,
    #[serde(default)]
    pub xp_user_bonus: i64,
    pub coverage: i64,
    pub cloudiness: i64,
    #[serde(default)]
    pub image_large: Option<String>,
    #[serde(default)]
    pub image_thumb: Option<String>,
    #[serde(default)]
    pub image_copy: Option<String>,
    #[serde(default)]
    pub glow: bool,
    /// Coins the client credited locally for this capture
    #[serde(default)]
    pub coins: i64,
}

impl CaptureRequest {
    /// Check the fields the server relies on.
    pub fn validate(&self) -> Result<(), String> {
        if self.model.trim().is_empty() {
            return Err("Aircraft model is required".to_string());
        }
        if self.reg.trim().is_empty() {
            return Err("Registration is required".to_string());
        }
        if !(0..=100).contains(&self.coverage) {
            return Err("Coverage must be between 0 and 100".to_string());
        }
        if !(0..=100).contains(&self.cloudiness) {
            return Err("Cloudiness must be between 0 and 100".to_string());
        }
        if !(0..=MAX_CAPTURE_XP).contains(&self.xp)
            || !(0..=MAX_CAPTURE_XP).contains(&self.xp_user_bonus)
        {
            return Err(format!("XP must be between 0 and {}", MAX_CAPTURE_XP));
        }
        if !(0..=MAX_CLIENT_AMOUNT).contains(&self.coins) {
            return Err(format!("Coins must be between 0 and {}", MAX_CLIENT_AMOUNT));
        }
        Ok(())
    }
}

/// Card summary returned from a capture submission.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CardSummary {
    pub id: String,
    pub model_id: String,
    pub aircraft_id: String,
    pub coverage: f64,
    pub cloudiness: f64,
    pub xp: i64,
    pub glow: bool,
    pub tier: Tier,
    pub glow_count: usize,
}
