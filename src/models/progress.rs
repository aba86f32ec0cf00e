//! The full user-progress snapshot returned to clients.

use serde::Serialize;

use super::{
    Achievement, Capture, Card, CardRow, Item, Mission, MissionData, MissionRow, Profile,
};

/// Active relocation target.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Relocation {
    pub airport_id: Option<i64>,
    pub airport: i64,
    pub timestamp: i64,
}

/// Seconds remaining on each time-boxed boost, never negative.
#[derive(Debug, Clone, Copy, Serialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Countdowns {
    pub unlimited_photos_time_left: f64,
    pub radar_expand_time_left: f64,
    pub relocation_time_left: f64,
}

/// Everything the client knows about a player.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSnapshot {
    #[serde(flatten)]
    pub profile: Profile,
    pub cards: Vec<Card>,
    pub items: Vec<Item>,
    pub achievements: Vec<Achievement>,
    pub missions: Vec<Mission>,
    pub friend_ids: Vec<String>,
    pub unlocked_model_ids: Vec<String>,
    pub battle_deck: Vec<String>,
    pub relocation: Relocation,
    #[serde(flatten)]
    pub countdowns: Countdowns,
}

/// Raw rows gathered for one player, ready to be assembled.
#[derive(Debug, Clone)]
pub struct ProgressSources {
    pub profile: Profile,
    pub cards: Vec<CardRow>,
    pub captures: Vec<Capture>,
    pub items: Vec<Item>,
    pub achievements: Vec<Achievement>,
    pub missions: Vec<MissionRow>,
    pub mission_data: Vec<MissionData>,
    pub friend_ids: Vec<String>,
    pub unlocked_model_ids: Vec<String>,
    pub battle_deck: Vec<String>,
}
