//! Missions, achievements and other read-mostly collections.

use serde::Serialize;

/// Progress towards one achievement.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Achievement {
    pub id: String,
    pub progress_numerator: i64,
    pub is_achieved: bool,
}

/// A mission group (daily, weekly, ...) with its entries.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Mission {
    pub id: i64,
    #[serde(rename = "type")]
    pub mission_type: String,
    pub unclaimed: i64,
    pub unfinished: i64,
    pub data: Vec<MissionData>,
}

/// A stored mission row, before its entries are attached.
#[derive(Debug, Clone)]
pub struct MissionRow {
    pub id: i64,
    pub mission_type: String,
    pub unclaimed: i64,
    pub unfinished: i64,
}

/// One entry of a mission.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct MissionData {
    pub id: i64,
    #[serde(skip)]
    pub mission_id: i64,
    pub key: String,
    pub title: String,
    pub award: i64,
    #[serde(rename = "type")]
    pub data_type: String,
    pub timestamp: i64,
    pub claimed: bool,
    pub percentage: i64,
    pub length: i64,
}
