//! Consumable item models.

use std::str::FromStr;

use serde::{Deserialize, Serialize};

/// Kinds of consumable items a player can own.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq, Eq, Hash, PartialOrd, Ord)]
#[serde(rename_all = "SCREAMING_SNAKE_CASE")]
pub enum ItemType {
    CatchAnywhere,
    CatchAgain,
    CameraStabilizer,
    TravelFree,
    TravelAnywhere,
}

impl ItemType {
    pub fn as_str(&self) -> &'static str {
        match self {
            ItemType::CatchAnywhere => "CATCH_ANYWHERE",
            ItemType::CatchAgain => "CATCH_AGAIN",
            ItemType::CameraStabilizer => "CAMERA_STABILIZER",
            ItemType::TravelFree => "TRAVEL_FREE",
            ItemType::TravelAnywhere => "TRAVEL_ANYWHERE",
        }
    }
}

impl FromStr for ItemType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "CATCH_ANYWHERE" => Ok(ItemType::CatchAnywhere),
            "CATCH_AGAIN" => Ok(ItemType::CatchAgain),
            "CAMERA_STABILIZER" => Ok(ItemType::CameraStabilizer),
            "TRAVEL_FREE" => Ok(ItemType::TravelFree),
            "TRAVEL_ANYWHERE" => Ok(ItemType::TravelAnywhere),
            other => Err(format!("Unknown item type: {}", other)),
        }
    }
}

/// One owned consumable.
#[derive(Debug, Clone, Serialize)]
pub struct Item {
    pub id: i64,
    #[serde(rename = "type")]
    pub item_type: ItemType,
}

/// Request body for `POST /items/purchase` and `POST /users/purchase`.
#[derive(Debug, Clone, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PurchaseRequest {
    pub product_id: String,
}
