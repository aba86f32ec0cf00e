//! Fixed product catalogs.

use serde::Serialize;

use crate::models::ItemType;

/// A purchasable bundle of consumable items.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct ItemProduct {
    pub id: &'static str,
    pub item_type: ItemType,
    pub amount: u32,
    pub cost: i64,
}

/// Every item bundle on sale.
pub const ITEM_PRODUCTS: &[ItemProduct] = &[
    ItemProduct {
        id: "item_catch_anywhere_1",
        item_type: ItemType::CatchAnywhere,
        amount: 1,
        cost: 200,
    },
    ItemProduct {
        id: "item_catch_anywhere_2",
        item_type: ItemType::CatchAnywhere,
        amount: 3,
        cost: 400,
    },
    ItemProduct {
        id: "item_catch_anywhere_3",
        item_type: ItemType::CatchAnywhere,
        amount: 5,
        cost: 600,
    },
    ItemProduct {
        id: "item_catch_again_1",
        item_type: ItemType::CatchAgain,
        amount: 1,
        cost: 50,
    },
    ItemProduct {
        id: "item_catch_again_2",
        item_type: ItemType::CatchAgain,
        amount: 3,
        cost: 100,
    },
    ItemProduct {
        id: "item_catch_again_3",
        item_type: ItemType::CatchAgain,
        amount: 5,
        cost: 125,
    },
    ItemProduct {
        id: "item_cameras_stabilizer_1",
        item_type: ItemType::CameraStabilizer,
        amount: 1,
        cost: 25,
    },
    ItemProduct {
        id: "item_cameras_stabilizer_2",
        item_type: ItemType::CameraStabilizer,
        amount: 3,
        cost: 65,
    },
    ItemProduct {
        id: "item_cameras_stabilizer_3",
        item_type: ItemType::CameraStabilizer,
        amount: 10,
        cost: 200,
    },
];

/// Item types the shop currently offers, as shown by `GET /items`.
pub const AVAILABLE_ITEMS: &[(ItemType, u32)] = &[
    (ItemType::CatchAnywhere, 0),
    (ItemType::CatchAgain, 1),
    (ItemType::CameraStabilizer, 0),
    (ItemType::TravelFree, 1),
    (ItemType::TravelAnywhere, 1),
];

/// Which expiry a boost extends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BoostKind {
    UnlimitedPhotos,
    RadarExpand,
}

/// A purchasable time-boxed boost.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct BoostProduct {
    pub id: &'static str,
    pub kind: BoostKind,
    pub cost: i64,
    /// Film exposures granted on top of the boost
    pub photos: i64,
    pub duration_secs: i64,
}

/// Every boost on sale.
pub const BOOST_PRODUCTS: &[BoostProduct] = &[
    BoostProduct {
        id: "photos_unlimited_1",
        kind: BoostKind::UnlimitedPhotos,
        cost: 75,
        photos: 0,
        duration_secs: 30 * 60,
    },
    BoostProduct {
        id: "photos_unlimited_2",
        kind: BoostKind::UnlimitedPhotos,
        cost: 150,
        photos: 0,
        duration_secs: 2 * 60 * 60,
    },
    BoostProduct {
        id: "photos_5",
        kind: BoostKind::UnlimitedPhotos,
        cost: 10,
        photos: 0,
        duration_secs: 5 * 60,
    },
    BoostProduct {
        id: "radar_expand_1",
        kind: BoostKind::RadarExpand,
        cost: 50,
        photos: 0,
        duration_secs: 30 * 60,
    },
];

/// How long a relocation stays active.
pub const RELOCATION_DURATION_SECS: i64 = 30 * 60;

pub fn find_item_product(product_id: &str) -> Option<&'static ItemProduct> {
    ITEM_PRODUCTS.iter().find(|p| p.id == product_id)
}

pub fn find_boost_product(product_id: &str) -> Option<&'static BoostProduct> {
    BOOST_PRODUCTS.iter().find(|p| p.id == product_id)
}
