//! In-game economy: catalogs and the balance rules applied by purchases and captures.
//!
//! Balance writes are relative (`coins = coins - cost`) and each operation runs
//! in one transaction, so concurrent requests for the same player do not lose
//! updates. Balances may go negative; there is no floor check.

mod catalog;

pub use catalog::*;

use std::collections::BTreeMap;

use crate::models::ItemType;

/// Coins earned by one capture: one per perfect condition, not compounded.
pub fn capture_reward(coverage: i64, cloudiness: i64) -> i64 {
    i64::from(coverage == 100) + i64::from(cloudiness == 100)
}

/// Expiry timestamp of a boost bought at `now_ms`.
pub fn boost_expiry(now_ms: i64, duration_secs: i64) -> i64 {
    now_ms + duration_secs * 1000
}

/// Item counts granted by a purchase, with zero entries for the other
/// purchasable types so the client can merge them blindly.
pub fn granted_items(product: &ItemProduct) -> BTreeMap<ItemType, u32> {
    let mut granted: BTreeMap<ItemType, u32> = ITEM_PRODUCTS
        .iter()
        .map(|p| (p.item_type, 0))
        .collect();
    granted.insert(product.item_type, product.amount);
    granted
}
