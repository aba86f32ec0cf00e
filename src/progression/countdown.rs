//! Seconds-remaining helpers for time-boxed boosts.

use crate::models::{Countdowns, Profile};

/// Seconds left until `expiry_ms`, floored at zero.
pub fn time_left_secs(expiry_ms: i64, now_ms: i64) -> f64 {
    expiry_ms.saturating_sub(now_ms).max(0) as f64 / 1000.0
}

impl Countdowns {
    /// Countdowns for a profile as of `now_ms`.
    pub fn for_profile(profile: &Profile, now_ms: i64) -> Self {
        Self {
            unlimited_photos_time_left: time_left_secs(profile.unlimited_photos_expiry_time, now_ms),
            radar_expand_time_left: time_left_secs(profile.radar_expand_expiry_time, now_ms),
            relocation_time_left: time_left_secs(profile.relocation_expiry_time, now_ms),
        }
    }
}
