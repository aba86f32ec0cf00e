//! Per-card aggregation over a capture set.

use crate::models::{Capture, Tier};

/// Total XP below which a card stays paper.
pub const SILVER_XP_THRESHOLD: i64 = 15_000;
/// Total XP below which a card stays silver.
pub const GOLD_XP_THRESHOLD: i64 = 50_000;

impl Tier {
    /// Tier bracket for a card's total XP.
    pub fn from_xp(xp: i64) -> Self {
        if xp < SILVER_XP_THRESHOLD {
            Tier::Paper
        } else if xp < GOLD_XP_THRESHOLD {
            Tier::Silver
        } else {
            Tier::Gold
        }
    }
}

/// Aggregate state of one card.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct CardStats {
    pub cloudiness: f64,
    pub coverage: f64,
    pub glow: bool,
    pub xp: i64,
}

impl CardStats {
    /// Aggregate an unordered capture set. An empty set yields all zeros.
    pub fn from_captures(captures: &[Capture]) -> Self {
        if captures.is_empty() {
            return Self::default();
        }

        let count = captures.len() as f64;
        let cloudiness: i64 = captures.iter().map(|c| c.cloudiness).sum();
        let coverage: i64 = captures.iter().map(|c| c.coverage).sum();

        Self {
            cloudiness: cloudiness as f64 / count,
            coverage: coverage as f64 / count,
            glow: captures.iter().any(|c| c.glow),
            xp: captures.iter().fold(0i64, |total, c| total.saturating_add(c.xp)),
        }
    }

    pub fn tier(&self) -> Tier {
        Tier::from_xp(self.xp)
    }
}

/// Number of glowing captures in the set.
pub fn glow_count(captures: &[Capture]) -> usize {
    captures.iter().filter(|c| c.glow).count()
}
