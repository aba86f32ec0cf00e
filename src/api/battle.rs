//! Weekly battle rules.

use axum::extract::Path;
use serde::Serialize;

use super::{success, ApiResult};
use crate::errors::AppError;

/// Which cards may enter a battle.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
pub struct RulePredicate {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub manufacturer: Option<&'static str>,
}

/// The rule in force for one ISO week.
#[derive(Debug, Clone, Copy, Serialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct BattleRule {
    /// Year and ISO week number, e.g. `202518`
    pub iso_year_week: u32,
    pub name: &'static str,
    pub description: &'static str,
    pub predicate: RulePredicate,
}

pub const BATTLE_RULES: &[BattleRule] = &[BattleRule {
    iso_year_week: 202518,
    name: "Boom week",
    description: "Manifacturer is BOOM",
    predicate: RulePredicate {
        manufacturer: Some("BOOM"),
    },
}];

pub fn find_battle_rule(iso_year_week: u32) -> Option<&'static BattleRule> {
    BATTLE_RULES.iter().find(|r| r.iso_year_week == iso_year_week)
}

/// GET /battle/rules/{isoYearWeek} - The rule of a week.
pub async fn get_battle_rules(Path(week): Path<String>) -> ApiResult<BattleRule> {
    let iso_year_week: u32 = week
        .parse()
        .map_err(|_| AppError::Validation(format!("Invalid ISO year-week: {}", week)))?;

    let rule = find_battle_rule(iso_year_week)
        .ok_or_else(|| AppError::NotFound(format!("No battle rules for week {}", iso_year_week)))?;
    success(*rule)
}
