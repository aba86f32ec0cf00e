//! Player progression: card aggregation and progress snapshots.
//!
//! Captures are the only source of truth for XP. Everything derived from them
//! (card tier, card XP, player XP) is recomputed on every read.

mod aggregate;
mod assemble;
mod countdown;

pub use assemble::*;

use crate::db::Repository;
use crate::errors::AppError;
use crate::models::ProgressSnapshot;

/// Load and assemble the full snapshot for an account.
pub async fn load_snapshot(
    repo: &Repository,
    user_id: &str,
    now_ms: i64,
) -> Result<ProgressSnapshot, AppError> {
    let sources = repo
        .load_progress_sources(user_id)
        .await?
        .ok_or_else(|| AppError::NotFound(format!("No progress found for user {}", user_id)))?;

    Ok(assemble(sources, now_ms))
}

/// Current wall-clock time in epoch milliseconds.
pub fn now_ms() -> i64 {
    chrono::Utc::now().timestamp_millis()
}
