//! Data models for the OpenCards backend.
//!
//! Serialized field names are camelCase to match what the mobile client sends and reads.

mod card;
mod item;
mod mission;
mod progress;
mod user;

pub use card::*;
pub use item::*;
pub use mission::*;
pub use progress::*;
pub use user::*;

/// Upper bound for client-supplied costs, amounts and coin credits.
pub const MAX_CLIENT_AMOUNT: i64 = 1_000_000;

/// Upper bound for the XP of a single capture.
pub const MAX_CAPTURE_XP: i64 = 1_000_000;
