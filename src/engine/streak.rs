//! Consecutive-login streak derivation.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

/// Result of a streak recalculation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct StreakResult {
    /// The user's streak after this login.
    pub streak: u32,
    /// False only when a missed day reset the streak.
    pub active: bool,
}

/// Derive the next streak value from the previous login and streak count.
///
/// Distances are measured in calendar days (both timestamps normalized to
/// their date before differencing), not wall-clock hours. Any day that is
/// not today or yesterday breaks the streak, including a last login that
/// appears to be in the future (clock skew is treated as a break, not a
/// fault).
///
/// The caller reads prior state, invokes this, and persists
/// `{streak, last_login: now}`.
pub fn calculate_streak(
    last_login: Option<DateTime<Utc>>,
    current_streak: u32,
    now: DateTime<Utc>,
) -> StreakResult {
    let Some(last) = last_login else {
        // First-ever login.
        return StreakResult {
            streak: 1,
            active: true,
        };
    };

    let diff_days = now
        .date_naive()
        .signed_duration_since(last.date_naive())
        .num_days();

    match diff_days {
        0 => StreakResult {
            streak: current_streak.max(1),
            active: true,
        },
        1 => StreakResult {
            streak: current_streak + 1,
            active: true,
        },
        _ => StreakResult {
            streak: 1,
            active: false,
        },
    }
}
