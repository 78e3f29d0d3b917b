//! User profile fields owned by this service.

use crate::domain::{TimeMs, UserId};
use serde::{Deserialize, Serialize};

/// The slice of the user record this service reads and writes:
/// plan tier (commission rate), login streak state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct UserProfile {
    pub id: UserId,
    /// Subscription tier; determines the user's commission share.
    pub plan: PlanTier,
    /// Count of consecutive calendar days with at least one login.
    pub streak: u32,
    /// Time of the most recent session refresh.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub last_login: Option<TimeMs>,
}

/// Subscription tier.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PlanTier {
    #[default]
    Free,
    Pro,
}

impl PlanTier {
    /// Stable string form used in persistence.
    pub fn as_str(&self) -> &'static str {
        match self {
            PlanTier::Free => "free",
            PlanTier::Pro => "pro",
        }
    }
}

impl std::fmt::Display for PlanTier {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for PlanTier {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "free" => Ok(PlanTier::Free),
            "pro" => Ok(PlanTier::Pro),
            other => Err(format!("unknown plan tier: {}", other)),
        }
    }
}
