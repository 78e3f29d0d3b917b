//! Withdrawal request type and its terminal-state lifecycle.

use crate::domain::{Currency, Decimal, TimeMs, UserId};
use serde::{Deserialize, Serialize};

/// A user's request to withdraw accrued cashback to an external account.
///
/// Created in `Pending` by the approval workflow; moves to `Paid` or
/// `Failed` exactly once, driven by the `approve_payout` false→true edge,
/// and is terminal thereafter.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WithdrawRequest {
    /// Opaque request identifier.
    pub id: String,
    /// Owner of the request.
    pub user_id: UserId,
    /// Positive major-unit amount to pay out.
    pub amount: Decimal,
    /// ISO currency code; platform default is AUD.
    #[serde(default)]
    pub currency: Currency,
    /// Destination account reference at the transfer provider.
    pub stripe_account_id: String,
    /// Approval flag set by an approver; the false→true edge authorizes payout.
    #[serde(default)]
    pub approve_payout: bool,
    /// Lifecycle status.
    #[serde(default)]
    pub status: WithdrawStatus,
    /// Provider transfer id, set once paid. Non-empty implies no further
    /// transfer is ever issued for this request.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub transfer_id: Option<String>,
    /// Failure reason, set once failed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reason: Option<String>,
    /// Time the payout was committed.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub paid_at: Option<TimeMs>,
}

impl WithdrawRequest {
    /// Returns true if a provider transfer id is already recorded.
    pub fn has_transfer_id(&self) -> bool {
        self.transfer_id
            .as_deref()
            .map(|t| !t.trim().is_empty())
            .unwrap_or(false)
    }
}

/// Withdrawal lifecycle status.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum WithdrawStatus {
    /// Awaiting approval and payout.
    #[default]
    Pending,
    /// Transfer issued and committed; terminal.
    Paid,
    /// Validation or transfer failure recorded; terminal.
    Failed,
}

impl WithdrawStatus {
    /// Stable string form used in persistence.
    pub fn as_str(&self) -> &'static str {
        match self {
            WithdrawStatus::Pending => "pending",
            WithdrawStatus::Paid => "paid",
            WithdrawStatus::Failed => "failed",
        }
    }

    /// Returns true for `Paid` and `Failed`.
    pub fn is_terminal(&self) -> bool {
        !matches!(self, WithdrawStatus::Pending)
    }
}

impl std::fmt::Display for WithdrawStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for WithdrawStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "pending" => Ok(WithdrawStatus::Pending),
            "paid" => Ok(WithdrawStatus::Paid),
            "failed" => Ok(WithdrawStatus::Failed),
            other => Err(format!("unknown withdraw status: {}", other)),
        }
    }
}
