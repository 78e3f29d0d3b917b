//! Append-only wallet ledger entry.

use crate::domain::{Currency, Decimal, TimeMs, UserId};
use serde::{Deserialize, Serialize};

/// One immutable signed monetary movement attributed to a user.
///
/// Negative amounts are withdrawals, positive amounts are credits.
/// Entries are never mutated or deleted after creation.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct LedgerEntry {
    /// Stable unique identifier for this entry.
    ///
    /// Priority: `<type>:<source-ref>` (if a source reference such as a
    /// withdrawal request id or click id is present) > hash of
    /// deterministic fields.
    pub event_key: String,
    /// Owner of the movement.
    pub user_id: UserId,
    /// Signed major-unit amount.
    pub amount: Decimal,
    /// ISO currency code.
    pub currency: Currency,
    /// Movement category.
    pub entry_type: EntryType,
    /// Settlement status of the movement.
    pub status: EntryStatus,
    /// Free-form annotation ("payout", merchant name, ...).
    pub note: String,
    /// Creation time.
    pub created_at: TimeMs,
}

impl LedgerEntry {
    /// Create a new entry and compute its `event_key`.
    ///
    /// `source_ref` should be the upstream identifier that makes this
    /// movement unique (withdrawal request id, click id). When absent the
    /// key falls back to a hash of the deterministic fields.
    #[allow(clippy::too_many_arguments)]
    pub fn new(
        user_id: UserId,
        amount: Decimal,
        currency: Currency,
        entry_type: EntryType,
        status: EntryStatus,
        note: String,
        created_at: TimeMs,
        source_ref: Option<&str>,
    ) -> Self {
        let event_key =
            Self::compute_event_key(entry_type, source_ref, &user_id, &amount, created_at);
        Self {
            event_key,
            user_id,
            amount,
            currency,
            entry_type,
            status,
            note,
            created_at,
        }
    }

    /// Compute a stable unique key for this entry.
    ///
    /// A key derived from the upstream reference makes the append idempotent
    /// under redelivery; the hash fallback truncates SHA-256 to 128 bits,
    /// ample collision resistance for per-user entry counts.
    pub fn compute_event_key(
        entry_type: EntryType,
        source_ref: Option<&str>,
        user_id: &UserId,
        amount: &Decimal,
        created_at: TimeMs,
    ) -> String {
        if let Some(r) = source_ref.map(str::trim).filter(|s| !s.is_empty()) {
            return format!("{}:{}", entry_type.as_str(), r);
        }

        use sha2::{Digest, Sha256};

        fn hash_var(hasher: &mut Sha256, data: &str) {
            hasher.update((data.len() as u32).to_le_bytes());
            hasher.update(data.as_bytes());
        }

        let mut hasher = Sha256::new();
        hash_var(&mut hasher, entry_type.as_str());
        hash_var(&mut hasher, user_id.as_str());
        hash_var(&mut hasher, &amount.to_canonical_string());
        hasher.update(created_at.as_ms().to_le_bytes());

        let hash = hasher.finalize();
        format!("hash:{}", hex::encode(&hash[..16]))
    }
}

/// Ledger movement category.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryType {
    /// Funds paid out to the user's external account (negative amount).
    Withdrawal,
    /// Affiliate commission credited to the user (positive amount).
    Commission,
    /// Funds deposited into the wallet (positive amount).
    Deposit,
}

impl EntryType {
    /// Stable string form used in persistence.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryType::Withdrawal => "withdrawal",
            EntryType::Commission => "commission",
            EntryType::Deposit => "deposit",
        }
    }
}

impl std::fmt::Display for EntryType {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

impl std::str::FromStr for EntryType {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "withdrawal" => Ok(EntryType::Withdrawal),
            "commission" => Ok(EntryType::Commission),
            "deposit" => Ok(EntryType::Deposit),
            other => Err(format!("unknown ledger entry type: {}", other)),
        }
    }
}

/// Settlement status of a ledger movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum EntryStatus {
    /// The movement has settled.
    Confirmed,
}

impl EntryStatus {
    /// Stable string form used in persistence.
    pub fn as_str(&self) -> &'static str {
        match self {
            EntryStatus::Confirmed => "confirmed",
        }
    }
}

impl std::str::FromStr for EntryStatus {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "confirmed" => Ok(EntryStatus::Confirmed),
            other => Err(format!("unknown ledger entry status: {}", other)),
        }
    }
}
