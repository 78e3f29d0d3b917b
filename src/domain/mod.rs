//! Domain types for the cashback reward ledger and payout pipeline.
//!
//! This module provides:
//! - Lossless monetary handling via the Decimal wrapper
//! - Domain primitives: TimeMs, UserId, Currency
//! - WithdrawRequest and its terminal-state lifecycle
//! - Append-only LedgerEntry with stable event keys
//! - Merchant and user-profile reference data

pub mod decimal;
pub mod ledger;
pub mod merchant;
pub mod primitives;
pub mod user;
pub mod withdrawal;

pub use decimal::Decimal;
pub use ledger::{EntryStatus, EntryType, LedgerEntry};
pub use merchant::{AffiliateNetwork, Click, Merchant};
pub use primitives::{Currency, TimeMs, UserId};
pub use user::{PlanTier, UserProfile};
pub use withdrawal::{WithdrawRequest, WithdrawStatus};
