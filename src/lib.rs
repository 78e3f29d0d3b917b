pub mod api;
pub mod config;
pub mod db;
pub mod domain;
pub mod engine;
pub mod error;
pub mod notify;
pub mod orchestration;
pub mod transfer;

pub use config::Config;
pub use db::{init_db, Repository};
pub use domain::{
    Currency, Decimal, EntryStatus, EntryType, LedgerEntry, Merchant, PlanTier, TimeMs, UserId,
    UserProfile, WithdrawRequest, WithdrawStatus,
};
pub use error::AppError;
pub use notify::{LogNotifier, MockNotifier, NotificationDispatcher};
pub use orchestration::{CommissionCrediter, PayoutOutcome, PayoutPipeline};
pub use transfer::{MockTransferProvider, StripeTransferProvider, TransferProvider};
