//! Orchestration: the payout state machine and commission crediting.

pub mod credit;
pub mod payout;

pub use credit::{CommissionCrediter, CreditError, CreditOutcome};
pub use payout::{approval_edge, PayoutError, PayoutOutcome, PayoutPipeline};
