//! Pure computation engines: commission share, tracking-link synthesis,
//! login streak derivation.
//!
//! Nothing here performs I/O or fails on well-typed input; callers validate
//! input and persist results.

pub mod commission;
pub mod streak;
pub mod tracking;

pub use commission::commission;
pub use streak::{calculate_streak, StreakResult};
pub use tracking::generate_tracking_link;
