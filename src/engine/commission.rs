//! User commission share calculation.

use crate::domain::{Decimal, PlanTier};
use rust_decimal::Decimal as RustDecimal;

/// Fraction of a raw network commission paid to a Pro-tier user.
const PRO_RATE: RustDecimal = RustDecimal::from_parts(50, 0, 0, false, 2);
/// Fraction paid to a free-tier user.
const FREE_RATE: RustDecimal = RustDecimal::from_parts(15, 0, 0, false, 2);

/// Commission owed to a user from a raw affiliate commission amount.
///
/// `floor(amount * rate)` with rate 0.50 for Pro and 0.15 for Free.
/// Flooring truncates toward zero so a fractional unit is never credited
/// beyond what was earned. The caller rejects negative amounts before
/// invoking this.
pub fn commission(amount: Decimal, plan: PlanTier) -> Decimal {
    let rate = match plan {
        PlanTier::Pro => PRO_RATE,
        PlanTier::Free => FREE_RATE,
    };
    Decimal::new(amount.inner() * rate).floor()
}
