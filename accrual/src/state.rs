//! Per-holder accrual state and the growth formula.

use accrue_types::{mul_div, Timestamp, PRECISION};
use serde::{Deserialize, Serialize};

/// Accrual state for a single holder.
///
/// Lightweight: only the locked-in rate and the last settlement time. The
/// principal itself lives in the token substrate.
///
/// A holder that was never settled reads as the default record: rate zero,
/// synced at [`Timestamp::EPOCH`].
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolderRecord {
    /// Protocol rate captured when this holder's rate was last assigned.
    pub locked_rate: u128,
    /// When accrued interest was last materialized into principal.
    pub last_synced: Timestamp,
}

impl HolderRecord {
    pub fn new(locked_rate: u128, last_synced: Timestamp) -> Self {
        Self {
            locked_rate,
            last_synced,
        }
    }

    /// Growth multiplier since the last sync: `PRECISION + rate × elapsed`.
    ///
    /// `None` on overflow.
    pub fn growth_factor_checked(&self, now: Timestamp) -> Option<u128> {
        let elapsed = self.last_synced.elapsed_since(now) as u128;
        self.locked_rate
            .checked_mul(elapsed)?
            .checked_add(PRECISION)
    }

    /// Balance of a holder with stored `principal` at `now`, including interest
    /// accrued since the last sync. Truncates toward zero.
    ///
    /// `None` on overflow.
    pub fn accrued_balance_checked(&self, principal: u128, now: Timestamp) -> Option<u128> {
        if principal == 0 {
            return Some(0);
        }
        let factor = self.growth_factor_checked(now)?;
        mul_div(principal, factor, PRECISION)
    }
}
