use rebase_core::types::u128_string;
use rebase_core::InterestRate;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;
use crate::math;

/// Stored state of one holder.
///
/// Accounts are created on first touch and never removed. A holder burned
/// down to zero keeps a stale rate and timestamp until the next mint or
/// transfer-in reassigns them.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct HolderAccount {
    /// Tokens actually issued, excluding unsettled interest.
    #[serde(with = "u128_string")]
    pub principal: u128,
    /// Rate assigned at the last qualifying mint or transfer-in.
    pub locked_rate: InterestRate,
    /// Unix seconds of the last settlement.
    pub last_settlement: u64,
}

impl HolderAccount {
    /// Seconds of accrual pending at `now`. A clock reading earlier than the
    /// last settlement accrues nothing.
    pub fn elapsed(&self, now: u64) -> u64 {
        now.saturating_sub(self.last_settlement)
    }

    /// Principal plus interest accrued since the last settlement.
    pub fn accrued(&self, now: u64, scale: u128) -> Result<u128, LedgerError> {
        math::accrued_balance(
            self.principal,
            self.locked_rate.raw(),
            self.elapsed(now),
            scale,
        )
    }

    /// Interest pending at `now`.
    pub fn pending_interest(&self, now: u64, scale: u128) -> Result<u128, LedgerError> {
        Ok(self.accrued(now, scale)? - self.principal)
    }
}
