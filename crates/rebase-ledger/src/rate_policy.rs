//! Global rate policy and the rate inheritance rule.
//!
//! The global rate is the rate offered to new deposits. It starts at the
//! configured value and every update must strictly lower it; holders who
//! already locked a rate keep it.

use rebase_core::InterestRate;
use serde::{Deserialize, Serialize};

use crate::error::LedgerError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct RatePolicy {
    global_rate: InterestRate,
}

impl RatePolicy {
    pub fn new(initial: InterestRate) -> Self {
        Self {
            global_rate: initial,
        }
    }

    pub fn global_rate(&self) -> InterestRate {
        self.global_rate
    }

    /// Check that `requested` is strictly below the current rate.
    pub fn check_decrease(&self, requested: InterestRate) -> Result<(), LedgerError> {
        if requested >= self.global_rate {
            return Err(LedgerError::RateCanOnlyDecrease {
                current: self.global_rate,
                requested,
            });
        }
        Ok(())
    }

    /// Lower the global rate, returning the previous one.
    pub fn decrease_to(&mut self, requested: InterestRate) -> Result<InterestRate, LedgerError> {
        self.check_decrease(requested)?;
        let old = self.global_rate;
        self.global_rate = requested;
        Ok(old)
    }
}

/// Rate a transfer recipient ends up with.
///
/// A recipient inherits the sender's locked rate only when their settled
/// balance is exactly zero and the transfer moves a positive amount, so a
/// dust transfer can never downgrade an existing holder.
pub fn inherited_rate(
    recipient_balance: u128,
    amount: u128,
    recipient_rate: InterestRate,
    sender_rate: InterestRate,
) -> InterestRate {
    if recipient_balance == 0 && amount > 0 {
        sender_rate
    } else {
        recipient_rate
    }
}
