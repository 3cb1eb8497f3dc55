use rebase_core::{AccountId, InterestRate};

use crate::access::Capability;

/// Ledger errors. Every variant aborts the operation before any state
/// is written.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum LedgerError {
    #[error("insufficient balance for {holder}: available {available}, requested {requested}")]
    InsufficientBalance {
        holder: AccountId,
        available: u128,
        requested: u128,
    },

    #[error("insufficient allowance for {spender} on {owner}: allowed {allowed}, requested {requested}")]
    InsufficientAllowance {
        owner: AccountId,
        spender: AccountId,
        allowed: u128,
        requested: u128,
    },

    #[error("interest rate can only decrease: current {current}, requested {requested}")]
    RateCanOnlyDecrease {
        current: InterestRate,
        requested: InterestRate,
    },

    #[error("{caller} lacks the {required} capability")]
    Unauthorized {
        caller: AccountId,
        required: Capability,
    },

    #[error("arithmetic overflow: {0}")]
    Overflow(&'static str),

    #[error("invalid ledger configuration: {0}")]
    InvalidConfig(String),
}
