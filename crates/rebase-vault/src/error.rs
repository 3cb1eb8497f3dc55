use rebase_ledger::LedgerError;

/// Custody vault errors.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum VaultError {
    #[error("amount must be greater than zero")]
    ZeroAmount,

    #[error("insufficient reserves: available {available}, required {required}")]
    InsufficientReserves { available: u128, required: u128 },

    #[error("reserve overflow")]
    ReserveOverflow,

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}
