//! Rebase custody vault
//!
//! Holds deposited value and drives the ledger's privileged mint/burn:
//! deposits mint 1:1 at the current global rate, redemptions burn and pay
//! out the burned amount, accrued interest included.

pub mod error;
pub mod vault;

pub use error::VaultError;
pub use vault::{ReceiptKind, Vault, VaultReceipt, VaultState};
