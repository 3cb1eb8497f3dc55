//! Rebase Ledger
//!
//! Interest-accruing balance ledger. Each holder's balance grows linearly
//! at the rate locked in at their last qualifying mint or transfer-in,
//! while the global rate offered to new deposits can only go down.
//! Interest is settled lazily: it is written into principal only when a
//! state-changing call touches the holder.

pub mod error;
pub mod math;
pub mod account;
pub mod access;
pub mod rate_policy;
pub mod events;
pub mod snapshot;
pub mod ledger;

pub use access::{AccessControl, Capability};
pub use account::HolderAccount;
pub use error::LedgerError;
pub use events::{EventRecord, LedgerEvent};
pub use ledger::RebaseLedger;
pub use rate_policy::RatePolicy;
pub use snapshot::LedgerSnapshot;
