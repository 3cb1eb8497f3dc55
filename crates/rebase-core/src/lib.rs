//! Rebase core
//!
//! Types shared by the ledger, the custody vault and the cross-domain
//! gateway: holder identities, fixed-point interest rates, amount
//! arguments, clocks and configuration.

pub mod error;
pub mod types;
pub mod clock;
pub mod config;

pub use clock::{Clock, ManualClock, SystemClock};
pub use config::{LedgerConfig, RebaseConfig};
pub use error::CoreError;
pub use types::{AccountId, Amount, DomainId, InterestRate};
