//! Fixtures shared by the cross-crate scenarios in `tests/`.

use rebase_core::{AccountId, LedgerConfig, ManualClock};
use rebase_ledger::RebaseLedger;
use rebase_vault::Vault;
use std::sync::Arc;

/// Start time used by every scenario.
pub const START: u64 = 1_700_000_000;

pub fn id(name: &str) -> AccountId {
    AccountId::from(name)
}

/// One domain: a ledger with its vault and gateway identities authorized.
pub struct Domain {
    pub ledger: RebaseLedger,
    pub vault: Vault,
}

impl Domain {
    pub fn new(clock: Arc<ManualClock>) -> Self {
        let config = LedgerConfig::default();
        let owner = config.owner.clone();
        let mut ledger = RebaseLedger::new(&config, clock).expect("default config is valid");
        ledger
            .grant_mint_and_burn(&owner, id("vault"))
            .expect("owner can grant");
        ledger
            .grant_mint_and_burn(&owner, id("gateway"))
            .expect("owner can grant");
        Self {
            ledger,
            vault: Vault::new(id("vault")),
        }
    }

    /// Sum of every holder's accrued balance, computed holder by holder.
    pub fn summed_balances(&self) -> u128 {
        self.ledger
            .holders()
            .map(|h| self.ledger.balance_of(h).expect("balance fits"))
            .sum()
    }
}

pub fn clock() -> Arc<ManualClock> {
    Arc::new(ManualClock::new(START))
}
