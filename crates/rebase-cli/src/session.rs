//! Load-apply-commit cycle shared by every state-changing command.

use anyhow::{Context, Result};
use rebase_core::{RebaseConfig, SystemClock};
use rebase_ledger::RebaseLedger;
use rebase_vault::Vault;
use std::sync::Arc;

use crate::storage::{PersistedState, Storage};

/// Ledger and vault restored from the store, running on the wall clock.
pub struct Session {
    pub ledger: RebaseLedger,
    pub vault: Vault,
    storage: Storage,
}

impl Session {
    pub fn open(config: &RebaseConfig) -> Result<Self> {
        let data_dir = &config.storage.data_dir;
        let storage = Storage::open(data_dir)?;
        let state = storage.load()?.with_context(|| {
            format!(
                "no ledger state in {}; run `rebase init` first",
                data_dir.display()
            )
        })?;
        let ledger = RebaseLedger::from_snapshot(state.ledger, Arc::new(SystemClock))?;
        let vault = Vault::from_state(state.vault);
        Ok(Self {
            ledger,
            vault,
            storage,
        })
    }

    /// Persist the ledger, the vault and the events recorded this session.
    pub fn commit(mut self) -> Result<()> {
        let events = self.ledger.drain_events();
        for record in &events {
            tracing::debug!(seq = record.seq, at = record.at, event = ?record.event, "ledger event");
        }
        let state = PersistedState::new(self.ledger.snapshot(), self.vault.state());
        self.storage.save(&state, &events)
    }
}
