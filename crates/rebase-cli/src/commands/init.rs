//! `rebase init` — Write a configuration file and create an empty ledger.

use anyhow::Context;
use clap::Args;
use rebase_core::{RebaseConfig, SystemClock};
use rebase_ledger::RebaseLedger;
use rebase_vault::Vault;
use std::path::Path;
use std::sync::Arc;

use crate::storage::{PersistedState, Storage};

#[derive(Args, Debug)]
pub struct InitArgs {
    /// Replace an existing ledger store.
    #[arg(long)]
    pub force: bool,
}

pub fn run(args: &InitArgs, config_path: &Path, config: RebaseConfig) -> anyhow::Result<()> {
    let data_dir = &config.storage.data_dir;
    if data_dir.exists() {
        let initialized = Storage::open(data_dir)?.is_initialized()?;
        if initialized && !args.force {
            anyhow::bail!(
                "ledger state already exists in {} (use --force to replace it)",
                data_dir.display()
            );
        }
        std::fs::remove_dir_all(data_dir)
            .with_context(|| format!("clearing {}", data_dir.display()))?;
    }

    if !config_path.exists() {
        config
            .save(config_path)
            .with_context(|| format!("writing {}", config_path.display()))?;
        println!("Wrote configuration to {}", config_path.display());
    }

    let owner = config.ledger.owner.clone();
    let mut ledger = RebaseLedger::new(&config.ledger, Arc::new(SystemClock))?;
    ledger.grant_mint_and_burn(&owner, config.vault.account.clone())?;
    ledger.grant_mint_and_burn(&owner, config.bridge.account.clone())?;
    let vault = Vault::new(config.vault.account.clone());

    let events = ledger.drain_events();
    Storage::open(data_dir)?.save(&PersistedState::new(ledger.snapshot(), vault.state()), &events)?;

    println!("Initialized ledger in {}", data_dir.display());
    println!("  Owner:       {}", owner);
    println!("  Global rate: {}", ledger.interest_rate());
    println!("  Minters:     {}, {}", config.vault.account, config.bridge.account);
    println!("Run 'rebase deposit <holder> <value>' to mint the first balance.");

    Ok(())
}
