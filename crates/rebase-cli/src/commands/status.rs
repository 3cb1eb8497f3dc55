//! `rebase status` — Show global ledger and vault state.

use clap::Args;
use rebase_core::RebaseConfig;
use serde::Serialize;

use crate::session::Session;

#[derive(Args, Debug)]
pub struct StatusArgs {
    /// Print machine-readable JSON instead of text.
    #[arg(long)]
    pub json: bool,
}

#[derive(Serialize)]
struct StatusReport {
    now: u64,
    owner: String,
    minters: Vec<String>,
    global_rate: String,
    scale: String,
    holders: usize,
    total_principal: String,
    total_supply: String,
    vault_reserves: String,
}

pub fn run(args: &StatusArgs, config: &RebaseConfig) -> anyhow::Result<()> {
    let session = Session::open(config)?;
    let ledger = &session.ledger;

    let report = StatusReport {
        now: ledger.now(),
        owner: ledger.owner().to_string(),
        minters: ledger.access().minters().map(|m| m.to_string()).collect(),
        global_rate: ledger.interest_rate().to_string(),
        scale: ledger.scale().to_string(),
        holders: ledger.holders().count(),
        total_principal: ledger.total_principal().to_string(),
        total_supply: ledger.total_supply()?.to_string(),
        vault_reserves: session.vault.reserves().to_string(),
    };

    if args.json {
        println!("{}", serde_json::to_string_pretty(&report)?);
        return Ok(());
    }

    println!("Ledger Status:");
    println!("  Time:            {}", report.now);
    println!("  Owner:           {}", report.owner);
    println!("  Minters:         {}", report.minters.join(", "));
    println!("  Global rate:     {} / {}", report.global_rate, report.scale);
    println!("  Holders:         {}", report.holders);
    println!("  Total principal: {}", report.total_principal);
    println!("  Total supply:    {}", report.total_supply);
    println!("  Vault reserves:  {}", report.vault_reserves);

    Ok(())
}
