//! `rebase set-rate`, `rebase grant`, `rebase revoke` — Owner operations.

use clap::Args;
use rebase_core::{AccountId, InterestRate, RebaseConfig};

use crate::session::Session;

#[derive(Args, Debug)]
pub struct SetRateArgs {
    /// New global rate, scaled by the ledger's fixed-point base.
    pub rate: InterestRate,
    /// Caller identity (defaults to the configured owner).
    #[arg(long)]
    pub caller: Option<AccountId>,
}

#[derive(Args, Debug)]
pub struct GrantArgs {
    /// Account receiving the mint/burn capability.
    pub account: AccountId,
    /// Caller identity (defaults to the configured owner).
    #[arg(long)]
    pub caller: Option<AccountId>,
}

#[derive(Args, Debug)]
pub struct RevokeArgs {
    /// Account losing the mint/burn capability.
    pub account: AccountId,
    /// Caller identity (defaults to the configured owner).
    #[arg(long)]
    pub caller: Option<AccountId>,
}

fn caller<'a>(explicit: &'a Option<AccountId>, config: &'a RebaseConfig) -> &'a AccountId {
    explicit.as_ref().unwrap_or(&config.ledger.owner)
}

pub fn set_rate(args: &SetRateArgs, config: &RebaseConfig) -> anyhow::Result<()> {
    let mut session = Session::open(config)?;
    let old = session
        .ledger
        .set_interest_rate(caller(&args.caller, config), args.rate)?;
    session.commit()?;

    println!("Global rate lowered from {} to {}", old, args.rate);
    println!("Existing holders keep their locked rates.");
    Ok(())
}

pub fn grant(args: &GrantArgs, config: &RebaseConfig) -> anyhow::Result<()> {
    let mut session = Session::open(config)?;
    session
        .ledger
        .grant_mint_and_burn(caller(&args.caller, config), args.account.clone())?;
    session.commit()?;

    println!("Granted mint/burn to {}", args.account);
    Ok(())
}

pub fn revoke(args: &RevokeArgs, config: &RebaseConfig) -> anyhow::Result<()> {
    let mut session = Session::open(config)?;
    session
        .ledger
        .revoke_mint_and_burn(caller(&args.caller, config), &args.account)?;
    session.commit()?;

    println!("Revoked mint/burn from {}", args.account);
    Ok(())
}
