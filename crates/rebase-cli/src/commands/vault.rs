//! `rebase deposit`, `rebase redeem`, `rebase fund` — Vault custody.

use clap::Args;
use rebase_core::{AccountId, Amount, RebaseConfig};

use crate::session::Session;

#[derive(Args, Debug)]
pub struct DepositArgs {
    /// Holder receiving the minted balance.
    pub holder: AccountId,
    /// Value to deposit.
    pub value: u128,
}

#[derive(Args, Debug)]
pub struct RedeemArgs {
    /// Holder whose balance is burned.
    pub holder: AccountId,
    /// Amount to redeem, or "all" for the full accrued balance.
    #[arg(default_value = "all")]
    pub amount: Amount,
}

#[derive(Args, Debug)]
pub struct FundArgs {
    /// Reward value to add to reserves.
    pub value: u128,
    /// Account credited as the funder.
    #[arg(long)]
    pub from: Option<AccountId>,
}

pub fn deposit(args: &DepositArgs, config: &RebaseConfig) -> anyhow::Result<()> {
    let mut session = Session::open(config)?;
    let receipt = session
        .vault
        .deposit(&mut session.ledger, &args.holder, args.value)?;
    session.commit()?;

    println!("Deposited {} for {}", receipt.amount, receipt.holder);
    println!("  Receipt:     {}", receipt.id);
    println!("  Locked rate: {}", receipt.rate);
    Ok(())
}

pub fn redeem(args: &RedeemArgs, config: &RebaseConfig) -> anyhow::Result<()> {
    let mut session = Session::open(config)?;
    let receipt = session
        .vault
        .redeem(&mut session.ledger, &args.holder, args.amount)?;
    session.commit()?;

    println!("Redeemed {} for {}", receipt.amount, receipt.holder);
    println!("  Receipt: {}", receipt.id);
    Ok(())
}

pub fn fund(args: &FundArgs, config: &RebaseConfig) -> anyhow::Result<()> {
    let mut session = Session::open(config)?;
    let from = args.from.as_ref().unwrap_or(&config.ledger.owner);
    session.vault.fund_rewards(from, args.value)?;
    let reserves = session.vault.reserves();
    session.commit()?;

    println!("Funded {} in rewards; reserves now {}", args.value, reserves);
    Ok(())
}
