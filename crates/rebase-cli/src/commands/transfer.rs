//! `rebase transfer`, `rebase approve`, `rebase transfer-from`.

use clap::Args;
use rebase_core::{AccountId, Amount, RebaseConfig};

use crate::session::Session;

#[derive(Args, Debug)]
pub struct TransferArgs {
    /// Sending holder.
    pub from: AccountId,
    /// Receiving holder.
    pub to: AccountId,
    /// Amount, or "all" for the sender's full accrued balance.
    pub amount: Amount,
}

#[derive(Args, Debug)]
pub struct ApproveArgs {
    /// Holder granting the allowance.
    pub owner: AccountId,
    /// Account allowed to spend.
    pub spender: AccountId,
    /// Allowance, or "all" for unlimited. Zero removes it.
    pub amount: Amount,
}

#[derive(Args, Debug)]
pub struct TransferFromArgs {
    /// Account spending the allowance.
    pub spender: AccountId,
    /// Holder whose balance moves.
    pub owner: AccountId,
    /// Receiving holder.
    pub to: AccountId,
    /// Amount, or "all" for the owner's full accrued balance.
    pub amount: Amount,
}

pub fn transfer(args: &TransferArgs, config: &RebaseConfig) -> anyhow::Result<()> {
    let mut session = Session::open(config)?;
    let moved = session.ledger.transfer(&args.from, &args.to, args.amount)?;
    let rate = session.ledger.user_interest_rate(&args.to);
    session.commit()?;

    println!("Transferred {} from {} to {}", moved, args.from, args.to);
    println!("  Recipient rate: {}", rate);
    Ok(())
}

pub fn approve(args: &ApproveArgs, config: &RebaseConfig) -> anyhow::Result<()> {
    let mut session = Session::open(config)?;
    session.ledger.approve(&args.owner, &args.spender, args.amount);
    let allowance = session.ledger.allowance(&args.owner, &args.spender);
    session.commit()?;

    if allowance == u128::MAX {
        println!("{} may spend all of {}'s balance", args.spender, args.owner);
    } else {
        println!("{} may spend {} of {}'s balance", args.spender, allowance, args.owner);
    }
    Ok(())
}

pub fn transfer_from(args: &TransferFromArgs, config: &RebaseConfig) -> anyhow::Result<()> {
    let mut session = Session::open(config)?;
    let moved = session
        .ledger
        .transfer_from(&args.spender, &args.owner, &args.to, args.amount)?;
    let remaining = session.ledger.allowance(&args.owner, &args.spender);
    session.commit()?;

    println!(
        "{} transferred {} from {} to {}",
        args.spender, moved, args.owner, args.to
    );
    if remaining != u128::MAX {
        println!("  Remaining allowance: {}", remaining);
    }
    Ok(())
}
