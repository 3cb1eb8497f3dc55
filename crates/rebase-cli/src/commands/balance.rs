//! `rebase balance` — Show a holder's balance and locked rate.

use clap::Args;
use rebase_core::{AccountId, RebaseConfig};

use crate::session::Session;

#[derive(Args, Debug)]
pub struct BalanceArgs {
    /// Holder to inspect.
    pub holder: AccountId,
}

pub fn run(args: &BalanceArgs, config: &RebaseConfig) -> anyhow::Result<()> {
    let session = Session::open(config)?;
    let ledger = &session.ledger;
    let holder = &args.holder;

    let balance = ledger.balance_of(holder)?;
    let principal = ledger.principal_balance_of(holder);

    println!("{}:", holder);
    println!("  Balance:     {}", balance);
    println!("  Principal:   {}", principal);
    println!("  Interest:    {}", balance.saturating_sub(principal));
    println!("  Locked rate: {}", ledger.user_interest_rate(holder));
    if let Some(account) = ledger.account(holder) {
        println!("  Settled at:  {}", account.last_settlement);
    }

    Ok(())
}
