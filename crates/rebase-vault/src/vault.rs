use rebase_core::types::u128_string;
use rebase_core::{AccountId, Amount, InterestRate};
use rebase_ledger::{LedgerError, RebaseLedger};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::error::VaultError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ReceiptKind {
    Deposit,
    Redeem,
}

/// Proof of a completed deposit or redemption.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultReceipt {
    /// Receipt identifier (time-ordered UUID v7).
    pub id: Uuid,
    pub kind: ReceiptKind,
    pub holder: AccountId,
    /// Value deposited, or paid out on redemption.
    #[serde(with = "u128_string")]
    pub amount: u128,
    /// Rate locked by a deposit; the holder's rate at redemption time.
    pub rate: InterestRate,
    /// Ledger time of the operation.
    pub at: u64,
}

/// Persisted vault state.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct VaultState {
    pub account: AccountId,
    #[serde(with = "u128_string")]
    pub reserves: u128,
}

/// Custody adapter in front of the ledger.
///
/// The vault's own `account` must hold the ledger's mint/burn capability.
/// `reserves` is the value held in custody, which backs principal plus
/// any interest paid out of rewards funded with [`Vault::fund_rewards`].
#[derive(Debug, Clone)]
pub struct Vault {
    account: AccountId,
    reserves: u128,
}

impl Vault {
    pub fn new(account: AccountId) -> Self {
        Self {
            account,
            reserves: 0,
        }
    }

    pub fn from_state(state: VaultState) -> Self {
        Self {
            account: state.account,
            reserves: state.reserves,
        }
    }

    pub fn state(&self) -> VaultState {
        VaultState {
            account: self.account.clone(),
            reserves: self.reserves,
        }
    }

    /// Identity the vault presents to the ledger.
    pub fn account(&self) -> &AccountId {
        &self.account
    }

    /// Value currently held in custody.
    pub fn reserves(&self) -> u128 {
        self.reserves
    }

    /// Take `value` into custody and mint the same amount to `depositor`
    /// at the ledger's current global rate.
    pub fn deposit(
        &mut self,
        ledger: &mut RebaseLedger,
        depositor: &AccountId,
        value: u128,
    ) -> Result<VaultReceipt, VaultError> {
        if value == 0 {
            return Err(VaultError::ZeroAmount);
        }
        let reserves = self
            .reserves
            .checked_add(value)
            .ok_or(VaultError::ReserveOverflow)?;

        let rate = ledger.interest_rate();
        ledger.mint(&self.account, depositor, value, rate)?;
        self.reserves = reserves;

        tracing::info!(depositor = %depositor, value, rate = %rate, "deposit accepted");
        Ok(VaultReceipt {
            id: Uuid::now_v7(),
            kind: ReceiptKind::Deposit,
            holder: depositor.clone(),
            amount: value,
            rate,
            at: ledger.now(),
        })
    }

    /// Burn `amount` (or the holder's whole accrued balance) and pay the
    /// same value out of reserves.
    ///
    /// Balance and reserves are both checked before the burn so a failed
    /// redemption leaves ledger and vault unchanged.
    pub fn redeem(
        &mut self,
        ledger: &mut RebaseLedger,
        holder: &AccountId,
        amount: Amount,
    ) -> Result<VaultReceipt, VaultError> {
        let balance = ledger.balance_of(holder)?;
        let payout = amount.resolve(balance);
        if payout == 0 {
            return Err(VaultError::ZeroAmount);
        }
        if payout > balance {
            return Err(LedgerError::InsufficientBalance {
                holder: holder.clone(),
                available: balance,
                requested: payout,
            }
            .into());
        }
        if payout > self.reserves {
            tracing::warn!(holder = %holder, payout, reserves = self.reserves, "redemption exceeds reserves");
            return Err(VaultError::InsufficientReserves {
                available: self.reserves,
                required: payout,
            });
        }

        let rate = ledger.user_interest_rate(holder);
        let burned = ledger.burn(&self.account, holder, Amount::Exact(payout))?;
        self.reserves -= burned;

        tracing::info!(holder = %holder, payout = burned, "redemption paid");
        Ok(VaultReceipt {
            id: Uuid::now_v7(),
            kind: ReceiptKind::Redeem,
            holder: holder.clone(),
            amount: burned,
            rate,
            at: ledger.now(),
        })
    }

    /// Add reward value to reserves so accrued interest can be paid out.
    /// Mints nothing.
    pub fn fund_rewards(&mut self, from: &AccountId, value: u128) -> Result<(), VaultError> {
        if value == 0 {
            return Err(VaultError::ZeroAmount);
        }
        self.reserves = self
            .reserves
            .checked_add(value)
            .ok_or(VaultError::ReserveOverflow)?;
        tracing::info!(from = %from, value, reserves = self.reserves, "rewards funded");
        Ok(())
    }
}
