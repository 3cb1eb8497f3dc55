//! Durable ledger state.
//!
//! A snapshot holds everything that must survive between calls: the holder
//! table, the global rate, owner and grantees, allowances and the tracked
//! principal total. The event log and the clock are not part of it.

use rebase_core::types::u128_string;
use rebase_core::AccountId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::access::AccessControl;
use crate::account::HolderAccount;
use crate::rate_policy::RatePolicy;

/// One `(owner, spender)` allowance.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AllowanceEntry {
    pub owner: AccountId,
    pub spender: AccountId,
    #[serde(with = "u128_string")]
    pub amount: u128,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct LedgerSnapshot {
    #[serde(with = "u128_string")]
    pub scale: u128,
    pub rate_policy: RatePolicy,
    pub access: AccessControl,
    #[serde(with = "u128_string")]
    pub total_principal: u128,
    pub accounts: BTreeMap<AccountId, HolderAccount>,
    #[serde(default)]
    pub allowances: Vec<AllowanceEntry>,
    /// Sequence number the next recorded event receives.
    #[serde(default)]
    pub next_seq: u64,
}

impl LedgerSnapshot {
    pub fn to_json(&self) -> Result<String, serde_json::Error> {
        serde_json::to_string_pretty(self)
    }

    pub fn from_json(json: &str) -> Result<Self, serde_json::Error> {
        serde_json::from_str(json)
    }

    /// Sum of stored principal across the holder table.
    pub fn summed_principal(&self) -> Option<u128> {
        self.accounts
            .values()
            .try_fold(0u128, |acc, account| acc.checked_add(account.principal))
    }
}
