use rebase_core::AccountId;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::fmt;

use crate::error::LedgerError;

/// Privileges checked by the ledger.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum Capability {
    /// Call `mint` and `burn`. Granted to the custody vault and gateway.
    MintAndBurn,
    /// Administrative calls: rate updates, grants, ownership transfer.
    /// Held only by the owner and never grantable.
    Owner,
}

impl fmt::Display for Capability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::MintAndBurn => write!(f, "MintAndBurn"),
            Self::Owner => write!(f, "Owner"),
        }
    }
}

/// Owner identity plus the explicit set of mint/burn grantees.
///
/// Part of the persisted ledger state; mutated only through owner-checked
/// calls on the ledger.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AccessControl {
    owner: AccountId,
    minters: BTreeSet<AccountId>,
}

impl AccessControl {
    pub fn new(owner: AccountId) -> Self {
        Self {
            owner,
            minters: BTreeSet::new(),
        }
    }

    pub fn owner(&self) -> &AccountId {
        &self.owner
    }

    /// Accounts holding [`Capability::MintAndBurn`].
    pub fn minters(&self) -> impl Iterator<Item = &AccountId> {
        self.minters.iter()
    }

    /// Whether `account` holds `capability`.
    pub fn has_capability(&self, account: &AccountId, capability: Capability) -> bool {
        match capability {
            Capability::Owner => *account == self.owner,
            Capability::MintAndBurn => self.minters.contains(account),
        }
    }

    /// Fail with `Unauthorized` unless `caller` holds `capability`.
    pub fn ensure(&self, caller: &AccountId, capability: Capability) -> Result<(), LedgerError> {
        if self.has_capability(caller, capability) {
            Ok(())
        } else {
            tracing::warn!(caller = %caller, required = %capability, "unauthorized call rejected");
            Err(LedgerError::Unauthorized {
                caller: caller.clone(),
                required: capability,
            })
        }
    }

    /// Add `account` to the mint/burn set. Returns `false` if already present.
    pub(crate) fn grant_mint_and_burn(&mut self, account: AccountId) -> bool {
        self.minters.insert(account)
    }

    /// Remove `account` from the mint/burn set. Returns `false` if absent.
    pub(crate) fn revoke_mint_and_burn(&mut self, account: &AccountId) -> bool {
        self.minters.remove(account)
    }

    pub(crate) fn set_owner(&mut self, owner: AccountId) {
        self.owner = owner;
    }
}
