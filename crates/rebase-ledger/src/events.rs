use rebase_core::types::u128_string;
use rebase_core::{AccountId, InterestRate};
use serde::{Deserialize, Serialize};

use crate::access::Capability;

/// Observable ledger state changes, in the order they were applied.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum LedgerEvent {
    /// Explicit mint by a capability holder.
    Minted {
        holder: AccountId,
        #[serde(with = "u128_string")]
        amount: u128,
        rate: InterestRate,
    },
    /// Interest materialized into principal during settlement. Counts
    /// towards issued supply exactly like a mint.
    InterestMinted {
        holder: AccountId,
        #[serde(with = "u128_string")]
        amount: u128,
    },
    Burned {
        holder: AccountId,
        #[serde(with = "u128_string")]
        amount: u128,
    },
    Transferred {
        from: AccountId,
        to: AccountId,
        #[serde(with = "u128_string")]
        amount: u128,
    },
    Approved {
        owner: AccountId,
        spender: AccountId,
        #[serde(with = "u128_string")]
        amount: u128,
    },
    /// A holder's locked rate changed through mint or inheritance.
    RateLocked {
        holder: AccountId,
        rate: InterestRate,
    },
    InterestRateSet {
        old: InterestRate,
        new: InterestRate,
    },
    CapabilityGranted {
        account: AccountId,
        capability: Capability,
    },
    CapabilityRevoked {
        account: AccountId,
        capability: Capability,
    },
    OwnershipTransferred {
        previous: AccountId,
        new: AccountId,
    },
}

impl LedgerEvent {
    /// Net change to issued principal implied by this event.
    pub fn supply_delta(&self) -> i128 {
        match self {
            Self::Minted { amount, .. } | Self::InterestMinted { amount, .. } => {
                i128::try_from(*amount).unwrap_or(i128::MAX)
            }
            Self::Burned { amount, .. } => -i128::try_from(*amount).unwrap_or(i128::MAX),
            _ => 0,
        }
    }
}

/// A ledger event with its sequence number and timestamp.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EventRecord {
    pub seq: u64,
    pub at: u64,
    pub event: LedgerEvent,
}
