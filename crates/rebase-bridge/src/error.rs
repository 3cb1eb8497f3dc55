use rebase_core::DomainId;
use rebase_ledger::LedgerError;

use crate::message::MessageId;

/// Gateway errors.
#[derive(Debug, thiserror::Error)]
pub enum BridgeError {
    #[error("no enabled peer for {0}")]
    UnknownPeer(DomainId),

    #[error("message addressed to {got}, this gateway serves {expected}")]
    WrongDestination { expected: DomainId, got: DomainId },

    #[error("amount must be greater than zero")]
    ZeroAmount,

    #[error("message id mismatch: claimed {claimed}, computed {computed}")]
    IdMismatch {
        claimed: MessageId,
        computed: MessageId,
    },

    #[error("codec error: {0}")]
    Codec(#[from] serde_json::Error),

    #[error("transport error: {0}")]
    Transport(String),

    #[error("ledger error: {0}")]
    Ledger(#[from] LedgerError),
}
