use dashmap::DashMap;
use rebase_core::{AccountId, Amount, DomainId};
use rebase_ledger::RebaseLedger;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tokio::sync::mpsc;
use uuid::Uuid;

use crate::error::BridgeError;
use crate::message::{BridgeMessage, BridgePayload};
use crate::transport::MessageTransport;

/// A remote domain this gateway exchanges messages with.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct PeerConfig {
    pub domain: DomainId,
    /// Account of the gateway on the remote domain.
    pub remote_gateway: AccountId,
    /// Disabled peers are rejected in both directions.
    pub enabled: bool,
}

/// Cross-domain gateway for one domain's ledger.
///
/// The gateway's `account` must hold the local ledger's mint/burn
/// capability. Peers are kept in a `DashMap` so they can be managed
/// through `&self` while sends are in flight.
pub struct Gateway {
    domain: DomainId,
    account: AccountId,
    peers: DashMap<DomainId, PeerConfig>,
    transport: Arc<dyn MessageTransport>,
}

impl Gateway {
    pub fn new(domain: DomainId, account: AccountId, transport: Arc<dyn MessageTransport>) -> Self {
        Self {
            domain,
            account,
            peers: DashMap::new(),
            transport,
        }
    }

    pub fn domain(&self) -> DomainId {
        self.domain
    }

    pub fn account(&self) -> &AccountId {
        &self.account
    }

    /// Register (or replace) a peer domain.
    pub fn add_peer(&self, peer: PeerConfig) {
        tracing::info!(
            domain = %self.domain,
            peer = %peer.domain,
            enabled = peer.enabled,
            transport = self.transport.transport_id(),
            "peer registered"
        );
        self.peers.insert(peer.domain, peer);
    }

    pub fn remove_peer(&self, domain: DomainId) -> Option<PeerConfig> {
        self.peers.remove(&domain).map(|(_, peer)| peer)
    }

    pub fn peer(&self, domain: DomainId) -> Option<PeerConfig> {
        self.peers.get(&domain).map(|entry| entry.clone())
    }

    fn ensure_peer(&self, domain: DomainId) -> Result<(), BridgeError> {
        match self.peers.get(&domain) {
            Some(peer) if peer.enabled => Ok(()),
            _ => Err(BridgeError::UnknownPeer(domain)),
        }
    }

    /// Burn from `sender` and ship the amount, with the sender's locked
    /// rate, to `recipient` on `dest`.
    ///
    /// The rate is read before the burn. If the transport refuses the
    /// message, the burned amount is minted back to the sender at that
    /// same rate.
    pub async fn send(
        &self,
        ledger: &mut RebaseLedger,
        sender: &AccountId,
        dest: DomainId,
        recipient: &AccountId,
        amount: Amount,
    ) -> Result<BridgeMessage, BridgeError> {
        if dest == self.domain {
            return Err(BridgeError::WrongDestination {
                expected: self.domain,
                got: dest,
            });
        }
        self.ensure_peer(dest)?;

        let resolved = amount.resolve(ledger.balance_of(sender)?);
        if resolved == 0 {
            return Err(BridgeError::ZeroAmount);
        }
        let rate = ledger.user_interest_rate(sender);
        let message = BridgeMessage::new(BridgePayload {
            nonce: Uuid::now_v7(),
            source_domain: self.domain,
            dest_domain: dest,
            sender: sender.clone(),
            recipient: recipient.clone(),
            amount: resolved,
            rate,
        })?;
        let bytes = message.encode()?;

        let burned = ledger.burn(&self.account, sender, Amount::Exact(resolved))?;

        if let Err(e) = self.transport.dispatch(dest, bytes).await {
            tracing::warn!(
                message_id = %message.id,
                error = %e,
                "dispatch failed, restoring burned balance"
            );
            ledger.mint(&self.account, sender, burned, rate)?;
            return Err(e);
        }

        tracing::info!(
            message_id = %message.id,
            sender = %sender,
            dest = %dest,
            amount = burned,
            rate = %rate,
            "bridge message sent"
        );
        Ok(message)
    }

    /// Decode an inbound message and mint its amount to the recipient at
    /// the carried rate.
    pub fn receive(
        &self,
        ledger: &mut RebaseLedger,
        bytes: &[u8],
    ) -> Result<BridgeMessage, BridgeError> {
        let message = BridgeMessage::decode(bytes)?;
        self.apply(ledger, message)
    }

    /// Apply an already-decoded message. The id is checked against the
    /// payload again since the message did not come through [`BridgeMessage::decode`].
    pub fn receive_message(
        &self,
        ledger: &mut RebaseLedger,
        message: BridgeMessage,
    ) -> Result<BridgeMessage, BridgeError> {
        let computed = message.payload.compute_id()?;
        if computed != message.id {
            return Err(BridgeError::IdMismatch {
                claimed: message.id,
                computed,
            });
        }
        self.apply(ledger, message)
    }

    fn apply(
        &self,
        ledger: &mut RebaseLedger,
        message: BridgeMessage,
    ) -> Result<BridgeMessage, BridgeError> {
        let payload = &message.payload;
        if payload.dest_domain != self.domain {
            return Err(BridgeError::WrongDestination {
                expected: self.domain,
                got: payload.dest_domain,
            });
        }
        self.ensure_peer(payload.source_domain)?;

        ledger.mint(&self.account, &payload.recipient, payload.amount, payload.rate)?;

        tracing::info!(
            message_id = %message.id,
            source = %payload.source_domain,
            recipient = %payload.recipient,
            amount = payload.amount,
            rate = %payload.rate,
            "bridge message received"
        );
        Ok(message)
    }

    /// Wait for the next message in `inbox` and apply it. Returns `None`
    /// once the inbox is closed.
    pub async fn receive_next(
        &self,
        ledger: &mut RebaseLedger,
        inbox: &mut mpsc::Receiver<Vec<u8>>,
    ) -> Option<Result<BridgeMessage, BridgeError>> {
        let bytes = inbox.recv().await?;
        Some(self.receive(ledger, &bytes))
    }
}
