use async_trait::async_trait;
use dashmap::DashMap;
use rebase_core::DomainId;
use tokio::sync::mpsc;

use crate::error::BridgeError;

/// Delivery of encoded messages to another domain.
///
/// Implementations own delivery only; retries and replay handling belong
/// to the transport, not the gateway.
#[async_trait]
pub trait MessageTransport: Send + Sync {
    /// Hand `bytes` to the transport for delivery to `dest`.
    async fn dispatch(&self, dest: DomainId, bytes: Vec<u8>) -> Result<(), BridgeError>;

    /// Return the unique identifier of this transport (e.g. "bt-channel").
    fn transport_id(&self) -> &str;
}

/// In-process transport over tokio channels, one inbox per domain.
pub struct ChannelTransport {
    inboxes: DashMap<DomainId, mpsc::Sender<Vec<u8>>>,
    capacity: usize,
}

impl ChannelTransport {
    pub fn new(capacity: usize) -> Self {
        Self {
            inboxes: DashMap::new(),
            capacity,
        }
    }

    /// Open (or replace) the inbox for `domain`.
    pub fn register(&self, domain: DomainId) -> mpsc::Receiver<Vec<u8>> {
        let (tx, rx) = mpsc::channel(self.capacity);
        self.inboxes.insert(domain, tx);
        tracing::debug!(domain = %domain, "inbox registered");
        rx
    }

    pub fn unregister(&self, domain: DomainId) {
        self.inboxes.remove(&domain);
    }
}

impl Default for ChannelTransport {
    fn default() -> Self {
        Self::new(256)
    }
}

#[async_trait]
impl MessageTransport for ChannelTransport {
    async fn dispatch(&self, dest: DomainId, bytes: Vec<u8>) -> Result<(), BridgeError> {
        // Clone the sender so no map guard is held across the await.
        let tx = self
            .inboxes
            .get(&dest)
            .map(|entry| entry.value().clone())
            .ok_or_else(|| BridgeError::Transport(format!("no inbox for {}", dest)))?;
        tx.send(bytes)
            .await
            .map_err(|_| BridgeError::Transport(format!("inbox for {} closed", dest)))
    }

    fn transport_id(&self) -> &str {
        "bt-channel"
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_dispatch_to_registered_inbox() {
        let transport = ChannelTransport::default();
        let mut inbox = transport.register(DomainId(2));

        transport.dispatch(DomainId(2), b"hello".to_vec()).await.unwrap();
        assert_eq!(inbox.recv().await.unwrap(), b"hello".to_vec());
    }

    #[tokio::test]
    async fn test_dispatch_without_inbox_fails() {
        let transport = ChannelTransport::default();
        let result = transport.dispatch(DomainId(9), vec![1]).await;
        assert!(matches!(result, Err(BridgeError::Transport(_))));
    }

    #[tokio::test]
    async fn test_dispatch_to_closed_inbox_fails() {
        let transport = ChannelTransport::default();
        let inbox = transport.register(DomainId(3));
        drop(inbox);
        let result = transport.dispatch(DomainId(3), vec![1]).await;
        assert!(matches!(result, Err(BridgeError::Transport(_))));
    }

    #[test]
    fn test_transport_id() {
        assert_eq!(ChannelTransport::new(1).transport_id(), "bt-channel");
    }
}
