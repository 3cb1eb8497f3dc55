//! Rebase cross-domain gateway
//!
//! Moves ledger balance between independent execution domains. The source
//! gateway burns from the sender and ships `(recipient, amount,
//! sender_locked_rate)`; the destination gateway mints that amount at the
//! carried rate, so a holder's locked rate survives the move.

pub mod error;
pub mod message;
pub mod transport;
pub mod gateway;

pub use error::BridgeError;
pub use gateway::{Gateway, PeerConfig};
pub use message::{BridgeMessage, BridgePayload, MessageId};
pub use transport::{ChannelTransport, MessageTransport};
