//! Cross-domain message format.
//!
//! Messages travel as JSON. The message id is the BLAKE3 digest of the
//! JSON-encoded payload, so a receiver can detect a payload altered in
//! transit.

use rebase_core::types::u128_string;
use rebase_core::{AccountId, DomainId, InterestRate};
use serde::{Deserialize, Serialize};
use std::fmt;
use uuid::Uuid;

use crate::error::BridgeError;

/// BLAKE3 digest identifying a message.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct MessageId(#[serde(with = "hex_bytes")] pub [u8; 32]);

impl fmt::Display for MessageId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", hex::encode(self.0))
    }
}

mod hex_bytes {
    use serde::{de, Deserialize, Deserializer, Serializer};

    pub fn serialize<S: Serializer>(bytes: &[u8; 32], serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&hex::encode(bytes))
    }

    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<[u8; 32], D::Error> {
        let s = String::deserialize(deserializer)?;
        let bytes = hex::decode(&s).map_err(de::Error::custom)?;
        bytes
            .try_into()
            .map_err(|v: Vec<u8>| de::Error::invalid_length(v.len(), &"32 bytes"))
    }
}

/// What the source gateway commits to: who receives how much, at which
/// rate.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgePayload {
    /// Uniqueness nonce (UUID v7).
    pub nonce: Uuid,
    pub source_domain: DomainId,
    pub dest_domain: DomainId,
    pub sender: AccountId,
    pub recipient: AccountId,
    /// Principal burned at the source and minted at the destination.
    #[serde(with = "u128_string")]
    pub amount: u128,
    /// The sender's locked rate at the source, read before the burn.
    pub rate: InterestRate,
}

impl BridgePayload {
    pub fn compute_id(&self) -> Result<MessageId, BridgeError> {
        let bytes = serde_json::to_vec(self)?;
        Ok(MessageId(*blake3::hash(&bytes).as_bytes()))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BridgeMessage {
    pub id: MessageId,
    pub payload: BridgePayload,
}

impl BridgeMessage {
    /// Seal a payload with its id.
    pub fn new(payload: BridgePayload) -> Result<Self, BridgeError> {
        let id = payload.compute_id()?;
        Ok(Self { id, payload })
    }

    pub fn encode(&self) -> Result<Vec<u8>, BridgeError> {
        Ok(serde_json::to_vec(self)?)
    }

    /// Decode and check the id against the payload.
    pub fn decode(bytes: &[u8]) -> Result<Self, BridgeError> {
        let message: BridgeMessage = serde_json::from_slice(bytes)?;
        let computed = message.payload.compute_id()?;
        if computed != message.id {
            return Err(BridgeError::IdMismatch {
                claimed: message.id,
                computed,
            });
        }
        Ok(message)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn payload() -> BridgePayload {
        BridgePayload {
            nonce: Uuid::now_v7(),
            source_domain: DomainId(1),
            dest_domain: DomainId(2),
            sender: AccountId::from("alice"),
            recipient: AccountId::from("bob"),
            amount: 1_000,
            rate: InterestRate(50_000_000_000_000_000_000_000_000_000),
        }
    }

    #[test]
    fn test_encode_decode() {
        let message = BridgeMessage::new(payload()).unwrap();
        let decoded = BridgeMessage::decode(&message.encode().unwrap()).unwrap();
        assert_eq!(decoded, message);
    }

    #[test]
    fn test_distinct_nonces_give_distinct_ids() {
        let a = BridgeMessage::new(payload()).unwrap();
        let b = BridgeMessage::new(payload()).unwrap();
        assert_ne!(a.id, b.id);
    }

    #[test]
    fn test_tampered_amount_detected() {
        let message = BridgeMessage::new(payload()).unwrap();
        let mut json: serde_json::Value = serde_json::from_slice(&message.encode().unwrap()).unwrap();
        json["payload"]["amount"] = serde_json::Value::String("1000000".into());
        let bytes = serde_json::to_vec(&json).unwrap();

        assert!(matches!(
            BridgeMessage::decode(&bytes),
            Err(BridgeError::IdMismatch { .. })
        ));
    }

    #[test]
    fn test_garbage_is_codec_error() {
        assert!(matches!(
            BridgeMessage::decode(b"not json"),
            Err(BridgeError::Codec(_))
        ));
    }

    #[test]
    fn test_message_id_display_is_hex() {
        let id = MessageId([0xab; 32]);
        assert_eq!(id.to_string().len(), 64);
        assert!(id.to_string().starts_with("abab"));
    }
}
