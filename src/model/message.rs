use std::collections::BTreeMap;

use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};

/// The four message shapes UDPRIP nodes exchange, sharing an implicit
/// `{type, source, destination}` header via the `tag`/`content` fields
/// serde derives from `#[serde(tag = "type")]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Message {
    Data {
        source: String,
        destination: String,
        payload: String,
    },
    Update {
        source: String,
        destination: String,
        distances: BTreeMap<String, u64>,
    },
    Trace {
        source: String,
        destination: String,
        routers: Vec<String>,
    },
    Control {
        source: String,
        destination: String,
        reason: String,
        original: Box<Message>,
    },
}

impl Message {
    pub fn source(&self) -> &str {
        match self {
            Message::Data { source, .. }
            | Message::Update { source, .. }
            | Message::Trace { source, .. }
            | Message::Control { source, .. } => source,
        }
    }

    pub fn destination(&self) -> &str {
        match self {
            Message::Data { destination, .. }
            | Message::Update { destination, .. }
            | Message::Trace { destination, .. }
            | Message::Control { destination, .. } => destination,
        }
    }
}

pub fn encode_message(message: &Message) -> Result<Vec<u8>> {
    serde_json::to_vec(message).context("failed to encode message")
}

pub fn decode_message(data: &[u8]) -> Result<Message> {
    serde_json::from_slice(data).context("failed to decode message")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn data_message_roundtrips() {
        let msg = Message::Data {
            source: "127.0.1.1".to_string(),
            destination: "127.0.1.2".to_string(),
            payload: "hello".to_string(),
        };
        let encoded = encode_message(&msg).expect("encode should succeed");
        let decoded = decode_message(&encoded).expect("decode should succeed");
        assert_eq!(decoded, msg);
    }

    #[test]
    fn control_message_carries_embedded_original() {
        let original = Message::Data {
            source: "127.0.1.1".to_string(),
            destination: "127.0.1.3".to_string(),
            payload: "hi".to_string(),
        };
        let msg = Message::Control {
            source: "127.0.1.2".to_string(),
            destination: "127.0.1.1".to_string(),
            reason: "unreachable".to_string(),
            original: Box::new(original.clone()),
        };
        let encoded = encode_message(&msg).expect("encode should succeed");
        let decoded = decode_message(&encoded).expect("decode should succeed");
        match decoded {
            Message::Control {
                reason, original, ..
            } => {
                assert_eq!(reason, "unreachable");
                assert_eq!(*original, original);
            }
            _ => panic!("expected control message"),
        }
    }

    #[test]
    fn unknown_type_fails_to_decode() {
        let raw = br#"{"type":"hello","source":"a","destination":"b"}"#;
        assert!(decode_message(raw).is_err());
    }

    #[test]
    fn malformed_json_fails_to_decode() {
        let raw = b"not json";
        assert!(decode_message(raw).is_err());
    }
}
