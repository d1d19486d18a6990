//! Message envelope and JSON payload conversion

use super::PublishError;
use bytes::Bytes;
use serde::de::DeserializeOwned;
use serde::Serialize;

pub const CONTENT_TYPE_JSON: &str = "application/json";

/// Message as it travels through an exchange into queues
///
/// The body is reference counted so fan-out to several queues does not copy it.
#[derive(Debug, Clone)]
pub struct Message {
    pub routing_key: String,
    pub content_type: &'static str,
    pub body: Bytes,
}

/// Converts payloads to and from JSON message bodies
pub struct JsonConverter;

impl JsonConverter {
    /// Encode a payload into a message routed by `routing_key`
    pub fn to_message<T: Serialize>(routing_key: &str, payload: &T) -> Result<Message, PublishError> {
        let body = serde_json::to_vec(payload).map_err(PublishError::Encode)?;
        Ok(Message {
            routing_key: routing_key.to_string(),
            content_type: CONTENT_TYPE_JSON,
            body: Bytes::from(body),
        })
    }

    /// Decode a message body back into a payload
    pub fn from_message<T: DeserializeOwned>(message: &Message) -> Result<T, serde_json::Error> {
        serde_json::from_slice(&message.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::core::{Symbol, Trade};

    #[test]
    fn test_trade_survives_conversion() {
        let trade = Trade::new(Symbol::new("ATT").unwrap(), 101.25);
        let msg = JsonConverter::to_message("ATT", &trade).unwrap();

        assert_eq!(msg.routing_key, "ATT");
        assert_eq!(msg.content_type, CONTENT_TYPE_JSON);

        let decoded: Trade = JsonConverter::from_message(&msg).unwrap();
        assert_eq!(decoded, trade);
    }

    #[test]
    fn test_garbage_body_fails_to_decode() {
        let msg = Message {
            routing_key: "ATT".to_string(),
            content_type: CONTENT_TYPE_JSON,
            body: Bytes::from_static(b"not json"),
        };
        let decoded: Result<Trade, _> = JsonConverter::from_message(&msg);
        assert!(decoded.is_err());
    }
}
