//! Bus Transport
//!
//! The dispatch loop talks to the message bus through the [`BusConsumer`] and
//! [`BusProducer`] traits so the Kafka endpoints can be swapped for the
//! in-memory transport in tests without touching dispatch logic.

pub mod kafka;
pub mod local;

pub use kafka::{KafkaConsumer, KafkaProducer};
pub use local::{LocalConsumer, LocalProducer};

use crate::types::Result;

/// Header key carrying the payload media type
pub const CONTENT_TYPE_HEADER: &str = "Content-Type";

/// Media type of every outbound response payload
pub const CONTENT_TYPE_JSON: &str = "application/json";

/// One unit of bus traffic.
///
/// Immutable once received; outbound traffic is a freshly constructed
/// envelope.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Envelope {
    pub topic: String,
    /// UTF-8 payload, conventionally JSON
    pub payload: String,
    /// Header key/value pairs; values are raw bytes
    pub headers: Vec<(String, Vec<u8>)>,
}

impl Envelope {
    /// Envelope without headers.
    pub fn new(topic: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
            headers: Vec::new(),
        }
    }

    /// Outbound envelope with the JSON content-type header set.
    pub fn json(topic: impl Into<String>, payload: impl Into<String>) -> Self {
        Self {
            topic: topic.into(),
            payload: payload.into(),
            headers: vec![(
                CONTENT_TYPE_HEADER.to_string(),
                CONTENT_TYPE_JSON.as_bytes().to_vec(),
            )],
        }
    }

    /// Value of the content-type header, if present.
    pub fn content_type(&self) -> Option<&[u8]> {
        self.headers
            .iter()
            .find(|(key, _)| key == CONTENT_TYPE_HEADER)
            .map(|(_, value)| value.as_slice())
    }
}

/// Receiving side of the bus subscription.
pub trait BusConsumer: Send {
    /// Block until the next envelope arrives.
    fn recv(&mut self) -> Result<Envelope>;
}

/// Sending side of the bus connection.
pub trait BusProducer: Send {
    /// Send an envelope and wait for the transport to acknowledge it.
    fn send(&mut self, envelope: Envelope) -> Result<()>;
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_json_envelope_carries_content_type() {
        let envelope = Envelope::json("devices/Response", "\"Success\"");
        assert_eq!(envelope.content_type(), Some(&b"application/json"[..]));
    }

    #[test]
    fn test_plain_envelope_has_no_headers() {
        let envelope = Envelope::new("devices/Read?1", "{}");
        assert!(envelope.headers.is_empty());
        assert_eq!(envelope.content_type(), None);
    }
}
