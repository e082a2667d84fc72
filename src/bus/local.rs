//! In-memory bus endpoints
//!
//! Simple channel-backed transport for tests and bench setups. The consumer
//! half is fed from a plain sender; the producer half drains into a plain
//! receiver, so a test can inject requests and observe responses directly.

use std::sync::mpsc::{Receiver, Sender, channel};

use crate::types::{Error, Result};

use super::{BusConsumer, BusProducer, Envelope};

/// In-memory consumer plus the sender that feeds it.
pub fn inbox() -> (Sender<Envelope>, LocalConsumer) {
    let (tx, rx) = channel();
    (tx, LocalConsumer { rx })
}

/// In-memory producer plus the receiver that observes it.
pub fn outbox() -> (LocalProducer, Receiver<Envelope>) {
    let (tx, rx) = channel();
    (LocalProducer { tx }, rx)
}

/// Receiving endpoint over a std channel.
pub struct LocalConsumer {
    rx: Receiver<Envelope>,
}

impl BusConsumer for LocalConsumer {
    fn recv(&mut self) -> Result<Envelope> {
        self.rx
            .recv()
            .map_err(|_| Error::Bus("bus connection closed".to_string()))
    }
}

/// Sending endpoint over a std channel.
pub struct LocalProducer {
    tx: Sender<Envelope>,
}

impl BusProducer for LocalProducer {
    fn send(&mut self, envelope: Envelope) -> Result<()> {
        self.tx
            .send(envelope)
            .map_err(|_| Error::Bus("bus connection closed".to_string()))
    }
}
