//! Serial dispatch worker
//!
//! The long-running loop at the core of the bridge: receive one envelope,
//! classify its topic, invoke the matching backend capability, publish the
//! outcome to the response topic. Messages are processed strictly one at a
//! time, in delivery order, and a failed request never stops the loop.

use std::thread;
use std::time::Duration;

use crate::backend::Backend;
use crate::bus::{BusConsumer, BusProducer, Envelope};
use crate::types::Result;

use super::route::{TopicClass, classify, request_token};

/// Payload published for commands and writes that completed normally
pub const SUCCESS_PAYLOAD: &str = "Success";

/// Outcome of dispatching one envelope. Always published, failure included;
/// there is no drop-silently path.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Outcome {
    pub payload: String,
    pub succeeded: bool,
}

impl Outcome {
    fn ok(payload: impl Into<String>) -> Self {
        Self {
            payload: payload.into(),
            succeeded: true,
        }
    }

    fn failed(message: String) -> Self {
        Self {
            payload: message,
            succeeded: false,
        }
    }
}

/// The dispatch loop and the connection handles it owns.
pub struct DispatchWorker<C, P> {
    consumer: C,
    producer: P,
    backend: Box<dyn Backend>,
    base_topic: String,
    response_topic: String,
    idle_delay: Duration,
}

impl<C: BusConsumer, P: BusProducer> DispatchWorker<C, P> {
    pub fn new(
        consumer: C,
        producer: P,
        backend: Box<dyn Backend>,
        base_topic: String,
        response_topic: String,
        idle_delay: Duration,
    ) -> Self {
        Self {
            consumer,
            producer,
            backend,
            base_topic,
            response_topic,
            idle_delay,
        }
    }

    /// Run until the process exits. Every iteration is wrapped in a
    /// recoverable boundary: receive, handler, and publish failures are
    /// logged and the loop moves on to the next message.
    pub fn run(&mut self) {
        tracing::info!("Dispatch worker started (base topic: {})", self.base_topic);

        loop {
            thread::sleep(self.idle_delay);
            self.step();
        }
    }

    /// Consume and dispatch a single envelope. Split out from `run` so tests
    /// can drive the loop one message at a time.
    pub fn step(&mut self) {
        let envelope = match self.consumer.recv() {
            Ok(envelope) => envelope,
            Err(e) => {
                // Nothing was consumed, so no response is owed.
                tracing::error!("Receive failed: {}", e);
                return;
            }
        };

        tracing::info!(
            "Received request with topic: {} and payload: {}",
            envelope.topic,
            envelope.payload
        );

        match request_token(&envelope.topic) {
            Some(token) => tracing::debug!("Correlation token: {}", token),
            None => tracing::debug!("Request topic carries no correlation token"),
        }

        let outcome = self.dispatch(&envelope);
        if !outcome.succeeded {
            tracing::warn!("Request failed, responding with error text");
        }

        if let Err(e) = self.respond(&outcome.payload) {
            tracing::error!("Failed to publish response: {}", e);
        }
    }

    /// Route the envelope and invoke the matching backend capability.
    fn dispatch(&mut self, envelope: &Envelope) -> Outcome {
        let class = classify(&envelope.topic, &self.base_topic);

        let invoked = match class {
            TopicClass::Command => self
                .backend
                .command(&envelope.payload)
                .map(|()| SUCCESS_PAYLOAD.to_string()),
            TopicClass::Read => self.backend.read(&envelope.payload),
            TopicClass::Write => self
                .backend
                .write(&envelope.payload)
                .map(|()| SUCCESS_PAYLOAD.to_string()),
            TopicClass::Unknown => {
                // Unroutable requests still get an (empty) response.
                tracing::error!("Unknown request received: {}", envelope.topic);
                return Outcome::ok(String::new());
            }
        };

        match invoked {
            Ok(payload) => Outcome::ok(payload),
            Err(e) => {
                tracing::error!("{:?} handler failed: {}", class, e);
                Outcome::failed(e.to_string())
            }
        }
    }

    /// Serialize the outcome payload as a JSON string value and publish it
    /// to the fixed response topic.
    fn respond(&mut self, payload: &str) -> Result<()> {
        let body = serde_json::to_string(payload)?;
        self.producer
            .send(Envelope::json(self.response_topic.clone(), body))
    }
}
