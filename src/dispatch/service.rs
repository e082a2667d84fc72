//! Bridge startup
//!
//! Connects the bus endpoints and the device backend on the caller's thread,
//! then hands them to a dedicated worker thread running the dispatch loop.
//! Startup returns as soon as the worker is launched.

use std::thread;
use std::time::Duration;

use crate::backend;
use crate::bus::kafka;
use crate::config::Config;
use crate::types::{Error, Result};

use super::worker::DispatchWorker;

/// Handle to the running bridge.
///
/// The worker has no stop signal; it runs until the process exits. The
/// handle exists so the caller owns the thread rather than detaching it.
pub struct Bridge {
    #[allow(dead_code)]
    worker_handle: thread::JoinHandle<()>,
}

impl Bridge {
    /// Connect everything and spawn the dispatch worker.
    pub fn start(config: &Config) -> Result<Self> {
        let (consumer, producer) = kafka::connect(&config.bus)?;
        let backend = backend::from_config(&config.backend)?;

        let mut worker = DispatchWorker::new(
            consumer,
            producer,
            backend,
            config.bus.request_topic.clone(),
            config.bus.response_topic.clone(),
            Duration::from_millis(config.dispatch.poll_interval_ms),
        );

        let worker_handle = thread::Builder::new()
            .name("dispatch-worker".to_string())
            .spawn(move || worker.run())
            .map_err(|e| Error::Service(format!("Failed to spawn dispatch worker: {}", e)))?;

        tracing::info!(
            "Bridge started ({} backend, responses to {})",
            config.backend.protocol,
            config.bus.response_topic
        );

        Ok(Self { worker_handle })
    }
}
