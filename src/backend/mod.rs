//! Device Backends
//!
//! The device-control capability the dispatch loop delegates to. Backends
//! define their own JSON request payload shapes; the loop itself treats
//! payloads as opaque strings.

mod modbus;
mod sim;

pub use modbus::ModbusBackend;
pub use sim::SimBackend;

use crate::config::BackendConfig;
use crate::types::{Error, Result};

/// Device-control operations invoked by the dispatch loop, one per request.
pub trait Backend: Send {
    /// Execute a device command.
    fn command(&mut self, payload: &str) -> Result<()>;

    /// Read a value; returns its textual rendering.
    fn read(&mut self, payload: &str) -> Result<String>;

    /// Write a value.
    fn write(&mut self, payload: &str) -> Result<()>;
}

/// Build the backend selected by configuration.
pub fn from_config(config: &BackendConfig) -> Result<Box<dyn Backend>> {
    match config.protocol.as_str() {
        "sim" => Ok(Box::new(SimBackend::new())),
        "modbus" => Ok(Box::new(ModbusBackend::connect(config)?)),
        other => Err(Error::Config(format!("unknown backend protocol: {}", other))),
    }
}
