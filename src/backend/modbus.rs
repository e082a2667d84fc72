//! Modbus/TCP device backend
//!
//! Reads and writes address holding registers, commands drive coils:
//! - read: `{"address": 1000, "count": 2}` (count defaults to 1)
//! - write: `{"address": 1000, "value": 72}`
//! - command: `{"coil": 12, "value": true}`
//!
//! The Modbus client is async; the backend owns a small current-thread
//! runtime so the blocking dispatch worker can drive it synchronously.

use std::net::SocketAddr;

use serde::Deserialize;
use tokio::runtime;
use tokio_modbus::Slave;
use tokio_modbus::client::{Context, Reader, Writer, tcp};

use crate::config::BackendConfig;
use crate::types::{Error, Result};

use super::Backend;

#[derive(Debug, Deserialize)]
struct ReadRequest {
    address: u16,
    #[serde(default = "default_count")]
    count: u16,
}

fn default_count() -> u16 {
    1
}

#[derive(Debug, Deserialize)]
struct WriteRequest {
    address: u16,
    value: u16,
}

#[derive(Debug, Deserialize)]
struct CommandRequest {
    coil: u16,
    value: bool,
}

/// Modbus/TCP connection to a single field device.
pub struct ModbusBackend {
    rt: runtime::Runtime,
    ctx: Context,
}

impl ModbusBackend {
    /// Connect to the device endpoint named in the configuration.
    pub fn connect(config: &BackendConfig) -> Result<Self> {
        let address = config
            .address
            .as_deref()
            .ok_or_else(|| Error::Config("modbus backend requires an address".to_string()))?;
        let socket_addr: SocketAddr = address
            .parse()
            .map_err(|e| Error::Config(format!("invalid backend address {}: {}", address, e)))?;

        let rt = runtime::Builder::new_current_thread().enable_all().build()?;
        let ctx = match config.unit_id {
            Some(unit) => rt
                .block_on(tcp::connect_slave(socket_addr, Slave(unit)))
                .map_err(transport)?,
            None => rt.block_on(tcp::connect(socket_addr)).map_err(transport)?,
        };

        tracing::info!("Connected to Modbus device at {}", socket_addr);
        Ok(Self { rt, ctx })
    }
}

impl Backend for ModbusBackend {
    fn command(&mut self, payload: &str) -> Result<()> {
        let request: CommandRequest = serde_json::from_str(payload)?;
        self.rt
            .block_on(self.ctx.write_single_coil(request.coil, request.value))
            .map_err(transport)?
            .map_err(exception)?;
        tracing::debug!("Set coil {} to {}", request.coil, request.value);
        Ok(())
    }

    fn read(&mut self, payload: &str) -> Result<String> {
        let request: ReadRequest = serde_json::from_str(payload)?;
        let registers = self
            .rt
            .block_on(self.ctx.read_holding_registers(request.address, request.count))
            .map_err(transport)?
            .map_err(exception)?;

        // A single register renders bare, a block as a JSON array.
        Ok(match registers.as_slice() {
            [value] => value.to_string(),
            _ => serde_json::to_string(&registers)?,
        })
    }

    fn write(&mut self, payload: &str) -> Result<()> {
        let request: WriteRequest = serde_json::from_str(payload)?;
        self.rt
            .block_on(self.ctx.write_single_register(request.address, request.value))
            .map_err(transport)?
            .map_err(exception)?;
        tracing::debug!("Wrote {} to register {}", request.value, request.address);
        Ok(())
    }
}

fn transport(e: impl std::fmt::Display) -> Error {
    Error::Modbus(e.to_string())
}

fn exception(e: impl std::fmt::Display) -> Error {
    Error::Modbus(format!("device exception: {}", e))
}
