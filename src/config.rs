//! Bridge Configuration
//!
//! Loaded from a TOML file, with environment variable overrides for the
//! connection parameters so deployments can inject credentials without
//! touching the file.

use std::env;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use tracing::warn;

use crate::types::Result;

/// Top-level bridge configuration (commander.toml)
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub bus: BusConfig,
    #[serde(default)]
    pub backend: BackendConfig,
    #[serde(default)]
    pub dispatch: DispatchConfig,
}

/// Message bus connection parameters
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BusConfig {
    /// Broker list, `host:port[,host:port]`
    #[serde(default = "default_brokers")]
    pub brokers: String,
    /// Consumer group id
    #[serde(default = "default_group_id")]
    pub group_id: String,
    /// SASL username; credentials enable SASL/SSL on the connection
    pub username: Option<String>,
    /// SASL password
    pub password: Option<String>,
    /// Request topic; may end in a wildcard marker (`#`)
    #[serde(default = "default_request_topic")]
    pub request_topic: String,
    /// Response topic; every response goes here regardless of request kind
    #[serde(default = "default_response_topic")]
    pub response_topic: String,
}

impl Default for BusConfig {
    fn default() -> Self {
        Self {
            brokers: default_brokers(),
            group_id: default_group_id(),
            username: None,
            password: None,
            request_topic: default_request_topic(),
            response_topic: default_response_topic(),
        }
    }
}

fn default_brokers() -> String {
    "localhost:9092".to_string()
}

fn default_group_id() -> String {
    "commander".to_string()
}

fn default_request_topic() -> String {
    "devices/#".to_string()
}

fn default_response_topic() -> String {
    "devices/Response".to_string()
}

/// Device backend selection and endpoint
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BackendConfig {
    /// Backend protocol: "sim" or "modbus"
    #[serde(default = "default_protocol")]
    pub protocol: String,
    /// Device endpoint, `host:port` (modbus)
    pub address: Option<String>,
    /// Modbus unit/slave id
    pub unit_id: Option<u8>,
}

impl Default for BackendConfig {
    fn default() -> Self {
        Self {
            protocol: default_protocol(),
            address: None,
            unit_id: None,
        }
    }
}

fn default_protocol() -> String {
    "sim".to_string()
}

/// Dispatch loop tuning
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DispatchConfig {
    /// Pacing delay before each receive attempt, in milliseconds
    #[serde(default = "default_poll_interval")]
    pub poll_interval_ms: u64,
}

impl Default for DispatchConfig {
    fn default() -> Self {
        Self {
            poll_interval_ms: default_poll_interval(),
        }
    }
}

fn default_poll_interval() -> u64 {
    1000
}

impl Config {
    /// Load configuration from a TOML file, then apply environment overrides.
    ///
    /// A missing file is not an error; defaults are used instead.
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();

        let mut config = if path.exists() {
            let content = fs::read_to_string(path)?;
            toml::from_str(&content)?
        } else {
            warn!("Config file {} not found, using defaults", path.display());
            Self::default()
        };

        config.apply_env();
        Ok(config)
    }

    /// Environment overrides for connection parameters.
    ///
    /// Reads `COMMANDER_BROKERS`, `COMMANDER_GROUP_ID`, `COMMANDER_USERNAME`,
    /// `COMMANDER_PASSWORD`, `COMMANDER_REQUEST_TOPIC`, `COMMANDER_RESPONSE_TOPIC`.
    fn apply_env(&mut self) {
        if let Ok(v) = env::var("COMMANDER_BROKERS") {
            self.bus.brokers = v;
        }
        if let Ok(v) = env::var("COMMANDER_GROUP_ID") {
            self.bus.group_id = v;
        }
        if let Ok(v) = env::var("COMMANDER_USERNAME") {
            self.bus.username = Some(v);
        }
        if let Ok(v) = env::var("COMMANDER_PASSWORD") {
            self.bus.password = Some(v);
        }
        if let Ok(v) = env::var("COMMANDER_REQUEST_TOPIC") {
            self.bus.request_topic = v;
        }
        if let Ok(v) = env::var("COMMANDER_RESPONSE_TOPIC") {
            self.bus.response_topic = v;
        }
    }
}
