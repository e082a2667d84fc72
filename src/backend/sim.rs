//! Simulated device backend
//!
//! Keeps an in-process table of node values so the bridge can run against a
//! bench setup with no field hardware attached. Requests address nodes by
//! string id, e.g. `{"node": "ns=2;s=Temp", "value": 21}`.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::types::{Error, Result};

use super::Backend;

#[derive(Debug, Deserialize)]
struct NodeRequest {
    node: String,
    #[serde(default)]
    value: Option<Value>,
}

/// In-process node table standing in for a field device.
#[derive(Debug, Default)]
pub struct SimBackend {
    nodes: HashMap<String, Value>,
    /// Node ids of executed commands, in order
    commands: Vec<String>,
}

impl SimBackend {
    pub fn new() -> Self {
        Self::default()
    }

    /// Backend pre-populated with node values.
    pub fn with_nodes(nodes: impl IntoIterator<Item = (String, Value)>) -> Self {
        Self {
            nodes: nodes.into_iter().collect(),
            commands: Vec::new(),
        }
    }

    /// Current value of a node, if present.
    pub fn node(&self, id: &str) -> Option<&Value> {
        self.nodes.get(id)
    }

    /// Commands executed so far.
    pub fn commands(&self) -> &[String] {
        &self.commands
    }
}

impl Backend for SimBackend {
    fn command(&mut self, payload: &str) -> Result<()> {
        let request: NodeRequest = serde_json::from_str(payload)?;
        if let Some(value) = request.value {
            self.nodes.insert(request.node.clone(), value);
        }
        tracing::debug!("Executed command on node {}", request.node);
        self.commands.push(request.node);
        Ok(())
    }

    fn read(&mut self, payload: &str) -> Result<String> {
        let request: NodeRequest = serde_json::from_str(payload)?;
        let value = self
            .nodes
            .get(&request.node)
            .ok_or_else(|| Error::NotFound(request.node.clone()))?;
        Ok(value.to_string())
    }

    fn write(&mut self, payload: &str) -> Result<()> {
        let request: NodeRequest = serde_json::from_str(payload)?;
        let value = request
            .value
            .ok_or_else(|| Error::Backend("write request is missing a value".to_string()))?;
        self.nodes.insert(request.node, value);
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn backend() -> SimBackend {
        SimBackend::with_nodes([("ns=2;s=Temp".to_string(), json!(21.5))])
    }

    #[test]
    fn test_read_returns_json_rendering() {
        let mut backend = backend();
        let value = backend.read(r#"{"node":"ns=2;s=Temp"}"#).unwrap();
        assert_eq!(value, "21.5");
    }

    #[test]
    fn test_read_unknown_node_fails() {
        let mut backend = backend();
        let err = backend.read(r#"{"node":"ns=9;s=Missing"}"#).unwrap_err();
        assert_eq!(err.to_string(), "Not found: ns=9;s=Missing");
    }

    #[test]
    fn test_write_then_read() {
        let mut backend = backend();
        backend
            .write(r#"{"node":"ns=2;s=Setpoint","value":72}"#)
            .unwrap();
        assert_eq!(backend.read(r#"{"node":"ns=2;s=Setpoint"}"#).unwrap(), "72");
    }

    #[test]
    fn test_write_without_value_fails() {
        let mut backend = backend();
        assert!(backend.write(r#"{"node":"ns=2;s=Temp"}"#).is_err());
    }

    #[test]
    fn test_command_is_recorded() {
        let mut backend = backend();
        backend
            .command(r#"{"node":"ns=2;s=Fan","value":true}"#)
            .unwrap();
        assert_eq!(backend.commands(), ["ns=2;s=Fan"]);
        assert_eq!(backend.node("ns=2;s=Fan"), Some(&json!(true)));
    }

    #[test]
    fn test_malformed_payload_fails() {
        let mut backend = backend();
        assert!(backend.command("not json").is_err());
    }
}
