//! Bridge settings

use oscport_core::{default_relay_url, ConnectionConfig};
use serde::{Deserialize, Serialize};
use std::path::Path;

use crate::Result;

/// Bridge settings
///
/// Every field has a default, so an empty TOML file yields the stock
/// relay setup: discovery on `http://127.0.0.1:8081`, OSC server on port
/// 3333, OSC client on port 3334, inbound forwarding off.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct BridgeSettings {
    /// Relay discovery URL
    #[serde(default = "default_relay_url")]
    pub relay_url: String,
    /// Let the Socket.IO client reconnect on its own
    #[serde(default = "default_true")]
    pub reconnect: bool,
    /// Forward relay messages to the host's `oscIn` port
    #[serde(default)]
    pub forward_inbound: bool,
    /// Handshake sent to the relay on every connect
    #[serde(default)]
    pub connection: ConnectionConfig,
}

fn default_true() -> bool {
    true
}

impl Default for BridgeSettings {
    fn default() -> Self {
        Self {
            relay_url: default_relay_url(),
            reconnect: true,
            forward_inbound: false,
            connection: ConnectionConfig::default(),
        }
    }
}

impl BridgeSettings {
    pub fn from_toml_str(text: &str) -> Result<Self> {
        Ok(toml::from_str(text)?)
    }

    /// Load settings from a TOML file
    pub fn load(path: impl AsRef<Path>) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        Self::from_toml_str(&text)
    }
}
