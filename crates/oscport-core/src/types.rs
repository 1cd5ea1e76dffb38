//! Message and connection types

use serde::{Deserialize, Serialize};
use std::fmt;

use crate::{
    Result, DEFAULT_CLIENT_PORT, DEFAULT_RELAY_HOST, DEFAULT_SERVER_PORT,
};

/// An OSC argument, carried as the JSON the host sent.
///
/// Integers keep their full `u64`/`i64` range and objects keep their key
/// order, so arguments reach the relay exactly as published.
pub use serde_json::Value;

/// An event published by the host application on its outbound port.
///
/// Travels as a three-element array: `[address, fixed_args, extra_args]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OutboundEvent(pub String, pub Vec<Value>, pub Vec<Value>);

impl OutboundEvent {
    pub fn new(address: impl Into<String>, fixed_args: Vec<Value>, extra_args: Vec<Value>) -> Self {
        Self(address.into(), fixed_args, extra_args)
    }

    /// Parse an event from its JSON array form
    pub fn from_json(text: &str) -> Result<Self> {
        Ok(serde_json::from_str(text)?)
    }

    pub fn address(&self) -> &str {
        &self.0
    }

    pub fn fixed_args(&self) -> &[Value] {
        &self.1
    }

    pub fn extra_args(&self) -> &[Value] {
        &self.2
    }

    /// Translate into the relay's message shape.
    ///
    /// The address is kept as is; arguments are the fixed arguments followed
    /// by the extra arguments, in order.
    pub fn into_message(self) -> OscMessage {
        let OutboundEvent(address, mut arguments, extra_args) = self;
        arguments.extend(extra_args);
        OscMessage { address, arguments }
    }
}

impl From<OutboundEvent> for OscMessage {
    fn from(event: OutboundEvent) -> Self {
        event.into_message()
    }
}

/// The message unit exchanged with the relay
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OscMessage {
    pub address: String,
    pub arguments: Vec<Value>,
}

impl OscMessage {
    pub fn new(address: impl Into<String>, arguments: Vec<Value>) -> Self {
        Self {
            address: address.into(),
            arguments,
        }
    }

    /// JSON payload as emitted on the relay socket
    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "address": self.address,
            "arguments": self.arguments,
        })
    }
}

impl fmt::Display for OscMessage {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.to_json())
    }
}

/// A host/port pair
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Endpoint {
    pub port: u16,
    pub host: String,
}

impl Endpoint {
    pub fn new(host: impl Into<String>, port: u16) -> Self {
        Self {
            port,
            host: host.into(),
        }
    }
}

/// Handshake record sent to the relay once per successful connection.
///
/// `server` is where the relay sends OSC, `client` is where the relay
/// listens for OSC coming back.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ConnectionConfig {
    pub server: Endpoint,
    pub client: Endpoint,
}

impl Default for ConnectionConfig {
    fn default() -> Self {
        Self {
            server: Endpoint::new(DEFAULT_RELAY_HOST, DEFAULT_SERVER_PORT),
            client: Endpoint::new(DEFAULT_RELAY_HOST, DEFAULT_CLIENT_PORT),
        }
    }
}

impl ConnectionConfig {
    pub fn to_json(&self) -> Value {
        serde_json::json!({
            "server": { "port": self.server.port, "host": self.server.host },
            "client": { "port": self.client.port, "host": self.client.host },
        })
    }
}

/// Relay connection status as seen by the host
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ConnectionStatus {
    Connected,
    Disconnected,
}

impl ConnectionStatus {
    pub fn is_connected(&self) -> bool {
        matches!(self, ConnectionStatus::Connected)
    }
}

impl From<bool> for ConnectionStatus {
    fn from(connected: bool) -> Self {
        if connected {
            ConnectionStatus::Connected
        } else {
            ConnectionStatus::Disconnected
        }
    }
}

impl From<ConnectionStatus> for bool {
    fn from(status: ConnectionStatus) -> Self {
        status.is_connected()
    }
}
