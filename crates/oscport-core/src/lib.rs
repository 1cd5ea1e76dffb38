//! oscport Core
//!
//! Data types shared by the oscport bridge and its hosts:
//! - Argument values ([`Value`], plain JSON)
//! - Host-side outbound events and relay-side OSC messages ([`OutboundEvent`], [`OscMessage`])
//! - The relay connection handshake record ([`ConnectionConfig`])
//! - Connection status as published to the host ([`ConnectionStatus`])

pub mod error;
pub mod types;

pub use error::{Error, Result};
pub use types::*;

/// Host the relay listens on
pub const DEFAULT_RELAY_HOST: &str = "127.0.0.1";

/// Relay discovery (Socket.IO) port
pub const DEFAULT_DISCOVERY_PORT: u16 = 8081;

/// Port the relay sends OSC to
pub const DEFAULT_SERVER_PORT: u16 = 3333;

/// Port the relay listens on for OSC
pub const DEFAULT_CLIENT_PORT: u16 = 3334;

/// Event name carrying the [`ConnectionConfig`] handshake
pub const CONFIG_EVENT: &str = "config";

/// Event name carrying OSC messages in both directions
pub const MESSAGE_EVENT: &str = "message";

/// Default relay discovery URL
pub fn default_relay_url() -> String {
    format!("http://{}:{}", DEFAULT_RELAY_HOST, DEFAULT_DISCOVERY_PORT)
}
