//! oscport Bridge
//!
//! Relays OSC messages between a host application and a local OSC relay
//! process reached over Socket.IO:
//! - host outbound port -> relay `message` events
//! - relay `message` events -> host inbound port (opt-in)
//! - relay connect/disconnect -> host connection port

pub mod bridge;
pub mod config;
pub mod error;
pub mod ports;
pub mod relay;

#[cfg(feature = "socketio")]
pub mod socketio;

pub use bridge::Bridge;
pub use config::BridgeSettings;
pub use error::{BridgeError, Result};
pub use ports::{AppPorts, HostPorts};
pub use relay::{RelayEvent, RelaySocket};

#[cfg(feature = "socketio")]
pub use socketio::SocketIoRelay;
