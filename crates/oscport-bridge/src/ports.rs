//! Host application ports
//!
//! The host application talks to the bridge through three one-way ports:
//! - `oscOut`: host publishes [`OutboundEvent`]s, the bridge consumes them
//! - `oscIn`: the bridge publishes relay-sourced objects, the host consumes them
//! - `oscConnection`: the bridge publishes `true`/`false` on connect/disconnect
//!
//! [`channel`] creates both ends. The bridge-side publishers are unbounded so a
//! publish never waits on the host.

use oscport_core::{ConnectionStatus, OutboundEvent};
use tokio::sync::mpsc;
use tracing::debug;

/// Port names as the host application knows them
pub const OSC_IN_PORT: &str = "oscIn";
pub const OSC_CONNECTION_PORT: &str = "oscConnection";

/// Outbound port buffer size
pub const OSC_OUT_CAPACITY: usize = 100;

/// Bridge-side end of the host ports
#[derive(Debug)]
pub struct AppPorts {
    osc_out: mpsc::Receiver<OutboundEvent>,
    osc_in: mpsc::UnboundedSender<serde_json::Value>,
    osc_connection: mpsc::UnboundedSender<bool>,
}

impl AppPorts {
    /// Next event published by the host, `None` once the host end is dropped
    pub async fn recv_outbound(&mut self) -> Option<OutboundEvent> {
        self.osc_out.recv().await
    }

    /// Publish a relay-sourced object on `oscIn`
    pub fn send_inbound(&self, value: serde_json::Value) {
        if self.osc_in.send(value).is_err() {
            debug!("{} port closed, dropping inbound message", OSC_IN_PORT);
        }
    }

    /// Publish the connection status on `oscConnection`
    pub fn send_connection(&self, status: ConnectionStatus) {
        let connected = bool::from(status);
        if self.osc_connection.send(connected).is_err() {
            debug!("{} port closed, dropping status {}", OSC_CONNECTION_PORT, connected);
        }
    }
}

/// Host-side end of the ports
#[derive(Debug)]
pub struct HostPorts {
    pub osc_out: mpsc::Sender<OutboundEvent>,
    pub osc_in: mpsc::UnboundedReceiver<serde_json::Value>,
    pub osc_connection: mpsc::UnboundedReceiver<bool>,
}

/// Create a connected pair of port ends
pub fn channel() -> (AppPorts, HostPorts) {
    let (out_tx, out_rx) = mpsc::channel(OSC_OUT_CAPACITY);
    let (in_tx, in_rx) = mpsc::unbounded_channel();
    let (conn_tx, conn_rx) = mpsc::unbounded_channel();

    (
        AppPorts {
            osc_out: out_rx,
            osc_in: in_tx,
            osc_connection: conn_tx,
        },
        HostPorts {
            osc_out: out_tx,
            osc_in: in_rx,
            osc_connection: conn_rx,
        },
    )
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_ports_carry_messages() {
        let (mut app, mut host) = channel();

        host.osc_out
            .send(OutboundEvent::new("/a", vec![serde_json::json!(1)], vec![]))
            .await
            .unwrap();
        let event = app.recv_outbound().await.unwrap();
        assert_eq!(event.address(), "/a");

        app.send_connection(ConnectionStatus::Connected);
        app.send_inbound(serde_json::json!({"address": "/b"}));
        assert_eq!(host.osc_connection.recv().await, Some(true));
        assert_eq!(
            host.osc_in.recv().await,
            Some(serde_json::json!({"address": "/b"}))
        );
    }

    #[tokio::test]
    async fn test_publish_after_host_dropped() {
        let (mut app, host) = channel();
        drop(host);

        app.send_connection(ConnectionStatus::Disconnected);
        app.send_inbound(serde_json::Value::Null);
        assert!(app.recv_outbound().await.is_none());
    }
}
