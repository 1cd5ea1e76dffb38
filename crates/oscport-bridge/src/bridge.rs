//! The bridge between host ports and the relay
//!
//! One task owns the port set and the relay handle for its whole life and
//! handles every relay event and every outbound port event in arrival
//! order, one at a time. Handlers never wait on the host; relay emits are
//! fire-and-forget and a failed emit is only logged.

use oscport_core::{ConnectionStatus, OutboundEvent, CONFIG_EVENT, MESSAGE_EVENT};
use tokio::sync::mpsc;
use tokio::task::JoinHandle;
use tracing::{debug, info, warn};

use crate::{AppPorts, BridgeSettings, RelayEvent, RelaySocket};

/// Relays between a host application's ports and an OSC relay
pub struct Bridge<R> {
    ports: AppPorts,
    relay: R,
    events: mpsc::UnboundedReceiver<RelayEvent>,
    settings: BridgeSettings,
}

#[cfg(feature = "socketio")]
impl Bridge<crate::SocketIoRelay> {
    /// Connect to the relay named in `settings` and wire it to `ports`
    pub async fn initialize(ports: AppPorts, settings: BridgeSettings) -> crate::Result<Self> {
        let (relay, events) = crate::SocketIoRelay::connect(&settings).await?;
        Ok(Self::new(ports, relay, events, settings))
    }
}

impl<R: RelaySocket> Bridge<R> {
    pub fn new(
        ports: AppPorts,
        relay: R,
        events: mpsc::UnboundedReceiver<RelayEvent>,
        settings: BridgeSettings,
    ) -> Self {
        Self {
            ports,
            relay,
            events,
            settings,
        }
    }

    /// Run until both the relay event stream and the outbound port close
    pub async fn run(mut self) {
        let mut relay_open = true;
        let mut host_open = true;

        info!("Bridge running against {}", self.settings.relay_url);

        loop {
            tokio::select! {
                event = self.events.recv(), if relay_open => match event {
                    Some(event) => self.handle_relay_event(event).await,
                    None => {
                        debug!("Relay event stream closed");
                        relay_open = false;
                    }
                },
                event = self.ports.recv_outbound(), if host_open => match event {
                    Some(event) => self.send_outbound(event).await,
                    None => {
                        debug!("Outbound port closed");
                        host_open = false;
                    }
                },
                else => break,
            }
        }

        info!("Bridge stopped");
    }

    /// Run on a new tokio task
    pub fn spawn(self) -> JoinHandle<()>
    where
        R: 'static,
    {
        tokio::spawn(self.run())
    }

    async fn handle_relay_event(&self, event: RelayEvent) {
        match event {
            RelayEvent::Connected => self.on_connect().await,
            RelayEvent::Message(obj) => self.on_message(obj),
            RelayEvent::Disconnected => self.on_disconnect(),
        }
    }

    /// Send the connection handshake, then report the connection to the host
    pub async fn on_connect(&self) {
        let config = self.settings.connection.to_json();
        if let Err(e) = self.relay.emit(CONFIG_EVENT, config).await {
            warn!("Failed to send relay config: {}", e);
        }
        self.ports.send_connection(ConnectionStatus::Connected);
    }

    /// Log a relay message, forwarding it unchanged when enabled
    pub fn on_message(&self, obj: serde_json::Value) {
        debug!("Relay message: {}", obj);
        if self.settings.forward_inbound {
            self.ports.send_inbound(obj);
        }
    }

    pub fn on_disconnect(&self) {
        self.ports.send_connection(ConnectionStatus::Disconnected);
    }

    /// Translate a host event and emit it on the relay
    pub async fn send_outbound(&self, event: OutboundEvent) {
        let msg = event.into_message();
        debug!("Sending to relay: {}", msg);
        if let Err(e) = self.relay.emit(MESSAGE_EVENT, msg.to_json()).await {
            warn!("Dropped message for {}: {}", msg.address, e);
        }
    }
}
