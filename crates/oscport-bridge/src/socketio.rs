//! Socket.IO relay connection
//!
//! Connects to the relay's discovery URL with the async `rust_socketio`
//! client. Transport is negotiated from scratch on every (re)connect, the
//! client never pins the transport it used last time.
//!
//! A lost link shows up two ways: a server-sent close fires `Event::Close`,
//! while a dead relay or dropped network only ends the engine.io stream and
//! triggers the reconnect hook. Both feed [`LinkState`], which reports each
//! loss once.

use crate::{BridgeError, BridgeSettings, RelayEvent, RelaySocket, Result};
use async_trait::async_trait;
use futures::FutureExt;
use oscport_core::MESSAGE_EVENT;
use rust_socketio::{
    asynchronous::{Client, ClientBuilder, ReconnectSettings},
    Event, Payload, TransportType,
};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

/// Relay connection over Socket.IO
pub struct SocketIoRelay {
    client: Client,
    url: String,
}

impl SocketIoRelay {
    /// Connect to the relay.
    ///
    /// Returns the relay handle and the stream of connection events. The
    /// stream ends once every client callback has been dropped.
    pub async fn connect(
        settings: &BridgeSettings,
    ) -> Result<(Self, mpsc::UnboundedReceiver<RelayEvent>)> {
        let url = settings.relay_url.clone();
        let (tx, rx) = mpsc::unbounded_channel();
        let link = LinkState::new(tx);

        let builder = ClientBuilder::new(url.as_str()).transport_type(TransportType::Any);
        let mut builder = ReconnectPolicy::from_settings(settings).apply(builder);

        let link_conn = link.clone();
        builder = builder.on(Event::Connect, move |_, _| {
            let link = link_conn.clone();
            async move {
                info!("Relay connected");
                link.connected();
            }
            .boxed()
        });

        let link_msg = link.clone();
        builder = builder.on(MESSAGE_EVENT, move |payload, _| {
            let link = link_msg.clone();
            async move {
                link.message(payload_to_json(payload));
            }
            .boxed()
        });

        let link_close = link.clone();
        builder = builder.on(Event::Close, move |_, _| {
            let link = link_close.clone();
            async move {
                warn!("Relay closed the connection");
                link.lost();
            }
            .boxed()
        });

        let link_reconnect = link;
        builder = builder.on_reconnect(move || {
            let link = link_reconnect.clone();
            async move {
                warn!("Relay link lost, reconnecting");
                link.lost();
                ReconnectSettings::new()
            }
            .boxed()
        });

        let client = builder.connect().await.map_err(|e| {
            BridgeError::ConnectionFailed(format!("Socket.IO connect to {} failed: {:?}", url, e))
        })?;

        info!("Relay client started, connecting to {}", url);
        Ok((Self { client, url }, rx))
    }
}

#[async_trait]
impl RelaySocket for SocketIoRelay {
    async fn emit(&self, event: &str, payload: serde_json::Value) -> Result<()> {
        self.client.emit(event, payload).await.map_err(|e| {
            BridgeError::Send(format!("Socket.IO emit to {} failed: {:?}", self.url, e))
        })?;

        debug!("Socket.IO emitted {} to {}", event, self.url);
        Ok(())
    }
}

/// Reconnect behaviour handed to the Socket.IO client
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
struct ReconnectPolicy {
    /// Reconnect after the transport drops
    reconnect: bool,
    /// Also reconnect after the relay closes the session itself
    on_server_close: bool,
}

impl ReconnectPolicy {
    fn from_settings(settings: &BridgeSettings) -> Self {
        Self {
            reconnect: settings.reconnect,
            on_server_close: settings.reconnect,
        }
    }

    fn apply(self, builder: ClientBuilder) -> ClientBuilder {
        builder
            .reconnect(self.reconnect)
            .reconnect_on_disconnect(self.on_server_close)
    }
}

/// Turns client callbacks into relay events, one `Disconnected` per loss
#[derive(Debug, Clone)]
struct LinkState {
    up: Arc<AtomicBool>,
    tx: mpsc::UnboundedSender<RelayEvent>,
}

impl LinkState {
    fn new(tx: mpsc::UnboundedSender<RelayEvent>) -> Self {
        Self {
            up: Arc::new(AtomicBool::new(false)),
            tx,
        }
    }

    fn connected(&self) {
        self.up.store(true, Ordering::SeqCst);
        let _ = self.tx.send(RelayEvent::Connected);
    }

    fn message(&self, obj: serde_json::Value) {
        let _ = self.tx.send(RelayEvent::Message(obj));
    }

    /// Reconnect attempts repeat until one succeeds, only the first counts
    fn lost(&self) {
        if self.up.swap(false, Ordering::SeqCst) {
            let _ = self.tx.send(RelayEvent::Disconnected);
        }
    }
}

/// Convert a Socket.IO payload into the JSON object handed to the host
fn payload_to_json(payload: Payload) -> serde_json::Value {
    match payload {
        Payload::Text(values) => {
            if values.len() == 1 {
                values.into_iter().next().unwrap_or(serde_json::Value::Null)
            } else {
                serde_json::Value::Array(values)
            }
        }
        Payload::Binary(data) => serde_json::Value::Array(
            data.iter()
                .map(|&b| serde_json::Value::Number(b.into()))
                .collect(),
        ),
        _ => serde_json::Value::Null,
    }
}
