//! Relay socket trait definitions

use async_trait::async_trait;

use crate::Result;

/// Events coming from the relay connection
#[derive(Debug, Clone, PartialEq)]
pub enum RelayEvent {
    /// Connection established
    Connected,
    /// Message pushed by the relay, opaque to the bridge
    Message(serde_json::Value),
    /// Connection lost, for whatever reason
    Disconnected,
}

/// Sending half of a relay connection
#[async_trait]
pub trait RelaySocket: Send + Sync {
    /// Emit a named event carrying a JSON payload.
    ///
    /// No acknowledgment is requested. What happens to an emit while the
    /// connection is down is up to the implementation.
    async fn emit(&self, event: &str, payload: serde_json::Value) -> Result<()>;
}

#[async_trait]
impl<T: RelaySocket + ?Sized> RelaySocket for std::sync::Arc<T> {
    async fn emit(&self, event: &str, payload: serde_json::Value) -> Result<()> {
        (**self).emit(event, payload).await
    }
}
