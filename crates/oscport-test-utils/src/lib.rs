//! Common test helpers for oscport tests
//!
//! This crate provides:
//! - An in-memory relay that records emits ([`MockRelay`])
//! - A running bridge wired to that relay, cleaned up on drop ([`TestBridge`])
//! - Timeout-bounded receive and condition-based waiting

use async_trait::async_trait;
use oscport_bridge::{ports, Bridge, BridgeError, BridgeSettings, HostPorts, RelayEvent, RelaySocket};
use oscport_core::OutboundEvent;
use parking_lot::Mutex;
use std::sync::atomic::{AtomicBool, AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::mpsc;
use tokio::time::timeout;

/// Default test timeout
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(5);

/// Default condition check interval
pub const DEFAULT_CHECK_INTERVAL: Duration = Duration::from_millis(10);

// ============================================================================
// Waiting
// ============================================================================

/// Wait for a condition with timeout
pub async fn wait_for<F>(check: F, interval: Duration, max_wait: Duration) -> bool
where
    F: Fn() -> bool,
{
    let start = Instant::now();
    while start.elapsed() < max_wait {
        if check() {
            return true;
        }
        tokio::time::sleep(interval).await;
    }
    check()
}

/// Receive the next value, or `None` on timeout or closed channel
pub async fn recv_timeout<T>(rx: &mut mpsc::UnboundedReceiver<T>, max_wait: Duration) -> Option<T> {
    timeout(max_wait, rx.recv()).await.ok().flatten()
}

// ============================================================================
// Mock Relay
// ============================================================================

/// One recorded relay emit
#[derive(Debug, Clone, PartialEq)]
pub struct Emit {
    pub event: String,
    pub payload: serde_json::Value,
}

/// In-memory relay socket. Clones share the same record.
#[derive(Debug, Clone, Default)]
pub struct MockRelay {
    emits: Arc<Mutex<Vec<Emit>>>,
    offline: Arc<AtomicBool>,
    rejected: Arc<AtomicUsize>,
}

impl MockRelay {
    pub fn new() -> Self {
        Self::default()
    }

    /// Everything emitted so far, in order
    pub fn emits(&self) -> Vec<Emit> {
        self.emits.lock().clone()
    }

    /// Emits with the given event name
    pub fn emits_named(&self, event: &str) -> Vec<Emit> {
        self.emits
            .lock()
            .iter()
            .filter(|e| e.event == event)
            .cloned()
            .collect()
    }

    pub fn emit_count(&self) -> usize {
        self.emits.lock().len()
    }

    /// Number of emits refused while offline
    pub fn rejected_count(&self) -> usize {
        self.rejected.load(Ordering::SeqCst)
    }

    /// Make every emit fail until switched back
    pub fn set_offline(&self, offline: bool) {
        self.offline.store(offline, Ordering::SeqCst);
    }

    /// Wait until at least `count` emits have been recorded
    pub async fn wait_for_emits(&self, count: usize, max_wait: Duration) -> bool {
        wait_for(|| self.emit_count() >= count, DEFAULT_CHECK_INTERVAL, max_wait).await
    }
}

#[async_trait]
impl RelaySocket for MockRelay {
    async fn emit(&self, event: &str, payload: serde_json::Value) -> oscport_bridge::Result<()> {
        if self.offline.load(Ordering::SeqCst) {
            self.rejected.fetch_add(1, Ordering::SeqCst);
            return Err(BridgeError::Send("relay offline".to_string()));
        }
        self.emits.lock().push(Emit {
            event: event.to_string(),
            payload,
        });
        Ok(())
    }
}

// ============================================================================
// Test Bridge - RAII wrapper with proper cleanup
// ============================================================================

/// A bridge running against a [`MockRelay`], aborted on drop
pub struct TestBridge {
    pub relay: MockRelay,
    pub host: HostPorts,
    events: Option<mpsc::UnboundedSender<RelayEvent>>,
    handle: Option<tokio::task::JoinHandle<()>>,
}

impl TestBridge {
    /// Start a bridge with default settings
    pub fn start() -> Self {
        Self::start_with_settings(BridgeSettings::default())
    }

    /// Start a bridge with custom settings
    pub fn start_with_settings(settings: BridgeSettings) -> Self {
        let relay = MockRelay::new();
        let (app, host) = ports::channel();
        let (events_tx, events_rx) = mpsc::unbounded_channel();

        let handle = Bridge::new(app, relay.clone(), events_rx, settings).spawn();

        Self {
            relay,
            host,
            events: Some(events_tx),
            handle: Some(handle),
        }
    }

    /// Inject a relay event
    pub fn relay_event(&self, event: RelayEvent) {
        if let Some(tx) = &self.events {
            let _ = tx.send(event);
        }
    }

    pub fn connect(&self) {
        self.relay_event(RelayEvent::Connected);
    }

    pub fn disconnect(&self) {
        self.relay_event(RelayEvent::Disconnected);
    }

    pub fn relay_message(&self, obj: serde_json::Value) {
        self.relay_event(RelayEvent::Message(obj));
    }

    /// Publish on the host's outbound port
    pub async fn publish(&self, event: OutboundEvent) {
        let _ = self.host.osc_out.send(event).await;
    }

    /// Next status published to the host
    pub async fn next_status(&mut self) -> Option<bool> {
        recv_timeout(&mut self.host.osc_connection, DEFAULT_TIMEOUT).await
    }

    /// Next relay object forwarded to the host
    pub async fn next_inbound(&mut self) -> Option<serde_json::Value> {
        recv_timeout(&mut self.host.osc_in, DEFAULT_TIMEOUT).await
    }

    /// Close the relay event stream
    pub fn close_relay(&mut self) {
        self.events = None;
    }

    /// Wait for the bridge task to finish
    pub async fn join(&mut self, max_wait: Duration) -> bool {
        let Some(mut handle) = self.handle.take() else {
            return true;
        };
        if timeout(max_wait, &mut handle).await.is_ok() {
            true
        } else {
            self.handle = Some(handle);
            false
        }
    }

    /// Stop the bridge explicitly (also happens on drop)
    pub fn stop(&mut self) {
        if let Some(handle) = self.handle.take() {
            handle.abort();
        }
    }
}

impl Drop for TestBridge {
    fn drop(&mut self) {
        self.stop();
    }
}
