//! Bridge Tests
//!
//! Tests cover:
//! - Connect: config handshake first, then a `true` status
//! - Disconnect: one `false` status per event, no coalescing
//! - Outbound: host events translated and emitted on `message`
//! - Inbound: logged only by default, forwarded unchanged when enabled
//! - Failed emits never reach the host
//! - Loop shutdown once both sides close

use oscport_bridge::{ports, Bridge, BridgeSettings, RelayEvent};
use oscport_core::{ConnectionConfig, Endpoint, OutboundEvent, CONFIG_EVENT, MESSAGE_EVENT};
use oscport_test_utils::{wait_for, MockRelay, TestBridge, DEFAULT_CHECK_INTERVAL, DEFAULT_TIMEOUT};
use serde_json::json;
use std::time::Duration;
use tokio::sync::mpsc;

fn stock_config_payload() -> serde_json::Value {
    json!({
        "server": { "port": 3333, "host": "127.0.0.1" },
        "client": { "port": 3334, "host": "127.0.0.1" }
    })
}

#[tokio::test]
async fn test_connect_sends_config_then_status() {
    let mut bridge = TestBridge::start();

    bridge.connect();

    let status = bridge.next_status().await.expect("No status after connect");
    assert!(status, "Expected true status on connect");

    // The config emit completes before the status is published
    let emits = bridge.relay.emits();
    assert_eq!(emits.len(), 1, "Unexpected emits: {:?}", emits);
    assert_eq!(emits[0].event, CONFIG_EVENT);
    assert_eq!(emits[0].payload, stock_config_payload());
}

#[tokio::test]
async fn test_config_follows_settings() {
    let settings = BridgeSettings {
        connection: ConnectionConfig {
            server: Endpoint::new("192.168.1.10", 9000),
            client: Endpoint::new("192.168.1.10", 9001),
        },
        ..BridgeSettings::default()
    };
    let mut bridge = TestBridge::start_with_settings(settings);

    bridge.connect();
    assert_eq!(bridge.next_status().await, Some(true));

    let config = bridge.relay.emits_named(CONFIG_EVENT);
    assert_eq!(
        config[0].payload,
        json!({
            "server": { "port": 9000, "host": "192.168.1.10" },
            "client": { "port": 9001, "host": "192.168.1.10" }
        })
    );
}

#[tokio::test]
async fn test_disconnect_sends_false() {
    let mut bridge = TestBridge::start();

    bridge.disconnect();
    assert_eq!(bridge.next_status().await, Some(false));
    assert_eq!(bridge.relay.emit_count(), 0);
}

#[tokio::test]
async fn test_repeated_cycles_are_not_coalesced() {
    let mut bridge = TestBridge::start();

    for _ in 0..3 {
        bridge.connect();
        bridge.disconnect();
    }
    bridge.disconnect();

    let mut statuses = Vec::new();
    for _ in 0..7 {
        statuses.push(bridge.next_status().await.expect("Missing status"));
    }
    assert_eq!(statuses, vec![true, false, true, false, true, false, false]);

    // One handshake per connect
    assert_eq!(bridge.relay.emits_named(CONFIG_EVENT).len(), 3);
}

#[tokio::test]
async fn test_outbound_translated_and_emitted() {
    let bridge = TestBridge::start();

    bridge
        .publish(OutboundEvent::new(
            "/synth/freq",
            vec![json!(440)],
            vec![json!(0.5), json!("legato")],
        ))
        .await;

    assert!(bridge.relay.wait_for_emits(1, DEFAULT_TIMEOUT).await);
    let emits = bridge.relay.emits();
    assert_eq!(emits[0].event, MESSAGE_EVENT);
    assert_eq!(
        emits[0].payload,
        json!({ "address": "/synth/freq", "arguments": [440, 0.5, "legato"] })
    );
}

#[tokio::test]
async fn test_outbound_order_preserved() {
    let bridge = TestBridge::start();

    for i in 0..20 {
        bridge
            .publish(OutboundEvent::new(
                format!("/track/{}", i),
                vec![json!(i)],
                vec![],
            ))
            .await;
    }

    assert!(bridge.relay.wait_for_emits(20, DEFAULT_TIMEOUT).await);
    let addresses: Vec<String> = bridge
        .relay
        .emits()
        .into_iter()
        .map(|e| e.payload["address"].as_str().unwrap_or_default().to_string())
        .collect();
    let expected: Vec<String> = (0..20).map(|i| format!("/track/{}", i)).collect();
    assert_eq!(addresses, expected);
}

#[tokio::test]
async fn test_no_outbound_means_only_config() {
    let mut bridge = TestBridge::start();

    bridge.connect();
    assert_eq!(bridge.next_status().await, Some(true));
    bridge.disconnect();
    assert_eq!(bridge.next_status().await, Some(false));

    assert_eq!(bridge.relay.emit_count(), 1);
    assert_eq!(bridge.relay.emits()[0].event, CONFIG_EVENT);
}

#[tokio::test]
async fn test_outbound_sent_without_connect() {
    // No connection-state check before sending
    let bridge = TestBridge::start();

    bridge
        .publish(OutboundEvent::new("/early", vec![], vec![json!(true)]))
        .await;

    assert!(bridge.relay.wait_for_emits(1, DEFAULT_TIMEOUT).await);
    assert_eq!(bridge.relay.emits()[0].event, MESSAGE_EVENT);
}

#[tokio::test]
async fn test_inbound_not_forwarded_by_default() {
    let mut bridge = TestBridge::start();

    bridge.relay_message(json!({ "address": "/fader/1", "args": [0.25] }));
    bridge.relay_message(json!("anything"));
    bridge.disconnect();

    // Events are handled in order, so the messages were seen before this status
    assert_eq!(bridge.next_status().await, Some(false));
    assert!(bridge.host.osc_in.try_recv().is_err());
}

#[tokio::test]
async fn test_inbound_forwarded_unchanged_when_enabled() {
    let settings = BridgeSettings {
        forward_inbound: true,
        ..BridgeSettings::default()
    };
    let mut bridge = TestBridge::start_with_settings(settings);

    let messages = vec![
        json!({ "address": "/fader/1", "args": [0.25] }),
        json!([1, 2, 3]),
        json!(null),
    ];
    for msg in &messages {
        bridge.relay_message(msg.clone());
    }

    for expected in messages {
        assert_eq!(bridge.next_inbound().await, Some(expected));
    }
    assert_eq!(bridge.relay.emit_count(), 0);
}

#[tokio::test]
async fn test_failed_config_emit_still_reports_connected() {
    let mut bridge = TestBridge::start();
    bridge.relay.set_offline(true);

    bridge.connect();
    assert_eq!(bridge.next_status().await, Some(true));
    assert_eq!(bridge.relay.emit_count(), 0);
    assert_eq!(bridge.relay.rejected_count(), 1);
}

#[tokio::test]
async fn test_failed_outbound_emit_is_dropped() {
    let mut bridge = TestBridge::start();
    bridge.relay.set_offline(true);

    bridge
        .publish(OutboundEvent::new("/lost", vec![json!(1)], vec![]))
        .await;
    assert!(
        wait_for(
            || bridge.relay.rejected_count() == 1,
            DEFAULT_CHECK_INTERVAL,
            DEFAULT_TIMEOUT
        )
        .await
    );

    bridge.relay.set_offline(false);
    bridge
        .publish(OutboundEvent::new("/kept", vec![json!(2)], vec![]))
        .await;

    assert!(bridge.relay.wait_for_emits(1, DEFAULT_TIMEOUT).await);
    // Nothing surfaces on the host side
    assert!(bridge.host.osc_connection.try_recv().is_err());
    assert!(bridge.host.osc_in.try_recv().is_err());

    let emits = bridge.relay.emits();
    assert_eq!(emits.len(), 1);
    assert_eq!(emits[0].payload["address"], "/kept");
}

#[tokio::test]
async fn test_keeps_running_while_outbound_open() {
    let mut bridge = TestBridge::start();
    bridge.close_relay();

    assert!(!bridge.join(Duration::from_millis(100)).await);
}

#[tokio::test]
async fn test_run_ends_when_both_sides_close() {
    let relay = MockRelay::new();
    let (app, host) = ports::channel();
    let (events_tx, events_rx) = mpsc::unbounded_channel();

    let handle = Bridge::new(app, relay.clone(), events_rx, BridgeSettings::default()).spawn();

    events_tx.send(RelayEvent::Connected).unwrap();
    drop(events_tx);
    drop(host.osc_out);

    tokio::time::timeout(DEFAULT_TIMEOUT, handle)
        .await
        .expect("Bridge did not stop")
        .expect("Bridge task panicked");

    assert_eq!(relay.emits_named(CONFIG_EVENT).len(), 1);
}
