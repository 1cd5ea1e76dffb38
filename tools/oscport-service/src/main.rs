//! oscport Service
//!
//! Runs the bridge with the host application's ports on stdio:
//! - stdin: one outbound event per line, `["/synth/freq", [440], [0.5, "legato"]]`
//! - stdout: one line per port publish, `{"port":"oscConnection","value":true}`
//!
//! Logs go to stderr.

use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::Parser;
use oscport_bridge::{ports, Bridge, BridgeSettings, HostPorts};
use oscport_core::OutboundEvent;
use serde::Serialize;
use tokio::io::{AsyncBufReadExt, AsyncWriteExt, BufReader};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};
use tracing_subscriber::EnvFilter;

#[derive(Parser)]
#[command(name = "oscport-service")]
#[command(about = "Bridge OSC between stdio ports and a Socket.IO relay")]
#[command(version)]
struct Cli {
    /// Settings file (TOML)
    #[arg(short, long)]
    config: Option<PathBuf>,

    /// Relay discovery URL
    #[arg(short, long)]
    relay_url: Option<String>,

    /// Forward relay messages to the oscIn port
    #[arg(short, long)]
    forward_inbound: bool,

    /// Enable verbose logging
    #[arg(short, long)]
    verbose: bool,
}

/// A publish on one of the host-bound ports
#[derive(Debug, Serialize)]
#[serde(tag = "port", content = "value")]
enum PortMessage {
    #[serde(rename = "oscConnection")]
    Connection(bool),
    #[serde(rename = "oscIn")]
    Inbound(serde_json::Value),
}

fn settings_from(cli: &Cli) -> Result<BridgeSettings> {
    let mut settings = match &cli.config {
        Some(path) => BridgeSettings::load(path)
            .with_context(|| format!("Failed to load settings from {}", path.display()))?,
        None => BridgeSettings::default(),
    };

    if let Some(url) = &cli.relay_url {
        settings.relay_url = url.clone();
    }
    if cli.forward_inbound {
        settings.forward_inbound = true;
    }

    Ok(settings)
}

/// Write host-bound port publishes to stdout until both ports close
async fn write_ports(
    mut osc_in: mpsc::UnboundedReceiver<serde_json::Value>,
    mut osc_connection: mpsc::UnboundedReceiver<bool>,
) -> Result<()> {
    let mut stdout = tokio::io::stdout();
    let mut in_open = true;
    let mut connection_open = true;

    loop {
        let msg = tokio::select! {
            value = osc_in.recv(), if in_open => match value {
                Some(value) => PortMessage::Inbound(value),
                None => {
                    in_open = false;
                    continue;
                }
            },
            status = osc_connection.recv(), if connection_open => match status {
                Some(status) => PortMessage::Connection(status),
                None => {
                    connection_open = false;
                    continue;
                }
            },
            else => break,
        };

        let json = serde_json::to_string(&msg)?;
        stdout.write_all(json.as_bytes()).await?;
        stdout.write_all(b"\n").await?;
        stdout.flush().await?;
    }

    Ok(())
}

/// Feed stdin lines to the outbound port until EOF or interrupt
async fn read_outbound(osc_out: mpsc::Sender<OutboundEvent>) -> Result<()> {
    let mut lines = BufReader::new(tokio::io::stdin()).lines();

    loop {
        let line = tokio::select! {
            line = lines.next_line() => line?,
            _ = tokio::signal::ctrl_c() => {
                info!("Interrupted, shutting down");
                return Ok(());
            }
        };

        let Some(line) = line else {
            info!("EOF received, shutting down");
            return Ok(());
        };

        let trimmed = line.trim();
        if trimmed.is_empty() {
            continue;
        }

        debug!("Received: {}", trimmed);
        match OutboundEvent::from_json(trimmed) {
            Ok(event) => {
                if osc_out.send(event).await.is_err() {
                    warn!("Bridge stopped, no longer reading stdin");
                    return Ok(());
                }
            }
            Err(e) => warn!("Skipping malformed outbound event: {}", e),
        }
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let filter = if cli.verbose {
        EnvFilter::new("debug")
    } else {
        EnvFilter::from_default_env().add_directive(tracing::Level::INFO.into())
    };
    tracing_subscriber::fmt()
        .with_writer(std::io::stderr)
        .with_env_filter(filter)
        .init();

    let settings = settings_from(&cli)?;
    info!("Starting oscport service, relay at {}", settings.relay_url);

    let (app, host) = ports::channel();
    let HostPorts {
        osc_out,
        osc_in,
        osc_connection,
    } = host;

    let bridge = Bridge::initialize(app, settings).await?;
    let bridge_handle = bridge.spawn();
    let writer_handle = tokio::spawn(write_ports(osc_in, osc_connection));

    read_outbound(osc_out).await?;

    // The relay keeps the bridge alive, so stop it once the host is gone
    bridge_handle.abort();
    let _ = bridge_handle.await;
    writer_handle.await??;

    info!("oscport service stopped");
    Ok(())
}
