//! spanlink agent entry point.
//!
//! Wires the infrastructure together and runs the apply-input task:
//!
//! ```text
//! main()
//!  ├─ load_config()            -- TOML from the platform config dir
//!  ├─ ControllerConnection     -- reconnect loop feeding the event channel
//!  └─ ApplyInputUseCase::run   -- single consumer
//! ```
//!
//! This binary is the headless variant: display enumeration, injection and
//! clipboard are backed by in-process implementations, so it exercises the
//! full handshake and network stack without touching OS input APIs.

use std::net::SocketAddr;
use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};
use std::time::Duration;

use anyhow::Context;
use tokio::sync::mpsc;
use tracing::info;
use tracing_subscriber::EnvFilter;

use spanlink_agent::application::apply_input::{AgentEvent, ApplyInputUseCase, ControllerLink};
use spanlink_agent::infrastructure::clipboard::InMemoryClipboard;
use spanlink_agent::infrastructure::display::{DisplayEnumerator, StaticDisplays};
use spanlink_agent::infrastructure::input_injection::{mock::RecordingInjector, InputInjector};
use spanlink_agent::infrastructure::network::{ControllerConnection, ControllerConnectionConfig};
use spanlink_agent::infrastructure::storage::config::{self, AgentConfig};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = match config::load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("could not load config, using defaults: {e}");
            AgentConfig::default()
        }
    };

    // Structured logging; `RUST_LOG` overrides the config level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cfg.session.log_level.clone())),
        )
        .init();

    info!("spanlink agent starting as {:?}", cfg.session.client_name);

    let running = Arc::new(AtomicBool::new(true));
    let (event_tx, event_rx) = mpsc::channel::<AgentEvent>(128);

    // ── Controller connection ─────────────────────────────────────────────────
    let controller_addr: SocketAddr = format!(
        "{}:{}",
        cfg.network.controller_host, cfg.network.controller_port
    )
    .parse()
    .context("invalid controller address in config")?;
    let connection = Arc::new(ControllerConnection::new(ControllerConnectionConfig {
        controller_addr,
        reconnect_interval: Duration::from_secs(cfg.network.reconnect_interval_secs),
    }));
    Arc::clone(&connection).start(Arc::clone(&running), event_tx.clone());

    // ── Apply-input task ──────────────────────────────────────────────────────
    let displays = StaticDisplays::single_sxga();
    let session = ApplyInputUseCase::new(
        &cfg.session.client_name,
        displays.displays(),
        Arc::clone(&connection) as Arc<dyn ControllerLink>,
        Arc::new(RecordingInjector::new()) as Arc<dyn InputInjector>,
        Arc::new(InMemoryClipboard::new()),
    );
    let session_task = tokio::spawn(session.run(event_rx));

    // ── Ctrl-C handler ────────────────────────────────────────────────────────
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            running_clone.store(false, Ordering::Relaxed);
        }
    });

    info!("agent ready; press Ctrl-C to exit");
    loop {
        tokio::time::sleep(Duration::from_millis(100)).await;
        if !running.load(Ordering::Relaxed) {
            break;
        }
    }

    drop(event_tx);
    // The reconnect loop may still hold its sender clone while parked in
    // connect(); tear the session down directly.
    session_task.abort();
    info!("agent stopped");
    Ok(())
}
