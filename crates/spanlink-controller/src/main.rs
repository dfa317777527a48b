//! spanlink controller entry point.
//!
//! Wires the infrastructure together and runs the session task:
//!
//! ```text
//! main()
//!  ├─ load_config()          -- TOML from the platform config dir
//!  ├─ start_listener()       -- TCP accept loop feeding the session channel
//!  ├─ input source pump      -- hook events feeding the same channel
//!  └─ ShareInputUseCase::run -- single consumer of both
//! ```
//!
//! This binary is the headless variant: the input source and cursor seams
//! are backed by in-process implementations, so it exercises the full
//! session and network stack without installing OS hooks.

use std::sync::{
    atomic::{AtomicBool, Ordering},
    Arc,
};

use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use spanlink_controller::application::share_input::{
    CursorController, SessionEvent, ShareInputUseCase,
};
use spanlink_controller::infrastructure::clipboard::InMemoryClipboard;
use spanlink_controller::infrastructure::cursor::NullCursor;
use spanlink_controller::infrastructure::display::{DisplayEnumerator, StaticDisplays};
use spanlink_controller::infrastructure::input_capture::{mock::MockInputSource, InputSource};
use spanlink_controller::infrastructure::network::start_listener;
use spanlink_controller::infrastructure::storage::config::{self, ControllerConfig};
use spanlink_core::protocol::messages::ScreenLocation;
use tokio::sync::mpsc;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cfg = match config::load_config() {
        Ok(cfg) => cfg,
        Err(e) => {
            eprintln!("could not load config, using defaults: {e}");
            ControllerConfig::default()
        }
    };

    // Structured logging; `RUST_LOG` overrides the config level.
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(cfg.session.log_level.clone())),
        )
        .init();

    info!("spanlink controller starting as {:?}", cfg.session.client_name);

    let running = Arc::new(AtomicBool::new(true));
    let (session_tx, session_rx) = mpsc::unbounded_channel::<SessionEvent>();

    // ── Network listener ──────────────────────────────────────────────────────
    let addr = format!("{}:{}", cfg.network.bind_address, cfg.network.port).parse()?;
    let (links, _) = start_listener(addr, session_tx.clone(), Arc::clone(&running)).await?;

    // ── Input source pump ─────────────────────────────────────────────────────
    let source: Arc<MockInputSource> = Arc::new(MockInputSource::new());
    let mut hook_rx = source.start()?;
    let hook_tx = session_tx.clone();
    tokio::spawn(async move {
        while let Some(event) = hook_rx.recv().await {
            if hook_tx.send(SessionEvent::Input(event)).is_err() {
                break;
            }
        }
    });

    // ── Session task ──────────────────────────────────────────────────────────
    let agent_side = match cfg.session.agent_side.as_str() {
        "left" => ScreenLocation::Left,
        "right" => ScreenLocation::Right,
        other => {
            warn!("unknown agent_side {other:?}, defaulting to right");
            ScreenLocation::Right
        }
    };
    let displays = StaticDisplays::single_1080p();
    let cursor: Arc<dyn CursorController> = Arc::new(NullCursor::new());
    let session = ShareInputUseCase::new(
        &cfg.session.client_name,
        &displays.displays(),
        agent_side,
        links,
        cursor,
        Arc::clone(&source) as Arc<dyn InputSource>,
        Arc::new(InMemoryClipboard::new()),
    );
    let session_task = tokio::spawn(session.run(session_rx));

    // ── Ctrl-C handler ────────────────────────────────────────────────────────
    let running_clone = Arc::clone(&running);
    tokio::spawn(async move {
        if tokio::signal::ctrl_c().await.is_ok() {
            info!("shutdown signal received");
            running_clone.store(false, Ordering::Relaxed);
        }
    });

    info!("controller ready; press Ctrl-C to exit");
    loop {
        tokio::time::sleep(std::time::Duration::from_millis(100)).await;
        if !running.load(Ordering::Relaxed) {
            break;
        }
    }

    source.stop();
    drop(session_tx);
    // The accept loop may still be parked in accept() holding its channel
    // clone; tear the session down directly.
    session_task.abort();
    info!("controller stopped");
    Ok(())
}
