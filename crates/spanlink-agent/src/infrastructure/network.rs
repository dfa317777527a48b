//! Network infrastructure for the agent.
//!
//! Owns the TCP control channel to the controller and dispatches inbound
//! [`WireMessage`]s to the application layer.
//!
//! Architecture:
//! - `ControllerConnection` owns the TCP stream and a reconnect loop.
//! - Inbound frames are decoded incrementally and forwarded on an `mpsc`
//!   channel as [`AgentEvent`]s.
//! - Outbound messages go through the shared write half.

use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;

use async_trait::async_trait;
use spanlink_core::{decode_frame, encode_message, WireMessage};
use thiserror::Error;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::TcpStream,
    sync::{mpsc, Mutex},
    time,
};
use tracing::{debug, error, info, warn};

use crate::application::apply_input::{AgentEvent, ControllerLink};

/// Errors that can occur in the agent network layer.
#[derive(Debug, Error)]
pub enum AgentNetworkError {
    /// TCP connection to the controller failed.
    #[error("failed to connect to controller at {addr}: {source}")]
    ConnectFailed {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
    /// An I/O error occurred on the established connection.
    #[error("connection I/O error: {0}")]
    Io(#[from] std::io::Error),
    /// The connection is not currently established.
    #[error("not connected to controller")]
    NotConnected,
}

/// Configuration for the agent's connection to the controller.
#[derive(Debug, Clone)]
pub struct ControllerConnectionConfig {
    /// Address of the controller's TCP listener.
    pub controller_addr: SocketAddr,
    /// Reconnect interval when the connection drops.
    pub reconnect_interval: Duration,
}

impl Default for ControllerConnectionConfig {
    fn default() -> Self {
        Self {
            controller_addr: "127.0.0.1:24820".parse().expect("static addr"),
            reconnect_interval: Duration::from_secs(5),
        }
    }
}

/// Manages the TCP control channel from the agent to the controller.
pub struct ControllerConnection {
    config: ControllerConnectionConfig,
    write_half: Arc<Mutex<Option<tokio::net::tcp::OwnedWriteHalf>>>,
}

impl ControllerConnection {
    /// Creates a new (not yet connected) `ControllerConnection`.
    pub fn new(config: ControllerConnectionConfig) -> Self {
        Self {
            config,
            write_half: Arc::new(Mutex::new(None)),
        }
    }

    /// Starts the reconnect loop and begins reading frames.
    ///
    /// Delivers [`AgentEvent`]s on `tx`; other producers (such as a
    /// clipboard watcher) may hold clones of the same sender. The loop runs
    /// until `running` is set to false or the channel closes.
    pub fn start(self: Arc<Self>, running: Arc<AtomicBool>, tx: mpsc::Sender<AgentEvent>) {
        let this = Arc::clone(&self);

        tokio::spawn(async move {
            while running.load(Ordering::Relaxed) {
                match TcpStream::connect(this.config.controller_addr).await {
                    Ok(stream) => {
                        info!("connected to controller at {}", this.config.controller_addr);
                        let (read_half, write_half_owned) = stream.into_split();
                        {
                            let mut guard = this.write_half.lock().await;
                            *guard = Some(write_half_owned);
                        }

                        if tx.send(AgentEvent::Connected).await.is_err() {
                            break;
                        }

                        this.read_loop(read_half, &tx).await;

                        {
                            let mut guard = this.write_half.lock().await;
                            *guard = None;
                        }
                        if tx.send(AgentEvent::Disconnected).await.is_err() {
                            break;
                        }
                        info!(
                            "disconnected from controller; reconnecting in {:?}",
                            this.config.reconnect_interval
                        );
                    }
                    Err(e) => {
                        warn!(
                            "could not connect to controller at {}: {e}",
                            this.config.controller_addr
                        );
                    }
                }

                if running.load(Ordering::Relaxed) {
                    time::sleep(this.config.reconnect_interval).await;
                }
            }
        });
    }

    /// Reads the stream in chunks and drains complete frames from the buffer.
    ///
    /// A framing error is connection-fatal: the buffer offset can no longer
    /// be trusted, so the connection is dropped and re-established.
    async fn read_loop(
        &self,
        mut reader: tokio::net::tcp::OwnedReadHalf,
        tx: &mpsc::Sender<AgentEvent>,
    ) {
        let mut buffer: Vec<u8> = Vec::new();
        let mut chunk = [0u8; 4096];

        loop {
            let n = match reader.read(&mut chunk).await {
                Ok(0) => {
                    debug!("controller closed the connection");
                    return;
                }
                Ok(n) => n,
                Err(e) => {
                    if e.kind() != std::io::ErrorKind::UnexpectedEof {
                        error!("read error on control channel: {e}");
                    }
                    return;
                }
            };
            buffer.extend_from_slice(&chunk[..n]);

            loop {
                match decode_frame(&buffer) {
                    Ok(Some((msg, consumed))) => {
                        buffer.drain(..consumed);
                        if tx.send(AgentEvent::Message(msg)).await.is_err() {
                            return;
                        }
                    }
                    Ok(None) => break,
                    Err(e) => {
                        error!("framing error on control channel: {e}");
                        return;
                    }
                }
            }
        }
    }

    /// Encodes and writes a message on the control channel.
    pub async fn send_message(&self, msg: &WireMessage) -> Result<(), AgentNetworkError> {
        let bytes = match encode_message(msg) {
            Ok(bytes) => bytes,
            Err(e) => {
                error!("failed to encode outbound message: {e}");
                return Ok(());
            }
        };
        let mut guard = self.write_half.lock().await;
        match guard.as_mut() {
            Some(writer) => {
                writer.write_all(&bytes).await?;
                Ok(())
            }
            None => Err(AgentNetworkError::NotConnected),
        }
    }
}

#[async_trait]
impl ControllerLink for ControllerConnection {
    async fn send(&self, msg: &WireMessage) -> Result<(), String> {
        self.send_message(msg).await.map_err(|e| e.to_string())
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_controller_connection_config_default_has_expected_port() {
        let cfg = ControllerConnectionConfig::default();
        assert_eq!(cfg.controller_addr.port(), 24820);
    }

    #[test]
    fn test_controller_connection_config_default_reconnect_interval_is_five_seconds() {
        let cfg = ControllerConnectionConfig::default();
        assert_eq!(cfg.reconnect_interval, Duration::from_secs(5));
    }

    #[tokio::test]
    async fn test_new_controller_connection_write_half_is_none() {
        let conn = ControllerConnection::new(ControllerConnectionConfig::default());

        let guard = conn.write_half.lock().await;
        assert!(guard.is_none(), "write half must be None before connecting");
    }

    #[tokio::test]
    async fn test_send_without_connection_reports_not_connected() {
        let conn = ControllerConnection::new(ControllerConnectionConfig::default());

        let result = conn
            .send_message(&WireMessage::MouseMove { x: 1, y: 2 })
            .await;

        assert!(matches!(result, Err(AgentNetworkError::NotConnected)));
    }

    #[tokio::test]
    async fn test_start_returns_immediately_even_when_unreachable() {
        let cfg = ControllerConnectionConfig {
            // An address that refuses connection immediately.
            controller_addr: "127.0.0.1:1".parse().unwrap(),
            reconnect_interval: Duration::from_secs(60),
        };
        let running = Arc::new(AtomicBool::new(false));
        let conn = Arc::new(ControllerConnection::new(cfg));
        let (tx, rx) = mpsc::channel(8);

        conn.start(Arc::clone(&running), tx);
        drop(rx);
    }
}
