//! Network infrastructure for the controller application.
//!
//! The controller listens for agent TCP connections. Each accepted socket is
//! split: the read half is driven by a per-connection task that decodes
//! frames incrementally and forwards them to the session channel, and the
//! write half is registered with the shared [`PeerLinks`] so the session can
//! send events back out.
//!
//! Framing errors are connection-fatal: the read loop exits and the
//! connection is dropped, with no attempt to resynchronise the stream. Send
//! failures are logged and the message abandoned; there is no retry layer.

use std::collections::HashMap;
use std::net::SocketAddr;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::{
    io::{AsyncReadExt, AsyncWriteExt},
    net::{tcp::OwnedWriteHalf, TcpListener},
    sync::{mpsc, Mutex},
};
use tracing::{debug, error, info, warn};

use spanlink_core::protocol::codec::{decode_frame, encode_message};
use spanlink_core::protocol::messages::WireMessage;

use crate::application::share_input::{EventTransmitter, SessionEvent};

/// Errors raised by the controller's network layer.
#[derive(Debug, Error)]
pub enum NetworkError {
    #[error("bind failed on {addr}: {source}")]
    BindFailed {
        addr: SocketAddr,
        #[source]
        source: std::io::Error,
    },
}

/// Write halves of all currently connected agents, keyed by remote address.
///
/// Shared between the accept loop (which registers connections) and the
/// session (which sends through the [`EventTransmitter`] impl).
pub struct PeerLinks {
    writers: Mutex<HashMap<SocketAddr, OwnedWriteHalf>>,
}

impl PeerLinks {
    fn new() -> Self {
        Self {
            writers: Mutex::new(HashMap::new()),
        }
    }

    async fn register(&self, peer: SocketAddr, writer: OwnedWriteHalf) {
        self.writers.lock().await.insert(peer, writer);
    }

    async fn unregister(&self, peer: SocketAddr) {
        self.writers.lock().await.remove(&peer);
    }

    /// Number of currently connected agents.
    pub async fn connected(&self) -> usize {
        self.writers.lock().await.len()
    }

    async fn write_to(
        writers: &mut HashMap<SocketAddr, OwnedWriteHalf>,
        peer: SocketAddr,
        bytes: &[u8],
    ) -> Result<(), String> {
        let Some(writer) = writers.get_mut(&peer) else {
            return Err(format!("peer {peer} is not connected"));
        };
        writer
            .write_all(bytes)
            .await
            .map_err(|e| format!("send to {peer} failed: {e}"))
    }
}

#[async_trait]
impl EventTransmitter for PeerLinks {
    async fn send_to(&self, peer: SocketAddr, msg: &WireMessage) -> Result<(), String> {
        let bytes = encode_message(msg).map_err(|e| e.to_string())?;
        let mut writers = self.writers.lock().await;
        Self::write_to(&mut writers, peer, &bytes).await
    }

    async fn broadcast(&self, msg: &WireMessage) -> Result<(), String> {
        let bytes = encode_message(msg).map_err(|e| e.to_string())?;
        let mut writers = self.writers.lock().await;
        let peers: Vec<SocketAddr> = writers.keys().copied().collect();
        for peer in peers {
            if let Err(e) = Self::write_to(&mut writers, peer, &bytes).await {
                // Fire-and-forget: the read loop will notice the broken
                // connection and emit the disconnect.
                warn!("{e}");
            }
        }
        Ok(())
    }
}

/// Binds the listener and spawns the accept loop.
///
/// Returns the shared [`PeerLinks`] for outbound sends plus the actually
/// bound address (useful when binding port 0). Every inbound frame and
/// connection lifecycle change is delivered to `session_tx`. Clearing
/// `running` stops the accept loop at the next accepted (or failed)
/// connection attempt.
///
/// # Errors
///
/// Returns [`NetworkError::BindFailed`] when the listen address is
/// unavailable.
pub async fn start_listener(
    addr: SocketAddr,
    session_tx: mpsc::UnboundedSender<SessionEvent>,
    running: Arc<AtomicBool>,
) -> Result<(Arc<PeerLinks>, SocketAddr), NetworkError> {
    let listener = TcpListener::bind(addr)
        .await
        .map_err(|source| NetworkError::BindFailed { addr, source })?;
    let local_addr = listener
        .local_addr()
        .map_err(|source| NetworkError::BindFailed { addr, source })?;
    info!("listening for agents on {local_addr}");

    let links = Arc::new(PeerLinks::new());
    let accept_links = Arc::clone(&links);

    tokio::spawn(async move {
        while running.load(Ordering::Relaxed) {
            let (stream, peer) = match listener.accept().await {
                Ok(accepted) => accepted,
                Err(e) => {
                    error!("accept failed: {e}");
                    continue;
                }
            };
            info!("agent connected from {peer}");

            let (read_half, write_half) = stream.into_split();
            accept_links.register(peer, write_half).await;
            if session_tx
                .send(SessionEvent::PeerConnected { peer })
                .is_err()
            {
                break;
            }

            let links = Arc::clone(&accept_links);
            let tx = session_tx.clone();
            tokio::spawn(async move {
                read_loop(read_half, peer, &tx).await;
                links.unregister(peer).await;
                let _ = tx.send(SessionEvent::PeerDisconnected { peer });
                info!("agent {peer} disconnected");
            });
        }
    });

    Ok((links, local_addr))
}

/// Reads from one agent connection until EOF, error, or bad framing.
async fn read_loop(
    mut reader: tokio::net::tcp::OwnedReadHalf,
    peer: SocketAddr,
    tx: &mpsc::UnboundedSender<SessionEvent>,
) {
    let mut buf: Vec<u8> = Vec::with_capacity(4096);
    let mut chunk = [0u8; 4096];

    loop {
        let n = match reader.read(&mut chunk).await {
            Ok(0) => break, // clean shutdown from the peer
            Ok(n) => n,
            Err(e) => {
                warn!("read error from {peer}: {e}");
                break;
            }
        };
        buf.extend_from_slice(&chunk[..n]);

        loop {
            match decode_frame(&buf) {
                Ok(Some((msg, consumed))) => {
                    buf.drain(..consumed);
                    debug!(%peer, "received {:?}", std::mem::discriminant(&msg));
                    if tx.send(SessionEvent::PeerMessage { peer, msg }).is_err() {
                        return;
                    }
                }
                Ok(None) => break, // need more bytes
                Err(e) => {
                    error!("framing error from {peer}: {e}; closing connection");
                    return;
                }
            }
        }
    }
}
