//! Peer registry: the controller's in-memory record of every agent that has
//! connected this session.
//!
//! Agents progress through these states:
//!
//! ```text
//! Connected ──► CheckedIn ──► Disconnected
//! ```
//!
//! - `Connected`: the TCP connection is open but no check-in has arrived, so
//!   the agent has no screens in the topology yet.
//! - `CheckedIn`: the agent announced its display layout and participates in
//!   the shared coordinate space.
//! - `Disconnected`: the connection closed; the entry is kept for logging.

use std::collections::HashMap;
use std::net::SocketAddr;

/// Current state of an agent connection.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PeerState {
    Connected,
    CheckedIn,
    Disconnected,
}

/// Runtime record for one agent, keyed by its remote address.
#[derive(Debug, Clone)]
pub struct PeerRecord {
    pub addr: SocketAddr,
    /// Known after check-in; the topology key for this agent's screens.
    pub client_name: Option<String>,
    pub state: PeerState,
    pub screen_count: usize,
}

/// In-memory registry of all agents seen this session.
#[derive(Debug, Default)]
pub struct PeerRegistry {
    peers: HashMap<SocketAddr, PeerRecord>,
}

impl PeerRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records a freshly accepted connection.
    pub fn connect(&mut self, addr: SocketAddr) {
        self.peers.insert(
            addr,
            PeerRecord {
                addr,
                client_name: None,
                state: PeerState::Connected,
                screen_count: 0,
            },
        );
    }

    /// Records a successful check-in for an already connected peer.
    pub fn check_in(&mut self, addr: SocketAddr, client_name: &str, screen_count: usize) {
        if let Some(peer) = self.peers.get_mut(&addr) {
            peer.client_name = Some(client_name.to_string());
            peer.state = PeerState::CheckedIn;
            peer.screen_count = screen_count;
        }
    }

    /// Marks a peer disconnected and returns its client name, if it had
    /// checked in (the caller removes those screens from the topology).
    pub fn disconnect(&mut self, addr: SocketAddr) -> Option<String> {
        let peer = self.peers.get_mut(&addr)?;
        peer.state = PeerState::Disconnected;
        peer.client_name.clone()
    }

    /// The client name a peer checked in under.
    pub fn client_name(&self, addr: SocketAddr) -> Option<&str> {
        self.peers.get(&addr)?.client_name.as_deref()
    }

    /// Snapshot of all known peers.
    pub fn all(&self) -> Vec<PeerRecord> {
        self.peers.values().cloned().collect()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
