//! ShareInputUseCase: the controller's session state machine.
//!
//! This use case is the heart of the controller. It is the single consumer of
//! a [`SessionEvent`] channel fed by both the input capture hook and the
//! network read loops, so [`ClientState`] and [`ScreenTopology`] are only
//! ever mutated from one task — no locking is needed around the coordinate
//! update algorithm.
//!
//! It depends only on traits ([`EventTransmitter`], [`CursorController`],
//! [`InputSource`], [`ClipboardAccess`]) and domain types; the network and OS
//! implementations are injected at construction, making the whole hand-off
//! logic unit-testable with recording doubles.

use std::net::SocketAddr;
use std::sync::Arc;

use async_trait::async_trait;
use thiserror::Error;
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use spanlink_core::domain::focus::{ClientState, CursorDirective};
use spanlink_core::domain::screen::VirtualScreen;
use spanlink_core::domain::topology::ScreenTopology;
use spanlink_core::protocol::messages::{CheckIn, ScreenLocation, WireMessage};

use crate::application::registry::PeerRegistry;
use crate::infrastructure::clipboard::ClipboardAccess;
use crate::infrastructure::display::DisplayInfo;
use crate::infrastructure::input_capture::{InputSource, RawInputEvent};

/// Error type for the session use case.
#[derive(Debug, Error)]
pub enum SessionError {
    #[error("transmit failed: {0}")]
    Transmit(String),
}

/// One unit of work for the session task.
#[derive(Debug)]
pub enum SessionEvent {
    /// A raw event from the local input hook.
    Input(RawInputEvent),
    /// An agent's TCP connection was accepted.
    PeerConnected { peer: SocketAddr },
    /// A decoded message arrived from an agent.
    PeerMessage { peer: SocketAddr, msg: WireMessage },
    /// An agent's connection closed (cleanly or not).
    PeerDisconnected { peer: SocketAddr },
}

/// Trait for sending wire messages to connected agents.
///
/// The production implementation writes to TCP sockets; test implementations
/// record calls. Failures are strings because the session only logs them —
/// sends are fire-and-forget and the read loop owns disconnect detection.
#[async_trait]
pub trait EventTransmitter: Send + Sync {
    /// Sends a message to one specific agent.
    async fn send_to(&self, peer: SocketAddr, msg: &WireMessage) -> Result<(), String>;

    /// Sends a message to every connected agent.
    async fn broadcast(&self, msg: &WireMessage) -> Result<(), String>;
}

/// Trait for controlling the physical local cursor.
pub trait CursorController: Send + Sync {
    /// Warps the cursor to (x, y) in local OS coordinates.
    fn move_cursor(&self, x: i32, y: i32);

    /// Current cursor position in local OS coordinates.
    fn cursor_pos(&self) -> (i32, i32);
}

/// The share-input use case.
///
/// Owns the authoritative [`ScreenTopology`] and [`ClientState`] for this
/// machine and decides, per event, what is injected locally, what is
/// forwarded, and when focus hands off.
pub struct ShareInputUseCase {
    state: ClientState,
    topology: ScreenTopology,
    agent_side: ScreenLocation,
    registry: PeerRegistry,
    transmitter: Arc<dyn EventTransmitter>,
    cursor: Arc<dyn CursorController>,
    source: Arc<dyn InputSource>,
    clipboard: Arc<dyn ClipboardAccess>,
}

impl ShareInputUseCase {
    /// Creates the session with the local displays checked into the topology
    /// at their OS coordinates.
    pub fn new(
        client_name: &str,
        displays: &[DisplayInfo],
        agent_side: ScreenLocation,
        transmitter: Arc<dyn EventTransmitter>,
        cursor: Arc<dyn CursorController>,
        source: Arc<dyn InputSource>,
        clipboard: Arc<dyn ClipboardAccess>,
    ) -> Self {
        let mut topology = ScreenTopology::new();
        for d in displays {
            // Local displays anchor the virtual space: virtual == local.
            if topology
                .add_screen(d.x, d.y, d.width, d.height, d.dpi, client_name, d.x, d.y)
                .is_none()
            {
                warn!(
                    x = d.x,
                    y = d.y,
                    width = d.width,
                    height = d.height,
                    "skipping display that overlaps the existing layout"
                );
            }
        }

        let (cx, cy) = cursor.cursor_pos();
        Self {
            state: ClientState::new(client_name, cx, cy),
            topology,
            agent_side,
            registry: PeerRegistry::new(),
            transmitter,
            cursor,
            source,
            clipboard,
        }
    }

    /// True iff this machine currently owns the cursor.
    pub fn focused(&self) -> bool {
        self.state.focused()
    }

    pub fn topology(&self) -> &ScreenTopology {
        &self.topology
    }

    pub fn virtual_position(&self) -> (i32, i32) {
        self.state.virtual_position()
    }

    /// Consumes events until the channel closes.
    pub async fn run(mut self, mut rx: mpsc::UnboundedReceiver<SessionEvent>) {
        while let Some(event) = rx.recv().await {
            if let Err(e) = self.handle_event(event).await {
                warn!("session event failed: {e}");
            }
        }
        info!("session channel closed; stopping");
    }

    /// Handles one session event.
    ///
    /// # Errors
    ///
    /// Returns [`SessionError::Transmit`] when a targeted send fails;
    /// broadcast failures are logged by the transmitter and do not surface.
    pub async fn handle_event(&mut self, event: SessionEvent) -> Result<(), SessionError> {
        match event {
            SessionEvent::Input(raw) => self.handle_input(raw).await,
            SessionEvent::PeerConnected { peer } => {
                self.registry.connect(peer);
                Ok(())
            }
            SessionEvent::PeerMessage { peer, msg } => self.handle_peer_message(peer, msg).await,
            SessionEvent::PeerDisconnected { peer } => {
                if let Some(client) = self.registry.disconnect(peer) {
                    self.remove_peer_screens(&client);
                }
                Ok(())
            }
        }
    }

    // ── Local input path ──────────────────────────────────────────────────────

    async fn handle_input(&mut self, raw: RawInputEvent) -> Result<(), SessionError> {
        match raw {
            RawInputEvent::MouseMove { x, y } => {
                if !self.state.apply_local_delta(&self.topology, x, y) {
                    // Virtual void: the cursor stays local and nothing is sent.
                    return Ok(());
                }
                let directive = self.state.process_virtual_move(&self.topology, false);
                self.apply_directive(directive, true);

                let (vx, vy) = self.state.virtual_position();
                self.broadcast(WireMessage::MouseMove { x: vx, y: vy }).await;
                Ok(())
            }
            RawInputEvent::MouseButton { button, down } => {
                self.forward_if_unfocused(WireMessage::MouseButton { button, down })
                    .await;
                Ok(())
            }
            RawInputEvent::MouseWheel { dx, dy } => {
                self.forward_if_unfocused(WireMessage::MouseWheel { dx, dy })
                    .await;
                Ok(())
            }
            RawInputEvent::Key { key, down } => {
                self.forward_if_unfocused(WireMessage::KeyPress { key, down })
                    .await;
                Ok(())
            }
            RawInputEvent::ClipboardChanged(text) => {
                self.broadcast(WireMessage::Clipboard(text)).await;
                Ok(())
            }
        }
    }

    /// While an agent owns focus, local button/key/wheel events belong to it:
    /// they are swallowed locally and forwarded.
    async fn forward_if_unfocused(&mut self, msg: WireMessage) {
        if self.state.focused() {
            return;
        }
        self.source.suppress_current_event();
        self.broadcast(msg).await;
    }

    // ── Peer message path ─────────────────────────────────────────────────────

    async fn handle_peer_message(
        &mut self,
        peer: SocketAddr,
        msg: WireMessage,
    ) -> Result<(), SessionError> {
        match msg {
            WireMessage::CheckIn(check_in) => self.handle_check_in(peer, check_in).await,
            WireMessage::CheckOut { client } => {
                info!(%peer, client, "agent checked out");
                self.remove_peer_screens(&client);
                Ok(())
            }
            WireMessage::MouseMove { x, y } => {
                self.state.set_virtual_position(x, y);
                let directive = self.state.process_virtual_move(&self.topology, true);
                self.apply_directive(directive, false);
                Ok(())
            }
            WireMessage::Clipboard(text) => {
                self.clipboard.set_text(&text);
                Ok(())
            }
            other => {
                debug!(%peer, "ignoring {:?}", std::mem::discriminant(&other));
                Ok(())
            }
        }
    }

    async fn handle_check_in(
        &mut self,
        peer: SocketAddr,
        check_in: CheckIn,
    ) -> Result<(), SessionError> {
        // A re-check-in (reconnect, changed monitors) replaces the old block.
        if !self.topology.client_screens(&check_in.client).is_empty() {
            self.remove_peer_screens(&check_in.client);
        }

        let placed = match self.agent_side {
            ScreenLocation::Left => self.topology.add_screens_left(&check_in.screens),
            _ => self.topology.add_screens_right(&check_in.screens),
        };
        let Some(placed) = placed else {
            warn!(
                %peer,
                client = check_in.client,
                "check-in rejected: screens overlap the existing layout"
            );
            return Ok(());
        };
        info!(
            %peer,
            client = check_in.client,
            screens = placed.len(),
            "agent checked in"
        );
        self.registry.check_in(peer, &check_in.client, placed.len());

        // Hand the agent the authoritative layout: our own screens at their
        // assigned virtual coordinates, then the side its block was chained
        // on, so it can rebuild the identical topology.
        let own: Vec<VirtualScreen> = self.topology.client_screens(self.state.name()).to_vec();
        let reply = WireMessage::CheckIn(CheckIn {
            client: self.state.name().to_string(),
            screens: own,
        });
        self.transmitter
            .send_to(peer, &reply)
            .await
            .map_err(SessionError::Transmit)?;
        self.transmitter
            .send_to(peer, &WireMessage::MoveScreen(self.agent_side))
            .await
            .map_err(SessionError::Transmit)?;
        Ok(())
    }

    // ── Shared helpers ────────────────────────────────────────────────────────

    fn remove_peer_screens(&mut self, client: &str) {
        match self.topology.remove_client(client) {
            Some(removed) => {
                for screen in &removed {
                    info!(client, x = screen.x, y = screen.y, "removed screen");
                }
                self.reclaim_focus_if_orphaned();
            }
            None => debug!(client, "check-out for unknown client"),
        }
    }

    /// If the virtual cursor was on a departed client's screens, pull it back
    /// onto this machine at the parked local position.
    fn reclaim_focus_if_orphaned(&mut self) {
        let (vx, vy) = self.state.virtual_position();
        if self.topology.valid_virtual_coordinate(vx, vy).is_some() {
            return;
        }
        let Some(own) = self.topology.client_screens(self.state.name()).first() else {
            return;
        };
        let (lx, ly) = self.state.last_position();
        let (home_x, home_y) = (own.x + (lx - own.local_x), own.y + (ly - own.local_y));
        self.state.set_virtual_position(home_x, home_y);
        let directive = self.state.process_virtual_move(&self.topology, true);
        self.apply_directive(directive, false);
        info!("focus reclaimed after peer departure");
    }

    fn apply_directive(&self, directive: CursorDirective, from_hook: bool) {
        if let CursorDirective::Move { x, y, swallow } = directive {
            self.cursor.move_cursor(x, y);
            if swallow && from_hook {
                self.source.suppress_current_event();
            }
        }
    }

    async fn broadcast(&self, msg: WireMessage) {
        if let Err(e) = self.transmitter.broadcast(&msg).await {
            warn!("broadcast failed: {e}");
        }
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
