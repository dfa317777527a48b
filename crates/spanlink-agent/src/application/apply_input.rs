//! ApplyInputUseCase: drives the agent's cursor and input from the controller.
//!
//! The agent runs the same focus state machine as the controller, but feeds
//! it virtual positions received off the wire instead of hook deltas. On
//! connect it announces its displays; the controller answers with its own
//! layout plus a placement hint, from which the agent rebuilds the identical
//! virtual topology. From then on every received mouse move is folded into
//! the shared virtual position and the resulting directive is injected into
//! the local OS.

use std::sync::Arc;

use async_trait::async_trait;
use spanlink_core::{
    CheckIn, ClientState, CursorDirective, ScreenLocation, ScreenTopology, WireMessage,
};
use tokio::sync::mpsc;
use tracing::{debug, info, warn};

use crate::infrastructure::clipboard::ClipboardAccess;
use crate::infrastructure::display::{check_in_screens, DisplayInfo};
use crate::infrastructure::input_injection::InputInjector;

/// Events feeding the use case: the network link plus local clipboard polling.
#[derive(Debug)]
pub enum AgentEvent {
    /// The control channel to the controller came up.
    Connected,
    /// A decoded message arrived from the controller.
    Message(WireMessage),
    /// The control channel dropped.
    Disconnected,
    /// The local clipboard changed and should be shared.
    ClipboardChanged(String),
}

/// Outbound path back to the controller.
#[async_trait]
pub trait ControllerLink: Send + Sync {
    async fn send(&self, msg: &WireMessage) -> Result<(), String>;
}

/// The Apply Input use case.
///
/// Owns the agent-side topology and focus state and applies controller
/// traffic to the local machine through the [`InputInjector`] seam.
pub struct ApplyInputUseCase {
    client_name: String,
    displays: Vec<DisplayInfo>,
    state: ClientState,
    topology: ScreenTopology,
    /// Controller check-in held until the placement hint arrives.
    pending_check_in: Option<CheckIn>,
    controller: Option<String>,
    link: Arc<dyn ControllerLink>,
    injector: Arc<dyn InputInjector>,
    clipboard: Arc<dyn ClipboardAccess>,
}

impl ApplyInputUseCase {
    pub fn new(
        client_name: impl Into<String>,
        displays: Vec<DisplayInfo>,
        link: Arc<dyn ControllerLink>,
        injector: Arc<dyn InputInjector>,
        clipboard: Arc<dyn ClipboardAccess>,
    ) -> Self {
        let client_name = client_name.into();
        let mut this = Self {
            state: ClientState::new(&client_name, 0, 0),
            client_name,
            displays,
            topology: ScreenTopology::new(),
            pending_check_in: None,
            controller: None,
            link,
            injector,
            clipboard,
        };
        this.reset_session();
        this
    }

    /// True iff the shared cursor currently rests on this machine.
    pub fn focused(&self) -> bool {
        self.state.focused()
    }

    pub fn topology(&self) -> &ScreenTopology {
        &self.topology
    }

    /// Consumes events until every sender is dropped.
    pub async fn run(mut self, mut rx: mpsc::Receiver<AgentEvent>) {
        while let Some(event) = rx.recv().await {
            self.handle_event(event).await;
        }
        debug!("agent event channel closed; session loop exiting");
    }

    async fn handle_event(&mut self, event: AgentEvent) {
        match event {
            AgentEvent::Connected => self.handle_connected().await,
            AgentEvent::Disconnected => {
                info!("control channel lost; reverting to standalone layout");
                self.reset_session();
            }
            AgentEvent::Message(msg) => self.handle_message(msg).await,
            AgentEvent::ClipboardChanged(text) => {
                if let Err(e) = self.link.send(&WireMessage::Clipboard(text)).await {
                    warn!("failed to share clipboard with controller: {e}");
                }
            }
        }
    }

    /// Announces this machine's displays. Virtual coordinates are zeroed;
    /// the controller assigns real ones and answers with its own layout.
    async fn handle_connected(&mut self) {
        self.reset_session();

        let check_in = CheckIn {
            client: self.client_name.clone(),
            screens: check_in_screens(&self.client_name, &self.displays),
        };
        info!(
            screens = check_in.screens.len(),
            "connected; checking in as {}", self.client_name
        );
        if let Err(e) = self.link.send(&WireMessage::CheckIn(check_in)).await {
            warn!("failed to send check-in: {e}");
        }
    }

    async fn handle_message(&mut self, msg: WireMessage) {
        // Input frames are only meaningful inside an established session;
        // anything arriving before the handshake (or after a check-out) is
        // dropped rather than injected into a standalone layout.
        if self.controller.is_none() && msg_is_input(&msg) {
            debug!("input frame outside an established session ignored");
            return;
        }
        match msg {
            WireMessage::CheckIn(check_in) => {
                debug!(
                    controller = %check_in.client,
                    screens = check_in.screens.len(),
                    "controller layout received; awaiting placement hint"
                );
                self.pending_check_in = Some(check_in);
            }
            WireMessage::MoveScreen(side) => self.handle_layout(side),
            WireMessage::MouseMove { x, y } => {
                self.state.set_virtual_position(x, y);
                let directive = self.state.process_virtual_move(&self.topology, true);
                self.apply_directive(directive);
            }
            WireMessage::MouseButton { button, down } => {
                if self.state.focused() {
                    if let Err(e) = self.injector.mouse_button(button, down) {
                        warn!("button injection failed: {e}");
                    }
                }
            }
            WireMessage::MouseWheel { dx, dy } => {
                if self.state.focused() {
                    if let Err(e) = self.injector.mouse_wheel(dx, dy) {
                        warn!("wheel injection failed: {e}");
                    }
                }
            }
            WireMessage::KeyPress { key, down } => {
                if self.state.focused() {
                    if let Err(e) = self.injector.key(key, down) {
                        warn!("key injection failed: {e}");
                    }
                }
            }
            WireMessage::Clipboard(text) => {
                debug!(len = text.len(), "clipboard received from controller");
                self.clipboard.set_text(&text);
            }
            WireMessage::CheckOut { client } => {
                if self.controller.as_deref() == Some(client.as_str()) {
                    info!(controller = %client, "controller checked out");
                    self.reset_session();
                } else {
                    debug!(client = %client, "check-out for unknown peer ignored");
                }
            }
        }
    }

    /// Rebuilds the shared topology from the stashed controller check-in and
    /// the placement hint, then hands the cursor to the controller.
    fn handle_layout(&mut self, side: ScreenLocation) {
        let Some(check_in) = self.pending_check_in.take() else {
            warn!("placement hint received before controller check-in; ignoring");
            return;
        };

        let mut topology = ScreenTopology::new();
        for s in &check_in.screens {
            if topology
                .add_screen(s.x, s.y, s.width, s.height, s.dpi, &s.client, s.local_x, s.local_y)
                .is_none()
            {
                warn!(controller = %check_in.client, "controller announced an overlapping layout; ignoring");
                return;
            }
        }

        let own = check_in_screens(&self.client_name, &self.displays);
        let placed = match side {
            ScreenLocation::Left => topology.add_screens_left(&own),
            ScreenLocation::Right | ScreenLocation::None => topology.add_screens_right(&own),
        };
        if placed.is_none() {
            warn!("own screens could not be placed next to the controller layout");
            return;
        }

        info!(
            controller = %check_in.client,
            side = ?side,
            total_screens = topology.len(),
            "virtual topology established"
        );
        self.topology = topology;
        self.controller = Some(check_in.client.clone());

        // The controller owns the cursor after the handshake. Start the
        // virtual cursor on its first screen and let the state machine park
        // ours.
        self.state = ClientState::new(&self.client_name, 0, 0);
        if let Some(first) = self.topology.client_screens(&check_in.client).first() {
            self.state.set_virtual_position(first.x, first.y);
        }
        let directive = self.state.process_virtual_move(&self.topology, false);
        self.apply_directive(directive);
    }

    /// Drops back to a standalone single-machine layout: own screens at
    /// their local coordinates, cursor owned locally.
    fn reset_session(&mut self) {
        let mut topology = ScreenTopology::new();
        for d in &self.displays {
            topology.add_screen(d.x, d.y, d.width, d.height, d.dpi, &self.client_name, d.x, d.y);
        }
        self.topology = topology;
        self.pending_check_in = None;
        self.controller = None;

        let (x, y) = self
            .displays
            .first()
            .map(|d| (d.x, d.y))
            .unwrap_or((0, 0));
        self.state = ClientState::new(&self.client_name, x, y);
    }

    fn apply_directive(&self, directive: CursorDirective) {
        if let CursorDirective::Move { x, y, .. } = directive {
            if let Err(e) = self.injector.move_cursor(x, y) {
                warn!("cursor injection failed: {e}");
            }
        }
    }
}

fn msg_is_input(msg: &WireMessage) -> bool {
    matches!(
        msg,
        WireMessage::MouseMove { .. }
            | WireMessage::MouseButton { .. }
            | WireMessage::MouseWheel { .. }
            | WireMessage::KeyPress { .. }
    )
}

// ── Tests ─────────────────────────────────────────────────────────────────────
