//! Focus hand-off state machine.
//!
//! One [`ClientState`] exists per running machine. Both roles drive it with
//! the same two-step update: fold a position change into the shared virtual
//! coordinate first, then ask [`process_virtual_move`] what the local OS
//! cursor should do about it. The controller feeds it raw hook deltas; an
//! agent feeds it virtual positions received off the wire. Running the same
//! machine on both ends is what makes the hand-off converge instead of
//! oscillating.
//!
//! [`process_virtual_move`]: ClientState::process_virtual_move

use tracing::trace;

use crate::domain::topology::ScreenTopology;

/// What the caller should do with the local OS cursor after a virtual-space
/// move has been folded into [`ClientState`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorDirective {
    /// Nothing to do; the OS cursor is already where it belongs.
    None,
    /// Warp the OS cursor to local pixel `(x, y)`.
    ///
    /// When `swallow` is true the triggering hook event must also be
    /// suppressed, so the OS never acts on the stale pre-warp position. This
    /// is what stops the cursor visibly rubber-banding on a focus change.
    Move { x: i32, y: i32, swallow: bool },
}

/// Per-machine focus and cursor-position tracker.
#[derive(Debug)]
pub struct ClientState {
    name: String,
    focused: bool,
    virtual_x: i32,
    virtual_y: i32,
    last_x: i32,
    last_y: i32,
}

impl ClientState {
    /// Creates the state for a machine that currently owns the cursor, with
    /// both positions at the given local/virtual starting point.
    pub fn new(name: impl Into<String>, x: i32, y: i32) -> Self {
        Self {
            name: name.into(),
            focused: true,
            virtual_x: x,
            virtual_y: y,
            last_x: x,
            last_y: y,
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    /// True iff the virtual cursor is currently on one of this machine's own
    /// screens.
    pub fn focused(&self) -> bool {
        self.focused
    }

    /// Current position in the shared virtual coordinate space.
    pub fn virtual_position(&self) -> (i32, i32) {
        (self.virtual_x, self.virtual_y)
    }

    /// The last local OS position this machine's cursor was set to or
    /// observed at.
    pub fn last_position(&self) -> (i32, i32) {
        (self.last_x, self.last_y)
    }

    /// Folds a raw local cursor observation into the virtual position.
    ///
    /// The delta from the previously observed local position is applied
    /// tentatively; if the resulting virtual point lands on no screen the
    /// delta is rolled back and `false` is returned, keeping the virtual
    /// cursor out of the void between screens. Either way the observed local
    /// position is recorded, so subsequent deltas are computed from where the
    /// OS cursor actually is.
    pub fn apply_local_delta(
        &mut self,
        topology: &ScreenTopology,
        new_x: i32,
        new_y: i32,
    ) -> bool {
        let delta_x = new_x - self.last_x;
        let delta_y = new_y - self.last_y;
        self.virtual_x += delta_x;
        self.virtual_y += delta_y;

        let accepted = topology
            .valid_virtual_coordinate(self.virtual_x, self.virtual_y)
            .is_some();
        if !accepted {
            self.virtual_x -= delta_x;
            self.virtual_y -= delta_y;
        }

        self.last_x = new_x;
        self.last_y = new_y;
        accepted
    }

    /// Overwrites the virtual position with an authoritative value received
    /// from a peer.
    pub fn set_virtual_position(&mut self, x: i32, y: i32) {
        self.virtual_x = x;
        self.virtual_y = y;
    }

    /// Decides the focus hand-off for the current virtual position.
    ///
    /// `replay` asks for a cursor warp even when focus did not change; the
    /// receiving role always replays (its OS cursor has not moved on its
    /// own), the sending role does not. Calling this again with an unchanged
    /// virtual position reaches the same focus and local position, so
    /// redundant updates cannot oscillate.
    pub fn process_virtual_move(
        &mut self,
        topology: &ScreenTopology,
        replay: bool,
    ) -> CursorDirective {
        let Some(screen) = topology.valid_virtual_coordinate(self.virtual_x, self.virtual_y)
        else {
            return CursorDirective::None;
        };

        if screen.client == self.name {
            let (x, y) = screen.to_local(self.virtual_x, self.virtual_y);
            self.last_x = x;
            self.last_y = y;

            if !self.focused {
                self.focused = true;
                trace!(client = %self.name, x, y, "focus gained");
                return CursorDirective::Move { x, y, swallow: true };
            }
            if replay {
                return CursorDirective::Move { x, y, swallow: false };
            }
            return CursorDirective::None;
        }

        if self.focused {
            self.focused = false;
            trace!(client = %self.name, to = %screen.client, "focus lost");
            // Park the local cursor at the bottom-right pixel of this
            // machine's first screen, out of the way of the real cursor now
            // travelling on the peer.
            if let Some(own) = topology.client_screens(&self.name).first() {
                self.last_x = own.local_x + own.width - 1;
                self.last_y = own.local_y + own.height - 1;
                return CursorDirective::Move {
                    x: self.last_x,
                    y: self.last_y,
                    swallow: true,
                };
            }
        }
        CursorDirective::None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
