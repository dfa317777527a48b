//! The screen topology: every known monitor of every checked-in machine,
//! arranged edge-to-edge in one shared virtual plane.
//!
//! The topology is the authority for two questions the rest of the system
//! asks constantly:
//!
//! - *Insertion*: "may this screen go here?" — answered with an overlap scan
//!   across all clients; a conflict is a normal negative result (`None`),
//!   never an error.
//! - *Lookup*: "which screen contains virtual point (x, y)?" — answered with
//!   a linear scan under a half-open containment test. Because insertion
//!   enforced no-overlap, at most one screen can match.
//!
//! Removal collapses horizontal gaps: when a screen that was neither the
//! furthest-left nor the furthest-right is removed, everything to its right
//! shifts left by the removed width. Collapse is X-axis only; vertically
//! stacked screens keep their Y (matching the original system's
//! horizontal-chain assumption).

use std::collections::HashMap;

use tracing::debug;

use crate::domain::screen::VirtualScreen;

/// All known virtual screens, keyed by owning client name.
///
/// Per-client screen order is insertion order, which mirrors the owner's
/// display-enumeration order; "the client's first screen" is well defined.
#[derive(Debug, Default)]
pub struct ScreenTopology {
    screens: HashMap<String, Vec<VirtualScreen>>,
}

impl ScreenTopology {
    pub fn new() -> Self {
        Self::default()
    }

    /// Inserts a screen at the given virtual position, rejecting overlap.
    ///
    /// Returns `None` (and leaves the topology untouched) when the candidate
    /// rectangle overlaps any existing screen of any client; otherwise the
    /// screen is appended to its client's list and a copy is returned.
    #[allow(clippy::too_many_arguments)]
    pub fn add_screen(
        &mut self,
        x: i32,
        y: i32,
        width: i32,
        height: i32,
        dpi: u32,
        client: &str,
        local_x: i32,
        local_y: i32,
    ) -> Option<VirtualScreen> {
        let candidate = VirtualScreen {
            client: client.to_string(),
            local_x,
            local_y,
            x,
            y,
            width,
            height,
            dpi,
        };

        for existing in self.iter() {
            if candidate.overlaps(existing) {
                debug!(
                    client,
                    x, y, width, height, "screen rejected: overlaps existing layout"
                );
                return None;
            }
        }

        self.screens
            .entry(client.to_string())
            .or_default()
            .push(candidate.clone());
        Some(candidate)
    }

    /// Places `other` immediately to the right of `anchor`.
    pub fn add_screen_right(
        &mut self,
        anchor: &VirtualScreen,
        other: &VirtualScreen,
    ) -> Option<VirtualScreen> {
        self.add_screen(
            anchor.x + anchor.width,
            anchor.y,
            other.width,
            other.height,
            other.dpi,
            &other.client,
            other.local_x,
            other.local_y,
        )
    }

    /// Places `other` immediately to the left of `anchor`.
    pub fn add_screen_left(
        &mut self,
        anchor: &VirtualScreen,
        other: &VirtualScreen,
    ) -> Option<VirtualScreen> {
        self.add_screen(
            anchor.x - other.width,
            anchor.y,
            other.width,
            other.height,
            other.dpi,
            &other.client,
            other.local_x,
            other.local_y,
        )
    }

    /// Places `other` immediately above `anchor`.
    pub fn add_screen_above(
        &mut self,
        anchor: &VirtualScreen,
        other: &VirtualScreen,
    ) -> Option<VirtualScreen> {
        self.add_screen(
            anchor.x,
            anchor.y - other.height,
            other.width,
            other.height,
            other.dpi,
            &other.client,
            other.local_x,
            other.local_y,
        )
    }

    /// Places `other` immediately below `anchor`.
    pub fn add_screen_below(
        &mut self,
        anchor: &VirtualScreen,
        other: &VirtualScreen,
    ) -> Option<VirtualScreen> {
        self.add_screen(
            anchor.x,
            anchor.y + anchor.height,
            other.width,
            other.height,
            other.dpi,
            &other.client,
            other.local_x,
            other.local_y,
        )
    }

    /// Chains a block of screens rightward from the current furthest-right
    /// screen, each placed relative to the previously placed one.
    ///
    /// Used when a peer's full screen list arrives in a check-in and must be
    /// appended to the existing layout as a contiguous block. An empty
    /// topology anchors the first screen at the origin.
    ///
    /// Returns the placed screens (with their assigned virtual coordinates),
    /// or `None` if any placement was rejected; rejected placement leaves the
    /// previously placed screens of the block in the topology untouched only
    /// up to the failure point, so callers should treat `None` as fatal for
    /// the whole check-in.
    pub fn add_screens_right(&mut self, screens: &[VirtualScreen]) -> Option<Vec<VirtualScreen>> {
        let mut placed = Vec::with_capacity(screens.len());
        let mut anchor = self.furthest_right().cloned();
        for screen in screens {
            let added = match &anchor {
                Some(a) => self.add_screen_right(a, screen)?,
                None => self.add_screen(
                    0,
                    0,
                    screen.width,
                    screen.height,
                    screen.dpi,
                    &screen.client,
                    screen.local_x,
                    screen.local_y,
                )?,
            };
            anchor = Some(added.clone());
            placed.push(added);
        }
        Some(placed)
    }

    /// Chains a block of screens leftward from the current furthest-left
    /// screen. Mirror of [`add_screens_right`].
    ///
    /// [`add_screens_right`]: ScreenTopology::add_screens_right
    pub fn add_screens_left(&mut self, screens: &[VirtualScreen]) -> Option<Vec<VirtualScreen>> {
        let mut placed = Vec::with_capacity(screens.len());
        let mut anchor = self.furthest_left().cloned();
        for screen in screens {
            let added = match &anchor {
                Some(a) => self.add_screen_left(a, screen)?,
                None => self.add_screen(
                    0,
                    0,
                    screen.width,
                    screen.height,
                    screen.dpi,
                    &screen.client,
                    screen.local_x,
                    screen.local_y,
                )?,
            };
            anchor = Some(added.clone());
            placed.push(added);
        }
        Some(placed)
    }

    /// Returns the screen containing virtual point `(x, y)` under the
    /// half-open containment test, or `None` if the point lies in the void
    /// between or beyond screens.
    pub fn valid_virtual_coordinate(&self, x: i32, y: i32) -> Option<&VirtualScreen> {
        self.iter().find(|s| s.contains(x, y))
    }

    /// The screen with the greatest `x + width` across all clients.
    pub fn furthest_right(&self) -> Option<&VirtualScreen> {
        self.iter().max_by_key(|s| s.x + s.width)
    }

    /// The screen with the smallest `x` across all clients.
    pub fn furthest_left(&self) -> Option<&VirtualScreen> {
        self.iter().min_by_key(|s| s.x)
    }

    /// Removes one screen, collapsing the horizontal gap it leaves behind.
    ///
    /// If the screen was neither the furthest-left nor the furthest-right at
    /// removal time, every remaining screen whose `x` exceeds the removed
    /// screen's `x` shifts left by the removed width. Returns `false` when
    /// the screen was not present.
    pub fn remove_screen(&mut self, screen: &VirtualScreen) -> bool {
        let was_furthest_left = self.furthest_left() == Some(screen);
        let was_furthest_right = self.furthest_right() == Some(screen);

        let Some(list) = self.screens.get_mut(&screen.client) else {
            return false;
        };
        let Some(idx) = list.iter().position(|s| s == screen) else {
            return false;
        };
        let removed = list.remove(idx);
        if list.is_empty() {
            self.screens.remove(&removed.client);
        }

        if !was_furthest_left && !was_furthest_right {
            for s in self.screens.values_mut().flatten() {
                if s.x > removed.x {
                    s.x -= removed.width;
                }
            }
        }

        debug!(
            client = %removed.client,
            x = removed.x,
            y = removed.y,
            "screen removed from topology"
        );
        true
    }

    /// Removes all screens belonging to `client` (check-out or disconnect),
    /// applying the per-screen gap collapse for each.
    ///
    /// Returns the removed screens so the caller can emit one notification
    /// per screen, or `None` when the client was unknown.
    pub fn remove_client(&mut self, client: &str) -> Option<Vec<VirtualScreen>> {
        if !self.screens.contains_key(client) {
            return None;
        }
        // Collapse after each removal may shift this client's own remaining
        // screens, so re-fetch rather than iterating a stale snapshot.
        let mut removed = Vec::new();
        while let Some(screen) = self
            .screens
            .get(client)
            .and_then(|list| list.first().cloned())
        {
            self.remove_screen(&screen);
            removed.push(screen);
        }
        Some(removed)
    }

    /// All screens a client owns, in enumeration order. Empty for unknown
    /// clients.
    pub fn client_screens(&self, client: &str) -> &[VirtualScreen] {
        self.screens.get(client).map(Vec::as_slice).unwrap_or(&[])
    }

    /// Iterates every screen of every client.
    pub fn iter(&self) -> impl Iterator<Item = &VirtualScreen> {
        self.screens.values().flatten()
    }

    /// Total screen count across all clients.
    pub fn len(&self) -> usize {
        self.screens.values().map(Vec::len).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.screens.is_empty()
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
