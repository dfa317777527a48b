//! Input capture infrastructure for the controller application.
//!
//! A production implementation would install OS-level keyboard and mouse
//! hooks on a dedicated thread and pump raw events into a channel consumed by
//! the session task. Hook callbacks must return quickly, so all processing is
//! deferred out of the callback via the channel.
//!
//! The `InputSource` trait is the boundary: the session depends only on it,
//! and tests drive the session with [`mock::MockInputSource`].

use tokio::sync::mpsc;

use spanlink_core::protocol::messages::MouseButton;

pub mod mock;

/// A raw input event produced by the capture layer, in local OS coordinates.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RawInputEvent {
    /// The cursor moved to an absolute local position.
    MouseMove { x: i32, y: i32 },
    /// A mouse button changed state.
    MouseButton { button: MouseButton, down: bool },
    /// The wheel scrolled; positive `dy` is away from the user.
    MouseWheel { dx: i32, dy: i32 },
    /// A key changed state. The code is already in the session's canonical
    /// key space.
    Key { key: i32, down: bool },
    /// The local clipboard contents changed.
    ClipboardChanged(String),
}

/// Error type for input capture operations.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    #[error("failed to install input hook: {0}")]
    HookInstallFailed(String),
    #[error("capture service has already been stopped")]
    AlreadyStopped,
}

/// Trait abstracting input event production.
pub trait InputSource: Send + Sync {
    /// Starts the source and returns the receiver for captured events.
    fn start(&self) -> Result<mpsc::UnboundedReceiver<RawInputEvent>, CaptureError>;

    /// Stops the source and releases any OS resources.
    fn stop(&self);

    /// Instructs the source to swallow the event currently being delivered,
    /// so the OS does not also act on it. Called when a focus hand-off warps
    /// the cursor and the stale hook position must not reach the OS.
    fn suppress_current_event(&self);
}
