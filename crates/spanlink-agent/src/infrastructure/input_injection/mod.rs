//! Input injection infrastructure for the agent application.
//!
//! A production implementation synthesizes OS input events (SendInput,
//! XTest, CGEvent); the [`InputInjector`] trait is the boundary the
//! application layer depends on, and [`mock::RecordingInjector`] backs the
//! tests and headless runs.

use spanlink_core::protocol::messages::MouseButton;

pub mod mock;

/// Error type for injection operations.
#[derive(Debug, thiserror::Error)]
pub enum InjectionError {
    #[error("platform error: {0}")]
    Platform(String),
}

/// Platform-agnostic input injection trait.
pub trait InputInjector: Send + Sync {
    /// Warps the cursor to an absolute local position.
    fn move_cursor(&self, x: i32, y: i32) -> Result<(), InjectionError>;

    /// Presses or releases a mouse button at the current cursor position.
    fn mouse_button(&self, button: MouseButton, down: bool) -> Result<(), InjectionError>;

    /// Scrolls the wheel.
    fn mouse_wheel(&self, dx: i32, dy: i32) -> Result<(), InjectionError>;

    /// Presses or releases a key.
    fn key(&self, key: i32, down: bool) -> Result<(), InjectionError>;
}
