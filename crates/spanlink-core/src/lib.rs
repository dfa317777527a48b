//! # spanlink-core
//!
//! Shared library for spanlink containing the virtual screen topology, the
//! focus hand-off state machine, and the binary wire protocol codec.
//!
//! This crate is used by both the controller and agent applications. It has
//! zero dependencies on OS APIs or network sockets.
//!
//! spanlink is a software KVM switch: several computers share one mouse and
//! keyboard by stitching their physical displays into a single virtual
//! coordinate plane. Moving the pointer off the edge of one machine's screen
//! "enters" the adjacent machine, and input events are forwarded over a
//! persistent stream to whichever machine currently owns focus.
//!
//! The crate defines:
//!
//! - **`domain`** – Pure logic with no OS dependencies: [`VirtualScreen`]
//!   rectangles, the [`ScreenTopology`] that arranges them without overlap,
//!   and the [`ClientState`] machine deciding focus hand-off.
//!
//! - **`protocol`** – How bytes travel over the stream. Events are encoded
//!   into a compact fixed-layout binary format (high-frequency kinds inline
//!   their fields after a single tag byte) and decoded back into typed
//!   [`WireMessage`] values on the other end.

pub mod domain;
pub mod protocol;

pub use domain::focus::{ClientState, CursorDirective};
pub use domain::screen::{VirtualScreen, DEFAULT_DPI};
pub use domain::topology::ScreenTopology;
pub use protocol::codec::{decode_frame, encode_message, ProtocolError};
pub use protocol::messages::{CheckIn, MouseButton, ScreenLocation, WireMessage};
