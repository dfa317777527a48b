//! OS-independent domain model: screens, the shared topology, and the focus
//! hand-off state machine.

pub mod focus;
pub mod screen;
pub mod topology;

pub use focus::{ClientState, CursorDirective};
pub use screen::{VirtualScreen, DEFAULT_DPI};
pub use topology::ScreenTopology;
