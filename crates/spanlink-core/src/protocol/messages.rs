//! Wire message types for the shared-input session.
//!
//! Eight message kinds cover the whole protocol: session membership
//! (CheckIn/CheckOut), input events (MouseMove, MouseButton, MouseWheel,
//! KeyPress), clipboard transfer, and the MoveScreen layout hint. Messages
//! are plain values; they own no resources and exist only to be encoded by
//! [`crate::protocol::codec`].

use crate::domain::screen::VirtualScreen;

// ── Protocol constants ────────────────────────────────────────────────────────

/// Size of the header prefixing every length-prefixed message kind:
/// 1 tag byte + 4-byte little-endian payload length + 3 unused padding bytes.
pub const HEADER_SIZE: usize = 8;

/// Upper bound on a declared payload length. Anything larger is treated as a
/// framing error rather than an allocation request.
pub const MAX_PAYLOAD_LEN: usize = 1 << 20;

// ── Message type tags ─────────────────────────────────────────────────────────

/// Wire type tags. MoveScreen is special-cased: its tag occupies only the low
/// nibble of its single byte, with the [`ScreenLocation`] in the high nibble,
/// so the values `0x01`, `0x11` and `0x21` all dispatch to it. The remaining
/// tags never exceed `0x08`, so the nibble split is unambiguous.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MessageTag {
    MoveScreen = 1,
    MouseWheel = 2,
    MouseButton = 3,
    MouseMove = 4,
    KeyPress = 5,
    Clipboard = 6,
    CheckIn = 7,
    CheckOut = 8,
}

// ── Field enums ───────────────────────────────────────────────────────────────

/// Which side of the existing layout a peer's screen block was chained onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
#[repr(u8)]
pub enum ScreenLocation {
    #[default]
    None = 0,
    Left = 1,
    Right = 2,
}

impl TryFrom<u8> for ScreenLocation {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, ()> {
        match value {
            0 => Ok(ScreenLocation::None),
            1 => Ok(ScreenLocation::Left),
            2 => Ok(ScreenLocation::Right),
            _ => Err(()),
        }
    }
}

/// Mouse button identifiers as carried on the wire.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[repr(u8)]
pub enum MouseButton {
    Left = 1,
    Right = 2,
    Middle = 3,
    X1 = 4,
    X2 = 5,
}

impl TryFrom<u8> for MouseButton {
    type Error = ();

    fn try_from(value: u8) -> Result<Self, ()> {
        match value {
            1 => Ok(MouseButton::Left),
            2 => Ok(MouseButton::Right),
            3 => Ok(MouseButton::Middle),
            4 => Ok(MouseButton::X1),
            5 => Ok(MouseButton::X2),
            _ => Err(()),
        }
    }
}

// ── Messages ──────────────────────────────────────────────────────────────────

/// A machine's announcement of its display layout when joining the session.
///
/// The screens carry both local and virtual coordinates. A joining machine
/// sends zeroed virtual coordinates; the session host assigns real ones and
/// answers with its own check-in carrying the authoritative layout.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CheckIn {
    pub client: String,
    pub screens: Vec<VirtualScreen>,
}

/// One decoded or to-be-encoded protocol message.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WireMessage {
    /// Layout hint: which side the receiver's screen block sits on.
    MoveScreen(ScreenLocation),
    /// Scroll wheel deltas.
    MouseWheel { dx: i32, dy: i32 },
    /// Button press (`down = true`) or release.
    MouseButton { button: MouseButton, down: bool },
    /// Cursor position in the shared virtual coordinate space.
    MouseMove { x: i32, y: i32 },
    /// Key press or release; the key code is platform-translated upstream.
    KeyPress { key: i32, down: bool },
    /// Full clipboard text replacing the receiver's clipboard.
    Clipboard(String),
    CheckIn(CheckIn),
    /// Clean departure of the named machine.
    CheckOut { client: String },
}

impl WireMessage {
    pub fn tag(&self) -> MessageTag {
        match self {
            WireMessage::MoveScreen(_) => MessageTag::MoveScreen,
            WireMessage::MouseWheel { .. } => MessageTag::MouseWheel,
            WireMessage::MouseButton { .. } => MessageTag::MouseButton,
            WireMessage::MouseMove { .. } => MessageTag::MouseMove,
            WireMessage::KeyPress { .. } => MessageTag::KeyPress,
            WireMessage::Clipboard(_) => MessageTag::Clipboard,
            WireMessage::CheckIn(_) => MessageTag::CheckIn,
            WireMessage::CheckOut { .. } => MessageTag::CheckOut,
        }
    }
}
