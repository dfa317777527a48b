//! Binary codec for the session wire protocol.
//!
//! Two families of layout share one tag space:
//!
//! - **Inline kinds** (MoveScreen, MouseButton, MouseMove) are fixed-size and
//!   carry their fields directly after a 1-byte tag; MouseMove is 9 bytes at
//!   hook rate, which is the whole reason the protocol is hand-packed.
//! - **Length-prefixed kinds** (MouseWheel, KeyPress, Clipboard, CheckIn,
//!   CheckOut) start with an 8-byte header: tag, 4-byte little-endian payload
//!   length, 3 padding bytes.
//!
//! MoveScreen packs its [`ScreenLocation`] into the high nibble of the tag
//! byte (`0x01`, `0x11`, `0x21`); no other tag exceeds `0x08`, so the nibble
//! split cannot collide. All multi-byte integers are little-endian. This is a
//! closed two-party protocol: both endpoints run this codec, and byte order
//! consistency between them is all that is required.

use thiserror::Error;

use crate::domain::screen::{VirtualScreen, DEFAULT_DPI};
use crate::protocol::messages::{
    CheckIn, MessageTag, MouseButton, ScreenLocation, WireMessage, HEADER_SIZE, MAX_PAYLOAD_LEN,
};

/// Bytes per screen record inside a CheckIn payload: six 8-byte integers
/// (local_x, local_y, x, y, width, height).
const SCREEN_RECORD_LEN: usize = 48;

/// Errors raised while encoding or decoding messages. Any decode error is
/// connection-fatal: the stream cannot be resynchronized after bad framing.
#[derive(Debug, Error, PartialEq)]
pub enum ProtocolError {
    /// The leading byte is not a recognized tag.
    #[error("unknown message tag: 0x{0:02X}")]
    UnknownTag(u8),

    /// A button identifier outside the defined range.
    #[error("unknown mouse button: {0}")]
    UnknownButton(u8),

    /// The header declares a payload larger than the protocol allows.
    #[error("payload too large: {declared} bytes (limit {limit})")]
    PayloadTooLarge { declared: usize, limit: usize },

    /// The payload bytes do not match the kind's expected structure.
    #[error("malformed payload: {0}")]
    MalformedPayload(String),

    /// A screen coordinate on the wire does not fit the coordinate space.
    #[error("coordinate out of range: {0}")]
    CoordinateOutOfRange(i64),

    /// A client name longer than the 2-byte length prefix can express.
    #[error("client name too long: {0} bytes")]
    NameTooLong(usize),

    /// More screens than the 1-byte count field can express.
    #[error("too many screens in check-in: {0}")]
    TooManyScreens(usize),
}

// ── Encoding ──────────────────────────────────────────────────────────────────

/// Encodes a message into its wire bytes.
///
/// # Errors
///
/// Fails only for a [`WireMessage::CheckIn`] whose client name or screen
/// count exceeds the wire field widths.
pub fn encode_message(msg: &WireMessage) -> Result<Vec<u8>, ProtocolError> {
    match msg {
        WireMessage::MoveScreen(location) => {
            Ok(vec![((*location as u8) << 4) | MessageTag::MoveScreen as u8])
        }
        WireMessage::MouseButton { button, down } => Ok(vec![
            MessageTag::MouseButton as u8,
            *button as u8,
            u8::from(*down),
        ]),
        WireMessage::MouseMove { x, y } => {
            let mut buf = Vec::with_capacity(9);
            buf.push(MessageTag::MouseMove as u8);
            buf.extend_from_slice(&x.to_le_bytes());
            buf.extend_from_slice(&y.to_le_bytes());
            Ok(buf)
        }
        WireMessage::MouseWheel { dx, dy } => {
            let mut payload = Vec::with_capacity(8);
            payload.extend_from_slice(&dx.to_le_bytes());
            payload.extend_from_slice(&dy.to_le_bytes());
            Ok(with_header(MessageTag::MouseWheel, &payload))
        }
        WireMessage::KeyPress { key, down } => {
            let mut payload = Vec::with_capacity(5);
            payload.extend_from_slice(&key.to_le_bytes());
            payload.push(u8::from(*down));
            Ok(with_header(MessageTag::KeyPress, &payload))
        }
        WireMessage::Clipboard(text) => {
            Ok(with_header(MessageTag::Clipboard, text.as_bytes()))
        }
        WireMessage::CheckIn(check_in) => encode_check_in(check_in),
        WireMessage::CheckOut { client } => {
            Ok(with_header(MessageTag::CheckOut, client.as_bytes()))
        }
    }
}

fn encode_check_in(check_in: &CheckIn) -> Result<Vec<u8>, ProtocolError> {
    let name = check_in.client.as_bytes();
    let name_len =
        u16::try_from(name.len()).map_err(|_| ProtocolError::NameTooLong(name.len()))?;
    let screen_count = u8::try_from(check_in.screens.len())
        .map_err(|_| ProtocolError::TooManyScreens(check_in.screens.len()))?;

    let mut payload =
        Vec::with_capacity(2 + name.len() + 1 + check_in.screens.len() * SCREEN_RECORD_LEN);
    payload.extend_from_slice(&name_len.to_le_bytes());
    payload.extend_from_slice(name);
    payload.push(screen_count);
    for s in &check_in.screens {
        for field in [s.local_x, s.local_y, s.x, s.y, s.width, s.height] {
            payload.extend_from_slice(&i64::from(field).to_le_bytes());
        }
    }
    Ok(with_header(MessageTag::CheckIn, &payload))
}

fn with_header(tag: MessageTag, payload: &[u8]) -> Vec<u8> {
    let mut buf = Vec::with_capacity(HEADER_SIZE + payload.len());
    buf.push(tag as u8);
    buf.extend_from_slice(&(payload.len() as u32).to_le_bytes());
    buf.extend_from_slice(&[0u8; 3]);
    buf.extend_from_slice(payload);
    buf
}

// ── Decoding ──────────────────────────────────────────────────────────────────

/// Decodes one message from the front of `bytes`, if a complete frame is
/// present.
///
/// Returns `Ok(None)` when the buffer holds only a partial frame (the caller
/// should read more from the stream and retry), or `Ok(Some((message,
/// consumed)))` so the caller can drain `consumed` bytes and loop.
///
/// # Errors
///
/// Returns [`ProtocolError`] on bad framing; the caller is expected to close
/// the connection.
pub fn decode_frame(bytes: &[u8]) -> Result<Option<(WireMessage, usize)>, ProtocolError> {
    let Some(&first) = bytes.first() else {
        return Ok(None);
    };

    // MoveScreen: tag in the low nibble, location in the high.
    if first & 0x0F == MessageTag::MoveScreen as u8 && first >> 4 <= ScreenLocation::Right as u8 {
        let location = ScreenLocation::try_from(first >> 4)
            .map_err(|_| ProtocolError::UnknownTag(first))?;
        return Ok(Some((WireMessage::MoveScreen(location), 1)));
    }

    match first {
        t if t == MessageTag::MouseButton as u8 => {
            if bytes.len() < 3 {
                return Ok(None);
            }
            let button = MouseButton::try_from(bytes[1])
                .map_err(|_| ProtocolError::UnknownButton(bytes[1]))?;
            let down = bytes[2] != 0;
            Ok(Some((WireMessage::MouseButton { button, down }, 3)))
        }
        t if t == MessageTag::MouseMove as u8 => {
            if bytes.len() < 9 {
                return Ok(None);
            }
            let x = read_i32(&bytes[1..5]);
            let y = read_i32(&bytes[5..9]);
            Ok(Some((WireMessage::MouseMove { x, y }, 9)))
        }
        t if t == MessageTag::MouseWheel as u8
            || t == MessageTag::KeyPress as u8
            || t == MessageTag::Clipboard as u8
            || t == MessageTag::CheckIn as u8
            || t == MessageTag::CheckOut as u8 =>
        {
            decode_prefixed(t, bytes)
        }
        other => Err(ProtocolError::UnknownTag(other)),
    }
}

fn decode_prefixed(tag: u8, bytes: &[u8]) -> Result<Option<(WireMessage, usize)>, ProtocolError> {
    if bytes.len() < HEADER_SIZE {
        return Ok(None);
    }
    let declared = read_u32(&bytes[1..5]) as usize;
    if declared > MAX_PAYLOAD_LEN {
        return Err(ProtocolError::PayloadTooLarge {
            declared,
            limit: MAX_PAYLOAD_LEN,
        });
    }
    // bytes[5..8] are padding, ignored on decode.
    let total = HEADER_SIZE + declared;
    if bytes.len() < total {
        return Ok(None);
    }
    let payload = &bytes[HEADER_SIZE..total];

    let msg = match tag {
        t if t == MessageTag::MouseWheel as u8 => {
            require_len(payload, 8, "MouseWheel")?;
            WireMessage::MouseWheel {
                dx: read_i32(&payload[0..4]),
                dy: read_i32(&payload[4..8]),
            }
        }
        t if t == MessageTag::KeyPress as u8 => {
            require_len(payload, 5, "KeyPress")?;
            WireMessage::KeyPress {
                key: read_i32(&payload[0..4]),
                down: payload[4] != 0,
            }
        }
        t if t == MessageTag::Clipboard as u8 => WireMessage::Clipboard(read_utf8(payload)?),
        t if t == MessageTag::CheckIn as u8 => WireMessage::CheckIn(decode_check_in(payload)?),
        _ => WireMessage::CheckOut {
            client: read_utf8(payload)?,
        },
    };
    Ok(Some((msg, total)))
}

fn decode_check_in(payload: &[u8]) -> Result<CheckIn, ProtocolError> {
    if payload.len() < 3 {
        return Err(ProtocolError::MalformedPayload(format!(
            "CheckIn payload of {} bytes is shorter than its fixed fields",
            payload.len()
        )));
    }
    let name_len = u16::from_le_bytes([payload[0], payload[1]]) as usize;
    let Some(name_end) = 2usize.checked_add(name_len).filter(|&e| e < payload.len()) else {
        return Err(ProtocolError::MalformedPayload(format!(
            "CheckIn name length {name_len} exceeds payload"
        )));
    };
    let client = read_utf8(&payload[2..name_end])?;

    let screen_count = payload[name_end] as usize;
    let records = &payload[name_end + 1..];
    if records.len() != screen_count * SCREEN_RECORD_LEN {
        return Err(ProtocolError::MalformedPayload(format!(
            "CheckIn declares {screen_count} screens but carries {} record bytes",
            records.len()
        )));
    }

    let mut screens = Vec::with_capacity(screen_count);
    for record in records.chunks_exact(SCREEN_RECORD_LEN) {
        let mut fields = [0i32; 6];
        for (i, field) in fields.iter_mut().enumerate() {
            let raw = read_i64(&record[i * 8..i * 8 + 8]);
            *field =
                i32::try_from(raw).map_err(|_| ProtocolError::CoordinateOutOfRange(raw))?;
        }
        let [local_x, local_y, x, y, width, height] = fields;
        screens.push(VirtualScreen {
            client: client.clone(),
            local_x,
            local_y,
            x,
            y,
            width,
            height,
            dpi: DEFAULT_DPI,
        });
    }
    Ok(CheckIn { client, screens })
}

// ── Byte helpers ──────────────────────────────────────────────────────────────

// Slice lengths are validated by the callers, so the conversions cannot fail.

fn read_u32(bytes: &[u8]) -> u32 {
    u32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

fn read_i32(bytes: &[u8]) -> i32 {
    i32::from_le_bytes([bytes[0], bytes[1], bytes[2], bytes[3]])
}

fn read_i64(bytes: &[u8]) -> i64 {
    i64::from_le_bytes([
        bytes[0], bytes[1], bytes[2], bytes[3], bytes[4], bytes[5], bytes[6], bytes[7],
    ])
}

fn read_utf8(bytes: &[u8]) -> Result<String, ProtocolError> {
    String::from_utf8(bytes.to_vec())
        .map_err(|e| ProtocolError::MalformedPayload(format!("invalid UTF-8: {e}")))
}

fn require_len(payload: &[u8], expected: usize, kind: &str) -> Result<(), ProtocolError> {
    if payload.len() != expected {
        return Err(ProtocolError::MalformedPayload(format!(
            "{kind} payload must be {expected} bytes, got {}",
            payload.len()
        )));
    }
    Ok(())
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    fn roundtrip(msg: WireMessage) {
        let bytes = encode_message(&msg).unwrap();
        let (decoded, consumed) = decode_frame(&bytes).unwrap().unwrap();
        assert_eq!(decoded, msg);
        assert_eq!(consumed, bytes.len());
    }

    fn screen(client: &str, x: i32, w: i32) -> VirtualScreen {
        VirtualScreen {
            client: client.to_string(),
            local_x: 0,
            local_y: 0,
            x,
            y: 0,
            width: w,
            height: 1080,
            dpi: DEFAULT_DPI,
        }
    }

    // ── Round-trips ───────────────────────────────────────────────────────────

    #[test]
    fn test_mouse_move_roundtrip_with_negative_and_large_values() {
        roundtrip(WireMessage::MouseMove { x: 0, y: 0 });
        roundtrip(WireMessage::MouseMove { x: -1280, y: -1 });
        roundtrip(WireMessage::MouseMove { x: i32::MAX, y: i32::MIN });
    }

    #[test]
    fn test_mouse_button_roundtrip_all_buttons() {
        for button in [
            MouseButton::Left,
            MouseButton::Right,
            MouseButton::Middle,
            MouseButton::X1,
            MouseButton::X2,
        ] {
            roundtrip(WireMessage::MouseButton { button, down: true });
            roundtrip(WireMessage::MouseButton { button, down: false });
        }
    }

    #[test]
    fn test_mouse_wheel_roundtrip() {
        roundtrip(WireMessage::MouseWheel { dx: -120, dy: 240 });
        roundtrip(WireMessage::MouseWheel { dx: i32::MIN, dy: i32::MAX });
    }

    #[test]
    fn test_key_press_roundtrip() {
        roundtrip(WireMessage::KeyPress { key: 0x41, down: true });
        roundtrip(WireMessage::KeyPress { key: -1, down: false });
    }

    #[test]
    fn test_clipboard_roundtrip_including_empty() {
        roundtrip(WireMessage::Clipboard(String::new()));
        roundtrip(WireMessage::Clipboard("héllo wörld 🚀".to_string()));
    }

    #[test]
    fn test_check_in_roundtrip() {
        roundtrip(WireMessage::CheckIn(CheckIn {
            client: "laptop".to_string(),
            screens: vec![screen("laptop", 0, 1920), screen("laptop", 1920, 1280)],
        }));
    }

    #[test]
    fn test_check_in_roundtrip_with_empty_name_and_no_screens() {
        roundtrip(WireMessage::CheckIn(CheckIn {
            client: String::new(),
            screens: vec![],
        }));
    }

    #[test]
    fn test_check_in_roundtrip_max_screen_count() {
        let screens = (0..255).map(|i| screen("many", i * 100, 100)).collect();
        roundtrip(WireMessage::CheckIn(CheckIn {
            client: "many".to_string(),
            screens,
        }));
    }

    #[test]
    fn test_check_out_roundtrip() {
        roundtrip(WireMessage::CheckOut {
            client: "laptop".to_string(),
        });
    }

    #[test]
    fn test_move_screen_roundtrip_all_locations() {
        roundtrip(WireMessage::MoveScreen(ScreenLocation::None));
        roundtrip(WireMessage::MoveScreen(ScreenLocation::Left));
        roundtrip(WireMessage::MoveScreen(ScreenLocation::Right));
    }

    // ── Exact byte layouts ────────────────────────────────────────────────────

    #[test]
    fn test_move_screen_packs_location_into_high_nibble() {
        let none = encode_message(&WireMessage::MoveScreen(ScreenLocation::None)).unwrap();
        let left = encode_message(&WireMessage::MoveScreen(ScreenLocation::Left)).unwrap();
        let right = encode_message(&WireMessage::MoveScreen(ScreenLocation::Right)).unwrap();
        assert_eq!(none, [0x01]);
        assert_eq!(left, [0x11]);
        assert_eq!(right, [0x21]);
    }

    #[test]
    fn test_mouse_move_is_nine_bytes_little_endian() {
        let bytes = encode_message(&WireMessage::MouseMove { x: 0x0102_0304, y: -2 }).unwrap();
        assert_eq!(bytes.len(), 9);
        assert_eq!(bytes[0], 4);
        assert_eq!(&bytes[1..5], &[0x04, 0x03, 0x02, 0x01]);
        assert_eq!(&bytes[5..9], &[0xFE, 0xFF, 0xFF, 0xFF]);
    }

    #[test]
    fn test_prefixed_header_layout() {
        let bytes = encode_message(&WireMessage::Clipboard("abc".to_string())).unwrap();
        assert_eq!(bytes[0], 6);
        assert_eq!(&bytes[1..5], &3u32.to_le_bytes());
        assert_eq!(&bytes[5..8], &[0, 0, 0]);
        assert_eq!(&bytes[8..], b"abc");
    }

    // ── Incremental decoding ──────────────────────────────────────────────────

    #[test]
    fn test_partial_frames_request_more_bytes() {
        let bytes = encode_message(&WireMessage::CheckOut {
            client: "laptop".to_string(),
        })
        .unwrap();
        for end in 0..bytes.len() {
            assert_eq!(decode_frame(&bytes[..end]).unwrap(), None, "prefix of {end}");
        }
        assert!(decode_frame(&bytes).unwrap().is_some());
    }

    #[test]
    fn test_decode_reports_consumed_length_with_trailing_data() {
        let mut buf = encode_message(&WireMessage::MouseMove { x: 7, y: 9 }).unwrap();
        let second = encode_message(&WireMessage::MouseButton {
            button: MouseButton::Left,
            down: true,
        })
        .unwrap();
        buf.extend_from_slice(&second);

        let (first, consumed) = decode_frame(&buf).unwrap().unwrap();
        assert_eq!(first, WireMessage::MouseMove { x: 7, y: 9 });

        let (next, _) = decode_frame(&buf[consumed..]).unwrap().unwrap();
        assert_eq!(
            next,
            WireMessage::MouseButton {
                button: MouseButton::Left,
                down: true
            }
        );
    }

    // ── Framing errors ────────────────────────────────────────────────────────

    #[test]
    fn test_unknown_tag_is_an_error() {
        assert_eq!(decode_frame(&[0x09]), Err(ProtocolError::UnknownTag(0x09)));
        // High nibble 3 is not a valid MoveScreen location, so 0x31 is not a
        // MoveScreen byte either.
        assert_eq!(decode_frame(&[0x31]), Err(ProtocolError::UnknownTag(0x31)));
    }

    #[test]
    fn test_unknown_button_is_an_error() {
        assert_eq!(
            decode_frame(&[0x03, 9, 1]),
            Err(ProtocolError::UnknownButton(9))
        );
    }

    #[test]
    fn test_oversized_payload_is_rejected_before_buffering() {
        let mut bytes = vec![0x06]; // Clipboard
        bytes.extend_from_slice(&(MAX_PAYLOAD_LEN as u32 + 1).to_le_bytes());
        bytes.extend_from_slice(&[0, 0, 0]);
        assert_eq!(
            decode_frame(&bytes),
            Err(ProtocolError::PayloadTooLarge {
                declared: MAX_PAYLOAD_LEN + 1,
                limit: MAX_PAYLOAD_LEN,
            })
        );
    }

    #[test]
    fn test_check_in_with_mismatched_record_bytes_is_malformed() {
        // Name "ab", claims 1 screen but carries no record bytes.
        let mut payload = Vec::new();
        payload.extend_from_slice(&2u16.to_le_bytes());
        payload.extend_from_slice(b"ab");
        payload.push(1);
        let mut bytes = vec![0x07];
        bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&[0, 0, 0]);
        bytes.extend_from_slice(&payload);

        assert!(matches!(
            decode_frame(&bytes),
            Err(ProtocolError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_check_in_coordinate_overflow_is_rejected() {
        let mut payload = Vec::new();
        payload.extend_from_slice(&1u16.to_le_bytes());
        payload.extend_from_slice(b"a");
        payload.push(1);
        payload.extend_from_slice(&(i64::MAX).to_le_bytes());
        payload.extend_from_slice(&[0u8; 40]);
        let mut bytes = vec![0x07];
        bytes.extend_from_slice(&(payload.len() as u32).to_le_bytes());
        bytes.extend_from_slice(&[0, 0, 0]);
        bytes.extend_from_slice(&payload);

        assert_eq!(
            decode_frame(&bytes),
            Err(ProtocolError::CoordinateOutOfRange(i64::MAX))
        );
    }

    #[test]
    fn test_invalid_clipboard_utf8_is_malformed() {
        let mut bytes = vec![0x06];
        bytes.extend_from_slice(&2u32.to_le_bytes());
        bytes.extend_from_slice(&[0, 0, 0]);
        bytes.extend_from_slice(&[0xFF, 0xFE]);
        assert!(matches!(
            decode_frame(&bytes),
            Err(ProtocolError::MalformedPayload(_))
        ));
    }

    #[test]
    fn test_check_out_name_too_long_fails_encode() {
        let msg = WireMessage::CheckIn(CheckIn {
            client: "x".repeat(u16::MAX as usize + 1),
            screens: vec![],
        });
        assert!(matches!(
            encode_message(&msg),
            Err(ProtocolError::NameTooLong(_))
        ));
    }
}
