//! Integration tests for the public spanlink-core API.
//!
//! These drive the codec, topology, and focus state machine together the way
//! a live session does: a concatenated byte stream is decoded frame by frame
//! and each message is applied to a receiving machine's state.

use spanlink_core::{
    decode_frame, encode_message, CheckIn, ClientState, CursorDirective, MouseButton,
    ScreenLocation, ScreenTopology, VirtualScreen, WireMessage, DEFAULT_DPI,
};

fn local_screen(client: &str, width: i32, height: i32) -> VirtualScreen {
    VirtualScreen {
        client: client.to_string(),
        local_x: 0,
        local_y: 0,
        x: 0,
        y: 0,
        width,
        height,
        dpi: DEFAULT_DPI,
    }
}

/// Decodes every complete frame out of `stream`.
fn drain(stream: &[u8]) -> Vec<WireMessage> {
    let mut cursor = 0;
    let mut out = Vec::new();
    while let Some((msg, consumed)) = decode_frame(&stream[cursor..]).expect("well-formed stream")
    {
        out.push(msg);
        cursor += consumed;
    }
    assert_eq!(cursor, stream.len(), "stream must decode exactly");
    out
}

#[test]
fn test_mixed_stream_decodes_in_order() {
    let messages = vec![
        WireMessage::CheckIn(CheckIn {
            client: "agent".to_string(),
            screens: vec![local_screen("agent", 1280, 1024)],
        }),
        WireMessage::MoveScreen(ScreenLocation::Right),
        WireMessage::MouseMove { x: 1950, y: 400 },
        WireMessage::MouseButton {
            button: MouseButton::Left,
            down: true,
        },
        WireMessage::MouseWheel { dx: 0, dy: -120 },
        WireMessage::KeyPress { key: 0x1C, down: true },
        WireMessage::Clipboard("shared text".to_string()),
        WireMessage::CheckOut {
            client: "agent".to_string(),
        },
    ];

    let mut stream = Vec::new();
    for msg in &messages {
        stream.extend_from_slice(&encode_message(msg).expect("encode must succeed"));
    }

    assert_eq!(drain(&stream), messages);
}

#[test]
fn test_decoding_survives_arbitrary_chunk_boundaries() {
    let messages = [
        WireMessage::MouseMove { x: -5, y: 900 },
        WireMessage::Clipboard("chunked".to_string()),
        WireMessage::MouseButton {
            button: MouseButton::Right,
            down: false,
        },
    ];
    let mut stream = Vec::new();
    for msg in &messages {
        stream.extend_from_slice(&encode_message(msg).unwrap());
    }

    // Feed the stream one byte at a time through a grow-and-drain buffer,
    // the way a socket read loop does.
    let mut buffer: Vec<u8> = Vec::new();
    let mut decoded = Vec::new();
    for &byte in &stream {
        buffer.push(byte);
        while let Some((msg, consumed)) = decode_frame(&buffer).unwrap() {
            decoded.push(msg);
            buffer.drain(..consumed);
        }
    }

    assert!(buffer.is_empty());
    assert_eq!(decoded, messages);
}

#[test]
fn test_received_stream_drives_focus_hand_off() {
    // The receiving machine "agent" owns a 1280x1024 screen placed to the
    // right of the sender's 1920x1080 one.
    let mut topology = ScreenTopology::new();
    topology
        .add_screen(0, 0, 1920, 1080, DEFAULT_DPI, "controller", 0, 0)
        .unwrap();
    topology
        .add_screen(1920, 0, 1280, 1024, DEFAULT_DPI, "agent", 0, 0)
        .unwrap();
    let mut state = ClientState::new("agent", 0, 0);
    state.set_virtual_position(500, 500);
    state.process_virtual_move(&topology, false);
    assert!(!state.focused(), "cursor starts on the controller");

    // Cross onto the agent's screen, then move within it, then leave.
    let stream: Vec<WireMessage> = vec![
        WireMessage::MouseMove { x: 1930, y: 300 },
        WireMessage::MouseMove { x: 2100, y: 350 },
        WireMessage::MouseMove { x: 900, y: 350 },
    ];
    let mut directives = Vec::new();
    for msg in stream {
        let WireMessage::MouseMove { x, y } = msg else { unreachable!() };
        state.set_virtual_position(x, y);
        directives.push(state.process_virtual_move(&topology, true));
    }

    assert_eq!(
        directives[0],
        CursorDirective::Move { x: 10, y: 300, swallow: true },
        "entering must snap the cursor and swallow the event"
    );
    assert_eq!(
        directives[1],
        CursorDirective::Move { x: 180, y: 350, swallow: false },
        "in-screen receiver moves replay without swallowing"
    );
    assert_eq!(
        directives[2],
        CursorDirective::Move { x: 1279, y: 1023, swallow: true },
        "leaving parks the cursor at the bottom-right pixel"
    );
    assert!(!state.focused());
}

#[test]
fn test_check_in_then_check_out_restores_layout() {
    let mut topology = ScreenTopology::new();
    topology
        .add_screen(0, 0, 1920, 1080, DEFAULT_DPI, "controller", 0, 0)
        .unwrap();

    // A peer checks in with two screens; they chain onto the right edge.
    let check_in = CheckIn {
        client: "agent".to_string(),
        screens: vec![
            local_screen("agent", 1280, 1024),
            local_screen("agent", 1024, 768),
        ],
    };
    let bytes = encode_message(&WireMessage::CheckIn(check_in)).unwrap();
    let (decoded, _) = decode_frame(&bytes).unwrap().unwrap();
    let WireMessage::CheckIn(check_in) = decoded else {
        panic!("expected a CheckIn");
    };
    let placed = topology.add_screens_right(&check_in.screens).unwrap();
    assert_eq!(placed[0].x, 1920);
    assert_eq!(placed[1].x, 3200);

    // Check-out removes both screens and leaves the original layout.
    let removed = topology.remove_client("agent").unwrap();
    assert_eq!(removed.len(), 2);
    assert_eq!(topology.len(), 1);
    assert!(topology.valid_virtual_coordinate(2000, 500).is_none());
}
