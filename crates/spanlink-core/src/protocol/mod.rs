//! Wire protocol: message types and the binary codec.

pub mod codec;
pub mod messages;

pub use codec::{decode_frame, encode_message, ProtocolError};
pub use messages::{
    CheckIn, MessageTag, MouseButton, ScreenLocation, WireMessage, HEADER_SIZE, MAX_PAYLOAD_LEN,
};
