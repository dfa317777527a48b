//! Application layer: the session use case and the peer registry.

pub mod registry;
pub mod share_input;
