//! Infrastructure layer: OS seams, network transport, and configuration.

pub mod clipboard;
pub mod cursor;
pub mod display;
pub mod input_capture;
pub mod network;
pub mod storage;
