//! Infrastructure layer: OS seams and the network link to the controller.

pub mod clipboard;
pub mod display;
pub mod input_injection;
pub mod network;
pub mod storage;
