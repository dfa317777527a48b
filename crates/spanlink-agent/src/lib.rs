//! spanlink-agent library entry point.
//!
//! Re-exports the module tree so integration tests in `tests/` and the
//! binary in `main.rs` share it.

pub mod application;
pub mod infrastructure;
