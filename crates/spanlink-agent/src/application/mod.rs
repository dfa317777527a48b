//! Application layer: the agent's use cases.

pub mod apply_input;

pub use apply_input::{AgentEvent, ApplyInputUseCase, ControllerLink};
