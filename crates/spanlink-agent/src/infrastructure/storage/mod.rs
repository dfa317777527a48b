//! Persistent storage: the on-disk TOML configuration.

pub mod config;

pub use config::{load_config, save_config, AgentConfig, ConfigError};
