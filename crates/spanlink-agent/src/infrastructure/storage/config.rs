//! TOML-based configuration for the agent application.
//!
//! Reads and writes [`AgentConfig`] at the platform-appropriate path:
//! - Windows:  `%APPDATA%\spanlink\agent.toml`
//! - Linux:    `$XDG_CONFIG_HOME/spanlink/agent.toml` (or `~/.config/...`)
//! - macOS:    `~/Library/Application Support/spanlink/agent.toml`
//!
//! Every field carries a serde default so a missing file, or a file written
//! by an older version, works on first run.

use std::path::PathBuf;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level agent configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct AgentConfig {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub network: NetworkConfig,
}

/// Session behaviour settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    /// This machine's name, advertised in the check-in.
    #[serde(default = "default_client_name")]
    pub client_name: String,
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Controller endpoint settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkConfig {
    /// Controller host name or IP address.
    #[serde(default = "default_controller_host")]
    pub controller_host: String,
    /// Controller TCP port.
    #[serde(default = "default_controller_port")]
    pub controller_port: u16,
    /// Seconds to wait before re-dialing a dropped connection.
    #[serde(default = "default_reconnect_interval_secs")]
    pub reconnect_interval_secs: u64,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_client_name() -> String {
    "agent".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_controller_host() -> String {
    "127.0.0.1".to_string()
}
fn default_controller_port() -> u16 {
    24820
}
fn default_reconnect_interval_secs() -> u64 {
    5
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            client_name: default_client_name(),
            log_level: default_log_level(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            controller_host: default_controller_host(),
            controller_port: default_controller_port(),
            reconnect_interval_secs: default_reconnect_interval_secs(),
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the base directory
/// cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the agent config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot
/// be determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("agent.toml"))
}

/// Loads the config from disk, returning defaults if the file does not yet
/// exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not
/// found", and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config() -> Result<AgentConfig, ConfigError> {
    let path = config_file_path()?;

    match std::fs::read_to_string(&path) {
        Ok(content) => {
            let cfg: AgentConfig = toml::from_str(&content)?;
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AgentConfig::default()),
        Err(e) => Err(ConfigError::Io { path, source: e }),
    }
}

/// Persists the config to disk, creating the directory if needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config(config: &AgentConfig) -> Result<(), ConfigError> {
    let path = config_file_path()?;

    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(&path, content).map_err(|source| ConfigError::Io {
        path: path.clone(),
        source,
    })?;
    Ok(())
}

fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("spanlink"))
    }

    #[cfg(target_os = "linux")]
    {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("spanlink"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("spanlink")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_config_has_expected_values() {
        let cfg = AgentConfig::default();

        assert_eq!(cfg.session.client_name, "agent");
        assert_eq!(cfg.session.log_level, "info");
        assert_eq!(cfg.network.controller_host, "127.0.0.1");
        assert_eq!(cfg.network.controller_port, 24820);
        assert_eq!(cfg.network.reconnect_interval_secs, 5);
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        // Arrange
        let mut cfg = AgentConfig::default();
        cfg.session.client_name = "lab-machine".to_string();
        cfg.network.controller_host = "192.168.1.20".to_string();

        // Act
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let restored: AgentConfig = toml::from_str(&toml_str).expect("deserialize");

        // Assert
        assert_eq!(cfg, restored);
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let cfg: AgentConfig = toml::from_str(
            r#"
            [network]
            controller_host = "10.0.0.7"
            "#,
        )
        .expect("partial config must parse");

        assert_eq!(cfg.network.controller_host, "10.0.0.7");
        assert_eq!(cfg.network.controller_port, 24820);
        assert_eq!(cfg.session.client_name, "agent");
    }

    #[test]
    fn test_empty_file_parses_to_defaults() {
        let cfg: AgentConfig = toml::from_str("").expect("empty config must parse");
        assert_eq!(cfg, AgentConfig::default());
    }
}
