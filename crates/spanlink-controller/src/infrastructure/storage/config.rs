//! TOML-based configuration for the controller application.
//!
//! Reads and writes [`ControllerConfig`] at the platform-appropriate path:
//! - Windows:  `%APPDATA%\spanlink\controller.toml`
//! - Linux:    `$XDG_CONFIG_HOME/spanlink/controller.toml` (or `~/.config/...`)
//! - macOS:    `~/Library/Application Support/spanlink/controller.toml`
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

/// Top-level controller configuration stored on disk.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Default)]
pub struct ControllerConfig {
    #[serde(default)]
    pub session: SessionConfig,
    #[serde(default)]
    pub network: NetworkConfig,
}

/// Session behaviour settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct SessionConfig {
    /// This machine's name, used as its topology key and check-in identity.
    #[serde(default = "default_client_name")]
    pub client_name: String,
    /// Which side of the controller's screens agent blocks chain onto:
    /// `"left"` or `"right"`.
    #[serde(default = "default_agent_side")]
    pub agent_side: String,
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Listen address settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct NetworkConfig {
    /// TCP port agents connect to.
    #[serde(default = "default_port")]
    pub port: u16,
    /// IP address to bind the listener to. `"0.0.0.0"` binds all interfaces.
    #[serde(default = "default_bind_address")]
    pub bind_address: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_client_name() -> String {
    "controller".to_string()
}
fn default_agent_side() -> String {
    "right".to_string()
}
fn default_log_level() -> String {
    "info".to_string()
}
fn default_port() -> u16 {
    24820
}
fn default_bind_address() -> String {
    "0.0.0.0".to_string()
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            client_name: default_client_name(),
            agent_side: default_agent_side(),
            log_level: default_log_level(),
        }
    }
}

impl Default for NetworkConfig {
    fn default() -> Self {
        Self {
            port: default_port(),
            bind_address: default_bind_address(),
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

/// Resolves the full path to the controller config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot
/// be determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("controller.toml"))
}

/// Loads the config from disk, returning defaults if the file does not yet
/// exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not
/// found", and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config() -> Result<ControllerConfig, ConfigError> {
    let path = config_file_path()?;

    match std::fs::read_to_string(&path) {
        Ok(content) => {
            let cfg: ControllerConfig = toml::from_str(&content)?;
            Ok(cfg)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(ControllerConfig::default()),
        Err(e) => Err(ConfigError::Io { path, source: e }),
    }
}

/// Persists the config to disk, creating the directory if needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config(config: &ControllerConfig) -> Result<(), ConfigError> {
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
        // Arrange / Act
        let cfg = ControllerConfig::default();

        // Assert
        assert_eq!(cfg.session.client_name, "controller");
        assert_eq!(cfg.session.agent_side, "right");
        assert_eq!(cfg.session.log_level, "info");
        assert_eq!(cfg.network.port, 24820);
        assert_eq!(cfg.network.bind_address, "0.0.0.0");
    }

    #[test]
    fn test_config_round_trips_through_toml() {
        // Arrange
        let mut cfg = ControllerConfig::default();
        cfg.session.client_name = "desk-machine".to_string();
        cfg.network.port = 9000;

        // Act
        let toml_str = toml::to_string_pretty(&cfg).expect("serialize");
        let restored: ControllerConfig = toml::from_str(&toml_str).expect("deserialize");

        // Assert
        assert_eq!(cfg, restored);
    }

    #[test]
    fn test_missing_fields_fall_back_to_defaults() {
        let cfg: ControllerConfig = toml::from_str(
            r#"
            [session]
            client_name = "desk"
            "#,
        )
        .expect("partial config must parse");

        assert_eq!(cfg.session.client_name, "desk");
        assert_eq!(cfg.session.agent_side, "right");
        assert_eq!(cfg.network.port, 24820);
    }

    #[test]
    fn test_empty_file_parses_to_defaults() {
        let cfg: ControllerConfig = toml::from_str("").expect("empty config must parse");
        assert_eq!(cfg, ControllerConfig::default());
    }
}
