//! TOML-based configuration for the on-screen keyboard.
//!
//! Reads `OskConfig` from the platform-appropriate config file:
//! - Windows:  `%APPDATA%\OnScreenKeyboard\config.toml`
//! - Linux:    `~/.config/onscreenkeyboard/config.toml`
//! - macOS:    `~/Library/Application Support/OnScreenKeyboard/config.toml`
//!
//! # What is TOML? (for beginners)
//!
//! TOML (Tom's Obvious Minimal Language) is a configuration file format designed
//! to be easy to read and write.  Example:
//!
//! ```toml
//! [keyboard]
//! layout = "US"
//! poll_interval_ms = 100
//!
//! [logging]
//! level = "debug"
//! ```
//!
//! # Serde default values
//!
//! Every field is annotated with `#[serde(default = "some_fn")]`, so a missing
//! file, an empty file and a file with only some keys all load.  The keyboard
//! never writes its state back; [`save_config`] exists only to write the
//! initial template requested with `--write-default-config`.

use std::path::{Path, PathBuf};
use std::time::Duration;

use osk_core::DEFAULT_LAYOUT_NAME;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::runtime::RuntimeConfig;

/// Name of the config file inside the platform config directory.
pub const CONFIG_FILE_NAME: &str = "config.toml";

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// The platform config directory could not be determined.
    #[error("could not determine platform config directory")]
    NoPlatformConfigDir,

    /// A file system I/O error occurred.
    #[error("I/O error accessing config at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// The TOML content could not be parsed.
    #[error("failed to parse config TOML: {0}")]
    Parse(#[from] toml::de::Error),

    /// The config could not be serialized to TOML.
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),

    /// A value parsed but is out of range.
    #[error("invalid value for {field}: {reason}")]
    Invalid { field: &'static str, reason: String },
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct OskConfig {
    #[serde(default)]
    pub keyboard: KeyboardConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

/// Layout and timing settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct KeyboardConfig {
    /// Layout loaded at startup.  Unknown names fall back to the default layout.
    #[serde(default = "default_layout")]
    pub layout: String,
    /// How often Caps Lock / Shift are sampled.
    #[serde(default = "default_poll_interval_ms")]
    pub poll_interval_ms: u64,
    /// Delay between a click and the follow-up modifier reconciliation.
    #[serde(default = "default_flash_step_ms")]
    pub reconcile_delay_ms: u64,
    /// Delay between that reconciliation and clearing the click highlight.
    #[serde(default = "default_flash_step_ms")]
    pub release_delay_ms: u64,
}

/// Logging settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct LoggingConfig {
    /// `tracing` filter directive: `"error"`, `"warn"`, `"info"`, `"debug"`,
    /// `"trace"`, or a full `EnvFilter` string.  `RUST_LOG` takes precedence.
    #[serde(default = "default_log_level")]
    pub level: String,
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_layout() -> String {
    DEFAULT_LAYOUT_NAME.to_string()
}
fn default_poll_interval_ms() -> u64 {
    100
}
fn default_flash_step_ms() -> u64 {
    50
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Default for KeyboardConfig {
    fn default() -> Self {
        Self {
            layout: default_layout(),
            poll_interval_ms: default_poll_interval_ms(),
            reconcile_delay_ms: default_flash_step_ms(),
            release_delay_ms: default_flash_step_ms(),
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
        }
    }
}

impl OskConfig {
    /// Checks value ranges that serde cannot express.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::Invalid`] for a zero polling interval.
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.keyboard.poll_interval_ms == 0 {
            return Err(ConfigError::Invalid {
                field: "keyboard.poll_interval_ms",
                reason: "must be at least 1".to_string(),
            });
        }
        Ok(())
    }
}

impl KeyboardConfig {
    /// Converts the on-disk settings into runtime settings.
    pub fn to_runtime_config(&self) -> RuntimeConfig {
        RuntimeConfig {
            layout: self.layout.clone(),
            poll_interval: Duration::from_millis(self.poll_interval_ms),
            reconcile_delay: Duration::from_millis(self.reconcile_delay_ms),
            release_delay: Duration::from_millis(self.release_delay_ms),
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the platform-appropriate directory for the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] when the platform config base
/// directory cannot be determined from the environment.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    platform_config_dir().ok_or(ConfigError::NoPlatformConfigDir)
}

/// Resolves the full path to the default config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoPlatformConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join(CONFIG_FILE_NAME))
}

/// Loads the config from the default location.
///
/// # Errors
///
/// See [`load_config_from`].
pub fn load_config() -> Result<OskConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Loads and validates the config at `path`, returning
/// `OskConfig::default()` if the file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// [`ConfigError::Parse`] if the TOML is malformed and
/// [`ConfigError::Invalid`] for out-of-range values.
pub fn load_config_from(path: &Path) -> Result<OskConfig, ConfigError> {
    let config = match std::fs::read_to_string(path) {
        Ok(content) => toml::from_str::<OskConfig>(&content)?,
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => OskConfig::default(),
        Err(e) => {
            return Err(ConfigError::Io {
                path: path.to_path_buf(),
                source: e,
            })
        }
    };
    config.validate()?;
    Ok(config)
}

/// Writes `config` to the default location.
///
/// # Errors
///
/// See [`save_config_to`].
pub fn save_config(config: &OskConfig) -> Result<PathBuf, ConfigError> {
    let path = config_file_path()?;
    save_config_to(config, &path)?;
    Ok(path)
}

/// Writes `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config_to(config: &OskConfig, path: &Path) -> Result<(), ConfigError> {
    if let Some(dir) = path.parent() {
        std::fs::create_dir_all(dir).map_err(|source| ConfigError::Io {
            path: dir.to_path_buf(),
            source,
        })?;
    }

    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })
}

/// Resolves the platform config directory, including the application subdirectory.
fn platform_config_dir() -> Option<PathBuf> {
    #[cfg(target_os = "windows")]
    {
        // %APPDATA% e.g. C:\Users\<user>\AppData\Roaming
        std::env::var_os("APPDATA").map(|p| PathBuf::from(p).join("OnScreenKeyboard"))
    }

    #[cfg(target_os = "linux")]
    {
        // XDG_CONFIG_HOME or ~/.config
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))?;
        Some(base.join("onscreenkeyboard"))
    }

    #[cfg(target_os = "macos")]
    {
        std::env::var_os("HOME").map(|h| {
            PathBuf::from(h)
                .join("Library")
                .join("Application Support")
                .join("OnScreenKeyboard")
        })
    }

    #[cfg(not(any(target_os = "windows", target_os = "linux", target_os = "macos")))]
    {
        None
    }
}

// ── Tests ─────────────────────────────────────────────────────────────────────
