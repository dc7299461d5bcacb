//! TOML-based configuration for the screen manager.
//!
//! Reads and writes `AppConfig` at `$XDG_CONFIG_HOME/screen-manager/config.toml`
//! (falling back to `~/.config/screen-manager/config.toml`).  The binary can
//! point at another file with `--config`.
//!
//! # Example (for beginners)
//!
//! ```toml
//! [general]
//! log_level = "debug"
//!
//! [scan]
//! merge_policy = "identical-geometry"
//! tick_interval_ms = 100
//!
//! [reassign]
//! preserve_offset = true
//!
//! # Split the left half of a 4K monitor into its own screen.
//! [[fake_screens]]
//! x = 0
//! y = 0
//! width = 1920
//! height = 2160
//! ```
//!
//! # Serde default values
//!
//! Fields annotated with `#[serde(default = "some_fn")]` use the return value
//! of `some_fn()` when the field is absent from the TOML file, and whole
//! sections fall back to their `Default` impl.  An empty file is therefore a
//! valid configuration.

use std::path::{Path, PathBuf};

use screen_core::{policy_by_name, Area, MergePolicy};
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::application::reassign_clients::ReassignOptions;
use crate::application::subsystem::SubsystemOptions;

/// Error type for configuration file operations.
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Neither `XDG_CONFIG_HOME` nor `HOME` is set.
    #[error("could not determine config directory")]
    NoConfigDir,

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

    /// `scan.merge_policy` names no known policy.
    #[error("unknown merge policy '{0}'")]
    UnknownMergePolicy(String),
}

// ── Config schema types ───────────────────────────────────────────────────────

/// Top-level configuration stored on disk.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct AppConfig {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub scan: ScanConfig,
    #[serde(default)]
    pub reassign: ReassignConfig,
    #[serde(default)]
    pub fake_screens: Vec<FakeScreenEntry>,
}

/// General settings.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct GeneralConfig {
    /// `tracing` log level: `"error"`, `"warn"`, `"info"`, `"debug"`, `"trace"`.
    #[serde(default = "default_log_level")]
    pub log_level: String,
}

/// Scan behaviour.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct ScanConfig {
    /// `"default"`, `"identical-geometry"`, `"native-units"` or `"never"`.
    #[serde(default = "default_merge_policy")]
    pub merge_policy: String,
    /// How often the binary checks for pending scan requests.
    #[serde(default = "default_tick_interval_ms")]
    pub tick_interval_ms: u64,
}

/// Window reassignment behaviour.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq)]
pub struct ReassignConfig {
    /// Keep a window's offset within its screen when it moves screens.
    #[serde(default)]
    pub preserve_offset: bool,
}

/// A fake screen created at start-up.
#[derive(Debug, Clone, Copy, Serialize, Deserialize, PartialEq)]
pub struct FakeScreenEntry {
    pub x: i32,
    pub y: i32,
    pub width: u32,
    pub height: u32,
}

impl From<FakeScreenEntry> for Area {
    fn from(entry: FakeScreenEntry) -> Self {
        Area::new(entry.x, entry.y, entry.width, entry.height)
    }
}

// ── Default helpers ───────────────────────────────────────────────────────────

fn default_log_level() -> String {
    "info".to_string()
}
fn default_merge_policy() -> String {
    "default".to_string()
}
fn default_tick_interval_ms() -> u64 {
    250
}

impl Default for GeneralConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
        }
    }
}

impl Default for ScanConfig {
    fn default() -> Self {
        Self {
            merge_policy: default_merge_policy(),
            tick_interval_ms: default_tick_interval_ms(),
        }
    }
}

impl AppConfig {
    /// Resolves `scan.merge_policy`.
    ///
    /// # Errors
    ///
    /// Returns [`ConfigError::UnknownMergePolicy`] for an unknown name.
    pub fn merge_policy(&self) -> Result<Box<dyn MergePolicy>, ConfigError> {
        policy_by_name(&self.scan.merge_policy)
            .ok_or_else(|| ConfigError::UnknownMergePolicy(self.scan.merge_policy.clone()))
    }

    /// Subsystem options derived from this configuration.
    pub fn subsystem_options(&self) -> SubsystemOptions {
        SubsystemOptions {
            reassign: ReassignOptions {
                preserve_offset: self.reassign.preserve_offset,
            },
            fake_screens: self.fake_screens.iter().copied().map(Area::from).collect(),
        }
    }
}

// ── Config repository ─────────────────────────────────────────────────────────

/// Determines the directory holding the config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoConfigDir`] when neither `XDG_CONFIG_HOME` nor
/// `HOME` is set.
pub fn config_dir() -> Result<PathBuf, ConfigError> {
    let base = std::env::var_os("XDG_CONFIG_HOME")
        .filter(|p| !p.is_empty())
        .map(PathBuf::from)
        .or_else(|| std::env::var_os("HOME").map(|h| PathBuf::from(h).join(".config")))
        .ok_or(ConfigError::NoConfigDir)?;
    Ok(base.join("screen-manager"))
}

/// Resolves the full path to the default config file.
///
/// # Errors
///
/// Returns [`ConfigError::NoConfigDir`] if the base directory cannot be
/// determined.
pub fn config_file_path() -> Result<PathBuf, ConfigError> {
    Ok(config_dir()?.join("config.toml"))
}

/// Loads `AppConfig` from the default location, returning
/// `AppConfig::default()` if the file does not yet exist.
///
/// # Errors
///
/// See [`load_config_from`].
pub fn load_config() -> Result<AppConfig, ConfigError> {
    load_config_from(&config_file_path()?)
}

/// Loads `AppConfig` from `path`, returning `AppConfig::default()` if the
/// file does not exist.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system errors other than "not found",
/// and [`ConfigError::Parse`] if the TOML is malformed.
pub fn load_config_from(path: &Path) -> Result<AppConfig, ConfigError> {
    match std::fs::read_to_string(path) {
        Ok(content) => Ok(toml::from_str(&content)?),
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(AppConfig::default()),
        Err(e) => Err(ConfigError::Io {
            path: path.to_path_buf(),
            source: e,
        }),
    }
}

/// Persists `config` to `path`, creating parent directories as needed.
///
/// # Errors
///
/// Returns [`ConfigError::Io`] for file-system failures or
/// [`ConfigError::Serialize`] if serialization fails.
pub fn save_config_to(config: &AppConfig, path: &Path) -> Result<(), ConfigError> {
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

// ── Tests ─────────────────────────────────────────────────────────────────────
