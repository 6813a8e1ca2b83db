//! Application configuration loaded from a TOML file.
//!
//! Every field has a default, so a missing or empty file yields a working
//! live session rooted at the drive container.

use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};

use crate::error::{CoreError, CoreResult};
use crate::fs::sim::DEFAULT_CONTENT_CAP;

/// Top-level application configuration.
///
/// Call [`Config::load`] to read from a TOML path, or
/// [`Config::load_or_default`] when the file is optional.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub general: GeneralConfig,
    #[serde(default)]
    pub simulation: SimulationConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

impl Config {
    /// Loads configuration from a TOML file at `path`.
    ///
    /// # Errors
    ///
    /// - [`CoreError::NotFound`] if the file does not exist.
    /// - [`CoreError::PermissionDenied`] if the file is not readable.
    /// - [`CoreError::ConfigParse`] if the TOML is malformed.
    pub fn load(path: &Path) -> CoreResult<Self> {
        let content = std::fs::read_to_string(path).map_err(|e| match e.kind() {
            std::io::ErrorKind::NotFound => CoreError::NotFound(path.to_path_buf()),
            std::io::ErrorKind::PermissionDenied => CoreError::PermissionDenied(path.to_path_buf()),
            _ => CoreError::Io(e),
        })?;
        toml::from_str(&content).map_err(|e| CoreError::ConfigParse(e.to_string()))
    }

    /// Like [`Config::load`], but a missing file yields the defaults.
    pub fn load_or_default(path: &Path) -> CoreResult<Self> {
        match Self::load(path) {
            Err(CoreError::NotFound(_)) => {
                tracing::debug!("no config at {}, using defaults", path.display());
                Ok(Self::default())
            }
            other => other,
        }
    }

    /// `$XDG_CONFIG_HOME/simfm/config.toml`, else
    /// `$HOME/.config/simfm/config.toml`. `None` when neither is set.
    pub fn default_path() -> Option<PathBuf> {
        let base = std::env::var_os("XDG_CONFIG_HOME")
            .filter(|v| !v.is_empty())
            .map(PathBuf::from)
            .or_else(|| {
                std::env::var_os("HOME")
                    .filter(|v| !v.is_empty())
                    .map(|home| PathBuf::from(home).join(".config"))
            })?;
        Some(base.join("simfm").join("config.toml"))
    }
}

/// Which backend a session runs on.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Mode {
    #[default]
    Live,
    Simulated,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct GeneralConfig {
    #[serde(default)]
    pub mode: Mode,
    /// Starting folder in live mode. The drive container when unset.
    #[serde(default)]
    pub start_path: Option<PathBuf>,
}

/// Simulated-backend settings.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SimulationConfig {
    #[serde(default = "default_snapshot_dir")]
    pub snapshot_dir: PathBuf,
    /// Real folder imported when no snapshot can be loaded.
    #[serde(default)]
    pub scan_root: Option<PathBuf>,
    /// Bytes of file content captured by a scan; `0` captures everything.
    #[serde(default = "default_content_cap")]
    pub content_cap_bytes: usize,
}

impl SimulationConfig {
    /// The cap in the form [`SimFs::scan`](crate::fs::SimFs::scan) takes.
    pub fn content_cap(&self) -> Option<usize> {
        (self.content_cap_bytes > 0).then_some(self.content_cap_bytes)
    }
}

impl Default for SimulationConfig {
    fn default() -> Self {
        Self {
            snapshot_dir: default_snapshot_dir(),
            scan_root: None,
            content_cap_bytes: default_content_cap(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_level")]
    pub level: String,
    /// Log file. `simfm.log` in the temp directory when unset.
    #[serde(default)]
    pub file: Option<PathBuf>,
}

impl LoggingConfig {
    pub fn file_path(&self) -> PathBuf {
        self.file
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("simfm.log"))
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_level(),
            file: None,
        }
    }
}

fn default_snapshot_dir() -> PathBuf {
    PathBuf::from(".")
}

fn default_content_cap() -> usize {
    DEFAULT_CONTENT_CAP
}

fn default_level() -> String {
    "info".to_string()
}
