//! Configuration file support
//!
//! Loads configuration from TOML file at ~/.config/fkm/config.toml (or the
//! path given with `--config`). Falls back to defaults if the file doesn't
//! exist or can't be parsed.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::constants;

/// Configuration file path relative to home
const CONFIG_SUBDIR: &str = ".config/fkm";
const CONFIG_FILE: &str = "config.toml";

/// fkm configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct AppConfig {
    /// Program used to elevate mutating commands
    pub privilege_helper: String,

    /// Upper bound for a single command, in seconds. 0 disables the bound.
    pub command_timeout_secs: u64,

    /// Filesystem locations touched by the managed tools
    pub paths: PathConfig,

    /// Snapshot settings
    pub snapshot: SnapshotConfig,

    /// Output pane settings
    pub output: OutputConfig,
}

impl Default for AppConfig {
    fn default() -> Self {
        Self {
            privilege_helper: constants::DEFAULT_PRIVILEGE_HELPER.to_string(),
            command_timeout_secs: constants::DEFAULT_COMMAND_TIMEOUT_SECS,
            paths: PathConfig::default(),
            snapshot: SnapshotConfig::default(),
            output: OutputConfig::default(),
        }
    }
}

/// Filesystem paths
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct PathConfig {
    pub boot_dir: PathBuf,
    pub modules_dir: PathBuf,
    pub dnf_conf: PathBuf,
    pub grub_cfg: PathBuf,
    pub os_release: PathBuf,
}

impl Default for PathConfig {
    fn default() -> Self {
        Self {
            boot_dir: PathBuf::from(constants::DEFAULT_BOOT_DIR),
            modules_dir: PathBuf::from(constants::DEFAULT_MODULES_DIR),
            dnf_conf: PathBuf::from(constants::DEFAULT_DNF_CONF),
            grub_cfg: PathBuf::from(constants::DEFAULT_GRUB_CFG),
            os_release: PathBuf::from(constants::DEFAULT_OS_RELEASE),
        }
    }
}

/// Snapshot configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct SnapshotConfig {
    /// Description passed to snapper for pre-operation snapshots
    pub description: String,
}

impl Default for SnapshotConfig {
    fn default() -> Self {
        Self {
            description: constants::DEFAULT_SNAPSHOT_DESCRIPTION.to_string(),
        }
    }
}

/// Output pane configuration
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct OutputConfig {
    /// Lines kept in memory; the screen log file keeps everything
    pub max_lines: usize,
}

impl Default for OutputConfig {
    fn default() -> Self {
        Self {
            max_lines: constants::DEFAULT_OUTPUT_LINES,
        }
    }
}

impl AppConfig {
    /// Load configuration from the given file or the default location.
    /// Missing or invalid files yield defaults.
    pub fn load(path: Option<&Path>) -> Self {
        let path = path
            .map(Path::to_path_buf)
            .unwrap_or_else(config_file_path);

        if !path.exists() {
            return Self::default();
        }

        match std::fs::read_to_string(&path) {
            Ok(content) => match toml::from_str(&content) {
                Ok(config) => {
                    tracing::info!("Loaded configuration from {}", path.display());
                    config
                }
                Err(e) => {
                    tracing::warn!("Failed to parse config file: {}, using defaults", e);
                    Self::default()
                }
            },
            Err(e) => {
                tracing::warn!("Failed to read config file: {}, using defaults", e);
                Self::default()
            }
        }
    }

    /// Bounded timeout for a single command, if enabled
    pub fn command_timeout(&self) -> Option<Duration> {
        (self.command_timeout_secs > 0).then(|| Duration::from_secs(self.command_timeout_secs))
    }

    /// Render the effective configuration
    pub fn to_toml(&self) -> anyhow::Result<String> {
        Ok(toml::to_string_pretty(self)?)
    }
}

/// Get the configuration file path
fn config_file_path() -> PathBuf {
    dirs::home_dir()
        .map(|h| h.join(CONFIG_SUBDIR).join(CONFIG_FILE))
        .unwrap_or_else(|| PathBuf::from("/etc/fkm/config.toml"))
}
