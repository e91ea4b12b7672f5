//! Global configuration
//!
//! Stored in `config.toml` under the platform config directory
//! (e.g. `~/.config/dashbook/config.toml`). Every section defaults, so a
//! missing file simply yields the defaults; command-line flags and
//! environment variables take precedence over anything configured here.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    pub host: HostConfig,
    pub export: ExportConfig,
}

/// Host application connection defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct HostConfig {
    /// Base URL of the host application
    pub base_url: Option<String>,

    /// API key used to authenticate requests
    pub api_key: Option<String>,
}

/// Export output defaults
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct ExportConfig {
    /// Directory exported files are written to
    pub output_dir: Option<PathBuf>,
}

impl Config {
    /// Path of the global config file, if a home directory exists
    pub fn global_path() -> Option<PathBuf> {
        ProjectDirs::from("", "", "dashbook").map(|dirs| dirs.config_dir().join("config.toml"))
    }

    /// Loads the global configuration; a missing file yields defaults
    pub fn load() -> Result<Self> {
        match Self::global_path() {
            Some(path) => Self::load_from(&path),
            None => Ok(Self::default()),
        }
    }

    /// Loads configuration from an explicit path
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;
        toml::from_str(&content)
            .with_context(|| format!("Failed to parse config: {}", path.display()))
    }
}
