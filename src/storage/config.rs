//! Configuration handling for tasktree
//!
//! Configuration is read once at startup from the first of:
//! an explicit `--config` path, `tasktree.toml` in the current directory,
//! or `~/.config/tasktree/config.toml` (global). Missing files mean defaults.

use std::fs;
use std::path::{Path, PathBuf};

use anyhow::{Context, Result};
use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use thiserror::Error;

use crate::domain::SortKey;

/// File name looked up in the working directory
pub const LOCAL_CONFIG_FILE: &str = "tasktree.toml";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid configuration: {0}")]
    Invalid(String),

    #[error("Failed to parse configuration: {0}")]
    Parse(String),
}

/// Where the data file lives
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Directory holding the data file
    pub data_dir: PathBuf,

    /// Data file name inside `data_dir`
    pub file: String,
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            data_dir: PathBuf::from("data"),
            file: "tasks.txt".to_string(),
        }
    }
}

/// Identity presented to the access guard
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct UserConfig {
    /// User name (defaults to $TASKTREE_USER, then $USER)
    pub name: Option<String>,
}

impl UserConfig {
    /// Gets the effective user name from config or environment.
    ///
    /// Returns an empty string when nothing is set; the access guard treats
    /// that as unauthenticated.
    pub fn effective_name(&self) -> String {
        self.name
            .clone()
            .or_else(|| std::env::var("TASKTREE_USER").ok())
            .or_else(|| std::env::var("USER").ok())
            .unwrap_or_default()
    }
}

/// Presentation defaults
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Ordering used by `sort` when none is given (title, priority, status)
    pub default_sort: String,
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self {
            default_sort: SortKey::default().to_string(),
        }
    }
}

/// Application configuration, constructed once and passed down
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
#[serde(default)]
pub struct Config {
    pub storage: StorageConfig,
    pub user: UserConfig,
    pub display: DisplayConfig,
}

impl Config {
    /// Loads configuration from `explicit` or the default locations
    pub fn load(explicit: Option<&Path>) -> Result<Self> {
        if let Some(path) = explicit {
            return Self::from_file(path);
        }

        let local = PathBuf::from(LOCAL_CONFIG_FILE);
        if local.is_file() {
            return Self::from_file(&local);
        }

        if let Some(dir) = Self::global_config_dir() {
            let global = dir.join("config.toml");
            if global.is_file() {
                return Self::from_file(&global);
            }
        }

        Ok(Self::default())
    }

    /// Loads and validates a specific config file
    pub fn from_file(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read config: {}", path.display()))?;

        let config: Config = toml::from_str(&content)
            .map_err(|e| ConfigError::Parse(e.to_string()))
            .with_context(|| format!("Failed to parse config: {}", path.display()))?;

        config.validate()?;
        Ok(config)
    }

    /// Returns the global config directory
    pub fn global_config_dir() -> Option<PathBuf> {
        ProjectDirs::from("dev", "tasktree", "tasktree")
            .map(|dirs| dirs.config_dir().to_path_buf())
    }

    /// Checks values that serde alone cannot
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.storage.file.trim().is_empty() {
            return Err(ConfigError::Invalid("storage.file cannot be empty".into()));
        }
        self.sort_key()?;
        Ok(())
    }

    /// Default ordering for listings
    pub fn sort_key(&self) -> Result<SortKey, ConfigError> {
        self.display
            .default_sort
            .parse()
            .map_err(|_| {
                ConfigError::Invalid(format!(
                    "display.default_sort must be title, priority or status, got '{}'",
                    self.display.default_sort
                ))
            })
    }

    /// Full path of the data file.
    ///
    /// A `.json` file name (the old default) is mapped to `.txt`, since the
    /// contents were never JSON.
    pub fn storage_path(&self) -> PathBuf {
        let file = match self.storage.file.strip_suffix(".json") {
            Some(stem) => format!("{}.txt", stem),
            None => self.storage.file.clone(),
        };
        self.storage.data_dir.join(file)
    }
}
