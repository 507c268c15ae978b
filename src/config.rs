//! Configuration management for the employees filter client.
//!
//! Handles loading and saving configuration from JSONC files.
//! Manages the application origin, timing, CSRF token and default filters.

use crate::filter::{FilterCriteria, FilterOptions};
use crate::repair::RepairOption;
use anyhow::{Context, Result};
use dirs::config_dir;
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Directory name under the user's config dir.
const APP_DIR: &str = "autoservice-tui";

/// Application configuration structure.
///
/// Contains the API location and user preferences.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Origin of the autoservice application
    pub base_url: String,
    /// Search debounce window in milliseconds
    pub debounce_ms: u64,
    /// HTTP request timeout in seconds
    pub request_timeout_secs: u64,
    /// CSRF token issued by the application (the page's meta value)
    pub csrf_token: Option<String>,
    /// Filters applied at start-up
    pub default_filters: FilterCriteria,
    /// Option lists of the select filters
    pub filter_options: FilterOptions,
    /// Repairs offered by the assignment form
    pub repairs: Vec<RepairOption>,
    /// Session file path (relative to config dir or absolute)
    pub session_path: String,
    /// Lifetime of session entries in minutes
    pub session_ttl_minutes: i64,
    /// Log directory (relative to config dir or absolute)
    pub log_path: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            base_url: "http://127.0.0.1:5000".to_string(),
            debounce_ms: 300,
            request_timeout_secs: 30,
            csrf_token: None,
            default_filters: FilterCriteria::default(),
            filter_options: FilterOptions::default(),
            repairs: Vec::new(),
            session_path: "session.json".to_string(),
            session_ttl_minutes: 30,
            log_path: "logs".to_string(),
        }
    }
}

impl Config {
    /// Load configuration from file.
    ///
    /// # Arguments
    /// * `path` - Optional path to config file. If None, uses default location.
    ///
    /// # Returns
    /// * `Result<Config>` - Loaded configuration or error
    ///
    /// # Details
    /// Searches for config file in:
    /// 1. Provided path (if given)
    /// 2. `$XDG_CONFIG_HOME/autoservice-tui/config.jsonc`
    /// 3. `~/.config/autoservice-tui/config.jsonc`
    ///
    /// If no config file exists, returns default configuration.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let config_path = if let Some(p) = path {
            p.to_path_buf()
        } else {
            Self::default_config_path()?
        };

        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(&config_path)
            .with_context(|| format!("Failed to read config file: {}", config_path.display()))?;

        let config: Config = serde_json::from_str(&strip_comments(&content))
            .with_context(|| "Failed to deserialize config")?;

        Ok(config)
    }

    /// Save configuration to file.
    ///
    /// # Arguments
    /// * `path` - Optional path to config file. If None, uses default location.
    ///
    /// # Returns
    /// * `Result<()>` - Success or error
    ///
    /// # Details
    /// Creates config directory if it doesn't exist.
    pub fn save(&self, path: Option<&Path>) -> Result<()> {
        let config_path = if let Some(p) = path {
            p.to_path_buf()
        } else {
            Self::default_config_path()?
        };

        // Create parent directory if it doesn't exist
        if let Some(parent) = config_path.parent() {
            fs::create_dir_all(parent).with_context(|| {
                format!("Failed to create config directory: {}", parent.display())
            })?;
        }

        let json = serde_json::to_string_pretty(self).context("Failed to serialize config")?;

        fs::write(&config_path, json)
            .with_context(|| format!("Failed to write config file: {}", config_path.display()))?;

        Ok(())
    }

    /// Get default configuration file path.
    ///
    /// # Returns
    /// * `Result<PathBuf>` - Path to config file or error
    ///
    /// # Details
    /// Returns `$XDG_CONFIG_HOME/autoservice-tui/config.jsonc` or
    /// `~/.config/autoservice-tui/config.jsonc`.
    pub fn default_config_path() -> Result<PathBuf> {
        Ok(app_config_dir()?.join("config.jsonc"))
    }

    /// Get session file path.
    ///
    /// # Details
    /// If session_path is absolute, returns it as-is.
    /// Otherwise, returns path relative to config directory.
    pub fn session_file_path(&self) -> Result<PathBuf> {
        resolve(&self.session_path)
    }

    /// Get log directory path, resolved like `session_file_path`.
    pub fn log_dir_path(&self) -> Result<PathBuf> {
        resolve(&self.log_path)
    }

    /// Search debounce window.
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }

    /// Lifetime of session entries.
    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::minutes(self.session_ttl_minutes)
    }
}

fn app_config_dir() -> Result<PathBuf> {
    let config_dir =
        config_dir().ok_or_else(|| anyhow::anyhow!("Failed to determine config directory"))?;
    Ok(config_dir.join(APP_DIR))
}

fn resolve(path: &str) -> Result<PathBuf> {
    let path = Path::new(path);
    if path.is_absolute() {
        Ok(path.to_path_buf())
    } else {
        Ok(app_config_dir()?.join(path))
    }
}

/// Strip `//` comments from JSONC text.
///
/// # Details
/// The first `//` preceded by an even number of quotes on its line starts a
/// comment; earlier ones sit inside strings (such as URLs). Escaped quotes
/// are not handled.
fn strip_comments(content: &str) -> String {
    content
        .lines()
        .map(|line| {
            let cut = line
                .match_indices("//")
                .map(|(pos, _)| pos)
                .find(|&pos| line[..pos].matches('"').count() % 2 == 0);
            match cut {
                Some(pos) => line[..pos].trim_end(),
                None => line,
            }
        })
        .collect::<Vec<_>>()
        .join("\n")
}
