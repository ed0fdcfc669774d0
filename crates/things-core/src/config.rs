use std::fs;
use std::path::{Path, PathBuf};

use serde::Deserialize;
use thiserror::Error;

use crate::script::DEFAULT_APP_NAME;

pub const DEFAULT_LOGBOOK_LIST: &str = "Logbook";
pub const DEFAULT_ADD_LIST: &str = "inbox";
pub const DEFAULT_TODAY_LIST: &str = "Today";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Config IO error at {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },
    #[error("Failed to parse config {path}: {source}")]
    Parse {
        path: PathBuf,
        #[source]
        source: toml::de::Error,
    },
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
pub struct ThingsConfig {
    /// Application name scripts talk to (e.g. "Things3").
    pub app_name: Option<String>,
    /// List holding logged (completed) to-dos.
    pub logbook_list: Option<String>,
    /// List `add` uses when none is given.
    pub default_list: Option<String>,
    /// List shown when no subcommand is given.
    pub today_list: Option<String>,
    /// Program and leading arguments used in place of `osascript`.
    pub bridge_command: Option<Vec<String>>,
}

impl ThingsConfig {
    pub fn app_name(&self) -> &str {
        setting(&self.app_name, DEFAULT_APP_NAME)
    }

    pub fn logbook_list(&self) -> &str {
        setting(&self.logbook_list, DEFAULT_LOGBOOK_LIST)
    }

    pub fn default_list(&self) -> &str {
        setting(&self.default_list, DEFAULT_ADD_LIST)
    }

    pub fn today_list(&self) -> &str {
        setting(&self.today_list, DEFAULT_TODAY_LIST)
    }
}

fn setting<'a>(value: &'a Option<String>, default: &'a str) -> &'a str {
    value
        .as_deref()
        .map(str::trim)
        .filter(|value| !value.is_empty())
        .unwrap_or(default)
}

pub fn resolve_user_home_dir() -> Option<PathBuf> {
    if let Ok(home) = std::env::var("HOME") {
        let trimmed = home.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }
    if let Ok(profile) = std::env::var("USERPROFILE") {
        let trimmed = profile.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }
    None
}

pub fn resolve_things_home_dir() -> Option<PathBuf> {
    if let Ok(value) = std::env::var("THINGS_CLI_HOME") {
        let trimmed = value.trim();
        if !trimmed.is_empty() {
            return Some(PathBuf::from(trimmed));
        }
    }
    resolve_user_home_dir().map(|home| home.join(".things-cli"))
}

pub fn config_path() -> Option<PathBuf> {
    resolve_things_home_dir().map(|home| home.join("config.toml"))
}

/// Load `path`, treating a missing file as an empty config.
pub fn load_config_from(path: &Path) -> Result<ThingsConfig, ConfigError> {
    if !path.is_file() {
        return Ok(ThingsConfig::default());
    }
    let text = fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    toml::from_str(&text).map_err(|source| ConfigError::Parse {
        path: path.to_path_buf(),
        source,
    })
}

pub fn load_config() -> Result<ThingsConfig, ConfigError> {
    match config_path() {
        Some(path) => load_config_from(&path),
        None => Ok(ThingsConfig::default()),
    }
}
