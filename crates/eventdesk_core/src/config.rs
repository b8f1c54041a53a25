//! Process configuration.
//!
//! # Responsibility
//! - Load settings from TOML text or a file, with environment overrides.
//! - Reject settings the core cannot run with.
//!
//! # Invariants
//! - A validated config always names a supported default timezone.
//! - Missing keys fall back to [`EventDeskConfig::default`] values.

use crate::logging::{default_log_level, LogTarget};
use crate::timezone::{is_supported, DEFAULT_TIMEZONE_CODE};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::{Path, PathBuf};

pub const ENV_DATABASE_PATH: &str = "EVENTDESK_DATABASE_PATH";
pub const ENV_LOG_LEVEL: &str = "EVENTDESK_LOG_LEVEL";

const DEFAULT_DATABASE_FILE: &str = "eventdesk.sqlite3";
const DEFAULT_PAGE_SIZE: u32 = 100;

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct EventDeskConfig {
    /// SQLite database file.
    pub database_path: PathBuf,
    pub log_level: String,
    /// Absolute directory for rolling logs; stderr when absent.
    pub log_dir: Option<PathBuf>,
    /// Code used when a caller does not name a timezone.
    pub default_timezone: String,
    /// Limit applied by front ends when a caller does not page explicitly.
    pub default_page_size: u32,
}

impl Default for EventDeskConfig {
    fn default() -> Self {
        Self {
            database_path: PathBuf::from(DEFAULT_DATABASE_FILE),
            log_level: default_log_level().to_string(),
            log_dir: None,
            default_timezone: DEFAULT_TIMEZONE_CODE.to_string(),
            default_page_size: DEFAULT_PAGE_SIZE,
        }
    }
}

impl EventDeskConfig {
    /// Parses and validates TOML text.
    pub fn from_toml_str(content: &str) -> Result<Self, ConfigError> {
        let config: Self =
            toml::from_str(content).map_err(|err| ConfigError::Parse(err.to_string()))?;
        config.validate()?;
        Ok(config)
    }

    /// Reads, parses and validates a TOML file.
    pub fn from_toml_file(path: impl AsRef<Path>) -> Result<Self, ConfigError> {
        let path = path.as_ref();
        let content = std::fs::read_to_string(path).map_err(|err| ConfigError::Io {
            path: path.to_path_buf(),
            message: err.to_string(),
        })?;
        Self::from_toml_str(&content)
    }

    /// Applies `EVENTDESK_*` environment overrides, then re-validates.
    pub fn with_env_overrides(self) -> Result<Self, ConfigError> {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    fn with_overrides(
        mut self,
        lookup: impl Fn(&str) -> Option<String>,
    ) -> Result<Self, ConfigError> {
        if let Some(path) = lookup(ENV_DATABASE_PATH).filter(|value| !value.trim().is_empty()) {
            self.database_path = PathBuf::from(path.trim());
        }
        if let Some(level) = lookup(ENV_LOG_LEVEL).filter(|value| !value.trim().is_empty()) {
            self.log_level = level.trim().to_string();
        }
        self.validate()?;
        Ok(self)
    }

    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database_path.as_os_str().is_empty() {
            return Err(ConfigError::Invalid(
                "database_path must not be empty".to_string(),
            ));
        }
        if !is_supported(self.default_timezone.as_str()) {
            return Err(ConfigError::Invalid(format!(
                "default_timezone `{}` is not supported",
                self.default_timezone
            )));
        }
        if self.default_page_size == 0 {
            return Err(ConfigError::Invalid(
                "default_page_size must be greater than 0".to_string(),
            ));
        }
        Ok(())
    }

    pub fn log_target(&self) -> LogTarget {
        match &self.log_dir {
            Some(dir) => LogTarget::Directory(dir.clone()),
            None => LogTarget::Stderr,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ConfigError {
    Io { path: PathBuf, message: String },
    Parse(String),
    Invalid(String),
}

impl Display for ConfigError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Io { path, message } => {
                write!(f, "failed to read config `{}`: {message}", path.display())
            }
            Self::Parse(message) => write!(f, "invalid config syntax: {message}"),
            Self::Invalid(message) => write!(f, "invalid config: {message}"),
        }
    }
}

impl Error for ConfigError {}
