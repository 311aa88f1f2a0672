//! Configuration management for lessonlog.
//!
//! This module provides configuration loading and validation using figment,
//! supporting TOML config files, environment variables, and defaults.

use std::path::PathBuf;
use std::time::Duration;

use figment::{
    providers::{Env, Format, Serialized, Toml},
    Figment,
};
use serde::{Deserialize, Serialize};

use crate::error::{Error, Result};

/// Default configuration file name.
const CONFIG_FILE_NAME: &str = "config.toml";

/// Default data directory name.
const DATA_DIR_NAME: &str = "lessonlog";

/// Default database file name.
const DATABASE_FILE_NAME: &str = "lessonlog.db";

/// Environment variables consulted for the API key when none is configured.
const API_KEY_FALLBACK_VARS: [&str; 2] = ["GEMINI_API_KEY", "API_KEY"];

/// Application configuration.
///
/// Configuration is loaded from (in order of precedence, highest first):
/// 1. Environment variables (prefixed with `LESSONLOG_`, `__` between sections)
/// 2. TOML config file at `~/.config/lessonlog/config.toml`
/// 3. Default values
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Storage configuration.
    pub storage: StorageConfig,
    /// Text generation configuration.
    pub generation: GenerationConfig,
    /// Notification configuration.
    pub notifications: NotificationConfig,
    /// Terminal rendering configuration.
    pub display: DisplayConfig,
}

/// Storage-related configuration.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct StorageConfig {
    /// Path to the database file.
    /// Defaults to `~/.local/share/lessonlog/lessonlog.db`
    pub database_path: Option<PathBuf>,
}

/// Text generation configuration.
#[derive(Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct GenerationConfig {
    /// API key. Falls back to `GEMINI_API_KEY`, then `API_KEY`.
    pub api_key: Option<String>,
    /// Model identifier.
    pub model: String,
    /// Base URL of the generation API.
    pub endpoint: String,
    /// Request timeout in seconds.
    pub timeout_secs: u64,
    /// How many times to ask for a strategy name before giving up on duplicates.
    pub suggestion_attempts: u32,
}

/// Notification configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct NotificationConfig {
    /// Seconds a notification stays visible.
    pub ttl_secs: u64,
}

/// Terminal rendering configuration.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct DisplayConfig {
    /// Width in characters of a full bar in bar charts.
    pub bar_width: usize,
}

impl Default for GenerationConfig {
    fn default() -> Self {
        Self {
            api_key: None,
            model: "gemini-2.5-flash".to_string(),
            endpoint: "https://generativelanguage.googleapis.com/v1beta".to_string(),
            timeout_secs: 60,
            suggestion_attempts: 3,
        }
    }
}

impl std::fmt::Debug for GenerationConfig {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("GenerationConfig")
            .field("api_key", &self.api_key.as_ref().map(|_| "<redacted>"))
            .field("model", &self.model)
            .field("endpoint", &self.endpoint)
            .field("timeout_secs", &self.timeout_secs)
            .field("suggestion_attempts", &self.suggestion_attempts)
            .finish()
    }
}

impl GenerationConfig {
    /// The configured API key, or the first non-empty fallback variable.
    #[must_use]
    pub fn resolved_api_key(&self) -> Option<String> {
        self.api_key
            .clone()
            .filter(|k| !k.trim().is_empty())
            .or_else(|| {
                API_KEY_FALLBACK_VARS
                    .iter()
                    .filter_map(|var| std::env::var(var).ok())
                    .find(|k| !k.trim().is_empty())
            })
    }

    /// Request timeout as a Duration.
    #[must_use]
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self { ttl_secs: 5 }
    }
}

impl Default for DisplayConfig {
    fn default() -> Self {
        Self { bar_width: 40 }
    }
}

impl Config {
    /// Load configuration from all sources, reading `config_path` or the
    /// default file location.
    ///
    /// # Errors
    ///
    /// Returns an error if configuration loading or parsing fails.
    pub fn load_from(config_path: Option<PathBuf>) -> Result<Self> {
        let config_file = config_path.unwrap_or_else(Self::default_config_path);

        let config: Config = Self::figment(Toml::file(&config_file)).extract()?;
        config.validate()?;
        Ok(config)
    }

    fn figment(toml: figment::providers::Data<Toml>) -> Figment {
        Figment::new()
            .merge(Serialized::defaults(Config::default()))
            .merge(toml.nested())
            .merge(Env::prefixed("LESSONLOG_").split("__"))
    }

    /// Get the default configuration file path.
    #[must_use]
    pub fn default_config_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from(".config"))
            .join(DATA_DIR_NAME)
            .join(CONFIG_FILE_NAME)
    }

    /// Get the default data directory path.
    #[must_use]
    pub fn default_data_dir() -> PathBuf {
        dirs::data_local_dir()
            .unwrap_or_else(|| PathBuf::from(".local/share"))
            .join(DATA_DIR_NAME)
    }

    /// Validate the configuration.
    ///
    /// # Errors
    ///
    /// Returns an error if any configuration values are invalid.
    pub fn validate(&self) -> Result<()> {
        if self.generation.model.trim().is_empty() {
            return Err(Error::ConfigValidation {
                message: "generation.model must not be empty".to_string(),
            });
        }

        if self.generation.timeout_secs == 0 {
            return Err(Error::ConfigValidation {
                message: "generation.timeout_secs must be greater than 0".to_string(),
            });
        }

        if self.generation.suggestion_attempts == 0 {
            return Err(Error::ConfigValidation {
                message: "generation.suggestion_attempts must be greater than 0".to_string(),
            });
        }

        if self.notifications.ttl_secs == 0 {
            return Err(Error::ConfigValidation {
                message: "notifications.ttl_secs must be greater than 0".to_string(),
            });
        }

        if self.display.bar_width == 0 {
            return Err(Error::ConfigValidation {
                message: "display.bar_width must be greater than 0".to_string(),
            });
        }

        Ok(())
    }

    /// Get the database path, resolving defaults if not set.
    #[must_use]
    pub fn database_path(&self) -> PathBuf {
        self.storage
            .database_path
            .clone()
            .unwrap_or_else(|| Self::default_data_dir().join(DATABASE_FILE_NAME))
    }

    /// Notification lifetime as a chrono duration.
    #[must_use]
    pub fn notification_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(i64::try_from(self.notifications.ttl_secs).unwrap_or(i64::MAX))
    }
}
