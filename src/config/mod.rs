//! Configuration for the chat client
//!
//! Configuration is loaded in order of precedence:
//! 1. Environment variables (highest priority)
//! 2. Config file (~/.config/pichat/config.toml)
//! 3. Built-in defaults (lowest priority)

use anyhow::{Context, Result};
use serde::Deserialize;
use std::path::{Path, PathBuf};
use std::time::Duration;

use crate::state::StoreSettings;

// ─────────────────────────────────────────────────────────────────────────────
// Submodules
// ─────────────────────────────────────────────────────────────────────────────

mod logging;
mod serialization;
mod views;


// ─────────────────────────────────────────────────────────────────────────────
// Re-exports
// ─────────────────────────────────────────────────────────────────────────────

pub use logging::{FileLogging, LogRotation, LoggingConfig};
pub use views::{
    AnalyticsConfig, ChatConfig, FileAnalytics, FileChat, FileHistory, HistoryConfig,
};

// ─────────────────────────────────────────────────────────────────────────────
// Constants
// ─────────────────────────────────────────────────────────────────────────────

/// Version info
pub const VERSION: &str = env!("CARGO_PKG_VERSION");

pub const DEFAULT_API_URL: &str = "http://127.0.0.1:8000/api";
pub const DEFAULT_THEME: &str = "Dark";

// ─────────────────────────────────────────────────────────────────────────────
// Application Configuration
// ─────────────────────────────────────────────────────────────────────────────

/// Application configuration
#[derive(Debug, Clone, PartialEq)]
pub struct Config {
    /// Base URL of the chatbot REST API, e.g. "https://host/api"
    pub api_url: String,

    /// Where the access/refresh token pair is stored
    pub credentials_path: PathBuf,

    /// Per-request timeout; None waits indefinitely
    pub request_timeout_secs: Option<u64>,

    /// Theme name: "Dark", "Light", "Monokai", "Dracula", "Nord", "Solarized"
    pub theme: String,

    pub history: HistoryConfig,
    pub analytics: AnalyticsConfig,
    pub chat: ChatConfig,

    /// Logging configuration
    pub logging: LoggingConfig,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            credentials_path: default_credentials_path(),
            request_timeout_secs: None,
            theme: DEFAULT_THEME.to_string(),
            history: HistoryConfig::default(),
            analytics: AnalyticsConfig::default(),
            chat: ChatConfig::default(),
            logging: LoggingConfig::default(),
        }
    }
}

fn config_dir() -> Option<PathBuf> {
    dirs::home_dir().map(|p| p.join(".config").join("pichat"))
}

fn default_credentials_path() -> PathBuf {
    config_dir()
        .map(|d| d.join("credentials.json"))
        .unwrap_or_else(|| PathBuf::from("credentials.json"))
}

// ─────────────────────────────────────────────────────────────────────────────
// File Configuration (deserialization layer)
// ─────────────────────────────────────────────────────────────────────────────

/// Config file structure
#[derive(Debug, Deserialize, Default)]
pub(crate) struct FileConfig {
    pub api_url: Option<String>,
    pub credentials_path: Option<String>,
    pub request_timeout_secs: Option<u64>,
    pub theme: Option<String>,

    /// Optional [history] section
    pub history: Option<FileHistory>,

    /// Optional [analytics] section
    pub analytics: Option<FileAnalytics>,

    /// Optional [chat] section
    pub chat: Option<FileChat>,

    /// Optional [logging] section
    pub logging: Option<FileLogging>,
}

// ─────────────────────────────────────────────────────────────────────────────
// Configuration Loading
// ─────────────────────────────────────────────────────────────────────────────

impl Config {
    /// Get the config file path: ~/.config/pichat/config.toml
    /// Uses Unix-style ~/.config on all platforms for consistency
    pub fn config_path() -> Option<PathBuf> {
        config_dir().map(|d| d.join("config.toml"))
    }

    /// Create config file with defaults if it doesn't exist
    pub fn ensure_config_exists() {
        let Some(path) = Self::config_path() else {
            return;
        };
        if path.exists() {
            return;
        }
        if let Some(parent) = path.parent() {
            if std::fs::create_dir_all(parent).is_err() {
                return; // config is optional
            }
        }
        if let Err(e) = std::fs::write(&path, Self::default().to_toml()) {
            tracing::debug!("Could not write default config {}: {}", path.display(), e);
        }
    }

    /// Overwrite the config file with defaults
    pub fn reset_file() -> Result<PathBuf> {
        let path = Self::config_path().context("Could not determine home directory")?;
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("Failed to create {}", parent.display()))?;
        }
        std::fs::write(&path, Self::default().to_toml())
            .with_context(|| format!("Failed to write {}", path.display()))?;
        Ok(path)
    }

    /// Parse a config file; a missing file yields defaults, a broken one is an error
    fn load_file_config(path: &Path) -> Result<FileConfig> {
        match std::fs::read_to_string(path) {
            Ok(contents) => toml::from_str(&contents).with_context(|| {
                format!(
                    "Failed to parse configuration file {}\n\n  \
                     Check for missing quotes around strings, invalid booleans\n  \
                     (use true/false) or typos in section names.\n  \
                     To reset, run `pichat config --reset`.",
                    path.display()
                )
            }),
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(FileConfig::default()),
            Err(e) => Err(e)
                .with_context(|| format!("Cannot read configuration file {}", path.display())),
        }
    }

    /// Load configuration: env vars -> file -> defaults
    pub fn load() -> Result<Self> {
        let file = match Self::config_path() {
            Some(path) => Self::load_file_config(&path)?,
            None => FileConfig::default(),
        };
        Ok(Self::resolve(file, |key| std::env::var(key).ok()))
    }

    /// Merge a parsed file with an environment lookup
    pub(crate) fn resolve(file: FileConfig, env: impl Fn(&str) -> Option<String>) -> Self {
        let defaults = Self::default();

        // API URL: env > file > default
        let api_url = env("PICHAT_API_URL")
            .or(file.api_url)
            .unwrap_or(defaults.api_url);

        // Credentials: env > file > default
        let credentials_path = env("PICHAT_CREDENTIALS")
            .or(file.credentials_path)
            .map(PathBuf::from)
            .unwrap_or(defaults.credentials_path);

        // Timeout: env > file > none; 0 means no timeout
        let request_timeout_secs = env("PICHAT_TIMEOUT")
            .and_then(|v| v.parse().ok())
            .or(file.request_timeout_secs)
            .filter(|secs| *secs > 0);

        // Theme: env > file > default
        let theme = env("PICHAT_THEME")
            .or(file.theme)
            .unwrap_or(defaults.theme);

        Self {
            api_url,
            credentials_path,
            request_timeout_secs,
            theme,
            history: HistoryConfig::from_file(file.history),
            analytics: AnalyticsConfig::from_file(file.analytics),
            chat: ChatConfig::from_file(file.chat),
            logging: LoggingConfig::from_file(file.logging),
        }
    }

    pub fn request_timeout(&self) -> Option<Duration> {
        self.request_timeout_secs.map(Duration::from_secs)
    }

    /// Settings handed to the UI state container
    pub fn store_settings(&self) -> StoreSettings {
        StoreSettings {
            history_page_size: self.history.page_size,
            analytics_days: self.analytics.days,
            recent_questions: self.chat.recent_questions,
        }
    }
}
