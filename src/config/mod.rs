//! Configuration management for the support-bot client
//!
//! Supports configuration via:
//! 1. Config file (~/.config/supportbot/config.toml)
//! 2. Environment variables (SUPPORTBOT_BASE_URL, SUPPORTBOT_WIDGET_ID, etc.)
//! 3. CLI arguments (override file/env settings)

use crate::api::DEFAULT_DELAY_MS;
use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),

    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),

    #[error("Missing required configuration: {0}")]
    MissingRequired(String),

    #[error("Invalid configuration: {0}")]
    Invalid(String),
}

/// Main configuration structure
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Chat widget endpoints
    pub widget: WidgetSettings,

    /// Dashboard (admin) endpoints
    pub dashboard: DashboardSettings,
}

/// Settings for the embeddable chat widget
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct WidgetSettings {
    /// Base URL of the chat backend
    pub base_url: String,

    /// Widget identifier issued by the dashboard
    pub widget_id: String,

    /// Pause before each streamed fragment is shown, in milliseconds
    pub delay_ms: u64,

    /// Connection timeout in seconds
    pub connect_timeout_secs: u64,

    /// Whole-request timeout in seconds (none by default: streams may be long)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub request_timeout_secs: Option<u64>,
}

impl Default for WidgetSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            widget_id: String::new(),
            delay_ms: DEFAULT_DELAY_MS,
            connect_timeout_secs: 10,
            request_timeout_secs: None,
        }
    }
}

/// Settings for the dashboard API
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DashboardSettings {
    /// Base URL of the dashboard backend
    pub base_url: String,

    /// API key for `/chat` (can also use SUPPORTBOT_API_KEY env var)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub api_key: Option<String>,

    /// Request timeout in seconds
    pub timeout_secs: u64,
}

impl Default for DashboardSettings {
    fn default() -> Self {
        Self {
            base_url: "http://localhost:8000".to_string(),
            api_key: None,
            timeout_secs: 60,
        }
    }
}

impl Config {
    /// Get default config file path
    pub fn default_path() -> PathBuf {
        dirs::config_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join("supportbot")
            .join("config.toml")
    }

    /// Load config from default location
    pub fn load() -> Result<Self, ConfigError> {
        Self::load_from(Self::default_path())
    }

    /// Load config from specific path
    pub fn load_from(path: PathBuf) -> Result<Self, ConfigError> {
        if !path.exists() {
            return Ok(Self::default().with_env_overrides());
        }

        let content = std::fs::read_to_string(&path)?;
        let config: Config = toml::from_str(&content)?;

        Ok(config.with_env_overrides())
    }

    /// Apply environment variable overrides
    pub fn with_env_overrides(self) -> Self {
        self.with_overrides(|key| std::env::var(key).ok())
    }

    /// Apply overrides from any key lookup (environment in production)
    pub fn with_overrides(mut self, lookup: impl Fn(&str) -> Option<String>) -> Self {
        if let Some(url) = lookup("SUPPORTBOT_BASE_URL") {
            self.widget.base_url = url;
        }
        if let Some(id) = lookup("SUPPORTBOT_WIDGET_ID") {
            self.widget.widget_id = id;
        }
        if let Some(delay) = lookup("SUPPORTBOT_DELAY_MS").and_then(|v| v.parse().ok()) {
            self.widget.delay_ms = delay;
        }
        if let Some(url) = lookup("SUPPORTBOT_DASHBOARD_URL") {
            self.dashboard.base_url = url;
        }
        if let Some(key) = lookup("SUPPORTBOT_API_KEY") {
            self.dashboard.api_key = Some(key);
        }

        self
    }

    /// Save config to default location
    pub fn save(&self) -> Result<(), ConfigError> {
        self.save_to(Self::default_path())
    }

    /// Save config to specific path
    pub fn save_to(&self, path: PathBuf) -> Result<(), ConfigError> {
        // Create parent directories if needed
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;

        Ok(())
    }

    /// Validate configuration
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.widget.widget_id.trim().is_empty() {
            return Err(ConfigError::MissingRequired(
                "widget.widget_id (or SUPPORTBOT_WIDGET_ID)".to_string(),
            ));
        }

        for (name, url) in [
            ("widget.base_url", &self.widget.base_url),
            ("dashboard.base_url", &self.dashboard.base_url),
        ] {
            if !(url.starts_with("http://") || url.starts_with("https://")) {
                return Err(ConfigError::Invalid(format!(
                    "{} must be an http(s) URL, got '{}'",
                    name, url
                )));
            }
        }

        Ok(())
    }

    /// Dashboard API key, after env overrides were applied at load
    pub fn api_key(&self) -> Option<String> {
        self.dashboard.api_key.clone()
    }

    /// Generate example config content
    pub fn example() -> String {
        let example = ConfigBuilder::new().widget_id("your-widget-id").build();
        toml::to_string_pretty(&example).unwrap_or_default()
    }
}

/// Builder for creating Config programmatically
pub struct ConfigBuilder {
    config: Config,
}

impl ConfigBuilder {
    pub fn new() -> Self {
        Self {
            config: Config::default(),
        }
    }

    pub fn base_url(mut self, url: impl Into<String>) -> Self {
        self.config.widget.base_url = url.into();
        self
    }

    pub fn widget_id(mut self, id: impl Into<String>) -> Self {
        self.config.widget.widget_id = id.into();
        self
    }

    pub fn delay_ms(mut self, delay_ms: u64) -> Self {
        self.config.widget.delay_ms = delay_ms;
        self
    }

    pub fn request_timeout_secs(mut self, secs: u64) -> Self {
        self.config.widget.request_timeout_secs = Some(secs);
        self
    }

    pub fn dashboard_url(mut self, url: impl Into<String>) -> Self {
        self.config.dashboard.base_url = url.into();
        self
    }

    pub fn api_key(mut self, key: impl Into<String>) -> Self {
        self.config.dashboard.api_key = Some(key.into());
        self
    }

    pub fn build(self) -> Config {
        self.config
    }
}

impl Default for ConfigBuilder {
    fn default() -> Self {
        Self::new()
    }
}
