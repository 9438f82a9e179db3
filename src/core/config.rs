use serde::{Deserialize, Serialize};
use std::path::PathBuf;
use thiserror::Error;

use crate::core::client::{validate_endpoint, DEFAULT_API_VERSION, DEFAULT_ENDPOINT};
use crate::core::models::params::{OutputMode, SubscriptionId};

#[derive(Error, Debug)]
pub enum ConfigError {
    #[error("Failed to read config: {0}")]
    ReadError(#[from] std::io::Error),
    #[error("Failed to parse config: {0}")]
    ParseError(#[from] toml::de::Error),
    #[error("Failed to serialize config: {0}")]
    SerializeError(#[from] toml::ser::Error),
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Settings {
    #[serde(default = "default_output")]
    pub default_output: String,
    #[serde(default = "default_color")]
    pub color: String,
}

fn default_output() -> String {
    "console".to_string()
}
fn default_color() -> String {
    "auto".to_string()
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            default_output: default_output(),
            color: default_color(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AzureConfig {
    /// Used when `--subscription` is not given
    pub subscription_id: Option<String>,
    #[serde(default = "default_endpoint")]
    pub endpoint: String,
    #[serde(default = "default_api_version")]
    pub api_version: String,
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_endpoint() -> String {
    DEFAULT_ENDPOINT.to_string()
}
fn default_api_version() -> String {
    DEFAULT_API_VERSION.to_string()
}
fn default_timeout_secs() -> u64 {
    60
}

impl Default for AzureConfig {
    fn default() -> Self {
        Self {
            subscription_id: None,
            endpoint: default_endpoint(),
            api_version: default_api_version(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub settings: Settings,
    #[serde(default)]
    pub azure: AzureConfig,
}

impl AppConfig {
    /// Get the config file path, respecting XDG_CONFIG_HOME
    pub fn config_path() -> PathBuf {
        let config_dir = std::env::var("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .unwrap_or_else(|_| {
                dirs::home_dir()
                    .unwrap_or_else(|| PathBuf::from("~"))
                    .join(".config")
            });
        config_dir.join("azcost").join("config.toml")
    }

    /// Load config from the default path, falling back to defaults if not found
    pub fn load() -> Result<Self, ConfigError> {
        let path = Self::config_path();
        if !path.exists() {
            return Ok(Self::default());
        }
        let content = std::fs::read_to_string(&path)?;
        let config: AppConfig = toml::from_str(&content)?;
        Ok(config)
    }

    /// Serialize and write this config to the config file path.
    pub fn save(&self) -> Result<PathBuf, ConfigError> {
        let path = Self::config_path();
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)?;
        std::fs::write(&path, content)?;
        Ok(path)
    }

    /// Output mode from settings; unknown values fall back to console.
    pub fn output_mode(&self) -> OutputMode {
        OutputMode::from_id(&self.settings.default_output).unwrap_or(OutputMode::Console)
    }

    /// Validate the config
    pub fn validate(&self) -> Vec<String> {
        let mut issues = Vec::new();
        if OutputMode::from_id(&self.settings.default_output).is_none() {
            issues.push(format!(
                "Invalid default_output: '{}' (must be 'console' or 'json')",
                self.settings.default_output
            ));
        }
        if !["auto", "always", "never"].contains(&self.settings.color.as_str()) {
            issues.push(format!(
                "Invalid color: '{}' (must be 'auto', 'always', or 'never')",
                self.settings.color
            ));
        }
        if let Some(id) = &self.azure.subscription_id {
            if id.parse::<SubscriptionId>().is_err() {
                issues.push(format!("Invalid azure.subscription_id: '{}'", id));
            }
        }
        if let Err(e) = validate_endpoint(&self.azure.endpoint) {
            issues.push(format!("Invalid azure.endpoint: {}", e));
        }
        if self.azure.api_version.trim().is_empty() {
            issues.push("azure.api_version must not be empty".to_string());
        }
        if self.azure.timeout_secs == 0 {
            issues.push("azure.timeout_secs must be greater than 0".to_string());
        }
        issues
    }
}
