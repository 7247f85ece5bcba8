//! Configuration management for Resonance using the prefer crate.

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::warn;
use url::Url;

use crate::views::PageLimit;

/// Backend address used when nothing is configured.
pub const DEFAULT_API_URL: &str = "http://localhost:5000";

/// Configuration errors.
#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Invalid API URL {url:?}: {source}")]
    InvalidUrl {
        url: String,
        source: url::ParseError,
    },
    #[error("Unsupported API URL scheme {0:?} (expected http or https)")]
    UnsupportedScheme(String),
}

/// Application settings.
#[derive(Debug, Clone)]
pub struct Settings {
    /// Base URL of the analysis backend.
    pub api_url: Url,
    /// Page size the list views start with.
    pub default_limit: PageLimit,
    /// Request timeout in seconds. None waits indefinitely.
    pub request_timeout: Option<u64>,
    /// User agent for HTTP requests.
    pub user_agent: String,
}

impl Default for Settings {
    fn default() -> Self {
        Self {
            api_url: Url::parse(DEFAULT_API_URL).expect("default API URL is valid"),
            default_limit: PageLimit::default(),
            request_timeout: None,
            user_agent: format!("Resonance/{}", env!("CARGO_PKG_VERSION")),
        }
    }
}

impl Settings {
    /// Replace the API URL after validating it.
    pub fn set_api_url(&mut self, raw: &str) -> Result<(), ConfigError> {
        self.api_url = parse_api_url(raw)?;
        Ok(())
    }
}

/// Parse and validate a backend base URL.
pub fn parse_api_url(raw: &str) -> Result<Url, ConfigError> {
    let url = Url::parse(raw.trim()).map_err(|source| ConfigError::InvalidUrl {
        url: raw.to_string(),
        source,
    })?;
    match url.scheme() {
        "http" | "https" => Ok(url),
        other => Err(ConfigError::UnsupportedScheme(other.to_string())),
    }
}

/// Configuration file structure.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Config {
    /// Backend base URL.
    #[serde(default)]
    pub api_url: Option<String>,
    /// Initial page size (25, 50 or 100).
    #[serde(default)]
    pub default_limit: Option<u32>,
    /// Request timeout in seconds.
    #[serde(default)]
    pub request_timeout: Option<u64>,
    /// User agent string.
    #[serde(default)]
    pub user_agent: Option<String>,
}

impl Config {
    /// Load configuration using prefer crate.
    /// Automatically discovers resonance config files in standard locations.
    pub async fn load() -> Self {
        match prefer::load("resonance").await {
            Ok(pref_config) => {
                let api_url: Option<String> = pref_config.get("api_url").ok();
                let default_limit: Option<u32> = pref_config.get("default_limit").ok();
                let request_timeout: Option<u64> = pref_config.get("request_timeout").ok();
                let user_agent: Option<String> = pref_config.get("user_agent").ok();

                Config {
                    api_url,
                    default_limit,
                    request_timeout,
                    user_agent,
                }
            }
            Err(_) => Self::default(),
        }
    }

    /// Apply configuration to settings. Invalid values are logged and skipped.
    pub fn apply_to_settings(&self, settings: &mut Settings) {
        if let Some(ref api_url) = self.api_url {
            if let Err(e) = settings.set_api_url(api_url) {
                warn!("Ignoring configured api_url: {}", e);
            }
        }
        if let Some(limit) = self.default_limit {
            match PageLimit::try_from(limit) {
                Ok(limit) => settings.default_limit = limit,
                Err(e) => warn!("Ignoring configured default_limit: {}", e),
            }
        }
        if let Some(timeout) = self.request_timeout {
            settings.request_timeout = Some(timeout);
        }
        if let Some(ref user_agent) = self.user_agent {
            settings.user_agent = user_agent.clone();
        }
    }
}

/// Load settings from configuration (async version).
pub async fn load_settings() -> Settings {
    let config = Config::load().await;
    let mut settings = Settings::default();
    config.apply_to_settings(&mut settings);
    settings
}
