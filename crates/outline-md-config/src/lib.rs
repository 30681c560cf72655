use serde::Deserialize;
use std::path::{Path, PathBuf};
use thiserror::Error;

/// Environment variable holding the Outline API token.
pub const TOKEN_ENV: &str = "OUTLINE_TOKEN";
/// Environment variable overriding the API base URL.
pub const API_URL_ENV: &str = "OUTLINE_API_URL";
pub const DEFAULT_API_URL: &str = "https://app.getoutline.com/api";

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("Failed to read config file at {config_path}: {source}")]
    ConfigReadError {
        config_path: PathBuf,
        source: std::io::Error,
    },

    #[error("Failed to parse config file at {config_path}: {source}")]
    ConfigParseError {
        config_path: PathBuf,
        source: toml::de::Error,
    },

    #[error("OUTLINE_TOKEN is not set")]
    MissingToken,
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Base URL of the Outline API, without a trailing slash.
    pub api_url: String,
    pub token: Option<String>,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            token: None,
        }
    }
}

impl Config {
    /// Load the config file at `config_path`; a missing file yields the defaults.
    pub fn load_from_path<P: AsRef<Path>>(config_path: P) -> Result<Self, ConfigError> {
        let config_path = config_path.as_ref();
        if !config_path.exists() {
            return Ok(Self::default());
        }

        let content = std::fs::read_to_string(config_path).map_err(|source| {
            ConfigError::ConfigReadError {
                config_path: config_path.to_path_buf(),
                source,
            }
        })?;

        let config: Config =
            toml::from_str(&content).map_err(|source| ConfigError::ConfigParseError {
                config_path: config_path.to_path_buf(),
                source,
            })?;

        Ok(config.normalized())
    }

    /// Load the user config file and apply environment overrides.
    pub fn load() -> Result<Self, ConfigError> {
        let config = Self::load_from_path(Self::config_path())?;
        Ok(config.with_overrides(|key| std::env::var(key).ok()))
    }

    /// Apply `OUTLINE_TOKEN` / `OUTLINE_API_URL` from `lookup`. Empty values are ignored.
    pub fn with_overrides<F>(mut self, lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        let lookup = |key: &str| lookup(key).filter(|value| !value.is_empty());
        if let Some(token) = lookup(TOKEN_ENV) {
            self.token = Some(token);
        }
        if let Some(api_url) = lookup(API_URL_ENV) {
            self.api_url = api_url;
        }
        self.normalized()
    }

    /// The configured API token.
    pub fn token(&self) -> Result<&str, ConfigError> {
        self.token
            .as_deref()
            .filter(|token| !token.is_empty())
            .ok_or(ConfigError::MissingToken)
    }

    pub fn config_path() -> PathBuf {
        let config_dir = shellexpand::tilde("~/.config/outline-md");
        PathBuf::from(config_dir.as_ref()).join("config.toml")
    }

    fn normalized(mut self) -> Self {
        let trimmed = self.api_url.trim_end_matches('/').len();
        self.api_url.truncate(trimmed);
        self
    }
}
