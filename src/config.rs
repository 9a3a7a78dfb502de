use directories::ProjectDirs;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{EcoError, Result};
use crate::render::Theme;

/// Relay used when nothing else is configured
pub const DEFAULT_RELAY_URL: &str = "http://localhost:3000";

/// Global ecoscore configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Config {
    /// Base URL of the scoring relay
    #[serde(default = "default_relay_url")]
    pub relay_url: String,

    /// Relay request timeout in seconds
    #[serde(default = "default_timeout")]
    pub timeout_secs: u64,

    /// Dashboard theme
    #[serde(default)]
    pub theme: Theme,

    /// A page is analyzable only if its URL contains one of these
    #[serde(default = "default_supported_hosts")]
    pub supported_hosts: Vec<String>,
}

fn default_relay_url() -> String {
    DEFAULT_RELAY_URL.to_string()
}

fn default_timeout() -> u64 {
    20
}

fn default_supported_hosts() -> Vec<String> {
    vec!["amazon.".to_string()]
}

impl Default for Config {
    fn default() -> Self {
        Self {
            relay_url: default_relay_url(),
            timeout_secs: default_timeout(),
            theme: Theme::default(),
            supported_hosts: default_supported_hosts(),
        }
    }
}

impl Config {
    /// Load configuration from the default location, then apply environment overrides
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path()?)?;
        if let Ok(url) = std::env::var("ECOSCORE_RELAY_URL") {
            config.relay_url = url;
        }
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from a specific file; a missing file means defaults
    pub fn load_from(path: &Path) -> Result<Self> {
        if path.exists() {
            let content = std::fs::read_to_string(path)?;
            Ok(toml::from_str(&content)?)
        } else {
            Ok(Self::default())
        }
    }

    /// Save configuration to the default location
    pub fn save(&self) -> Result<()> {
        self.save_to(&Self::config_path()?)
    }

    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }
        let content = toml::to_string_pretty(self)
            .map_err(|e| EcoError::ConfigError(e.to_string()))?;
        std::fs::write(path, content)?;
        Ok(())
    }

    /// Reject values the client cannot work with
    pub fn validate(&self) -> Result<()> {
        let url = url::Url::parse(&self.relay_url)?;
        if !matches!(url.scheme(), "http" | "https") {
            return Err(EcoError::ConfigError(format!(
                "relay_url must be http or https, got '{}'",
                self.relay_url
            )));
        }
        if !(1..=120).contains(&self.timeout_secs) {
            return Err(EcoError::ConfigError(format!(
                "timeout_secs must be between 1 and 120, got {}",
                self.timeout_secs
            )));
        }
        Ok(())
    }

    /// Whether a page URL belongs to a supported retailer
    pub fn is_supported(&self, page_url: &str) -> bool {
        self.supported_hosts.iter().any(|host| page_url.contains(host.as_str()))
    }

    /// Get the config file path
    pub fn config_path() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "ecoscore")
            .ok_or_else(|| EcoError::ConfigError("Could not determine config directory".into()))?;
        Ok(dirs.config_dir().join("config.toml"))
    }

    /// Get the data directory path
    pub fn data_dir() -> Result<PathBuf> {
        let dirs = ProjectDirs::from("", "", "ecoscore")
            .ok_or_else(|| EcoError::ConfigError("Could not determine data directory".into()))?;
        Ok(dirs.data_dir().to_path_buf())
    }

    /// Get the result cache database path
    ///
    /// Supports ECOSCORE_DB environment variable for test isolation
    pub fn db_path() -> Result<PathBuf> {
        if let Ok(path) = std::env::var("ECOSCORE_DB") {
            return Ok(PathBuf::from(path));
        }
        Ok(Self::data_dir()?.join("cache.db"))
    }
}
