//! Configuration management for pulse.
//!
//! Settings live in a single TOML file and can be overridden from the
//! environment. The API key is only ever read from here and handed to the
//! client at construction.
//!
//! ## Resolution Order
//!
//! 1. Built-in defaults
//! 2. `config.toml` in the config directory (`PULSE_CONFIG_DIR`, or the
//!    platform config dir for `dev.pulse.pulse`)
//! 3. Environment: `PULSE_API_KEY`, `PULSE_ENDPOINT`, `PULSE_DATA_DIR`
//!
//! ## Example Configuration File
//!
//! ```toml
//! [api]
//! key = "AIza..."
//! strategy = "desktop"
//!
//! [cache]
//! ttl_minutes = 30
//! ```

use crate::fetcher::DEFAULT_ENDPOINT;
use crate::{Error, Result, Strategy};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// File name of the configuration file inside the config directory.
pub const CONFIG_FILE: &str = "config.toml";

/// Top-level configuration.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// Analysis provider settings
    pub api: ApiConfig,
    /// Result cache settings
    pub cache: CacheConfig,
}

/// Settings for the PageSpeed Insights request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct ApiConfig {
    /// Access credential sent as the `key` parameter. Requests without one
    /// still work but share a small anonymous quota.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub key: Option<String>,

    /// Endpoint URL.
    pub endpoint: String,

    /// Device profile.
    pub strategy: Strategy,

    /// Ask the provider for a full-page screenshot.
    pub screenshot: bool,
}

impl Default for ApiConfig {
    fn default() -> Self {
        Self {
            key: None,
            endpoint: DEFAULT_ENDPOINT.to_string(),
            strategy: Strategy::Mobile,
            screenshot: true,
        }
    }
}

/// Settings for the on-disk result cache.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct CacheConfig {
    /// How long a cached result stays valid, in minutes.
    pub ttl_minutes: u64,

    /// Directory holding cache entries.
    pub dir: PathBuf,
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            ttl_minutes: 60,
            dir: default_data_dir().join("cache"),
        }
    }
}

impl CacheConfig {
    /// TTL as a duration.
    #[must_use]
    pub const fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_minutes.saturating_mul(60))
    }
}

impl Config {
    /// Load from the default location, then apply environment overrides.
    ///
    /// A missing file yields defaults; a malformed one is an error.
    pub fn load() -> Result<Self> {
        Self::load_with(&Self::config_path()?, |name| std::env::var(name).ok())
    }

    /// Load `path`, apply overrides read through `lookup`, and validate the result.
    pub fn load_with<F>(path: &Path, lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Self::load_from(path)?;
        config.apply_overrides(lookup);
        config.validate()?;
        Ok(config)
    }

    /// Load from an explicit file without applying environment overrides.
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Self::default());
        }

        let content = fs::read_to_string(path)
            .map_err(|e| Error::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| Error::Config(format!("Failed to parse config: {e}")))?;
        config.validate()?;
        Ok(config)
    }

    /// Apply `PULSE_*` overrides using `lookup` to read variables.
    ///
    /// Empty values are ignored.
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        let read = |name: &str| {
            lookup(name)
                .map(|v| v.trim().to_string())
                .filter(|v| !v.is_empty())
        };

        if let Some(key) = read("PULSE_API_KEY") {
            self.api.key = Some(key);
        }
        if let Some(endpoint) = read("PULSE_ENDPOINT") {
            self.api.endpoint = endpoint;
        }
        if let Some(dir) = read("PULSE_DATA_DIR") {
            self.cache.dir = PathBuf::from(dir).join("cache");
        }
    }

    /// Path of the configuration file.
    pub fn config_path() -> Result<PathBuf> {
        if let Some(dir) = std::env::var_os("PULSE_CONFIG_DIR").filter(|d| !d.is_empty()) {
            return Ok(PathBuf::from(dir).join(CONFIG_FILE));
        }

        let project_dirs = directories::ProjectDirs::from("dev", "pulse", "pulse")
            .ok_or_else(|| Error::Config("Failed to determine project directories".into()))?;
        Ok(project_dirs.config_dir().join(CONFIG_FILE))
    }

    /// Render as TOML with the API key masked.
    pub fn to_redacted_toml(&self) -> Result<String> {
        let mut shown = self.clone();
        if let Some(key) = shown.api.key.as_mut() {
            *key = redact(key);
        }
        toml::to_string_pretty(&shown)
            .map_err(|e| Error::Config(format!("Failed to serialize config: {e}")))
    }

    fn validate(&self) -> Result<()> {
        if url::Url::parse(&self.api.endpoint).is_err() {
            return Err(Error::Config(format!(
                "api.endpoint is not a valid URL: {}",
                self.api.endpoint
            )));
        }
        if self.cache.ttl_minutes == 0 {
            return Err(Error::Config("cache.ttl_minutes must be at least 1".into()));
        }
        Ok(())
    }
}

fn redact(key: &str) -> String {
    let visible: String = key.chars().take(4).collect();
    format!("{visible}…")
}

/// Platform data directory for pulse.
fn default_data_dir() -> PathBuf {
    directories::ProjectDirs::from("dev", "pulse", "pulse").map_or_else(
        || {
            directories::BaseDirs::new().map_or_else(
                || PathBuf::from(".pulse"),
                |base| base.home_dir().join(".pulse"),
            )
        },
        |dirs| dirs.data_dir().to_path_buf(),
    )
}
