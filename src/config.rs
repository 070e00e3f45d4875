use crate::constants::{
    DEFAULT_CONFIG_PATH, DEFAULT_MAX_ATTEMPTS, DEFAULT_RETRY_DELAY_MS, DEFAULT_TIMEOUT_SECONDS,
    DEFAULT_USER_AGENT, HOUSE_FEED_URL, HOUSE_URL_ENV, SENATE_FEED_URL, SENATE_URL_ENV,
};
use crate::error::{Result, RosterError};
use serde::Deserialize;
use std::fs;
use std::path::Path;
use std::time::Duration;

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(default)]
pub struct Config {
    pub feeds: FeedsConfig,
    pub http: HttpConfig,
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct FeedsConfig {
    pub house_url: String,
    pub senate_url: String,
}

impl Default for FeedsConfig {
    fn default() -> Self {
        Self {
            house_url: HOUSE_FEED_URL.to_string(),
            senate_url: SENATE_FEED_URL.to_string(),
        }
    }
}

#[derive(Debug, Clone, Deserialize)]
#[serde(default)]
pub struct HttpConfig {
    pub timeout_seconds: u64,
    pub max_attempts: u32,
    pub retry_delay_ms: u64,
    pub user_agent: String,
}

impl Default for HttpConfig {
    fn default() -> Self {
        Self {
            timeout_seconds: DEFAULT_TIMEOUT_SECONDS,
            max_attempts: DEFAULT_MAX_ATTEMPTS,
            retry_delay_ms: DEFAULT_RETRY_DELAY_MS,
            user_agent: DEFAULT_USER_AGENT.to_string(),
        }
    }
}

impl HttpConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_seconds)
    }

    /// Linear backoff: the delay grows with each failed attempt.
    pub fn retry_delay(&self, attempt: u32) -> Duration {
        Duration::from_millis(self.retry_delay_ms.saturating_mul(u64::from(attempt)))
    }
}

impl Config {
    /// Load configuration from `path`, or from `config.toml` when no path is given.
    ///
    /// A missing default file falls back to built-in defaults; a missing
    /// explicitly requested file is an error. Feed URLs can be overridden
    /// through the environment afterwards.
    pub fn load(path: Option<&Path>) -> Result<Self> {
        let mut config = match path {
            Some(p) => Self::from_file(p)?,
            None if Path::new(DEFAULT_CONFIG_PATH).exists() => {
                Self::from_file(Path::new(DEFAULT_CONFIG_PATH))?
            }
            None => Self::default(),
        };
        config.apply_env_overrides();
        config.validate()?;
        Ok(config)
    }

    pub fn from_file(path: &Path) -> Result<Self> {
        let config_content = fs::read_to_string(path).map_err(|e| {
            RosterError::Config(format!(
                "Failed to read config file '{}': {}",
                path.display(),
                e
            ))
        })?;
        Self::from_toml(&config_content)
    }

    pub fn from_toml(content: &str) -> Result<Self> {
        let config: Config = toml::from_str(content)?;
        Ok(config)
    }

    fn apply_env_overrides(&mut self) {
        if let Ok(url) = std::env::var(HOUSE_URL_ENV) {
            if !url.trim().is_empty() {
                self.feeds.house_url = url;
            }
        }
        if let Ok(url) = std::env::var(SENATE_URL_ENV) {
            if !url.trim().is_empty() {
                self.feeds.senate_url = url;
            }
        }
    }

    fn validate(&self) -> Result<()> {
        if self.http.max_attempts == 0 {
            return Err(RosterError::Config(
                "http.max_attempts must be at least 1".into(),
            ));
        }
        if self.http.timeout_seconds == 0 {
            return Err(RosterError::Config(
                "http.timeout_seconds must be at least 1".into(),
            ));
        }
        Ok(())
    }
}
