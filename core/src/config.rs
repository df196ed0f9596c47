//! Client configuration: credentials, endpoint, and timeout.

use std::fmt;
use std::time::Duration;

use crate::error::{Error, Result};

pub const DEFAULT_BASE_URL: &str = "https://api.smsguard.dev/v1";
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

const ENV_API_KEY: &str = "SMSGUARD_API_KEY";
const ENV_BASE_URL: &str = "SMSGUARD_BASE_URL";
const ENV_TIMEOUT_SECS: &str = "SMSGUARD_TIMEOUT_SECS";

/// Which environment an API key belongs to, judged by its prefix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum KeyMode {
    Live,
    Test,
    Unknown,
}

/// Immutable settings for a `Client`.
///
/// The API key is validated on construction; base URL and timeout start at
/// their defaults and can be overridden with the `with_*` methods.
#[derive(Clone, PartialEq, Eq)]
pub struct ClientConfig {
    api_key: String,
    base_url: String,
    timeout: Duration,
}

impl ClientConfig {
    pub fn new(api_key: impl Into<String>) -> Result<Self> {
        let api_key = api_key.into();
        if api_key.trim().is_empty() {
            return Err(Error::Config("API key is required".to_string()));
        }
        Ok(Self {
            api_key,
            base_url: DEFAULT_BASE_URL.to_string(),
            timeout: DEFAULT_TIMEOUT,
        })
    }

    pub fn with_base_url(mut self, base_url: &str) -> Result<Self> {
        let base_url = base_url.trim().trim_end_matches('/');
        if !base_url.starts_with("http://") && !base_url.starts_with("https://") {
            return Err(Error::Config(format!(
                "base URL must start with http:// or https://, got {base_url:?}"
            )));
        }
        self.base_url = base_url.to_string();
        Ok(self)
    }

    pub fn with_timeout(mut self, timeout: Duration) -> Result<Self> {
        if timeout.is_zero() {
            return Err(Error::Config("timeout must be greater than zero".to_string()));
        }
        self.timeout = timeout;
        Ok(self)
    }

    /// Build a config from `SMSGUARD_*` environment variables, loading a
    /// `.env` file first if one exists.
    pub fn from_env() -> Result<Self> {
        dotenvy::dotenv().ok();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    /// Build a config from an arbitrary variable lookup. Blank values count
    /// as unset.
    pub fn from_lookup<F>(lookup: F) -> Result<Self>
    where
        F: Fn(&str) -> Option<String>,
    {
        let get = |name: &str| lookup(name).filter(|v| !v.trim().is_empty());

        let api_key = get(ENV_API_KEY)
            .ok_or_else(|| Error::Config(format!("{ENV_API_KEY} environment variable required")))?;
        let mut config = Self::new(api_key)?;

        if let Some(url) = get(ENV_BASE_URL) {
            config = config.with_base_url(&url)?;
        }
        if let Some(secs) = get(ENV_TIMEOUT_SECS) {
            let secs: u64 = secs.trim().parse().map_err(|_| {
                Error::Config(format!("{ENV_TIMEOUT_SECS} must be a whole number of seconds"))
            })?;
            config = config.with_timeout(Duration::from_secs(secs))?;
        }

        tracing::debug!(base_url = %config.base_url, timeout = ?config.timeout, "configuration loaded");
        Ok(config)
    }

    pub fn api_key(&self) -> &str {
        &self.api_key
    }

    pub fn base_url(&self) -> &str {
        &self.base_url
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn key_mode(&self) -> KeyMode {
        if self.api_key.starts_with("sk_live_") {
            KeyMode::Live
        } else if self.api_key.starts_with("sk_test_") {
            KeyMode::Test
        } else {
            KeyMode::Unknown
        }
    }
}

/// Only the first few characters of the key are shown.
impl fmt::Debug for ClientConfig {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let visible: String = self.api_key.chars().take(8).collect();
        f.debug_struct("ClientConfig")
            .field("api_key", &format_args!("{visible}***"))
            .field("base_url", &self.base_url)
            .field("timeout", &self.timeout)
            .finish()
    }
}
