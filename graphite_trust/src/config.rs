//! Environment-driven configuration shared by both binaries

use std::time::Duration;
use thiserror::Error;

pub const DEFAULT_API_BASE_URL: &str = "http://localhost:3001/api";
pub const DEFAULT_UPSTREAM_URL: &str = "https://api.main.atgraphite.com";
pub const DEFAULT_PROXY_PORT: u16 = 3001;
pub const DEFAULT_CACHE_STALE_SECS: u64 = 30;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum ConfigError {
    #[error("{name} is empty")]
    Empty { name: &'static str },
    #[error("{name}={value} is not a valid {expected}")]
    Invalid {
        name: &'static str,
        value: String,
        expected: &'static str,
    },
}

#[derive(Debug, Clone)]
pub struct Config {
    /// Where the client sends requests: the local proxy in development,
    /// the explorer itself in production.
    pub api_base_url: String,
    pub api_key: Option<String>,
    /// Origin the proxy forwards `/api/*` to
    pub upstream_url: String,
    pub proxy_port: u16,
    pub cache_stale_after: Duration,
    pub http_timeout: Option<Duration>,
}

impl Default for Config {
    fn default() -> Self {
        Config {
            api_base_url: DEFAULT_API_BASE_URL.to_string(),
            api_key: None,
            upstream_url: DEFAULT_UPSTREAM_URL.to_string(),
            proxy_port: DEFAULT_PROXY_PORT,
            cache_stale_after: Duration::from_secs(DEFAULT_CACHE_STALE_SECS),
            http_timeout: None,
        }
    }
}

impl Config {
    /// Read the process environment, after loading `.env` if there is one.
    pub fn from_env() -> Result<Self, ConfigError> {
        // A missing .env file is the normal case outside development.
        let _ = dotenv::dotenv();
        Self::from_lookup(|name| std::env::var(name).ok())
    }

    pub fn from_lookup<F>(lookup: F) -> Result<Self, ConfigError>
    where
        F: Fn(&str) -> Option<String>,
    {
        let mut config = Config::default();

        if let Some(url) = lookup("GRAPHITE_API_BASE_URL") {
            config.api_base_url = non_empty("GRAPHITE_API_BASE_URL", url)?;
        }
        if let Some(url) = lookup("GRAPHITE_UPSTREAM_URL") {
            config.upstream_url = non_empty("GRAPHITE_UPSTREAM_URL", url)?;
        }

        config.api_key = lookup("GRAPHITE_API_KEY")
            .or_else(|| lookup("VITE_GRAPHITE_API_KEY"))
            .map(|key| key.trim().to_string())
            .filter(|key| !key.is_empty());

        if let Some(port) = lookup("GRAPHITE_PROXY_PORT") {
            config.proxy_port = parse("GRAPHITE_PROXY_PORT", port, "port number")?;
        }
        if let Some(secs) = lookup("GRAPHITE_CACHE_STALE_SECS") {
            let secs: u64 = parse("GRAPHITE_CACHE_STALE_SECS", secs, "number of seconds")?;
            config.cache_stale_after = Duration::from_secs(secs);
        }
        if let Some(ms) = lookup("GRAPHITE_HTTP_TIMEOUT_MS") {
            let ms: u64 = parse("GRAPHITE_HTTP_TIMEOUT_MS", ms, "number of milliseconds")?;
            config.http_timeout = Some(Duration::from_millis(ms));
        }

        Ok(config)
    }
}

fn non_empty(name: &'static str, value: String) -> Result<String, ConfigError> {
    let value = value.trim().to_string();
    if value.is_empty() {
        return Err(ConfigError::Empty { name });
    }
    Ok(value)
}

fn parse<T: std::str::FromStr>(
    name: &'static str,
    value: String,
    expected: &'static str,
) -> Result<T, ConfigError> {
    value.trim().parse().map_err(|_| ConfigError::Invalid {
        name,
        value,
        expected,
    })
}
