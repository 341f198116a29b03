use std::fs;
use std::path::Path;
use std::time::Duration;

use anyhow::Result;
use serde::Deserialize;
use tracing::info;

/// Settings for the Fantasy402 integration, read from the `[fantasy402]`
/// table of `config.toml`.
#[derive(Debug, Clone, Deserialize)]
pub struct Fantasy402Config {
    pub api_url: String,
    pub customer_id: String,
    pub password: String,
    #[serde(default = "default_request_timeout_secs")]
    pub request_timeout_secs: u64,
    #[serde(default = "default_retry_attempts")]
    pub retry_attempts: u32,
    #[serde(default = "default_session_ttl_secs")]
    pub session_ttl_secs: u64,
    #[serde(default = "default_health_latency_threshold_ms")]
    pub health_latency_threshold_ms: u64,
    #[serde(default)]
    pub enable_event_versioning: bool,
}

fn default_request_timeout_secs() -> u64 {
    30
}

fn default_retry_attempts() -> u32 {
    3
}

// Sessions expire 20 minutes after authentication.
fn default_session_ttl_secs() -> u64 {
    1200
}

fn default_health_latency_threshold_ms() -> u64 {
    1000
}

impl Fantasy402Config {
    pub fn request_timeout(&self) -> Duration {
        Duration::from_secs(self.request_timeout_secs)
    }

    pub fn session_ttl(&self) -> chrono::Duration {
        chrono::Duration::seconds(self.session_ttl_secs as i64)
    }

    pub fn health_latency_threshold(&self) -> Duration {
        Duration::from_millis(self.health_latency_threshold_ms)
    }
}

#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    pub fantasy402: Fantasy402Config,
}

impl Config {
    pub fn new() -> Result<Self> {
        Self::from_path("config.toml")
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self> {
        let config_str = fs::read_to_string(path)?;
        let config: Config = toml::from_str(&config_str)?;
        info!(
            api_url = %config.fantasy402.api_url,
            retry_attempts = config.fantasy402.retry_attempts,
            "Loaded Fantasy402 config"
        );
        Ok(config)
    }
}
