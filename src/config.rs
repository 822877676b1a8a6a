//! Configuration types for quakewatch

use crate::feed::{RegionFilter, UsgsConfig, USGS_API_URL};
use crate::poll::{PollConfig, PollPolicy};
use crate::push::{ExpoConfig, EXPO_PUSH_ENDPOINT};
use crate::telemetry::LogFormat;
use serde::Deserialize;
use std::time::Duration;

/// Root configuration structure
#[derive(Debug, Clone, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub feed: FeedConfig,
    #[serde(default)]
    pub watch: WatchConfig,
    #[serde(default)]
    pub alert: AlertConfig,
    #[serde(default)]
    pub poll: PollSettings,
    #[serde(default)]
    pub push: PushConfig,
    #[serde(default)]
    pub telemetry: TelemetryConfig,
}

/// Seismic feed configuration
#[derive(Debug, Clone, Deserialize)]
pub struct FeedConfig {
    /// USGS event service base URL
    #[serde(default = "default_feed_base_url")]
    pub base_url: String,
    /// Request timeout in seconds
    #[serde(default = "default_http_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for FeedConfig {
    fn default() -> Self {
        Self {
            base_url: default_feed_base_url(),
            timeout_secs: default_http_timeout_secs(),
        }
    }
}

impl FeedConfig {
    /// Build the USGS client configuration
    pub fn client_config(&self) -> UsgsConfig {
        UsgsConfig {
            base_url: self.base_url.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

/// Live event list (UI-facing polling) configuration
#[derive(Debug, Clone, Deserialize)]
pub struct WatchConfig {
    /// Refresh interval in seconds
    #[serde(default = "default_watch_interval_secs")]
    pub interval_secs: u64,
    /// How many days back the query window reaches
    #[serde(default = "default_watch_lookback_days")]
    pub lookback_days: u64,
    /// Maximum events per fetch
    #[serde(default = "default_watch_limit")]
    pub limit: u32,
    /// Minimum magnitude to retrieve (include even very small earthquakes
    /// by default)
    #[serde(default)]
    pub min_magnitude: f64,
    /// Optional region restriction
    #[serde(default)]
    pub region: Option<RegionFilter>,
}

impl Default for WatchConfig {
    fn default() -> Self {
        Self {
            interval_secs: default_watch_interval_secs(),
            lookback_days: default_watch_lookback_days(),
            limit: default_watch_limit(),
            min_magnitude: 0.0,
            region: None,
        }
    }
}

/// Alert evaluation configuration
#[derive(Debug, Clone, Deserialize)]
pub struct AlertConfig {
    /// Seconds between cycles when self-looping (`run` command)
    #[serde(default = "default_cycle_interval_secs")]
    pub cycle_interval_secs: u64,
    /// Lookback window per subscriber query, in minutes
    #[serde(default = "default_alert_lookback_minutes")]
    pub lookback_minutes: u64,
    /// Maximum events per subscriber query
    #[serde(default = "default_alert_limit")]
    pub limit: u32,
}

impl Default for AlertConfig {
    fn default() -> Self {
        Self {
            cycle_interval_secs: default_cycle_interval_secs(),
            lookback_minutes: default_alert_lookback_minutes(),
            limit: default_alert_limit(),
        }
    }
}

/// Backoff tuning shared by the polling loops
#[derive(Debug, Clone, Deserialize)]
pub struct PollSettings {
    /// First retry delay after a failure, in seconds
    #[serde(default = "default_initial_backoff_secs")]
    pub initial_backoff_secs: u64,
    /// Retry delay ceiling in seconds
    #[serde(default = "default_max_backoff_secs")]
    pub max_backoff_secs: u64,
}

impl Default for PollSettings {
    fn default() -> Self {
        Self {
            initial_backoff_secs: default_initial_backoff_secs(),
            max_backoff_secs: default_max_backoff_secs(),
        }
    }
}

impl PollSettings {
    /// Build a scheduler config for the given policy and base interval
    pub fn poll_config(&self, policy: PollPolicy, interval: Duration) -> PollConfig {
        PollConfig::new(policy)
            .interval(interval)
            .initial_backoff(Duration::from_secs(self.initial_backoff_secs))
            .max_backoff(Duration::from_secs(self.max_backoff_secs))
    }
}

/// Push gateway configuration
#[derive(Debug, Clone, Deserialize)]
pub struct PushConfig {
    /// Push API endpoint
    #[serde(default = "default_push_endpoint")]
    pub endpoint: String,
    /// Request timeout in seconds
    #[serde(default = "default_http_timeout_secs")]
    pub timeout_secs: u64,
}

impl Default for PushConfig {
    fn default() -> Self {
        Self {
            endpoint: default_push_endpoint(),
            timeout_secs: default_http_timeout_secs(),
        }
    }
}

impl PushConfig {
    /// Build the Expo client configuration
    pub fn client_config(&self) -> ExpoConfig {
        ExpoConfig {
            endpoint: self.endpoint.clone(),
            timeout: Duration::from_secs(self.timeout_secs),
        }
    }
}

/// Telemetry configuration
#[derive(Debug, Clone, Deserialize)]
pub struct TelemetryConfig {
    #[serde(default = "default_log_level")]
    pub log_level: String,
    #[serde(default)]
    pub log_format: LogFormat,
    /// Prometheus scrape port; metrics are disabled when absent
    #[serde(default)]
    pub metrics_port: Option<u16>,
}

impl Default for TelemetryConfig {
    fn default() -> Self {
        Self {
            log_level: default_log_level(),
            log_format: LogFormat::default(),
            metrics_port: None,
        }
    }
}

fn default_feed_base_url() -> String {
    USGS_API_URL.to_string()
}
fn default_push_endpoint() -> String {
    EXPO_PUSH_ENDPOINT.to_string()
}
fn default_http_timeout_secs() -> u64 {
    10
}
fn default_watch_interval_secs() -> u64 {
    30
}
fn default_watch_lookback_days() -> u64 {
    365
}
fn default_watch_limit() -> u32 {
    500
}
fn default_cycle_interval_secs() -> u64 {
    60
}
fn default_alert_lookback_minutes() -> u64 {
    10
}
fn default_alert_limit() -> u32 {
    50
}
fn default_initial_backoff_secs() -> u64 {
    5
}
fn default_max_backoff_secs() -> u64 {
    300
}
fn default_log_level() -> String {
    "info".to_string()
}

impl Config {
    /// Load configuration from a TOML file
    pub fn load(path: impl AsRef<std::path::Path>) -> anyhow::Result<Self> {
        let content = std::fs::read_to_string(path)?;
        let config: Config = toml::from_str(&content)?;
        Ok(config)
    }
}
