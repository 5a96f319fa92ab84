//! PigeonPost configuration system.
//!
//! Loaded from `~/.pigeonpost/config.toml` (or an explicit path), then
//! overridden field-by-field from `PIGEONPOST_*` environment variables so the
//! service can run with no config file at all in container deployments.

use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

use crate::error::{PigeonError, Result};

/// Root configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct PigeonConfig {
    #[serde(default)]
    pub webhook: WebhookConfig,
    #[serde(default)]
    pub schedule: ScheduleConfig,
    #[serde(default)]
    pub gateway: GatewayConfig,
}

impl Default for PigeonConfig {
    fn default() -> Self {
        Self {
            webhook: WebhookConfig::default(),
            schedule: ScheduleConfig::default(),
            gateway: GatewayConfig::default(),
        }
    }
}

/// Destination webhook configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct WebhookConfig {
    /// The single downstream endpoint that receives delivered messages.
    #[serde(default)]
    pub url: String,
    /// Hard timeout for one delivery attempt.
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,
}

fn default_timeout_secs() -> u64 {
    10
}

impl Default for WebhookConfig {
    fn default() -> Self {
        Self {
            url: String::new(),
            timeout_secs: default_timeout_secs(),
        }
    }
}

/// Delay strategy configuration.
///
/// `mode = "fixed"` fires `delay_secs` after the schedule request.
/// `mode = "offset"` fires at the caller-supplied appointment time plus the
/// configured hours/minutes/seconds offset.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ScheduleConfig {
    #[serde(default = "default_mode")]
    pub mode: String,
    #[serde(default = "default_delay_secs")]
    pub delay_secs: u64,
    #[serde(default = "default_offset_hours")]
    pub offset_hours: i64,
    #[serde(default = "default_offset_minutes")]
    pub offset_minutes: i64,
    #[serde(default)]
    pub offset_seconds: i64,
}

fn default_mode() -> String {
    "fixed".into()
}
fn default_delay_secs() -> u64 {
    30
}
fn default_offset_hours() -> i64 {
    1
}
fn default_offset_minutes() -> i64 {
    5
}

impl Default for ScheduleConfig {
    fn default() -> Self {
        Self {
            mode: default_mode(),
            delay_secs: default_delay_secs(),
            offset_hours: default_offset_hours(),
            offset_minutes: default_offset_minutes(),
            offset_seconds: 0,
        }
    }
}

/// HTTP listener configuration.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct GatewayConfig {
    #[serde(default = "default_host")]
    pub host: String,
    #[serde(default = "default_port")]
    pub port: u16,
    /// Deployment environment label, echoed by the liveness probe.
    #[serde(default = "default_environment")]
    pub environment: String,
}

fn default_host() -> String {
    "0.0.0.0".into()
}
fn default_port() -> u16 {
    10000
}
fn default_environment() -> String {
    "development".into()
}

impl Default for GatewayConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
            environment: default_environment(),
        }
    }
}

impl PigeonConfig {
    /// Load config from the default path, then apply environment overrides.
    pub fn load() -> Result<Self> {
        let path = Self::default_path();
        let mut config = if path.exists() {
            Self::load_from(&path)?
        } else {
            Self::default()
        };
        config.apply_env();
        Ok(config)
    }

    /// Load config from a specific path (no environment overrides).
    pub fn load_from(path: &Path) -> Result<Self> {
        let content = std::fs::read_to_string(path)
            .map_err(|e| PigeonError::Config(format!("Failed to read config: {e}")))?;
        let config: Self = toml::from_str(&content)
            .map_err(|e| PigeonError::Config(format!("Failed to parse config: {e}")))?;
        Ok(config)
    }

    /// Get the default config path.
    pub fn default_path() -> PathBuf {
        dirs::home_dir()
            .unwrap_or_else(|| PathBuf::from("."))
            .join(".pigeonpost")
            .join("config.toml")
    }

    /// Apply `PIGEONPOST_*` environment variable overrides.
    pub fn apply_env(&mut self) {
        if let Ok(url) = std::env::var("PIGEONPOST_WEBHOOK_URL") {
            self.webhook.url = url;
        }
        if let Ok(v) = std::env::var("PIGEONPOST_WEBHOOK_TIMEOUT_SECS")
            && let Ok(secs) = v.parse()
        {
            self.webhook.timeout_secs = secs;
        }
        if let Ok(mode) = std::env::var("PIGEONPOST_SCHEDULE_MODE") {
            self.schedule.mode = mode;
        }
        if let Ok(v) = std::env::var("PIGEONPOST_DELAY_SECS")
            && let Ok(secs) = v.parse()
        {
            self.schedule.delay_secs = secs;
        }
        if let Ok(v) = std::env::var("PIGEONPOST_OFFSET_HOURS")
            && let Ok(h) = v.parse()
        {
            self.schedule.offset_hours = h;
        }
        if let Ok(v) = std::env::var("PIGEONPOST_OFFSET_MINUTES")
            && let Ok(m) = v.parse()
        {
            self.schedule.offset_minutes = m;
        }
        if let Ok(v) = std::env::var("PIGEONPOST_OFFSET_SECONDS")
            && let Ok(s) = v.parse()
        {
            self.schedule.offset_seconds = s;
        }
        if let Ok(host) = std::env::var("PIGEONPOST_HOST") {
            self.gateway.host = host;
        }
        if let Ok(v) = std::env::var("PIGEONPOST_PORT")
            && let Ok(port) = v.parse()
        {
            self.gateway.port = port;
        }
        if let Ok(env) = std::env::var("PIGEONPOST_ENV") {
            self.gateway.environment = env;
        }
    }
}
