//! Top-level application configuration.
//!
//! Configuration is stored in `.docket/config.yaml` (or the file named by
//! `DOCKET_CONFIG`) and includes:
//! - List page behavior (search debounce, history policy)
//! - Notification lifetime
//! - Mock service setup (seed data and fault injection)

use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

use jiff::Timestamp;
use serde::{Deserialize, Serialize};

use crate::api::FaultConfig;
use crate::error::{DocketError, Result};
use crate::navigation::HistoryMode;

pub const CONFIG_ENV: &str = "DOCKET_CONFIG";
pub const SEED_ENV: &str = "DOCKET_SEED";
pub const FAILURE_RATE_ENV: &str = "DOCKET_FAILURE_RATE";

/// Main configuration structure
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Config {
    #[serde(default)]
    pub list: ListConfig,

    #[serde(default)]
    pub notifications: NotificationConfig,

    #[serde(default)]
    pub mock: MockConfig,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ListConfig {
    /// Delay before typed search text is applied (default: 300)
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// Whether query changes replace the history entry or push a new one
    #[serde(default)]
    pub history: HistoryMode,
}

fn default_debounce_ms() -> u64 {
    300
}

impl Default for ListConfig {
    fn default() -> Self {
        Self {
            debounce_ms: default_debounce_ms(),
            history: HistoryMode::default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NotificationConfig {
    #[serde(default = "default_ttl_ms")]
    pub ttl_ms: u64,
}

fn default_ttl_ms() -> u64 {
    3000
}

impl Default for NotificationConfig {
    fn default() -> Self {
        Self {
            ttl_ms: default_ttl_ms(),
        }
    }
}

/// Mock service configuration
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct MockConfig {
    #[serde(default = "default_seed")]
    pub seed: u64,

    #[serde(default = "default_ticket_count")]
    pub ticket_count: usize,

    #[serde(default)]
    pub latency_min_ms: u64,

    #[serde(default)]
    pub latency_max_ms: u64,

    /// Probability in [0, 1] that a request fails
    #[serde(default)]
    pub failure_rate: f64,

    /// Generated tickets are created before this instant (default: now)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub anchor: Option<Timestamp>,
}

fn default_seed() -> u64 {
    42
}

fn default_ticket_count() -> usize {
    crate::api::seed::DEFAULT_TICKET_COUNT
}

impl Default for MockConfig {
    fn default() -> Self {
        Self {
            seed: default_seed(),
            ticket_count: default_ticket_count(),
            latency_min_ms: 0,
            latency_max_ms: 0,
            failure_rate: 0.0,
            anchor: None,
        }
    }
}

impl MockConfig {
    pub fn faults(&self) -> FaultConfig {
        FaultConfig {
            latency_ms: self.latency_min_ms..=self.latency_max_ms,
            failure_rate: self.failure_rate,
        }
    }

    pub fn anchor(&self) -> Timestamp {
        self.anchor.unwrap_or_else(Timestamp::now)
    }
}

/// Root directory for docket state; `DOCKET_ROOT` overrides `.docket`.
pub fn docket_root() -> PathBuf {
    env::var("DOCKET_ROOT")
        .map(PathBuf::from)
        .unwrap_or_else(|_| PathBuf::from(".docket"))
}

impl Config {
    /// Get the path to the config file
    pub fn config_path() -> PathBuf {
        match env::var(CONFIG_ENV) {
            Ok(path) if !path.is_empty() => PathBuf::from(path),
            _ => docket_root().join("config.yaml"),
        }
    }

    /// Load configuration from the default location, then apply env overrides.
    pub fn load() -> Result<Self> {
        let mut config = Self::load_from(&Self::config_path())?;
        config.apply_env_overrides()?;
        config.validate()?;
        Ok(config)
    }

    /// Load configuration from file, or return default if not found
    pub fn load_from(path: &Path) -> Result<Self> {
        if !path.exists() {
            return Ok(Config::default());
        }

        let content = fs::read_to_string(path).map_err(|e| {
            DocketError::Io(std::io::Error::new(
                e.kind(),
                format!("Failed to read config at {}: {}", path.display(), e),
            ))
        })?;
        let config: Config = serde_yaml_ng::from_str(&content)?;
        Ok(config)
    }

    /// Save configuration to file
    pub fn save_to(&self, path: &Path) -> Result<()> {
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent)?;
        }
        let content = serde_yaml_ng::to_string(self)?;
        fs::write(path, content)?;
        Ok(())
    }

    fn apply_env_overrides(&mut self) -> Result<()> {
        if let Ok(seed) = env::var(SEED_ENV) {
            self.mock.seed = seed
                .trim()
                .parse()
                .map_err(|_| DocketError::Config(format!("{SEED_ENV} must be an integer, got '{seed}'")))?;
        }
        if let Ok(rate) = env::var(FAILURE_RATE_ENV) {
            self.mock.failure_rate = rate.trim().parse().map_err(|_| {
                DocketError::Config(format!("{FAILURE_RATE_ENV} must be a number, got '{rate}'"))
            })?;
        }
        Ok(())
    }

    pub fn validate(&self) -> Result<()> {
        if !(0.0..=1.0).contains(&self.mock.failure_rate) {
            return Err(DocketError::Config(format!(
                "mock.failure_rate must be between 0 and 1, got {}",
                self.mock.failure_rate
            )));
        }
        if self.mock.latency_min_ms > self.mock.latency_max_ms {
            return Err(DocketError::Config(
                "mock.latency_min_ms must not exceed mock.latency_max_ms".to_string(),
            ));
        }
        if self.notifications.ttl_ms == 0 {
            return Err(DocketError::Config(
                "notifications.ttl_ms must be positive".to_string(),
            ));
        }
        Ok(())
    }

    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.list.debounce_ms)
    }

    pub fn notification_ttl(&self) -> Duration {
        Duration::from_millis(self.notifications.ttl_ms)
    }
}
