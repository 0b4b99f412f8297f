// src/config.rs
//
// Application configuration
//
// Sources, lowest precedence first:
// - Built-in defaults
// - Optional TOML file
// - Environment variables: LIBRARYHUB__<SECTION>__<KEY>

use std::path::{Path, PathBuf};
use std::time::Duration;

use config::{Config as ConfigBuilder, ConfigError, Environment as EnvSource, File};
use serde::{Deserialize, Serialize};

use crate::resilience::{BreakerSettings, RetryPolicy};

pub const ENV_PREFIX: &str = "LIBRARYHUB";

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Environment {
    #[default]
    Development,
    Production,
}

impl Environment {
    pub fn is_production(&self) -> bool {
        matches!(self, Environment::Production)
    }
}

#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct AppConfig {
    #[serde(default)]
    pub environment: Environment,
    #[serde(default)]
    pub database: DatabaseConfig,
    #[serde(default)]
    pub resilience: ResilienceConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DatabaseConfig {
    /// Database file; `None` means `{data_dir}/libraryhub/libraryhub.db`
    pub path: Option<PathBuf>,

    #[serde(default = "default_pool_max_size")]
    pub pool_max_size: u32,

    #[serde(default = "default_busy_timeout_ms")]
    pub busy_timeout_ms: u64,
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: None,
            pool_max_size: default_pool_max_size(),
            busy_timeout_ms: default_busy_timeout_ms(),
        }
    }
}

fn default_pool_max_size() -> u32 {
    15
}

fn default_busy_timeout_ms() -> u64 {
    5000
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ResilienceConfig {
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    #[serde(default = "default_backoff_base_ms")]
    pub backoff_base_ms: u64,

    #[serde(default = "default_failure_threshold")]
    pub failure_threshold: u32,

    #[serde(default = "default_break_duration_secs")]
    pub break_duration_secs: u64,
}

impl Default for ResilienceConfig {
    fn default() -> Self {
        Self {
            max_retries: default_max_retries(),
            backoff_base_ms: default_backoff_base_ms(),
            failure_threshold: default_failure_threshold(),
            break_duration_secs: default_break_duration_secs(),
        }
    }
}

fn default_max_retries() -> u32 {
    3
}

fn default_backoff_base_ms() -> u64 {
    1000
}

fn default_failure_threshold() -> u32 {
    3
}

fn default_break_duration_secs() -> u64 {
    30
}

impl ResilienceConfig {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy::new(self.max_retries, Duration::from_millis(self.backoff_base_ms))
    }

    pub fn breaker_settings(&self) -> BreakerSettings {
        BreakerSettings {
            failure_threshold: self.failure_threshold,
            break_duration: Duration::from_secs(self.break_duration_secs),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct LoggingConfig {
    #[serde(default = "default_log_level")]
    pub level: String,

    /// Rolling log files go here; stderr when unset
    pub directory: Option<PathBuf>,
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            directory: None,
        }
    }
}

fn default_log_level() -> String {
    "info".to_string()
}

// ============================================================================
// LOADING
// ============================================================================

/// Load configuration from an optional file plus `LIBRARYHUB__*` variables
pub fn load(path: Option<&Path>) -> Result<AppConfig, ConfigError> {
    load_with_prefix(path, ENV_PREFIX)
}

pub(crate) fn load_with_prefix(path: Option<&Path>, prefix: &str) -> Result<AppConfig, ConfigError> {
    let mut builder = ConfigBuilder::builder();
    if let Some(path) = path {
        builder = builder.add_source(File::from(path).required(false));
    }

    let config: AppConfig = builder
        .add_source(
            EnvSource::with_prefix(prefix)
                .prefix_separator("__")
                .separator("__")
                .try_parsing(true),
        )
        .build()?
        .try_deserialize()?;

    config.validate()?;
    Ok(config)
}

impl AppConfig {
    pub fn validate(&self) -> Result<(), ConfigError> {
        if self.database.pool_max_size == 0 {
            return Err(ConfigError::Message(
                "database.pool_max_size must be at least 1".to_string(),
            ));
        }
        if self.resilience.failure_threshold == 0 {
            return Err(ConfigError::Message(
                "resilience.failure_threshold must be at least 1".to_string(),
            ));
        }
        crate::logging::normalize_level(&self.logging.level).map_err(ConfigError::Message)?;
        Ok(())
    }
}
