use std::time::Duration;

use serde::Deserialize;

use crate::infrastructure::observability::MetricsConfig;

/// Application configuration
#[derive(Debug, Clone, Deserialize, Default)]
pub struct AppConfig {
    #[serde(default)]
    pub server: ServerConfig,
    #[serde(default)]
    pub logging: LoggingConfig,
    #[serde(default)]
    pub idempotency: IdempotencyConfig,
    #[serde(default)]
    pub storage: StorageConfig,
    #[serde(default)]
    pub data_collector: DataCollectorConfig,
    #[serde(default)]
    pub metrics: MetricsConfig,
}

#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

#[derive(Debug, Clone, Deserialize)]
pub struct LoggingConfig {
    pub level: String,
    pub format: LogFormat,
}

#[derive(Debug, Clone, Deserialize, Default, PartialEq, Eq)]
#[serde(rename_all = "lowercase")]
pub enum LogFormat {
    #[default]
    Pretty,
    Json,
}

/// Response cache settings
#[derive(Debug, Clone, Deserialize)]
pub struct IdempotencyConfig {
    /// How long a stored response stays replayable
    pub ttl_secs: u64,
    /// Sweep period; a fifth of the TTL when unset
    #[serde(default)]
    pub sweep_interval_secs: Option<u64>,
    /// Caller id used when an HTTP request carries no `X-Caller-ID`
    pub default_caller_id: String,
}

#[derive(Debug, Clone, Deserialize)]
pub struct StorageConfig {
    /// `memory` or `postgres`
    pub backend: String,
    #[serde(default)]
    pub database_url: Option<String>,
}

#[derive(Debug, Clone, Deserialize)]
pub struct DataCollectorConfig {
    #[serde(default)]
    pub url: Option<String>,
    pub timeout_secs: u64,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: "0.0.0.0".to_string(),
            port: 8080,
        }
    }
}

impl Default for LoggingConfig {
    fn default() -> Self {
        Self {
            level: "info".to_string(),
            format: LogFormat::default(),
        }
    }
}

impl Default for IdempotencyConfig {
    fn default() -> Self {
        Self {
            ttl_secs: 300,
            sweep_interval_secs: None,
            default_caller_id: "DATA_COLLECTOR".to_string(),
        }
    }
}

impl IdempotencyConfig {
    pub fn ttl(&self) -> Duration {
        Duration::from_secs(self.ttl_secs)
    }

    /// Configured sweep period, or `None` to derive it from the TTL
    pub fn sweep_interval(&self) -> Option<Duration> {
        self.sweep_interval_secs.map(Duration::from_secs)
    }
}

impl Default for StorageConfig {
    fn default() -> Self {
        Self {
            backend: "memory".to_string(),
            database_url: None,
        }
    }
}

impl StorageConfig {
    /// The configured URL, falling back to `DATABASE_URL`
    pub fn database_url(&self) -> Option<String> {
        self.database_url
            .clone()
            .or_else(|| std::env::var("DATABASE_URL").ok())
    }
}

impl Default for DataCollectorConfig {
    fn default() -> Self {
        Self {
            url: None,
            timeout_secs: 5,
        }
    }
}

impl DataCollectorConfig {
    pub fn timeout(&self) -> Duration {
        Duration::from_secs(self.timeout_secs)
    }
}

impl AppConfig {
    pub fn load() -> Result<Self, config::ConfigError> {
        let config = config::Config::builder()
            .add_source(config::File::with_name("config/default").required(false))
            .add_source(config::File::with_name("config/local").required(false))
            .add_source(
                config::Environment::with_prefix("APP")
                    .separator("__")
                    .try_parsing(true),
            )
            .build()?;

        let config: Self = config.try_deserialize()?;
        config.validate()?;

        Ok(config)
    }

    pub fn validate(&self) -> Result<(), config::ConfigError> {
        if self.idempotency.ttl_secs == 0 {
            return Err(config::ConfigError::Message(
                "idempotency.ttl_secs must be greater than zero".to_string(),
            ));
        }

        if self.idempotency.sweep_interval_secs == Some(0) {
            return Err(config::ConfigError::Message(
                "idempotency.sweep_interval_secs must be greater than zero".to_string(),
            ));
        }

        if self.idempotency.default_caller_id.trim().is_empty() {
            return Err(config::ConfigError::Message(
                "idempotency.default_caller_id must not be empty".to_string(),
            ));
        }

        if self.data_collector.timeout_secs == 0 {
            return Err(config::ConfigError::Message(
                "data_collector.timeout_secs must be greater than zero".to_string(),
            ));
        }

        Ok(())
    }
}
