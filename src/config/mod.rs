mod app_config;

pub use app_config::{
    AppConfig, DataCollectorConfig, IdempotencyConfig, LogFormat, LoggingConfig, ServerConfig,
    StorageConfig,
};
