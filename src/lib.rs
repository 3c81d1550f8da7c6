//! User Manager
//!
//! User registration and lookup service with at-most-once request handling:
//! - Responses to mutating requests are cached per `(caller, request)` key
//! - Duplicate deliveries replay the first response instead of re-executing
//! - Cached responses expire after a TTL and are swept in the background

pub mod api;
pub mod cli;
pub mod config;
pub mod domain;
pub mod infrastructure;

pub use config::AppConfig;

use std::sync::Arc;
use std::time::Duration;

use api::state::{AppState, UserServiceTrait};
use infrastructure::data_collector::{
    DataCollectorClient, HttpDataCollectorClient, NoopDataCollectorClient,
};
use infrastructure::idempotency::{InMemoryResponseCache, ResponseCacheConfig};
use infrastructure::user::{
    Argon2Hasher, InMemoryUserRepository, PostgresUserRepository, UserService,
};
use tracing::{info, warn};

/// Backing store for registered users
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StorageType {
    InMemory,
    Postgres,
}

impl StorageType {
    pub fn from_str(value: &str) -> Option<Self> {
        match value.trim().to_lowercase().as_str() {
            "memory" | "in_memory" | "inmemory" => Some(Self::InMemory),
            "postgres" | "postgresql" => Some(Self::Postgres),
            _ => None,
        }
    }
}

/// Create the application state with default configuration
pub async fn create_app_state() -> anyhow::Result<AppState> {
    create_app_state_with_config(&AppConfig::default()).await
}

/// Create the application state with custom configuration
pub async fn create_app_state_with_config(config: &AppConfig) -> anyhow::Result<AppState> {
    let user_service = create_user_service(config).await?;

    let cache_config = ResponseCacheConfig::default().with_ttl(config.idempotency.ttl());
    let response_cache = Arc::new(InMemoryResponseCache::with_config(cache_config));
    info!(
        ttl_secs = config.idempotency.ttl_secs,
        "Idempotency response cache created"
    );

    let data_collector = create_data_collector_client(config)?;

    Ok(AppState::new(
        user_service,
        response_cache,
        data_collector,
        config.idempotency.default_caller_id.clone(),
    ))
}

/// Sweep period for the response cache: configured, or derived from the TTL
pub fn sweep_interval(config: &AppConfig) -> Duration {
    config.idempotency.sweep_interval().unwrap_or_else(|| {
        ResponseCacheConfig::default()
            .with_ttl(config.idempotency.ttl())
            .default_sweep_interval()
    })
}

async fn create_user_service(config: &AppConfig) -> anyhow::Result<Arc<dyn UserServiceTrait>> {
    let backend = StorageType::from_str(&config.storage.backend).unwrap_or_else(|| {
        warn!(
            backend = %config.storage.backend,
            "Unknown storage backend, falling back to in-memory"
        );
        StorageType::InMemory
    });

    info!("Storage backend: {:?}", backend);

    let hasher = Arc::new(Argon2Hasher::new());

    match backend {
        StorageType::InMemory => {
            let repository = Arc::new(InMemoryUserRepository::new());
            Ok(Arc::new(UserService::new(repository, hasher)))
        }
        StorageType::Postgres => {
            let database_url = config.storage.database_url().ok_or_else(|| {
                anyhow::anyhow!(
                    "storage.database_url or DATABASE_URL is required for the postgres backend"
                )
            })?;

            info!("Connecting to PostgreSQL...");
            let pool = sqlx::PgPool::connect(&database_url)
                .await
                .map_err(|e| anyhow::anyhow!("Failed to connect to PostgreSQL: {}", e))?;
            info!("PostgreSQL connection established");

            let repository = PostgresUserRepository::new(pool);
            repository.ensure_schema().await?;

            Ok(Arc::new(UserService::new(Arc::new(repository), hasher)))
        }
    }
}

fn create_data_collector_client(
    config: &AppConfig,
) -> anyhow::Result<Arc<dyn DataCollectorClient>> {
    match &config.data_collector.url {
        Some(url) => {
            info!(url = %url, "Data Collector client configured");
            let client = HttpDataCollectorClient::new(url, config.data_collector.timeout())?;
            Ok(Arc::new(client))
        }
        None => {
            warn!("No Data Collector URL configured, user data deletion will not be propagated");
            Ok(Arc::new(NoopDataCollectorClient))
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::idempotency::ResponseStore;

    #[test]
    fn test_storage_type_parsing() {
        assert_eq!(StorageType::from_str("memory"), Some(StorageType::InMemory));
        assert_eq!(StorageType::from_str(" Postgres "), Some(StorageType::Postgres));
        assert_eq!(StorageType::from_str("redis"), None);
    }

    #[test]
    fn test_sweep_interval_defaults_to_fifth_of_ttl() {
        let config = AppConfig::default();
        assert_eq!(sweep_interval(&config), Duration::from_secs(60));

        let mut config = AppConfig::default();
        config.idempotency.sweep_interval_secs = Some(7);
        assert_eq!(sweep_interval(&config), Duration::from_secs(7));
    }

    #[tokio::test]
    async fn test_default_state_uses_memory_and_configured_caller() {
        let state = create_app_state().await.unwrap();

        assert_eq!(state.default_caller_id, "DATA_COLLECTOR");
        assert_eq!(state.response_cache.ttl(), Duration::from_secs(300));
        assert_eq!(state.user_service.count().await.unwrap(), 0);
    }
}
