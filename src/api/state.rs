//! Application state for shared services

use std::sync::Arc;

use crate::domain::idempotency::ResponseStore;
use crate::domain::user::UserRepository;
use crate::domain::DomainError;
use crate::infrastructure::data_collector::DataCollectorClient;
use crate::infrastructure::idempotency::IdempotentExecutor;
use crate::infrastructure::user::{
    PasswordHasher, RegisterUserRequest, RegistrationOutcome, UserService,
};

/// Application state containing shared services using dynamic dispatch
#[derive(Clone)]
pub struct AppState {
    pub user_service: Arc<dyn UserServiceTrait>,
    pub executor: IdempotentExecutor,
    pub response_cache: Arc<dyn ResponseStore>,
    pub data_collector: Arc<dyn DataCollectorClient>,
    /// Caller id for HTTP requests that carry no `X-Caller-ID`
    pub default_caller_id: String,
}

impl AppState {
    pub fn new(
        user_service: Arc<dyn UserServiceTrait>,
        response_cache: Arc<dyn ResponseStore>,
        data_collector: Arc<dyn DataCollectorClient>,
        default_caller_id: impl Into<String>,
    ) -> Self {
        Self {
            user_service,
            executor: IdempotentExecutor::new(response_cache.clone()),
            response_cache,
            data_collector,
            default_caller_id: default_caller_id.into(),
        }
    }
}

/// Trait for user service operations
#[async_trait::async_trait]
pub trait UserServiceTrait: Send + Sync {
    async fn register(
        &self,
        request: RegisterUserRequest,
    ) -> Result<RegistrationOutcome, DomainError>;
    async fn exists(&self, email: &str) -> Result<bool, DomainError>;
    async fn delete(&self, email: &str, password: &str) -> Result<bool, DomainError>;
    async fn count(&self) -> Result<usize, DomainError>;
}

#[async_trait::async_trait]
impl<R, H> UserServiceTrait for UserService<R, H>
where
    R: UserRepository + 'static,
    H: PasswordHasher + 'static,
{
    async fn register(
        &self,
        request: RegisterUserRequest,
    ) -> Result<RegistrationOutcome, DomainError> {
        UserService::register(self, request).await
    }

    async fn exists(&self, email: &str) -> Result<bool, DomainError> {
        UserService::exists(self, email).await
    }

    async fn delete(&self, email: &str, password: &str) -> Result<bool, DomainError> {
        UserService::delete(self, email, password).await
    }

    async fn count(&self) -> Result<usize, DomainError> {
        UserService::count(self).await
    }
}
