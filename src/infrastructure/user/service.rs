//! User service for registration, lookup and deletion

use std::sync::Arc;

use tracing::{debug, info};

use crate::domain::user::{validate_name, validate_password, Email, User, UserRepository};
use crate::domain::DomainError;

use super::password::PasswordHasher;

/// Request for registering a new user
#[derive(Debug, Clone)]
pub struct RegisterUserRequest {
    pub email: String,
    pub password: String,
    pub first_name: Option<String>,
    pub last_name: Option<String>,
}

/// Definitive result of a registration attempt
#[derive(Debug, Clone)]
pub enum RegistrationOutcome {
    Created(User),
    AlreadyRegistered,
}

/// User service
#[derive(Debug)]
pub struct UserService<R: UserRepository, H: PasswordHasher> {
    repository: Arc<R>,
    hasher: Arc<H>,
}

impl<R: UserRepository, H: PasswordHasher> UserService<R, H> {
    pub fn new(repository: Arc<R>, hasher: Arc<H>) -> Self {
        Self { repository, hasher }
    }

    /// Register a user.
    ///
    /// An email that is already taken is not an error: it yields
    /// `AlreadyRegistered`, including when a concurrent registration wins the
    /// insert and the repository reports a conflict.
    pub async fn register(
        &self,
        request: RegisterUserRequest,
    ) -> Result<RegistrationOutcome, DomainError> {
        let email =
            Email::new(request.email).map_err(|e| DomainError::validation(e.to_string()))?;

        validate_password(&request.password)
            .map_err(|e| DomainError::validation(e.to_string()))?;

        if let Some(first_name) = &request.first_name {
            validate_name("first_name", first_name)
                .map_err(|e| DomainError::validation(e.to_string()))?;
        }

        if let Some(last_name) = &request.last_name {
            validate_name("last_name", last_name)
                .map_err(|e| DomainError::validation(e.to_string()))?;
        }

        if self.repository.exists(&email).await? {
            debug!(email = %email, "User already registered");
            return Ok(RegistrationOutcome::AlreadyRegistered);
        }

        let password_hash = self.hasher.hash(&request.password)?;
        let user = User::new(email, request.first_name, request.last_name, password_hash);

        match self.repository.create(user).await {
            Ok(user) => {
                info!(email = %user.email(), "User registered");
                Ok(RegistrationOutcome::Created(user))
            }
            Err(DomainError::Conflict { .. }) => Ok(RegistrationOutcome::AlreadyRegistered),
            Err(e) => Err(e),
        }
    }

    /// Whether a user is registered under this email. A malformed email can
    /// never be registered, so it reports false.
    pub async fn exists(&self, email: &str) -> Result<bool, DomainError> {
        match Email::new(email) {
            Ok(email) => self.repository.exists(&email).await,
            Err(_) => Ok(false),
        }
    }

    /// Delete a user after checking the password. Returns false when the
    /// email is unknown or the password does not match.
    pub async fn delete(&self, email: &str, password: &str) -> Result<bool, DomainError> {
        let Ok(email) = Email::new(email) else {
            return Ok(false);
        };

        let Some(user) = self.repository.get_by_email(&email).await? else {
            return Ok(false);
        };

        if !self.hasher.verify(password, user.password_hash()) {
            debug!(email = %email, "Password mismatch on delete");
            return Ok(false);
        }

        let removed = self.repository.delete(&email).await?;
        info!(email = %email, removed, "User deleted");

        Ok(removed)
    }

    pub async fn count(&self) -> Result<usize, DomainError> {
        self.repository.count().await
    }
}
