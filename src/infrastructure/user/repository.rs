//! In-memory user repository implementation

use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;
use tokio::sync::RwLock;

use crate::domain::user::{Email, User, UserRepository};
use crate::domain::DomainError;

/// In-memory implementation of UserRepository, keyed by email
#[derive(Debug, Default)]
pub struct InMemoryUserRepository {
    users: Arc<RwLock<HashMap<String, User>>>,
}

impl InMemoryUserRepository {
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a repository with initial users
    pub fn with_users(users: Vec<User>) -> Self {
        let users = users
            .into_iter()
            .map(|user| (user.email().as_str().to_string(), user))
            .collect();

        Self {
            users: Arc::new(RwLock::new(users)),
        }
    }
}

#[async_trait]
impl UserRepository for InMemoryUserRepository {
    async fn get_by_email(&self, email: &Email) -> Result<Option<User>, DomainError> {
        let users = self.users.read().await;
        Ok(users.get(email.as_str()).cloned())
    }

    async fn create(&self, user: User) -> Result<User, DomainError> {
        let mut users = self.users.write().await;
        let email = user.email().as_str().to_string();

        if users.contains_key(&email) {
            return Err(DomainError::conflict(format!(
                "User '{}' already exists",
                email
            )));
        }

        users.insert(email, user.clone());
        Ok(user)
    }

    async fn delete(&self, email: &Email) -> Result<bool, DomainError> {
        let mut users = self.users.write().await;
        Ok(users.remove(email.as_str()).is_some())
    }

    async fn count(&self) -> Result<usize, DomainError> {
        Ok(self.users.read().await.len())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user(email: &str) -> User {
        User::new(
            Email::new(email).unwrap(),
            Some("Mario".to_string()),
            Some("Rossi".to_string()),
            "hash",
        )
    }

    #[tokio::test]
    async fn test_create_and_get_by_email() {
        let repo = InMemoryUserRepository::new();
        repo.create(user("mario@test.com")).await.unwrap();

        let email = Email::new("mario@test.com").unwrap();
        let stored = repo.get_by_email(&email).await.unwrap().unwrap();

        assert_eq!(stored.first_name(), Some("Mario"));
        assert!(repo.exists(&email).await.unwrap());
    }

    #[tokio::test]
    async fn test_duplicate_email_conflicts() {
        let repo = InMemoryUserRepository::new();
        repo.create(user("mario@test.com")).await.unwrap();

        let result = repo.create(user("mario@test.com")).await;

        assert!(matches!(result, Err(DomainError::Conflict { .. })));
        assert_eq!(repo.count().await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_delete_reports_existence() {
        let repo = InMemoryUserRepository::with_users(vec![user("mario@test.com")]);
        let email = Email::new("mario@test.com").unwrap();

        assert!(repo.delete(&email).await.unwrap());
        assert!(!repo.delete(&email).await.unwrap());
        assert!(!repo.exists(&email).await.unwrap());
    }

    #[tokio::test]
    async fn test_unknown_email() {
        let repo = InMemoryUserRepository::new();
        let email = Email::new("nobody@test.com").unwrap();

        assert!(repo.get_by_email(&email).await.unwrap().is_none());
        assert_eq!(repo.count().await.unwrap(), 0);
    }
}
