//! User repository trait

use async_trait::async_trait;
use std::fmt::Debug;

use super::entity::{Email, User};
use crate::domain::DomainError;

/// Repository trait for user storage
///
/// Implementations must enforce email uniqueness themselves: `create` returns
/// `DomainError::Conflict` when the email is already taken, which is what makes
/// two racing registrations for the same email safe.
#[async_trait]
pub trait UserRepository: Send + Sync + Debug {
    /// Get a user by email
    async fn get_by_email(&self, email: &Email) -> Result<Option<User>, DomainError>;

    /// Create a new user
    async fn create(&self, user: User) -> Result<User, DomainError>;

    /// Delete a user, returning whether it existed
    async fn delete(&self, email: &Email) -> Result<bool, DomainError>;

    /// Count registered users
    async fn count(&self) -> Result<usize, DomainError>;

    /// Check if an email is registered
    async fn exists(&self, email: &Email) -> Result<bool, DomainError> {
        Ok(self.get_by_email(email).await?.is_some())
    }
}

#[cfg(test)]
pub mod mock {
    use super::*;
    use std::collections::HashMap;
    use std::sync::Arc;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use tokio::sync::RwLock;

    /// Mock user repository for testing
    #[derive(Debug, Default)]
    pub struct MockUserRepository {
        users: Arc<RwLock<HashMap<String, User>>>,
        should_fail: Arc<RwLock<bool>>,
        creates: AtomicUsize,
    }

    impl MockUserRepository {
        /// Create a new mock repository
        pub fn new() -> Self {
            Self::default()
        }

        /// Set whether operations should fail
        pub async fn set_should_fail(&self, fail: bool) {
            *self.should_fail.write().await = fail;
        }

        /// Number of `create` calls that reached the repository
        pub fn create_calls(&self) -> usize {
            self.creates.load(Ordering::SeqCst)
        }

        async fn check_should_fail(&self) -> Result<(), DomainError> {
            if *self.should_fail.read().await {
                return Err(DomainError::storage("Mock repository configured to fail"));
            }
            Ok(())
        }
    }

    #[async_trait]
    impl UserRepository for MockUserRepository {
        async fn get_by_email(&self, email: &Email) -> Result<Option<User>, DomainError> {
            self.check_should_fail().await?;
            let users = self.users.read().await;
            Ok(users.get(email.as_str()).cloned())
        }

        async fn create(&self, user: User) -> Result<User, DomainError> {
            self.creates.fetch_add(1, Ordering::SeqCst);
            self.check_should_fail().await?;
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
            self.check_should_fail().await?;
            Ok(self.users.write().await.remove(email.as_str()).is_some())
        }

        async fn count(&self) -> Result<usize, DomainError> {
            self.check_should_fail().await?;
            Ok(self.users.read().await.len())
        }
    }

    #[cfg(test)]
    mod tests {
        use super::*;

        fn create_test_user(email: &str) -> User {
            User::new(Email::new(email).unwrap(), None, None, "hashed_password")
        }

        #[tokio::test]
        async fn test_create_and_get() {
            let repo = MockUserRepository::new();
            let user = create_test_user("mario@test.com");

            repo.create(user.clone()).await.unwrap();

            let retrieved = repo.get_by_email(user.email()).await.unwrap();
            assert!(retrieved.is_some());
            assert!(repo.exists(user.email()).await.unwrap());
        }

        #[tokio::test]
        async fn test_email_uniqueness() {
            let repo = MockUserRepository::new();

            repo.create(create_test_user("mario@test.com")).await.unwrap();

            let result = repo.create(create_test_user("mario@test.com")).await;
            assert!(matches!(result, Err(DomainError::Conflict { .. })));
            assert_eq!(repo.create_calls(), 2);
        }

        #[tokio::test]
        async fn test_delete() {
            let repo = MockUserRepository::new();
            let user = create_test_user("mario@test.com");

            repo.create(user.clone()).await.unwrap();

            assert!(repo.delete(user.email()).await.unwrap());
            assert!(!repo.delete(user.email()).await.unwrap());
            assert_eq!(repo.count().await.unwrap(), 0);
        }

        #[tokio::test]
        async fn test_should_fail() {
            let repo = MockUserRepository::new();
            repo.set_should_fail(true).await;

            let result = repo.count().await;
            assert!(matches!(result, Err(DomainError::Storage { .. })));
        }
    }
}
