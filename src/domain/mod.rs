//! Domain layer - Core business logic and entities

pub mod error;
pub mod idempotency;
pub mod user;

pub use error::DomainError;
pub use idempotency::{IdempotencyKey, IdempotencyKeyError, ResponseStore, StoredResponse};
pub use user::{Email, User, UserRepository, UserValidationError};
