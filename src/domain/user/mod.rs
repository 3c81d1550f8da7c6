//! User domain
//!
//! This module provides domain types and traits for registered users,
//! including the user entity, validation, and the repository trait.

mod entity;
mod repository;
mod validation;

pub use entity::{Email, User};
pub use repository::UserRepository;
pub use validation::{validate_email, validate_name, validate_password, UserValidationError};

#[cfg(test)]
pub use repository::mock::MockUserRepository;
