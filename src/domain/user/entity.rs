//! User entity and related types

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::validation::{validate_email, UserValidationError};

/// Email address identifying a user
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "String", into = "String")]
pub struct Email(String);

impl Email {
    /// Create a new Email after validation
    pub fn new(email: impl Into<String>) -> Result<Self, UserValidationError> {
        let email = email.into();
        validate_email(&email)?;
        Ok(Self(email))
    }

    /// Get the inner string value
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl TryFrom<String> for Email {
    type Error = UserValidationError;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        Self::new(value)
    }
}

impl From<Email> for String {
    fn from(email: Email) -> Self {
        email.0
    }
}

impl std::fmt::Display for Email {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Registered user
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    /// Unique email address
    email: Email,
    #[serde(skip_serializing_if = "Option::is_none")]
    first_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    last_name: Option<String>,
    /// Argon2 password hash - never exposed in serialization
    #[serde(skip_serializing)]
    password_hash: String,
    /// Registration timestamp
    created_at: DateTime<Utc>,
}

impl User {
    /// Create a new user registered now
    pub fn new(
        email: Email,
        first_name: Option<String>,
        last_name: Option<String>,
        password_hash: impl Into<String>,
    ) -> Self {
        Self {
            email,
            first_name,
            last_name,
            password_hash: password_hash.into(),
            created_at: Utc::now(),
        }
    }

    /// Rebuild a user loaded from storage
    pub fn from_parts(
        email: Email,
        first_name: Option<String>,
        last_name: Option<String>,
        password_hash: String,
        created_at: DateTime<Utc>,
    ) -> Self {
        Self {
            email,
            first_name,
            last_name,
            password_hash,
            created_at,
        }
    }

    pub fn email(&self) -> &Email {
        &self.email
    }

    pub fn first_name(&self) -> Option<&str> {
        self.first_name.as_deref()
    }

    pub fn last_name(&self) -> Option<&str> {
        self.last_name.as_deref()
    }

    pub fn password_hash(&self) -> &str {
        &self.password_hash
    }

    pub fn created_at(&self) -> DateTime<Utc> {
        self.created_at
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn create_test_user(email: &str) -> User {
        User::new(
            Email::new(email).unwrap(),
            Some("Mario".to_string()),
            Some("Rossi".to_string()),
            "hashed_password",
        )
    }

    #[test]
    fn test_email_valid() {
        let email = Email::new("mario@test.com").unwrap();
        assert_eq!(email.as_str(), "mario@test.com");
        assert_eq!(email.to_string(), "mario@test.com");
    }

    #[test]
    fn test_email_invalid() {
        assert!(Email::new("").is_err());
        assert!(Email::new("not-an-email").is_err());
    }

    #[test]
    fn test_email_deserialization_validates() {
        let ok: Result<Email, _> = serde_json::from_str("\"mario@test.com\"");
        assert!(ok.is_ok());

        let bad: Result<Email, _> = serde_json::from_str("\"mario\"");
        assert!(bad.is_err());
    }

    #[test]
    fn test_user_creation() {
        let user = create_test_user("mario@test.com");

        assert_eq!(user.email().as_str(), "mario@test.com");
        assert_eq!(user.first_name(), Some("Mario"));
        assert_eq!(user.last_name(), Some("Rossi"));
        assert_eq!(user.password_hash(), "hashed_password");
    }

    #[test]
    fn test_user_serialization_excludes_password() {
        let user = create_test_user("mario@test.com");

        let json = serde_json::to_string(&user).unwrap();
        assert!(!json.contains("hashed_password"));
        assert!(!json.contains("password_hash"));
    }
}
