//! Request and response bodies for the user endpoints

use serde::{Deserialize, Serialize};

/// Body of `POST /users`
#[derive(Debug, Clone, Deserialize)]
pub struct RegisterUserBody {
    pub email: String,
    pub password: String,
    #[serde(default)]
    pub first_name: Option<String>,
    #[serde(default)]
    pub last_name: Option<String>,
}

/// Body of a 200/201 registration answer, also what gets replayed
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegistrationResponse {
    pub message: String,
    pub email: String,
}

impl RegistrationResponse {
    pub fn completed(email: impl Into<String>) -> Self {
        Self {
            message: "Registration completed".to_string(),
            email: email.into(),
        }
    }

    pub fn already_registered(email: impl Into<String>) -> Self {
        Self {
            message: "User already registered".to_string(),
            email: email.into(),
        }
    }
}

/// Body of `DELETE /users`
#[derive(Debug, Clone, Deserialize)]
pub struct DeleteUserBody {
    pub email: String,
    pub password: String,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DeleteUserResponse {
    pub message: String,
    pub email: String,
    /// Whether a cached registration response was dropped
    pub cache_evicted: bool,
}
