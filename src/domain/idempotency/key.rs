//! Idempotency key identifying one logical request from one caller

use std::fmt;

use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Errors raised when an idempotency key cannot be built
#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum IdempotencyKeyError {
    #[error("Caller ID cannot be empty")]
    EmptyCallerId,

    #[error("Request ID cannot be empty")]
    EmptyRequestId,

    #[error("{0} exceeds maximum length of {1} characters")]
    TooLong(&'static str, usize),
}

const MAX_COMPONENT_LENGTH: usize = 256;

/// Identifies a logical request: who sent it and which attempt it is.
///
/// Two keys are the same request iff both components are byte-equal. The
/// components are kept apart rather than joined into one string, so no choice
/// of characters in either one can make two distinct keys collide.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct IdempotencyKey {
    caller_id: String,
    request_id: String,
}

impl IdempotencyKey {
    /// Build a key, rejecting empty or oversized components
    pub fn new(
        caller_id: impl Into<String>,
        request_id: impl Into<String>,
    ) -> Result<Self, IdempotencyKeyError> {
        let caller_id = caller_id.into();
        let request_id = request_id.into();

        if caller_id.is_empty() {
            return Err(IdempotencyKeyError::EmptyCallerId);
        }

        if request_id.is_empty() {
            return Err(IdempotencyKeyError::EmptyRequestId);
        }

        if caller_id.len() > MAX_COMPONENT_LENGTH {
            return Err(IdempotencyKeyError::TooLong("Caller ID", MAX_COMPONENT_LENGTH));
        }

        if request_id.len() > MAX_COMPONENT_LENGTH {
            return Err(IdempotencyKeyError::TooLong("Request ID", MAX_COMPONENT_LENGTH));
        }

        Ok(Self {
            caller_id,
            request_id,
        })
    }

    pub fn caller_id(&self) -> &str {
        &self.caller_id
    }

    pub fn request_id(&self) -> &str {
        &self.request_id
    }

    /// Split the key into `(caller_id, request_id)`
    pub fn into_parts(self) -> (String, String) {
        (self.caller_id, self.request_id)
    }
}

impl fmt::Display for IdempotencyKey {
    // Log rendering only; never used for storage.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}/{}", self.caller_id, self.request_id)
    }
}
