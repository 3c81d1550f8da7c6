//! Responses remembered for replay

use serde::{Deserialize, Serialize};

/// A terminal response recorded under an idempotency key.
///
/// Each variant is owned by one call site; the cache treats the payload as
/// opaque and hands it back unchanged.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum StoredResponse {
    /// HTTP status code plus the JSON body that was sent
    Http { status: u16, body: serde_json::Value },
    /// Result of the user-existence RPC
    CheckUser { exists: bool },
}

impl StoredResponse {
    pub fn http(status: u16, body: serde_json::Value) -> Self {
        Self::Http { status, body }
    }

    pub fn check_user(exists: bool) -> Self {
        Self::CheckUser { exists }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_http_response_equality() {
        let a = StoredResponse::http(201, json!({"message": "created"}));
        let b = StoredResponse::http(201, json!({"message": "created"}));
        let c = StoredResponse::http(200, json!({"message": "created"}));

        assert_eq!(a, b);
        assert_ne!(a, c);
    }

    #[test]
    fn test_serialization_is_tagged() {
        let json = serde_json::to_value(StoredResponse::check_user(true)).unwrap();
        assert_eq!(json, json!({"kind": "check_user", "exists": true}));
    }
}
