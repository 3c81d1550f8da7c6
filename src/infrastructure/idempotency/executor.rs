//! Get-or-compute-and-cache wrapper for non-idempotent operations

use std::future::Future;
use std::sync::Arc;

use tracing::debug;

use crate::domain::idempotency::{IdempotencyKey, ResponseStore, StoredResponse};

/// Result of running an operation through the executor
#[derive(Debug, Clone, PartialEq)]
pub struct Execution {
    /// Response to send back to the caller
    pub response: StoredResponse,
    /// True when the response came from the cache and the operation did not run
    pub replayed: bool,
}

/// Runs mutating operations at most once per idempotency key.
///
/// A cached response is returned as-is. Otherwise the operation runs once,
/// outside any lock; an `Ok` outcome is definitive and gets cached, while an
/// `Err` is handed back uncached so the next retry starts over.
///
/// Two concurrent first attempts for the same key may both run the operation.
/// Whichever stores first wins, and every caller that gets as far as storing
/// returns that same response.
#[derive(Debug, Clone)]
pub struct IdempotentExecutor {
    store: Arc<dyn ResponseStore>,
}

impl IdempotentExecutor {
    pub fn new(store: Arc<dyn ResponseStore>) -> Self {
        Self { store }
    }

    pub fn store(&self) -> &Arc<dyn ResponseStore> {
        &self.store
    }

    pub async fn execute<F, Fut, E>(
        &self,
        key: &IdempotencyKey,
        operation: F,
    ) -> Result<Execution, E>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<StoredResponse, E>>,
    {
        if let Some(response) = self.store.lookup(key) {
            debug!(
                caller_id = %key.caller_id(),
                request_id = %key.request_id(),
                "Replaying cached response"
            );

            return Ok(Execution {
                response,
                replayed: true,
            });
        }

        let response = operation().await?;
        let response = self.store.store(key.clone(), response);

        Ok(Execution {
            response,
            replayed: false,
        })
    }
}
