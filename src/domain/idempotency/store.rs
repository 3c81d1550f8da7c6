//! Response store trait definition

use std::fmt::Debug;
use std::time::Duration;

use super::{IdempotencyKey, StoredResponse};

/// Deduplicating store of terminal responses, keyed by idempotency key.
///
/// All methods are synchronous and must only hold internal locks for the
/// duration of a map operation; callers run the real work outside of them.
pub trait ResponseStore: Send + Sync + Debug {
    /// Returns the response remembered for `key`, if it is still live
    fn lookup(&self, key: &IdempotencyKey) -> Option<StoredResponse>;

    /// Remembers `response` under `key` and returns the response that is now
    /// cached. An existing live entry is never overwritten: the first stored
    /// response wins and is returned to every later caller.
    fn store(&self, key: IdempotencyKey, response: StoredResponse) -> StoredResponse;

    /// Forgets `key`; returns whether anything was removed
    fn evict(&self, key: &IdempotencyKey) -> bool;

    /// Removes every entry older than the TTL; returns how many were removed
    fn purge_expired(&self) -> usize;

    /// Number of entries currently held (expired but unswept ones included)
    fn len(&self) -> usize;

    fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Time-to-live applied to every entry
    fn ttl(&self) -> Duration;
}
