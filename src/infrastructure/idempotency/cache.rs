//! In-memory response cache guarded by a single mutex

use std::collections::hash_map::Entry;
use std::collections::HashMap;
use std::sync::{Mutex, MutexGuard, PoisonError};
use std::time::Duration;

use tokio::time::Instant;

use crate::domain::idempotency::{IdempotencyKey, ResponseStore, StoredResponse};
use crate::infrastructure::observability::{record_cache_eviction, record_cache_lookup};

/// Configuration for the in-memory response cache
#[derive(Debug, Clone)]
pub struct ResponseCacheConfig {
    /// How long a stored response keeps satisfying retries
    pub ttl: Duration,
}

impl Default for ResponseCacheConfig {
    fn default() -> Self {
        Self {
            ttl: Duration::from_secs(300), // 5 minutes
        }
    }
}

impl ResponseCacheConfig {
    /// Sets the TTL
    pub fn with_ttl(mut self, ttl: Duration) -> Self {
        self.ttl = ttl;
        self
    }

    /// Default sweep interval: one fifth of the TTL
    pub fn default_sweep_interval(&self) -> Duration {
        (self.ttl / 5).max(Duration::from_millis(1))
    }
}

#[derive(Debug)]
struct CacheEntry {
    response: StoredResponse,
    created_at: Instant,
}

impl CacheEntry {
    fn new(response: StoredResponse, created_at: Instant) -> Self {
        Self {
            response,
            created_at,
        }
    }

    /// True once `created_at` lies strictly before `now - ttl`
    fn is_expired(&self, now: Instant, ttl: Duration) -> bool {
        now.saturating_duration_since(self.created_at) > ttl
    }
}

/// caller_id -> request_id -> entry
type Buckets = HashMap<String, HashMap<String, CacheEntry>>;

/// Process-local deduplicating response cache.
///
/// Every read and write goes through one mutex and holds it only for a map
/// operation. Entries are never overwritten while live, and entries older than
/// the TTL are invisible to `lookup` even before the sweeper reclaims them.
#[derive(Debug)]
pub struct InMemoryResponseCache {
    buckets: Mutex<Buckets>,
    config: ResponseCacheConfig,
}

impl InMemoryResponseCache {
    /// Creates a cache with the default 5 minute TTL
    pub fn new() -> Self {
        Self::with_config(ResponseCacheConfig::default())
    }

    /// Creates a cache with the given configuration
    pub fn with_config(config: ResponseCacheConfig) -> Self {
        Self {
            buckets: Mutex::new(HashMap::new()),
            config,
        }
    }

    pub fn config(&self) -> &ResponseCacheConfig {
        &self.config
    }

    // A panic elsewhere while holding the lock leaves the map itself intact,
    // so the guard is recovered instead of propagating the poison.
    fn lock(&self) -> MutexGuard<'_, Buckets> {
        self.buckets.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl Default for InMemoryResponseCache {
    fn default() -> Self {
        Self::new()
    }
}

impl ResponseStore for InMemoryResponseCache {
    fn lookup(&self, key: &IdempotencyKey) -> Option<StoredResponse> {
        let now = Instant::now();
        let ttl = self.config.ttl;

        let found = {
            let buckets = self.lock();
            buckets
                .get(key.caller_id())
                .and_then(|bucket| bucket.get(key.request_id()))
                .filter(|entry| !entry.is_expired(now, ttl))
                .map(|entry| entry.response.clone())
        };

        record_cache_lookup(found.is_some());
        found
    }

    fn store(&self, key: IdempotencyKey, response: StoredResponse) -> StoredResponse {
        let now = Instant::now();
        let ttl = self.config.ttl;
        let (caller_id, request_id) = key.into_parts();

        let mut buckets = self.lock();
        let bucket = buckets.entry(caller_id).or_default();

        match bucket.entry(request_id) {
            Entry::Occupied(mut occupied) => {
                if occupied.get().is_expired(now, ttl) {
                    occupied.insert(CacheEntry::new(response.clone(), now));
                    response
                } else {
                    occupied.get().response.clone()
                }
            }
            Entry::Vacant(vacant) => {
                vacant.insert(CacheEntry::new(response.clone(), now));
                response
            }
        }
    }

    fn evict(&self, key: &IdempotencyKey) -> bool {
        let removed = {
            let mut buckets = self.lock();

            match buckets.get_mut(key.caller_id()) {
                Some(bucket) => {
                    let removed = bucket.remove(key.request_id()).is_some();

                    if bucket.is_empty() {
                        buckets.remove(key.caller_id());
                    }

                    removed
                }
                None => false,
            }
        };

        if removed {
            record_cache_eviction("explicit", 1);
        }

        removed
    }

    fn purge_expired(&self) -> usize {
        let now = Instant::now();
        let ttl = self.config.ttl;
        let mut removed = 0;

        let mut buckets = self.lock();

        buckets.retain(|_, bucket| {
            let before = bucket.len();
            bucket.retain(|_, entry| !entry.is_expired(now, ttl));
            removed += before - bucket.len();
            !bucket.is_empty()
        });

        removed
    }

    fn len(&self) -> usize {
        self.lock().values().map(HashMap::len).sum()
    }

    fn ttl(&self) -> Duration {
        self.config.ttl
    }
}
