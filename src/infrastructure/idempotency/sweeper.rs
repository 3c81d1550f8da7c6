//! Background task reclaiming expired idempotency entries

use std::any::Any;
use std::panic::{self, AssertUnwindSafe};
use std::sync::Arc;
use std::time::Duration;

use tokio::sync::oneshot;
use tokio::task::JoinHandle;
use tokio::time::{self, Instant, MissedTickBehavior};
use tracing::{debug, error, info, warn};

use crate::domain::idempotency::ResponseStore;
use crate::infrastructure::observability::record_cache_eviction;

const MIN_INTERVAL: Duration = Duration::from_millis(1);

/// Handle to a running sweeper task
///
/// Dropping the handle detaches the sweeper, which then keeps running for the
/// rest of the process. Call [`SweeperHandle::shutdown`] to stop it.
#[derive(Debug)]
pub struct SweeperHandle {
    stop: oneshot::Sender<()>,
    task: JoinHandle<()>,
    interval: Duration,
}

impl SweeperHandle {
    /// Sweep period of the running task
    pub fn interval(&self) -> Duration {
        self.interval
    }

    pub fn is_finished(&self) -> bool {
        self.task.is_finished()
    }

    /// Signal the sweeper to stop and wait for it to exit
    pub async fn shutdown(self) {
        let _ = self.stop.send(());

        if let Err(e) = self.task.await {
            warn!(error = %e, "Idempotency sweeper exited abnormally");
        }
    }
}

/// Start the periodic sweep of `store`.
///
/// The first sweep runs one `interval` after the call. A sweep that panics is
/// logged and the loop carries on at the next tick.
pub fn spawn_sweeper(store: Arc<dyn ResponseStore>, interval: Duration) -> SweeperHandle {
    let interval = interval.max(MIN_INTERVAL);
    let (stop, mut stop_rx) = oneshot::channel::<()>();

    let task = tokio::spawn(async move {
        let mut ticker = time::interval_at(Instant::now() + interval, interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Delay);

        let mut detached = false;

        info!(
            interval_secs = interval.as_secs_f64(),
            ttl_secs = store.ttl().as_secs_f64(),
            "Idempotency sweeper started"
        );

        loop {
            tokio::select! {
                _ = ticker.tick() => {
                    sweep_once(store.as_ref());
                }
                signal = &mut stop_rx, if !detached => match signal {
                    Ok(()) => break,
                    Err(_) => detached = true,
                },
            }
        }

        info!("Idempotency sweeper stopped");
    });

    SweeperHandle {
        stop,
        task,
        interval,
    }
}

/// Run a single sweep, containing any panic raised by the store
pub fn sweep_once(store: &dyn ResponseStore) -> usize {
    match panic::catch_unwind(AssertUnwindSafe(|| store.purge_expired())) {
        Ok(0) => {
            debug!("Idempotency sweep found nothing to remove");
            0
        }
        Ok(removed) => {
            record_cache_eviction("expired", removed as u64);
            info!(removed, remaining = store.len(), "Removed expired idempotency entries");
            removed
        }
        Err(payload) => {
            error!(
                panic = %panic_message(payload.as_ref()),
                "Idempotency sweep failed, retrying at next interval"
            );
            0
        }
    }
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_string()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "unknown panic".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicUsize, Ordering};

    use crate::domain::idempotency::{IdempotencyKey, StoredResponse};
    use crate::infrastructure::idempotency::{InMemoryResponseCache, ResponseCacheConfig};

    fn key(caller: &str, request: &str) -> IdempotencyKey {
        IdempotencyKey::new(caller, request).unwrap()
    }

    fn cache_with_ttl(ttl: Duration) -> Arc<InMemoryResponseCache> {
        Arc::new(InMemoryResponseCache::with_config(
            ResponseCacheConfig::default().with_ttl(ttl),
        ))
    }

    /// Store whose first purge panics, used to check failure isolation
    #[derive(Debug, Default)]
    struct FlakyStore {
        purges: AtomicUsize,
    }

    impl ResponseStore for FlakyStore {
        fn lookup(&self, _key: &IdempotencyKey) -> Option<StoredResponse> {
            None
        }

        fn store(&self, _key: IdempotencyKey, response: StoredResponse) -> StoredResponse {
            response
        }

        fn evict(&self, _key: &IdempotencyKey) -> bool {
            false
        }

        fn purge_expired(&self) -> usize {
            if self.purges.fetch_add(1, Ordering::SeqCst) == 0 {
                panic!("simulated sweep failure");
            }
            0
        }

        fn len(&self) -> usize {
            0
        }

        fn ttl(&self) -> Duration {
            Duration::from_secs(300)
        }
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_removes_expired_entries() {
        let ttl = Duration::from_secs(300);
        let cache = cache_with_ttl(ttl);
        let interval = cache.config().default_sweep_interval();
        let handle = spawn_sweeper(cache.clone(), interval);

        cache.store(key("DATA_COLLECTOR", "req-1"), StoredResponse::check_user(true));

        // Halfway through the TTL the entry is still served
        time::sleep(ttl / 2).await;
        assert!(cache.lookup(&key("DATA_COLLECTOR", "req-1")).is_some());

        // ttl + one sweep interval + epsilon: swept, not just hidden
        time::sleep(ttl / 2 + interval + Duration::from_millis(1)).await;
        assert!(cache.lookup(&key("DATA_COLLECTOR", "req-1")).is_none());
        assert!(cache.is_empty());

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_sweeper_survives_panicking_sweep() {
        let store = Arc::new(FlakyStore::default());
        let handle = spawn_sweeper(store.clone(), Duration::from_secs(60));

        time::sleep(Duration::from_secs(60 * 3 + 1)).await;

        assert_eq!(store.purges.load(Ordering::SeqCst), 3);
        assert!(!handle.is_finished());

        handle.shutdown().await;
    }

    #[tokio::test(start_paused = true)]
    async fn test_shutdown_stops_the_task() {
        let cache = cache_with_ttl(Duration::from_secs(5));
        let handle = spawn_sweeper(cache, Duration::from_secs(1));
        assert_eq!(handle.interval(), Duration::from_secs(1));

        tokio::time::timeout(Duration::from_secs(5), handle.shutdown())
            .await
            .expect("sweeper did not stop");
    }

    #[tokio::test(start_paused = true)]
    async fn test_dropped_handle_keeps_sweeping() {
        let ttl = Duration::from_secs(10);
        let cache = cache_with_ttl(ttl);
        drop(spawn_sweeper(cache.clone(), Duration::from_secs(2)));

        cache.store(key("svc", "r"), StoredResponse::check_user(false));

        time::sleep(ttl + Duration::from_secs(3)).await;
        assert!(cache.is_empty());
    }

    #[test]
    fn test_sweep_once_contains_panic() {
        let store = FlakyStore::default();

        assert_eq!(sweep_once(&store), 0);
        assert_eq!(sweep_once(&store), 0);
        assert_eq!(store.purges.load(Ordering::SeqCst), 2);
    }
}
