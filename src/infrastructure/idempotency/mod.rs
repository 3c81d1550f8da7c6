//! Idempotency infrastructure - response cache, sweeper and executor

mod cache;
mod executor;
mod sweeper;

pub use cache::{InMemoryResponseCache, ResponseCacheConfig};
pub use executor::{Execution, IdempotentExecutor};
pub use sweeper::{spawn_sweeper, sweep_once, SweeperHandle};
