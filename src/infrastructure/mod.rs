//! Infrastructure layer - Storage, caching and external service implementations

pub mod data_collector;
pub mod idempotency;
pub mod logging;
pub mod observability;
pub mod user;
