//! Idempotency domain - at-most-once request handling

mod key;
mod response;
mod store;

pub use key::{IdempotencyKey, IdempotencyKeyError};
pub use response::StoredResponse;
pub use store::ResponseStore;
