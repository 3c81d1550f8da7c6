//! Data Collector client
//!
//! The Data Collector owns the collected data of every registered user. When a
//! user is deleted here, it is asked to drop that data as well.

mod client;

pub use client::{DataCollectorClient, HttpDataCollectorClient, NoopDataCollectorClient};

#[cfg(test)]
pub use client::MockDataCollectorClient;
