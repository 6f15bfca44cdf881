//! Mini Cache - An in-process key/value cache
//!
//! Provides a store with TTL expiration, LRU eviction bounded by entry count
//! and payload size, optional locking and pluggable value encoding, plus an
//! HTTP front-end serving JSON values.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod tasks;

pub use api::AppState;
pub use cache::{Expiry, Store, StoreBuilder};
pub use config::Config;
pub use error::{CacheError, Result};
pub use tasks::spawn_cleanup_task;
