//! Cache Module
//!
//! Provides an in-process store with TTL expiration, LRU eviction by entry
//! count and payload size, and pluggable value encoding.

mod encoder;
mod entry;
mod expiry;
mod guard;
mod key;
mod lru;
mod stats;
mod store;


// Re-export public types
pub use encoder::{CloneEncoder, Encoder, JsonEncoder, Utf8Encoder};
pub use entry::CacheEntry;
pub use expiry::Expiry;
pub use guard::{Concurrent, Guard, SingleThreaded};
pub use key::CacheKey;
pub use lru::LruTracker;
pub use stats::CacheStats;
pub use store::{Store, StoreBuilder, StoreConfig};

// == Public Constants ==
/// Maximum key length in bytes accepted by the HTTP front-end
pub const MAX_KEY_LENGTH: usize = 256;
