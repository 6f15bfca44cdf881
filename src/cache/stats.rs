//! Cache Statistics Module
//!
//! Raw operation counters kept alongside the entry table.

use serde::Serialize;

// == Cache Stats ==
/// Raw cache counters. No rates are derived.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct CacheStats {
    /// Reads that returned a value
    pub hits: u64,
    /// Reads that found no live entry (missing or expired)
    pub misses: u64,
    /// Entries removed by the LRU sweep to satisfy a count or size limit
    pub evictions: u64,
    /// Entries dropped because their TTL elapsed
    pub expirations: u64,
    /// Current number of entries in the table
    pub total_entries: usize,
    /// Current accounted payload bytes (0 unless a size limit is configured)
    pub total_bytes: usize,
}

impl CacheStats {
    // == Constructor ==
    /// Creates a new CacheStats with all counters at zero.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_hit(&mut self) {
        self.hits += 1;
    }

    pub fn record_miss(&mut self) {
        self.misses += 1;
    }

    pub fn record_eviction(&mut self) {
        self.evictions += 1;
    }

    pub fn record_expiration(&mut self) {
        self.expirations += 1;
    }
}
