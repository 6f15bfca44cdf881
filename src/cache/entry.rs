//! Cache Entry Module
//!
//! Defines the structure for individual cache entries with TTL support.

use std::time::{Duration, Instant};

// == Cache Entry ==
/// A single stored value with its expiry metadata.
///
/// Entries are immutable once created; overwriting a key replaces the entry.
#[derive(Debug, Clone)]
pub struct CacheEntry<T> {
    /// The value as produced by the encoder
    pub encoded: T,
    /// Absolute expiry instant, None = no expiration
    pub expires_at: Option<Instant>,
    /// Bytes accounted against the size limit (0 when size is not tracked)
    pub size: usize,
}

impl<T> CacheEntry<T> {
    // == Constructor ==
    /// Creates a new entry expiring `ttl` from now, if a TTL is given.
    ///
    /// A TTL too large to represent as an `Instant` never expires.
    pub fn new(encoded: T, ttl: Option<Duration>, size: usize) -> Self {
        let expires_at = ttl.and_then(|ttl| Instant::now().checked_add(ttl));
        Self {
            encoded,
            expires_at,
            size,
        }
    }

    // == Is Expired ==
    /// Checks whether the entry has expired as of `now`.
    ///
    /// An entry is expired once `now >= expires_at`, so a zero TTL produces an
    /// entry that is never readable.
    pub fn is_expired_at(&self, now: Instant) -> bool {
        match self.expires_at {
            Some(expires) => now >= expires,
            None => false,
        }
    }
}
