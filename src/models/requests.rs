//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies.

use std::time::Duration;

use chrono::{DateTime, Utc};
use serde::Deserialize;
use serde_json::Value;

use crate::cache::{Expiry, MAX_KEY_LENGTH};
use crate::error::Result;

/// Checks a key against the front-end's length rules.
fn validate_key(key: &str) -> Option<String> {
    if key.is_empty() {
        return Some("Key cannot be empty".to_string());
    }
    if key.len() > MAX_KEY_LENGTH {
        return Some(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        ));
    }
    None
}

/// Resolves the optional `ttl` seconds and `expires_at` fields to a TTL.
fn resolve_ttl(ttl: Option<u64>, expires_at: Option<DateTime<Utc>>) -> Result<Option<Duration>> {
    Expiry::from_parts(ttl.map(Duration::from_secs), expires_at)?.ttl()
}

/// Request body for the SET operation (PUT /set)
///
/// # Fields
/// - `key`: The cache key to store the value under
/// - `value`: Any JSON value; `null` stores nothing and clears the key
/// - `ttl`: Optional TTL in seconds
/// - `expires_at`: Optional RFC 3339 expiry time, exclusive with `ttl`
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The cache key
    pub key: String,
    /// The value to store
    #[serde(default)]
    pub value: Value,
    /// Optional TTL in seconds
    #[serde(default)]
    pub ttl: Option<u64>,
    /// Optional absolute expiry time
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        validate_key(&self.key)
    }

    /// Resolves the requested expiry to a TTL.
    pub fn resolve_ttl(&self) -> Result<Option<Duration>> {
        resolve_ttl(self.ttl, self.expires_at)
    }
}

/// Request body for the bulk read operation (POST /mget)
#[derive(Debug, Clone, Deserialize)]
pub struct MultiGetRequest {
    /// Keys to look up
    pub keys: Vec<String>,
}

/// Request body for the bulk write operation (PUT /mset)
#[derive(Debug, Clone, Deserialize)]
pub struct MultiSetRequest {
    /// Key/value pairs to store
    pub entries: serde_json::Map<String, Value>,
    /// Optional TTL in seconds applied to every entry
    #[serde(default)]
    pub ttl: Option<u64>,
    /// Optional absolute expiry time, exclusive with `ttl`
    #[serde(default)]
    pub expires_at: Option<DateTime<Utc>>,
}

impl MultiSetRequest {
    /// Returns the first key validation failure, if any.
    pub fn validate(&self) -> Option<String> {
        self.entries.keys().find_map(|key| validate_key(key))
    }

    pub fn resolve_ttl(&self) -> Result<Option<Duration>> {
        resolve_ttl(self.ttl, self.expires_at)
    }
}
