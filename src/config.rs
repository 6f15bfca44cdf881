//! Configuration Module
//!
//! Handles loading and managing server configuration from environment variables.

use std::env;
use std::str::FromStr;
use std::time::Duration;

use crate::cache::StoreConfig;

/// Server configuration parameters.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// Maximum number of entries the cache can hold (None = unbounded)
    pub max_entries: Option<usize>,
    /// Maximum accounted payload bytes (None = unbounded)
    pub max_size_bytes: Option<usize>,
    /// Default TTL in seconds for entries without explicit TTL (None = never expire)
    pub default_ttl: Option<u64>,
    /// HTTP server port
    pub server_port: u16,
    /// Background cleanup task interval in seconds
    pub cleanup_interval: u64,
}

/// Shortest cleanup interval in seconds; lower values are raised to it.
pub const MIN_CLEANUP_INTERVAL: u64 = 1;

fn parse_var<T: FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}

/// Reads a limit where `0` means "no limit".
fn parse_limit<T: FromStr + PartialEq + Default>(name: &str, default: Option<T>) -> Option<T> {
    match parse_var::<T>(name) {
        Some(value) if value == T::default() => None,
        Some(value) => Some(value),
        None => default,
    }
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `MAX_ENTRIES` - Maximum cache entries, 0 disables (default: 1000)
    /// - `MAX_SIZE_BYTES` - Maximum payload bytes, 0 disables (default: unset)
    /// - `DEFAULT_TTL` - Default TTL in seconds, 0 disables (default: 300)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - `CLEANUP_INTERVAL` - Cleanup frequency in seconds, at least 1 (default: 1)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_entries: parse_limit("MAX_ENTRIES", defaults.max_entries),
            max_size_bytes: parse_limit("MAX_SIZE_BYTES", defaults.max_size_bytes),
            default_ttl: parse_limit("DEFAULT_TTL", defaults.default_ttl),
            server_port: parse_var("SERVER_PORT").unwrap_or(defaults.server_port),
            cleanup_interval: parse_var("CLEANUP_INTERVAL")
                .unwrap_or(defaults.cleanup_interval)
                .max(MIN_CLEANUP_INTERVAL),
        }
    }

    /// Store limits derived from this configuration.
    pub fn store_config(&self) -> StoreConfig {
        StoreConfig {
            default_ttl: self.default_ttl.map(Duration::from_secs),
            max_entries: self.max_entries,
            max_size_bytes: self.max_size_bytes,
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            max_entries: Some(1000),
            max_size_bytes: None,
            default_ttl: Some(300),
            server_port: 3000,
            cleanup_interval: 1,
        }
    }
}
