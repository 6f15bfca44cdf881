//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with LRU tracking, size
//! accounting and TTL expiration.

use std::collections::HashMap;
use std::fmt;
use std::marker::PhantomData;
use std::time::{Duration, Instant};

use tracing::{debug, span::EnteredSpan, trace_span};

use crate::cache::{
    CacheEntry, CacheKey, CacheStats, Concurrent, Encoder, Expiry, Guard, LruTracker,
    SingleThreaded,
};
use crate::error::{CacheError, Result};

// == Store Config ==
/// Limits and defaults fixed for the lifetime of a store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct StoreConfig {
    /// TTL applied to writes that do not specify one
    pub default_ttl: Option<Duration>,
    /// Maximum number of entries
    pub max_entries: Option<usize>,
    /// Maximum sum of key and encoded value bytes
    pub max_size_bytes: Option<usize>,
}

impl StoreConfig {
    /// True when any limit is set; reads then reorder and writes sweep.
    pub fn lru_active(&self) -> bool {
        self.max_entries.is_some() || self.max_size_bytes.is_some()
    }
}

// == Table ==
/// State guarded by the store: entries, recency order and byte total.
#[derive(Debug)]
struct Table<T> {
    entries: HashMap<String, CacheEntry<T>>,
    lru: LruTracker,
    total_bytes: usize,
    stats: CacheStats,
}

impl<T> Table<T> {
    fn new() -> Self {
        Self {
            entries: HashMap::new(),
            lru: LruTracker::new(),
            total_bytes: 0,
            stats: CacheStats::new(),
        }
    }

    fn insert(&mut self, key: String, entry: CacheEntry<T>, track: bool) {
        self.total_bytes += entry.size;
        if track {
            self.lru.touch(&key);
        }
        if let Some(previous) = self.entries.insert(key, entry) {
            self.total_bytes -= previous.size;
        }
    }

    fn remove(&mut self, key: &str) -> Option<CacheEntry<T>> {
        let entry = self.entries.remove(key)?;
        self.total_bytes -= entry.size;
        self.lru.remove(key);
        Some(entry)
    }

    /// Returns true if `key` holds a live entry, dropping it if it has expired.
    fn live(&mut self, key: &str, now: Instant) -> bool {
        match self.entries.get(key).map(|entry| entry.is_expired_at(now)) {
            None => false,
            Some(false) => true,
            Some(true) => {
                self.remove(key);
                self.stats.record_expiration();
                false
            }
        }
    }

    fn expire(&mut self, now: Instant) -> usize {
        let expired: Vec<String> = self
            .entries
            .iter()
            .filter(|(_, entry)| entry.is_expired_at(now))
            .map(|(key, _)| key.clone())
            .collect();

        for key in &expired {
            self.remove(key);
            self.stats.record_expiration();
        }
        expired.len()
    }

    fn evict_oldest(&mut self) -> bool {
        let Some(key) = self.lru.evict_oldest() else {
            return false;
        };
        if let Some(entry) = self.entries.remove(&key) {
            self.total_bytes -= entry.size;
            self.stats.record_eviction();
        }
        true
    }

    // == Sweep ==
    /// Expires first, then evicts oldest entries until both limits hold.
    fn sweep(&mut self, config: &StoreConfig, now: Instant) {
        let expired = self.expire(now);
        let mut evicted = 0;

        if let Some(max_size) = config.max_size_bytes {
            while self.total_bytes > max_size && self.evict_oldest() {
                evicted += 1;
            }
        }
        if let Some(max_entries) = config.max_entries {
            while self.entries.len() > max_entries && self.evict_oldest() {
                evicted += 1;
            }
        }

        if expired > 0 || evicted > 0 {
            debug!(
                "LRU sweep: expired {} entries, evicted {} entries",
                expired, evicted
            );
        }
    }

    fn clear(&mut self) {
        self.entries.clear();
        self.lru.clear();
        self.total_bytes = 0;
    }
}

fn span(op: &'static str) -> EnteredSpan {
    trace_span!("cache", op).entered()
}

// == Store ==
/// Key/value store with optional TTL expiry and LRU eviction by count and size.
///
/// `V` is the caller's value type, `E` the encoder producing what is kept in the
/// table, and `G` the exclusive-access strategy: [`Concurrent`] (the default)
/// locks a mutex around each operation, [`SingleThreaded`] does not lock and
/// makes the store `!Sync`.
pub struct Store<V, E: Encoder<V>, G: Guard = Concurrent> {
    table: G::Cell<Table<E::Encoded>>,
    encoder: E,
    config: StoreConfig,
    _value: PhantomData<fn() -> V>,
}

impl<V, E: Encoder<V>> Store<V, E, Concurrent> {
    // == Constructor ==
    /// Creates a concurrent store with no limits and no default TTL.
    pub fn new(encoder: E) -> Self {
        Self::from_parts(encoder, StoreConfig::default())
    }

    /// Starts configuring a store around `encoder`.
    pub fn builder(encoder: E) -> StoreBuilder<V, E, Concurrent> {
        StoreBuilder::new(encoder)
    }
}

impl<V, E: Encoder<V>, G: Guard> Store<V, E, G> {
    fn from_parts(encoder: E, config: StoreConfig) -> Self {
        Self {
            table: G::wrap(Table::new()),
            encoder,
            config,
            _value: PhantomData,
        }
    }

    fn with_table<R>(&self, f: impl FnOnce(&mut Table<E::Encoded>) -> R) -> R {
        G::run(&self.table, f)
    }

    /// Encodes a value and measures its accounted size under `key`.
    fn encode_entry(&self, key: &str, value: &V) -> Result<Option<(E::Encoded, usize)>> {
        let Some(encoded) = self.encoder.encode(value)? else {
            return Ok(None);
        };
        let size = match self.config.max_size_bytes {
            Some(_) => key.len() + self.encoder.byte_len(&encoded).unwrap_or(0),
            None => 0,
        };
        Ok(Some((encoded, size)))
    }

    /// Applies one write to the table; returns true if an entry was stored.
    fn put(
        &self,
        table: &mut Table<E::Encoded>,
        key: String,
        encoded: Option<(E::Encoded, usize)>,
        ttl: Option<Duration>,
    ) -> bool {
        let lru_active = self.config.lru_active();
        if lru_active || encoded.is_none() {
            table.remove(&key);
        }
        let Some((encoded, size)) = encoded else {
            return false;
        };
        let entry = CacheEntry::new(encoded, ttl.or(self.config.default_ttl), size);
        table.insert(key, entry, lru_active);
        true
    }

    // == Read ==
    /// Returns the live value under `key`, or None if missing or expired.
    ///
    /// An expired entry is removed on sight. With LRU active the entry becomes
    /// the most recently used.
    pub fn read<K: CacheKey + ?Sized>(&self, key: &K) -> Result<Option<V>> {
        let _span = span("read");
        let key = key.normalize();
        let now = Instant::now();
        self.with_table(|table| self.read_locked(table, &key, now))
    }

    fn read_locked(
        &self,
        table: &mut Table<E::Encoded>,
        key: &str,
        now: Instant,
    ) -> Result<Option<V>> {
        if !table.live(key, now) {
            table.stats.record_miss();
            return Ok(None);
        }
        if self.config.lru_active() {
            table.lru.touch(key);
        }
        table.stats.record_hit();
        match table.entries.get(key) {
            Some(entry) => self.encoder.decode(&entry.encoded).map(Some),
            None => Ok(None),
        }
    }

    // == Read Many ==
    /// Reads several keys in one critical section.
    ///
    /// Keys without a live entry are left out of the result.
    pub fn read_many<I>(&self, keys: I) -> Result<HashMap<String, V>>
    where
        I: IntoIterator,
        I::Item: CacheKey,
    {
        let _span = span("read_many");
        let keys: Vec<String> = keys
            .into_iter()
            .map(|key| key.normalize().into_owned())
            .collect();
        let now = Instant::now();

        self.with_table(|table| -> Result<HashMap<String, V>> {
            let mut found = HashMap::with_capacity(keys.len());
            for key in keys {
                if let Some(value) = self.read_locked(table, &key, now)? {
                    found.insert(key, value);
                }
            }
            Ok(found)
        })
    }

    // == Write ==
    /// Stores `value` under `key` and hands the value back.
    ///
    /// `ttl` overrides the store default. A value the encoder maps to "no value"
    /// leaves nothing stored and removes any previous entry for the key.
    pub fn write<K: CacheKey + ?Sized>(
        &self,
        key: &K,
        value: V,
        ttl: Option<Duration>,
    ) -> Result<V> {
        let _span = span("write");
        let key = key.normalize().into_owned();
        let encoded = self.encode_entry(&key, &value)?;

        self.with_table(|table| {
            self.put(table, key, encoded, ttl);
            if self.config.lru_active() {
                table.sweep(&self.config, Instant::now());
            }
        });
        Ok(value)
    }

    // == Write Many ==
    /// Stores every pair in one critical section, sweeping once at the end.
    ///
    /// Returns the pairs that were actually stored.
    pub fn write_many<I, K>(&self, pairs: I, ttl: Option<Duration>) -> Result<HashMap<String, V>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: CacheKey,
    {
        let _span = span("write_many");
        let mut prepared = Vec::new();
        for (key, value) in pairs {
            let key = key.normalize().into_owned();
            let encoded = self.encode_entry(&key, &value)?;
            prepared.push((key, value, encoded));
        }

        let written = self.with_table(|table| {
            let mut written = HashMap::with_capacity(prepared.len());
            for (key, value, encoded) in prepared {
                if self.put(table, key.clone(), encoded, ttl) {
                    written.insert(key, value);
                } else {
                    written.remove(&key);
                }
            }
            if self.config.lru_active() {
                table.sweep(&self.config, Instant::now());
            }
            written
        });
        Ok(written)
    }

    // == Fetch ==
    /// Returns the value under `key`, computing and storing it on a miss.
    ///
    /// `block` runs outside the critical section. Fails with
    /// [`CacheError::Argument`] before touching the table if `expiry` sets both
    /// a duration and a time.
    pub fn fetch<K, F>(&self, key: &K, expiry: Expiry, block: F) -> Result<V>
    where
        K: CacheKey + ?Sized,
        F: FnOnce() -> V,
    {
        self.try_fetch(key, expiry, || Ok(block()))
    }

    /// Like [`fetch`](Self::fetch), with a fallible block whose error is
    /// returned without writing anything.
    pub fn try_fetch<K, F, Err>(
        &self,
        key: &K,
        expiry: Expiry,
        block: F,
    ) -> std::result::Result<V, Err>
    where
        K: CacheKey + ?Sized,
        F: FnOnce() -> std::result::Result<V, Err>,
        Err: From<CacheError>,
    {
        let _span = span("fetch");
        expiry.validate()?;

        if let Some(value) = self.read(key)? {
            return Ok(value);
        }
        let value = block()?;
        let ttl = expiry.ttl()?;
        Ok(self.write(key, value, ttl)?)
    }

    // == Delete ==
    /// Removes the entry under `key` and returns its value, expired or not.
    pub fn delete<K: CacheKey + ?Sized>(&self, key: &K) -> Result<Option<V>> {
        let _span = span("delete");
        let key = key.normalize();
        self.with_table(|table| match table.remove(&key) {
            Some(entry) => self.encoder.decode(&entry.encoded).map(Some),
            None => Ok(None),
        })
    }

    // == Clear ==
    /// Removes every entry.
    pub fn clear(&self) {
        let _span = span("clear");
        self.with_table(Table::clear);
    }

    // == Contains ==
    /// Checks for a live entry without changing recency order.
    pub fn contains<K: CacheKey + ?Sized>(&self, key: &K) -> bool {
        let key = key.normalize();
        let now = Instant::now();
        self.with_table(|table| table.live(&key, now))
    }

    // == Cleanup Expired ==
    /// Removes all expired entries.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup_expired(&self) -> usize {
        let _span = span("cleanup");
        let now = Instant::now();
        self.with_table(|table| table.expire(now))
    }

    // == Size ==
    /// Number of entries in the table, including expired ones not yet swept.
    pub fn size(&self) -> usize {
        self.with_table(|table| table.entries.len())
    }

    pub fn is_empty(&self) -> bool {
        self.size() == 0
    }

    /// Accounted bytes of all entries; always 0 without a size limit.
    pub fn current_size_bytes(&self) -> usize {
        self.with_table(|table| table.total_bytes)
    }

    // == Stats ==
    /// Returns a snapshot of the raw counters.
    pub fn stats(&self) -> CacheStats {
        self.with_table(|table| CacheStats {
            total_entries: table.entries.len(),
            total_bytes: table.total_bytes,
            ..table.stats.clone()
        })
    }

    pub fn config(&self) -> &StoreConfig {
        &self.config
    }
}

impl<V, E: Encoder<V>, G: Guard> fmt::Debug for Store<V, E, G> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store")
            .field("config", &self.config)
            .field("size", &self.size())
            .finish_non_exhaustive()
    }
}

// == Store Builder ==
/// Configures and validates a [`Store`].
pub struct StoreBuilder<V, E, G = Concurrent> {
    encoder: E,
    config: StoreConfig,
    _marker: PhantomData<fn() -> (V, G)>,
}

impl<V, E: Encoder<V>> StoreBuilder<V, E, Concurrent> {
    pub fn new(encoder: E) -> Self {
        Self {
            encoder,
            config: StoreConfig::default(),
            _marker: PhantomData,
        }
    }
}

impl<V, E: Encoder<V>, G: Guard> StoreBuilder<V, E, G> {
    /// TTL applied to writes that do not specify one.
    pub fn default_ttl(mut self, ttl: Duration) -> Self {
        self.config.default_ttl = Some(ttl);
        self
    }

    /// Caps the number of entries.
    pub fn max_entries(mut self, max_entries: usize) -> Self {
        self.config.max_entries = Some(max_entries);
        self
    }

    /// Caps the total of key and encoded value bytes.
    pub fn max_size_bytes(mut self, max_size_bytes: usize) -> Self {
        self.config.max_size_bytes = Some(max_size_bytes);
        self
    }

    /// Replaces every setting at once.
    pub fn config(mut self, config: StoreConfig) -> Self {
        self.config = config;
        self
    }

    /// Builds a store without locking, usable from one thread only.
    pub fn single_threaded(self) -> StoreBuilder<V, E, SingleThreaded> {
        self.with_guard()
    }

    /// Builds a mutex-guarded store that can be shared across threads.
    pub fn concurrent(self) -> StoreBuilder<V, E, Concurrent> {
        self.with_guard()
    }

    fn with_guard<H: Guard>(self) -> StoreBuilder<V, E, H> {
        StoreBuilder {
            encoder: self.encoder,
            config: self.config,
            _marker: PhantomData,
        }
    }

    // == Build ==
    /// Validates the configuration and creates the store.
    ///
    /// Fails with [`CacheError::Configuration`] on a zero limit, or when a
    /// size limit is set and the encoder's output does not report a byte length.
    pub fn build(self) -> Result<Store<V, E, G>> {
        if self.config.max_entries == Some(0) {
            return Err(CacheError::Configuration(
                "max_entries must be positive".to_string(),
            ));
        }
        if let Some(max_size) = self.config.max_size_bytes {
            if max_size == 0 {
                return Err(CacheError::Configuration(
                    "max_size_bytes must be positive".to_string(),
                ));
            }
            let measurable = self
                .encoder
                .probe()
                .is_some_and(|probe| self.encoder.byte_len(&probe).is_some());
            if !measurable {
                return Err(CacheError::Configuration(
                    "size limit requires an encoder whose output reports a byte length"
                        .to_string(),
                ));
            }
        }

        Ok(Store::from_parts(self.encoder, self.config))
    }
}

// == Unit Tests ==
#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{CloneEncoder, JsonEncoder, Utf8Encoder};
    use chrono::{TimeDelta, Utc};
    use std::sync::Arc;
    use std::thread::{self, sleep};

    fn string_store() -> Store<String, Utf8Encoder> {
        Store::new(Utf8Encoder)
    }

    fn lru_store(max_entries: usize) -> Store<String, Utf8Encoder> {
        Store::builder(Utf8Encoder)
            .max_entries(max_entries)
            .build()
            .unwrap()
    }

    fn write(store: &Store<String, Utf8Encoder>, key: &str, value: &str) {
        store.write(key, value.to_string(), None).unwrap();
    }

    fn read(store: &Store<String, Utf8Encoder>, key: &str) -> Option<String> {
        store.read(key).unwrap()
    }

    #[test]
    fn test_store_new() {
        let store = string_store();
        assert_eq!(store.size(), 0);
        assert!(store.is_empty());
        assert!(!store.config().lru_active());
    }

    #[test]
    fn test_store_write_and_read() {
        let store = string_store();

        let returned = store.write("key1", "value1".to_string(), None).unwrap();
        assert_eq!(returned, "value1");
        assert_eq!(read(&store, "key1").as_deref(), Some("value1"));
        assert_eq!(store.size(), 1);
    }

    #[test]
    fn test_store_read_missing() {
        let store = string_store();
        assert_eq!(read(&store, "nonexistent"), None);
    }

    #[test]
    fn test_store_overwrite() {
        let store = string_store();

        write(&store, "key1", "value1");
        write(&store, "key1", "value2");

        assert_eq!(read(&store, "key1").as_deref(), Some("value2"));
        assert_eq!(store.size(), 1);
    }

    #[test]
    fn test_store_key_coercion() {
        let store = string_store();

        store.write(&123_u32, "number".to_string(), None).unwrap();
        assert_eq!(read(&store, "123").as_deref(), Some("number"));

        write(&store, "7", "seven");
        assert_eq!(store.read(&7_i64).unwrap().as_deref(), Some("seven"));
        assert_eq!(store.size(), 2);
    }

    #[test]
    fn test_store_ttl_expiration() {
        let store = string_store();

        store
            .write("key1", "value1".to_string(), Some(Duration::from_millis(50)))
            .unwrap();
        assert_eq!(read(&store, "key1").as_deref(), Some("value1"));

        sleep(Duration::from_millis(80));

        assert_eq!(store.size(), 1);
        assert_eq!(read(&store, "key1"), None);
        assert_eq!(store.size(), 0);
        assert_eq!(store.stats().expirations, 1);
    }

    #[test]
    fn test_store_default_ttl() {
        let store = Store::builder(Utf8Encoder)
            .default_ttl(Duration::from_millis(50))
            .build()
            .unwrap();

        write(&store, "short", "lived");
        store
            .write("long", "lived".to_string(), Some(Duration::from_secs(60)))
            .unwrap();

        sleep(Duration::from_millis(80));

        assert_eq!(read(&store, "short"), None);
        assert_eq!(read(&store, "long").as_deref(), Some("lived"));
    }

    #[test]
    fn test_store_delete() {
        let store = string_store();

        write(&store, "key1", "value1");
        assert_eq!(store.delete("key1").unwrap().as_deref(), Some("value1"));
        assert!(store.is_empty());
        assert_eq!(store.delete("key1").unwrap(), None);
    }

    #[test]
    fn test_store_delete_returns_expired_value() {
        let store = string_store();

        store
            .write("stale", "old".to_string(), Some(Duration::ZERO))
            .unwrap();
        assert_eq!(store.delete("stale").unwrap().as_deref(), Some("old"));
    }

    #[test]
    fn test_store_clear() {
        let store = Store::builder(Utf8Encoder)
            .max_size_bytes(1024)
            .build()
            .unwrap();

        write(&store, "a", "1");
        write(&store, "b", "2");
        assert!(store.current_size_bytes() > 0);

        store.clear();

        assert!(store.is_empty());
        assert_eq!(store.current_size_bytes(), 0);
        assert_eq!(read(&store, "a"), None);
    }

    #[test]
    fn test_store_lru_eviction() {
        let store = lru_store(3);

        write(&store, "key1", "value1");
        write(&store, "key2", "value2");
        write(&store, "key3", "value3");
        write(&store, "key4", "value4");

        assert_eq!(store.size(), 3);
        assert_eq!(read(&store, "key1"), None);
        assert!(read(&store, "key2").is_some());
        assert!(read(&store, "key3").is_some());
        assert!(read(&store, "key4").is_some());
        assert_eq!(store.stats().evictions, 1);
    }

    #[test]
    fn test_store_lru_touch_on_read() {
        let store = lru_store(3);

        write(&store, "key1", "value1");
        write(&store, "key2", "value2");
        write(&store, "key3", "value3");
        read(&store, "key1");
        write(&store, "key4", "value4");

        assert!(read(&store, "key1").is_some());
        assert_eq!(read(&store, "key2"), None);
    }

    #[test]
    fn test_store_overwrite_refreshes_recency() {
        let store = lru_store(2);

        write(&store, "a", "1");
        write(&store, "b", "2");
        write(&store, "a", "3");
        write(&store, "c", "4");

        assert_eq!(read(&store, "a").as_deref(), Some("3"));
        assert_eq!(read(&store, "b"), None);
    }

    #[test]
    fn test_store_end_to_end_example() {
        let store = lru_store(2);

        write(&store, "k1", "v1");
        write(&store, "k2", "v2");
        read(&store, "k1");
        write(&store, "k3", "v3");

        assert_eq!(store.size(), 2);
        assert_eq!(read(&store, "k1").as_deref(), Some("v1"));
        assert_eq!(read(&store, "k3").as_deref(), Some("v3"));
        assert_eq!(read(&store, "k2"), None);
    }

    #[test]
    fn test_store_size_accounting() {
        let store = Store::builder(Utf8Encoder)
            .max_size_bytes(20)
            .build()
            .unwrap();

        write(&store, "ab", "1234");
        assert_eq!(store.current_size_bytes(), 6);

        write(&store, "ab", "12");
        assert_eq!(store.current_size_bytes(), 4);

        write(&store, "cd", "123456");
        assert_eq!(store.current_size_bytes(), 12);

        store.delete("ab").unwrap();
        assert_eq!(store.current_size_bytes(), 8);
    }

    #[test]
    fn test_store_evicts_by_size() {
        let store = Store::builder(Utf8Encoder)
            .max_size_bytes(10)
            .build()
            .unwrap();

        write(&store, "a", "1234");
        write(&store, "b", "1234");
        write(&store, "c", "1234");

        assert_eq!(read(&store, "a"), None);
        assert!(store.current_size_bytes() <= 10);
        assert_eq!(store.current_size_bytes(), 10);
        assert_eq!(store.size(), 2);
    }

    #[test]
    fn test_store_oversized_value_is_evicted_immediately() {
        let store = Store::builder(Utf8Encoder)
            .max_size_bytes(4)
            .build()
            .unwrap();

        write(&store, "big", "too large");

        assert!(store.is_empty());
        assert_eq!(store.current_size_bytes(), 0);
    }

    #[test]
    fn test_store_expire_before_evict() {
        let store = lru_store(2);

        write(&store, "live", "1");
        store
            .write("doomed", "2".to_string(), Some(Duration::from_millis(30)))
            .unwrap();

        sleep(Duration::from_millis(50));
        write(&store, "fresh", "3");

        assert_eq!(read(&store, "live").as_deref(), Some("1"));
        assert_eq!(read(&store, "fresh").as_deref(), Some("3"));
        let stats = store.stats();
        assert_eq!(stats.evictions, 0);
        assert_eq!(stats.expirations, 1);
    }

    #[test]
    fn test_store_expire_before_evict_by_size() {
        // Each entry accounts 1 key byte + 2 value bytes
        let store = Store::builder(Utf8Encoder)
            .max_size_bytes(6)
            .build()
            .unwrap();

        write(&store, "a", "11");
        store
            .write("b", "22".to_string(), Some(Duration::from_millis(30)))
            .unwrap();
        assert_eq!(store.current_size_bytes(), 6);

        sleep(Duration::from_millis(50));
        write(&store, "c", "33");

        assert_eq!(store.current_size_bytes(), 6);
        assert_eq!(read(&store, "a").as_deref(), Some("11"));
        assert_eq!(read(&store, "c").as_deref(), Some("33"));
        let stats = store.stats();
        assert_eq!(stats.evictions, 0);
        assert_eq!(stats.expirations, 1);
    }

    #[test]
    fn test_store_unrepresentable_ttl_never_expires() {
        let store = lru_store(4);

        write(&store, "keep", "old");
        store
            .write("keep", "new".to_string(), Some(Duration::from_secs(u64::MAX)))
            .unwrap();

        assert_eq!(read(&store, "keep").as_deref(), Some("new"));
        assert_eq!(store.cleanup_expired(), 0);
        assert_eq!(store.size(), 1);
    }

    #[test]
    fn test_store_unrepresentable_default_ttl() {
        let store = Store::builder(Utf8Encoder)
            .default_ttl(Duration::MAX)
            .max_entries(2)
            .build()
            .unwrap();

        write(&store, "k", "v");
        assert_eq!(read(&store, "k").as_deref(), Some("v"));
    }

    #[test]
    fn test_store_no_value_suppresses_write() {
        let store = Store::<Option<String>, _>::new(JsonEncoder::new());

        store.write("k", Some("v".to_string()), None).unwrap();
        let returned = store.write("k", None, None).unwrap();

        assert_eq!(returned, None);
        assert_eq!(store.read("k").unwrap(), None);
        assert_eq!(store.size(), 0);
    }

    #[test]
    fn test_store_falsy_values_are_stored() {
        let store = Store::<serde_json::Value, _>::new(JsonEncoder::new());

        store.write("zero", serde_json::json!(0), None).unwrap();
        store.write("false", serde_json::json!(false), None).unwrap();

        assert_eq!(store.read("zero").unwrap(), Some(serde_json::json!(0)));
        assert_eq!(store.read("false").unwrap(), Some(serde_json::json!(false)));
    }

    #[test]
    fn test_store_read_many() {
        let store = string_store();

        write(&store, "a", "1");
        write(&store, "b", "2");
        store
            .write("gone", "3".to_string(), Some(Duration::ZERO))
            .unwrap();

        let found = store.read_many(["a", "b", "gone", "missing"]).unwrap();

        assert_eq!(found.len(), 2);
        assert_eq!(found["a"], "1");
        assert_eq!(found["b"], "2");
        assert_eq!(store.size(), 2);
    }

    #[test]
    fn test_store_write_many_sweeps_once() {
        let store = lru_store(2);

        // A sweep per pair would evict "a" and then "b"
        let written = store
            .write_many(
                vec![
                    ("a", "1".to_string()),
                    ("b", "2".to_string()),
                    ("c", "3".to_string()),
                    ("a", "4".to_string()),
                ],
                None,
            )
            .unwrap();

        assert_eq!(written.len(), 3);
        assert_eq!(written["a"], "4");
        assert_eq!(store.stats().evictions, 1);
        assert_eq!(store.size(), 2);
        assert_eq!(read(&store, "b"), None);
        assert_eq!(read(&store, "c").as_deref(), Some("3"));
        assert_eq!(read(&store, "a").as_deref(), Some("4"));
    }

    #[test]
    fn test_store_write_many_skips_no_value() {
        let store = Store::<Option<u32>, _>::new(JsonEncoder::new());

        let written = store
            .write_many(vec![("one", Some(1)), ("none", None)], None)
            .unwrap();

        assert_eq!(written.len(), 1);
        assert_eq!(written["one"], Some(1));
        assert!(!store.contains("none"));
    }

    #[test]
    fn test_store_fetch_computes_on_miss() {
        let store = string_store();
        let mut calls = 0;

        let value = store
            .fetch("k", Expiry::new(), || {
                calls += 1;
                "computed".to_string()
            })
            .unwrap();
        assert_eq!(value, "computed");

        let value = store
            .fetch("k", Expiry::new(), || {
                calls += 1;
                "again".to_string()
            })
            .unwrap();
        assert_eq!(value, "computed");
        assert_eq!(calls, 1);
    }

    #[test]
    fn test_store_fetch_rejects_both_expiry_forms() {
        let store = string_store();
        let expiry = Expiry::new()
            .expires_in(Duration::from_secs(1))
            .expires_at(Utc::now() + TimeDelta::seconds(1));

        let result = store.fetch("k", expiry, || "never".to_string());

        assert!(matches!(result, Err(CacheError::Argument(_))));
        assert!(store.is_empty());
    }

    #[test]
    fn test_store_fetch_with_absolute_expiry() {
        let store = string_store();
        let expiry = Expiry::new().expires_at(Utc::now() - TimeDelta::seconds(1));

        let value = store.fetch("k", expiry, || "v".to_string()).unwrap();

        assert_eq!(value, "v");
        assert_eq!(read(&store, "k"), None);
    }

    #[derive(Debug)]
    enum LoadError {
        Cache(CacheError),
        Unavailable,
    }

    impl From<CacheError> for LoadError {
        fn from(err: CacheError) -> Self {
            LoadError::Cache(err)
        }
    }

    #[test]
    fn test_store_try_fetch_propagates_error() {
        let store = string_store();

        let result = store.try_fetch("k", Expiry::new(), || Err(LoadError::Unavailable));
        assert!(matches!(result, Err(LoadError::Unavailable)));
        assert!(!store.contains("k"));

        let expiry = Expiry::new()
            .expires_in(Duration::from_secs(1))
            .expires_at(Utc::now());
        let result = store.try_fetch("k", expiry, || Ok::<_, LoadError>("v".to_string()));
        assert!(matches!(result, Err(LoadError::Cache(CacheError::Argument(_)))));
    }

    #[test]
    fn test_store_contains_does_not_promote() {
        let store = lru_store(2);

        write(&store, "a", "1");
        write(&store, "b", "2");
        assert!(store.contains("a"));
        write(&store, "c", "3");

        assert!(!store.contains("a"));
        assert!(store.contains("b"));
    }

    #[test]
    fn test_store_cleanup_expired() {
        let store = string_store();

        store
            .write("key1", "value1".to_string(), Some(Duration::from_millis(30)))
            .unwrap();
        store
            .write("key2", "value2".to_string(), Some(Duration::from_secs(10)))
            .unwrap();

        sleep(Duration::from_millis(50));

        assert_eq!(store.cleanup_expired(), 1);
        assert_eq!(store.size(), 1);
        assert!(read(&store, "key2").is_some());
    }

    #[test]
    fn test_store_stats() {
        let store = string_store();

        write(&store, "key1", "value1");
        read(&store, "key1");
        read(&store, "nonexistent");

        let stats = store.stats();
        assert_eq!(stats.hits, 1);
        assert_eq!(stats.misses, 1);
        assert_eq!(stats.total_entries, 1);
        assert_eq!(stats.total_bytes, 0);
    }

    #[test]
    fn test_builder_rejects_unmeasurable_encoder() {
        let result = Store::builder(CloneEncoder::<String>::new())
            .max_size_bytes(100)
            .build();
        assert!(matches!(result, Err(CacheError::Configuration(_))));

        let unbounded = Store::builder(CloneEncoder::<String>::new())
            .max_entries(10)
            .build();
        assert!(unbounded.is_ok());
    }

    #[test]
    fn test_builder_rejects_zero_limits() {
        let zero_entries = Store::builder(Utf8Encoder).max_entries(0).build();
        assert!(matches!(zero_entries, Err(CacheError::Configuration(_))));

        let zero_bytes = Store::builder(Utf8Encoder).max_size_bytes(0).build();
        assert!(matches!(zero_bytes, Err(CacheError::Configuration(_))));
    }

    #[test]
    fn test_clone_encoder_isolates_reads() {
        let store = Store::new(CloneEncoder::<Vec<u32>>::new());

        store.write("list", vec![1, 2], None).unwrap();
        let mut first = store.read("list").unwrap().unwrap();
        first.push(3);

        assert_eq!(store.read("list").unwrap(), Some(vec![1, 2]));
    }

    #[test]
    fn test_single_threaded_store() {
        let store = Store::builder(Utf8Encoder)
            .max_entries(1)
            .single_threaded()
            .build()
            .unwrap();

        store.write("a", "1".to_string(), None).unwrap();
        store.write("b", "2".to_string(), None).unwrap();

        assert_eq!(store.read("a").unwrap(), None);
        assert_eq!(store.read("b").unwrap().as_deref(), Some("2"));
    }

    #[test]
    fn test_single_threaded_fetch_block_may_use_store() {
        let store = Store::builder(Utf8Encoder).single_threaded().build().unwrap();

        let value = store
            .fetch("outer", Expiry::new(), || {
                store.write("inner", "side".to_string(), None).unwrap();
                "main".to_string()
            })
            .unwrap();

        assert_eq!(value, "main");
        assert_eq!(store.read("inner").unwrap().as_deref(), Some("side"));
    }

    #[test]
    fn test_concurrent_writers_respect_limit() {
        let store = Arc::new(lru_store(50));

        let handles: Vec<_> = (0..4)
            .map(|t| {
                let store = Arc::clone(&store);
                thread::spawn(move || {
                    for i in 0..100 {
                        let key = format!("t{}-{}", t, i);
                        store.write(&key, key.clone(), None).unwrap();
                        assert!(store.size() <= 50);
                    }
                })
            })
            .collect();

        for handle in handles {
            handle.join().unwrap();
        }

        assert_eq!(store.size(), 50);
    }
}
