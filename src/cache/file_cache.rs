//! File Cache Module
//!
//! The public cache API: builds and validates keys, applies lazy expiration
//! on every read path and culls before every write.
//!
//! Reads degrade to a miss when the backing table is missing or a payload
//! cannot be decoded. Writes recreate the table first and propagate any
//! remaining failure, including lock timeouts.

use std::collections::{HashMap, HashSet};

use serde::{de::DeserializeOwned, Serialize};
use tracing::{info, warn};

use crate::cache::codec;
use crate::cache::cull::cull;
use crate::cache::entry::{expiry_for, is_live, now, reap_if_dead, Entry};
use crate::cache::keys::{make_key, validate_key};
use crate::cache::stats::{CacheStats, StatsRecorder};
use crate::cache::store::{Store, MEMORY_LOCATION};
use crate::config::{CacheConfig, Timeout};
use crate::error::{CacheError, ReadPath, Result};

// == File Cache ==
/// Persistent key-value cache stored in a single SQLite file.
///
/// Every operation is synchronous and blocking. Dead entries are removed
/// only when an operation encounters them; there is no background sweeper.
#[derive(Debug)]
pub struct FileCache {
    location: String,
    store: Store,
    config: CacheConfig,
    stats: StatsRecorder,
}

impl FileCache {
    // == Constructors ==
    /// Opens (creating if needed) a cache at `location`.
    ///
    /// `location` is a file path, or `:memory:` for a process-local cache.
    pub fn open(location: impl Into<String>, config: CacheConfig) -> Result<Self> {
        let location = location.into();
        let store = Store::open(&location, config.busy_timeout)?;
        store.ensure_schema()?;

        info!(
            "File cache ready at {} (max_entries={}, cull_frequency={})",
            location, config.max_entries, config.cull_frequency
        );

        Ok(Self {
            location,
            store,
            config,
            stats: StatsRecorder::default(),
        })
    }

    /// Opens a process-local cache that is never written to disk.
    pub fn in_memory(config: CacheConfig) -> Result<Self> {
        Self::open(MEMORY_LOCATION, config)
    }

    /// Location this cache was opened with.
    pub fn location(&self) -> &str {
        &self.location
    }

    /// Configuration this cache was opened with.
    pub fn config(&self) -> &CacheConfig {
        &self.config
    }

    fn build_key(&self, key: &str) -> Result<String> {
        let key = make_key(&self.config.key_prefix, self.config.version, key);
        validate_key(&key)?;
        Ok(key)
    }

    // == Get ==
    /// Returns the live value stored under `key`, if any.
    pub fn get<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let key = self.build_key(key)?;
        let value = self.load(&key).or_miss(None)?;

        if value.is_some() {
            self.stats.record_hit();
        } else {
            self.stats.record_miss();
        }
        Ok(value)
    }

    /// Returns the live value under `key`, or `default` on a miss.
    pub fn get_or<T: DeserializeOwned>(&self, key: &str, default: T) -> Result<T> {
        Ok(self.get(key)?.unwrap_or(default))
    }

    fn load<T: DeserializeOwned>(&self, key: &str) -> Result<Option<T>> {
        let Some(entry) = self.store.get_row(key)? else {
            return Ok(None);
        };
        if reap_if_dead(&self.store, key, entry.expires_at, now())? {
            return Ok(None);
        }
        self.decode_entry(&entry).map(Some)
    }

    fn decode_entry<T: DeserializeOwned>(&self, entry: &Entry) -> Result<T> {
        codec::decode(&entry.value).inspect_err(|err| {
            warn!("Unreadable cache entry {}: {}", entry.key, err);
        })
    }

    // == Set ==
    /// Stores `value` under `key`, replacing any existing entry.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T, timeout: Timeout) -> Result<()> {
        let key = self.build_key(key)?;
        let payload = codec::encode(value)?;

        self.store.ensure_schema()?;
        self.cull()?;

        let expires_at = expiry_for(timeout, self.config.default_timeout, now());
        self.store.upsert_row(&key, &payload, expires_at)
    }

    // == Add ==
    /// Stores `value` only if no live entry exists for `key`.
    ///
    /// Returns whether the value was stored. The existence check and the
    /// write are separate statements, so two processes racing on the same
    /// key may both succeed.
    pub fn add<T: Serialize + ?Sized>(&self, key: &str, value: &T, timeout: Timeout) -> Result<bool> {
        if self.has_key(key)? {
            return Ok(false);
        }
        self.set(key, value, timeout)?;
        Ok(true)
    }

    // == Touch ==
    /// Gives a live entry a new expiry without changing its value.
    pub fn touch(&self, key: &str, timeout: Timeout) -> Result<bool> {
        let key = self.build_key(key)?;
        self.touch_row(&key, timeout).or_miss(false)
    }

    fn touch_row(&self, key: &str, timeout: Timeout) -> Result<bool> {
        let Some(expires_at) = self.store.get_expiry(key)? else {
            return Ok(false);
        };
        let now = now();
        if reap_if_dead(&self.store, key, expires_at, now)? {
            return Ok(false);
        }
        let expires_at = expiry_for(timeout, self.config.default_timeout, now);
        self.store.update_expiry(key, expires_at)
    }

    // == Delete ==
    /// Deletes the entry under `key`.
    ///
    /// Returns whether the entry was live when deleted; removing an entry
    /// that had already expired reports `false`.
    pub fn delete(&self, key: &str) -> Result<bool> {
        let key = self.build_key(key)?;
        self.delete_row(&key).or_miss(false)
    }

    fn delete_row(&self, key: &str) -> Result<bool> {
        let Some(expires_at) = self.store.get_expiry(key)? else {
            return Ok(false);
        };
        self.store.delete_row(key)?;
        Ok(is_live(expires_at, now()))
    }

    // == Has Key ==
    /// Reports whether a live entry exists, deleting it if it has expired.
    pub fn has_key(&self, key: &str) -> Result<bool> {
        let key = self.build_key(key)?;
        self.check_live(&key).or_miss(false)
    }

    fn check_live(&self, key: &str) -> Result<bool> {
        let Some(expires_at) = self.store.get_expiry(key)? else {
            return Ok(false);
        };
        Ok(!reap_if_dead(&self.store, key, expires_at, now())?)
    }

    // == Clear ==
    /// Deletes every entry.
    pub fn clear(&self) -> Result<()> {
        self.store.delete_all().map(|_| ()).or_miss(())
    }

    // == Batch Operations ==
    /// Returns the live values for `keys`, keyed by the caller's keys.
    pub fn get_many<T, K>(&self, keys: &[K]) -> Result<HashMap<String, T>>
    where
        T: DeserializeOwned,
        K: AsRef<str>,
    {
        if keys.is_empty() {
            return Ok(HashMap::new());
        }

        let mut originals = HashMap::with_capacity(keys.len());
        for key in keys {
            let key = key.as_ref();
            originals.insert(self.build_key(key)?, key.to_string());
        }
        let built: Vec<String> = originals.keys().cloned().collect();

        let rows = self.store.get_rows(&built).or_miss(Vec::new())?;
        let now = now();
        let mut values = HashMap::with_capacity(rows.len());
        let mut dead = Vec::new();

        for entry in rows {
            if !entry.is_live(now) {
                dead.push(entry.key);
                continue;
            }
            if let (Some(original), Ok(value)) =
                (originals.get(&entry.key), self.decode_entry(&entry))
            {
                values.insert(original.clone(), value);
            }
        }

        if !dead.is_empty() {
            self.store.delete_rows(&dead).or_miss(0)?;
        }

        self.stats.record_hits(values.len());
        self.stats.record_misses(originals.len() - values.len());
        Ok(values)
    }

    /// Stores every item with the same timeout, culling once beforehand.
    ///
    /// Returns the keys that could not be stored, which is always empty
    /// when the call succeeds.
    pub fn set_many<K, V, I>(&self, items: I, timeout: Timeout) -> Result<Vec<String>>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Serialize,
    {
        let expires_at = expiry_for(timeout, self.config.default_timeout, now());
        let rows = items
            .into_iter()
            .map(|(key, value)| -> Result<Entry> {
                Ok(Entry {
                    key: self.build_key(key.as_ref())?,
                    value: codec::encode(&value)?,
                    expires_at,
                })
            })
            .collect::<Result<Vec<_>>>()?;

        if rows.is_empty() {
            return Ok(Vec::new());
        }

        self.store.ensure_schema()?;
        self.cull()?;
        self.store.upsert_rows(&rows)?;
        Ok(Vec::new())
    }

    /// Deletes every key, returning how many of them were live.
    pub fn delete_many<K: AsRef<str>>(&self, keys: &[K]) -> Result<usize> {
        if keys.is_empty() {
            return Ok(0);
        }

        let built = keys
            .iter()
            .map(|key| self.build_key(key.as_ref()))
            .collect::<Result<HashSet<_>>>()?
            .into_iter()
            .collect::<Vec<_>>();

        self.delete_rows(&built).or_miss(0)
    }

    fn delete_rows(&self, keys: &[String]) -> Result<usize> {
        let now = now();
        let live = self
            .store
            .get_rows(keys)?
            .iter()
            .filter(|entry| entry.is_live(now))
            .count();
        self.store.delete_rows(keys)?;
        Ok(live)
    }

    // == Get Or Set ==
    /// Returns the live value under `key`, or stores and returns `default()`.
    pub fn get_or_set<T, F>(&self, key: &str, default: F, timeout: Timeout) -> Result<T>
    where
        T: Serialize + DeserializeOwned,
        F: FnOnce() -> T,
    {
        if let Some(value) = self.get(key)? {
            return Ok(value);
        }

        let value = default();
        self.add(key, &value, timeout)?;
        // Another writer may have won the add; prefer what is stored now.
        Ok(self.get(key)?.unwrap_or(value))
    }

    // == Incr / Decr ==
    /// Adds `delta` to the integer stored under `key`, keeping its expiry.
    ///
    /// Writes the row in place without culling, since the key already exists.
    pub fn incr(&self, key: &str, delta: i64) -> Result<i64> {
        let built = self.build_key(key)?;
        let entry = match self.store.get_row(&built).or_miss(None)? {
            Some(entry) if !reap_if_dead(&self.store, &built, entry.expires_at, now())? => entry,
            _ => return Err(CacheError::NotFound(key.to_string())),
        };

        let current: i64 = codec::decode(&entry.value)
            .map_err(|_| CacheError::Validation(format!("Value for {} is not an integer", key)))?;
        let updated = current
            .checked_add(delta)
            .ok_or_else(|| CacheError::Validation(format!("Value for {} would overflow", key)))?;

        self.store
            .upsert_row(&built, &codec::encode(&updated)?, entry.expires_at)?;
        Ok(updated)
    }

    /// Subtracts `delta` from the integer stored under `key`.
    pub fn decr(&self, key: &str, delta: i64) -> Result<i64> {
        let delta = delta
            .checked_neg()
            .ok_or_else(|| CacheError::Validation(format!("Cannot negate {}", delta)))?;
        self.incr(key, delta)
    }

    // == Stats ==
    /// Returns hit/miss/cull counters and the current row count.
    pub fn stats(&self) -> Result<CacheStats> {
        let total = self.store.count().or_miss(0)?;
        Ok(self.stats.snapshot(total))
    }

    fn cull(&self) -> Result<()> {
        let outcome = cull(
            &self.store,
            self.config.max_entries,
            self.config.cull_frequency,
        )?;
        self.stats.record_culled(outcome.removed());
        Ok(())
    }
}
