//! Cache Store Module
//!
//! Main cache engine combining HashMap storage with insertion-order tracking,
//! TTL expiration and write-through persistence.

use std::collections::HashMap;

use tracing::{debug, info};

use crate::cache::entry::current_timestamp_ms;
use crate::cache::{CacheCounters, CacheEntry, CacheStats, CacheValue, EntryStats, InsertionOrder};
use crate::config::StoreConfig;
use crate::error::{CacheError, Result};
use crate::persistence::{Backends, Persistence};

// == Cache Store ==
/// Bounded cache with FIFO eviction and per-entry TTL.
///
/// Every mutation is mirrored to the store's persistence backend, if any.
#[derive(Debug)]
pub struct CacheStore<T> {
    /// Key-value storage
    entries: HashMap<String, CacheEntry<T>>,
    /// First-insertion order, drives eviction
    order: InsertionOrder,
    /// Hit/miss/eviction counters
    counters: CacheCounters,
    /// Maximum number of entries allowed
    max_size: usize,
    /// Default TTL in milliseconds for entries without explicit TTL
    ttl_ms: u64,
    persistence: Persistence,
}

impl<T: CacheValue> CacheStore<T> {
    // == Constructor ==
    /// Creates a store and restores whatever its backend holds.
    ///
    /// Restored entries that expired in the meantime are dropped right away.
    ///
    /// # Errors
    /// - `InvalidConfig` if `max_size` is zero
    /// - `NamespaceInUse` if another live store persists under the same namespace
    pub fn new(config: &StoreConfig, backends: &Backends) -> Result<Self> {
        if config.max_size == 0 {
            return Err(CacheError::InvalidConfig(format!(
                "cache '{}' needs a max_size of at least 1",
                config.namespace
            )));
        }

        let persistence = backends.attach(config.backend, &config.namespace)?;
        let mut store = Self {
            entries: HashMap::new(),
            order: InsertionOrder::new(),
            counters: CacheCounters::new(),
            max_size: config.max_size,
            ttl_ms: config.ttl_ms,
            persistence,
        };
        store.restore();
        Ok(store)
    }

    /// Creates a memory-only store.
    pub fn in_memory(ttl_ms: u64, max_size: usize) -> Result<Self> {
        Self::new(
            &StoreConfig::memory("memory", ttl_ms, max_size),
            &Backends::detached(),
        )
    }

    fn restore(&mut self) {
        let records = self.persistence.load::<T>();
        if records.is_empty() {
            return;
        }

        // Expired records never compete with live ones for capacity
        let loaded = records.len();
        let now = current_timestamp_ms();
        let mut evicted = 0;
        for (key, entry) in records {
            if entry.is_expired_at(now) {
                continue;
            }
            if self.insert_entry(key, entry).is_some() {
                evicted += 1;
            }
        }
        let expired = self.cleanup();
        if expired == 0 && self.entries.len() < loaded {
            // Shrunk without a cleanup write-back
            self.persist();
        }

        info!(
            "Restored {} of {} entries for '{}' ({} evicted to fit)",
            self.entries.len(),
            loaded,
            self.persistence.namespace(),
            evicted
        );
    }

    // == Set ==
    /// Stores a value, resetting its creation time.
    ///
    /// A new key arriving at capacity evicts the earliest inserted entry,
    /// expired or not. Overwriting keeps the key's original position.
    ///
    /// # Arguments
    /// * `key` - The key to store
    /// * `value` - The value to store
    /// * `ttl_ms` - Optional TTL in milliseconds (uses the store default if None)
    pub fn set(&mut self, key: impl Into<String>, value: T, ttl_ms: Option<u64>) {
        let entry = CacheEntry::new(value, ttl_ms.unwrap_or(self.ttl_ms));
        if self.insert_entry(key.into(), entry).is_some() {
            self.counters.record_eviction();
        }
        self.persist();
    }

    /// Inserts without persisting. Returns the key evicted to make room.
    fn insert_entry(&mut self, key: String, entry: CacheEntry<T>) -> Option<String> {
        let mut evicted = None;
        if !self.entries.contains_key(&key) {
            if self.entries.len() >= self.max_size {
                evicted = self.order.pop_oldest();
                if let Some(oldest) = &evicted {
                    self.entries.remove(oldest);
                    debug!("Evicted '{}' from '{}'", oldest, self.persistence.namespace());
                }
            }
            self.order.push(&key);
        }
        self.entries.insert(key, entry);
        evicted
    }

    // == Get ==
    /// Retrieves a value by key.
    ///
    /// Expired entries are removed on the spot and reported as absent.
    pub fn get(&mut self, key: &str) -> Option<T> {
        let expired = match self.entries.get(key) {
            Some(entry) => entry.is_expired(),
            None => {
                self.counters.record_miss();
                return None;
            }
        };

        if expired {
            self.remove_entry(key);
            self.counters.record_miss();
            debug!("Expired '{}' in '{}'", key, self.persistence.namespace());
            self.persist();
            return None;
        }

        self.counters.record_hit();
        self.entries.get(key).map(|entry| entry.data.clone())
    }

    // == Has ==
    /// Same as `get(key).is_some()`, including its expiry side effect.
    pub fn has(&mut self, key: &str) -> bool {
        self.get(key).is_some()
    }

    // == Delete ==
    /// Removes an entry by key. Returns whether anything was removed.
    pub fn delete(&mut self, key: &str) -> bool {
        let removed = self.remove_entry(key);
        if removed {
            self.persist();
        }
        removed
    }

    fn remove_entry(&mut self, key: &str) -> bool {
        if self.entries.remove(key).is_some() {
            self.order.remove(key);
            true
        } else {
            false
        }
    }

    // == Clear ==
    /// Removes every entry.
    pub fn clear(&mut self) {
        self.entries.clear();
        self.order.clear();
        self.persist();
    }

    // == Cleanup ==
    /// Removes all expired entries, persisting once if any went.
    ///
    /// Returns the number of entries removed.
    pub fn cleanup(&mut self) -> usize {
        let now = current_timestamp_ms();
        let expired: Vec<String> = self
            .order
            .iter()
            .filter(|key| {
                self.entries
                    .get(*key)
                    .is_some_and(|entry| entry.is_expired_at(now))
            })
            .map(str::to_string)
            .collect();

        for key in &expired {
            self.remove_entry(key);
        }

        if !expired.is_empty() {
            self.persist();
        }
        expired.len()
    }

    // == Stats ==
    /// Returns a snapshot of the store. Has no side effects.
    pub fn stats(&self) -> CacheStats {
        let now = current_timestamp_ms();
        let entries = self
            .order
            .iter()
            .filter_map(|key| {
                self.entries.get(key).map(|entry| EntryStats {
                    key: key.to_string(),
                    age_ms: entry.age_ms_at(now),
                    ttl_ms: entry.ttl_ms,
                })
            })
            .collect();

        CacheStats {
            namespace: self.persistence.namespace().to_string(),
            backend: self.persistence.kind(),
            size: self.entries.len(),
            max_size: self.max_size,
            ttl_ms: self.ttl_ms,
            hits: self.counters.hits,
            misses: self.counters.misses,
            evictions: self.counters.evictions,
            entries,
        }
    }

    fn persist(&self) {
        if !self.persistence.is_attached() {
            return;
        }

        let records: Vec<(&str, &CacheEntry<T>)> = self
            .order
            .iter()
            .filter_map(|key| self.entries.get(key).map(|entry| (key, entry)))
            .collect();
        self.persistence.save(&records);
    }
}

impl<T> CacheStore<T> {
    /// Keys in insertion order, oldest first. Expired entries included.
    pub fn keys(&self) -> Vec<String> {
        self.order.iter().map(str::to_string).collect()
    }

    pub fn namespace(&self) -> &str {
        self.persistence.namespace()
    }

    pub fn max_size(&self) -> usize {
        self.max_size
    }

    pub fn ttl_ms(&self) -> u64 {
        self.ttl_ms
    }

    // == Length ==
    /// Returns the current number of entries, expired ones included.
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
