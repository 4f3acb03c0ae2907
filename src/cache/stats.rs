//! Cache Statistics Module
//!
//! Hit/miss/eviction counters and the introspection snapshot returned by
//! `CacheStore::stats`.

use serde::Serialize;

use crate::persistence::BackendKind;

// == Cache Counters ==
/// Monotonic performance counters kept by a store.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
pub struct CacheCounters {
    /// Number of reads that returned a value
    pub hits: u64,
    /// Number of reads that found nothing or an expired entry
    pub misses: u64,
    /// Number of entries removed to stay within capacity
    pub evictions: u64,
}

impl CacheCounters {
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
}

// == Entry Stats ==
/// Per-entry view inside a stats snapshot.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct EntryStats {
    pub key: String,
    pub age_ms: u64,
    pub ttl_ms: u64,
}

// == Cache Stats ==
/// Point-in-time snapshot of a store. Entries are listed oldest first.
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct CacheStats {
    pub namespace: String,
    pub backend: BackendKind,
    pub size: usize,
    pub max_size: usize,
    /// Default TTL applied when `set` gets none
    pub ttl_ms: u64,
    pub hits: u64,
    pub misses: u64,
    pub evictions: u64,
    pub entries: Vec<EntryStats>,
}

impl CacheStats {
    // == Hit Rate ==
    /// Calculates the cache hit rate.
    ///
    /// Returns hits / (hits + misses), or 0.0 if no reads have been made.
    pub fn hit_rate(&self) -> f64 {
        let total = self.hits + self.misses;
        if total == 0 {
            0.0
        } else {
            self.hits as f64 / total as f64
        }
    }
}
