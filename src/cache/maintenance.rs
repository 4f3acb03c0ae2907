//! Maintenance Module
//!
//! Type-erased view of a store, so stores holding different value types can
//! be inspected and pruned through one handle type.

use std::sync::Arc;

use tokio::sync::RwLock;

use crate::cache::{CacheStats, CacheStore, CacheValue};

/// Operations that do not need to know a store's value type.
pub trait CacheMaintenance: Send + Sync {
    fn namespace(&self) -> &str;

    fn stats(&self) -> CacheStats;

    /// Removes expired entries, returning how many went.
    fn cleanup(&mut self) -> usize;

    fn clear(&mut self);

    /// Removes `key`, returning whether it was present.
    fn delete(&mut self, key: &str) -> bool;
}

/// A type-erased store shared between tasks.
pub type SharedMaintenance = Arc<RwLock<dyn CacheMaintenance>>;

impl<T: CacheValue> CacheMaintenance for CacheStore<T> {
    fn namespace(&self) -> &str {
        CacheStore::namespace(self)
    }

    fn stats(&self) -> CacheStats {
        CacheStore::stats(self)
    }

    fn cleanup(&mut self) -> usize {
        CacheStore::cleanup(self)
    }

    fn clear(&mut self) {
        CacheStore::clear(self)
    }

    fn delete(&mut self, key: &str) -> bool {
        CacheStore::delete(self, key)
    }
}
