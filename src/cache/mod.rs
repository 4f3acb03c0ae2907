//! Cache Module
//!
//! Provides bounded caching with TTL expiration, FIFO eviction, pattern
//! invalidation and memoization of async producers.

mod entry;
mod fifo;
mod invalidate;
mod maintenance;
mod memoize;
mod stats;
mod store;


use std::sync::Arc;

use serde::{de::DeserializeOwned, Serialize};
use tokio::sync::RwLock;

// Re-export public types
pub use entry::{current_timestamp_ms, CacheEntry};
pub use fifo::InsertionOrder;
pub use invalidate::{invalidate_cache, KeyPattern};
pub use maintenance::{CacheMaintenance, SharedMaintenance};
pub use memoize::{with_cache, with_cache_keyed, CanonicalKey, KeyFn, Memoized, StructuralKey};
pub use stats::{CacheCounters, CacheStats, EntryStats};
pub use store::CacheStore;

// == Value Bound ==
/// What a store can hold: cloneable out of the cache, serializable into a
/// backend and shareable across tasks.
pub trait CacheValue: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {}

impl<T> CacheValue for T where T: Clone + Serialize + DeserializeOwned + Send + Sync + 'static {}

/// A store shared between tasks.
pub type SharedStore<T> = Arc<RwLock<CacheStore<T>>>;

/// Wraps a store for sharing.
pub fn shared<T>(store: CacheStore<T>) -> SharedStore<T> {
    Arc::new(RwLock::new(store))
}
