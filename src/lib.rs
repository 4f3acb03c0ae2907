//! Query Cache - A client-side cache for read-mostly data
//!
//! Provides TTL expiry, FIFO eviction, pluggable persistence, pattern
//! invalidation and memoization of async fetch functions.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;
pub mod named;
pub mod persistence;
pub mod tasks;

pub use api::AppState;
pub use cache::{invalidate_cache, with_cache, with_cache_keyed, CacheStore, KeyPattern, SharedStore};
pub use config::{Config, StoreConfig};
pub use error::{CacheError, Result};
pub use named::NamedCaches;
pub use persistence::{BackendKind, Backends};
pub use tasks::{spawn_cleanup_task, Preloader};
