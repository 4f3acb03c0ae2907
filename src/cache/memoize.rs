//! Memoization Module
//!
//! Wraps an async producer so repeated calls with equivalent arguments are
//! answered from a store.

use std::collections::BTreeMap;
use std::future::Future;

use serde::Serialize;
use serde_json::Value;
use tracing::{debug, warn};

use crate::cache::{CacheValue, SharedStore};

// == Key Derivation ==
/// Derives a cache key from call arguments.
///
/// `None` means no key could be derived; the call then bypasses the cache.
/// Any `Fn(&A) -> String` closure is a key function.
pub trait KeyFn<A: ?Sized> {
    fn key(&self, args: &A) -> Option<String>;
}

impl<A: ?Sized, F> KeyFn<A> for F
where
    F: Fn(&A) -> String,
{
    fn key(&self, args: &A) -> Option<String> {
        Some(self(args))
    }
}

/// Key = optional prefix + JSON serialization of the arguments as given.
///
/// Field order of maps follows their iteration order, so logically equal
/// arguments can produce different keys; see [`CanonicalKey`].
#[derive(Debug, Clone, Default)]
pub struct StructuralKey {
    prefix: String,
}

impl StructuralKey {
    pub fn prefixed(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl<A: Serialize + ?Sized> KeyFn<A> for StructuralKey {
    fn key(&self, args: &A) -> Option<String> {
        match serde_json::to_string(args) {
            Ok(json) => Some(format!("{}{}", self.prefix, json)),
            Err(e) => {
                warn!("Arguments not serializable into a cache key: {}", e);
                None
            }
        }
    }
}

/// Key = optional prefix + JSON with object keys sorted and null fields dropped.
#[derive(Debug, Clone, Default)]
pub struct CanonicalKey {
    prefix: String,
}

impl CanonicalKey {
    pub fn prefixed(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }
}

impl<A: Serialize + ?Sized> KeyFn<A> for CanonicalKey {
    fn key(&self, args: &A) -> Option<String> {
        match serde_json::to_value(args) {
            Ok(value) => Some(format!("{}{}", self.prefix, canonicalize(value))),
            Err(e) => {
                warn!("Arguments not serializable into a cache key: {}", e);
                None
            }
        }
    }
}

fn canonicalize(value: Value) -> Value {
    match value {
        Value::Object(map) => {
            let sorted: BTreeMap<String, Value> = map
                .into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, canonicalize(v)))
                .collect();
            Value::Object(sorted.into_iter().collect())
        }
        Value::Array(items) => Value::Array(items.into_iter().map(canonicalize).collect()),
        other => other,
    }
}

// == Memoized ==
/// A producer bound to a store and a key function.
///
/// There is no in-flight de-duplication: concurrent misses on one key each
/// run the producer, and the last to finish wins the slot.
#[derive(Debug, Clone)]
pub struct Memoized<T, F, K = StructuralKey> {
    producer: F,
    store: SharedStore<T>,
    key_fn: K,
}

/// Memoizes `producer` into `store`, keyed by the serialized arguments.
pub fn with_cache<T, F>(producer: F, store: SharedStore<T>) -> Memoized<T, F> {
    with_cache_keyed(producer, store, StructuralKey::default())
}

/// Memoizes `producer` into `store` with a caller-supplied key function.
pub fn with_cache_keyed<T, F, K>(producer: F, store: SharedStore<T>, key_fn: K) -> Memoized<T, F, K> {
    Memoized {
        producer,
        store,
        key_fn,
    }
}

impl<T: CacheValue, F, K> Memoized<T, F, K> {
    /// Returns the cached value for `args`, or runs the producer and caches
    /// its success. Producer errors pass through untouched and are never cached.
    pub async fn call<A, Fut, E>(&self, args: A) -> Result<T, E>
    where
        F: Fn(A) -> Fut,
        Fut: Future<Output = Result<T, E>>,
        K: KeyFn<A>,
    {
        let Some(key) = self.key_fn.key(&args) else {
            return (self.producer)(args).await;
        };

        // The lock is released before the producer is awaited
        let cached = self.store.write().await.get(&key);
        if let Some(value) = cached {
            debug!("Memoized hit for '{}'", key);
            return Ok(value);
        }

        let value = (self.producer)(args).await?;
        self.store.write().await.set(key, value.clone(), None);
        Ok(value)
    }

    pub fn store(&self) -> &SharedStore<T> {
        &self.store
    }
}
