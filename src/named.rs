//! Named Caches Module
//!
//! The three long-lived stores an application works with, each tuned for
//! one category of data.

use std::collections::HashSet;

use serde_json::Value;
use tracing::info;

use crate::cache::{shared, CacheStore, SharedMaintenance, SharedStore};
use crate::config::Config;
use crate::error::{CacheError, Result};
use crate::persistence::Backends;

/// Name of the general API response cache.
pub const API_CACHE: &str = "api";
/// Name of the binary/image payload cache.
pub const IMAGE_CACHE: &str = "images";
/// Name of the current user's data cache.
pub const USER_CACHE: &str = "user";

// == Named Caches ==
/// Explicitly constructed named stores. Hand out clones of the handles
/// rather than reaching for process-wide state.
#[derive(Debug, Clone)]
pub struct NamedCaches {
    /// Short TTL, medium capacity
    pub api: SharedStore<Value>,
    /// Long TTL, high capacity
    pub images: SharedStore<Vec<u8>>,
    /// Medium TTL, low capacity
    pub user: SharedStore<Value>,
}

impl NamedCaches {
    /// Builds the named stores from `config`, restoring persisted ones.
    ///
    /// # Errors
    /// - `InvalidConfig` if two stores share a namespace or one has zero capacity
    /// - `NamespaceInUse` if the namespaces are already claimed in `backends`
    pub fn new(config: &Config, backends: &Backends) -> Result<Self> {
        let mut seen = HashSet::new();
        for store in [&config.api, &config.images, &config.user] {
            if !seen.insert(store.namespace.as_str()) {
                return Err(CacheError::InvalidConfig(format!(
                    "namespace '{}' is used by more than one cache",
                    store.namespace
                )));
            }
        }

        let caches = Self {
            api: shared(CacheStore::new(&config.api, backends)?),
            images: shared(CacheStore::new(&config.images, backends)?),
            user: shared(CacheStore::new(&config.user, backends)?),
        };

        info!(
            "Named caches ready: {} ({}), {} ({}), {} ({})",
            API_CACHE,
            config.api.backend,
            IMAGE_CACHE,
            config.images.backend,
            USER_CACHE,
            config.user.backend
        );
        Ok(caches)
    }

    /// Type-erased handles keyed by cache name.
    pub fn maintenance_handles(&self) -> Vec<(String, SharedMaintenance)> {
        let api: SharedMaintenance = self.api.clone();
        let images: SharedMaintenance = self.images.clone();
        let user: SharedMaintenance = self.user.clone();
        vec![
            (API_CACHE.to_string(), api),
            (IMAGE_CACHE.to_string(), images),
            (USER_CACHE.to_string(), user),
        ]
    }
}
