//! Configuration Module
//!
//! Handles loading and managing cache configuration from environment variables.

use std::env;
use std::path::PathBuf;
use std::str::FromStr;

use crate::persistence::BackendKind;

// == Store Config ==
/// Tuning for one cache store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreConfig {
    /// Persistence namespace; must be unique among persisted stores
    pub namespace: String,
    /// Default TTL in milliseconds for entries set without one
    pub ttl_ms: u64,
    /// Maximum number of entries
    pub max_size: usize,
    /// Where entries survive to
    pub backend: BackendKind,
}

impl StoreConfig {
    pub fn new(namespace: impl Into<String>, ttl_ms: u64, max_size: usize, backend: BackendKind) -> Self {
        Self {
            namespace: namespace.into(),
            ttl_ms,
            max_size,
            backend,
        }
    }

    /// A memory-only store config.
    pub fn memory(namespace: impl Into<String>, ttl_ms: u64, max_size: usize) -> Self {
        Self::new(namespace, ttl_ms, max_size, BackendKind::None)
    }

    /// Overrides fields from `{prefix}_TTL_MS`, `{prefix}_MAX_SIZE` and
    /// `{prefix}_BACKEND`.
    fn with_env_overrides(self, prefix: &str) -> Self {
        Self {
            ttl_ms: env_or(&format!("{}_TTL_MS", prefix), self.ttl_ms),
            max_size: env_or(&format!("{}_MAX_SIZE", prefix), self.max_size),
            backend: env_or(&format!("{}_BACKEND", prefix), self.backend),
            namespace: self.namespace,
        }
    }
}

// == Config ==
/// Configuration for the named caches and their host process.
///
/// All values can be configured via environment variables with sensible defaults.
#[derive(Debug, Clone)]
pub struct Config {
    /// General API responses
    pub api: StoreConfig,
    /// Binary/image payloads
    pub images: StoreConfig,
    /// Current user's personal data
    pub user: StoreConfig,
    /// Directory for the durable backend; None disables it
    pub cache_dir: Option<PathBuf>,
    /// Run with every backend as a no-op
    pub detached: bool,
    /// Interval between cleanup runs of the API cache
    pub cleanup_interval_ms: u64,
    /// Admin HTTP server port
    pub server_port: u16,
}

impl Config {
    /// Creates a new Config by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `API_CACHE_TTL_MS` / `API_CACHE_MAX_SIZE` / `API_CACHE_BACKEND` (default: 300000 / 100 / none)
    /// - `IMAGE_CACHE_*` (default: 1800000 / 200 / durable)
    /// - `USER_CACHE_*` (default: 600000 / 50 / ephemeral)
    /// - `CACHE_DIR` - Durable backend directory (default: unset)
    /// - `CACHE_DETACHED` - Disable all persistence (default: false)
    /// - `CLEANUP_INTERVAL_MS` - Cleanup frequency (default: 60000)
    /// - `SERVER_PORT` - Admin HTTP port (default: 3000)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            api: defaults.api.with_env_overrides("API_CACHE"),
            images: defaults.images.with_env_overrides("IMAGE_CACHE"),
            user: defaults.user.with_env_overrides("USER_CACHE"),
            cache_dir: env::var_os("CACHE_DIR")
                .filter(|v| !v.is_empty())
                .map(PathBuf::from),
            detached: env_or("CACHE_DETACHED", defaults.detached),
            cleanup_interval_ms: env_or("CLEANUP_INTERVAL_MS", defaults.cleanup_interval_ms),
            server_port: env_or("SERVER_PORT", defaults.server_port),
        }
    }
}

impl Default for Config {
    fn default() -> Self {
        Self {
            api: StoreConfig::new("query_cache.api", 5 * 60 * 1000, 100, BackendKind::None),
            images: StoreConfig::new(
                "query_cache.images",
                30 * 60 * 1000,
                200,
                BackendKind::Durable,
            ),
            user: StoreConfig::new(
                "query_cache.user",
                10 * 60 * 1000,
                50,
                BackendKind::Ephemeral,
            ),
            cache_dir: None,
            detached: false,
            cleanup_interval_ms: 60_000,
            server_port: 3000,
        }
    }
}

/// Parses `name` from the environment, falling back on absence or parse failure.
fn env_or<T: FromStr>(name: &str, default: T) -> T {
    env::var(name)
        .ok()
        .and_then(|v| v.parse().ok())
        .unwrap_or(default)
}
