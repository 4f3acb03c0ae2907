//! Response DTOs for the admin API
//!
//! Defines the structure of outgoing HTTP response bodies.

use serde::Serialize;

use crate::cache::CacheStats;

/// Response body for GET /caches/:name/stats
#[derive(Debug, Clone, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StatsResponse {
    pub cache: String,
    #[serde(flatten)]
    pub stats: CacheStats,
    /// Hit rate (hits / (hits + misses))
    pub hit_rate: f64,
}

impl StatsResponse {
    pub fn new(cache: impl Into<String>, stats: CacheStats) -> Self {
        Self {
            cache: cache.into(),
            hit_rate: stats.hit_rate(),
            stats,
        }
    }
}

/// Response body for cleanup and invalidation
#[derive(Debug, Clone, Serialize)]
pub struct RemovedResponse {
    pub cache: String,
    /// Number of entries removed
    pub removed: usize,
}

impl RemovedResponse {
    pub fn new(cache: impl Into<String>, removed: usize) -> Self {
        Self {
            cache: cache.into(),
            removed,
        }
    }
}

/// Response body for DELETE /caches/:name/keys/:key
#[derive(Debug, Clone, Serialize)]
pub struct DeleteResponse {
    /// Success message
    pub message: String,
    pub cache: String,
    pub key: String,
}

impl DeleteResponse {
    pub fn new(cache: impl Into<String>, key: impl Into<String>) -> Self {
        let cache = cache.into();
        let key = key.into();
        Self {
            message: format!("Key '{}' deleted from '{}'", key, cache),
            cache,
            key,
        }
    }
}

/// Response body for DELETE /caches/:name
#[derive(Debug, Clone, Serialize)]
pub struct ClearResponse {
    pub message: String,
    pub cache: String,
}

impl ClearResponse {
    pub fn new(cache: impl Into<String>) -> Self {
        let cache = cache.into();
        Self {
            message: format!("Cache '{}' cleared", cache),
            cache,
        }
    }
}

/// Response body for GET /caches
#[derive(Debug, Clone, Serialize)]
pub struct CacheListResponse {
    pub caches: Vec<String>,
}

/// Response body for the health endpoint (GET /health)
#[derive(Debug, Clone, Serialize)]
pub struct HealthResponse {
    /// Health status (e.g., "healthy")
    pub status: String,
    /// Current timestamp in ISO 8601 format
    pub timestamp: String,
}

impl HealthResponse {
    /// Creates a new HealthResponse with current timestamp
    pub fn healthy() -> Self {
        Self {
            status: "healthy".to_string(),
            timestamp: chrono::Utc::now().to_rfc3339(),
        }
    }
}

/// Error response body for all error conditions
#[derive(Debug, Clone, Serialize)]
pub struct ErrorResponse {
    /// Error message describing what went wrong
    pub error: String,
}

impl ErrorResponse {
    pub fn new(error: impl Into<String>) -> Self {
        Self {
            error: error.into(),
        }
    }
}
