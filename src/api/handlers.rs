//! API Handlers
//!
//! HTTP request handlers for each admin endpoint.

use std::collections::BTreeMap;
use std::sync::Arc;

use axum::{
    extract::{Path, State},
    Json,
};
use tracing::info;

use crate::cache::{invalidate_cache, SharedMaintenance};
use crate::error::{CacheError, Result};
use crate::models::{
    CacheListResponse, ClearResponse, DeleteResponse, HealthResponse, InvalidateRequest,
    RemovedResponse, StatsResponse,
};
use crate::named::NamedCaches;

/// Application state shared across all handlers.
///
/// Holds type-erased handles to the caches by name.
#[derive(Clone)]
pub struct AppState {
    caches: Arc<BTreeMap<String, SharedMaintenance>>,
}

impl AppState {
    /// Creates a new AppState from named handles.
    pub fn new(caches: impl IntoIterator<Item = (String, SharedMaintenance)>) -> Self {
        Self {
            caches: Arc::new(caches.into_iter().collect()),
        }
    }

    /// Exposes the three named caches.
    pub fn from_named(named: &NamedCaches) -> Self {
        Self::new(named.maintenance_handles())
    }

    pub fn cache_names(&self) -> Vec<String> {
        self.caches.keys().cloned().collect()
    }

    fn cache(&self, name: &str) -> Result<SharedMaintenance> {
        self.caches
            .get(name)
            .cloned()
            .ok_or_else(|| CacheError::UnknownCache(name.to_string()))
    }
}

/// Handler for GET /caches
pub async fn list_handler(State(state): State<AppState>) -> Json<CacheListResponse> {
    Json(CacheListResponse {
        caches: state.cache_names(),
    })
}

/// Handler for GET /caches/:name/stats
pub async fn stats_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<StatsResponse>> {
    let cache = state.cache(&name)?;
    let stats = cache.read().await.stats();

    Ok(Json(StatsResponse::new(name, stats)))
}

/// Handler for POST /caches/:name/cleanup
pub async fn cleanup_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<RemovedResponse>> {
    let cache = state.cache(&name)?;
    let removed = cache.write().await.cleanup();

    Ok(Json(RemovedResponse::new(name, removed)))
}

/// Handler for POST /caches/:name/invalidate
pub async fn invalidate_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
    Json(req): Json<InvalidateRequest>,
) -> Result<Json<RemovedResponse>> {
    let cache = state.cache(&name)?;
    let pattern = req.key_pattern()?;

    let removed = {
        let mut guard = cache.write().await;
        invalidate_cache(pattern, &mut *guard)
    };
    info!("Invalidated {} entries in '{}' matching '{}'", removed, name, req.pattern);

    Ok(Json(RemovedResponse::new(name, removed)))
}

/// Handler for DELETE /caches/:name/keys/:key
pub async fn delete_key_handler(
    State(state): State<AppState>,
    Path((name, key)): Path<(String, String)>,
) -> Result<Json<DeleteResponse>> {
    let cache = state.cache(&name)?;

    if !cache.write().await.delete(&key) {
        return Err(CacheError::NotFound(key));
    }

    Ok(Json(DeleteResponse::new(name, key)))
}

/// Handler for DELETE /caches/:name
pub async fn clear_handler(
    State(state): State<AppState>,
    Path(name): Path<String>,
) -> Result<Json<ClearResponse>> {
    let cache = state.cache(&name)?;
    cache.write().await.clear();

    Ok(Json(ClearResponse::new(name)))
}

/// Handler for GET /health
pub async fn health_handler() -> Json<HealthResponse> {
    Json(HealthResponse::healthy())
}
