//! TTL Cleanup Task
//!
//! Background task that periodically removes expired cache entries.

use std::time::Duration;

use tokio::task::JoinHandle;
use tracing::{debug, info};

use crate::cache::SharedMaintenance;

/// Spawns a background task that periodically cleans up expired cache entries.
///
/// The task runs in an infinite loop, sleeping for `interval` between runs
/// and holding the store's write lock only for the sweep itself.
///
/// # Returns
/// A JoinHandle for the spawned task; `abort()` on it cancels the cleanup.
///
/// # Example
/// ```ignore
/// let cleanup_handle = spawn_cleanup_task(caches.api.clone(), Duration::from_secs(60));
/// // Later, during shutdown:
/// cleanup_handle.abort();
/// ```
pub fn spawn_cleanup_task(cache: SharedMaintenance, interval: Duration) -> JoinHandle<()> {
    tokio::spawn(async move {
        let namespace = cache.read().await.namespace().to_string();
        info!(
            "Starting TTL cleanup task for '{}' with interval of {:?}",
            namespace, interval
        );

        loop {
            tokio::time::sleep(interval).await;

            let removed = cache.write().await.cleanup();

            if removed > 0 {
                info!("TTL cleanup: removed {} expired entries from '{}'", removed, namespace);
            } else {
                debug!("TTL cleanup: no expired entries in '{}'", namespace);
            }
        }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::cache::{shared, CacheStore};

    #[tokio::test]
    async fn test_cleanup_task_removes_expired_entries() {
        let store = shared(CacheStore::<String>::in_memory(10_000, 100).unwrap());
        store
            .write()
            .await
            .set("expire_soon", "value".to_string(), Some(20));

        let handle = spawn_cleanup_task(store.clone(), Duration::from_millis(50));

        tokio::time::sleep(Duration::from_millis(200)).await;

        // Removed by the task, not by a lazy read
        assert!(store.read().await.is_empty());

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_preserves_valid_entries() {
        let store = shared(CacheStore::<String>::in_memory(10_000, 100).unwrap());
        store
            .write()
            .await
            .set("long_lived", "value".to_string(), Some(3_600_000));

        let handle = spawn_cleanup_task(store.clone(), Duration::from_millis(20));

        tokio::time::sleep(Duration::from_millis(100)).await;

        assert_eq!(
            store.write().await.get("long_lived"),
            Some("value".to_string())
        );

        handle.abort();
    }

    #[tokio::test]
    async fn test_cleanup_task_can_be_aborted() {
        let store = shared(CacheStore::<String>::in_memory(10_000, 100).unwrap());

        let handle = spawn_cleanup_task(store, Duration::from_millis(10));

        handle.abort();

        tokio::time::sleep(Duration::from_millis(50)).await;
        assert!(handle.is_finished(), "Task should be finished after abort");
    }
}
