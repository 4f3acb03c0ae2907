//! Integration Tests for Cache Lifecycle
//!
//! Persistence across restarts, memoization and invalidation through the
//! named caches, and background maintenance.

use query_cache::cache::{shared, CanonicalKey, SharedMaintenance};
use query_cache::{
    invalidate_cache, spawn_cleanup_task, with_cache, with_cache_keyed, BackendKind, Backends,
    CacheError, CacheStore, Config, KeyPattern, NamedCaches, Preloader, StoreConfig,
};
use serde::Serialize;
use serde_json::{json, Value};
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::Arc;
use std::time::Duration;

// == Durable Persistence ==

#[tokio::test]
async fn test_durable_cache_survives_restart() {
    let dir = tempfile::tempdir().unwrap();

    {
        let caches =
            NamedCaches::new(&Config::default(), &Backends::new(Some(dir.path().into()))).unwrap();
        let mut images = caches.images.write().await;
        images.set("logo.png", vec![1, 2, 3], None);
        images.set("banner.png", vec![4, 5], Some(30));
    }

    tokio::time::sleep(Duration::from_millis(80)).await;

    // Fresh process: new backends over the same directory
    let caches =
        NamedCaches::new(&Config::default(), &Backends::new(Some(dir.path().into()))).unwrap();
    let mut images = caches.images.write().await;
    assert_eq!(images.get("logo.png"), Some(vec![1, 2, 3]));
    assert_eq!(images.get("banner.png"), None);
    assert_eq!(images.keys(), vec!["logo.png".to_string()]);
}

#[tokio::test]
async fn test_corrupt_durable_payload_loads_empty() {
    let dir = tempfile::tempdir().unwrap();
    std::fs::write(dir.path().join("query_cache.images.json"), "{not json").unwrap();

    let caches =
        NamedCaches::new(&Config::default(), &Backends::new(Some(dir.path().into()))).unwrap();
    assert!(caches.images.read().await.is_empty());

    // The next mutation overwrites the broken payload
    caches.images.write().await.set("fresh", vec![9], None);
    drop(caches);

    let caches =
        NamedCaches::new(&Config::default(), &Backends::new(Some(dir.path().into()))).unwrap();
    assert_eq!(caches.images.write().await.get("fresh"), Some(vec![9]));
}

#[test]
fn test_durable_clear_is_persisted() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::new("reports", 60_000, 10, BackendKind::Durable);

    {
        let backends = Backends::new(Some(dir.path().into()));
        let mut store = CacheStore::<String>::new(&config, &backends).unwrap();
        store.set("q1", "rows".to_string(), None);
        store.clear();
    }

    let backends = Backends::new(Some(dir.path().into()));
    let store = CacheStore::<String>::new(&config, &backends).unwrap();
    assert!(store.is_empty());
}

#[test]
fn test_namespaces_mapping_to_one_file_cannot_coexist() {
    let dir = tempfile::tempdir().unwrap();
    let backends = Backends::new(Some(dir.path().into()));
    let users = StoreConfig::new("app/users", 60_000, 10, BackendKind::Durable);
    let lookalike = StoreConfig::new("app_users", 60_000, 10, BackendKind::Durable);

    {
        let mut store = CacheStore::<String>::new(&users, &backends).unwrap();
        store.set("from_users", "a".to_string(), None);

        let clash = CacheStore::<String>::new(&lookalike, &backends);
        assert!(matches!(clash, Err(CacheError::NamespaceInUse(_))));
    }

    let reloaded = CacheStore::<String>::new(&users, &backends).unwrap();
    assert_eq!(reloaded.keys(), vec!["from_users".to_string()]);
}

// == Ephemeral Persistence ==

#[tokio::test]
async fn test_ephemeral_cache_lives_as_long_as_its_backends() {
    let backends = Backends::new(None);

    {
        let caches = NamedCaches::new(&Config::default(), &backends).unwrap();
        caches.user.write().await.set("me", json!({"name": "ada"}), None);
    }

    let caches = NamedCaches::new(&Config::default(), &backends).unwrap();
    assert_eq!(
        caches.user.write().await.get("me"),
        Some(json!({"name": "ada"}))
    );
    drop(caches);

    // A new context starts empty
    let caches = NamedCaches::new(&Config::default(), &Backends::new(None)).unwrap();
    assert!(caches.user.read().await.is_empty());
}

#[test]
fn test_detached_backends_persist_nothing() {
    let backends = Backends::detached();
    let config = StoreConfig::new("session", 60_000, 10, BackendKind::Ephemeral);

    {
        let mut store = CacheStore::<u32>::new(&config, &backends).unwrap();
        store.set("n", 1, None);
    }

    let store = CacheStore::<u32>::new(&config, &backends).unwrap();
    assert!(store.is_empty());
}

// == Memoization and Invalidation ==

#[derive(Serialize)]
struct PageArgs {
    page: u32,
    filter: Option<String>,
}

#[tokio::test]
async fn test_memoize_then_invalidate_through_named_cache() {
    let caches = NamedCaches::new(&Config::default(), &Backends::detached()).unwrap();
    let calls = Arc::new(AtomicUsize::new(0));

    let counter = calls.clone();
    let fetch_page = with_cache_keyed(
        move |args: PageArgs| {
            counter.fetch_add(1, Ordering::SeqCst);
            async move { Ok::<Value, anyhow::Error>(json!({"page": args.page})) }
        },
        caches.api.clone(),
        CanonicalKey::prefixed("orders:"),
    );

    for _ in 0..3 {
        fetch_page
            .call(PageArgs {
                page: 1,
                filter: None,
            })
            .await
            .unwrap();
    }
    fetch_page
        .call(PageArgs {
            page: 2,
            filter: Some("open".into()),
        })
        .await
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 2);

    caches.api.write().await.set("profile", json!({}), None);

    let removed = invalidate_cache("orders:", &mut *caches.api.write().await);
    assert_eq!(removed, 2);
    assert_eq!(caches.api.read().await.keys(), vec!["profile".to_string()]);

    // Invalidated keys are fetched again
    fetch_page
        .call(PageArgs {
            page: 1,
            filter: None,
        })
        .await
        .unwrap();
    assert_eq!(calls.load(Ordering::SeqCst), 3);
}

#[tokio::test]
async fn test_regex_invalidation_on_maintenance_handle() {
    let caches = NamedCaches::new(&Config::default(), &Backends::detached()).unwrap();
    {
        let mut user = caches.user.write().await;
        user.set("cart_1", json!([]), None);
        user.set("cart_22", json!([]), None);
        user.set("cart_x", json!([]), None);
    }

    let handle: SharedMaintenance = caches.user.clone();
    let pattern = KeyPattern::regex(r"^cart_\d+$").unwrap();
    let removed = invalidate_cache(pattern, &mut *handle.write().await);

    assert_eq!(removed, 2);
    assert!(caches.user.write().await.has("cart_x"));
}

// == Background Tasks ==

#[tokio::test]
async fn test_cleanup_task_sweeps_named_cache() {
    let caches = NamedCaches::new(&Config::default(), &Backends::detached()).unwrap();
    {
        let mut api = caches.api.write().await;
        api.set("stale", json!(1), Some(10));
        api.set("fresh", json!(2), None);
    }

    let handle = spawn_cleanup_task(caches.api.clone(), Duration::from_millis(25));
    tokio::time::sleep(Duration::from_millis(120)).await;
    handle.abort();

    // Removed by the sweep, not by a read
    let api = caches.api.read().await;
    assert_eq!(api.keys(), vec!["fresh".to_string()]);
    assert_eq!(api.stats().misses, 0);
}

#[tokio::test]
async fn test_preloader_warms_named_cache() {
    let store = shared(CacheStore::<String>::in_memory(60_000, 10).unwrap());
    let fetch = Arc::new(with_cache(
        |id: u32| async move {
            if id == 0 {
                Err(anyhow::anyhow!("no such item"))
            } else {
                Ok(format!("item-{}", id))
            }
        },
        store.clone(),
    ));

    let mut preloader = Preloader::new();
    for id in 0..3 {
        let fetch = fetch.clone();
        preloader = preloader.task(format!("item-{}", id), async move {
            fetch.call(id).await.map(drop)
        });
    }
    let report = preloader.spawn().await.unwrap();

    assert_eq!(report.succeeded, 2);
    assert_eq!(report.failed, vec!["item-0".to_string()]);
    assert_eq!(store.read().await.len(), 2);
}
