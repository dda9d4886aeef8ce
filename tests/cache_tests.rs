use catalog_cache::DatasetCache;
use serde_json::json;
use std::time::{Duration, Instant};

const TTL: Duration = Duration::from_secs(60);

#[tokio::test]
async fn basic_insert_get_remove() {
    let cache = DatasetCache::new(TTL);
    let now = Instant::now();

    assert!(cache.get("models", now).await.is_none());
    assert!(cache.is_empty().await);

    let doc = json!({"models": [{"id": 1}]});
    cache.insert("models", doc.clone(), now).await;

    let value = cache.get("models", now).await.unwrap();
    assert_eq!(*value, doc);
    assert_eq!(cache.len().await, 1);

    assert!(cache.remove("models").await);
    assert!(cache.get("models", now).await.is_none());

    cache.insert("models", doc, now).await;
    cache.clear().await;
    assert!(cache.is_empty().await);
}

#[tokio::test]
async fn stale_entry_is_never_returned() {
    let cache = DatasetCache::new(TTL);
    let fetched_at = Instant::now();

    cache.insert("theme", json!({"dark": true}), fetched_at).await;

    // Fresh right up to the TTL boundary
    assert!(cache.get("theme", fetched_at + TTL).await.is_some());

    // One tick past the TTL it behaves as not-found and is evicted
    let after_expiry = fetched_at + TTL + Duration::from_millis(1);
    assert!(cache.get("theme", after_expiry).await.is_none());
    assert_eq!(cache.len().await, 0);
}

#[tokio::test]
async fn insert_overwrites_unconditionally() {
    let cache = DatasetCache::new(TTL);
    let base = Instant::now();

    cache.insert("menu", json!({"items": 1}), base).await;
    cache
        .insert("menu", json!({"items": 2}), base + Duration::from_secs(5))
        .await;

    let value = cache.get("menu", base + Duration::from_secs(6)).await.unwrap();
    assert_eq!(*value, json!({"items": 2}));
    assert_eq!(cache.len().await, 1);
}

#[tokio::test]
async fn sweep_removes_exactly_the_stale_entries() {
    let cache = DatasetCache::new(TTL);
    let base = Instant::now();
    let now = base + TTL * 2;

    // Aged 2*TTL at `now`: stale
    cache.insert("old", json!({"v": "old"}), base).await;
    // Aged TTL/2 at `now`: fresh
    cache
        .insert("recent", json!({"v": "recent"}), now - TTL / 2)
        .await;

    let removed = cache.sweep(now).await;
    assert_eq!(removed, 1);
    assert!(cache.get("old", now).await.is_none());
    assert!(cache.get("recent", now).await.is_some());
}

#[tokio::test]
async fn sweep_on_empty_cache_is_a_noop() {
    let cache = DatasetCache::new(TTL);
    assert_eq!(cache.sweep(Instant::now()).await, 0);
}

#[tokio::test]
async fn per_key_ttl_overrides_default() {
    let cache = DatasetCache::new(TTL);
    let base = Instant::now();
    let short = Duration::from_secs(5);

    cache
        .insert_with_ttl("volatile", json!({"v": 1}), base, short)
        .await;
    cache.insert("steady", json!({"v": 2}), base).await;

    let later = base + Duration::from_secs(10);
    assert!(cache.get("volatile", later).await.is_none());
    assert!(cache.get("steady", later).await.is_some());
}

#[tokio::test]
async fn status_reports_age_and_staleness() {
    let cache = DatasetCache::new(TTL);
    let base = Instant::now();
    let now = base + TTL * 2;

    cache.insert("old", json!({}), base).await;
    cache.insert("fresh", json!({}), now - Duration::from_secs(10)).await;

    let status = cache.status(now).await;
    assert_eq!(status.total_entries, 2);

    let old = &status.per_key["old"];
    assert!(old.is_stale);
    assert_eq!(old.age_seconds, (TTL * 2).as_secs());

    let fresh = &status.per_key["fresh"];
    assert!(!fresh.is_stale);
    assert_eq!(fresh.age_seconds, 10);
}

#[tokio::test]
async fn concurrent_readers_and_writer() {
    use std::sync::Arc;

    let cache = Arc::new(DatasetCache::new(TTL));
    let now = Instant::now();
    cache.insert("shared", json!({"v": 0}), now).await;

    let mut handles = Vec::new();
    for i in 0..8 {
        let cache = cache.clone();
        handles.push(tokio::spawn(async move {
            for _ in 0..100 {
                if i == 0 {
                    cache.insert("shared", json!({"v": i}), Instant::now()).await;
                } else {
                    // Never observes a torn entry: either a full document or none
                    let _ = cache.get("shared", Instant::now()).await;
                }
            }
        }));
    }

    for handle in handles {
        handle.await.unwrap();
    }

    assert!(cache.get("shared", Instant::now()).await.is_some());
}
