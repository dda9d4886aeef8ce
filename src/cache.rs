use serde::Serialize;
use serde_json::Value;
use std::collections::HashMap;
use std::sync::Arc;
use std::time::{Duration, Instant};
use tokio::sync::RwLock;

/// A cached dataset document and the instant it was fetched. The pair is
/// only ever written as a single unit under the store's write lock.
#[derive(Debug)]
struct CacheEntry {
    value: Arc<Value>,
    fetched_at: Instant,
    ttl: Duration,
}

impl CacheEntry {
    fn age(&self, now: Instant) -> Duration {
        now.saturating_duration_since(self.fetched_at)
    }

    fn is_stale(&self, now: Instant) -> bool {
        self.age(now) > self.ttl
    }
}

/// In-memory store for fetched dataset documents with per-key TTL expiry.
///
/// Staleness is evaluated against an `Instant` supplied by the caller, so
/// the store itself never reads the clock. Stale entries are evicted lazily
/// on lookup and in bulk by [`sweep`](DatasetCache::sweep); both mechanisms
/// are kept deliberately (sweep bounds memory growth for keys nobody reads,
/// lazy eviction keeps the common read path cheap).
#[derive(Debug)]
pub struct DatasetCache {
    entries: RwLock<HashMap<String, CacheEntry>>,
    default_ttl: Duration,
}

impl DatasetCache {
    pub fn new(default_ttl: Duration) -> Self {
        Self {
            entries: RwLock::new(HashMap::new()),
            default_ttl,
        }
    }

    pub fn default_ttl(&self) -> Duration {
        self.default_ttl
    }

    /// Return the cached document for `key` if it is present and fresh at
    /// `now`. A stale entry is removed and reported as a miss; it is never
    /// returned.
    pub async fn get(&self, key: &str, now: Instant) -> Option<Arc<Value>> {
        {
            let entries = self.entries.read().await;
            match entries.get(key) {
                Some(entry) if !entry.is_stale(now) => return Some(entry.value.clone()),
                Some(_) => {}
                None => return None,
            }
        }

        // Lazy eviction. Re-check under the write lock: a concurrent insert
        // may have refreshed the entry since the read above.
        let mut entries = self.entries.write().await;
        match entries.get(key) {
            Some(entry) if !entry.is_stale(now) => Some(entry.value.clone()),
            Some(_) => {
                entries.remove(key);
                None
            }
            None => None,
        }
    }

    /// Insert or replace the entry for `key` with the store default TTL,
    /// stamping it as fetched at `now`. Last writer wins.
    ///
    /// Returns the stored view of the document.
    pub async fn insert(&self, key: &str, value: Value, now: Instant) -> Arc<Value> {
        self.insert_with_ttl(key, value, now, self.default_ttl).await
    }

    /// Insert with an explicit TTL for this key.
    pub async fn insert_with_ttl(
        &self,
        key: &str,
        value: Value,
        now: Instant,
        ttl: Duration,
    ) -> Arc<Value> {
        let value = Arc::new(value);
        let mut entries = self.entries.write().await;
        entries.insert(
            key.to_string(),
            CacheEntry {
                value: value.clone(),
                fetched_at: now,
                ttl,
            },
        );
        value
    }

    /// Remove every entry whose age at `now` exceeds its TTL, regardless of
    /// access. Returns the number of entries removed.
    pub async fn sweep(&self, now: Instant) -> usize {
        let mut entries = self.entries.write().await;
        let before = entries.len();
        entries.retain(|_, entry| !entry.is_stale(now));
        before - entries.len()
    }

    pub async fn remove(&self, key: &str) -> bool {
        self.entries.write().await.remove(key).is_some()
    }

    pub async fn clear(&self) {
        self.entries.write().await.clear();
    }

    pub async fn len(&self) -> usize {
        self.entries.read().await.len()
    }

    pub async fn is_empty(&self) -> bool {
        self.entries.read().await.is_empty()
    }

    /// Diagnostic snapshot of the store at `now`. Stale entries that have not
    /// been evicted yet show up with `is_stale: true`.
    pub async fn status(&self, now: Instant) -> CacheStatus {
        let entries = self.entries.read().await;
        let per_key = entries
            .iter()
            .map(|(key, entry)| {
                (
                    key.clone(),
                    EntryStatus {
                        age_seconds: entry.age(now).as_secs(),
                        is_stale: entry.is_stale(now),
                    },
                )
            })
            .collect();

        CacheStatus {
            total_entries: entries.len(),
            per_key,
        }
    }
}

/// Point-in-time view of the cache store for diagnostics endpoints.
#[derive(Debug, Clone, Serialize)]
pub struct CacheStatus {
    pub total_entries: usize,
    pub per_key: HashMap<String, EntryStatus>,
}

#[derive(Debug, Clone, Serialize)]
pub struct EntryStatus {
    pub age_seconds: u64,
    pub is_stale: bool,
}
