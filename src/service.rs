use crate::cache::{CacheStatus, DatasetCache};
use crate::clock::{Clock, SystemClock};
use crate::config::{ServeMode, ServiceConfig};
use crate::error::ServiceError;
use crate::fetch::DatasetFetcher;
use crate::metrics::{MetricsRecorder, MetricsSnapshot, RequestOutcome};
use crate::registry::DatasetRegistry;
use serde_json::Value;
use std::sync::Arc;
use std::time::Instant;
use tokio::sync::Mutex;
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;

/// Single entry point for obtaining dataset documents.
///
/// Owns the cache store, the metrics recorder, and the background refresh
/// task. Constructed explicitly and injected into request handlers; there is
/// no global state. Call [`start`](CacheService::start) to launch the refresh
/// loop and [`stop`](CacheService::stop) to tear it down.
pub struct CacheService<F: DatasetFetcher> {
    config: ServiceConfig,
    registry: Arc<DatasetRegistry>,
    fetcher: Arc<F>,
    cache: Arc<DatasetCache>,
    metrics: Arc<MetricsRecorder>,
    clock: Arc<dyn Clock>,
    refresh: Mutex<Option<RefreshTask>>,
}

struct RefreshTask {
    token: CancellationToken,
    handle: JoinHandle<()>,
}

impl<F: DatasetFetcher> CacheService<F> {
    pub fn new(config: ServiceConfig, registry: DatasetRegistry, fetcher: F) -> Self {
        Self::with_clock(config, registry, fetcher, Arc::new(SystemClock))
    }

    /// Construct with an injected clock, for tests that drive TTL expiry
    /// without sleeping.
    pub fn with_clock(
        config: ServiceConfig,
        registry: DatasetRegistry,
        fetcher: F,
        clock: Arc<dyn Clock>,
    ) -> Self {
        tracing::info!(
            mode = config.mode.description(),
            ttl_secs = config.ttl.as_secs(),
            "cache service configured"
        );

        Self {
            cache: Arc::new(DatasetCache::new(config.ttl)),
            registry: Arc::new(registry),
            fetcher: Arc::new(fetcher),
            metrics: Arc::new(MetricsRecorder::new()),
            clock,
            config,
            refresh: Mutex::new(None),
        }
    }

    pub fn config(&self) -> &ServiceConfig {
        &self.config
    }

    pub fn mode(&self) -> ServeMode {
        self.config.mode
    }

    pub fn registry(&self) -> &DatasetRegistry {
        self.registry.as_ref()
    }

    /// Resolve a dataset by name.
    ///
    /// In passthrough mode every call is a fresh upstream round-trip with no
    /// cache interaction. In cached mode stale entries are swept first, then
    /// the store is consulted; a miss fetches upstream and fills the store.
    /// The cache lock is never held across the network call, and a failed
    /// fetch leaves any previously cached document untouched.
    pub async fn resolve(&self, name: &str) -> Result<Arc<Value>, ServiceError> {
        let started = Instant::now();

        let path = self
            .registry
            .get(name)
            .ok_or_else(|| ServiceError::UnknownDataset(name.to_string()))?
            .to_string();

        if self.config.mode.is_passthrough() {
            let value = self.fetch_upstream(&path).await?;
            self.metrics
                .record_request(name, RequestOutcome::Passthrough, started.elapsed())
                .await;
            return Ok(Arc::new(value));
        }

        let now = self.clock.now();
        self.cache.sweep(now).await;

        if let Some(value) = self.cache.get(name, now).await {
            tracing::debug!(dataset = name, "cache hit");
            self.metrics
                .record_request(name, RequestOutcome::Hit, started.elapsed())
                .await;
            return Ok(value);
        }

        tracing::debug!(dataset = name, "cache miss, fetching upstream");
        let value = self.fetch_upstream(&path).await?;
        let stored = self.cache.insert(name, value, self.clock.now()).await;
        self.metrics
            .record_request(name, RequestOutcome::Miss, started.elapsed())
            .await;
        Ok(stored)
    }

    /// Fetch every registered dataset and store the results, regardless of
    /// serving mode. Per-dataset failures are logged and counted; they never
    /// abort the pass or disturb the previously cached document. Returns the
    /// number of datasets refreshed.
    pub async fn refresh_all(&self) -> usize {
        refresh_pass(
            &self.registry,
            self.fetcher.as_ref(),
            &self.cache,
            &self.metrics,
            self.clock.as_ref(),
        )
        .await
    }

    /// Launch the background refresh loop: sleep one TTL, then repopulate
    /// every registered dataset, forever. Idempotent; a second call while the
    /// loop is running does nothing.
    pub async fn start(&self) {
        let mut slot = self.refresh.lock().await;
        if slot.is_some() {
            return;
        }

        let token = CancellationToken::new();
        let child = token.clone();
        let interval = self.config.ttl;
        let registry = self.registry.clone();
        let fetcher = self.fetcher.clone();
        let cache = self.cache.clone();
        let metrics = self.metrics.clone();
        let clock = self.clock.clone();

        let handle = tokio::spawn(async move {
            tracing::info!(interval_secs = interval.as_secs(), "background refresh started");
            loop {
                tokio::select! {
                    _ = child.cancelled() => break,
                    _ = tokio::time::sleep(interval) => {
                        let refreshed = refresh_pass(
                            &registry,
                            fetcher.as_ref(),
                            &cache,
                            &metrics,
                            clock.as_ref(),
                        )
                        .await;
                        tracing::debug!(refreshed, "background refresh pass complete");
                    }
                }
            }
            tracing::info!("background refresh stopped");
        });

        *slot = Some(RefreshTask { token, handle });
    }

    /// Cancel the refresh loop and wait for it to exit.
    pub async fn stop(&self) {
        let task = self.refresh.lock().await.take();
        if let Some(task) = task {
            task.token.cancel();
            let _ = task.handle.await;
        }
    }

    /// Diagnostic snapshot of the cache store.
    pub async fn cache_status(&self) -> CacheStatus {
        self.cache.status(self.clock.now()).await
    }

    /// Diagnostic snapshot of accumulated metrics.
    pub async fn metrics_snapshot(&self) -> MetricsSnapshot {
        self.metrics.snapshot().await
    }

    async fn fetch_upstream(&self, path: &str) -> Result<Value, ServiceError> {
        let started = Instant::now();
        match self.fetcher.fetch(path).await {
            Ok(value) => {
                self.metrics.record_upstream(started.elapsed(), true).await;
                Ok(value)
            }
            Err(err) => {
                self.metrics.record_upstream(started.elapsed(), false).await;
                Err(ServiceError::Upstream(err))
            }
        }
    }
}

/// One full refresh pass over the registry. Shared between the background
/// loop and [`CacheService::refresh_all`].
async fn refresh_pass<F: DatasetFetcher>(
    registry: &DatasetRegistry,
    fetcher: &F,
    cache: &DatasetCache,
    metrics: &MetricsRecorder,
    clock: &dyn Clock,
) -> usize {
    let mut refreshed = 0;

    for (name, path) in registry.entries() {
        let started = Instant::now();
        match fetcher.fetch(path).await {
            Ok(value) => {
                metrics.record_upstream(started.elapsed(), true).await;
                cache.insert(name, value, clock.now()).await;
                refreshed += 1;
            }
            Err(err) => {
                metrics.record_upstream(started.elapsed(), false).await;
                tracing::warn!(
                    dataset = name,
                    error = %err,
                    "refresh fetch failed, keeping previous entry"
                );
            }
        }
    }

    refreshed
}
