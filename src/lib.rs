//! # 🚀 catalog-cache
//!
//! **Read-Through Caching for Catalog JSON Datasets**
//!
//! Caching layer for a catalog API that serves named JSON datasets fetched
//! from an upstream HTTP source. The crate is the stateful core a thin route
//! layer plugs into: per-key TTL expiry, passthrough bypass, background
//! refresh, and request metrics.
//!
//! ## ⚙️ How it works
//!
//! A [`CacheService`] is the single entry point. In cached mode it sweeps
//! stale entries, consults the [`DatasetCache`], and fills on miss; in
//! passthrough mode every call is a fresh upstream round-trip. A background
//! task repopulates every dataset in the [`DatasetRegistry`] once per TTL,
//! independent of request traffic, so entries stay warm even for keys nobody
//! is reading.
//!
//! ## 🚀 Quick Start
//!
//! ```no_run
//! use catalog_cache::{CacheService, DatasetRegistry, HttpFetcher, ServiceConfig};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let config = ServiceConfig::from_env();
//!     let fetcher = HttpFetcher::new(config.upstream_base_url.clone(), config.fetch_timeout)?;
//!     let service = CacheService::new(config, DatasetRegistry::catalog(), fetcher);
//!
//!     // Launch the background refresh loop
//!     service.start().await;
//!
//!     // First call fetches upstream and fills the cache; repeats within the
//!     // TTL are served from memory
//!     let domains = service.resolve("domains").await?;
//!     println!("domains document: {}", domains);
//!
//!     service.stop().await;
//!     Ok(())
//! }
//! ```
//!
//! ## 📊 Observability
//!
//! ```
//! use catalog_cache::{MetricsRecorder, RequestOutcome};
//! use std::time::Duration;
//!
//! # #[tokio::main]
//! # async fn main() {
//! let metrics = MetricsRecorder::new();
//! metrics
//!     .record_request("domains", RequestOutcome::Hit, Duration::from_millis(2))
//!     .await;
//!
//! let snapshot = metrics.snapshot().await;
//! assert_eq!(snapshot.requests.cache_hits, 1);
//! assert_eq!(snapshot.requests.hit_rate, 1.0);
//! # }
//! ```
//!
//! ## ✨ Core Features
//!
//! - ⏱️ **Per-Key TTL Expiry**: stale entries are evicted lazily on read and
//!   in bulk by a sweep, never returned
//! - 🔄 **Background Refresh**: one long-lived task keeps every registered
//!   dataset warm, one bad dataset never halts the pass
//! - 🚦 **Passthrough Mode**: bypass the cache entirely for deployments that
//!   want every request to hit upstream
//! - 📊 **Metrics**: hit rate, p95 latency over a bounded sample window, and
//!   per-endpoint tallies, serializable for a diagnostics endpoint
//! - 🔒 **Concurrency-Safe**: the cache lock is never held across a network
//!   call; an abandoned fetch never leaves a partial entry behind

pub mod cache;
pub mod clock;
pub mod config;
pub mod error;
pub mod fetch;
pub mod metrics;
pub mod registry;
pub mod service;

// Re-export commonly used types
pub use cache::{CacheStatus, DatasetCache, EntryStatus};
pub use clock::{Clock, SystemClock};
pub use config::{ServeMode, ServiceConfig};
pub use error::{FetchError, ServiceError};
pub use fetch::{DatasetFetcher, HttpFetcher};
pub use metrics::{
    MetricsRecorder, MetricsSnapshot, RequestOutcome, RequestStats, UpstreamStats,
    DEFAULT_SAMPLE_WINDOW,
};
pub use registry::DatasetRegistry;
pub use service::CacheService;
