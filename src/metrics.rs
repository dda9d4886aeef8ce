use serde::Serialize;
use std::collections::{HashMap, VecDeque};
use std::sync::atomic::{AtomicU64, Ordering};
use std::time::{Duration, SystemTime, UNIX_EPOCH};
use tokio::sync::RwLock;

/// Default number of latency samples retained per reservoir.
pub const DEFAULT_SAMPLE_WINDOW: usize = 1000;

/// How a served request was satisfied.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RequestOutcome {
    Hit,
    Miss,
    Passthrough,
}

/// Accumulates counters and latency samples for observability.
///
/// Purely additive: counters are never reset for the life of the process.
/// Latency samples live in a bounded rolling window so memory does not grow
/// with uptime. Safe to call from concurrent request handlers and the
/// background refresh loop; recording never waits on I/O.
#[derive(Debug)]
pub struct MetricsRecorder {
    total_requests: AtomicU64,
    cache_hits: AtomicU64,
    cache_misses: AtomicU64,
    passthrough_requests: AtomicU64,
    upstream_requests: AtomicU64,
    upstream_errors: AtomicU64,
    request_latencies: RwLock<VecDeque<Duration>>,
    upstream_latencies: RwLock<VecDeque<Duration>>,
    endpoint_counts: RwLock<HashMap<String, u64>>,
    sample_window: usize,
}

impl MetricsRecorder {
    pub fn new() -> Self {
        Self::with_window(DEFAULT_SAMPLE_WINDOW)
    }

    /// Recorder keeping at most `sample_window` latency samples per series.
    pub fn with_window(sample_window: usize) -> Self {
        Self {
            total_requests: AtomicU64::new(0),
            cache_hits: AtomicU64::new(0),
            cache_misses: AtomicU64::new(0),
            passthrough_requests: AtomicU64::new(0),
            upstream_requests: AtomicU64::new(0),
            upstream_errors: AtomicU64::new(0),
            request_latencies: RwLock::new(VecDeque::new()),
            upstream_latencies: RwLock::new(VecDeque::new()),
            endpoint_counts: RwLock::new(HashMap::new()),
            sample_window,
        }
    }

    /// Record one served request: its outcome, its latency, and a tally
    /// against the logical endpoint name.
    pub async fn record_request(&self, endpoint: &str, outcome: RequestOutcome, latency: Duration) {
        self.total_requests.fetch_add(1, Ordering::Relaxed);
        match outcome {
            RequestOutcome::Hit => self.cache_hits.fetch_add(1, Ordering::Relaxed),
            RequestOutcome::Miss => self.cache_misses.fetch_add(1, Ordering::Relaxed),
            RequestOutcome::Passthrough => {
                self.passthrough_requests.fetch_add(1, Ordering::Relaxed)
            }
        };

        {
            let mut samples = self.request_latencies.write().await;
            push_bounded(&mut samples, latency, self.sample_window);
        }

        let mut counts = self.endpoint_counts.write().await;
        *counts.entry(endpoint.to_string()).or_insert(0) += 1;
    }

    /// Record one upstream call and whether it succeeded.
    pub async fn record_upstream(&self, latency: Duration, ok: bool) {
        self.upstream_requests.fetch_add(1, Ordering::Relaxed);
        if !ok {
            self.upstream_errors.fetch_add(1, Ordering::Relaxed);
        }

        let mut samples = self.upstream_latencies.write().await;
        push_bounded(&mut samples, latency, self.sample_window);
    }

    /// Compute an aggregate snapshot over everything recorded so far.
    pub async fn snapshot(&self) -> MetricsSnapshot {
        let hits = self.cache_hits.load(Ordering::Relaxed);
        let misses = self.cache_misses.load(Ordering::Relaxed);

        let request_samples: Vec<Duration> =
            self.request_latencies.read().await.iter().copied().collect();
        let upstream_samples: Vec<Duration> =
            self.upstream_latencies.read().await.iter().copied().collect();

        MetricsSnapshot {
            generated_at: unix_timestamp(),
            requests: RequestStats {
                total: self.total_requests.load(Ordering::Relaxed),
                cache_hits: hits,
                cache_misses: misses,
                passthrough: self.passthrough_requests.load(Ordering::Relaxed),
                hit_rate: hit_rate(hits, misses),
                p95_latency_ms: percentile_ms(&request_samples, 0.95),
                samples: request_samples.len(),
            },
            upstream: UpstreamStats {
                requests: self.upstream_requests.load(Ordering::Relaxed),
                errors: self.upstream_errors.load(Ordering::Relaxed),
                p95_latency_ms: percentile_ms(&upstream_samples, 0.95),
            },
            endpoints: self.endpoint_counts.read().await.clone(),
        }
    }
}

impl Default for MetricsRecorder {
    fn default() -> Self {
        Self::new()
    }
}

/// Aggregate view of the recorder, serializable for a diagnostics endpoint.
#[derive(Debug, Clone, Serialize)]
pub struct MetricsSnapshot {
    pub generated_at: u64,
    pub requests: RequestStats,
    pub upstream: UpstreamStats,
    pub endpoints: HashMap<String, u64>,
}

#[derive(Debug, Clone, Serialize)]
pub struct RequestStats {
    pub total: u64,
    pub cache_hits: u64,
    pub cache_misses: u64,
    pub passthrough: u64,
    pub hit_rate: f64,
    pub p95_latency_ms: f64,
    pub samples: usize,
}

#[derive(Debug, Clone, Serialize)]
pub struct UpstreamStats {
    pub requests: u64,
    pub errors: u64,
    pub p95_latency_ms: f64,
}

fn push_bounded(samples: &mut VecDeque<Duration>, latency: Duration, window: usize) {
    samples.push_back(latency);
    while samples.len() > window {
        samples.pop_front();
    }
}

fn hit_rate(hits: u64, misses: u64) -> f64 {
    if hits + misses == 0 {
        0.0
    } else {
        hits as f64 / (hits + misses) as f64
    }
}

/// Nearest-rank percentile over the sample window, in milliseconds. 0 when
/// no samples have been recorded.
fn percentile_ms(samples: &[Duration], pct: f64) -> f64 {
    if samples.is_empty() {
        return 0.0;
    }

    let mut sorted: Vec<Duration> = samples.to_vec();
    sorted.sort();

    let rank = (pct * sorted.len() as f64).ceil() as usize;
    let index = rank.saturating_sub(1).min(sorted.len() - 1);
    sorted[index].as_secs_f64() * 1000.0
}

fn unix_timestamp() -> u64 {
    SystemTime::now()
        .duration_since(UNIX_EPOCH)
        .map(|d| d.as_secs())
        .unwrap_or(0)
}
