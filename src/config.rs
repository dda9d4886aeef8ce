use serde::{Deserialize, Serialize};
use std::env;
use std::time::Duration;

/// Serving mode, fixed at startup. The facade still consults it on every
/// request so the flag could be made dynamic without touching call sites.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ServeMode {
    /// Consult the cache store first, filling on miss or staleness.
    Cached,
    /// Bypass the cache entirely; every request is a fresh upstream fetch.
    Passthrough,
}

impl ServeMode {
    pub fn is_passthrough(self) -> bool {
        matches!(self, ServeMode::Passthrough)
    }

    /// Human-readable description for startup logging.
    pub fn description(self) -> &'static str {
        match self {
            ServeMode::Cached => "CACHED MODE - upstream with caching",
            ServeMode::Passthrough => "PASSTHROUGH MODE - direct upstream access (no cache)",
        }
    }
}

/// Configuration for a [`CacheService`](crate::service::CacheService).
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct ServiceConfig {
    /// Serving mode (cached vs passthrough).
    pub mode: ServeMode,

    /// Time-to-live for cached entries; also the background refresh interval.
    pub ttl: Duration,

    /// Base URL the fetcher resolves dataset paths against.
    pub upstream_base_url: String,

    /// Timeout applied to each upstream request.
    pub fetch_timeout: Duration,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        Self {
            mode: ServeMode::Cached,
            ttl: Duration::from_secs(15 * 60),
            upstream_base_url: "https://raw.githubusercontent.com/awales0177/test_data/main"
                .to_string(),
            fetch_timeout: Duration::from_secs(30),
        }
    }
}

impl ServiceConfig {
    /// Load configuration from the environment, falling back to defaults for
    /// anything unset or unparseable.
    ///
    /// Recognized variables: `PASSTHROUGH_MODE`, `CACHE_TTL_MINUTES`,
    /// `UPSTREAM_BASE_URL`, `FETCH_TIMEOUT_SECS`.
    pub fn from_env() -> Self {
        let defaults = Self::default();

        let mode = match env::var("PASSTHROUGH_MODE") {
            Ok(value) if value.eq_ignore_ascii_case("true") || value == "1" => {
                ServeMode::Passthrough
            }
            _ => ServeMode::Cached,
        };

        let ttl = Duration::from_secs(env_u64("CACHE_TTL_MINUTES", 15) * 60);
        let fetch_timeout = Duration::from_secs(env_u64(
            "FETCH_TIMEOUT_SECS",
            defaults.fetch_timeout.as_secs(),
        ));
        let upstream_base_url =
            env::var("UPSTREAM_BASE_URL").unwrap_or(defaults.upstream_base_url);

        Self {
            mode,
            ttl,
            upstream_base_url,
            fetch_timeout,
        }
    }
}

fn env_u64(key: &str, default: u64) -> u64 {
    match env::var(key) {
        Ok(value) => value.parse().unwrap_or_else(|_| {
            tracing::warn!("invalid value for {}: {:?}, using {}", key, value, default);
            default
        }),
        Err(_) => default,
    }
}
