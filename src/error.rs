use thiserror::Error;

/// Failures raised by the upstream fetcher.
#[derive(Error, Debug)]
pub enum FetchError {
    #[error("dataset not found upstream: {0}")]
    NotFound(String),

    #[error("upstream returned status {status} for {path}")]
    Status { path: String, status: u16 },

    #[error("transport error: {0}")]
    Transport(String),

    #[error("failed to decode upstream payload for {path}: {reason}")]
    Decode { path: String, reason: String },
}

/// Failures surfaced by the access facade.
#[derive(Error, Debug)]
pub enum ServiceError {
    /// The requested name is not in the dataset registry. Client error,
    /// never retried.
    #[error("unknown dataset: {0}")]
    UnknownDataset(String),

    /// The upstream fetch failed. Server error; only the background refresh
    /// loop gets an implicit retry on its next tick.
    #[error("upstream unavailable: {0}")]
    Upstream(#[from] FetchError),

    /// Guard against an entry observed mid-write. Should not occur.
    #[error("invalid cache state: {0}")]
    InvalidState(String),
}
