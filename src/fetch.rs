use crate::error::FetchError;
use async_trait::async_trait;
use serde_json::Value;
use std::time::Duration;

/// Retrieves a dataset document from the upstream source.
///
/// Pure I/O, no state. Implementations must be safe to share across request
/// handlers and the background refresh loop.
#[async_trait]
pub trait DatasetFetcher: Send + Sync + 'static {
    /// Fetch and decode the document at the given upstream-relative path.
    async fn fetch(&self, path: &str) -> Result<Value, FetchError>;
}

/// HTTP fetcher resolving dataset paths against a base URL.
#[derive(Debug, Clone)]
pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: String,
}

impl HttpFetcher {
    /// Build a fetcher with the given base URL and per-request timeout.
    pub fn new(base_url: impl Into<String>, timeout: Duration) -> Result<Self, FetchError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let base_url: String = base_url.into();
        Ok(Self {
            client,
            base_url: base_url.trim_end_matches('/').to_string(),
        })
    }

    fn url_for(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }
}

#[async_trait]
impl DatasetFetcher for HttpFetcher {
    async fn fetch(&self, path: &str) -> Result<Value, FetchError> {
        let url = self.url_for(path);
        tracing::debug!("fetching upstream document: {}", url);

        let response = self
            .client
            .get(&url)
            .send()
            .await
            .map_err(|e| FetchError::Transport(e.to_string()))?;

        let status = response.status();
        if status == reqwest::StatusCode::NOT_FOUND {
            return Err(FetchError::NotFound(path.to_string()));
        }
        if !status.is_success() {
            return Err(FetchError::Status {
                path: path.to_string(),
                status: status.as_u16(),
            });
        }

        response
            .json::<Value>()
            .await
            .map_err(|e| FetchError::Decode {
                path: path.to_string(),
                reason: e.to_string(),
            })
    }
}
