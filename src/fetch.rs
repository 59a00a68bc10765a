// Dataset fetching
// The loader talks to a DataFetcher seam; the HTTP implementation keeps the
// last good payload per path so a dead network can still serve stale data

use std::time::Duration;

use async_trait::async_trait;
use bytes::Bytes;
use dashmap::DashMap;
use thiserror::Error;
use tracing::{debug, warn};

pub const PROVINCES_PATH: &str = "data/provinces.json";
pub const DESTINATIONS_PATH: &str = "data/destinations.json";

pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(10);

#[derive(Debug, Error)]
pub enum FetchError {
    #[error("network error fetching {path}: {source}")]
    Transport {
        path: String,
        #[source]
        source: reqwest::Error,
    },

    #[error("request for {path} returned status {status}")]
    Status { path: String, status: u16 },

    #[error("invalid JSON in {path}: {source}")]
    Decode {
        path: String,
        #[source]
        source: serde_json::Error,
    },
}

// Supplies raw dataset bytes for a relative path
#[async_trait]
pub trait DataFetcher: Send + Sync + 'static {
    async fn fetch(&self, path: &str) -> Result<Bytes, FetchError>;
}

pub struct HttpFetcher {
    client: reqwest::Client,
    base_url: String,
    // Last successful payload per path, served when the network is unreachable
    offline_cache: DashMap<String, Bytes>,
}

impl HttpFetcher {
    pub fn new(base_url: impl Into<String>) -> Result<Self, reqwest::Error> {
        Self::with_timeout(base_url, DEFAULT_TIMEOUT)
    }

    pub fn with_timeout(
        base_url: impl Into<String>,
        timeout: Duration,
    ) -> Result<Self, reqwest::Error> {
        let client = reqwest::Client::builder().timeout(timeout).build()?;

        Ok(Self {
            client,
            base_url: base_url.into(),
            offline_cache: DashMap::new(),
        })
    }

    fn url_for(&self, path: &str) -> String {
        format!(
            "{}/{}",
            self.base_url.trim_end_matches('/'),
            path.trim_start_matches('/')
        )
    }
}

#[async_trait]
impl DataFetcher for HttpFetcher {
    async fn fetch(&self, path: &str) -> Result<Bytes, FetchError> {
        let url = self.url_for(path);

        match self.client.get(&url).send().await {
            Ok(response) if response.status().is_success() => {
                let body = response
                    .bytes()
                    .await
                    .map_err(|source| FetchError::Transport {
                        path: path.to_string(),
                        source,
                    })?;

                self.offline_cache.insert(path.to_string(), body.clone());
                debug!("fetched {} ({} bytes)", url, body.len());

                Ok(body)
            }
            // Non-success responses are not cached and never fall back
            Ok(response) => Err(FetchError::Status {
                path: path.to_string(),
                status: response.status().as_u16(),
            }),
            Err(source) => {
                if let Some(cached) = self.offline_cache.get(path) {
                    warn!("network fetch of {} failed, serving cached copy: {}", url, source);
                    return Ok(cached.clone());
                }

                Err(FetchError::Transport {
                    path: path.to_string(),
                    source,
                })
            }
        }
    }
}

// In-memory fetcher for tests and benches; can simulate the same failure
// shapes as the HTTP implementation
pub mod mock {
    use std::collections::HashMap;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    use bytes::Bytes;
    use parking_lot::Mutex;

    use super::{DataFetcher, FetchError};

    #[derive(Default)]
    pub struct MockFetcher {
        responses: Mutex<HashMap<String, Bytes>>,
        request_count: AtomicUsize,
        fail_next_requests: AtomicUsize,
        delay_ms: AtomicUsize,
    }

    impl MockFetcher {
        pub fn new() -> Self {
            Self::default()
        }

        pub fn add_response(&self, path: &str, body: impl Into<Bytes>) {
            self.responses.lock().insert(path.to_string(), body.into());
        }

        pub fn set_delay(&self, delay_ms: usize) {
            self.delay_ms.store(delay_ms, Ordering::SeqCst);
        }

        pub fn fail_next_requests(&self, count: usize) {
            self.fail_next_requests.store(count, Ordering::SeqCst);
        }

        pub fn request_count(&self) -> usize {
            self.request_count.load(Ordering::SeqCst)
        }
    }

    #[async_trait::async_trait]
    impl DataFetcher for MockFetcher {
        async fn fetch(&self, path: &str) -> Result<Bytes, FetchError> {
            self.request_count.fetch_add(1, Ordering::SeqCst);

            let delay = self.delay_ms.load(Ordering::SeqCst);
            if delay > 0 {
                tokio::time::sleep(Duration::from_millis(delay as u64)).await;
            }

            let fail_count = self.fail_next_requests.load(Ordering::SeqCst);
            if fail_count > 0 {
                self.fail_next_requests.store(fail_count - 1, Ordering::SeqCst);
                return Err(FetchError::Status {
                    path: path.to_string(),
                    status: 500,
                });
            }

            self.responses
                .lock()
                .get(path)
                .cloned()
                .ok_or_else(|| FetchError::Status {
                    path: path.to_string(),
                    status: 404,
                })
        }
    }
}
