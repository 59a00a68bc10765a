// Process-wide guide data cache
// Both datasets load exactly once per process; concurrent callers share a
// single in-flight load and every accessor reads the committed snapshot only

use std::collections::HashMap;
use std::sync::Arc;

use futures::future::{BoxFuture, FutureExt, Shared};
use parking_lot::{Mutex, RwLock};
use thiserror::Error;
use tracing::{error, info};

use crate::fetch::{DataFetcher, FetchError, DESTINATIONS_PATH, PROVINCES_PATH};
use crate::models::{Destination, Province};
use crate::notify::ErrorLog;
use crate::retry::{with_retry, RetryOptions, RetryPolicy};

#[derive(Debug, Clone)]
pub struct StoreConfig {
    pub provinces_path: String,
    pub destinations_path: String,
    pub retry: RetryPolicy,
}

impl Default for StoreConfig {
    fn default() -> Self {
        Self {
            provinces_path: PROVINCES_PATH.to_string(),
            destinations_path: DESTINATIONS_PATH.to_string(),
            retry: RetryPolicy::default(),
        }
    }
}

// Both datasets plus a by-id index, committed to the cache as one unit so no
// reader can ever see provinces without destinations or vice versa
#[derive(Debug)]
pub struct GuideData {
    pub provinces: Vec<Province>,
    pub destinations: Vec<Destination>,
    destination_index: HashMap<String, usize>,
}

impl GuideData {
    fn build(provinces: Vec<Province>, destinations: Vec<Destination>) -> Self {
        let destination_index = destinations
            .iter()
            .enumerate()
            .map(|(i, dest)| (dest.id.clone(), i))
            .collect();

        Self {
            provinces,
            destinations,
            destination_index,
        }
    }

    pub fn destination(&self, id: &str) -> Option<&Destination> {
        self.destination_index.get(id).map(|&i| &self.destinations[i])
    }
}

// Cheap to clone so every waiter on a shared in-flight load gets the same cause
#[derive(Debug, Clone, Error)]
#[error("{0}")]
pub struct LoadError(Arc<FetchError>);

impl LoadError {
    pub fn cause(&self) -> &FetchError {
        &self.0
    }
}

type SharedLoad = Shared<BoxFuture<'static, Result<Arc<GuideData>, LoadError>>>;

struct StoreInner<F> {
    fetcher: Arc<F>,
    config: StoreConfig,
    error_log: Option<Arc<ErrorLog>>,
    cache: RwLock<Option<Arc<GuideData>>>,
    in_flight: Mutex<Option<SharedLoad>>,
}

pub struct DataStore<F> {
    inner: Arc<StoreInner<F>>,
}

impl<F> Clone for DataStore<F> {
    fn clone(&self) -> Self {
        Self {
            inner: self.inner.clone(),
        }
    }
}

impl<F: DataFetcher> DataStore<F> {
    pub fn new(fetcher: F, config: StoreConfig) -> Self {
        Self::build(fetcher, config, None)
    }

    pub fn with_error_log(fetcher: F, config: StoreConfig, error_log: Arc<ErrorLog>) -> Self {
        Self::build(fetcher, config, Some(error_log))
    }

    fn build(fetcher: F, config: StoreConfig, error_log: Option<Arc<ErrorLog>>) -> Self {
        Self {
            inner: Arc::new(StoreInner {
                fetcher: Arc::new(fetcher),
                config,
                error_log,
                cache: RwLock::new(None),
                in_flight: Mutex::new(None),
            }),
        }
    }

    pub fn fetcher(&self) -> &F {
        &self.inner.fetcher
    }

    // Load both datasets, memoized for the life of the process. Concurrent
    // callers while a load is in flight all await the same underlying fetch
    // pair and observe the identical outcome.
    pub async fn load(&self) -> Result<Arc<GuideData>, LoadError> {
        if let Some(data) = self.inner.cache.read().clone() {
            return Ok(data);
        }

        let load = {
            let mut in_flight = self.inner.in_flight.lock();

            // A load may have committed between the cache check above and
            // taking the in-flight lock
            if let Some(data) = self.inner.cache.read().clone() {
                return Ok(data);
            }

            match in_flight.as_ref() {
                Some(load) => load.clone(),
                None => {
                    let load = Self::start_load(self.inner.clone());
                    *in_flight = Some(load.clone());
                    load
                }
            }
        };

        load.await
    }

    fn start_load(inner: Arc<StoreInner<F>>) -> SharedLoad {
        async move {
            let mut options = RetryOptions::new(inner.config.retry.clone()).context("guide data load");
            if let Some(log) = inner.error_log.clone() {
                options = options.on_error(move |err: &FetchError, attempt| {
                    log.record("data load", &format!("attempt {}: {}", attempt, err));
                });
            }

            let fetched = with_retry(|| Self::fetch_pair(inner.clone()), options).await;

            // The in-flight marker is cleared on both paths so a later call
            // can retry after a failure; the cache commit happens first, and
            // the two locks are never held together
            match fetched {
                Ok(data) => {
                    info!(
                        "loaded {} provinces, {} destinations",
                        data.provinces.len(),
                        data.destinations.len()
                    );
                    *inner.cache.write() = Some(data.clone());
                    *inner.in_flight.lock() = None;
                    Ok(data)
                }
                Err(err) => {
                    let err = LoadError(Arc::new(err));
                    error!("guide data load failed: {}", err);
                    *inner.in_flight.lock() = None;
                    Err(err)
                }
            }
        }
        .boxed()
        .shared()
    }

    async fn fetch_pair(inner: Arc<StoreInner<F>>) -> Result<Arc<GuideData>, FetchError> {
        let (provinces_raw, destinations_raw) = futures::future::try_join(
            inner.fetcher.fetch(&inner.config.provinces_path),
            inner.fetcher.fetch(&inner.config.destinations_path),
        )
        .await?;

        let provinces: Vec<Province> =
            serde_json::from_slice(&provinces_raw).map_err(|source| FetchError::Decode {
                path: inner.config.provinces_path.clone(),
                source,
            })?;

        let destinations: Vec<Destination> =
            serde_json::from_slice(&destinations_raw).map_err(|source| FetchError::Decode {
                path: inner.config.destinations_path.clone(),
                source,
            })?;

        Ok(Arc::new(GuideData::build(provinces, destinations)))
    }

    pub fn is_loaded(&self) -> bool {
        self.inner.cache.read().is_some()
    }

    pub fn snapshot(&self) -> Option<Arc<GuideData>> {
        self.inner.cache.read().clone()
    }

    // The accessors below never trigger a fetch; before the first successful
    // load they return empty results

    pub fn provinces(&self) -> Vec<Province> {
        self.snapshot()
            .map(|data| data.provinces.clone())
            .unwrap_or_default()
    }

    pub fn destinations(&self) -> Vec<Destination> {
        self.snapshot()
            .map(|data| data.destinations.clone())
            .unwrap_or_default()
    }

    pub fn destinations_by_province(&self, province_id: &str) -> Vec<Destination> {
        self.snapshot()
            .map(|data| {
                data.destinations
                    .iter()
                    .filter(|dest| dest.province_id == province_id)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }

    pub fn destination_by_id(&self, id: &str) -> Option<Destination> {
        self.snapshot().and_then(|data| data.destination(id).cloned())
    }

    pub fn open_destinations(&self) -> Vec<Destination> {
        self.snapshot()
            .map(|data| {
                data.destinations
                    .iter()
                    .filter(|dest| dest.is_open)
                    .cloned()
                    .collect()
            })
            .unwrap_or_default()
    }
}
