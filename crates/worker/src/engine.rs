//! The request-handling engine: classification dispatch and the three
//! caching strategies.
//!
//! One engine is constructed per worker instance with its dependencies
//! injected (cache database, network fetcher). Cloning is cheap; all
//! clones share state, which lets background refreshes outlive the request
//! that started them.

use std::sync::Arc;

use atomsw_core::{AppConfig, CacheDb, CacheNames, Error, Request, Response, is_cacheable};
use tokio::sync::RwLock;
use tokio::task::JoinHandle;
use url::Url;

use crate::fetch::Network;
use crate::lifecycle::WorkerState;
use crate::offline;
use crate::routes::{Router, Strategy};

/// The service-worker engine.
///
/// [`SwEngine::handle`] is the single entry point the host event loop
/// adapts its fetch events onto; install/activate live in
/// [`crate::lifecycle`] and the health payload in [`crate::health`].
#[derive(Clone)]
pub struct SwEngine {
    pub(crate) inner: Arc<EngineInner>,
}

pub(crate) struct EngineInner {
    pub(crate) caches: CacheDb,
    pub(crate) network: Arc<dyn Network>,
    pub(crate) router: Router,
    pub(crate) names: CacheNames,
    pub(crate) scope: Url,
    pub(crate) core_assets: Vec<String>,
    pub(crate) state: RwLock<WorkerState>,
}

impl SwEngine {
    pub fn new(caches: CacheDb, network: Arc<dyn Network>, config: &AppConfig) -> Result<Self, Error> {
        let scope = config.scope_url().map_err(|e| Error::InvalidUrl(e.to_string()))?;

        Ok(Self {
            inner: Arc::new(EngineInner {
                caches,
                network,
                router: Router::new(),
                names: config.cache_names(),
                scope,
                core_assets: config.core_assets.clone(),
                state: RwLock::new(WorkerState::Installing),
            }),
        })
    }

    pub fn caches(&self) -> &CacheDb {
        &self.inner.caches
    }

    pub fn names(&self) -> &CacheNames {
        &self.inner.names
    }

    pub fn scope(&self) -> &Url {
        &self.inner.scope
    }

    pub async fn state(&self) -> WorkerState {
        *self.inner.state.read().await
    }

    pub(crate) async fn set_state(&self, state: WorkerState) {
        *self.inner.state.write().await = state;
    }

    /// Handle one intercepted request.
    ///
    /// Returns `Ok(None)` for requests the worker does not intercept
    /// (non-GET, non-http schemes); the host passes those through to
    /// default network handling untouched.
    pub async fn handle(&self, request: &Request) -> Result<Option<Response>, Error> {
        let Some(strategy) = self.inner.router.classify(request) else {
            return Ok(None);
        };

        tracing::trace!(url = %request.url, ?strategy, "classified request");

        let response = match strategy {
            Strategy::Health => self.health().await,
            Strategy::NetworkFirst => self.network_first(request).await?,
            Strategy::CacheFirst => self.cache_first(request).await?,
            Strategy::StaleWhileRevalidate => self.stale_while_revalidate(request).await?,
        };

        Ok(Some(response))
    }

    /// Network-first: live fetch, falling back to any cached entry, then
    /// to the offline page for navigations. Successful responses are
    /// written behind to the runtime cache without blocking the caller.
    async fn network_first(&self, request: &Request) -> Result<Response, Error> {
        match self.inner.network.fetch(request).await {
            Ok(response) => {
                if is_cacheable(request, &response) {
                    self.spawn_put(self.inner.names.runtime.clone(), request.clone(), response.clone());
                }
                Ok(response)
            }
            Err(err) => {
                tracing::debug!(url = %request.url, error = %err, "network failed, trying cache");

                if let Some(entry) = self.inner.caches.lookup_any(&request.cache_key()).await? {
                    return Ok(entry.into_response());
                }
                if request.is_navigation() {
                    return Ok(offline::offline_response());
                }
                Err(err)
            }
        }
    }

    /// Cache-first: serve a hit immediately and refresh it in the
    /// background; on a miss, fetch and cache. A total miss propagates the
    /// network error, except for navigations which get the offline page.
    /// Range requests bypass the cache entirely so media seeking is never
    /// answered with a full cached body.
    async fn cache_first(&self, request: &Request) -> Result<Response, Error> {
        if request.has_range() {
            return self.inner.network.fetch(request).await;
        }

        if let Some(entry) = self.inner.caches.lookup_any(&request.cache_key()).await? {
            let _ = self.spawn_refresh(self.inner.names.runtime.clone(), request.clone());
            return Ok(entry.into_response());
        }

        match self.inner.network.fetch(request).await {
            Ok(response) => {
                // The write must never fail a response that is about to be served.
                if is_cacheable(request, &response) {
                    self.spawn_put(self.inner.names.runtime.clone(), request.clone(), response.clone());
                }
                Ok(response)
            }
            Err(err) => {
                tracing::debug!(url = %request.url, error = %err, "failed to fetch and cache");
                if request.is_navigation() {
                    return Ok(offline::offline_response());
                }
                Err(err)
            }
        }
    }

    /// Stale-while-revalidate: the cache lookup and the network fetch
    /// start together. A cached entry is served at once while the fetch
    /// lands in the core cache; on a miss, the fetch result is awaited and
    /// a failure falls back to the offline page.
    async fn stale_while_revalidate(&self, request: &Request) -> Result<Response, Error> {
        // Revalidation writes the core cache, not runtime.
        let revalidate = self.spawn_refresh(self.inner.names.core.clone(), request.clone());

        if let Some(entry) = self.inner.caches.lookup_any(&request.cache_key()).await? {
            return Ok(entry.into_response());
        }

        match revalidate.await {
            Ok(Ok(response)) => Ok(response),
            Ok(Err(err)) => {
                tracing::debug!(url = %request.url, error = %err, "network and cache both unavailable");
                Ok(offline::offline_response())
            }
            Err(err) => {
                tracing::debug!(url = %request.url, error = %err, "revalidation task failed");
                Ok(offline::offline_response())
            }
        }
    }

    /// Write a captured response in the background. Errors are logged and
    /// discarded; the primary response has already been served.
    fn spawn_put(&self, cache: String, request: Request, response: Response) {
        let caches = self.inner.caches.clone();
        tokio::spawn(async move {
            if let Err(err) = caches.put(&cache, &request, &response).await {
                tracing::debug!(cache, url = %request.url, error = %err, "background cache write failed");
            }
        });
    }

    /// Re-fetch a request in the background and refresh its cache entry if
    /// the new response is cacheable. Runs to completion independent of
    /// the originating request; errors are logged either way, and a caller
    /// that still wants the fetched response can await the handle.
    fn spawn_refresh(&self, cache: String, request: Request) -> JoinHandle<Result<Response, Error>> {
        let caches = self.inner.caches.clone();
        let network = Arc::clone(&self.inner.network);
        tokio::spawn(async move {
            let response = match network.fetch(&request).await {
                Ok(response) => response,
                Err(err) => {
                    tracing::debug!(cache, url = %request.url, error = %err, "background refresh failed");
                    return Err(err);
                }
            };
            if is_cacheable(&request, &response)
                && let Err(err) = caches.put(&cache, &request, &response).await
            {
                tracing::debug!(cache, url = %request.url, error = %err, "background cache write failed");
            }
            Ok(response)
        })
    }
}
