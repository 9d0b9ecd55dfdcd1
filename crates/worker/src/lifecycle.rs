//! Worker lifecycle: install-time cache warmup and activate-time cleanup.
//!
//! The host runtime serializes install and activate relative to fetch
//! handling; both signal completion through their returned futures so the
//! host can defer worker replacement until cleanup finishes.

use atomsw_core::{Error, Request, Response};

use crate::engine::SwEngine;

/// Lifecycle states, in order.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WorkerState {
    Installing,
    Installed,
    Activating,
    Activated,
}

impl WorkerState {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Installing => "installing",
            Self::Installed => "installed",
            Self::Activating => "activating",
            Self::Activated => "activated",
        }
    }
}

impl SwEngine {
    /// Install: pre-warm the core cache with the site-shell manifest.
    ///
    /// All-or-nothing: if any asset fetch fails or comes back non-2xx, the
    /// install fails before anything is written. On success the worker
    /// skips waiting, so the caller is expected to activate immediately
    /// rather than waiting for an old worker to wind down.
    pub async fn install(&self) -> Result<(), Error> {
        self.set_state(WorkerState::Installing).await;
        tracing::info!(scope = %self.scope(), "service worker installing");

        let mut warmed: Vec<(Request, Response)> = Vec::with_capacity(self.inner.core_assets.len());
        for asset in &self.inner.core_assets {
            let url = self.scope().join(asset)?;
            let request = Request::get(url);
            match self.inner.network.fetch(&request).await {
                Ok(response) if response.ok() => warmed.push((request, response)),
                Ok(response) => {
                    return Err(Error::InstallFailed(format!("{asset} returned status {}", response.status)));
                }
                Err(err) => return Err(Error::InstallFailed(format!("{asset}: {err}"))),
            }
        }

        self.caches().open_cache(&self.names().core).await?;
        for (request, response) in &warmed {
            self.caches().put(&self.names().core, request, response).await?;
        }

        self.set_state(WorkerState::Installed).await;
        tracing::info!(assets = warmed.len(), "service worker installed, skipping waiting");
        Ok(())
    }

    /// Activate: evict caches belonging to older deploys, then claim open
    /// pages so they are served by this worker without a reload.
    ///
    /// Deletions run as independent tasks; one failure is logged and does
    /// not block the others or the claim step.
    pub async fn activate(&self) -> Result<(), Error> {
        self.set_state(WorkerState::Activating).await;
        tracing::info!("service worker activating");

        let keep = self.names().clone();
        let names = self.caches().cache_names().await?;

        let mut deletions = Vec::new();
        for name in names {
            if name == keep.core || name == keep.runtime {
                continue;
            }
            let caches = self.caches().clone();
            deletions.push(tokio::spawn(async move {
                let result = caches.delete_cache(&name).await;
                (name, result)
            }));
        }

        for deletion in deletions {
            match deletion.await {
                Ok((name, Ok(_))) => tracing::debug!(cache = name, "deleted stale cache"),
                Ok((name, Err(err))) => tracing::warn!(cache = name, error = %err, "failed to delete stale cache"),
                Err(err) => tracing::warn!(error = %err, "stale cache deletion task failed"),
            }
        }

        self.set_state(WorkerState::Activated).await;
        tracing::info!("service worker activated, claiming clients");
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testutil::{MockNetwork, test_engine};
    use atomsw_core::Error;
    use std::sync::Arc;

    fn stock_shell(network: &MockNetwork) {
        for asset in [
            "https://example.com/",
            "https://example.com/index.html",
            "https://example.com/bio",
            "https://example.com/admin",
            "https://example.com/favicon.svg",
            "https://example.com/images/bio/arthur-portfolio.jpg",
        ] {
            network.respond(asset, Response::html("shell"));
        }
    }

    #[tokio::test]
    async fn test_install_warms_core_cache() {
        let network = Arc::new(MockNetwork::new());
        stock_shell(&network);
        let engine = test_engine(Arc::clone(&network)).await;

        engine.install().await.unwrap();

        assert_eq!(engine.state().await, WorkerState::Installed);
        assert_eq!(engine.caches().entry_count("atom-portfolio-v1").await.unwrap(), 6);
    }

    #[tokio::test]
    async fn test_install_all_or_nothing() {
        let network = Arc::new(MockNetwork::new());
        stock_shell(&network);
        // One asset missing from the deploy fails the whole install.
        network.clear("https://example.com/favicon.svg");
        network.fail("https://example.com/favicon.svg");
        let engine = test_engine(Arc::clone(&network)).await;

        let result = engine.install().await;
        assert!(matches!(result, Err(Error::InstallFailed(_))));
        assert_eq!(engine.caches().entry_count("atom-portfolio-v1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_install_rejects_error_status() {
        let network = Arc::new(MockNetwork::new());
        stock_shell(&network);
        network.clear("https://example.com/bio");
        network.respond("https://example.com/bio", Response::new(404));
        let engine = test_engine(Arc::clone(&network)).await;

        let result = engine.install().await;
        assert!(matches!(result, Err(Error::InstallFailed(_))));
    }

    #[tokio::test]
    async fn test_activate_evicts_stale_versions() {
        let network = Arc::new(MockNetwork::new());
        let engine = test_engine(Arc::clone(&network)).await;

        for name in ["atom-portfolio-v0", "atom-portfolio-v1", "atom-runtime", "old-experiment"] {
            engine.caches().open_cache(name).await.unwrap();
        }

        engine.activate().await.unwrap();

        let mut names = engine.caches().cache_names().await.unwrap();
        names.sort();
        assert_eq!(names, vec!["atom-portfolio-v1".to_string(), "atom-runtime".to_string()]);
        assert_eq!(engine.state().await, WorkerState::Activated);
    }

    #[tokio::test]
    async fn test_activate_with_no_stale_caches() {
        let network = Arc::new(MockNetwork::new());
        let engine = test_engine(Arc::clone(&network)).await;

        engine.activate().await.unwrap();
        assert_eq!(engine.state().await, WorkerState::Activated);
    }
}
