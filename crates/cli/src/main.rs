//! atom-sw entry point.
//!
//! Boots the worker engine against the configured origin, runs the
//! install/activate lifecycle, then drives one fetch through the engine
//! per URL argument and reports how each was served. Logging goes to
//! stderr so piped output stays clean.

use std::sync::Arc;

use anyhow::{Context, Result};
use tracing_subscriber::EnvFilter;

use atomsw_core::{AppConfig, CacheDb, Request};
use atomsw_worker::{HttpNetwork, SwEngine};

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_writer(std::io::stderr)
        .init();

    let config = AppConfig::load().context("failed to load configuration")?;
    let scope = config.scope_url().context("invalid scope")?;

    tracing::info!(scope = %scope, db = %config.db_path.display(), "starting atom-sw");

    let caches = CacheDb::open(&config.db_path).await.context("failed to open cache database")?;
    let network = Arc::new(HttpNetwork::new(&config.user_agent, config.timeout(), &scope)?);
    let engine = SwEngine::new(caches, network, &config)?;

    // A failed install leaves any previous deploy's caches serving; the
    // worker still activates so fetch handling is not blocked.
    if let Err(err) = engine.install().await {
        tracing::error!(error = %err, "install failed, continuing with existing caches");
    }
    engine.activate().await?;

    for arg in std::env::args().skip(1) {
        let url = match url::Url::parse(&arg) {
            Ok(url) => url,
            Err(_) => scope.join(&arg).with_context(|| format!("cannot resolve {arg}"))?,
        };

        let request = Request::get(url.clone());
        match engine.handle(&request).await {
            Ok(Some(response)) => {
                println!("{url} -> {} ({} bytes)", response.status, response.body.len());
            }
            Ok(None) => println!("{url} -> passed through"),
            Err(err) => println!("{url} -> error: {err}"),
        }
    }

    Ok(())
}
