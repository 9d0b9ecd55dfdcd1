//! Health reporting: the worker's own health endpoint plus the richer
//! edge-function variant served outside the worker's cache pipeline.

use std::time::Instant;

use atomsw_core::{Request, Response};

use crate::engine::SwEngine;

impl SwEngine {
    /// Build the worker-side health payload: lifecycle state plus live
    /// entry counts for both caches. Counts are best-effort; a cache that
    /// has never been opened reports zero rather than failing the probe.
    pub(crate) async fn health(&self) -> Response {
        let names = self.names();
        let core_entries = self.caches().entry_count(&names.core).await.unwrap_or(0);
        let runtime_entries = self.caches().entry_count(&names.runtime).await.unwrap_or(0);

        let payload = serde_json::json!({
            "status": "healthy",
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "serviceWorker": {
                "scope": self.scope().as_str(),
                "state": self.state().await.as_str(),
            },
            "cache": {
                "core": core_entries,
                "runtime": runtime_entries,
            },
        });

        Response::json(&payload).with_header("Cache-Control", "no-cache")
    }
}

/// The edge health endpoint.
///
/// Deployed alongside the site rather than inside the worker, so it stays
/// reachable when the worker is broken. Reports process uptime and, on
/// request, a few echoed client headers for debugging.
pub struct EdgeHealth {
    started: Instant,
    environment: String,
}

impl EdgeHealth {
    pub fn new(environment: impl Into<String>) -> Self {
        Self { started: Instant::now(), environment: environment.into() }
    }

    pub fn handle(&self, request: &Request) -> Response {
        let detailed = request
            .url
            .query_pairs()
            .any(|(k, v)| k == "detailed" && v == "true");

        let mut payload = serde_json::json!({
            "status": "healthy",
            "timestamp": chrono::Utc::now().to_rfc3339(),
            "uptimeMs": self.started.elapsed().as_millis() as u64,
            "version": env!("CARGO_PKG_VERSION"),
            "environment": self.environment,
        });

        if detailed && let Some(map) = payload.as_object_mut() {
            map.insert(
                "client".into(),
                serde_json::json!({
                    "userAgent": request.header("user-agent"),
                    "acceptLanguage": request.header("accept-language"),
                    "referer": request.header("referer"),
                }),
            );
        }

        Response::json(&payload)
            .with_header("Cache-Control", "no-cache, no-store, must-revalidate")
            .with_header("Access-Control-Allow-Origin", "*")
            .with_header("Access-Control-Allow-Methods", "GET, OPTIONS")
            .with_header("Access-Control-Allow-Headers", "Content-Type")
    }
}
