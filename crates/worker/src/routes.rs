//! Request classification: URL pattern to caching strategy.
//!
//! An explicit ordered rule list, first match wins. Classification is a
//! pure function of the request method and URL; it performs no I/O and is
//! total for GET requests within the worker's reach.

use atomsw_core::{Method, Request};
use regex::RegexSet;

/// Exact path served by the in-worker health handler.
pub const HEALTH_PATH: &str = "/api/health";

/// Dynamic content: always try the network first.
const NETWORK_FIRST_PATTERNS: &[&str] = &[r"/api/", r"/admin"];

/// Versioned build assets, images, and project pages: cache-first.
const RUNTIME_PATTERNS: &[&str] = &[
    r"/_astro/.+\.(js|css)$",
    r"/images/.+\.(webp|jpg|png|svg)$",
    r"/projects/.+",
];

/// The handling strategy a request classifies onto.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    Health,
    NetworkFirst,
    CacheFirst,
    StaleWhileRevalidate,
}

/// Ordered request classifier.
pub struct Router {
    network_first: RegexSet,
    runtime: RegexSet,
}

impl Router {
    pub fn new() -> Self {
        Self {
            network_first: RegexSet::new(NETWORK_FIRST_PATTERNS).unwrap(),
            runtime: RegexSet::new(RUNTIME_PATTERNS).unwrap(),
        }
    }

    /// Classify a request, or return `None` for requests the worker does
    /// not intercept at all (non-GET methods, non-http(s) schemes such as
    /// browser extensions).
    ///
    /// Rules, first match wins:
    /// 1. exact health-check path
    /// 2. network-first patterns (API, admin)
    /// 3. runtime asset patterns (build assets, images, project pages)
    /// 4. navigation-like paths (`.html` or trailing `/`)
    /// 5. default: network-first
    pub fn classify(&self, request: &Request) -> Option<Strategy> {
        if request.method != Method::Get {
            return None;
        }
        if !matches!(request.url.scheme(), "http" | "https") {
            return None;
        }

        let path = request.url.path();

        if path == HEALTH_PATH {
            return Some(Strategy::Health);
        }
        if self.network_first.is_match(path) {
            return Some(Strategy::NetworkFirst);
        }
        if self.runtime.is_match(path) {
            return Some(Strategy::CacheFirst);
        }
        if path.ends_with(".html") || path.ends_with('/') {
            return Some(Strategy::StaleWhileRevalidate);
        }

        Some(Strategy::NetworkFirst)
    }
}

impl Default for Router {
    fn default() -> Self {
        Self::new()
    }
}
