//! Network fetcher abstraction and the reqwest-backed implementation.
//!
//! The engine never calls an HTTP client directly; it goes through the
//! [`Network`] trait so tests can script outcomes without sockets.

use std::collections::BTreeMap;
use std::time::{Duration, Instant};

use async_trait::async_trait;
use atomsw_core::{Error, Method, Request, Response, ResponseKind};
use url::{Origin, Url};

/// A network fetcher: one request in, one captured response out.
///
/// Implementations must be safe to call concurrently; every fetch is an
/// independent operation with no shared mutable state.
#[async_trait]
pub trait Network: Send + Sync {
    async fn fetch(&self, request: &Request) -> Result<Response, Error>;
}

/// Production fetcher over reqwest.
pub struct HttpNetwork {
    http: reqwest::Client,
    scope_origin: Origin,
}

impl HttpNetwork {
    /// Build a fetcher for the given worker scope.
    pub fn new(user_agent: &str, timeout: Duration, scope: &Url) -> Result<Self, Error> {
        let http = reqwest::Client::builder()
            .user_agent(user_agent)
            .timeout(timeout)
            .use_rustls_tls()
            .gzip(true)
            .brotli(true)
            .deflate(true)
            .build()
            .map_err(|e| Error::Network(format!("failed to build HTTP client: {e}")))?;

        Ok(Self { http, scope_origin: scope.origin() })
    }

    /// Classify the response the way the fetch spec does: same-origin is
    /// basic, cross-origin with CORS access is cors, anything else is
    /// opaque (and therefore never cacheable).
    fn classify(&self, final_url: &Url, headers: &BTreeMap<String, String>) -> ResponseKind {
        if final_url.origin() == self.scope_origin {
            ResponseKind::Basic
        } else if headers.keys().any(|k| k.eq_ignore_ascii_case("access-control-allow-origin")) {
            ResponseKind::Cors
        } else {
            ResponseKind::Opaque
        }
    }
}

fn to_reqwest_method(method: Method) -> reqwest::Method {
    match method {
        Method::Get => reqwest::Method::GET,
        Method::Head => reqwest::Method::HEAD,
        Method::Post => reqwest::Method::POST,
        Method::Put => reqwest::Method::PUT,
        Method::Delete => reqwest::Method::DELETE,
        Method::Patch => reqwest::Method::PATCH,
        Method::Options => reqwest::Method::OPTIONS,
    }
}

#[async_trait]
impl Network for HttpNetwork {
    async fn fetch(&self, request: &Request) -> Result<Response, Error> {
        let start = Instant::now();

        let mut builder = self.http.request(to_reqwest_method(request.method), request.url.clone());
        for (name, value) in &request.headers {
            builder = builder.header(name, value);
        }

        let response = builder.send().await.map_err(|e| Error::Network(e.to_string()))?;

        let status = response.status().as_u16();
        let final_url = response.url().clone();

        let mut headers = BTreeMap::new();
        for (name, value) in response.headers() {
            if let Ok(v) = value.to_str() {
                headers.insert(name.as_str().to_string(), v.to_string());
            }
        }

        let body = response.bytes().await.map_err(|e| Error::Network(e.to_string()))?;
        let kind = self.classify(&final_url, &headers);

        tracing::debug!(
            url = %request.url,
            status,
            elapsed_ms = start.elapsed().as_millis() as u64,
            bytes = body.len(),
            "network fetch"
        );

        Ok(Response { status, headers, body, kind })
    }
}
