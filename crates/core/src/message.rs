//! HTTP request/response model for the worker.
//!
//! The engine never talks to an HTTP client directly; it operates on these
//! plain structs so a network fetcher can be injected (and mocked in tests).
//! Header lookup is case-insensitive and never panics: a header the engine
//! cannot see is treated as absent.

use std::collections::BTreeMap;

use bytes::Bytes;
use serde::{Deserialize, Serialize};
use url::Url;

/// HTTP request method. Only GET requests are intercepted by the worker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum Method {
    Get,
    Head,
    Post,
    Put,
    Delete,
    Patch,
    Options,
}

impl Method {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Get => "GET",
            Self::Head => "HEAD",
            Self::Post => "POST",
            Self::Put => "PUT",
            Self::Delete => "DELETE",
            Self::Patch => "PATCH",
            Self::Options => "OPTIONS",
        }
    }
}

/// How the request was initiated.
///
/// `Navigate` marks top-level page navigations; those are the only requests
/// that fall back to the synthesized offline page when both network and
/// cache are unavailable.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum RequestMode {
    Navigate,
    SameOrigin,
    Cors,
    #[default]
    NoCors,
}

/// An intercepted request.
#[derive(Debug, Clone)]
pub struct Request {
    pub method: Method,
    pub url: Url,
    pub headers: BTreeMap<String, String>,
    pub mode: RequestMode,
}

impl Request {
    /// Create a GET request for the given URL.
    pub fn get(url: Url) -> Self {
        Self { method: Method::Get, url, headers: BTreeMap::new(), mode: RequestMode::NoCors }
    }

    /// Create a navigation (page-load) GET request.
    pub fn navigate(url: Url) -> Self {
        Self { method: Method::Get, url, headers: BTreeMap::new(), mode: RequestMode::Navigate }
    }

    /// Attach a header, replacing any previous value for the same name.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Whether this request carries a byte-range header.
    pub fn has_range(&self) -> bool {
        self.header("range").is_some()
    }

    /// Whether this is a page navigation.
    pub fn is_navigation(&self) -> bool {
        self.mode == RequestMode::Navigate
    }

    /// Storage key for this request: method + full URL, query significant.
    pub fn cache_key(&self) -> String {
        crate::cache::hash::compute_cache_key(self.method.as_str(), self.url.as_str())
    }
}

/// Response type taxonomy as seen by the worker.
///
/// Opaque responses come from cross-origin fetches that did not grant CORS
/// access; their contents cannot be inspected, so they are never cached.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum ResponseKind {
    /// Same-origin response.
    Basic,
    /// Cross-origin response with explicit CORS access.
    Cors,
    /// Cross-origin response without CORS access.
    Opaque,
}

impl ResponseKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Basic => "basic",
            Self::Cors => "cors",
            Self::Opaque => "opaque",
        }
    }

    /// Parse a stored kind string; unknown values degrade to `Opaque`,
    /// which the cacheability policy rejects.
    pub fn parse(s: &str) -> Self {
        match s {
            "basic" => Self::Basic,
            "cors" => Self::Cors,
            _ => Self::Opaque,
        }
    }
}

/// A captured response: status, headers, and full body.
#[derive(Debug, Clone)]
pub struct Response {
    pub status: u16,
    pub headers: BTreeMap<String, String>,
    pub body: Bytes,
    pub kind: ResponseKind,
}

impl Response {
    /// Create an empty same-origin response with the given status.
    pub fn new(status: u16) -> Self {
        Self { status, headers: BTreeMap::new(), body: Bytes::new(), kind: ResponseKind::Basic }
    }

    /// Attach a header, replacing any previous value for the same name.
    pub fn with_header(mut self, name: &str, value: &str) -> Self {
        self.headers.insert(name.to_string(), value.to_string());
        self
    }

    pub fn with_body(mut self, body: impl Into<Bytes>) -> Self {
        self.body = body.into();
        self
    }

    pub fn with_kind(mut self, kind: ResponseKind) -> Self {
        self.kind = kind;
        self
    }

    /// Case-insensitive header lookup.
    pub fn header(&self, name: &str) -> Option<&str> {
        self.headers
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(name))
            .map(|(_, v)| v.as_str())
    }

    /// Whether the status is in the 2xx range.
    pub fn ok(&self) -> bool {
        (200..300).contains(&self.status)
    }

    /// Build a 200 JSON response from a serializable value.
    pub fn json(value: &serde_json::Value) -> Self {
        let body = serde_json::to_vec_pretty(value).unwrap_or_else(|_| b"{}".to_vec());
        Self::new(200)
            .with_header("Content-Type", "application/json")
            .with_body(body)
    }

    /// Build a 200 HTML response.
    pub fn html(body: &str) -> Self {
        Self::new(200)
            .with_header("Content-Type", "text/html")
            .with_body(body.as_bytes().to_vec())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn url(s: &str) -> Url {
        Url::parse(s).unwrap()
    }

    #[test]
    fn test_header_lookup_case_insensitive() {
        let request = Request::get(url("https://example.com/")).with_header("Range", "bytes=0-99");
        assert_eq!(request.header("range"), Some("bytes=0-99"));
        assert_eq!(request.header("RANGE"), Some("bytes=0-99"));
        assert!(request.header("content-range").is_none());
        assert!(request.has_range());
    }

    #[test]
    fn test_cache_key_query_significant() {
        let a = Request::get(url("https://example.com/page?v=1")).cache_key();
        let b = Request::get(url("https://example.com/page?v=2")).cache_key();
        assert_ne!(a, b);
    }

    #[test]
    fn test_cache_key_method_significant() {
        let get = Request::get(url("https://example.com/page"));
        let mut head = get.clone();
        head.method = Method::Head;
        assert_ne!(get.cache_key(), head.cache_key());
    }

    #[test]
    fn test_navigation_mode() {
        assert!(Request::navigate(url("https://example.com/")).is_navigation());
        assert!(!Request::get(url("https://example.com/")).is_navigation());
    }

    #[test]
    fn test_response_ok_range() {
        assert!(Response::new(200).ok());
        assert!(Response::new(204).ok());
        assert!(!Response::new(301).ok());
        assert!(!Response::new(404).ok());
    }

    #[test]
    fn test_response_json_headers() {
        let response = Response::json(&serde_json::json!({"status": "healthy"}));
        assert_eq!(response.status, 200);
        assert_eq!(response.header("content-type"), Some("application/json"));
        assert!(String::from_utf8_lossy(&response.body).contains("healthy"));
    }

    #[test]
    fn test_response_kind_roundtrip() {
        assert_eq!(ResponseKind::parse("basic"), ResponseKind::Basic);
        assert_eq!(ResponseKind::parse("cors"), ResponseKind::Cors);
        assert_eq!(ResponseKind::parse("garbage"), ResponseKind::Opaque);
    }
}
