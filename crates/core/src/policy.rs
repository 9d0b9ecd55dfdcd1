//! Cacheability policy: the single predicate guarding every cache write.

use crate::message::{Request, Response, ResponseKind};

/// Decide whether a request/response pair is safe to persist.
///
/// Returns false for:
/// - requests carrying a byte-range header (media seeking must never be
///   served a full cached body);
/// - any status other than 200 (no redirects, partial content, or errors);
/// - opaque cross-origin responses (neither basic nor cors);
/// - responses carrying a `Content-Range` header.
///
/// Side-effect free and safe to call redundantly; recomputed on every
/// write attempt, never persisted.
pub fn is_cacheable(request: &Request, response: &Response) -> bool {
    if request.has_range() {
        return false;
    }

    if response.status != 200 {
        return false;
    }

    if !matches!(response.kind, ResponseKind::Basic | ResponseKind::Cors) {
        return false;
    }

    if response.header("content-range").is_some() {
        return false;
    }

    true
}
