//! The synthetic offline page served when a navigation cannot be satisfied
//! from either the network or the caches.

use atomsw_core::Response;

/// Fully self-contained: inline styles only, since no subresource can be
/// assumed fetchable when this page is served.
const OFFLINE_PAGE: &str = r#"<!DOCTYPE html>
<html lang="en">
<head>
    <meta charset="UTF-8">
    <meta name="viewport" content="width=device-width, initial-scale=1.0">
    <title>Offline - Portfolio</title>
    <style>
        body {
            font-family: system-ui, -apple-system, sans-serif;
            display: flex;
            justify-content: center;
            align-items: center;
            min-height: 100vh;
            margin: 0;
            background: #f5f5f5;
            color: #333;
        }
        .offline-container {
            text-align: center;
            padding: 2rem;
            max-width: 400px;
        }
        .offline-icon {
            font-size: 4rem;
            margin-bottom: 1rem;
        }
        h1 { margin: 0 0 0.5rem; font-size: 1.5rem; }
        p { margin: 0 0 1.5rem; color: #666; }
        button {
            background: #0066cc;
            color: white;
            border: none;
            padding: 0.75rem 1.5rem;
            border-radius: 6px;
            font-size: 1rem;
            cursor: pointer;
        }
        button:hover { background: #0052a3; }
    </style>
</head>
<body>
    <div class="offline-container">
        <div class="offline-icon">&#128225;</div>
        <h1>You're Offline</h1>
        <p>It looks like you've lost your internet connection. Some pages may still be available from cache.</p>
        <button onclick="window.location.reload()">Try Again</button>
    </div>
</body>
</html>"#;

/// Build the offline fallback response. Served with a success status so
/// the page renders instead of triggering browser error handling, but
/// marked uncacheable so it never shadows the real page once connectivity
/// returns.
pub fn offline_response() -> Response {
    Response::html(OFFLINE_PAGE).with_header("Cache-Control", "no-cache")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offline_response_shape() {
        let response = offline_response();
        assert_eq!(response.status, 200);
        assert_eq!(response.header("content-type"), Some("text/html"));
        assert_eq!(response.header("cache-control"), Some("no-cache"));

        let body = String::from_utf8_lossy(&response.body);
        assert!(body.contains("You're Offline"));
        assert!(body.contains("window.location.reload()"));
    }
}
