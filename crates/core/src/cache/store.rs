//! Named-cache operations: open, put, lookup, and whole-cache eviction.
//!
//! This is the storage contract the caching strategies run against. Writes
//! are atomic replace-by-key, so a concurrent reader sees either the old
//! entry or the new one, never a partial row.

use std::collections::BTreeMap;

use super::connection::CacheDb;
use crate::Error;
use crate::message::{Request, Response, ResponseKind};
use bytes::Bytes;
use serde::{Deserialize, Serialize};
use tokio_rusqlite::params;
use tokio_rusqlite::rusqlite;

/// A stored request/response pair.
///
/// Entries are immutable once written; a later put for the same key fully
/// replaces the prior entry.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CacheEntry {
    pub key: String,
    pub url: String,
    pub method: String,
    pub status: u16,
    pub kind: String,
    pub headers: BTreeMap<String, String>,
    pub body: Vec<u8>,
    pub stored_at: String,
}

impl CacheEntry {
    /// Rebuild the captured response from this entry.
    pub fn into_response(self) -> Response {
        Response {
            status: self.status,
            headers: self.headers,
            body: Bytes::from(self.body),
            kind: ResponseKind::parse(&self.kind),
        }
    }
}

fn entry_from_row(row: &rusqlite::Row<'_>) -> rusqlite::Result<CacheEntry> {
    let headers_json: String = row.get(5)?;
    Ok(CacheEntry {
        key: row.get(0)?,
        url: row.get(1)?,
        method: row.get(2)?,
        status: row.get::<_, i64>(3)? as u16,
        kind: row.get(4)?,
        headers: serde_json::from_str(&headers_json).unwrap_or_default(),
        body: row.get(6)?,
        stored_at: row.get(7)?,
    })
}

const ENTRY_COLUMNS: &str = "key, url, method, status, kind, headers_json, body, stored_at";

impl CacheDb {
    /// Open a named cache, creating it if absent. Idempotent.
    pub async fn open_cache(&self, name: &str) -> Result<(), Error> {
        let name = name.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT OR IGNORE INTO caches (name, created_at) VALUES (?1, ?2)",
                    params![name, now],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Write a captured response into the named cache.
    ///
    /// Opens the cache if needed and replaces any prior entry for the same
    /// request identity (UPSERT).
    pub async fn put(&self, name: &str, request: &Request, response: &Response) -> Result<(), Error> {
        let name = name.to_string();
        let now = chrono::Utc::now().to_rfc3339();
        let key = request.cache_key();
        let url = request.url.to_string();
        let method = request.method.as_str().to_string();
        let status = response.status;
        let kind = response.kind.as_str().to_string();
        let headers_json = serde_json::to_string(&response.headers)?;
        let body = response.body.to_vec();

        self.conn
            .call(move |conn| -> Result<(), Error> {
                conn.execute(
                    "INSERT OR IGNORE INTO caches (name, created_at) VALUES (?1, ?2)",
                    params![name, now],
                )?;
                conn.execute(
                    "INSERT INTO entries (
                        cache_name, key, url, method, status, kind, headers_json, body, stored_at
                    ) VALUES (?1, ?2, ?3, ?4, ?5, ?6, ?7, ?8, ?9)
                    ON CONFLICT(cache_name, key) DO UPDATE SET
                        url = excluded.url,
                        method = excluded.method,
                        status = excluded.status,
                        kind = excluded.kind,
                        headers_json = excluded.headers_json,
                        body = excluded.body,
                        stored_at = excluded.stored_at",
                    params![name, key, url, method, status as i64, kind, headers_json, body, now],
                )?;
                Ok(())
            })
            .await
            .map_err(Error::from)
    }

    /// Look up an entry in one named cache.
    pub async fn lookup(&self, name: &str, key: &str) -> Result<Option<CacheEntry>, Error> {
        let name = name.to_string();
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<Option<CacheEntry>, Error> {
                let sql = format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE cache_name = ?1 AND key = ?2");
                let result = conn.query_row(&sql, params![name, key], entry_from_row);

                match result {
                    Ok(entry) => Ok(Some(entry)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Look up an entry across every named cache, most recent write first.
    ///
    /// This is the fallback match used when a strategy does not care which
    /// cache a response came from.
    pub async fn lookup_any(&self, key: &str) -> Result<Option<CacheEntry>, Error> {
        let key = key.to_string();
        self.conn
            .call(move |conn| -> Result<Option<CacheEntry>, Error> {
                let sql =
                    format!("SELECT {ENTRY_COLUMNS} FROM entries WHERE key = ?1 ORDER BY stored_at DESC LIMIT 1");
                let result = conn.query_row(&sql, params![key], entry_from_row);

                match result {
                    Ok(entry) => Ok(Some(entry)),
                    Err(rusqlite::Error::QueryReturnedNoRows) => Ok(None),
                    Err(e) => Err(e.into()),
                }
            })
            .await
            .map_err(Error::from)
    }

    /// Delete an entire named cache and all its entries.
    ///
    /// Returns true if the cache existed.
    pub async fn delete_cache(&self, name: &str) -> Result<bool, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<bool, Error> {
                let deleted = conn.execute("DELETE FROM caches WHERE name = ?1", params![name])?;
                Ok(deleted > 0)
            })
            .await
            .map_err(Error::from)
    }

    /// Enumerate all named caches.
    pub async fn cache_names(&self) -> Result<Vec<String>, Error> {
        self.conn
            .call(|conn| -> Result<Vec<String>, Error> {
                let mut stmt = conn.prepare("SELECT name FROM caches ORDER BY name")?;
                let names = stmt
                    .query_map([], |row| row.get::<_, String>(0))?
                    .collect::<Result<Vec<_>, _>>()?;
                Ok(names)
            })
            .await
            .map_err(Error::from)
    }

    /// Count entries in a named cache. A missing cache counts as zero.
    pub async fn entry_count(&self, name: &str) -> Result<u64, Error> {
        let name = name.to_string();
        self.conn
            .call(move |conn| -> Result<u64, Error> {
                let count: i64 =
                    conn.query_row("SELECT COUNT(*) FROM entries WHERE cache_name = ?1", params![name], |row| {
                        row.get(0)
                    })?;
                Ok(count as u64)
            })
            .await
            .map_err(Error::from)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::message::Request;
    use url::Url;

    fn make_request(url: &str) -> Request {
        Request::get(Url::parse(url).unwrap())
    }

    fn make_response(body: &str) -> Response {
        Response::new(200)
            .with_header("Content-Type", "text/html")
            .with_body(body.as_bytes().to_vec())
    }

    #[tokio::test]
    async fn test_put_and_lookup() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let request = make_request("https://example.com/page");
        let response = make_response("<html>hello</html>");

        db.put("atom-runtime", &request, &response).await.unwrap();

        let entry = db.lookup("atom-runtime", &request.cache_key()).await.unwrap().unwrap();
        assert_eq!(entry.url, "https://example.com/page");
        assert_eq!(entry.status, 200);

        let rebuilt = entry.into_response();
        assert_eq!(rebuilt.header("content-type"), Some("text/html"));
        assert_eq!(&rebuilt.body[..], b"<html>hello</html>");
    }

    #[tokio::test]
    async fn test_lookup_missing() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let result = db.lookup("atom-runtime", "nonexistent").await.unwrap();
        assert!(result.is_none());
    }

    #[tokio::test]
    async fn test_put_replaces_prior_entry() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let request = make_request("https://example.com/page");

        db.put("atom-runtime", &request, &make_response("old")).await.unwrap();
        db.put("atom-runtime", &request, &make_response("new")).await.unwrap();

        let entry = db.lookup("atom-runtime", &request.cache_key()).await.unwrap().unwrap();
        assert_eq!(entry.body, b"new");
        assert_eq!(db.entry_count("atom-runtime").await.unwrap(), 1);
    }

    #[tokio::test]
    async fn test_lookup_any_spans_caches() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let request = make_request("https://example.com/bio");

        db.put("atom-portfolio-v1", &request, &make_response("bio")).await.unwrap();

        assert!(db.lookup("atom-runtime", &request.cache_key()).await.unwrap().is_none());
        let entry = db.lookup_any(&request.cache_key()).await.unwrap().unwrap();
        assert_eq!(entry.body, b"bio");
    }

    #[tokio::test]
    async fn test_open_cache_idempotent() {
        let db = CacheDb::open_in_memory().await.unwrap();
        db.open_cache("atom-portfolio-v1").await.unwrap();
        db.open_cache("atom-portfolio-v1").await.unwrap();

        assert_eq!(db.cache_names().await.unwrap(), vec!["atom-portfolio-v1".to_string()]);
        assert_eq!(db.entry_count("atom-portfolio-v1").await.unwrap(), 0);
    }

    #[tokio::test]
    async fn test_delete_cache_removes_entries() {
        let db = CacheDb::open_in_memory().await.unwrap();
        let request = make_request("https://example.com/a.js");
        db.put("atom-portfolio-v0", &request, &make_response("js")).await.unwrap();

        assert!(db.delete_cache("atom-portfolio-v0").await.unwrap());
        assert!(!db.delete_cache("atom-portfolio-v0").await.unwrap());
        assert!(db.lookup_any(&request.cache_key()).await.unwrap().is_none());
        assert!(db.cache_names().await.unwrap().is_empty());
    }

    #[tokio::test]
    async fn test_entry_count_missing_cache() {
        let db = CacheDb::open_in_memory().await.unwrap();
        assert_eq!(db.entry_count("no-such-cache").await.unwrap(), 0);
    }
}
