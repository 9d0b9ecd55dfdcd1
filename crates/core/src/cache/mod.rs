//! SQLite-backed named caches for intercepted responses.
//!
//! This module implements the two-cache storage model the worker runs
//! against: a persistent, keyed collection of request/response entries
//! grouped under string cache names, with async access via tokio-rusqlite.
//! It supports:
//!
//! - Idempotent cache creation on first open
//! - Atomic replace-by-key writes (UPSERT)
//! - Lookup within one cache or across all caches
//! - Whole-cache eviction by name (the only eviction mechanism)
//! - Automatic schema migrations and WAL mode for concurrent access

pub mod connection;
pub mod hash;
pub mod migrations;
pub mod store;

pub use crate::Error;

pub use connection::CacheDb;
pub use store::CacheEntry;
