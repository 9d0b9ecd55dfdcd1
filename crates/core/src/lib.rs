//! Core types and shared functionality for atom-sw.
//!
//! This crate provides:
//! - Named-cache storage with a SQLite backend
//! - The HTTP request/response model the engine operates on
//! - The cacheability policy guarding every cache write
//! - Unified error types
//! - Configuration structures

pub mod cache;
pub mod config;
pub mod error;
pub mod message;
pub mod policy;

pub use cache::{CacheDb, CacheEntry};
pub use config::{AppConfig, CacheNames, ConfigError};
pub use error::Error;
pub use message::{Method, Request, RequestMode, Response, ResponseKind};
pub use policy::is_cacheable;
