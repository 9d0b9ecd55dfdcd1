//! Service-worker caching and request-routing engine.
//!
//! The engine intercepts GET requests within its registration scope,
//! classifies each one onto a caching strategy, and serves responses from
//! two named caches with network fallbacks and a synthesized offline page.
//!
//! ## Architecture
//!
//! ```text
//! fetch event ── Router ──┬── health handler
//!                         ├── network-first ─────────┐
//!                         ├── cache-first ───────────┼── named caches
//!                         └── stale-while-revalidate ┘   (core, runtime)
//! ```
//!
//! The host event loop is an external adapter: it hands each intercepted
//! request to [`SwEngine::handle`] and passes through anything the engine
//! declines to intercept.

pub mod engine;
pub mod fetch;
pub mod health;
pub mod lifecycle;
pub mod offline;
pub mod routes;
pub mod sync;

#[cfg(test)]
pub(crate) mod testutil;

pub use engine::SwEngine;
pub use fetch::{HttpNetwork, Network};
pub use health::EdgeHealth;
pub use lifecycle::WorkerState;
pub use routes::{Router, Strategy};
