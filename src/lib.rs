//! SQLite File Cache - A persistent single-file key-value cache
//!
//! Stores serializable values under string keys with per-entry TTL
//! expiration and size-bounded random culling. Embed [`FileCache`] directly,
//! or serve it over HTTP with the bundled binary.

pub mod api;
pub mod cache;
pub mod config;
pub mod error;
pub mod models;

pub use api::AppState;
pub use cache::FileCache;
pub use config::{CacheConfig, ServerConfig, Timeout};
pub use error::{CacheError, Result};
