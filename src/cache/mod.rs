//! Cache Module
//!
//! Provides a SQLite-backed file cache with lazy TTL expiration and random
//! culling.

pub mod codec;
mod cull;
mod entry;
mod file_cache;
mod keys;
mod stats;
mod store;


// Re-export public types
pub use cull::CullOutcome;
pub use entry::{Entry, NEVER_EXPIRES};
pub use file_cache::FileCache;
pub use keys::{make_key, validate_key};
pub use stats::CacheStats;
pub use store::MEMORY_LOCATION;

// == Public Constants ==
/// Maximum allowed length in bytes of a fully built key
pub const MAX_KEY_LENGTH: usize = 250;
