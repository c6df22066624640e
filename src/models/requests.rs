//! Request DTOs for the cache server API
//!
//! Defines the structure of incoming HTTP request bodies.

use std::collections::HashMap;

use serde::Deserialize;
use serde_json::Value;

use crate::config::Timeout;

/// Maps the `ttl`/`never` pair carried by write requests to a [`Timeout`].
///
/// `never` wins over `ttl`; neither means the cache's default timeout.
fn timeout_from(ttl: Option<u64>, never: bool) -> Timeout {
    match (never, ttl) {
        (true, _) => Timeout::Never,
        (false, Some(secs)) => Timeout::secs(secs),
        (false, None) => Timeout::Default,
    }
}

/// Request body for PUT /set and POST /add
///
/// # Fields
/// - `key`: The cache key to store the value under
/// - `value`: Any JSON value
/// - `ttl`: Optional TTL in seconds (uses the cache default if not specified)
/// - `never`: Store without expiry
#[derive(Debug, Clone, Deserialize)]
pub struct SetRequest {
    /// The cache key
    pub key: String,
    /// The value to store
    pub value: Value,
    /// Optional TTL in seconds
    #[serde(default)]
    pub ttl: Option<u64>,
    /// Never expire
    #[serde(default)]
    pub never: bool,
}

impl SetRequest {
    /// Validates the request data
    ///
    /// Returns an error message if validation fails, None if valid.
    pub fn validate(&self) -> Option<String> {
        if self.key.is_empty() {
            return Some("Key cannot be empty".to_string());
        }
        None
    }

    /// Lifetime requested for the entry.
    pub fn timeout(&self) -> Timeout {
        timeout_from(self.ttl, self.never)
    }
}

/// Request body for POST /touch/:key
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TouchRequest {
    /// Optional TTL in seconds
    #[serde(default)]
    pub ttl: Option<u64>,
    /// Never expire
    #[serde(default)]
    pub never: bool,
}

impl TouchRequest {
    /// New lifetime requested for the entry.
    pub fn timeout(&self) -> Timeout {
        timeout_from(self.ttl, self.never)
    }
}

/// Request body for POST /get_many and POST /delete_many
#[derive(Debug, Clone, Deserialize)]
pub struct KeysRequest {
    /// Keys to operate on
    pub keys: Vec<String>,
}

/// Request body for PUT /set_many
#[derive(Debug, Clone, Deserialize)]
pub struct SetManyRequest {
    /// Values to store, by key
    pub items: HashMap<String, Value>,
    /// Optional TTL in seconds applied to every item
    #[serde(default)]
    pub ttl: Option<u64>,
    /// Never expire
    #[serde(default)]
    pub never: bool,
}

impl SetManyRequest {
    /// Lifetime requested for every entry.
    pub fn timeout(&self) -> Timeout {
        timeout_from(self.ttl, self.never)
    }
}
