//! Configuration Module
//!
//! Cache tuning parameters and server settings, loaded from environment
//! variables with sensible defaults.

use std::env;
use std::time::Duration;

/// Default eviction trigger threshold.
pub const DEFAULT_MAX_ENTRIES: usize = 300;
/// Default culling divisor.
pub const DEFAULT_CULL_FREQUENCY: usize = 3;
/// Default per-entry lifetime.
pub const DEFAULT_TIMEOUT: Duration = Duration::from_secs(300);
/// Default wait for a contended database lock.
pub const DEFAULT_BUSY_TIMEOUT: Duration = Duration::from_secs(5);

// == Timeout ==
/// Lifetime requested for a write.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub enum Timeout {
    /// Use the cache's configured default timeout
    #[default]
    Default,
    /// Never expire
    Never,
    /// Expire after the given duration; zero expires immediately
    After(Duration),
}

impl Timeout {
    /// Shorthand for `Timeout::After(Duration::from_secs(secs))`.
    pub fn secs(secs: u64) -> Self {
        Timeout::After(Duration::from_secs(secs))
    }
}

impl From<Duration> for Timeout {
    fn from(duration: Duration) -> Self {
        Timeout::After(duration)
    }
}

/// Cache tuning parameters, fixed for the lifetime of a cache instance.
#[derive(Debug, Clone, PartialEq)]
pub struct CacheConfig {
    /// Entry count at which a write triggers culling
    pub max_entries: usize,
    /// Fraction divisor for culling; 0 clears the whole cache
    pub cull_frequency: usize,
    /// How long a statement waits for a locked database before failing
    pub busy_timeout: Duration,
    /// Lifetime used for `Timeout::Default`; `None` means never expire
    pub default_timeout: Option<Duration>,
    /// Prefix prepended to every key
    pub key_prefix: String,
    /// Version component of every key
    pub version: u32,
}

impl CacheConfig {
    /// Creates a CacheConfig by loading values from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_MAX_ENTRIES` - Culling threshold (default: 300)
    /// - `CACHE_CULL_FREQUENCY` - Culling divisor, 0 = clear all (default: 3)
    /// - `CACHE_BUSY_TIMEOUT_MS` - Lock wait in milliseconds (default: 5000)
    /// - `CACHE_TIMEOUT` - Default entry lifetime in seconds, `none` = never (default: 300)
    /// - `CACHE_KEY_PREFIX` - Key prefix (default: empty)
    /// - `CACHE_VERSION` - Key version (default: 1)
    pub fn from_env() -> Self {
        let defaults = Self::default();
        Self {
            max_entries: parse_var("CACHE_MAX_ENTRIES").unwrap_or(defaults.max_entries),
            cull_frequency: parse_var("CACHE_CULL_FREQUENCY").unwrap_or(defaults.cull_frequency),
            busy_timeout: parse_var("CACHE_BUSY_TIMEOUT_MS")
                .map(Duration::from_millis)
                .unwrap_or(defaults.busy_timeout),
            default_timeout: match env::var("CACHE_TIMEOUT") {
                Ok(v) if v.eq_ignore_ascii_case("none") => None,
                Ok(v) => v
                    .parse()
                    .ok()
                    .map(Duration::from_secs)
                    .or(defaults.default_timeout),
                Err(_) => defaults.default_timeout,
            },
            key_prefix: env::var("CACHE_KEY_PREFIX").unwrap_or(defaults.key_prefix),
            version: parse_var("CACHE_VERSION").unwrap_or(defaults.version),
        }
    }
}

impl Default for CacheConfig {
    fn default() -> Self {
        Self {
            max_entries: DEFAULT_MAX_ENTRIES,
            cull_frequency: DEFAULT_CULL_FREQUENCY,
            busy_timeout: DEFAULT_BUSY_TIMEOUT,
            default_timeout: Some(DEFAULT_TIMEOUT),
            key_prefix: String::new(),
            version: 1,
        }
    }
}

/// Server configuration parameters for the HTTP front-end.
#[derive(Debug, Clone)]
pub struct ServerConfig {
    /// Database file path, or `:memory:`
    pub location: String,
    /// HTTP server port
    pub server_port: u16,
    /// Cache tuning
    pub cache: CacheConfig,
}

impl ServerConfig {
    /// Creates a ServerConfig from environment variables.
    ///
    /// # Environment Variables
    /// - `CACHE_LOCATION` - Database path (default: cache.sqlite3)
    /// - `SERVER_PORT` - HTTP server port (default: 3000)
    /// - plus everything read by [`CacheConfig::from_env`]
    pub fn from_env() -> Self {
        Self {
            location: env::var("CACHE_LOCATION").unwrap_or_else(|_| "cache.sqlite3".to_string()),
            server_port: parse_var("SERVER_PORT").unwrap_or(3000),
            cache: CacheConfig::from_env(),
        }
    }
}

fn parse_var<T: std::str::FromStr>(name: &str) -> Option<T> {
    env::var(name).ok().and_then(|v| v.parse().ok())
}
