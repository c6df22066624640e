//! Cache Entry Module
//!
//! Defines stored entry rows and the expiration policy applied to them.

use std::time::Duration;

use chrono::Utc;
use tracing::debug;

use crate::cache::store::Store;
use crate::config::Timeout;
use crate::error::Result;

/// Expiry stored for entries that never expire (9999-12-31T23:59:59Z).
pub const NEVER_EXPIRES: f64 = 253_402_300_799.0;

/// Expiry stored for a zero timeout; always in the past.
const EXPIRED: f64 = -1.0;

// == Cache Entry ==
/// One row of the cache table.
#[derive(Debug, Clone, PartialEq)]
pub struct Entry {
    /// Fully built key
    pub key: String,
    /// Encoded payload
    pub value: Vec<u8>,
    /// Absolute expiry in Unix seconds
    pub expires_at: f64,
}

impl Entry {
    /// Checks whether the entry is still live at `now`.
    pub fn is_live(&self, now: f64) -> bool {
        is_live(self.expires_at, now)
    }
}

// == Expiration Policy ==
/// An entry is live while `expires_at >= now`; it is dead only once the
/// clock has moved strictly past its expiry.
pub fn is_live(expires_at: f64, now: f64) -> bool {
    expires_at >= now
}

/// Deletes the row for `key` if it is dead, returning whether it was dead.
pub fn reap_if_dead(store: &Store, key: &str, expires_at: f64, now: f64) -> Result<bool> {
    if is_live(expires_at, now) {
        return Ok(false);
    }
    store.delete_row(key)?;
    debug!("Reaped expired entry {}", key);
    Ok(true)
}

/// Computes the stored expiry for a write.
pub fn expiry_for(timeout: Timeout, default: Option<Duration>, now: f64) -> f64 {
    let lifetime = match timeout {
        Timeout::Default => default,
        Timeout::Never => None,
        Timeout::After(duration) => Some(duration),
    };

    match lifetime {
        None => NEVER_EXPIRES,
        Some(duration) if duration.is_zero() => EXPIRED,
        Some(duration) => now + duration.as_secs_f64(),
    }
}

// == Utility Functions ==
/// Returns the current Unix timestamp in seconds.
pub fn now() -> f64 {
    Utc::now().timestamp_micros() as f64 / 1_000_000.0
}
