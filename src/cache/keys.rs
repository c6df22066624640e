//! Key construction and validation.

use crate::cache::MAX_KEY_LENGTH;
use crate::error::{CacheError, Result};

/// Builds the stored key as `prefix:version:key`.
pub fn make_key(prefix: &str, version: u32, key: &str) -> String {
    format!("{}:{}:{}", prefix, version, key)
}

/// Rejects keys that are too long or contain spaces or control characters.
pub fn validate_key(key: &str) -> Result<()> {
    if key.len() > MAX_KEY_LENGTH {
        return Err(CacheError::Validation(format!(
            "Key exceeds maximum length of {} bytes",
            MAX_KEY_LENGTH
        )));
    }
    if let Some(c) = key.chars().find(|c| c.is_ascii_control() || *c == ' ') {
        return Err(CacheError::Validation(format!(
            "Key contains invalid character {:?}: {}",
            c, key
        )));
    }
    Ok(())
}
