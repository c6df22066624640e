//! Error types for the file cache
//!
//! Provides the cache error taxonomy using thiserror, the policy deciding
//! which errors a read path degrades to a miss, and the HTTP mapping.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    Json,
};
use rusqlite::ErrorCode;
use thiserror::Error;
use tracing::debug;

use crate::models::ErrorResponse;

// == Cache Error Enum ==
/// Unified error type for the file cache.
#[derive(Error, Debug)]
pub enum CacheError {
    /// Malformed key, rejected before any storage access
    #[error("Invalid key: {0}")]
    Validation(String),

    /// Backing file or table is missing
    #[error("Storage unavailable: {0}")]
    StorageUnavailable(String),

    /// Stored payload could not be decompressed or deserialized
    #[error("Corrupted entry: {0}")]
    Corruption(String),

    /// Write waited longer than the busy timeout for the database lock
    #[error("Lock timeout: {0}")]
    LockTimeout(String),

    /// Value could not be serialized
    #[error("Serialization error: {0}")]
    Serialization(String),

    /// Key not found (raised by incr/decr only)
    #[error("Key not found: {0}")]
    NotFound(String),

    /// Any other SQLite failure
    #[error("Database error: {0}")]
    Database(rusqlite::Error),

    /// Filesystem failure while preparing the cache location
    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    /// Internal error
    #[error("Internal error: {0}")]
    Internal(String),
}

impl CacheError {
    // == Read Path Policy ==
    /// Returns true for errors a read path reports as a plain cache miss.
    ///
    /// Only storage absence and payload corruption qualify. Lock timeouts,
    /// validation failures and every other database error still propagate.
    pub fn is_read_miss(&self) -> bool {
        matches!(
            self,
            CacheError::StorageUnavailable(_) | CacheError::Corruption(_)
        )
    }
}

// == SQLite Error Classification ==
impl From<rusqlite::Error> for CacheError {
    fn from(err: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(failure, message) = &err {
            match failure.code {
                ErrorCode::DatabaseBusy | ErrorCode::DatabaseLocked => {
                    return CacheError::LockTimeout(err.to_string());
                }
                ErrorCode::CannotOpen => {
                    return CacheError::StorageUnavailable(err.to_string());
                }
                _ => {}
            }
            if message
                .as_deref()
                .is_some_and(|m| m.starts_with("no such table"))
            {
                return CacheError::StorageUnavailable(err.to_string());
            }
        }
        CacheError::Database(err)
    }
}

// == Read Path Extension ==
/// Degrades read-miss errors to a fallback value.
pub(crate) trait ReadPath<T> {
    fn or_miss(self, miss: T) -> Result<T>;
}

impl<T> ReadPath<T> for Result<T> {
    fn or_miss(self, miss: T) -> Result<T> {
        match self {
            Err(err) if err.is_read_miss() => {
                debug!("Read degraded to miss: {}", err);
                Ok(miss)
            }
            other => other,
        }
    }
}

// == IntoResponse Implementation ==
impl IntoResponse for CacheError {
    fn into_response(self) -> Response {
        let status = match &self {
            CacheError::Validation(_) | CacheError::Serialization(_) => StatusCode::BAD_REQUEST,
            CacheError::NotFound(_) => StatusCode::NOT_FOUND,
            CacheError::StorageUnavailable(_) | CacheError::LockTimeout(_) => {
                StatusCode::SERVICE_UNAVAILABLE
            }
            CacheError::Corruption(_)
            | CacheError::Database(_)
            | CacheError::Io(_)
            | CacheError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        (status, Json(ErrorResponse::new(self.to_string()))).into_response()
    }
}

// == Result Type Alias ==
/// Convenience Result type for the file cache.
pub type Result<T> = std::result::Result<T, CacheError>;

#[cfg(test)]
mod tests {
    use super::*;
    use rusqlite::Connection;

    #[test]
    fn test_missing_table_is_storage_unavailable() {
        let conn = Connection::open_in_memory().unwrap();
        let err: CacheError = conn
            .query_row("SELECT COUNT(*) FROM cache_entries", [], |row| {
                row.get::<_, i64>(0)
            })
            .unwrap_err()
            .into();

        assert!(matches!(err, CacheError::StorageUnavailable(_)));
        assert!(err.is_read_miss());
    }

    #[test]
    fn test_other_sql_errors_are_database() {
        let conn = Connection::open_in_memory().unwrap();
        let err: CacheError = conn.execute("NOT VALID SQL", []).unwrap_err().into();

        assert!(matches!(err, CacheError::Database(_)));
        assert!(!err.is_read_miss());
    }

    #[test]
    fn test_or_miss_swallows_only_read_misses() {
        let missing: Result<i32> = Err(CacheError::StorageUnavailable("gone".into()));
        assert_eq!(missing.or_miss(7).unwrap(), 7);

        let corrupt: Result<i32> = Err(CacheError::Corruption("bad".into()));
        assert_eq!(corrupt.or_miss(0).unwrap(), 0);

        let locked: Result<i32> = Err(CacheError::LockTimeout("busy".into()));
        assert!(matches!(locked.or_miss(0), Err(CacheError::LockTimeout(_))));

        let invalid: Result<i32> = Err(CacheError::Validation("bad key".into()));
        assert!(matches!(invalid.or_miss(0), Err(CacheError::Validation(_))));
    }

    #[test]
    fn test_error_status_codes() {
        let cases = [
            (CacheError::Validation("k".into()), StatusCode::BAD_REQUEST),
            (CacheError::NotFound("k".into()), StatusCode::NOT_FOUND),
            (
                CacheError::LockTimeout("k".into()),
                StatusCode::SERVICE_UNAVAILABLE,
            ),
            (
                CacheError::Internal("k".into()),
                StatusCode::INTERNAL_SERVER_ERROR,
            ),
        ];

        for (err, status) in cases {
            assert_eq!(err.into_response().status(), status);
        }
    }
}
