//! Cache Store Module
//!
//! Owns the `cache_entries` table and performs keyed row operations on it.
//!
//! A file-backed store opens a fresh connection for every operation and
//! drops it before returning, so a database file that is deleted or replaced
//! between calls is picked up on the next call. The `:memory:` location keeps
//! one connection for the lifetime of the store, since an in-memory database
//! does not outlive its connection.

use std::path::{Path, PathBuf};
use std::sync::Mutex;
use std::time::Duration;

use rusqlite::{params, Connection, OpenFlags, OptionalExtension};
use tracing::info;

use crate::cache::entry::Entry;
use crate::error::{CacheError, Result};

/// Location string selecting a process-local, non-persistent store.
pub const MEMORY_LOCATION: &str = ":memory:";

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS cache_entries
    (
        key TEXT NOT NULL PRIMARY KEY,
        value BLOB NOT NULL,
        expires_at REAL NOT NULL
    )
";

#[derive(Debug)]
enum Backing {
    File(PathBuf),
    Memory(Mutex<Connection>),
}

// == Store ==
/// SQLite-backed entry table.
#[derive(Debug)]
pub struct Store {
    backing: Backing,
    busy_timeout: Duration,
}

impl Store {
    // == Constructor ==
    /// Opens a store at `location`, a file path or `:memory:`.
    ///
    /// Missing parent directories of a file path are created. The schema is
    /// not touched; call [`Store::ensure_schema`] for that.
    pub fn open(location: &str, busy_timeout: Duration) -> Result<Self> {
        let backing = if location == MEMORY_LOCATION {
            let conn = Connection::open_in_memory()?;
            conn.busy_timeout(busy_timeout)?;
            info!("In-memory cache store created");
            Backing::Memory(Mutex::new(conn))
        } else {
            let path = PathBuf::from(location);
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() && !parent.exists() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            info!("Cache store opened at {:?}", path);
            Backing::File(path)
        };

        Ok(Self {
            backing,
            busy_timeout,
        })
    }

    /// Returns the database path, or `None` for an in-memory store.
    pub fn path(&self) -> Option<&Path> {
        match &self.backing {
            Backing::File(path) => Some(path),
            Backing::Memory(_) => None,
        }
    }

    // == Connection Scope ==
    /// Runs `f` against a connection, releasing it on every exit path.
    fn with_conn<T>(&self, f: impl FnOnce(&mut Connection) -> rusqlite::Result<T>) -> Result<T> {
        match &self.backing {
            Backing::File(path) => {
                let mut conn = Connection::open_with_flags(
                    path,
                    OpenFlags::SQLITE_OPEN_READ_WRITE
                        | OpenFlags::SQLITE_OPEN_CREATE
                        | OpenFlags::SQLITE_OPEN_NO_MUTEX,
                )?;
                conn.busy_timeout(self.busy_timeout)?;
                Ok(f(&mut conn)?)
            }
            Backing::Memory(conn) => {
                let mut conn = conn
                    .lock()
                    .map_err(|_| CacheError::Internal("connection mutex poisoned".to_string()))?;
                Ok(f(&mut conn)?)
            }
        }
    }

    // == Schema ==
    /// Creates the entry table if it does not exist.
    pub fn ensure_schema(&self) -> Result<()> {
        self.with_conn(|conn| conn.execute_batch(SCHEMA))
    }

    // == Reads ==
    /// Point lookup by key.
    pub fn get_row(&self, key: &str) -> Result<Option<Entry>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT value, expires_at FROM cache_entries WHERE key = ?1 LIMIT 1",
                params![key],
                |row| {
                    Ok(Entry {
                        key: key.to_string(),
                        value: row.get(0)?,
                        expires_at: row.get(1)?,
                    })
                },
            )
            .optional()
        })
    }

    /// Looks up only the expiry of a key.
    pub fn get_expiry(&self, key: &str) -> Result<Option<f64>> {
        self.with_conn(|conn| {
            conn.query_row(
                "SELECT expires_at FROM cache_entries WHERE key = ?1 LIMIT 1",
                params![key],
                |row| row.get(0),
            )
            .optional()
        })
    }

    /// Looks up several keys over one connection, skipping absent ones.
    pub fn get_rows(&self, keys: &[String]) -> Result<Vec<Entry>> {
        self.with_conn(|conn| {
            let mut stmt = conn
                .prepare("SELECT value, expires_at FROM cache_entries WHERE key = ?1 LIMIT 1")?;
            let mut rows = Vec::with_capacity(keys.len());
            for key in keys {
                let row = stmt
                    .query_row(params![key], |row| {
                        Ok(Entry {
                            key: key.clone(),
                            value: row.get(0)?,
                            expires_at: row.get(1)?,
                        })
                    })
                    .optional()?;
                rows.extend(row);
            }
            Ok(rows)
        })
    }

    /// Number of rows, live or dead.
    pub fn count(&self) -> Result<usize> {
        self.with_conn(|conn| {
            conn.query_row("SELECT COUNT(key) FROM cache_entries", [], |row| {
                row.get::<_, i64>(0)
            })
        })
        .map(|n| n as usize)
    }

    /// Returns up to `limit` keys in random order.
    pub fn sample_keys(&self, limit: usize) -> Result<Vec<String>> {
        self.with_conn(|conn| {
            let mut stmt = conn.prepare("SELECT key FROM cache_entries ORDER BY RANDOM() LIMIT ?1")?;
            let keys = stmt
                .query_map(params![limit as i64], |row| row.get(0))?
                .collect::<rusqlite::Result<Vec<String>>>()?;
            Ok(keys)
        })
    }

    // == Writes ==
    /// Inserts a row or replaces the value and expiry of an existing one.
    pub fn upsert_row(&self, key: &str, value: &[u8], expires_at: f64) -> Result<()> {
        self.with_conn(|conn| {
            conn.execute(UPSERT, params![key, value, expires_at])
                .map(|_| ())
        })
    }

    /// Upserts several rows in a single transaction.
    pub fn upsert_rows(&self, rows: &[Entry]) -> Result<()> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            {
                let mut stmt = tx.prepare(UPSERT)?;
                for row in rows {
                    stmt.execute(params![row.key, row.value, row.expires_at])?;
                }
            }
            tx.commit()
        })
    }

    /// Replaces the expiry of an existing row, returning whether it existed.
    pub fn update_expiry(&self, key: &str, expires_at: f64) -> Result<bool> {
        self.with_conn(|conn| {
            conn.execute(
                "UPDATE cache_entries SET expires_at = ?1 WHERE key = ?2",
                params![expires_at, key],
            )
        })
        .map(|changed| changed > 0)
    }

    /// Deletes one row, returning whether it existed.
    pub fn delete_row(&self, key: &str) -> Result<bool> {
        self.with_conn(|conn| conn.execute("DELETE FROM cache_entries WHERE key = ?1", params![key]))
            .map(|changed| changed > 0)
    }

    /// Deletes several rows in a single transaction, returning how many existed.
    pub fn delete_rows(&self, keys: &[String]) -> Result<usize> {
        self.with_conn(|conn| {
            let tx = conn.transaction()?;
            let mut deleted = 0;
            {
                let mut stmt = tx.prepare("DELETE FROM cache_entries WHERE key = ?1")?;
                for key in keys {
                    deleted += stmt.execute(params![key])?;
                }
            }
            tx.commit()?;
            Ok(deleted)
        })
    }

    /// Deletes every row, returning how many were removed.
    pub fn delete_all(&self) -> Result<usize> {
        self.with_conn(|conn| conn.execute("DELETE FROM cache_entries", []))
    }

    #[cfg(test)]
    pub(crate) fn drop_table(&self) -> Result<()> {
        self.with_conn(|conn| conn.execute_batch("DROP TABLE IF EXISTS cache_entries"))
    }
}

const UPSERT: &str = "
    INSERT INTO cache_entries (key, value, expires_at) VALUES (?1, ?2, ?3)
    ON CONFLICT(key) DO UPDATE SET value = excluded.value, expires_at = excluded.expires_at
";
