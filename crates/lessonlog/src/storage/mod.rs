//! Storage layer for lessonlog.
//!
//! A small `SQLite` key/value store holding named JSON values. Reads never
//! fail: an absent, unreadable or unparseable value falls back to the
//! caller's default. Writes never fail either: errors are logged and the
//! previous value stays in place.

pub mod migrations;
pub mod schema;

use std::path::{Path, PathBuf};

use chrono::{DateTime, Utc};
use rusqlite::{params, Connection, OptionalExtension};
use serde::de::DeserializeOwned;
use serde::Serialize;
use tracing::{debug, info, warn};

use crate::error::{Error, Result};

/// Key of the persisted [`SchoolInfo`](crate::model::SchoolInfo).
pub const KEY_SCHOOL_INFO: &str = "school-info";

/// Key of the persisted [`FormData`](crate::model::FormData).
pub const KEY_FORM_DATA: &str = "form-data";

/// Key of the persisted subject list.
pub const KEY_SUBJECTS: &str = "subjects-list";

/// Key of the persisted font size.
pub const KEY_FONT_SIZE: &str = "app-font-size";

/// Persistent key/value store.
#[derive(Debug)]
pub struct Store {
    /// Path to the database file.
    path: PathBuf,
    /// Database connection.
    conn: Connection,
}

impl Store {
    /// Open or create a store at the given path.
    ///
    /// Creates the parent directories and database file if they don't exist.
    ///
    /// # Errors
    ///
    /// Returns an error if the database cannot be opened or schema initialization fails.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref().to_path_buf();

        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                std::fs::create_dir_all(parent).map_err(|source| Error::DirectoryCreate {
                    path: parent.to_path_buf(),
                    source,
                })?;
            }
        }

        debug!("Opening database at {}", path.display());
        let conn = Connection::open(&path).map_err(|source| Error::DatabaseOpen {
            path: path.clone(),
            source,
        })?;

        conn.execute_batch("PRAGMA journal_mode=WAL; PRAGMA synchronous=NORMAL;")?;
        migrations::initialize_schema(&conn)?;

        info!("Database opened at {}", path.display());
        Ok(Self { path, conn })
    }

    /// Create an in-memory store for testing.
    ///
    /// # Errors
    ///
    /// Returns an error if the in-memory database cannot be created.
    pub fn open_in_memory() -> Result<Self> {
        let conn = Connection::open_in_memory().map_err(|source| Error::DatabaseOpen {
            path: PathBuf::from(":memory:"),
            source,
        })?;

        migrations::initialize_schema(&conn)?;

        Ok(Self {
            path: PathBuf::from(":memory:"),
            conn,
        })
    }

    /// Get the path to the database file.
    #[must_use]
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Read the raw JSON text stored under `key`.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn get_raw(&self, key: &str) -> Result<Option<String>> {
        let value = self
            .conn
            .query_row("SELECT value FROM kv WHERE key = ?1", [key], |row| {
                row.get(0)
            })
            .optional()?;
        Ok(value)
    }

    /// Read the value stored under `key`, or `default`.
    ///
    /// Falls back to `default` when the key is absent, the stored JSON does
    /// not parse as `T`, or the read itself fails.
    pub fn get<T: DeserializeOwned>(&self, key: &str, default: T) -> T {
        match self.get_raw(key) {
            Ok(Some(raw)) => match serde_json::from_str(&raw) {
                Ok(value) => value,
                Err(e) => {
                    warn!(key, error = %e, "stored value is corrupt, using default");
                    default
                }
            },
            Ok(None) => {
                debug!(key, "no stored value, using default");
                default
            }
            Err(e) => {
                warn!(key, error = %e, "failed to read stored value, using default");
                default
            }
        }
    }

    /// Store `value` under `key`.
    ///
    /// Returns `true` if the value was written. Failures are logged and the
    /// previous value is kept.
    pub fn set<T: Serialize + ?Sized>(&self, key: &str, value: &T) -> bool {
        let json = match serde_json::to_string(value) {
            Ok(json) => json,
            Err(e) => {
                warn!(key, error = %e, "failed to serialize value, keeping previous");
                return false;
            }
        };
        match self.write(key, &json) {
            Ok(()) => {
                debug!(key, bytes = json.len(), "stored value");
                true
            }
            Err(e) => {
                warn!(key, error = %e, "failed to store value, keeping previous");
                false
            }
        }
    }

    /// Store several values in one transaction: all are written or none are.
    ///
    /// Returns `true` if every value was written. Failures are logged.
    pub fn set_many(&self, entries: &[(&str, serde_json::Value)]) -> bool {
        match self.write_many(entries) {
            Ok(()) => {
                debug!(count = entries.len(), "stored values");
                true
            }
            Err(e) => {
                warn!(error = %e, "failed to store values, keeping previous");
                false
            }
        }
    }

    /// All stored keys, sorted.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn keys(&self) -> Result<Vec<String>> {
        let mut stmt = self.conn.prepare("SELECT key FROM kv ORDER BY key")?;
        let keys = stmt
            .query_map([], |row| row.get(0))?
            .collect::<std::result::Result<Vec<String>, _>>()?;
        Ok(keys)
    }

    /// Get store statistics.
    ///
    /// # Errors
    ///
    /// Returns an error if the database operation fails.
    pub fn stats(&self) -> Result<StoreStats> {
        let key_count: i64 = self
            .conn
            .query_row("SELECT COUNT(*) FROM kv", [], |row| row.get(0))?;

        let last: Option<String> = self
            .conn
            .query_row("SELECT MAX(updated_at) FROM kv", [], |row| row.get(0))
            .optional()?
            .flatten();
        let last_updated = last
            .and_then(|s| DateTime::parse_from_rfc3339(&s).ok())
            .map(|dt| dt.with_timezone(&Utc));

        let db_size_bytes = if self.path.to_string_lossy() == ":memory:" {
            0
        } else {
            std::fs::metadata(&self.path).map(|m| m.len()).unwrap_or(0)
        };

        Ok(StoreStats {
            key_count,
            last_updated,
            db_size_bytes,
        })
    }

    fn write(&self, key: &str, json: &str) -> Result<()> {
        self.conn.execute(
            r"
            INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
            ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
            ",
            params![key, json, Utc::now().to_rfc3339()],
        )?;
        Ok(())
    }

    fn write_many(&self, entries: &[(&str, serde_json::Value)]) -> Result<()> {
        let tx = self.conn.unchecked_transaction()?;
        for (key, value) in entries {
            let json = serde_json::to_string(value)?;
            tx.execute(
                r"
                INSERT INTO kv (key, value, updated_at) VALUES (?1, ?2, ?3)
                ON CONFLICT(key) DO UPDATE SET value = excluded.value, updated_at = excluded.updated_at
                ",
                params![key, json, Utc::now().to_rfc3339()],
            )?;
        }
        tx.commit()?;
        Ok(())
    }
}

/// Statistics about the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct StoreStats {
    /// Number of stored keys.
    pub key_count: i64,
    /// Most recent write.
    pub last_updated: Option<DateTime<Utc>>,
    /// Size of the database file in bytes.
    pub db_size_bytes: u64,
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    fn create_test_store() -> Store {
        Store::open_in_memory().expect("failed to create test store")
    }

    #[test]
    fn test_open_in_memory() {
        assert!(Store::open_in_memory().is_ok());
    }

    #[test]
    fn test_get_absent_key_returns_default() {
        let store = create_test_store();
        assert_eq!(store.get(KEY_FONT_SIZE, 16_u8), 16);
        assert_eq!(
            store.get(KEY_SUBJECTS, vec!["العلوم".to_string()]),
            vec!["العلوم".to_string()]
        );
    }

    #[test]
    fn test_set_and_get() {
        let store = create_test_store();
        assert!(store.set(KEY_FONT_SIZE, &12_u8));
        assert_eq!(store.get(KEY_FONT_SIZE, 16_u8), 12);
    }

    #[test]
    fn test_set_overwrites() {
        let store = create_test_store();
        store.set("k", &1);
        store.set("k", &2);
        assert_eq!(store.get("k", 0), 2);
        assert_eq!(store.keys().unwrap(), vec!["k".to_string()]);
    }

    #[test]
    fn test_corrupt_value_returns_default() {
        let store = create_test_store();
        store.write(KEY_FONT_SIZE, "{not json").unwrap();
        assert_eq!(store.get(KEY_FONT_SIZE, 16_u8), 16);
    }

    #[test]
    fn test_wrong_shape_returns_default() {
        let store = create_test_store();
        store.set(KEY_FONT_SIZE, "large");
        assert_eq!(store.get(KEY_FONT_SIZE, 16_u8), 16);
    }

    #[test]
    fn test_corruption_is_per_key() {
        let store = create_test_store();
        store.set(KEY_SUBJECTS, &vec!["الفيزياء"]);
        store.write(KEY_FONT_SIZE, "][").unwrap();

        assert_eq!(store.get(KEY_FONT_SIZE, 16_u8), 16);
        assert_eq!(store.get::<Vec<String>>(KEY_SUBJECTS, vec![]), vec!["الفيزياء"]);
    }

    #[test]
    fn test_set_many() {
        let store = create_test_store();
        assert!(store.set_many(&[("a", json!(1)), ("b", json!(["x"]))]));
        assert_eq!(store.get("a", 0), 1);
        assert_eq!(store.get::<Vec<String>>("b", vec![]), vec!["x"]);
    }

    #[test]
    fn test_stats() {
        let store = create_test_store();
        let stats = store.stats().unwrap();
        assert_eq!(stats.key_count, 0);
        assert!(stats.last_updated.is_none());

        store.set("a", &1);
        let stats = store.stats().unwrap();
        assert_eq!(stats.key_count, 1);
        assert!(stats.last_updated.is_some());
        assert_eq!(stats.db_size_bytes, 0);
    }

    #[test]
    fn test_reopen_persists_values() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("lessonlog.db");

        {
            let store = Store::open(&path).unwrap();
            store.set(KEY_FONT_SIZE, &12_u8);
        }

        let store = Store::open(&path).unwrap();
        assert_eq!(store.get(KEY_FONT_SIZE, 16_u8), 12);
        assert_eq!(store.path(), path.as_path());
    }
}
