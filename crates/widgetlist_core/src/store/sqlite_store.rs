//! SQLite-backed shared store.
//!
//! # Responsibility
//! - Persist blobs in a `kv_entries` table inside the shared namespace.
//!
//! # Invariants
//! - Each write is one upsert statement, committed as one transaction.
//! - Calls are bounded by `db::BUSY_TIMEOUT`; lock contention surfaces as
//!   `StorageError::Timeout`.
//! - A store opened with `open_read_only` never creates, migrates or
//!   reconfigures the file.

use crate::db::migrations::schema_version;
use crate::db::{open_db, open_db_in_memory, open_db_read_only};
use crate::store::{validate_key, SerializedStore, StorageError, StoreResult};
use rusqlite::{params, Connection, OptionalExtension};
use std::path::{Path, PathBuf};

/// File name of the shared store inside the namespace directory.
pub const STORE_FILE_NAME: &str = "shared_store.sqlite3";

pub struct SqliteStore {
    namespace: String,
    conn: Connection,
}

impl SqliteStore {
    /// Opens (and migrates) the store file under `namespace_dir`.
    ///
    /// # Errors
    /// - `NamespaceNotProvisioned` when `namespace_dir` is not a directory.
    pub fn open(namespace: &str, namespace_dir: &Path) -> StoreResult<Self> {
        if !namespace_dir.is_dir() {
            return Err(StorageError::NamespaceNotProvisioned(namespace.to_string()));
        }
        let conn = open_db(store_file_path(namespace_dir))?;
        Ok(Self {
            namespace: namespace.to_string(),
            conn,
        })
    }

    /// Opens the store file for a reader that must not write to the namespace.
    ///
    /// Returns `None` when the host has not created or migrated the file yet.
    ///
    /// # Errors
    /// - `NamespaceNotProvisioned` when `namespace_dir` is not a directory.
    /// - `SchemaTooNew` when the file was written by a newer binary.
    pub fn open_read_only(namespace: &str, namespace_dir: &Path) -> StoreResult<Option<Self>> {
        if !namespace_dir.is_dir() {
            return Err(StorageError::NamespaceNotProvisioned(namespace.to_string()));
        }
        let path = store_file_path(namespace_dir);
        if !path.is_file() {
            return Ok(None);
        }
        let conn = open_db_read_only(path)?;
        if schema_version(&conn)? == 0 {
            return Ok(None);
        }
        Ok(Some(Self {
            namespace: namespace.to_string(),
            conn,
        }))
    }

    /// Opens a process-local store; useful for previews and tests.
    pub fn in_memory(namespace: &str) -> StoreResult<Self> {
        Ok(Self {
            namespace: namespace.to_string(),
            conn: open_db_in_memory()?,
        })
    }
}

/// Path of the store file for a namespace directory.
pub fn store_file_path(namespace_dir: &Path) -> PathBuf {
    namespace_dir.join(STORE_FILE_NAME)
}

impl SerializedStore for SqliteStore {
    fn namespace(&self) -> &str {
        self.namespace.as_str()
    }

    fn write(&self, key: &str, blob: &[u8]) -> StoreResult<()> {
        validate_key(key)?;
        self.conn.execute(
            "INSERT INTO kv_entries (key, value, updated_at)
             VALUES (?1, ?2, (strftime('%s', 'now') * 1000))
             ON CONFLICT(key) DO UPDATE SET
                value = excluded.value,
                updated_at = excluded.updated_at;",
            params![key, blob],
        )?;
        Ok(())
    }

    fn read(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        validate_key(key)?;
        let value = self
            .conn
            .query_row(
                "SELECT value FROM kv_entries WHERE key = ?1;",
                [key],
                |row| row.get::<_, Vec<u8>>(0),
            )
            .optional()?;
        Ok(value)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        validate_key(key)?;
        self.conn
            .execute("DELETE FROM kv_entries WHERE key = ?1;", [key])?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::{store_file_path, SqliteStore};
    use crate::store::{SerializedStore, StorageError};

    #[test]
    fn write_then_read_replaces_whole_blob() {
        let store = SqliteStore::in_memory("group.test").unwrap();
        store.write("widget_todos", b"[1,2,3]").unwrap();
        store.write("widget_todos", b"[]").unwrap();

        assert_eq!(store.read("widget_todos").unwrap(), Some(b"[]".to_vec()));
    }

    #[test]
    fn missing_key_reads_as_none() {
        let store = SqliteStore::in_memory("group.test").unwrap();
        assert_eq!(store.read("widget_todos").unwrap(), None);
        store.remove("widget_todos").unwrap();
    }

    #[test]
    fn open_rejects_unprovisioned_namespace() {
        let dir = tempfile::tempdir().unwrap();
        let missing = dir.path().join("group.missing");

        let err = SqliteStore::open("group.missing", &missing)
            .err()
            .expect("missing namespace must fail");
        assert!(matches!(err, StorageError::NamespaceNotProvisioned(ns) if ns == "group.missing"));
    }

    #[test]
    fn open_read_only_skips_missing_file_without_creating_it() {
        let dir = tempfile::tempdir().unwrap();

        let store = SqliteStore::open_read_only("group.test", dir.path()).unwrap();
        assert!(store.is_none());
        assert!(!store_file_path(dir.path()).exists());
    }

    #[test]
    fn open_read_only_sees_host_writes_and_refuses_to_write() {
        let dir = tempfile::tempdir().unwrap();
        let host = SqliteStore::open("group.test", dir.path()).unwrap();
        host.write("widget_todos", b"[]").unwrap();

        let reader = SqliteStore::open_read_only("group.test", dir.path())
            .unwrap()
            .expect("migrated file should open");
        assert_eq!(reader.read("widget_todos").unwrap(), Some(b"[]".to_vec()));
        assert!(reader.write("widget_todos", b"[1]").is_err());
        assert_eq!(host.read("widget_todos").unwrap(), Some(b"[]".to_vec()));
    }

    #[test]
    fn open_read_only_rejects_newer_schema() {
        let dir = tempfile::tempdir().unwrap();
        let conn = rusqlite::Connection::open(store_file_path(dir.path())).unwrap();
        conn.execute_batch("PRAGMA user_version = 999;").unwrap();
        drop(conn);

        let err = SqliteStore::open_read_only("group.test", dir.path())
            .err()
            .expect("newer schema must fail");
        assert!(matches!(err, StorageError::SchemaTooNew { found: 999, .. }));
    }
}
