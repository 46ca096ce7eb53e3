//! Process-shared key-value store contracts and backends.
//!
//! # Responsibility
//! - Define the blob-level contract both the host and the widget rely on.
//! - Map backend failures to one `StorageError` taxonomy.
//!
//! # Invariants
//! - A write replaces the blob under a key atomically: a concurrent reader
//!   in another process observes the fully old or fully new blob.
//! - Stores never create their namespace; an unprovisioned namespace is an
//!   error, not an implicit mkdir.
//! - Keys are non-empty, do not start with `.`, and use `[A-Za-z0-9._-]`.
//!
//! # See also
//! - docs/architecture/widget-sync.md

use crate::config::{StoreBackend, SyncConfig};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::sync::Arc;

pub mod file_store;
pub mod memory_store;
pub mod sqlite_store;

pub use file_store::FileStore;
pub use memory_store::MemoryStore;
pub use sqlite_store::SqliteStore;

pub type StoreResult<T> = Result<T, StorageError>;

/// Failure at the storage platform boundary.
#[derive(Debug)]
pub enum StorageError {
    /// The shared namespace has not been provisioned on this device.
    NamespaceNotProvisioned(String),
    /// Key is empty or contains unsupported characters.
    InvalidKey(String),
    /// Underlying storage has no space left.
    QuotaExceeded,
    /// The other process held the store longer than the busy timeout.
    Timeout,
    /// Store file was written by a newer binary.
    SchemaTooNew { found: u32, supported: u32 },
    Io(std::io::Error),
    Sqlite(rusqlite::Error),
}

impl Display for StorageError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NamespaceNotProvisioned(namespace) => {
                write!(f, "storage namespace not provisioned: {namespace}")
            }
            Self::InvalidKey(key) => write!(f, "invalid storage key: `{key}`"),
            Self::QuotaExceeded => write!(f, "storage quota exceeded"),
            Self::Timeout => write!(f, "storage call timed out"),
            Self::SchemaTooNew { found, supported } => write!(
                f,
                "store schema version {found} is newer than supported {supported}"
            ),
            Self::Io(err) => write!(f, "{err}"),
            Self::Sqlite(err) => write!(f, "{err}"),
        }
    }
}

impl Error for StorageError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io(err) => Some(err),
            Self::Sqlite(err) => Some(err),
            _ => None,
        }
    }
}

impl StorageError {
    /// Stable machine-readable code used in log events.
    pub fn code(&self) -> &'static str {
        match self {
            Self::NamespaceNotProvisioned(_) => "namespace_not_provisioned",
            Self::InvalidKey(_) => "invalid_key",
            Self::QuotaExceeded => "quota_exceeded",
            Self::Timeout => "timeout",
            Self::SchemaTooNew { .. } => "schema_too_new",
            Self::Io(_) => "io",
            Self::Sqlite(_) => "sqlite",
        }
    }
}

impl From<std::io::Error> for StorageError {
    fn from(value: std::io::Error) -> Self {
        Self::Io(value)
    }
}

impl From<rusqlite::Error> for StorageError {
    fn from(value: rusqlite::Error) -> Self {
        if let rusqlite::Error::SqliteFailure(failure, _) = &value {
            match failure.code {
                rusqlite::ErrorCode::DiskFull => return Self::QuotaExceeded,
                rusqlite::ErrorCode::DatabaseBusy | rusqlite::ErrorCode::DatabaseLocked => {
                    return Self::Timeout
                }
                _ => {}
            }
        }
        Self::Sqlite(value)
    }
}

/// Durable blob store shared between the host and the widget process.
pub trait SerializedStore {
    /// Namespace identifier this store is bound to.
    fn namespace(&self) -> &str;
    /// Atomically replaces the blob stored under `key`.
    fn write(&self, key: &str, blob: &[u8]) -> StoreResult<()>;
    /// Reads the blob under `key`; `None` when the key was never written.
    fn read(&self, key: &str) -> StoreResult<Option<Vec<u8>>>;
    /// Deletes `key`; deleting a missing key succeeds.
    fn remove(&self, key: &str) -> StoreResult<()>;
}

impl<S: SerializedStore + ?Sized> SerializedStore for Box<S> {
    fn namespace(&self) -> &str {
        (**self).namespace()
    }

    fn write(&self, key: &str, blob: &[u8]) -> StoreResult<()> {
        (**self).write(key, blob)
    }

    fn read(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        (**self).read(key)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        (**self).remove(key)
    }
}

impl<S: SerializedStore + ?Sized> SerializedStore for Arc<S> {
    fn namespace(&self) -> &str {
        (**self).namespace()
    }

    fn write(&self, key: &str, blob: &[u8]) -> StoreResult<()> {
        (**self).write(key, blob)
    }

    fn read(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        (**self).read(key)
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        (**self).remove(key)
    }
}

/// Boxed store handle selected at runtime from configuration.
pub type DynStore = Box<dyn SerializedStore + Send>;

/// Opens the backend selected by `config` for its namespace.
///
/// # Errors
/// - `StorageError::NamespaceNotProvisioned` when the namespace directory
///   does not exist.
/// - Backend open failures.
pub fn open_store(config: &SyncConfig) -> StoreResult<DynStore> {
    let namespace_dir = config.namespace_dir();
    match config.backend {
        StoreBackend::Sqlite => Ok(Box::new(SqliteStore::open(
            config.namespace.as_str(),
            &namespace_dir,
        )?)),
        StoreBackend::File => Ok(Box::new(FileStore::open(
            config.namespace.as_str(),
            &namespace_dir,
        )?)),
    }
}

/// Opens the backend selected by `config` for a passive reader.
///
/// Unlike `open_store`, nothing in the namespace is created or modified.
/// Returns `None` when the backend has nothing to read yet.
///
/// # Errors
/// - `StorageError::NamespaceNotProvisioned` when the namespace directory
///   does not exist.
/// - Backend open failures.
pub fn open_reader(config: &SyncConfig) -> StoreResult<Option<DynStore>> {
    let namespace_dir = config.namespace_dir();
    let namespace = config.namespace.as_str();
    match config.backend {
        StoreBackend::Sqlite => Ok(SqliteStore::open_read_only(namespace, &namespace_dir)?
            .map(|store| Box::new(store) as DynStore)),
        StoreBackend::File => Ok(Some(Box::new(FileStore::open(namespace, &namespace_dir)?))),
    }
}

/// Rejects keys that could escape the namespace or collide with temp files.
pub fn validate_key(key: &str) -> StoreResult<()> {
    let valid = !key.is_empty()
        && !key.starts_with('.')
        && key
            .chars()
            .all(|ch| ch.is_ascii_alphanumeric() || matches!(ch, '.' | '_' | '-'));
    if valid {
        Ok(())
    } else {
        Err(StorageError::InvalidKey(key.to_string()))
    }
}
