//! File-per-key shared store.
//!
//! # Responsibility
//! - Persist each key as one file inside the namespace directory.
//!
//! # Invariants
//! - Writes go to a temp file in the same directory and are renamed over the
//!   target, so readers never observe a half-written blob.

use crate::store::{validate_key, SerializedStore, StorageError, StoreResult};
use std::fs;
use std::io::{ErrorKind, Write};
use std::path::{Path, PathBuf};
use tempfile::NamedTempFile;

pub struct FileStore {
    namespace: String,
    dir: PathBuf,
}

impl FileStore {
    /// Binds to an existing namespace directory.
    ///
    /// # Errors
    /// - `NamespaceNotProvisioned` when `namespace_dir` is not a directory.
    pub fn open(namespace: &str, namespace_dir: &Path) -> StoreResult<Self> {
        if !namespace_dir.is_dir() {
            return Err(StorageError::NamespaceNotProvisioned(namespace.to_string()));
        }
        Ok(Self {
            namespace: namespace.to_string(),
            dir: namespace_dir.to_path_buf(),
        })
    }

    fn entry_path(&self, key: &str) -> PathBuf {
        self.dir.join(key)
    }

    fn ensure_provisioned(&self) -> StoreResult<()> {
        if self.dir.is_dir() {
            Ok(())
        } else {
            Err(StorageError::NamespaceNotProvisioned(self.namespace.clone()))
        }
    }
}

impl SerializedStore for FileStore {
    fn namespace(&self) -> &str {
        self.namespace.as_str()
    }

    fn write(&self, key: &str, blob: &[u8]) -> StoreResult<()> {
        validate_key(key)?;
        self.ensure_provisioned()?;

        let mut temp_file = NamedTempFile::new_in(&self.dir)?;
        temp_file.write_all(blob)?;
        temp_file.flush()?;
        temp_file.as_file().sync_all()?;
        temp_file
            .persist(self.entry_path(key))
            .map_err(|err| StorageError::Io(err.error))?;
        Ok(())
    }

    fn read(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        validate_key(key)?;
        self.ensure_provisioned()?;
        match fs::read(self.entry_path(key)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(None),
            Err(err) => Err(err.into()),
        }
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        validate_key(key)?;
        self.ensure_provisioned()?;
        match fs::remove_file(self.entry_path(key)) {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == ErrorKind::NotFound => Ok(()),
            Err(err) => Err(err.into()),
        }
    }
}
