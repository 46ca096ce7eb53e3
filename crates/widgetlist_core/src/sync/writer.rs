//! Full-snapshot writer over a `SerializedStore`.
//!
//! # Responsibility
//! - Encode the whole list and write it under one fixed key.
//! - Hydrate the host list from the replica at launch.
//!
//! # Invariants
//! - Writes are synchronous; the caller sees the store result directly.
//! - A missing key loads as the empty list, not as an error.
//!
//! Cost is O(n) per mutation. Lists are small and writes are user-driven,
//! so this is a known ceiling rather than a correctness concern.

use crate::model::list::ListModel;
use crate::snapshot::codec::{self, CodecError};
use crate::store::{validate_key, SerializedStore, StorageError, StoreResult};
use log::{error, info};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::time::Instant;

/// Failure while hydrating the host list from the replica.
#[derive(Debug)]
pub enum LoadError {
    Storage(StorageError),
    Codec(CodecError),
}

impl Display for LoadError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Storage(err) => write!(f, "{err}"),
            Self::Codec(err) => write!(f, "{err}"),
        }
    }
}

impl Error for LoadError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Storage(err) => Some(err),
            Self::Codec(err) => Some(err),
        }
    }
}

impl From<StorageError> for LoadError {
    fn from(value: StorageError) -> Self {
        Self::Storage(value)
    }
}

impl From<CodecError> for LoadError {
    fn from(value: CodecError) -> Self {
        Self::Codec(value)
    }
}

/// Writes full list snapshots to one key of a shared store.
pub struct SyncWriter<S: SerializedStore> {
    store: S,
    key: String,
}

impl<S: SerializedStore> SyncWriter<S> {
    /// Creates a writer bound to `key`.
    ///
    /// # Errors
    /// - `StorageError::InvalidKey` when `key` is not a valid store key.
    pub fn new(store: S, key: impl Into<String>) -> StoreResult<Self> {
        let key = key.into();
        validate_key(key.as_str())?;
        Ok(Self { store, key })
    }

    pub fn key(&self) -> &str {
        self.key.as_str()
    }

    pub fn store(&self) -> &S {
        &self.store
    }

    /// Encodes `model` and replaces the stored snapshot.
    ///
    /// # Side effects
    /// - Emits `snapshot_write` with item count, byte size and duration.
    pub fn write_snapshot(&self, model: &ListModel) -> StoreResult<()> {
        let started_at = Instant::now();
        let blob = codec::encode(model);

        match self.store.write(self.key.as_str(), &blob) {
            Ok(()) => {
                info!(
                    "event=snapshot_write module=sync status=ok namespace={} items={} bytes={} duration_ms={}",
                    self.store.namespace(),
                    model.len(),
                    blob.len(),
                    started_at.elapsed().as_millis()
                );
                Ok(())
            }
            Err(err) => {
                error!(
                    "event=snapshot_write module=sync status=error namespace={} items={} duration_ms={} error_code={} error={}",
                    self.store.namespace(),
                    model.len(),
                    started_at.elapsed().as_millis(),
                    err.code(),
                    err
                );
                Err(err)
            }
        }
    }

    /// Returns the raw replica blob, if any.
    pub fn read_replica(&self) -> StoreResult<Option<Vec<u8>>> {
        self.store.read(self.key.as_str())
    }

    /// Loads the replica into a fresh list.
    ///
    /// # Errors
    /// - `LoadError::Storage` when the store read fails.
    /// - `LoadError::Codec` when the stored blob is malformed.
    pub fn load(&self) -> Result<ListModel, LoadError> {
        let blob = self.read_replica()?;
        let model = codec::decode_optional(blob.as_deref()).map_err(|err| {
            error!(
                "event=snapshot_decode module=sync status=error namespace={} error={}",
                self.store.namespace(),
                err
            );
            err
        })?;
        info!(
            "event=snapshot_read module=sync status=ok namespace={} items={} present={}",
            self.store.namespace(),
            model.len(),
            blob.is_some()
        );
        Ok(model)
    }
}

#[cfg(test)]
mod tests {
    use super::{LoadError, SyncWriter};
    use crate::model::list::ListModel;
    use crate::snapshot::codec::decode;
    use crate::store::{MemoryStore, SerializedStore, StorageError};
    use std::sync::Arc;

    #[test]
    fn write_snapshot_stores_full_list() {
        let store = Arc::new(MemoryStore::new("group.test"));
        let writer = SyncWriter::new(Arc::clone(&store), "widget_todos").unwrap();
        let mut model = ListModel::new();
        model.add("a").unwrap();
        model.add("b").unwrap();

        writer.write_snapshot(&model).unwrap();

        let blob = store.read("widget_todos").unwrap().unwrap();
        assert_eq!(decode(&blob).unwrap(), model);
    }

    #[test]
    fn load_treats_missing_key_as_empty() {
        let writer = SyncWriter::new(MemoryStore::new("group.test"), "widget_todos").unwrap();
        assert!(writer.load().unwrap().is_empty());
    }

    #[test]
    fn load_surfaces_malformed_blob() {
        let store = MemoryStore::new("group.test");
        store.write("widget_todos", b"not json").unwrap();
        let writer = SyncWriter::new(store, "widget_todos").unwrap();

        assert!(matches!(writer.load().unwrap_err(), LoadError::Codec(_)));
    }

    #[test]
    fn new_rejects_invalid_key() {
        let err = SyncWriter::new(MemoryStore::new("group.test"), "a/b")
            .err()
            .expect("invalid key must fail");
        assert!(matches!(err, StorageError::InvalidKey(_)));
    }
}
