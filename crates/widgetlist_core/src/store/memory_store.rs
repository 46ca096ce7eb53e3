//! Process-local store for previews and tests.

use crate::store::{validate_key, SerializedStore, StorageError, StoreResult};
use std::collections::{HashMap, VecDeque};
use std::sync::{Mutex, MutexGuard};

/// In-memory store with optional write-failure injection.
#[derive(Default)]
pub struct MemoryStore {
    namespace: String,
    entries: Mutex<HashMap<String, Vec<u8>>>,
    injected_write_failures: Mutex<VecDeque<StorageError>>,
}

impl MemoryStore {
    pub fn new(namespace: &str) -> Self {
        Self {
            namespace: namespace.to_string(),
            ..Self::default()
        }
    }

    /// Queues an error returned by the next `write` instead of storing.
    pub fn fail_next_write(&self, error: StorageError) {
        lock(&self.injected_write_failures).push_back(error);
    }

    /// Number of keys currently stored.
    pub fn len(&self) -> usize {
        lock(&self.entries).len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

impl SerializedStore for MemoryStore {
    fn namespace(&self) -> &str {
        self.namespace.as_str()
    }

    fn write(&self, key: &str, blob: &[u8]) -> StoreResult<()> {
        validate_key(key)?;
        if let Some(error) = lock(&self.injected_write_failures).pop_front() {
            return Err(error);
        }
        lock(&self.entries).insert(key.to_string(), blob.to_vec());
        Ok(())
    }

    fn read(&self, key: &str) -> StoreResult<Option<Vec<u8>>> {
        validate_key(key)?;
        Ok(lock(&self.entries).get(key).cloned())
    }

    fn remove(&self, key: &str) -> StoreResult<()> {
        validate_key(key)?;
        lock(&self.entries).remove(key);
        Ok(())
    }
}

// A panic while holding the lock cannot leave a half-written map entry.
fn lock<T>(mutex: &Mutex<T>) -> MutexGuard<'_, T> {
    mutex
        .lock()
        .unwrap_or_else(|poisoned| poisoned.into_inner())
}
