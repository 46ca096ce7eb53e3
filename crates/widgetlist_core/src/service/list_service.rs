//! List use-case service.
//!
//! # Responsibility
//! - Apply list mutations and push a full snapshot after each one.
//! - Track whether the widget replica is current or stale.
//!
//! # Invariants
//! - The in-memory list is authoritative; a failed write never rolls it back.
//! - Every mutation writes, including no-op `remove`/`toggle`, so the next
//!   mutation is the implicit retry of a previously failed write.
//! - Validation errors are raised before any state or storage is touched.

use crate::model::item::{ItemId, ListItem, ValidationError};
use crate::model::list::ListModel;
use crate::store::{SerializedStore, StoreResult};
use crate::sync::writer::{LoadError, SyncWriter};
use log::warn;

/// Freshness of the widget replica relative to the host list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SyncStatus {
    /// No write attempted since the service was created.
    Pending,
    /// Last write succeeded; the replica equals the host list.
    Synced,
    /// Last write failed; the replica lags until the next successful write.
    Stale { last_error: String },
}

/// Outcome of one mutation.
#[derive(Debug)]
pub struct Mutation<T> {
    /// Operation-specific result.
    pub value: T,
    /// Full list after the mutation.
    pub items: Vec<ListItem>,
    /// Result of the snapshot write for this mutation.
    pub sync: StoreResult<()>,
}

impl<T> Mutation<T> {
    pub fn is_synced(&self) -> bool {
        self.sync.is_ok()
    }
}

/// List service over one shared store.
pub struct ListService<S: SerializedStore> {
    model: ListModel,
    writer: SyncWriter<S>,
    status: SyncStatus,
}

impl<S: SerializedStore> ListService<S> {
    /// Creates a service with an empty list.
    pub fn new(writer: SyncWriter<S>) -> Self {
        Self::with_model(writer, ListModel::new())
    }

    /// Creates a service seeded with an existing list.
    pub fn with_model(writer: SyncWriter<S>, model: ListModel) -> Self {
        Self {
            model,
            writer,
            status: SyncStatus::Pending,
        }
    }

    /// Creates a service seeded from the current replica.
    ///
    /// The loaded list already matches the replica, so status starts `Synced`.
    pub fn hydrate(writer: SyncWriter<S>) -> Result<Self, LoadError> {
        let model = writer.load()?;
        Ok(Self {
            model,
            writer,
            status: SyncStatus::Synced,
        })
    }

    pub fn model(&self) -> &ListModel {
        &self.model
    }

    pub fn items(&self) -> &[ListItem] {
        self.model.items()
    }

    pub fn remaining_count(&self) -> usize {
        self.model.remaining_count()
    }

    pub fn sync_status(&self) -> &SyncStatus {
        &self.status
    }

    pub fn writer(&self) -> &SyncWriter<S> {
        &self.writer
    }

    /// Adds one item and syncs.
    ///
    /// # Errors
    /// - `ValidationError::EmptyTitle`; nothing is written in that case.
    pub fn add(&mut self, title: &str) -> Result<Mutation<ListItem>, ValidationError> {
        let item = self.model.add(title)?;
        Ok(self.sync(item))
    }

    /// Removes one item by id and syncs. Unknown ids are not an error.
    pub fn remove(&mut self, id: &str) -> Mutation<Option<ListItem>> {
        let removed = self.model.remove(id);
        self.sync(removed)
    }

    /// Toggles one item by id and syncs; returns the new `completed` value.
    pub fn toggle(&mut self, id: &str) -> Mutation<Option<bool>> {
        let toggled = self.model.toggle(id);
        self.sync(toggled)
    }

    /// Empties the list and writes an empty snapshot (not an absent key).
    pub fn clear(&mut self) -> Mutation<usize> {
        let removed = self.model.clear();
        self.sync(removed)
    }

    /// Rewrites the current list without mutating it.
    pub fn resync(&mut self) -> StoreResult<()> {
        let result = self.writer.write_snapshot(&self.model);
        self.record(&result);
        result
    }

    /// Ids currently held, in list order.
    pub fn ids(&self) -> Vec<ItemId> {
        self.model.items().iter().map(|item| item.id.clone()).collect()
    }

    fn sync<T>(&mut self, value: T) -> Mutation<T> {
        let sync = self.writer.write_snapshot(&self.model);
        self.record(&sync);
        Mutation {
            value,
            items: self.model.items().to_vec(),
            sync,
        }
    }

    fn record(&mut self, result: &StoreResult<()>) {
        self.status = match result {
            Ok(()) => SyncStatus::Synced,
            Err(err) => {
                warn!(
                    "event=replica_stale module=service status=error items={} error_code={}",
                    self.model.len(),
                    err.code()
                );
                SyncStatus::Stale {
                    last_error: err.to_string(),
                }
            }
        };
    }
}
