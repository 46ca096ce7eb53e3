//! Ordered list container owned by the host process.
//!
//! # Responsibility
//! - Hold the authoritative in-memory list.
//! - Apply `add/remove/toggle/clear` without touching storage.
//!
//! # Invariants
//! - All item ids are unique at every step.
//! - `remove` and `toggle` on an unknown id leave the list unchanged.
//! - Mutations are synchronous and run on one logical thread.

use crate::model::item::{new_item_id, ItemId, ListItem, ValidationError};
use log::warn;
use std::collections::HashSet;
use std::error::Error;
use std::fmt::{Display, Formatter};

/// Raised when building a list from items that share an id.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DuplicateItemId(pub ItemId);

impl Display for DuplicateItemId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "duplicate item id: {}", self.0)
    }
}

impl Error for DuplicateItemId {}

/// In-memory list; newest items are appended at the end.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ListModel {
    items: Vec<ListItem>,
}

impl ListModel {
    pub fn new() -> Self {
        Self::default()
    }

    /// Builds a list from existing items, preserving their order.
    ///
    /// # Errors
    /// - `DuplicateItemId` for the first id that appears twice.
    pub fn from_items(items: Vec<ListItem>) -> Result<Self, DuplicateItemId> {
        if let Some(id) = first_duplicate_id(&items) {
            return Err(DuplicateItemId(id));
        }
        Ok(Self { items })
    }

    pub fn items(&self) -> &[ListItem] {
        &self.items
    }

    pub fn into_items(self) -> Vec<ListItem> {
        self.items
    }

    pub fn len(&self) -> usize {
        self.items.len()
    }

    pub fn is_empty(&self) -> bool {
        self.items.is_empty()
    }

    pub fn get(&self, id: &str) -> Option<&ListItem> {
        self.items.iter().find(|item| item.id == id)
    }

    pub fn contains(&self, id: &str) -> bool {
        self.get(id).is_some()
    }

    /// Number of items not yet completed.
    pub fn remaining_count(&self) -> usize {
        self.items.iter().filter(|item| !item.completed).count()
    }

    /// Appends a new item built from `title`.
    ///
    /// # Errors
    /// - `ValidationError::EmptyTitle` when `title` is blank; the list is
    ///   left untouched.
    pub fn add(&mut self, title: &str) -> Result<ListItem, ValidationError> {
        let mut item = ListItem::new(title)?;
        while self.contains(item.id.as_str()) {
            warn!("event=item_id_collision module=model status=retry");
            item.id = new_item_id();
        }
        self.items.push(item.clone());
        Ok(item)
    }

    /// Removes the item with `id`; returns it when present.
    pub fn remove(&mut self, id: &str) -> Option<ListItem> {
        let index = self.items.iter().position(|item| item.id == id)?;
        Some(self.items.remove(index))
    }

    /// Flips `completed` on the item with `id`; returns the new value.
    pub fn toggle(&mut self, id: &str) -> Option<bool> {
        self.items
            .iter_mut()
            .find(|item| item.id == id)
            .map(ListItem::toggle)
    }

    /// Empties the list and returns how many items were dropped.
    pub fn clear(&mut self) -> usize {
        let removed = self.items.len();
        self.items.clear();
        removed
    }
}

fn first_duplicate_id(items: &[ListItem]) -> Option<ItemId> {
    let mut seen = HashSet::with_capacity(items.len());
    items
        .iter()
        .find(|item| !seen.insert(item.id.as_str()))
        .map(|item| item.id.clone())
}

#[cfg(test)]
mod tests {
    use super::{DuplicateItemId, ListModel};
    use crate::model::item::{ListItem, ValidationError};

    #[test]
    fn add_appends_in_insertion_order() {
        let mut model = ListModel::new();
        let first = model.add("Buy milk").unwrap();
        let second = model.add("Call mom").unwrap();

        assert_eq!(model.len(), 2);
        assert_eq!(model.items()[0], first);
        assert_eq!(model.items()[1], second);
    }

    #[test]
    fn add_rejects_blank_title_without_mutating() {
        let mut model = ListModel::new();
        model.add("keep").unwrap();
        let before = model.clone();

        let err = model.add("   ").unwrap_err();
        assert_eq!(err, ValidationError::EmptyTitle);
        assert_eq!(model, before);
    }

    #[test]
    fn remove_and_toggle_unknown_id_are_noops() {
        let mut model = ListModel::new();
        model.add("a").unwrap();
        let before = model.clone();

        assert_eq!(model.remove("missing"), None);
        assert_eq!(model.toggle("missing"), None);
        assert_eq!(model, before);
    }

    #[test]
    fn toggle_and_remaining_count() {
        let mut model = ListModel::new();
        let item = model.add("a").unwrap();
        model.add("b").unwrap();
        assert_eq!(model.remaining_count(), 2);

        assert_eq!(model.toggle(&item.id), Some(true));
        assert_eq!(model.remaining_count(), 1);
        assert!(model.get(&item.id).unwrap().completed);
    }

    #[test]
    fn clear_reports_removed_count() {
        let mut model = ListModel::new();
        model.add("a").unwrap();
        model.add("b").unwrap();
        assert_eq!(model.clear(), 2);
        assert!(model.is_empty());
    }

    #[test]
    fn from_items_rejects_duplicate_ids() {
        let item = ListItem::new("dup").unwrap();
        let err = ListModel::from_items(vec![item.clone(), item.clone()]).unwrap_err();
        assert_eq!(err, DuplicateItemId(item.id));
    }
}
