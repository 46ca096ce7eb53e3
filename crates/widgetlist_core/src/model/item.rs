//! List item domain model.
//!
//! # Responsibility
//! - Define the record rendered by the host list and by the widget.
//! - Generate fresh opaque ids and creation timestamps.
//!
//! # Invariants
//! - `id` is assigned at creation and never reused for another item.
//! - `title` is non-empty after trimming and immutable after creation.
//! - `created_at` carries millisecond precision for host-created items.
//!
//! # Accepted risk
//! Fresh ids are UUID v4 strings (122 random bits). For `n` ids the
//! collision probability is roughly `n^2 / 2^123`, below `1e-25` at one
//! million items. `ListModel::add` still re-rolls on a collision with an
//! existing id, so the uniqueness invariant never depends on luck alone.

use chrono::{DateTime, SubsecRound, Utc};
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

/// Opaque item identifier.
///
/// Kept as a plain string because ids decoded from an existing snapshot may
/// come from other writers and are not guaranteed to be UUIDs.
pub type ItemId = String;

/// Input validation failure, raised before any state is mutated.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Title is empty after trimming surrounding whitespace.
    EmptyTitle,
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::EmptyTitle => write!(f, "title must not be empty"),
        }
    }
}

impl Error for ValidationError {}

/// One entry of the shared list.
///
/// Field names on the wire are fixed: `id`, `title`, `completed`,
/// `createdAt`. Unknown fields are ignored on decode.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ListItem {
    pub id: ItemId,
    pub title: String,
    pub completed: bool,
    /// RFC 3339 UTC on the wire; display/ordering metadata only.
    #[serde(with = "created_at_format")]
    pub created_at: DateTime<Utc>,
}

impl ListItem {
    /// Creates a new, not yet completed item with a fresh id.
    ///
    /// # Errors
    /// - `ValidationError::EmptyTitle` when `title` is blank.
    pub fn new(title: &str) -> Result<Self, ValidationError> {
        let title = normalize_title(title)?;
        Ok(Self {
            id: new_item_id(),
            title,
            completed: false,
            created_at: Utc::now().trunc_subsecs(3),
        })
    }

    /// Flips `completed` and returns the new value.
    pub fn toggle(&mut self) -> bool {
        self.completed = !self.completed;
        self.completed
    }
}

/// Generates a fresh opaque item id.
pub fn new_item_id() -> ItemId {
    Uuid::new_v4().to_string()
}

/// Trims a user-supplied title and rejects blank input.
pub fn normalize_title(title: &str) -> Result<String, ValidationError> {
    let trimmed = title.trim();
    if trimmed.is_empty() {
        return Err(ValidationError::EmptyTitle);
    }
    Ok(trimmed.to_string())
}

mod created_at_format {
    use chrono::{DateTime, SecondsFormat, Utc};
    use serde::{Deserialize, Deserializer, Serializer};

    pub fn serialize<S>(value: &DateTime<Utc>, serializer: S) -> Result<S::Ok, S::Error>
    where
        S: Serializer,
    {
        // AutoSi keeps every stored digit, so decode(encode(x)) is exact.
        serializer.serialize_str(&value.to_rfc3339_opts(SecondsFormat::AutoSi, true))
    }

    pub fn deserialize<'de, D>(deserializer: D) -> Result<DateTime<Utc>, D::Error>
    where
        D: Deserializer<'de>,
    {
        let raw = String::deserialize(deserializer)?;
        DateTime::parse_from_rfc3339(raw.as_str())
            .map(|value| value.with_timezone(&Utc))
            .map_err(|err| serde::de::Error::custom(format!("invalid createdAt `{raw}`: {err}")))
    }
}

#[cfg(test)]
mod tests {
    use super::{normalize_title, ListItem, ValidationError};
    use chrono::Timelike;

    #[test]
    fn new_item_defaults_to_not_completed() {
        let item = ListItem::new("Buy milk").expect("valid title");
        assert!(!item.completed);
        assert_eq!(item.title, "Buy milk");
        assert!(!item.id.is_empty());
    }

    #[test]
    fn new_item_truncates_timestamp_to_millis() {
        let item = ListItem::new("a").expect("valid title");
        assert_eq!(item.created_at.nanosecond() % 1_000_000, 0);
    }

    #[test]
    fn normalize_title_trims_and_rejects_blank() {
        assert_eq!(normalize_title("  Call mom \n").unwrap(), "Call mom");
        assert_eq!(normalize_title(" \t ").unwrap_err(), ValidationError::EmptyTitle);
    }

    #[test]
    fn toggle_flips_and_reports_new_value() {
        let mut item = ListItem::new("x").expect("valid title");
        assert!(item.toggle());
        assert!(!item.toggle());
    }
}
