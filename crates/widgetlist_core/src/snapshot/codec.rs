//! JSON snapshot codec.
//!
//! Wire schema: an ordered array of
//! `{"id": string, "title": string, "completed": bool, "createdAt": RFC 3339}`.
//! Readers ignore unknown fields, and a missing key is an empty list.

use crate::model::item::{normalize_title, ItemId, ListItem};
use crate::model::list::ListModel;
use std::error::Error;
use std::fmt::{Display, Formatter};

pub type CodecResult<T> = Result<T, CodecError>;

/// Snapshot decode failure. The caller's model is never touched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CodecError {
    /// Blob is not a structurally valid snapshot.
    Malformed(String),
    /// Blob is well-formed JSON but repeats an item id.
    DuplicateId(ItemId),
}

impl Display for CodecError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Malformed(message) => write!(f, "malformed snapshot: {message}"),
            Self::DuplicateId(id) => write!(f, "malformed snapshot: duplicate item id `{id}`"),
        }
    }
}

impl Error for CodecError {}

/// Encodes the entire list. Deterministic for equal models.
pub fn encode(model: &ListModel) -> Vec<u8> {
    serde_json::to_vec(model.items()).expect("list items always serialize to JSON")
}

/// Decodes a snapshot blob into a fully validated list.
///
/// # Errors
/// - `CodecError::Malformed` for empty input, non-array roots, missing or
///   mistyped fields, invalid timestamps, empty ids and blank titles.
/// - `CodecError::DuplicateId` when two entries share an id.
pub fn decode(blob: &[u8]) -> CodecResult<ListModel> {
    let items: Vec<ListItem> =
        serde_json::from_slice(blob).map_err(|err| CodecError::Malformed(err.to_string()))?;
    for (index, item) in items.iter().enumerate() {
        validate_item(index, item)?;
    }
    ListModel::from_items(items).map_err(|err| CodecError::DuplicateId(err.0))
}

fn validate_item(index: usize, item: &ListItem) -> CodecResult<()> {
    if item.id.trim().is_empty() {
        return Err(CodecError::Malformed(format!("item {index}: empty id")));
    }
    normalize_title(&item.title)
        .map(|_| ())
        .map_err(|_| CodecError::Malformed(format!("item {index}: blank title")))
}

/// Decodes an optional blob; a missing key reads as the empty list.
pub fn decode_optional(blob: Option<&[u8]>) -> CodecResult<ListModel> {
    match blob {
        Some(bytes) => decode(bytes),
        None => Ok(ListModel::new()),
    }
}
