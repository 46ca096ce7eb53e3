//! Widget-side read path.
//!
//! # Responsibility
//! - Read the replica the way a widget extension does on its own schedule.
//!
//! # Invariants
//! - A missing namespace, store file or key renders as an empty list.
//! - A malformed blob is an error, never a truncated list.
//! - Reading never creates, migrates or reconfigures anything in the
//!   namespace; the host process is the only writer.

use crate::config::{is_provisioned, SyncConfig};
use crate::model::item::ListItem;
use crate::snapshot::codec;
use crate::store::{open_reader, SerializedStore};
use crate::sync::writer::LoadError;
use log::info;

/// What the widget renders.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct WidgetSnapshot {
    pub items: Vec<ListItem>,
    /// Items not yet completed.
    pub remaining: usize,
}

/// Reads the current replica for rendering.
///
/// # Errors
/// - `LoadError::Storage` when the provisioned store cannot be read.
/// - `LoadError::Codec` when the stored blob is malformed.
pub fn read_widget_snapshot(config: &SyncConfig) -> Result<WidgetSnapshot, LoadError> {
    if !is_provisioned(config) {
        info!(
            "event=widget_read module=widget status=skip reason=namespace_not_provisioned namespace={}",
            config.namespace
        );
        return Ok(WidgetSnapshot::default());
    }

    let blob = match open_reader(config)? {
        Some(store) => store.read(config.storage_key.as_str())?,
        None => None,
    };
    let model = codec::decode_optional(blob.as_deref())?;
    info!(
        "event=widget_read module=widget status=ok namespace={} items={} present={}",
        config.namespace,
        model.len(),
        blob.is_some()
    );
    Ok(WidgetSnapshot {
        remaining: model.remaining_count(),
        items: model.into_items(),
    })
}
