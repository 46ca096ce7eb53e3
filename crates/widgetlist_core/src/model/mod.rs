//! List domain model shared by the host app and the widget replica.
//!
//! # Responsibility
//! - Define the canonical list item record and the ordered list container.
//! - Keep every list invariant inside core so UI layers cannot bypass it.
//!
//! # Invariants
//! - Item ids are unique within one list at all times.
//! - Insertion order is meaningful; new items are appended at the end.
//!
//! # See also
//! - docs/architecture/widget-sync.md

pub mod item;
pub mod list;
