//! Host-to-widget replica synchronization.
//!
//! # Responsibility
//! - Bind the in-memory list to the shared store with full-snapshot writes.
//!
//! # Invariants
//! - Every write carries the entire list; there is no diff protocol.
//! - A failed write never rolls back the host list.
//!
//! # See also
//! - docs/architecture/widget-sync.md

pub mod writer;
