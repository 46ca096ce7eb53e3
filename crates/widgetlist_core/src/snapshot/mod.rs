//! Snapshot wire format shared with the widget.
//!
//! # Responsibility
//! - Convert the whole list to and from one self-describing JSON blob.
//!
//! # Invariants
//! - A snapshot always encodes the entire list; there is no patch format.
//! - Decode yields a fully valid list or an error, never a partial list.
//!
//! # See also
//! - docs/architecture/widget-sync.md

pub mod codec;
