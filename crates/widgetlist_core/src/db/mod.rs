//! SQLite plumbing behind `SqliteStore`.
//!
//! # Responsibility
//! - Open the host's read-write connection (busy timeout, WAL, migrations).
//! - Open the widget's read-only connection without touching the file.
//!
//! # Invariants
//! - Schema version lives in `PRAGMA user_version`.
//! - Only the host connection migrates; the widget refuses newer schemas.
//! - Failures surface as `StorageError` so callers see one taxonomy.

pub mod migrations;
mod open;

pub use open::{open_db, open_db_in_memory, open_db_read_only, BUSY_TIMEOUT};
