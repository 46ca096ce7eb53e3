//! SQLite migration registry and executor for the shared store file.
//!
//! # Responsibility
//! - Register schema migrations in strictly increasing order.
//! - Apply pending migrations atomically.
//!
//! # Invariants
//! - `version` values must remain monotonic.
//! - Applied migration version is mirrored to `PRAGMA user_version`.
//! - A file written by a newer binary is rejected, never downgraded.

use crate::store::{StorageError, StoreResult};
use log::info;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("0001_kv_entries.sql"),
}];

/// Returns the latest migration version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Reads the schema version recorded in the store file.
pub fn schema_version(conn: &Connection) -> StoreResult<u32> {
    Ok(conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?)
}

/// Rejects a file written by a newer binary.
pub fn ensure_supported(version: u32) -> StoreResult<()> {
    let latest = latest_version();
    if version > latest {
        return Err(StorageError::SchemaTooNew {
            found: version,
            supported: latest,
        });
    }
    Ok(())
}

/// Brings the store schema up to `latest_version()`.
///
/// Returns the schema version the file was at before this call.
pub fn apply_migrations(conn: &mut Connection) -> StoreResult<u32> {
    let from_version = schema_version(conn)?;
    ensure_supported(from_version)?;

    let pending = MIGRATIONS
        .iter()
        .filter(|migration| migration.version > from_version)
        .collect::<Vec<_>>();
    if pending.is_empty() {
        return Ok(from_version);
    }

    let tx = conn.transaction()?;
    for migration in &pending {
        tx.execute_batch(migration.sql)?;
        tx.pragma_update(None, "user_version", migration.version)?;
    }
    tx.commit()?;

    info!(
        "event=store_migrate module=db status=ok from_version={} to_version={} applied={}",
        from_version,
        latest_version(),
        pending.len()
    );
    Ok(from_version)
}
