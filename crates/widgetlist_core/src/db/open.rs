//! Connection bootstrap for the shared store file.
//!
//! # Invariants
//! - Host file connections run in WAL mode so a widget reader sees either
//!   the previous or the next committed snapshot while the host writes.
//! - Host connections are returned fully migrated.
//! - Read-only connections never change the journal mode or the schema.

use super::migrations::{apply_migrations, ensure_supported, schema_version};
use crate::store::{StorageError, StoreResult};
use log::{error, info};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;
use std::time::{Duration, Instant};

/// Upper bound for waiting on a lock held by the other process.
pub const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Mode {
    File,
    Memory,
    ReadOnly,
}

impl Mode {
    fn as_str(self) -> &'static str {
        match self {
            Self::File => "file",
            Self::Memory => "memory",
            Self::ReadOnly => "read_only",
        }
    }
}

/// Opens (creating if needed) the host's store file and migrates it.
pub fn open_db(path: impl AsRef<Path>) -> StoreResult<Connection> {
    open_with(Mode::File, || Connection::open(path))
}

/// Opens a migrated in-memory store database.
pub fn open_db_in_memory() -> StoreResult<Connection> {
    open_with(Mode::Memory, Connection::open_in_memory)
}

/// Opens an existing store file for reading only.
///
/// # Errors
/// - `StorageError::SchemaTooNew` when the file was written by a newer binary.
/// - `StorageError::Sqlite` when the file is missing or unreadable.
pub fn open_db_read_only(path: impl AsRef<Path>) -> StoreResult<Connection> {
    open_with(Mode::ReadOnly, || {
        Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
    })
}

fn open_with(
    mode: Mode,
    open: impl FnOnce() -> rusqlite::Result<Connection>,
) -> StoreResult<Connection> {
    let started_at = Instant::now();
    let result = open()
        .map_err(StorageError::from)
        .and_then(|mut conn| bootstrap(&mut conn, mode).map(|()| conn));

    match &result {
        Ok(_) => info!(
            "event=store_open module=db status=ok mode={} duration_ms={}",
            mode.as_str(),
            started_at.elapsed().as_millis()
        ),
        Err(err) => error!(
            "event=store_open module=db status=error mode={} duration_ms={} error_code={}",
            mode.as_str(),
            started_at.elapsed().as_millis(),
            err.code()
        ),
    }
    result
}

fn bootstrap(conn: &mut Connection, mode: Mode) -> StoreResult<()> {
    conn.busy_timeout(BUSY_TIMEOUT)?;
    match mode {
        Mode::ReadOnly => ensure_supported(schema_version(conn)?),
        Mode::File => {
            // journal_mode answers with a row; execute_batch would reject it.
            conn.query_row("PRAGMA journal_mode = WAL;", [], |row| row.get::<_, String>(0))?;
            apply_migrations(conn).map(|_| ())
        }
        Mode::Memory => apply_migrations(conn).map(|_| ()),
    }
}
