//! SQLite store bootstrap and schema migration entry points.
//!
//! # Responsibility
//! - Open or create the note database and configure its connection.
//! - Apply schema migrations in deterministic order.
//! - Hand out a single owned `StoreHandle` per opened database.
//!
//! # Invariants
//! - Migration version is tracked via `PRAGMA user_version`.
//! - No record is read or written before migrations succeed.
//! - A `StoreHandle` is never cloned; the session owns exactly one.

use rusqlite::Connection;
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::path::PathBuf;

pub mod migrations;
mod open;

pub use open::{open_store, open_store_in_memory};

pub type OpenResult<T> = Result<T, OpenError>;

/// Failure to open or create the note database.
///
/// Fatal for the session: no record operation can run without a handle.
#[derive(Debug)]
pub enum OpenError {
    /// Database name is empty or would escape the data directory.
    InvalidName(String),
    /// Schema version `0` was requested.
    InvalidVersion,
    /// Requested version is newer than any migration this build knows.
    UnsupportedSchemaVersion {
        requested: u32,
        latest_supported: u32,
    },
    /// On-disk schema is newer than the requested version.
    VersionDowngrade { db_version: u32, requested: u32 },
    /// Data directory could not be created.
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    /// Storage subsystem refused to open, configure or migrate the database.
    Sqlite(rusqlite::Error),
    /// The background store worker could not be started.
    Worker(std::io::Error),
}

impl Display for OpenError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidName(name) => write!(f, "invalid database name `{name}`"),
            Self::InvalidVersion => write!(f, "schema version must be at least 1"),
            Self::UnsupportedSchemaVersion {
                requested,
                latest_supported,
            } => write!(
                f,
                "requested schema version {requested} is newer than supported {latest_supported}"
            ),
            Self::VersionDowngrade {
                db_version,
                requested,
            } => write!(
                f,
                "database schema version {db_version} is newer than requested {requested}"
            ),
            Self::Io { path, source } => write!(
                f,
                "failed to create data directory `{}`: {source}",
                path.display()
            ),
            Self::Sqlite(err) => write!(f, "{err}"),
            Self::Worker(err) => write!(f, "failed to start store worker: {err}"),
        }
    }
}

impl Error for OpenError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Io { source, .. } => Some(source),
            Self::Sqlite(err) => Some(err),
            Self::Worker(err) => Some(err),
            _ => None,
        }
    }
}

impl From<rusqlite::Error> for OpenError {
    fn from(value: rusqlite::Error) -> Self {
        Self::Sqlite(value)
    }
}

/// Owned handle to an opened, fully migrated note database.
///
/// The access layer borrows the connection from here; dropping the handle
/// closes the database.
#[derive(Debug)]
pub struct StoreHandle {
    name: String,
    schema_version: u32,
    conn: Connection,
}

impl StoreHandle {
    pub(crate) fn new(name: String, schema_version: u32, conn: Connection) -> Self {
        Self {
            name,
            schema_version,
            conn,
        }
    }

    /// Logical database name this handle was opened with.
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Schema version the database was migrated to.
    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    /// Underlying connection, for repositories and diagnostics.
    pub fn connection(&self) -> &Connection {
        &self.conn
    }
}
