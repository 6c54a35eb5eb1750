//! Connection bootstrap utilities for the note store.
//!
//! # Responsibility
//! - Open file or in-memory SQLite databases by logical name.
//! - Configure connection pragmas required by core behavior.
//! - Trigger schema migrations before returning a usable handle.
//!
//! # Invariants
//! - Returned handles have migrations applied up to the requested version.
//! - Open failures are returned, never panicked on.

use super::migrations::apply_migrations;
use super::{OpenError, OpenResult, StoreHandle};
use crate::config::StoreConfig;
use log::{error, info};
use rusqlite::Connection;
use std::time::{Duration, Instant};

/// Opens (or creates) the database described by `config`.
///
/// With no `directory` configured the database lives in memory and is gone
/// when the handle drops.
///
/// # Side effects
/// - Creates the data directory when missing.
/// - Emits `db_open` logging events with duration and status.
pub fn open_store(config: &StoreConfig) -> OpenResult<StoreHandle> {
    let started_at = Instant::now();
    let mode = if config.directory.is_some() {
        "file"
    } else {
        "memory"
    };
    info!(
        "event=db_open module=db status=start mode={mode} name={} schema_version={}",
        config.name, config.schema_version
    );

    match open_and_bootstrap(config) {
        Ok(handle) => {
            info!(
                "event=db_open module=db status=ok mode={mode} name={} duration_ms={}",
                handle.name(),
                started_at.elapsed().as_millis()
            );
            Ok(handle)
        }
        Err(err) => {
            error!(
                "event=db_open module=db status=error mode={mode} name={} duration_ms={} error_code={} error={}",
                config.name,
                started_at.elapsed().as_millis(),
                error_code(&err),
                err
            );
            Err(err)
        }
    }
}

/// Opens a named in-memory database at `schema_version`.
pub fn open_store_in_memory(name: &str, schema_version: u32) -> OpenResult<StoreHandle> {
    open_store(&StoreConfig {
        schema_version,
        ..StoreConfig::in_memory(name)
    })
}

fn open_and_bootstrap(config: &StoreConfig) -> OpenResult<StoreHandle> {
    validate_name(&config.name)?;

    let mut conn = match config.database_path() {
        Some(path) => {
            if let Some(dir) = path.parent() {
                std::fs::create_dir_all(dir).map_err(|source| OpenError::Io {
                    path: dir.to_path_buf(),
                    source,
                })?;
            }
            Connection::open(path)?
        }
        None => Connection::open_in_memory()?,
    };

    conn.busy_timeout(Duration::from_millis(config.busy_timeout_ms))?;
    let version = apply_migrations(&mut conn, config.schema_version)?;
    Ok(StoreHandle::new(config.name.clone(), version, conn))
}

fn validate_name(name: &str) -> OpenResult<()> {
    let trimmed = name.trim();
    let invalid = trimmed.is_empty()
        || trimmed == "."
        || trimmed == ".."
        || name.contains(['/', '\\', '\0']);
    if invalid {
        return Err(OpenError::InvalidName(name.to_string()));
    }
    Ok(())
}

fn error_code(err: &OpenError) -> &'static str {
    match err {
        OpenError::InvalidName(_) => "db_invalid_name",
        OpenError::InvalidVersion
        | OpenError::UnsupportedSchemaVersion { .. }
        | OpenError::VersionDowngrade { .. } => "db_version_mismatch",
        OpenError::Io { .. } => "db_dir_failed",
        OpenError::Sqlite(_) => "db_open_failed",
        OpenError::Worker(_) => "db_worker_failed",
    }
}
