//! SQLite migration registry and executor.
//!
//! # Responsibility
//! - Register schema migrations keyed by strictly increasing version.
//! - Apply the pending ones up to a requested version, atomically.
//!
//! # Invariants
//! - `version` values must remain monotonic.
//! - An applied migration is never executed again; gating is by
//!   `PRAGMA user_version`, not by `IF NOT EXISTS`.

use crate::db::{OpenError, OpenResult};
use log::debug;
use rusqlite::Connection;

#[derive(Debug, Clone, Copy)]
struct Migration {
    version: u32,
    sql: &'static str,
}

const MIGRATIONS: &[Migration] = &[Migration {
    version: 1,
    sql: include_str!("0001_notes.sql"),
}];

/// Returns the latest migration version known by this binary.
pub fn latest_version() -> u32 {
    MIGRATIONS.last().map_or(0, |migration| migration.version)
}

/// Brings the database up to `target` and returns the resulting version.
///
/// # Errors
/// - `InvalidVersion` when `target` is 0.
/// - `UnsupportedSchemaVersion` when `target` exceeds `latest_version()`.
/// - `VersionDowngrade` when the database is already past `target`.
pub fn apply_migrations(conn: &mut Connection, target: u32) -> OpenResult<u32> {
    if target == 0 {
        return Err(OpenError::InvalidVersion);
    }

    let latest = latest_version();
    if target > latest {
        return Err(OpenError::UnsupportedSchemaVersion {
            requested: target,
            latest_supported: latest,
        });
    }

    let current_version = current_user_version(conn)?;
    if current_version > target {
        return Err(OpenError::VersionDowngrade {
            db_version: current_version,
            requested: target,
        });
    }

    if current_version == target {
        return Ok(current_version);
    }

    let tx = conn.transaction()?;
    for migration in MIGRATIONS {
        if migration.version <= current_version || migration.version > target {
            continue;
        }

        debug!(
            "event=db_migrate module=db status=apply version={}",
            migration.version
        );
        tx.execute_batch(migration.sql)?;
        tx.execute_batch(&format!("PRAGMA user_version = {};", migration.version))?;
    }
    tx.commit()?;

    Ok(target)
}

/// Reads the schema version recorded in the database header.
pub fn current_user_version(conn: &Connection) -> OpenResult<u32> {
    let version = conn.query_row("PRAGMA user_version;", [], |row| row.get::<_, u32>(0))?;
    Ok(version)
}

#[cfg(test)]
mod tests {
    use super::{apply_migrations, current_user_version, latest_version};
    use crate::db::OpenError;
    use rusqlite::Connection;

    #[test]
    fn migrations_are_strictly_increasing() {
        let versions: Vec<u32> = super::MIGRATIONS.iter().map(|m| m.version).collect();
        assert!(versions.windows(2).all(|pair| pair[0] < pair[1]));
        assert_eq!(versions.first().copied(), Some(1));
    }

    #[test]
    fn reapplying_at_same_version_is_a_no_op() {
        let mut conn = Connection::open_in_memory().unwrap();
        assert_eq!(apply_migrations(&mut conn, 1).unwrap(), 1);
        assert_eq!(apply_migrations(&mut conn, 1).unwrap(), 1);
        assert_eq!(current_user_version(&conn).unwrap(), 1);
    }

    #[test]
    fn rejects_zero_and_unknown_versions() {
        let mut conn = Connection::open_in_memory().unwrap();
        assert!(matches!(
            apply_migrations(&mut conn, 0),
            Err(OpenError::InvalidVersion)
        ));

        let err = apply_migrations(&mut conn, latest_version() + 1).unwrap_err();
        assert!(matches!(
            err,
            OpenError::UnsupportedSchemaVersion { requested, .. } if requested == latest_version() + 1
        ));
        assert_eq!(current_user_version(&conn).unwrap(), 0);
    }
}
