use notekeep_core::db::migrations::latest_version;
use notekeep_core::{open_store, open_store_in_memory, OpenError, StoreConfig};
use rusqlite::Connection;

#[test]
fn open_store_in_memory_creates_notes_table_and_indexes() {
    let handle = open_store_in_memory("notes_db", 1).unwrap();
    let conn = handle.connection();

    assert_eq!(schema_version(conn), latest_version());
    assert_eq!(handle.schema_version(), 1);
    assert_eq!(handle.name(), "notes_db");
    assert_object_exists(conn, "table", "notes");
    assert_object_exists(conn, "index", "notes_title_idx");
    assert_object_exists(conn, "index", "notes_body_idx");
}

#[test]
fn secondary_indexes_are_not_unique() {
    let handle = open_store_in_memory("notes_db", 1).unwrap();
    let conn = handle.connection();
    for _ in 0..2 {
        conn.execute(
            "INSERT INTO notes (title, body) VALUES ('same', 'same');",
            [],
        )
        .unwrap();
    }
    let count: i64 = conn
        .query_row("SELECT COUNT(*) FROM notes;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 2);
}

#[test]
fn opening_same_database_twice_is_idempotent() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::on_disk("notes_db", dir.path());

    let first = open_store(&config).unwrap();
    first
        .connection()
        .execute("INSERT INTO notes (title, body) VALUES ('kept', '');", [])
        .unwrap();
    drop(first);

    let second = open_store(&config).unwrap();
    assert_eq!(schema_version(second.connection()), latest_version());
    let count: i64 = second
        .connection()
        .query_row("SELECT COUNT(*) FROM notes;", [], |row| row.get(0))
        .unwrap();
    assert_eq!(count, 1);
    assert!(dir.path().join("notes_db.sqlite3").exists());
}

#[test]
fn open_creates_missing_data_directory() {
    let dir = tempfile::tempdir().unwrap();
    let nested = dir.path().join("a").join("b");
    let config = StoreConfig::on_disk("notes_db", &nested);

    open_store(&config).unwrap();
    assert!(nested.join("notes_db.sqlite3").exists());
}

#[test]
fn opening_database_with_newer_schema_version_returns_error() {
    let dir = tempfile::tempdir().unwrap();
    let config = StoreConfig::on_disk("future", dir.path());

    let conn = Connection::open(config.database_path().unwrap()).unwrap();
    conn.execute_batch("PRAGMA user_version = 999;").unwrap();
    drop(conn);

    let err = open_store(&config).unwrap_err();
    match err {
        OpenError::VersionDowngrade {
            db_version,
            requested,
        } => {
            assert_eq!(db_version, 999);
            assert_eq!(requested, latest_version());
        }
        other => panic!("unexpected error: {other}"),
    }
}

#[test]
fn requesting_unknown_or_zero_version_fails() {
    assert!(matches!(
        open_store_in_memory("notes_db", latest_version() + 1),
        Err(OpenError::UnsupportedSchemaVersion { .. })
    ));
    assert!(matches!(
        open_store_in_memory("notes_db", 0),
        Err(OpenError::InvalidVersion)
    ));
}

#[test]
fn invalid_names_are_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let err = open_store(&StoreConfig::on_disk("../escape", dir.path())).unwrap_err();
    assert!(matches!(err, OpenError::InvalidName(name) if name == "../escape"));
}

#[test]
fn unusable_data_directory_is_reported() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not_a_dir");
    std::fs::write(&blocker, b"file").unwrap();

    let err = open_store(&StoreConfig::on_disk("notes_db", &blocker)).unwrap_err();
    assert!(matches!(err, OpenError::Io { .. }));
}

fn schema_version(conn: &Connection) -> u32 {
    conn.query_row("PRAGMA user_version;", [], |row| row.get(0))
        .unwrap()
}

fn assert_object_exists(conn: &Connection, kind: &str, name: &str) {
    let exists: i64 = conn
        .query_row(
            "SELECT EXISTS(
                SELECT 1
                FROM sqlite_master
                WHERE type = ?1 AND name = ?2
            );",
            [kind, name],
            |row| row.get(0),
        )
        .unwrap();
    assert_eq!(exists, 1, "{kind} {name} does not exist");
}
