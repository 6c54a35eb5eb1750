//! Note repository contract and SQLite implementation.
//!
//! # Responsibility
//! - Provide add / iterate / delete over the single `notes` table.
//! - Wrap each operation in its own transaction and log its phases.
//!
//! # Invariants
//! - Add never supplies an id; the store assigns it.
//! - Add reports insertion before commit, and success only after commit.
//! - Delete of an absent id commits and reports `false`, not an error.
//! - Scans run in ascending id order inside one read transaction.

use super::cursor::NoteCursor;
use super::{OperationPhase, TransactionError, TxResult};
use crate::db::StoreHandle;
use crate::model::note::{NewNote, NoteId};
use log::{debug, warn};
use rusqlite::{params, Connection, Transaction, TransactionBehavior};
use std::time::Instant;

/// Repository interface for note operations.
pub trait NoteRepository {
    /// Inserts `note`, calling `on_inserted` once the insert succeeded and
    /// before the transaction commits. Returns the id after commit.
    fn add_note_notify<F>(&self, note: &NewNote, on_inserted: F) -> TxResult<NoteId>
    where
        F: FnOnce(NoteId);

    /// Inserts `note` and returns its store-assigned id after commit.
    fn add_note(&self, note: &NewNote) -> TxResult<NoteId> {
        self.add_note_notify(note, |_| {})
    }

    /// Opens a fresh read transaction and a forward cursor over all notes.
    fn iterate_notes(&self) -> TxResult<NoteCursor<'_>>;

    /// Deletes the note with `id`. Returns whether a note was removed.
    fn delete_note(&self, id: NoteId) -> TxResult<bool>;
}

/// SQLite-backed note repository borrowing an opened store.
pub struct SqliteNoteRepository<'conn> {
    conn: &'conn Connection,
}

impl<'conn> SqliteNoteRepository<'conn> {
    /// Constructs a repository over a migrated store handle.
    pub fn new(handle: &'conn StoreHandle) -> Self {
        Self {
            conn: handle.connection(),
        }
    }
}

impl NoteRepository for SqliteNoteRepository<'_> {
    fn add_note_notify<F>(&self, note: &NewNote, on_inserted: F) -> TxResult<NoteId>
    where
        F: FnOnce(NoteId),
    {
        let started_at = Instant::now();
        log_phase("note_add", OperationPhase::Requested, None);

        let result = (|| -> TxResult<NoteId> {
            let tx = begin(self.conn, "note_add")?;
            tx.execute(
                "INSERT INTO notes (title, body) VALUES (?1, ?2);",
                params![note.title.as_str(), note.body.as_str()],
            )
            .map_err(TransactionError::Statement)?;

            let id = NoteId::new(tx.last_insert_rowid());
            log_phase("note_add", OperationPhase::Applied, Some(id));
            on_inserted(id);

            tx.commit().map_err(TransactionError::Commit)?;
            Ok(id)
        })();

        finish("note_add", started_at, result)
    }

    fn iterate_notes(&self) -> TxResult<NoteCursor<'_>> {
        log_phase("note_scan", OperationPhase::Requested, None);
        match NoteCursor::open(self.conn) {
            Ok(cursor) => {
                log_phase("note_scan", OperationPhase::TransactionOpen, None);
                Ok(cursor)
            }
            Err(err) => {
                warn!(
                    "event=note_scan module=repo status={} error={}",
                    OperationPhase::Errored.as_str(),
                    err
                );
                Err(err)
            }
        }
    }

    fn delete_note(&self, id: NoteId) -> TxResult<bool> {
        let started_at = Instant::now();
        log_phase("note_delete", OperationPhase::Requested, Some(id));

        let result = (|| -> TxResult<bool> {
            let tx = begin(self.conn, "note_delete")?;
            let changed = tx
                .execute("DELETE FROM notes WHERE id = ?1;", [id.get()])
                .map_err(TransactionError::Statement)?;
            log_phase("note_delete", OperationPhase::Applied, Some(id));

            tx.commit().map_err(TransactionError::Commit)?;
            Ok(changed > 0)
        })();

        finish("note_delete", started_at, result)
    }
}

fn begin<'conn>(conn: &'conn Connection, event: &'static str) -> TxResult<Transaction<'conn>> {
    let tx = Transaction::new_unchecked(conn, TransactionBehavior::Immediate)
        .map_err(TransactionError::Begin)?;
    log_phase(event, OperationPhase::TransactionOpen, None);
    Ok(tx)
}

fn finish<T>(event: &'static str, started_at: Instant, result: TxResult<T>) -> TxResult<T> {
    match &result {
        Ok(_) => debug!(
            "event={event} module=repo status={} duration_ms={}",
            OperationPhase::Completed.as_str(),
            started_at.elapsed().as_millis()
        ),
        Err(err) => warn!(
            "event={event} module=repo status={} duration_ms={} error={}",
            OperationPhase::Errored.as_str(),
            started_at.elapsed().as_millis(),
            err
        ),
    }
    result
}

fn log_phase(event: &'static str, phase: OperationPhase, id: Option<NoteId>) {
    match id {
        Some(id) => debug!(
            "event={event} module=repo status={} note_id={id}",
            phase.as_str()
        ),
        None => debug!("event={event} module=repo status={}", phase.as_str()),
    }
}
