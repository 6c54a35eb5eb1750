//! Forward-only cursor over the `notes` table.
//!
//! # Responsibility
//! - Hold one read transaction for the duration of a full-table scan.
//! - Yield exactly one note per step, ascending by id.
//!
//! # Invariants
//! - Steps never revisit or skip an id visible to the scan's transaction.
//! - The read snapshot is taken when the cursor opens.
//! - The read transaction ends on exhaustion, on error, or on drop.
//! - `Exhausted` with zero yielded notes means the table was empty.

use super::{TransactionError, TxResult};
use crate::model::note::{Note, NoteId};
use log::debug;
use rusqlite::{Connection, OptionalExtension, Row, Transaction, TransactionBehavior};

const NEXT_NOTE_SQL: &str = "SELECT id, title, body
FROM notes
WHERE id > ?1
ORDER BY id ASC
LIMIT 1;";

/// Progress of a scan.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum CursorState {
    /// Transaction is open, no step taken yet.
    NotStarted,
    /// At least one step taken and more may follow.
    Open,
    /// No more notes; the transaction has ended.
    Exhausted,
}

/// Lazy full-table scan. Also usable as an `Iterator`.
///
/// While a cursor is alive its connection is inside a read transaction, so
/// writes issued on the same connection fail to begin until it is dropped
/// or exhausted.
pub struct NoteCursor<'conn> {
    tx: Option<Transaction<'conn>>,
    last_id: Option<i64>,
    yielded: usize,
    state: CursorState,
}

impl<'conn> NoteCursor<'conn> {
    pub(crate) fn open(conn: &'conn Connection) -> TxResult<Self> {
        let tx = Transaction::new_unchecked(conn, TransactionBehavior::Deferred)
            .map_err(TransactionError::Begin)?;
        // A deferred BEGIN takes no lock; reading the header takes the shared
        // lock now so a locked database fails here rather than mid-scan.
        tx.query_row("PRAGMA schema_version;", [], |_| Ok(()))
            .map_err(TransactionError::Begin)?;
        Ok(Self {
            tx: Some(tx),
            last_id: None,
            yielded: 0,
            state: CursorState::NotStarted,
        })
    }

    /// Moves to the next note, or returns `Ok(None)` once exhausted.
    pub fn advance(&mut self) -> TxResult<Option<Note>> {
        let Some(tx) = self.tx.as_ref() else {
            return Ok(None);
        };

        let after = self.last_id.unwrap_or(i64::MIN);
        let step = tx
            .prepare_cached(NEXT_NOTE_SQL)
            .and_then(|mut stmt| stmt.query_row([after], parse_note_row).optional());

        match step {
            Ok(Some(note)) => {
                self.last_id = Some(note.id.get());
                self.yielded += 1;
                self.state = CursorState::Open;
                Ok(Some(note))
            }
            Ok(None) => {
                self.finish()?;
                Ok(None)
            }
            Err(err) => {
                // Dropping the transaction rolls it back.
                self.tx = None;
                self.state = CursorState::Exhausted;
                Err(classify_step_error(err))
            }
        }
    }

    pub fn state(&self) -> CursorState {
        self.state
    }

    /// Number of notes yielded so far.
    pub fn yielded(&self) -> usize {
        self.yielded
    }

    /// True once the scan finished without yielding anything.
    pub fn is_empty_scan(&self) -> bool {
        self.state == CursorState::Exhausted && self.yielded == 0
    }

    fn finish(&mut self) -> TxResult<()> {
        self.state = CursorState::Exhausted;
        if let Some(tx) = self.tx.take() {
            tx.commit().map_err(TransactionError::Commit)?;
        }
        debug!(
            "event=note_scan module=repo status=exhausted yielded={}",
            self.yielded
        );
        Ok(())
    }
}

impl Iterator for NoteCursor<'_> {
    type Item = TxResult<Note>;

    fn next(&mut self) -> Option<Self::Item> {
        self.advance().transpose()
    }
}

fn classify_step_error(err: rusqlite::Error) -> TransactionError {
    match err {
        rusqlite::Error::InvalidColumnType(..) | rusqlite::Error::FromSqlConversionFailure(..) => {
            TransactionError::InvalidData(err.to_string())
        }
        other => TransactionError::Statement(other),
    }
}

fn parse_note_row(row: &Row<'_>) -> rusqlite::Result<Note> {
    Ok(Note {
        id: NoteId::new(row.get("id")?),
        title: row.get("title")?,
        body: row.get("body")?,
    })
}
