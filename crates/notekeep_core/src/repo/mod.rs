//! Record access layer: transactional add, scan and delete.
//!
//! # Responsibility
//! - Define the note data access contract.
//! - Isolate SQLite transaction and cursor details from callers.
//!
//! # Invariants
//! - Every operation runs in its own transaction scoped to `notes`.
//! - An operation that fails is reported once and has no partial effect.
//! - Deleting an absent id and scanning an empty table are successes.

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod cursor;
pub mod note_repo;

pub type TxResult<T> = Result<T, TransactionError>;

/// Failure local to one add/iterate/delete operation.
///
/// The operation's effect does not occur; callers may re-invoke it.
#[derive(Debug)]
pub enum TransactionError {
    /// The transaction could not be started.
    Begin(rusqlite::Error),
    /// A statement inside the transaction failed; the transaction rolled back.
    Statement(rusqlite::Error),
    /// The transaction could not be committed.
    Commit(rusqlite::Error),
    /// A stored row could not be decoded into a note.
    InvalidData(String),
    /// The store worker is gone; no transaction was attempted.
    StoreClosed,
}

impl TransactionError {
    /// Whether the failure happened before any statement ran.
    pub fn is_begin_failure(&self) -> bool {
        matches!(self, Self::Begin(_) | Self::StoreClosed)
    }
}

impl Display for TransactionError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Begin(err) => write!(f, "failed to start transaction: {err}"),
            Self::Statement(err) => write!(f, "transaction aborted: {err}"),
            Self::Commit(err) => write!(f, "failed to commit transaction: {err}"),
            Self::InvalidData(message) => write!(f, "invalid stored note: {message}"),
            Self::StoreClosed => write!(f, "note store is closed"),
        }
    }
}

impl Error for TransactionError {
    fn source(&self) -> Option<&(dyn Error + 'static)> {
        match self {
            Self::Begin(err) | Self::Statement(err) | Self::Commit(err) => Some(err),
            Self::InvalidData(_) | Self::StoreClosed => None,
        }
    }
}

/// Per-operation lifecycle, reported through log events.
///
/// `Requested -> TransactionOpen -> Applied -> Completed`, or `Errored` from
/// any earlier phase. Both `Completed` and `Errored` are terminal.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OperationPhase {
    Requested,
    TransactionOpen,
    Applied,
    Completed,
    Errored,
}

impl OperationPhase {
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Requested => "requested",
            Self::TransactionOpen => "tx_open",
            Self::Applied => "applied",
            Self::Completed => "completed",
            Self::Errored => "errored",
        }
    }
}
