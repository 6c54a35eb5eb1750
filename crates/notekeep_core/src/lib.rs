//! Core storage for notekeep: a local, transactional note store.
//!
//! The store initializer (`db`) opens and migrates the database; the record
//! access layer (`repo`) runs add / iterate / delete transactions; `service`
//! exposes the same operations asynchronously over a single store worker.

pub mod config;
pub mod db;
pub mod logging;
pub mod model;
pub mod repo;
pub mod service;

pub use config::{ConfigError, LoggingConfig, NotekeepConfig, StoreConfig};
pub use db::{open_store, open_store_in_memory, OpenError, StoreHandle};
pub use logging::{default_log_level, init_logging, logging_status, LoggingError};
pub use model::note::{InvalidNoteId, NewNote, Note, NoteId};
pub use repo::cursor::{CursorState, NoteCursor};
pub use repo::note_repo::{NoteRepository, SqliteNoteRepository};
pub use repo::{OperationPhase, TransactionError, TxResult};
pub use service::completion::{AddRequest, Completion, Notification};
pub use service::note_service::NoteService;
pub use service::note_stream::{NoteStream, ScanState};

/// Returns the core crate version.
pub fn core_version() -> &'static str {
    env!("CARGO_PKG_VERSION")
}
