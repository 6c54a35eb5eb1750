//! Asynchronous note service over a dedicated store worker.
//!
//! # Responsibility
//! - Own the session's single `StoreHandle` on one worker thread.
//! - Queue add / iterate / delete and report outcomes through completions.
//!
//! # Invariants
//! - Calls never block the caller; outcomes arrive through channels.
//! - The worker runs one transaction at a time, in command arrival order.
//! - Relative completion order across operations is not part of the contract.
//! - A scan started before an add may or may not include the new note.
//! - A scan advances only as its stream is pulled. At most `SCAN_BUFFER`
//!   notes wait ahead of the consumer, and commands queued behind the scan
//!   run once the stream is drained or dropped.

use super::completion::{AddRequest, Completion, Notification};
use super::note_stream::{NoteStream, ScanStep};
use crate::config::StoreConfig;
use crate::db::{open_store, OpenError, OpenResult};
use crate::model::note::{NewNote, NoteId};
use crate::repo::note_repo::{NoteRepository, SqliteNoteRepository};
use crate::repo::TxResult;
use log::{error, info, warn};
use std::thread::JoinHandle;
use tokio::sync::{mpsc, oneshot};

const WORKER_THREAD_NAME: &str = "notekeep-store";
const SCAN_BUFFER: usize = 16;

enum Command {
    Add {
        note: NewNote,
        inserted: oneshot::Sender<NoteId>,
        completed: oneshot::Sender<TxResult<NoteId>>,
    },
    Iterate {
        steps: mpsc::Sender<ScanStep>,
    },
    Delete {
        id: NoteId,
        completed: oneshot::Sender<TxResult<bool>>,
    },
}

/// Handle to an opened note store.
///
/// Dropping the service stops the worker once queued commands are done;
/// use [`NoteService::close`] to wait for that.
pub struct NoteService {
    name: String,
    schema_version: u32,
    commands: Option<mpsc::UnboundedSender<Command>>,
    worker: Option<JoinHandle<()>>,
}

impl NoteService {
    /// Opens the store on a fresh worker thread.
    ///
    /// # Errors
    /// Returns the `OpenError` from the initializer; the service is not
    /// created and nothing is retried.
    pub async fn open(config: StoreConfig) -> OpenResult<Self> {
        let (ready_tx, ready_rx) = oneshot::channel();
        let (commands, command_rx) = mpsc::unbounded_channel();

        let worker = std::thread::Builder::new()
            .name(WORKER_THREAD_NAME.to_string())
            .spawn(move || run_worker(config, ready_tx, command_rx))
            .map_err(OpenError::Worker)?;

        let ready = ready_rx.await.unwrap_or_else(|_| {
            Err(OpenError::Worker(std::io::Error::other(
                "store worker exited before reporting open status",
            )))
        });

        match ready {
            Ok((name, schema_version)) => Ok(Self {
                name,
                schema_version,
                commands: Some(commands),
                worker: Some(worker),
            }),
            Err(err) => Err(err),
        }
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn schema_version(&self) -> u32 {
        self.schema_version
    }

    /// Queues an insert of `{title, body}`; the store assigns the id.
    pub fn add(&self, title: impl Into<String>, body: impl Into<String>) -> AddRequest {
        let (inserted_tx, inserted) = Notification::channel();
        let (completed_tx, completed) = Completion::channel();
        self.send(Command::Add {
            note: NewNote::new(title, body),
            inserted: inserted_tx,
            completed: completed_tx,
        });
        AddRequest {
            inserted,
            completed,
        }
    }

    /// Starts a fresh full-table scan, ascending by id.
    ///
    /// The worker is busy with this scan until the stream finishes or is
    /// dropped. Awaiting a later command while holding an unpolled stream
    /// never resolves.
    pub fn iterate(&self) -> NoteStream {
        let (steps, step_rx) = mpsc::channel(SCAN_BUFFER);
        self.send(Command::Iterate { steps });
        NoteStream::new(step_rx)
    }

    /// Queues deletion of `id`. Resolves to whether a note was removed.
    pub fn delete(&self, id: impl Into<NoteId>) -> Completion<bool> {
        let (completed_tx, completed) = Completion::channel();
        self.send(Command::Delete {
            id: id.into(),
            completed: completed_tx,
        });
        completed
    }

    /// Stops accepting commands and waits for the worker to drain its queue.
    pub async fn close(mut self) {
        self.commands = None;
        if let Some(worker) = self.worker.take() {
            match tokio::task::spawn_blocking(move || worker.join()).await {
                Ok(Ok(())) => {}
                Ok(Err(_)) => error!("event=store_close module=service status=error reason=worker_panicked"),
                Err(err) => error!("event=store_close module=service status=error error={err}"),
            }
        }
    }

    fn send(&self, command: Command) {
        let Some(commands) = self.commands.as_ref() else {
            return;
        };
        // A failed send drops the command's senders, which resolves the
        // caller's completion to `StoreClosed`.
        if commands.send(command).is_err() {
            warn!("event=store_send module=service status=error reason=worker_gone");
        }
    }
}

impl Drop for NoteService {
    fn drop(&mut self) {
        // Closing the queue lets the worker finish pending commands and exit.
        self.commands = None;
    }
}

fn run_worker(
    config: StoreConfig,
    ready: oneshot::Sender<OpenResult<(String, u32)>>,
    mut commands: mpsc::UnboundedReceiver<Command>,
) {
    let handle = match open_store(&config) {
        Ok(handle) => handle,
        Err(err) => {
            let _ = ready.send(Err(err));
            return;
        }
    };

    let opened = (handle.name().to_string(), handle.schema_version());
    if ready.send(Ok(opened)).is_err() {
        return;
    }
    info!(
        "event=store_worker module=service status=started name={}",
        handle.name()
    );

    let repo = SqliteNoteRepository::new(&handle);
    while let Some(command) = commands.blocking_recv() {
        dispatch(&repo, command);
    }

    info!(
        "event=store_worker module=service status=stopped name={}",
        handle.name()
    );
}

fn dispatch(repo: &SqliteNoteRepository<'_>, command: Command) {
    match command {
        Command::Add {
            note,
            inserted,
            completed,
        } => {
            let result = repo.add_note_notify(&note, move |id| {
                let _ = inserted.send(id);
            });
            let _ = completed.send(result);
        }
        Command::Iterate { steps } => stream_scan(repo, &steps),
        Command::Delete { id, completed } => {
            let _ = completed.send(repo.delete_note(id));
        }
    }
}

fn stream_scan(repo: &SqliteNoteRepository<'_>, steps: &mpsc::Sender<ScanStep>) {
    let cursor = match repo.iterate_notes() {
        Ok(cursor) => cursor,
        Err(err) => {
            let _ = steps.blocking_send(ScanStep::Failed(err));
            return;
        }
    };

    for step in cursor {
        let forwarded = match step {
            Ok(note) => steps.blocking_send(ScanStep::Record(note)),
            Err(err) => {
                let _ = steps.blocking_send(ScanStep::Failed(err));
                return;
            }
        };
        if forwarded.is_err() {
            // Consumer dropped the stream; dropping the cursor ends the scan.
            return;
        }
    }

    let _ = steps.blocking_send(ScanStep::Finished);
}
