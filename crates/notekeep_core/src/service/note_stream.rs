//! Pull-based stream over one full-table scan.
//!
//! # Invariants
//! - Notes arrive ascending by id, one per poll.
//! - The channel is bounded, so the worker's cursor stays a few steps ahead
//!   of the consumer at most.
//! - After `Finished` or `Failed` the stream only yields `None`.
//! - `Finished { yielded: 0 }` is an empty table, distinct from `NotStarted`.

use crate::model::note::Note;
use crate::repo::{TransactionError, TxResult};
use futures_util::{Stream, StreamExt};
use std::pin::Pin;
use std::task::{ready, Context, Poll};
use tokio::sync::mpsc;

/// One cursor step forwarded from the store worker.
#[derive(Debug)]
pub(crate) enum ScanStep {
    Record(Note),
    Finished,
    Failed(TransactionError),
}

/// Consumer-side view of scan progress.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ScanState {
    NotStarted,
    Streaming { yielded: usize },
    Finished { yielded: usize },
    Failed { yielded: usize },
}

impl ScanState {
    fn yielded(self) -> usize {
        match self {
            Self::NotStarted => 0,
            Self::Streaming { yielded } | Self::Finished { yielded } | Self::Failed { yielded } => {
                yielded
            }
        }
    }
}

/// Stream of notes from a fresh read transaction.
#[derive(Debug)]
#[must_use = "streams do nothing unless polled"]
pub struct NoteStream {
    steps: mpsc::Receiver<ScanStep>,
    state: ScanState,
}

impl NoteStream {
    pub(crate) fn new(steps: mpsc::Receiver<ScanStep>) -> Self {
        Self {
            steps,
            state: ScanState::NotStarted,
        }
    }

    pub fn state(&self) -> ScanState {
        self.state
    }

    /// True once the scan completed without yielding any note.
    pub fn is_empty_scan(&self) -> bool {
        self.state == ScanState::Finished { yielded: 0 }
    }

    /// Drains the stream, stopping at the first error.
    pub async fn collect_notes(mut self) -> TxResult<Vec<Note>> {
        let mut notes = Vec::new();
        while let Some(step) = self.next().await {
            notes.push(step?);
        }
        Ok(notes)
    }
}

impl Stream for NoteStream {
    type Item = TxResult<Note>;

    fn poll_next(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Option<Self::Item>> {
        if matches!(
            self.state,
            ScanState::Finished { .. } | ScanState::Failed { .. }
        ) {
            return Poll::Ready(None);
        }

        let yielded = self.state.yielded();
        let item = match ready!(self.steps.poll_recv(cx)) {
            Some(ScanStep::Record(note)) => {
                self.state = ScanState::Streaming {
                    yielded: yielded + 1,
                };
                Some(Ok(note))
            }
            Some(ScanStep::Finished) => {
                self.state = ScanState::Finished { yielded };
                None
            }
            Some(ScanStep::Failed(err)) => {
                self.state = ScanState::Failed { yielded };
                Some(Err(err))
            }
            None => {
                self.state = ScanState::Failed { yielded };
                Some(Err(TransactionError::StoreClosed))
            }
        };
        Poll::Ready(item)
    }
}

#[cfg(test)]
mod tests {
    use super::{NoteStream, ScanState, ScanStep};
    use crate::model::note::{Note, NoteId};
    use crate::repo::TransactionError;
    use futures_util::StreamExt;
    use tokio::sync::mpsc;

    fn note(id: i64) -> Note {
        Note {
            id: NoteId::new(id),
            title: format!("t{id}"),
            body: String::new(),
        }
    }

    #[tokio::test]
    async fn tracks_state_through_a_finished_scan() {
        let (tx, rx) = mpsc::channel(4);
        let mut stream = NoteStream::new(rx);
        assert_eq!(stream.state(), ScanState::NotStarted);

        tx.try_send(ScanStep::Record(note(1))).unwrap();
        tx.try_send(ScanStep::Finished).unwrap();

        assert_eq!(stream.next().await.unwrap().unwrap().id, NoteId::new(1));
        assert_eq!(stream.state(), ScanState::Streaming { yielded: 1 });
        assert!(stream.next().await.is_none());
        assert_eq!(stream.state(), ScanState::Finished { yielded: 1 });
        assert!(!stream.is_empty_scan());
        assert!(stream.next().await.is_none());
    }

    #[tokio::test]
    async fn empty_scan_is_distinguishable_from_not_started() {
        let (tx, rx) = mpsc::channel(4);
        let mut stream = NoteStream::new(rx);
        assert!(!stream.is_empty_scan());

        tx.try_send(ScanStep::Finished).unwrap();
        assert!(stream.next().await.is_none());
        assert!(stream.is_empty_scan());
    }

    #[tokio::test]
    async fn dropped_worker_reports_store_closed_once() {
        let (tx, rx) = mpsc::channel::<ScanStep>(4);
        drop(tx);
        let mut stream = NoteStream::new(rx);

        let first = stream.next().await.unwrap();
        assert!(matches!(first, Err(TransactionError::StoreClosed)));
        assert!(stream.next().await.is_none());
        assert_eq!(stream.state(), ScanState::Failed { yielded: 0 });
    }
}
