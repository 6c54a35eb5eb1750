//! Completion notifications for queued store operations.
//!
//! # Invariants
//! - A `Completion` resolves exactly once, to the transaction outcome.
//! - A `Notification` resolves to `None` when its event never fired.
//! - A vanished store worker surfaces as `TransactionError::StoreClosed`.

use crate::model::note::NoteId;
use crate::repo::{TransactionError, TxResult};
use std::future::Future;
use std::pin::Pin;
use std::task::{Context, Poll};
use tokio::sync::oneshot;

/// Resolves to an operation's transaction outcome. This is the error channel.
#[derive(Debug)]
#[must_use = "completions report failures only when awaited"]
pub struct Completion<T> {
    rx: oneshot::Receiver<TxResult<T>>,
}

impl<T> Completion<T> {
    pub(crate) fn channel() -> (oneshot::Sender<TxResult<T>>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { rx })
    }
}

impl<T> Future for Completion<T> {
    type Output = TxResult<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx)
            .poll(cx)
            .map(|received| received.unwrap_or(Err(TransactionError::StoreClosed)))
    }
}

/// Resolves to the payload of a success-only event, or `None` if it never fired.
#[derive(Debug)]
pub struct Notification<T> {
    rx: oneshot::Receiver<T>,
}

impl<T> Notification<T> {
    pub(crate) fn channel() -> (oneshot::Sender<T>, Self) {
        let (tx, rx) = oneshot::channel();
        (tx, Self { rx })
    }
}

impl<T> Future for Notification<T> {
    type Output = Option<T>;

    fn poll(mut self: Pin<&mut Self>, cx: &mut Context<'_>) -> Poll<Self::Output> {
        Pin::new(&mut self.rx).poll(cx).map(Result::ok)
    }
}

/// Pending add with its two independent events.
///
/// `inserted` fires once the insert request succeeded (typically used to
/// clear input). `completed` fires after the transaction commits, or with the
/// error when it fails; only then is the note durably visible to new scans.
/// `inserted` may resolve before `completed`.
#[derive(Debug)]
pub struct AddRequest {
    pub inserted: Notification<NoteId>,
    pub completed: Completion<NoteId>,
}

impl AddRequest {
    /// Waits for the transaction outcome, ignoring the insertion event.
    pub async fn wait(self) -> TxResult<NoteId> {
        self.completed.await
    }
}
