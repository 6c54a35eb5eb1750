//! Asynchronous store facade.
//!
//! # Responsibility
//! - Turn synchronous repository transactions into completion notifications.
//! - Keep callers decoupled from the worker thread and SQLite details.

pub mod completion;
pub mod note_service;
pub mod note_stream;
