//! Domain model for stored notes.
//!
//! # Responsibility
//! - Define the record shapes exchanged with the access layer.
//!
//! # Invariants
//! - Every stored note is identified by a store-assigned `NoteId`.
//! - Callers only ever hold point-in-time copies of stored notes.

pub mod note;
