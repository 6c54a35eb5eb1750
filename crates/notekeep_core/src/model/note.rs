//! Note domain model.
//!
//! # Responsibility
//! - Define the stored note record and its insert-only shape.
//! - Coerce external identifiers into the native key type.
//!
//! # Invariants
//! - `NoteId` is assigned by the store and immutable after insertion.
//! - Within one store lifetime ids strictly increase and are never reused.

use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use std::str::FromStr;

/// Store-assigned primary key of a note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct NoteId(i64);

impl NoteId {
    pub const fn new(value: i64) -> Self {
        Self(value)
    }

    /// Raw integer key as stored in the `notes.id` column.
    pub const fn get(self) -> i64 {
        self.0
    }
}

impl From<i64> for NoteId {
    fn from(value: i64) -> Self {
        Self(value)
    }
}

impl Display for NoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "{}", self.0)
    }
}

/// Identifier text that is not a valid integer key.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct InvalidNoteId(pub String);

impl Display for InvalidNoteId {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        write!(f, "invalid note id `{}`", self.0)
    }
}

impl Error for InvalidNoteId {}

impl FromStr for NoteId {
    type Err = InvalidNoteId;

    /// Parses identifiers handed back by presentation layers (e.g. `"12"`).
    fn from_str(value: &str) -> Result<Self, Self::Err> {
        value
            .trim()
            .parse::<i64>()
            .map(Self)
            .map_err(|_| InvalidNoteId(value.to_string()))
    }
}

/// A stored note as returned by iteration.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Note {
    pub id: NoteId,
    /// May be empty.
    pub title: String,
    /// May be empty.
    pub body: String,
}

/// Insert shape for a note; the store assigns the id.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewNote {
    pub title: String,
    pub body: String,
}

impl NewNote {
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}
