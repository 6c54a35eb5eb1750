//! List rendering for the terminal.

use notekeep_core::Note;

pub const EMPTY_SENTINEL: &str = "No notes stored.";

/// Builds display lines with the most recently added note first.
///
/// Notes arrive ascending by id; each one is prepended, so the last note
/// yielded ends up on top.
pub fn render_newest_first(notes: &[Note]) -> Vec<String> {
    let mut lines = Vec::with_capacity(notes.len());
    for note in notes {
        lines.insert(0, render_note(note));
    }
    lines
}

fn render_note(note: &Note) -> String {
    match (note.title.is_empty(), note.body.is_empty()) {
        (_, true) => format!("[{}] {}", note.id, note.title),
        (true, false) => format!("[{}] {}", note.id, note.body),
        (false, false) => format!("[{}] {}: {}", note.id, note.title, note.body),
    }
}

#[cfg(test)]
mod tests {
    use super::render_newest_first;
    use notekeep_core::{Note, NoteId};

    fn note(id: i64, title: &str, body: &str) -> Note {
        Note {
            id: NoteId::new(id),
            title: title.to_string(),
            body: body.to_string(),
        }
    }

    #[test]
    fn newest_note_is_rendered_first() {
        let lines = render_newest_first(&[
            note(1, "Shopping", "Milk,Eggs"),
            note(2, "Todo", "Call plumber"),
        ]);
        assert_eq!(
            lines,
            vec![
                "[2] Todo: Call plumber".to_string(),
                "[1] Shopping: Milk,Eggs".to_string(),
            ]
        );
    }

    #[test]
    fn empty_fields_are_rendered_without_separator() {
        let lines = render_newest_first(&[note(3, "", "only body"), note(4, "only title", "")]);
        assert_eq!(lines, vec!["[4] only title", "[3] only body"]);
    }
}
