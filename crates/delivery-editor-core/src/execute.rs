//! Action execution for note documents.
//!
//! `execute_action` applies an `EditorAction` to a `NoteDocument` and returns
//! the selection that should follow it. Tokens are atomic: deletions that
//! reach a token remove it whole, and insertions never land inside one.

use crate::actions::{EditorAction, Range};
use crate::document::{NoteDocument, Unit};
use crate::types::Selection;

/// Execute an editor action on a document.
///
/// Returns the resulting selection, or `None` if the action changed nothing.
pub fn execute_action(doc: &mut NoteDocument, action: &EditorAction) -> Option<Selection> {
    match action {
        EditorAction::Insert { text, range } => execute_insert(doc, text, *range),
        EditorAction::InsertLineBreak { range } => execute_insert(doc, "\n", *range),
        EditorAction::DeleteBackward { range } => execute_delete_backward(doc, *range),
        EditorAction::DeleteForward { range } => execute_delete_forward(doc, *range),
        EditorAction::DeleteWordBackward { range } => execute_delete_word_backward(doc, *range),
        EditorAction::SelectAll => Some(Selection::new(0, doc.len())),
        EditorAction::MoveCursor { offset } => Some(Selection::collapsed((*offset).min(doc.len()))),
    }
}

fn clamp(doc: &NoteDocument, range: Range) -> Range {
    let len = doc.len();
    let range = range.normalize();
    Range::new(range.start.min(len), range.end.min(len))
}

fn execute_insert(doc: &mut NoteDocument, text: &str, range: Range) -> Option<Selection> {
    let range = clamp(doc, range);
    if text.is_empty() && range.is_caret() {
        return None;
    }
    doc.delete_range(range.into());
    doc.insert_text(range.start, text);
    Some(Selection::collapsed(range.start + text.chars().count()))
}

fn execute_delete_backward(doc: &mut NoteDocument, range: Range) -> Option<Selection> {
    let range = clamp(doc, range);
    if !range.is_caret() {
        doc.delete_range(range.into());
        return Some(Selection::collapsed(range.start));
    }
    if range.start == 0 {
        return None;
    }
    doc.delete_range(range.start - 1..range.start);
    Some(Selection::collapsed(range.start - 1))
}

fn execute_delete_forward(doc: &mut NoteDocument, range: Range) -> Option<Selection> {
    let range = clamp(doc, range);
    if !range.is_caret() {
        doc.delete_range(range.into());
        return Some(Selection::collapsed(range.start));
    }
    if range.start >= doc.len() {
        return None;
    }
    doc.delete_range(range.start..range.start + 1);
    Some(Selection::collapsed(range.start))
}

fn execute_delete_word_backward(doc: &mut NoteDocument, range: Range) -> Option<Selection> {
    let range = clamp(doc, range);
    if !range.is_caret() {
        return execute_delete_backward(doc, range);
    }
    let start = find_word_boundary_backward(doc, range.start);
    if start == range.start {
        return None;
    }
    doc.delete_range(start..range.start);
    Some(Selection::collapsed(start))
}

/// Start of the word ending at `offset`.
///
/// Skips trailing whitespace, then word characters. A token directly before
/// the caret counts as one word on its own.
pub fn find_word_boundary_backward(doc: &NoteDocument, offset: usize) -> usize {
    let mut pos = offset;
    while pos > 0 && matches!(doc.unit_at(pos - 1), Some(Unit::Char(c)) if c.is_whitespace()) {
        pos -= 1;
    }
    if pos > 0 && matches!(doc.unit_at(pos - 1), Some(Unit::Token(..))) {
        return pos - 1;
    }
    while pos > 0 && matches!(doc.unit_at(pos - 1), Some(Unit::Char(c)) if !c.is_whitespace()) {
        pos -= 1;
    }
    pos
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Token;

    fn doc_with_token() -> NoteDocument {
        // "ab" [K] "cd"
        let mut doc = NoteDocument::new();
        doc.append_text("ab");
        doc.append_token(Token::stock("K", "p1"));
        doc.append_text("cd");
        doc
    }

    #[test]
    fn test_insert_replaces_selection() {
        let mut doc = doc_with_token();
        let sel = execute_action(
            &mut doc,
            &EditorAction::Insert {
                text: "xyz".into(),
                range: Range::new(1, 4),
            },
        );
        assert_eq!(sel, Some(Selection::collapsed(4)));
        assert_eq!(doc.rendered_text(), "axyzd");
        assert_eq!(doc.token_count(), 0);
    }

    #[test]
    fn test_typing_next_to_token_stays_outside() {
        let mut doc = doc_with_token();
        execute_action(
            &mut doc,
            &EditorAction::Insert {
                text: "!".into(),
                range: Range::caret(3),
            },
        );
        assert_eq!(doc.rendered_text(), "abK!cd");
        assert_eq!(doc.token_position(doc.tokens().next().unwrap().0), Some(2));
    }

    #[test]
    fn test_backspace_removes_whole_token() {
        let mut doc = doc_with_token();
        let sel = execute_action(
            &mut doc,
            &EditorAction::DeleteBackward {
                range: Range::caret(3),
            },
        );
        assert_eq!(sel, Some(Selection::collapsed(2)));
        assert_eq!(doc.rendered_text(), "abcd");
        assert_eq!(doc.token_count(), 0);
    }

    #[test]
    fn test_delete_forward_removes_whole_token() {
        let mut doc = doc_with_token();
        execute_action(
            &mut doc,
            &EditorAction::DeleteForward {
                range: Range::caret(2),
            },
        );
        assert_eq!(doc.rendered_text(), "abcd");
    }

    #[test]
    fn test_delete_at_edges_is_noop() {
        let mut doc = doc_with_token();
        assert_eq!(
            execute_action(&mut doc, &EditorAction::DeleteBackward { range: Range::caret(0) }),
            None
        );
        assert_eq!(
            execute_action(&mut doc, &EditorAction::DeleteForward { range: Range::caret(5) }),
            None
        );
        assert_eq!(doc.len(), 5);
    }

    #[test]
    fn test_line_break() {
        let mut doc = NoteDocument::new();
        doc.append_text("ab");
        execute_action(&mut doc, &EditorAction::InsertLineBreak { range: Range::caret(1) });
        assert_eq!(doc.rendered_text(), "a\nb");
    }

    #[test]
    fn test_word_boundary() {
        let mut doc = NoteDocument::new();
        doc.append_text("hello big ");
        doc.append_token(Token::stock("K", "p1"));
        doc.append_text("  world  ");
        // "hello big " [K] "  world  "
        assert_eq!(find_word_boundary_backward(&doc, doc.len()), 13);
        assert_eq!(find_word_boundary_backward(&doc, 13), 10);
        assert_eq!(find_word_boundary_backward(&doc, 10), 6);
    }

    #[test]
    fn test_select_all_and_move() {
        let mut doc = doc_with_token();
        assert_eq!(
            execute_action(&mut doc, &EditorAction::SelectAll),
            Some(Selection::new(0, 5))
        );
        assert_eq!(
            execute_action(&mut doc, &EditorAction::MoveCursor { offset: 99 }),
            Some(Selection::collapsed(5))
        );
    }
}
