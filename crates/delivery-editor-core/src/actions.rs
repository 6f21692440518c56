//! Editor actions and input types.
//!
//! Platform-agnostic definitions for typing operations. `EditorAction`
//! represents a semantic edit on the note, while `InputType` represents the
//! intent of an input event (browser `beforeinput`, native input methods, ...).

/// A range in the document, measured in document units.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Range {
    pub start: usize,
    pub end: usize,
}

impl Range {
    pub fn new(start: usize, end: usize) -> Self {
        Self { start, end }
    }

    pub fn caret(offset: usize) -> Self {
        Self {
            start: offset,
            end: offset,
        }
    }

    pub fn is_caret(&self) -> bool {
        self.start == self.end
    }

    pub fn len(&self) -> usize {
        self.end.saturating_sub(self.start)
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }

    /// Normalize range so start <= end.
    pub fn normalize(self) -> Self {
        if self.start <= self.end {
            self
        } else {
            Self {
                start: self.end,
                end: self.start,
            }
        }
    }
}

impl From<std::ops::Range<usize>> for Range {
    fn from(r: std::ops::Range<usize>) -> Self {
        Self::new(r.start, r.end)
    }
}

impl From<Range> for std::ops::Range<usize> {
    fn from(r: Range) -> Self {
        r.start..r.end
    }
}

impl From<crate::Selection> for Range {
    fn from(sel: crate::Selection) -> Self {
        Self::new(sel.start(), sel.end())
    }
}

/// Semantic input types from input events.
///
/// Only the subset a plain-text note with tokens can honour. Formatting and
/// history inputs land in `Unknown` and are ignored.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum InputType {
    /// Insert typed text.
    InsertText,
    /// Insert text from IME composition.
    InsertCompositionText,
    /// Insert a line break (Shift+Enter).
    InsertLineBreak,
    /// Insert a paragraph break (Enter). Notes have no paragraphs, so this is a line break.
    InsertParagraph,
    /// Insert from paste operation.
    InsertFromPaste,
    /// Insert from drop operation.
    InsertFromDrop,
    /// Insert replacement text (e.g., spell check correction).
    InsertReplacementText,
    /// Delete content backward (Backspace).
    DeleteContentBackward,
    /// Delete content forward (Delete key).
    DeleteContentForward,
    /// Delete word backward (Ctrl/Alt+Backspace).
    DeleteWordBackward,
    /// Delete by cut operation.
    DeleteByCut,
    /// Delete by drag operation.
    DeleteByDrag,
    /// Generic content deletion.
    DeleteContent,
    /// Unrecognized input type.
    Unknown(String),
}

/// All typing actions.
///
/// These represent semantic operations on the note, decoupled from how
/// they're triggered. Token insertion and moves are not actions: they go
/// through the session's caret-aware insertion path.
#[derive(Debug, Clone, PartialEq)]
pub enum EditorAction {
    /// Insert text at the given range (replacing any selected content).
    Insert { text: String, range: Range },

    /// Insert a line break.
    InsertLineBreak { range: Range },

    /// Delete content backward (Backspace). A token is removed whole.
    DeleteBackward { range: Range },

    /// Delete content forward (Delete key). A token is removed whole.
    DeleteForward { range: Range },

    /// Delete word backward (Ctrl/Alt+Backspace).
    DeleteWordBackward { range: Range },

    /// Select the whole note.
    SelectAll,

    /// Move the caret to an offset.
    MoveCursor { offset: usize },
}

impl EditorAction {
    /// Build the action for an input event, if it maps to one.
    pub fn from_input(input_type: &InputType, data: Option<&str>, range: Range) -> Option<Self> {
        match input_type {
            InputType::InsertText
            | InputType::InsertFromPaste
            | InputType::InsertReplacementText => data.map(|text| EditorAction::Insert {
                text: text.to_string(),
                range,
            }),
            InputType::InsertLineBreak | InputType::InsertParagraph => {
                Some(EditorAction::InsertLineBreak { range })
            }
            InputType::DeleteContentBackward => Some(EditorAction::DeleteBackward { range }),
            InputType::DeleteContentForward => Some(EditorAction::DeleteForward { range }),
            InputType::DeleteWordBackward => Some(EditorAction::DeleteWordBackward { range }),
            InputType::DeleteByCut | InputType::DeleteByDrag | InputType::DeleteContent => {
                (!range.is_caret()).then_some(EditorAction::DeleteBackward { range })
            }
            InputType::InsertCompositionText
            | InputType::InsertFromDrop
            | InputType::Unknown(_) => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_range_normalize() {
        assert_eq!(Range::new(5, 2).normalize(), Range::new(2, 5));
        assert!(Range::caret(3).is_caret());
        assert_eq!(Range::new(2, 5).len(), 3);
    }

    #[test]
    fn test_from_input() {
        let range = Range::caret(4);
        assert_eq!(
            EditorAction::from_input(&InputType::InsertText, Some("x"), range),
            Some(EditorAction::Insert {
                text: "x".into(),
                range
            })
        );
        assert_eq!(
            EditorAction::from_input(&InputType::InsertParagraph, None, range),
            Some(EditorAction::InsertLineBreak { range })
        );
        assert_eq!(EditorAction::from_input(&InputType::InsertText, None, range), None);
        assert_eq!(EditorAction::from_input(&InputType::DeleteByCut, None, range), None);
        assert_eq!(
            EditorAction::from_input(&InputType::Unknown("formatBold".into()), None, range),
            None
        );
    }
}
