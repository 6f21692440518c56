//! Core editor types: selection, surface mode and configuration.
//!
//! These types are framework-agnostic. Offsets count document units: one per
//! text character, one per token.

use std::ops::Range;

use smol_str::SmolStr;

/// Text selection with anchor and head positions.
///
/// The anchor is where the selection started, the head is where the caret is now.
/// They may be in any order - use `start()` and `end()` for ordered bounds.
#[derive(Clone, Debug, Copy, PartialEq, Eq)]
pub struct Selection {
    /// Where selection started
    pub anchor: usize,
    /// Where caret is now
    pub head: usize,
}

impl Selection {
    /// Create a new selection.
    pub fn new(anchor: usize, head: usize) -> Self {
        Self { anchor, head }
    }

    /// Create a collapsed selection (caret position).
    pub fn collapsed(offset: usize) -> Self {
        Self {
            anchor: offset,
            head: offset,
        }
    }

    /// Get the start (lower bound) of the selection.
    pub fn start(&self) -> usize {
        self.anchor.min(self.head)
    }

    /// Get the end (upper bound) of the selection.
    pub fn end(&self) -> usize {
        self.anchor.max(self.head)
    }

    /// Check if the selection is collapsed (caret only).
    pub fn is_collapsed(&self) -> bool {
        self.anchor == self.head
    }

    /// Get the selection length.
    pub fn len(&self) -> usize {
        self.end() - self.start()
    }

    /// Check if empty (same as is_collapsed).
    pub fn is_empty(&self) -> bool {
        self.is_collapsed()
    }

    /// Convert to a Range<usize> (ordered).
    pub fn to_range(&self) -> Range<usize> {
        self.start()..self.end()
    }

    /// Whether both ends lie within a document of `len` units.
    pub fn fits(&self, len: usize) -> bool {
        self.end() <= len
    }
}

/// Mode of the editing surface for one modal session.
///
/// `ReadOnly -> Editing` is the only transition; there is no way back until
/// the session is closed.
#[derive(Clone, Debug, Copy, PartialEq, Eq, Default)]
pub enum EditMode {
    #[default]
    ReadOnly,
    Editing,
}

impl EditMode {
    /// Initial mode for a note: empty notes open straight into editing.
    pub fn initial_for(note: &str) -> Self {
        if note.trim().is_empty() {
            EditMode::Editing
        } else {
            EditMode::ReadOnly
        }
    }

    pub fn is_editing(self) -> bool {
        self == EditMode::Editing
    }
}

/// Editor configuration.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct EditorConfig {
    /// CSS class carried by every rendered token.
    pub token_class: SmolStr,
    /// MIME type used for token drag payloads.
    pub drag_mime: SmolStr,
    /// Stock status that marks an entry as used for the default partition.
    pub used_status: SmolStr,
}

impl Default for EditorConfig {
    fn default() -> Self {
        Self {
            token_class: SmolStr::new_static("note-token"),
            drag_mime: SmolStr::new_static("application/x-delivery-token"),
            used_status: SmolStr::new_static("used"),
        }
    }
}

impl EditorConfig {
    pub fn with_token_class(mut self, class: impl Into<SmolStr>) -> Self {
        self.token_class = class.into();
        self
    }

    pub fn with_drag_mime(mut self, mime: impl Into<SmolStr>) -> Self {
        self.drag_mime = mime.into();
        self
    }

    pub fn with_used_status(mut self, status: impl Into<SmolStr>) -> Self {
        self.used_status = status.into();
        self
    }
}
