//! Line-number gutter metrics and scroll synchronization.

use std::ops::RangeInclusive;

use crate::document::NoteDocument;

/// Line and character counts of the rendered note.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct GutterMetrics {
    pub lines: usize,
    pub chars: usize,
}

impl GutterMetrics {
    /// Metrics for rendered surface text.
    pub fn from_text(text: &str) -> Self {
        Self {
            lines: text.split('\n').count().max(1),
            chars: text.chars().count(),
        }
    }

    pub fn for_document(doc: &NoteDocument) -> Self {
        Self::from_text(&doc.rendered_text())
    }

    /// 1-indexed row numbers, one per line.
    pub fn rows(&self) -> RangeInclusive<usize> {
        1..=self.lines
    }
}

/// One-way scroll lock from the content surface to the gutter.
///
/// Every content scroll event is copied onto the gutter; the gutter never
/// drives the content.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct ScrollSync {
    gutter_top: f64,
}

impl ScrollSync {
    /// Record a content scroll and return the gutter's new scroll offset.
    pub fn on_content_scroll(&mut self, content_top: f64) -> f64 {
        self.gutter_top = content_top;
        self.gutter_top
    }

    pub fn gutter_top(&self) -> f64 {
        self.gutter_top
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Token;

    #[test]
    fn test_plain_text_lines() {
        assert_eq!(GutterMetrics::from_text("").lines, 1);
        assert_eq!(GutterMetrics::from_text("a").lines, 1);
        assert_eq!(GutterMetrics::from_text("a\nb\n").lines, 3);
        assert_eq!(GutterMetrics::from_text("\n\n\n\n").lines, 5);
    }

    #[test]
    fn test_chars_count_scalars() {
        assert_eq!(GutterMetrics::from_text("çay\n").chars, 4);
    }

    #[test]
    fn test_single_token_is_one_line() {
        let mut doc = NoteDocument::new();
        doc.append_token(Token::message("Greeting", "Hello\nthere"));
        let metrics = GutterMetrics::for_document(&doc);
        assert_eq!(metrics.lines, 1);
        assert_eq!(metrics.chars, "Greeting".len());
    }

    #[test]
    fn test_rows() {
        let metrics = GutterMetrics::from_text("a\nb\nc");
        assert_eq!(metrics.rows().collect::<Vec<_>>(), vec![1, 2, 3]);
    }

    #[test]
    fn test_scroll_follows_content() {
        let mut sync = ScrollSync::default();
        assert_eq!(sync.on_content_scroll(120.0), 120.0);
        assert_eq!(sync.on_content_scroll(40.5), 40.5);
        assert_eq!(sync.gutter_top(), 40.5);
    }
}
