//! delivery-editor-core: delivery-note editor logic without framework dependencies.
//!
//! This crate provides:
//! - `Token` and the `codec` that moves tokens through DOM attributes and drag payloads
//! - `NoteDocument` - ordered text runs and atomic tokens, with HTML projection
//! - `execute_action` - typing against the document, tokens kept atomic
//! - `NoteEditor` - one modal session: hydration, caret-aware insertion,
//!   drag-and-drop moves, token click side effects
//! - `GutterMetrics`/`ScrollSync` - line numbers for the side gutter

pub mod actions;
pub mod catalog;
pub mod codec;
pub mod document;
pub mod draft;
pub mod drag;
pub mod editor;
pub mod error;
pub mod execute;
pub mod gutter;
pub mod html;
pub mod platform;
pub mod token;
pub mod types;

pub use actions::{EditorAction, InputType, Range};
pub use catalog::{
    Catalog, MessageTemplate, Product, StatusPartition, StockEntry, StockPartition, StockSplit,
};
pub use codec::AttributeSet;
pub use document::{Node, NoteDocument, Unit};
pub use draft::{Draft, StockPicker};
pub use drag::MoveState;
pub use editor::{ClickOutcome, NoteEditor};
pub use error::EditorError;
pub use execute::execute_action;
pub use gutter::{GutterMetrics, ScrollSync};
pub use html::{DATA_TOKEN_ID, DATA_TRAILING_BREAK, HtmlOptions};
pub use platform::{ClipboardDone, ClipboardPlatform, LogNotifier, Notice, Notifier, PlatformError};
pub use smol_str::SmolStr;
pub use token::{Token, TokenId, TokenKind};
pub use types::{EditMode, EditorConfig, Selection};
