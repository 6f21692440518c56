//! One modal editing session over a draft's note.
//!
//! `NoteEditor` owns the live document for the lifetime of a modal: it
//! hydrates from `draft.note` once per session, gates every mutation on the
//! surface mode, re-serializes into `draft.note` after each edit, and runs
//! token side effects (clipboard writes) without touching the note.

use std::rc::Rc;

use crate::actions::{EditorAction, Range};
use crate::catalog::{Catalog, StatusPartition, StockPartition};
use crate::codec;
use crate::document::NoteDocument;
use crate::draft::Draft;
use crate::drag::{self, MoveState};
use crate::error::EditorError;
use crate::execute::execute_action;
use crate::gutter::{GutterMetrics, ScrollSync};
use crate::html::HtmlOptions;
use crate::platform::{ClipboardPlatform, LogNotifier, Notice, Notifier, PlatformError};
use crate::token::{Token, TokenId};
use crate::types::{EditMode, EditorConfig, Selection};

/// What a token click led to.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum ClickOutcome {
    /// Nothing to do: unknown id, empty message, or a stale stock token.
    Ignored,
    /// A clipboard write of `count` entries was started.
    CopyRequested { count: usize },
}

pub struct NoteEditor {
    config: EditorConfig,
    draft: Draft,
    document: NoteDocument,
    mode: EditMode,
    hydrated: bool,
    selection: Option<Selection>,
    drag: MoveState,
    scroll: ScrollSync,
    notifier: Rc<dyn Notifier>,
}

impl NoteEditor {
    /// Open a session over `draft`, logging notices.
    pub fn new(draft: Draft) -> Self {
        Self::with_notifier(draft, Rc::new(LogNotifier))
    }

    /// Open a session over `draft`, sending notices to `notifier`.
    pub fn with_notifier(draft: Draft, notifier: Rc<dyn Notifier>) -> Self {
        let mut editor = Self {
            config: EditorConfig::default(),
            draft,
            document: NoteDocument::new(),
            mode: EditMode::ReadOnly,
            hydrated: false,
            selection: None,
            drag: MoveState::default(),
            scroll: ScrollSync::default(),
            notifier,
        };
        editor.open();
        editor
    }

    pub fn with_config(mut self, config: EditorConfig) -> Self {
        self.config = config;
        self
    }

    // === Session lifecycle ===

    /// Hydrate from `draft.note` unless this session already has.
    ///
    /// Returns whether hydration happened.
    pub fn open(&mut self) -> bool {
        if self.hydrated {
            return false;
        }
        self.document = NoteDocument::from_html(&self.draft.note);
        self.mode = EditMode::initial_for(&self.draft.note);
        self.selection = None;
        self.drag.cancel();
        self.hydrated = true;
        tracing::debug!(
            target: "delivery::editor",
            tokens = self.document.token_count(),
            mode = ?self.mode,
            "hydrated note"
        );
        true
    }

    /// Close the modal: discard the live document and allow a fresh
    /// hydration on the next `open`. The draft is kept, and edits are
    /// refused until the next `open`.
    pub fn close(&mut self) {
        self.hydrated = false;
        self.mode = EditMode::ReadOnly;
        self.document.clear();
        self.selection = None;
        self.drag.cancel();
        self.scroll = ScrollSync::default();
    }

    pub fn is_hydrated(&self) -> bool {
        self.hydrated
    }

    pub fn mode(&self) -> EditMode {
        self.mode
    }

    /// Switch the surface into editing. There is no way back this session.
    pub fn begin_editing(&mut self) {
        self.mode = EditMode::Editing;
    }

    pub fn config(&self) -> &EditorConfig {
        &self.config
    }

    /// Status-based stock partition from the configured used status.
    pub fn default_partition(&self) -> StatusPartition {
        StatusPartition::new(self.config.used_status.clone())
    }

    pub fn draft(&self) -> &Draft {
        &self.draft
    }

    /// Host access to the draft (template choice, stock picker state).
    ///
    /// Changing `note` here does not re-hydrate an open session.
    pub fn draft_mut(&mut self) -> &mut Draft {
        &mut self.draft
    }

    pub fn into_draft(self) -> Draft {
        self.draft
    }

    /// Hand the draft to the host's save callback. Never called implicitly.
    pub fn save<F: FnOnce(&Draft)>(&self, on_save: F) {
        on_save(&self.draft);
    }

    pub fn select_template(&mut self, label: impl Into<String>) {
        self.draft.template = label.into();
    }

    pub fn select_product(&mut self, product_id: Option<String>) {
        self.draft.stock_picker.product_id = product_id;
    }

    // === Surface state ===

    pub fn document(&self) -> &NoteDocument {
        &self.document
    }

    pub fn selection(&self) -> Option<Selection> {
        self.selection
    }

    /// Record the caret reported by the surface. `None` means no caret, or a
    /// caret outside the surface.
    pub fn set_selection(&mut self, selection: Option<Selection>) {
        self.selection = selection;
    }

    /// HTML for the live surface, with token ids.
    pub fn surface_html(&self) -> String {
        self.document
            .to_html_with(&HtmlOptions::surface(self.config.token_class.clone()))
    }

    pub fn metrics(&self) -> GutterMetrics {
        GutterMetrics::for_document(&self.document)
    }

    /// Content scrolled; returns the offset to apply to the gutter.
    pub fn on_content_scroll(&mut self, content_top: f64) -> f64 {
        self.scroll.on_content_scroll(content_top)
    }

    // === Mutations ===

    /// Insert a token at the caret.
    ///
    /// With no caret, or a caret outside the document, the token and a
    /// trailing space are appended. Otherwise the selection is replaced by the
    /// token and a trailing space, and the caret lands after the space.
    pub fn insert_at_caret(&mut self, token: Token) -> Result<TokenId, EditorError> {
        self.ensure_editing()?;

        let len = self.document.len();
        let id = match self.selection.filter(|sel| sel.fits(len)) {
            None => {
                let id = self.document.append_token(token);
                self.document.append_text(" ");
                self.selection = None;
                id
            }
            Some(sel) => {
                let start = sel.start();
                self.document.delete_range(sel.to_range());
                let id = self.document.insert_token(start, token);
                self.document.insert_text(start + 1, " ");
                self.selection = Some(Selection::collapsed(start + 2));
                id
            }
        };

        self.reserialize();
        Ok(id)
    }

    /// Insert a message token for the template chosen in the draft.
    pub fn insert_template(&mut self, catalog: &Catalog) -> Result<TokenId, EditorError> {
        self.ensure_editing()?;
        let token = catalog
            .template(&self.draft.template)
            .filter(|t| !t.value.is_empty())
            .map(|t| Token::message(t.label.as_str(), t.value.as_str()));
        match token {
            Some(token) => self.insert_at_caret(token),
            None => self.reject(EditorError::MissingSelection),
        }
    }

    /// Insert a stock token for the product chosen in the stock picker.
    pub fn insert_stock(&mut self, catalog: &Catalog) -> Result<TokenId, EditorError> {
        self.ensure_editing()?;
        let token = self
            .draft
            .stock_picker
            .product_id
            .as_deref()
            .and_then(|id| catalog.product(id))
            .map(|p| {
                let label = if p.name.is_empty() { &p.id } else { &p.name };
                Token::stock(label.as_str(), p.id.as_str())
            });
        let Some(token) = token else {
            return self.reject(EditorError::MissingSelection);
        };
        let id = self.insert_at_caret(token)?;
        self.draft.stock_picker.open = false;
        self.draft.stock_picker.query.clear();
        Ok(id)
    }

    /// Apply a typing action. Returns whether the document changed.
    pub fn apply(&mut self, action: &EditorAction) -> Result<bool, EditorError> {
        self.ensure_editing()?;
        let Some(selection) = execute_action(&mut self.document, action) else {
            return Ok(false);
        };
        self.selection = Some(selection);
        if !matches!(
            action,
            EditorAction::SelectAll | EditorAction::MoveCursor { .. }
        ) {
            self.reserialize();
        }
        Ok(true)
    }

    /// Type text at the caret, or at the end when there is none.
    pub fn type_text(&mut self, text: &str) -> Result<bool, EditorError> {
        let action = EditorAction::Insert {
            text: text.to_string(),
            range: self.caret_range(),
        };
        self.apply(&action)
    }

    /// The current selection as an action range, defaulting to the end.
    pub fn caret_range(&self) -> Range {
        let len = self.document.len();
        self.selection
            .filter(|sel| sel.fits(len))
            .map(Range::from)
            .unwrap_or(Range::caret(len))
    }

    // === Drag and drop ===

    /// `dragstart` on a token: mark it in flight and return the payload to
    /// attach to the transfer.
    pub fn begin_move(&mut self, id: TokenId) -> Result<String, EditorError> {
        let token = self
            .document
            .token(id)
            .ok_or_else(|| EditorError::MalformedDragPayload(format!("no token {id}")))?;
        let payload = codec::to_drag_payload(token)?;
        self.drag.begin(id);
        Ok(payload)
    }

    /// `drop` at `target` (a position in the current document, or `None`
    /// when the drop point could not be resolved).
    ///
    /// A token in flight from this surface is removed first, so the drop
    /// moves rather than copies. Undecodable payloads abort silently.
    pub fn drop_payload(
        &mut self,
        payload: &str,
        target: Option<usize>,
    ) -> Result<TokenId, EditorError> {
        self.ensure_editing()?;
        let token = match codec::from_drag_payload(payload) {
            Ok(token) => token,
            Err(e) => {
                tracing::debug!(target: "delivery::drag", error = %e, "ignoring drop");
                return Err(e);
            }
        };
        let origin = self.drag.take();
        let target = drag::detach_origin(&mut self.document, origin, target);
        self.selection = target.map(Selection::collapsed);
        self.insert_at_caret(token)
    }

    /// `dragend`: always forget the token in flight.
    pub fn end_move(&mut self) {
        self.drag.cancel();
    }

    pub fn move_in_flight(&self) -> Option<TokenId> {
        self.drag.in_flight()
    }

    // === Token interaction ===

    /// Run a token's click side effect. Never edits the document.
    ///
    /// Message tokens copy their value. Stock tokens resolve their product in
    /// the current catalog and copy its available codes, one per line. A
    /// stock token whose product no longer exists is ignored.
    pub fn click_token(
        &self,
        id: TokenId,
        catalog: &Catalog,
        partition: &dyn StockPartition,
        clipboard: &dyn ClipboardPlatform,
    ) -> Result<ClickOutcome, EditorError> {
        let Some(token) = self.document.token(id) else {
            return Ok(ClickOutcome::Ignored);
        };
        match token {
            Token::Message { value, .. } => match value.as_deref().filter(|v| !v.is_empty()) {
                Some(value) => {
                    self.copy(value, 1, clipboard);
                    Ok(ClickOutcome::CopyRequested { count: 1 })
                }
                None => Ok(ClickOutcome::Ignored),
            },
            Token::Stock { product_id, .. } => {
                let Some(product) = catalog.product(product_id) else {
                    tracing::debug!(target: "delivery::editor", %product_id, "stale stock token");
                    return Ok(ClickOutcome::Ignored);
                };
                let split = partition.split(&product.stocks);
                if split.available.is_empty() {
                    let name = if product.name.is_empty() {
                        &product.id
                    } else {
                        &product.name
                    };
                    return self.reject(EditorError::NoAvailableStock {
                        product: name.clone(),
                    });
                }
                let count = split.available.len();
                self.copy(&split.available_codes(), count, clipboard);
                Ok(ClickOutcome::CopyRequested { count })
            }
        }
    }

    // === Internals ===

    fn copy(&self, text: &str, count: usize, clipboard: &dyn ClipboardPlatform) {
        let notifier = Rc::clone(&self.notifier);
        clipboard.write_text(
            text,
            Box::new(move |result: Result<(), PlatformError>| match result {
                Ok(()) => notifier.notify(Notice::Copied { count }),
                Err(e) => {
                    tracing::warn!(target: "delivery::clipboard", error = %e, "clipboard write failed");
                    notifier.notify(Notice::Rejected(e.into()));
                }
            }),
        );
    }

    fn ensure_editing(&self) -> Result<(), EditorError> {
        if self.hydrated && self.mode.is_editing() {
            Ok(())
        } else {
            self.reject(EditorError::EditingDisabled)
        }
    }

    fn reject<T>(&self, error: EditorError) -> Result<T, EditorError> {
        if error.is_user_visible() {
            self.notifier.notify(Notice::Rejected(error.clone()));
        }
        Err(error)
    }

    fn reserialize(&mut self) {
        self.draft.note = self.document.to_html();
    }
}
