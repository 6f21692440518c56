//! Browser event handling for the note surface.
//!
//! `NoteSurface::mount` wires a `NoteEditor` session to a contenteditable
//! element. Every DOM change goes through the session: `beforeinput` is
//! cancelled and replayed as an `EditorAction`, drops are decoded into
//! token moves, and the surface is re-rendered from the document afterwards.
//! A read-only surface is not contenteditable and gets no `beforeinput`, so
//! its keystrokes and pastes are replayed into the session directly, which
//! refuses them and reports the refusal.

use std::cell::{Ref, RefCell};
use std::rc::Rc;

use delivery_editor_core::{
    Catalog, DATA_TOKEN_ID, Draft, EditorAction, EditorError, InputType, NoteEditor, TokenId,
};
use gloo_events::{EventListener, EventListenerOptions};
use smol_str::SmolStr;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{
    ClipboardEvent, DragEvent, Element, Event, EventTarget, HtmlElement, InputEvent, KeyboardEvent,
};

use crate::clipboard::BrowserClipboard;
use crate::dom_sync;

// === Caret-from-point bindings ===
//
// web-sys does not expose the hit-testing helpers used to resolve a drop
// point. Chromium and WebKit ship `caretRangeFromPoint`, Gecko ships
// `caretPositionFromPoint`; calling the missing one throws, hence `catch`.

#[wasm_bindgen]
extern "C" {
    /// Result of `document.caretPositionFromPoint`.
    pub type CaretPosition;

    #[wasm_bindgen(method, getter = offsetNode, structural)]
    fn offset_node(this: &CaretPosition) -> web_sys::Node;

    #[wasm_bindgen(method, getter, structural)]
    fn offset(this: &CaretPosition) -> u32;

    /// `Document` viewed through the hit-testing methods above.
    #[wasm_bindgen(extends = web_sys::Document)]
    type DocumentExt;

    #[wasm_bindgen(method, catch, js_name = caretRangeFromPoint)]
    fn caret_range_from_point(
        this: &DocumentExt,
        x: f64,
        y: f64,
    ) -> Result<Option<web_sys::Range>, JsValue>;

    #[wasm_bindgen(method, catch, js_name = caretPositionFromPoint)]
    fn caret_position_from_point(
        this: &DocumentExt,
        x: f64,
        y: f64,
    ) -> Result<Option<CaretPosition>, JsValue>;
}

/// Document offset under the viewport point `(x, y)`, if it lies in `root`.
pub fn offset_from_point(root: &web_sys::Node, x: f64, y: f64) -> Option<usize> {
    let document = web_sys::window()?.document()?;
    let document: &DocumentExt = document.unchecked_ref();
    if let Ok(Some(range)) = document.caret_range_from_point(x, y) {
        let container = range.start_container().ok()?;
        let offset = range.start_offset().ok()?;
        return dom_sync::dom_position_to_offset(root, &container, offset);
    }
    if let Ok(Some(position)) = document.caret_position_from_point(x, y) {
        return dom_sync::dom_position_to_offset(root, &position.offset_node(), position.offset());
    }
    None
}

// === InputType browser parsing ===

/// Parse a browser inputType string to an InputType enum.
///
/// Handles the W3C Input Events inputType values this surface acts on;
/// formatting and history inputs land in `Unknown`.
pub fn parse_browser_input_type(s: &str) -> InputType {
    match s {
        // Insertion
        "insertText" => InputType::InsertText,
        "insertCompositionText" => InputType::InsertCompositionText,
        "insertLineBreak" => InputType::InsertLineBreak,
        "insertParagraph" => InputType::InsertParagraph,
        "insertFromPaste" => InputType::InsertFromPaste,
        "insertFromDrop" => InputType::InsertFromDrop,
        "insertReplacementText" => InputType::InsertReplacementText,

        // Deletion
        "deleteContentBackward" => InputType::DeleteContentBackward,
        "deleteContentForward" => InputType::DeleteContentForward,
        "deleteWordBackward" => InputType::DeleteWordBackward,
        "deleteByCut" => InputType::DeleteByCut,
        "deleteByDrag" => InputType::DeleteByDrag,
        "deleteContent" => InputType::DeleteContent,

        other => InputType::Unknown(other.to_string()),
    }
}

/// Get data from a beforeinput event, handling different sources.
pub fn get_data_from_event(event: &InputEvent) -> Option<String> {
    if let Some(data) = event.data().filter(|d| !d.is_empty()) {
        return Some(data);
    }

    // Paste carries its text on the DataTransfer.
    event
        .data_transfer()
        .and_then(|dt| dt.get_data("text/plain").ok())
        .filter(|text| !text.is_empty())
}

/// Token id of the token element at or above an event target.
fn token_id_from_target(target: Option<EventTarget>) -> Option<TokenId> {
    let element = target?.dyn_into::<Element>().ok()?;
    let token = element.closest(&format!("[{DATA_TOKEN_ID}]")).ok()??;
    token.get_attribute(DATA_TOKEN_ID)?.parse().ok()
}

// === Mounted surface ===

struct Surface {
    editor: RefCell<NoteEditor>,
    catalog: RefCell<Catalog>,
    content: HtmlElement,
    gutter: Option<HtmlElement>,
    drag_mime: SmolStr,
}

impl Surface {
    /// Re-render content and gutter from the document, then put the caret back.
    fn refresh(&self) {
        let editor = self.editor.borrow();
        dom_sync::render(&self.content, &editor);
        if let Some(gutter) = &self.gutter {
            dom_sync::render_gutter(gutter, &editor.metrics());
        }
        if let Some(selection) = editor.selection() {
            dom_sync::restore_caret(&self.content, selection.head);
        }
    }

    fn sync_selection(&self) {
        let selection = dom_sync::read_selection(&self.content);
        self.editor.borrow_mut().set_selection(selection);
    }

    fn on_beforeinput(&self, event: &Event) {
        let Some(event) = event.dyn_ref::<InputEvent>() else {
            return;
        };
        let input_type = parse_browser_input_type(&event.input_type());
        if event.is_composing() || input_type == InputType::InsertCompositionText {
            tracing::trace!(target: "delivery::events", "composition input passed through");
            return;
        }

        // The DOM is a projection: the browser never edits it directly.
        event.prevent_default();
        self.sync_selection();

        let data = get_data_from_event(event);
        let changed = {
            let mut editor = self.editor.borrow_mut();
            let range = editor.caret_range();
            match EditorAction::from_input(&input_type, data.as_deref(), range) {
                Some(action) => editor.apply(&action).unwrap_or(false),
                None => {
                    tracing::debug!(target: "delivery::events", ?input_type, "ignored input");
                    false
                }
            }
        };
        if changed {
            self.refresh();
        }
    }

    fn is_read_only(&self) -> bool {
        !self.editor.borrow().mode().is_editing()
    }

    /// Replay an editing key pressed on the read-only surface.
    fn on_keydown(&self, event: &Event) {
        let Some(event) = event.dyn_ref::<KeyboardEvent>() else {
            return;
        };
        // Shortcuts such as copy stay with the browser.
        if !self.is_read_only()
            || event.is_composing()
            || event.ctrl_key()
            || event.meta_key()
            || event.alt_key()
        {
            return;
        }
        let key = event.key();
        let mut editor = self.editor.borrow_mut();
        let range = editor.caret_range();
        let action = match key.as_str() {
            "Enter" => EditorAction::InsertLineBreak { range },
            "Backspace" => EditorAction::DeleteBackward { range },
            "Delete" => EditorAction::DeleteForward { range },
            k if k.chars().count() == 1 => EditorAction::Insert { text: key.clone(), range },
            _ => return,
        };
        event.prevent_default();
        if let Err(e) = editor.apply(&action) {
            tracing::debug!(
                target: "delivery::events",
                error = %e,
                %key,
                "read-only key refused"
            );
        }
    }

    /// Replay a paste onto the read-only surface.
    fn on_paste(&self, event: &Event) {
        let Some(event) = event.dyn_ref::<ClipboardEvent>() else {
            return;
        };
        if !self.is_read_only() {
            return;
        }
        event.prevent_default();
        let text = event
            .clipboard_data()
            .and_then(|dt| dt.get_data("text/plain").ok())
            .unwrap_or_default();
        if let Err(e) = self.editor.borrow_mut().type_text(&text) {
            tracing::debug!(target: "delivery::events", error = %e, "read-only paste refused");
        }
    }

    fn on_click(&self, event: &Event) {
        let Some(id) = token_id_from_target(event.target()) else {
            return;
        };
        let editor = self.editor.borrow();
        let catalog = self.catalog.borrow();
        // Failures are reported through the session's notifier.
        let _ = editor.click_token(id, &catalog, &editor.default_partition(), &BrowserClipboard);
    }

    fn on_dragstart(&self, event: &Event) {
        let Some(event) = event.dyn_ref::<DragEvent>() else {
            return;
        };
        let Some(id) = token_id_from_target(event.target()) else {
            // Only tokens are draggable; a text drag would edit the DOM behind
            // the document's back.
            event.prevent_default();
            return;
        };
        let payload = match self.editor.borrow_mut().begin_move(id) {
            Ok(payload) => payload,
            Err(e) => {
                tracing::debug!(target: "delivery::drag", error = %e, "drag not started");
                event.prevent_default();
                return;
            }
        };
        if let Some(transfer) = event.data_transfer() {
            if let Err(e) = transfer.set_data(&self.drag_mime, &payload) {
                tracing::warn!(target: "delivery::drag", error = ?e, "could not attach payload");
            }
            transfer.set_effect_allowed("copyMove");
        }
    }

    fn on_drop(&self, event: &Event) {
        let Some(event) = event.dyn_ref::<DragEvent>() else {
            return;
        };
        event.prevent_default();
        let payload = event
            .data_transfer()
            .and_then(|dt| dt.get_data(&self.drag_mime).ok())
            .unwrap_or_default();
        let target = offset_from_point(
            &self.content,
            f64::from(event.client_x()),
            f64::from(event.client_y()),
        );
        let dropped = self.editor.borrow_mut().drop_payload(&payload, target);
        match dropped {
            Ok(id) => {
                tracing::debug!(target: "delivery::drag", %id, ?target, "dropped token");
                self.refresh();
            }
            Err(EditorError::MalformedDragPayload(_)) => {}
            Err(e) => tracing::debug!(target: "delivery::drag", error = %e, "drop refused"),
        }
    }

    fn on_scroll(&self) {
        let top = f64::from(self.content.scroll_top());
        let offset = self.editor.borrow_mut().on_content_scroll(top);
        if let Some(gutter) = &self.gutter {
            gutter.set_scroll_top(offset as i32);
        }
    }
}

/// A `NoteEditor` session bound to live DOM elements.
///
/// Listeners are removed when the surface is dropped or closed.
pub struct NoteSurface {
    surface: Rc<Surface>,
    _listeners: Vec<EventListener>,
}

impl NoteSurface {
    /// Render `editor` into `content` (and its line numbers into `gutter`)
    /// and start listening for input.
    pub fn mount(
        content: HtmlElement,
        gutter: Option<HtmlElement>,
        editor: NoteEditor,
        catalog: Catalog,
    ) -> Self {
        let drag_mime = editor.config().drag_mime.clone();
        let surface = Rc::new(Surface {
            editor: RefCell::new(editor),
            catalog: RefCell::new(catalog),
            content,
            gutter,
            drag_mime,
        });
        surface.refresh();

        let target: &EventTarget = surface.content.as_ref();
        let cancellable = || EventListenerOptions::enable_prevent_default();
        let mut listeners = Vec::new();

        let s = Rc::clone(&surface);
        listeners.push(EventListener::new_with_options(
            target,
            "beforeinput",
            cancellable(),
            move |e| s.on_beforeinput(e),
        ));

        let s = Rc::clone(&surface);
        listeners.push(EventListener::new_with_options(
            target,
            "keydown",
            cancellable(),
            move |e| s.on_keydown(e),
        ));

        let s = Rc::clone(&surface);
        listeners.push(EventListener::new_with_options(
            target,
            "paste",
            cancellable(),
            move |e| s.on_paste(e),
        ));

        let s = Rc::clone(&surface);
        listeners.push(EventListener::new(target, "click", move |e| s.on_click(e)));

        let s = Rc::clone(&surface);
        listeners.push(EventListener::new_with_options(
            target,
            "dragstart",
            cancellable(),
            move |e| s.on_dragstart(e),
        ));

        listeners.push(EventListener::new_with_options(
            target,
            "dragover",
            cancellable(),
            |e| e.prevent_default(),
        ));

        let s = Rc::clone(&surface);
        listeners.push(EventListener::new_with_options(
            target,
            "drop",
            cancellable(),
            move |e| s.on_drop(e),
        ));

        let s = Rc::clone(&surface);
        listeners.push(EventListener::new(target, "dragend", move |_| {
            s.editor.borrow_mut().end_move();
        }));

        let s = Rc::clone(&surface);
        listeners.push(EventListener::new(target, "scroll", move |_| s.on_scroll()));

        let s = Rc::clone(&surface);
        let document = gloo_utils::document();
        listeners.push(EventListener::new(&document, "selectionchange", move |_| {
            s.sync_selection();
        }));

        tracing::debug!(target: "delivery::events", listeners = listeners.len(), "surface mounted");
        Self {
            surface,
            _listeners: listeners,
        }
    }

    /// Read access to the session.
    pub fn editor(&self) -> Ref<'_, NoteEditor> {
        self.surface.editor.borrow()
    }

    /// Mutate the session, then re-render.
    pub fn update<R>(&self, f: impl FnOnce(&mut NoteEditor) -> R) -> R {
        let result = f(&mut self.surface.editor.borrow_mut());
        self.surface.refresh();
        result
    }

    pub fn set_catalog(&self, catalog: Catalog) {
        *self.surface.catalog.borrow_mut() = catalog;
    }

    /// Switch the surface into editing.
    pub fn begin_editing(&self) {
        self.update(NoteEditor::begin_editing);
    }

    /// Insert the draft's selected template at the caret.
    pub fn insert_template(&self) -> Result<TokenId, EditorError> {
        let catalog = self.surface.catalog.borrow();
        self.update(|editor| editor.insert_template(&catalog))
    }

    /// Insert the stock picker's product at the caret.
    pub fn insert_stock(&self) -> Result<TokenId, EditorError> {
        let catalog = self.surface.catalog.borrow();
        self.update(|editor| editor.insert_stock(&catalog))
    }

    /// Close the modal: stop listening, clear the surface and hand back the
    /// draft.
    pub fn close(self) -> Draft {
        let NoteSurface { surface, _listeners } = self;
        drop(_listeners);
        surface.content.set_inner_html("");
        if let Some(gutter) = &surface.gutter {
            gutter.set_text_content(None);
        }
        let mut editor = surface.editor.borrow_mut();
        editor.close();
        editor.draft().clone()
    }
}
