//! WASM browser tests for delivery-editor-browser.
//!
//! Run with: `wasm-pack test --headless --firefox` or `--chrome`

#![cfg(target_arch = "wasm32")]

use wasm_bindgen::JsCast;
use wasm_bindgen_test::*;

wasm_bindgen_test_configure!(run_in_browser);

use delivery_editor_browser::dom_sync::{dom_position_to_offset, read_selection, restore_caret};
use delivery_editor_browser::{
    Catalog, Draft, EditMode, EditorError, InputType, MessageTemplate, Notice, NoteEditor,
    NoteSurface, Notifier, Selection, Token, parse_browser_input_type,
};
use std::cell::RefCell;
use std::rc::Rc;

#[derive(Default)]
struct Notices(RefCell<Vec<Notice>>);

impl Notifier for Notices {
    fn notify(&self, notice: Notice) {
        self.0.borrow_mut().push(notice);
    }
}

fn surface_element() -> web_sys::HtmlElement {
    let document = gloo_utils::document();
    let element = document
        .create_element("div")
        .unwrap()
        .dyn_into::<web_sys::HtmlElement>()
        .unwrap();
    document.body().unwrap().append_child(&element).unwrap();
    element
}

/// "ab" [K] " c\nd"
fn mounted_editor() -> (web_sys::HtmlElement, NoteEditor) {
    let mut editor = NoteEditor::new(Draft::new(""));
    editor.type_text("ab").unwrap();
    editor.insert_at_caret(Token::stock("K", "p1")).unwrap();
    editor.type_text("c\nd").unwrap();
    let element = surface_element();
    delivery_editor_browser::dom_sync::render(&element, &editor);
    (element, editor)
}

// === InputType parsing tests ===

#[wasm_bindgen_test]
fn test_parse_insert_text() {
    assert_eq!(parse_browser_input_type("insertText"), InputType::InsertText);
}

#[wasm_bindgen_test]
fn test_parse_delete_backward() {
    assert_eq!(
        parse_browser_input_type("deleteContentBackward"),
        InputType::DeleteContentBackward
    );
}

#[wasm_bindgen_test]
fn test_parse_unknown() {
    match parse_browser_input_type("formatBold") {
        InputType::Unknown(s) => assert_eq!(s, "formatBold"),
        _ => panic!("Expected Unknown variant"),
    }
}

// === Offset mapping tests ===

#[wasm_bindgen_test]
fn test_render_sets_mode() {
    let (element, editor) = mounted_editor();
    assert_eq!(editor.mode(), EditMode::Editing);
    assert_eq!(element.content_editable(), "true");

    let read_only = NoteEditor::new(Draft::new("note"));
    delivery_editor_browser::dom_sync::render(&element, &read_only);
    assert_eq!(element.content_editable(), "false");
}

#[wasm_bindgen_test]
fn test_dom_positions_map_to_units() {
    let (element, _) = mounted_editor();
    let root: &web_sys::Node = element.as_ref();
    let children = root.child_nodes();

    // "ab" text node
    let text = children.get(0).unwrap();
    assert_eq!(dom_position_to_offset(root, &text, 1), Some(1));

    // Inside the token span, past its start, snaps after it.
    let token = children.get(1).unwrap();
    let label = token.first_child().unwrap();
    assert_eq!(dom_position_to_offset(root, &label, 1), Some(3));
    assert_eq!(dom_position_to_offset(root, &token, 0), Some(2));

    // Root-level child index: "ab", token, " c" => 2 + 1 + 2
    assert_eq!(dom_position_to_offset(root, root, 3), Some(5));

    // End of document, after the <br>.
    let len = children.length();
    assert_eq!(dom_position_to_offset(root, root, len), Some(7));

    let outside = gloo_utils::document().create_element("p").unwrap();
    assert_eq!(dom_position_to_offset(root, &outside, 0), None);
}

#[wasm_bindgen_test]
fn test_caret_restore_roundtrip() {
    let (element, _) = mounted_editor();
    let root: &web_sys::Node = element.as_ref();
    // Offsets strictly inside text nodes: "ab", " c" and "d".
    for offset in [1, 4, 7] {
        restore_caret(root, offset);
        assert_eq!(read_selection(root), Some(Selection::collapsed(offset)));
    }
}

#[wasm_bindgen_test]
fn test_trailing_newline_shows_empty_line() {
    let mut editor = NoteEditor::new(Draft::new(""));
    editor.type_text("a\n").unwrap();
    let element = surface_element();
    delivery_editor_browser::dom_sync::render(&element, &editor);
    let root: &web_sys::Node = element.as_ref();

    // "a", the newline's <br>, then the extra <br> that shows the last line.
    assert_eq!(root.child_nodes().length(), 3);
    assert_eq!(dom_position_to_offset(root, root, 3), Some(2));

    restore_caret(root, 2);
    let selection = web_sys::window().unwrap().get_selection().unwrap().unwrap();
    assert!(selection.anchor_node().unwrap().is_same_node(Some(root)));
    assert_eq!(selection.anchor_offset(), 2);
    assert_eq!(read_selection(root), Some(Selection::collapsed(2)));
}

// === Surface tests ===

#[wasm_bindgen_test]
fn test_surface_insert_template() {
    let element = surface_element();
    let catalog = Catalog {
        templates: vec![MessageTemplate {
            label: "Thanks".into(),
            value: "Thank you!".into(),
        }],
        products: vec![],
    };
    let mut editor = NoteEditor::new(Draft::new(""));
    editor.select_template("Thanks");
    let surface = NoteSurface::mount(element.clone(), None, editor, catalog);

    surface.insert_template().unwrap();
    assert_eq!(surface.editor().document().token_count(), 1);
    assert_eq!(
        element
            .query_selector_all("[data-token-id]")
            .unwrap()
            .length(),
        1
    );

    let draft = surface.close();
    assert!(draft.note.contains("data-token-type=\"message\""));
    assert_eq!(element.inner_html(), "");
}

#[wasm_bindgen_test]
fn test_surface_begin_editing() {
    let element = surface_element();
    let surface = NoteSurface::mount(
        element.clone(),
        None,
        NoteEditor::new(Draft::new("existing")),
        Catalog::default(),
    );
    assert_eq!(element.content_editable(), "false");
    surface.begin_editing();
    assert_eq!(element.content_editable(), "true");
}

#[wasm_bindgen_test]
fn test_read_only_typing_reports_refusal() {
    let element = surface_element();
    let notices = Rc::new(Notices::default());
    let editor = NoteEditor::with_notifier(Draft::new("existing"), notices.clone());
    let surface = NoteSurface::mount(element.clone(), None, editor, Catalog::default());
    assert_eq!(element.content_editable(), "false");

    let init = web_sys::KeyboardEventInit::new();
    init.set_key("x");
    init.set_cancelable(true);
    let event =
        web_sys::KeyboardEvent::new_with_keyboard_event_init_dict("keydown", &init).unwrap();
    element.dispatch_event(&event).unwrap();

    assert_eq!(
        *notices.0.borrow(),
        vec![Notice::Rejected(EditorError::EditingDisabled)]
    );
    assert!(event.default_prevented());
    assert_eq!(surface.editor().draft().note, "existing");

    // Modifier shortcuts stay with the browser.
    let init = web_sys::KeyboardEventInit::new();
    init.set_key("c");
    init.set_ctrl_key(true);
    let copy = web_sys::KeyboardEvent::new_with_keyboard_event_init_dict("keydown", &init).unwrap();
    element.dispatch_event(&copy).unwrap();
    assert_eq!(notices.0.borrow().len(), 1);
}
