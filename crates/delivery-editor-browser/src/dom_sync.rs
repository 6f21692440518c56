//! DOM <-> document synchronization.
//!
//! The surface DOM is always rendered from the document, so its shape is
//! known: text nodes, `<br>` for each newline, and one non-editable span per
//! token. Offsets map through that shape: a text node contributes its
//! characters, a `<br>` or a token span contributes one unit. The trailing
//! `<br>` after a final newline contributes nothing.
//!
//! The browser reports text offsets in UTF-16 code units; the document counts
//! characters.

use delivery_editor_core::{
    DATA_TOKEN_ID, DATA_TRAILING_BREAK, GutterMetrics, NoteEditor, Selection,
};
use wasm_bindgen::JsCast;
use web_sys::{Element, HtmlElement, Node};

// === Rendering ===

/// Replace the surface's content with the document and apply the mode.
pub fn render(content: &HtmlElement, editor: &NoteEditor) {
    content.set_inner_html(&editor.surface_html());
    content.set_content_editable(if editor.mode().is_editing() {
        "true"
    } else {
        "false"
    });
    // Focusable in both modes so key events still reach a read-only surface.
    content.set_tab_index(0);
    if let Err(e) = content.style().set_property("white-space", "pre-wrap") {
        tracing::warn!(target: "delivery::dom", error = ?e, "could not set white-space");
    }
}

/// One row element per line, top to bottom.
pub fn render_gutter(gutter: &HtmlElement, metrics: &GutterMetrics) {
    let rows: String = metrics
        .rows()
        .map(|n| format!("<div class=\"{GUTTER_ROW_CLASS}\">{n}</div>"))
        .collect();
    gutter.set_inner_html(&rows);
}

/// Class carried by each gutter row.
pub const GUTTER_ROW_CLASS: &str = "note-gutter-row";

// === DOM -> document ===

/// Read the window selection as a document selection.
///
/// Returns `None` when there is no selection or either end lies outside
/// `root`.
pub fn read_selection(root: &Node) -> Option<Selection> {
    let selection = web_sys::window()?.get_selection().ok()??;
    let anchor = dom_position_to_offset(
        root,
        &selection.anchor_node()?,
        selection.anchor_offset(),
    )?;
    let head = dom_position_to_offset(root, &selection.focus_node()?, selection.focus_offset())?;
    tracing::trace!(target: "delivery::cursor", anchor, head, "read dom selection");
    Some(Selection::new(anchor, head))
}

/// Convert a DOM boundary point (container + offset) to a document offset.
///
/// A point inside a token span snaps to before the token when it sits at the
/// span's very start, and after it otherwise.
pub fn dom_position_to_offset(root: &Node, container: &Node, offset: u32) -> Option<usize> {
    if !root.contains(Some(container)) {
        return None;
    }

    if let Some(token) = enclosing_token(root, container) {
        let token: &Node = token.as_ref();
        let before = units_before(root, token)?;
        let at_start = offset == 0
            && (container.is_same_node(Some(token))
                || token
                    .first_child()
                    .is_some_and(|first| first.contains(Some(container))));
        return Some(if at_start { before } else { before + 1 });
    }

    let before = if container.is_same_node(Some(root)) {
        0
    } else {
        units_before(root, container)?
    };

    if container.node_type() == Node::TEXT_NODE {
        let text = container.node_value().unwrap_or_default();
        return Some(before + utf16_to_chars(&text, offset as usize));
    }

    let mut within = 0;
    let mut child = container.first_child();
    let mut index = 0;
    while let Some(node) = child {
        if index >= offset {
            break;
        }
        within += node_width(&node);
        child = node.next_sibling();
        index += 1;
    }
    Some(before + within)
}

/// Units contributed by `node` and everything under it.
fn node_width(node: &Node) -> usize {
    if node.node_type() == Node::TEXT_NODE {
        return node.node_value().map_or(0, |t| t.chars().count());
    }
    let Some(element) = node.dyn_ref::<Element>() else {
        return 0;
    };
    if is_trailing_break(element) {
        return 0;
    }
    if is_token(element) || is_line_break(element) {
        return 1;
    }
    let mut width = 0;
    let mut child = node.first_child();
    while let Some(c) = child {
        width += node_width(&c);
        child = c.next_sibling();
    }
    width
}

/// Units that precede `target` in document order under `parent`.
fn units_before(parent: &Node, target: &Node) -> Option<usize> {
    let mut total = 0;
    let mut child = parent.first_child();
    while let Some(node) = child {
        if node.is_same_node(Some(target)) {
            return Some(total);
        }
        if node.contains(Some(target)) {
            return units_before(&node, target).map(|n| total + n);
        }
        total += node_width(&node);
        child = node.next_sibling();
    }
    None
}

fn enclosing_token(root: &Node, node: &Node) -> Option<Element> {
    let mut current = Some(node.clone());
    while let Some(n) = current {
        if n.is_same_node(Some(root)) {
            return None;
        }
        if let Some(element) = n.dyn_ref::<Element>() {
            if is_token(element) {
                return Some(element.clone());
            }
        }
        current = n.parent_node();
    }
    None
}

fn is_token(element: &Element) -> bool {
    element.has_attribute(DATA_TOKEN_ID)
}

fn is_line_break(element: &Element) -> bool {
    element.tag_name().eq_ignore_ascii_case("br")
}

fn is_trailing_break(element: &Element) -> bool {
    element.has_attribute(DATA_TRAILING_BREAK)
}

// === Document -> DOM ===

/// Place a collapsed caret at document offset `offset` inside `root`.
///
/// Offsets past the end put the caret at the end.
pub fn restore_caret(root: &Node, offset: usize) {
    let (container, dom_offset) = match locate(root, offset) {
        Ok(point) => point,
        Err(overshoot) => {
            tracing::trace!(target: "delivery::cursor", offset, overshoot, "caret past end");
            (root.clone(), root.child_nodes().length())
        }
    };
    tracing::trace!(
        target: "delivery::cursor",
        offset,
        node = %container.node_name(),
        dom_offset,
        "restoring caret"
    );

    let Some(window) = web_sys::window() else {
        return;
    };
    let Some(document) = window.document() else {
        return;
    };
    let result = (|| {
        let range = document.create_range()?;
        range.set_start(&container, dom_offset)?;
        range.collapse_with_to_start(true);
        if let Some(selection) = window.get_selection()? {
            selection.remove_all_ranges()?;
            selection.add_range(&range)?;
        }
        Ok::<_, wasm_bindgen::JsValue>(())
    })();
    if let Err(e) = result {
        tracing::warn!(target: "delivery::dom", offset, error = ?e, "caret restore failed");
    }
}

/// Find the DOM boundary point for `remaining` units into `parent`.
///
/// `Err` carries the units left over once `parent` is exhausted.
fn locate(parent: &Node, mut remaining: usize) -> Result<(Node, u32), usize> {
    let mut child = parent.first_child();
    let mut index = 0u32;
    while let Some(node) = child {
        if node.node_type() == Node::TEXT_NODE {
            let text = node.node_value().unwrap_or_default();
            let chars = text.chars().count();
            if remaining <= chars {
                return Ok((node, chars_to_utf16(&text, remaining) as u32));
            }
            remaining -= chars;
        } else if let Some(element) = node.dyn_ref::<Element>() {
            if is_trailing_break(element) {
                if remaining == 0 {
                    return Ok((parent.clone(), index));
                }
            } else if is_token(element) || is_line_break(element) {
                if remaining == 0 {
                    return Ok((parent.clone(), index));
                }
                remaining -= 1;
            } else {
                match locate(&node, remaining) {
                    Ok(point) => return Ok(point),
                    Err(left) => remaining = left,
                }
            }
        }
        child = node.next_sibling();
        index += 1;
    }
    if remaining == 0 {
        Ok((parent.clone(), index))
    } else {
        Err(remaining)
    }
}

// === Offset conversion ===

/// Characters covered by the first `utf16` code units of `text`.
pub fn utf16_to_chars(text: &str, utf16: usize) -> usize {
    let mut units = 0;
    for (i, c) in text.chars().enumerate() {
        if units >= utf16 {
            return i;
        }
        units += c.len_utf16();
    }
    text.chars().count()
}

/// UTF-16 code units covered by the first `chars` characters of `text`.
pub fn chars_to_utf16(text: &str, chars: usize) -> usize {
    text.chars().take(chars).map(char::len_utf16).sum()
}
