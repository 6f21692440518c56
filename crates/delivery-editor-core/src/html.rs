//! HTML projection of a note and its allow-list decoder.
//!
//! `to_html` renders text runs with `<br>` line breaks and tokens as
//! non-editable spans carrying the codec's `data-*` attributes. `from_html`
//! reads that shape back. Persisted notes come from earlier saves and are not
//! trusted: the decoder is not an HTML parser and never re-emits input
//! markup. It recognises token spans, line breaks and block boundaries. Unsafe
//! elements are dropped together with their content. Every other element is
//! unwrapped to its text.

use std::borrow::Cow;
use std::fmt;

use pulldown_cmark_escape::{FmtWriter, escape_html};
use smol_str::SmolStr;

use crate::codec::{self, AttributeSet, DATA_TOKEN_TYPE};
use crate::document::{Node, NoteDocument};

/// Attribute carrying the session-local token id on the live surface.
pub const DATA_TOKEN_ID: &str = "data-token-id";

/// Marks the extra `<br>` the live surface appends after a final newline so
/// the empty last line is shown. It covers no document unit.
pub const DATA_TRAILING_BREAK: &str = "data-trailing-break";

/// Elements dropped together with everything inside them.
const DROP_WITH_CONTENT: &[&str] = &[
    "script", "style", "iframe", "object", "embed", "template", "noscript", "textarea", "title",
    "svg", "math",
];

/// Elements whose start opens a new line.
const BLOCK_ELEMENTS: &[&str] = &["div", "p"];

/// Options for rendering a document to HTML.
#[derive(Clone, Debug)]
pub struct HtmlOptions {
    /// Emit `data-token-id` so DOM events can be mapped back to tokens.
    /// Off for persisted notes.
    pub token_ids: bool,
    /// CSS class on every token span.
    pub token_class: SmolStr,
}

impl Default for HtmlOptions {
    fn default() -> Self {
        Self {
            token_ids: false,
            token_class: SmolStr::new_static("note-token"),
        }
    }
}

impl HtmlOptions {
    /// Options for the live editing surface.
    pub fn surface(token_class: impl Into<SmolStr>) -> Self {
        Self {
            token_ids: true,
            token_class: token_class.into(),
        }
    }
}

impl NoteDocument {
    /// Serialize for persistence.
    pub fn to_html(&self) -> String {
        self.to_html_with(&HtmlOptions::default())
    }

    pub fn to_html_with(&self, opts: &HtmlOptions) -> String {
        HtmlProjection { doc: self, opts }.to_string()
    }

    /// Load a persisted note, discarding anything outside the allow-list.
    pub fn from_html(html: &str) -> Self {
        Decoder::new(html).run()
    }
}

struct HtmlProjection<'a> {
    doc: &'a NoteDocument,
    opts: &'a HtmlOptions,
}

impl fmt::Display for HtmlProjection<'_> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for node in self.doc.nodes() {
            match node {
                Node::Text(text) => {
                    for (i, line) in text.split('\n').enumerate() {
                        if i > 0 {
                            f.write_str("<br>")?;
                        }
                        escape_html(FmtWriter(&mut *f), line)?;
                    }
                }
                Node::Token { id, token } => {
                    let class = &self.opts.token_class;
                    f.write_str("<span class=\"")?;
                    escape_html(FmtWriter(&mut *f), class)?;
                    f.write_str(" ")?;
                    escape_html(FmtWriter(&mut *f), class)?;
                    write!(
                        f,
                        "--{}\" contenteditable=\"false\" draggable=\"true\"",
                        token.kind()
                    )?;
                    if self.opts.token_ids {
                        write!(f, " {DATA_TOKEN_ID}=\"{id}\"")?;
                    }
                    for (name, value) in codec::encode(token).dom_attributes() {
                        write!(f, " {name}=\"")?;
                        escape_html(FmtWriter(&mut *f), value)?;
                        f.write_str("\"")?;
                    }
                    f.write_str(">")?;
                    escape_html(FmtWriter(&mut *f), token.label())?;
                    f.write_str("</span>")?;
                }
            }
        }
        if self.opts.token_ids
            && matches!(self.doc.nodes().last(), Some(Node::Text(text)) if text.ends_with('\n'))
        {
            write!(f, "<br {DATA_TRAILING_BREAK}=\"\">")?;
        }
        Ok(())
    }
}

/// A parsed start or end tag.
#[derive(Debug)]
struct Tag {
    name: String,
    closing: bool,
    self_closing: bool,
    attrs: Vec<(String, String)>,
}

impl Tag {
    fn attr(&self, name: &str) -> Option<&str> {
        self.attrs
            .iter()
            .find(|(n, _)| n == name)
            .map(|(_, v)| v.as_str())
    }
}

struct Decoder<'a> {
    src: &'a str,
    pos: usize,
    doc: NoteDocument,
    pending: String,
    at_line_start: bool,
}

impl<'a> Decoder<'a> {
    fn new(src: &'a str) -> Self {
        Self {
            src,
            pos: 0,
            doc: NoteDocument::new(),
            pending: String::new(),
            at_line_start: true,
        }
    }

    fn run(mut self) -> NoteDocument {
        while self.pos < self.src.len() {
            let rest = &self.src[self.pos..];
            if rest.starts_with("<!--") {
                self.pos = match rest[4..].find("-->") {
                    Some(end) => self.pos + 4 + end + 3,
                    None => self.src.len(),
                };
                continue;
            }
            if rest.starts_with('<') {
                match parse_tag(rest) {
                    Some((tag, consumed)) => {
                        self.pos += consumed;
                        self.handle_tag(tag);
                    }
                    None => {
                        self.push_text("<");
                        self.pos += 1;
                    }
                }
                continue;
            }
            let end = rest.find('<').unwrap_or(rest.len());
            let decoded = decode_entities(&rest[..end]);
            let normalized = decoded.replace("\r\n", "\n").replace('\r', "\n");
            self.push_text(&normalized);
            self.pos += end;
        }
        self.flush();
        self.doc
    }

    fn handle_tag(&mut self, tag: Tag) {
        if tag.closing {
            return;
        }
        let name = tag.name.as_str();
        if name == "br" {
            if tag.attr(DATA_TRAILING_BREAK).is_none() {
                self.push_text("\n");
            }
        } else if BLOCK_ELEMENTS.contains(&name) {
            if !self.at_line_start {
                self.push_text("\n");
            }
        } else if DROP_WITH_CONTENT.contains(&name) {
            tracing::debug!(target: "delivery::html", element = name, "dropping unsafe element");
            if !tag.self_closing {
                self.skip_past_close(name);
            }
        } else if name == "span" && tag.attr(DATA_TOKEN_TYPE).is_some() {
            if !tag.self_closing {
                self.skip_span_content();
            }
            let attrs = AttributeSet::from_dom(|n| tag.attr(n).map(str::to_string));
            match codec::decode(&attrs) {
                Ok(token) => {
                    self.flush();
                    self.doc.append_token(token);
                    self.at_line_start = false;
                }
                Err(e) => {
                    tracing::debug!(target: "delivery::html", error = %e, "dropping malformed token");
                }
            }
        }
    }

    fn push_text(&mut self, text: &str) {
        if let Some(last) = text.chars().last() {
            self.pending.push_str(text);
            self.at_line_start = last == '\n';
        }
    }

    fn flush(&mut self) {
        if !self.pending.is_empty() {
            self.doc.append_text(&self.pending);
            self.pending.clear();
        }
    }

    /// Skip to just past `</name ...>`, or to the end of input.
    fn skip_past_close(&mut self, name: &str) {
        let needle = format!("</{name}");
        let rest = &self.src[self.pos..];
        match find_ascii_case_insensitive(rest, &needle) {
            Some(at) => {
                let after = &rest[at..];
                let close = after.find('>').map(|i| i + 1).unwrap_or(after.len());
                self.pos += at + close;
            }
            None => self.pos = self.src.len(),
        }
    }

    /// Skip a token span's label, honouring nested spans.
    fn skip_span_content(&mut self) {
        let mut depth = 1usize;
        while self.pos < self.src.len() {
            let rest = &self.src[self.pos..];
            let Some(lt) = rest.find('<') else {
                self.pos = self.src.len();
                return;
            };
            self.pos += lt;
            match parse_tag(&self.src[self.pos..]) {
                Some((tag, consumed)) => {
                    self.pos += consumed;
                    if tag.name == "span" {
                        if tag.closing {
                            depth -= 1;
                            if depth == 0 {
                                return;
                            }
                        } else if !tag.self_closing {
                            depth += 1;
                        }
                    }
                }
                None => self.pos += 1,
            }
        }
    }
}

/// Parse a tag at the start of `s`, returning it and the bytes consumed.
///
/// Returns `None` when `s` does not start with a well-formed tag; the caller
/// then treats `<` as literal text.
fn parse_tag(s: &str) -> Option<(Tag, usize)> {
    let bytes = s.as_bytes();
    let mut i = 1;
    let closing = bytes.get(i) == Some(&b'/');
    if closing {
        i += 1;
    }
    if !bytes.get(i)?.is_ascii_alphabetic() {
        return None;
    }
    let name_start = i;
    while i < bytes.len() && (bytes[i].is_ascii_alphanumeric() || bytes[i] == b'-') {
        i += 1;
    }
    let name = s[name_start..i].to_ascii_lowercase();

    let mut attrs = Vec::new();
    let mut self_closing = false;
    loop {
        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        match bytes.get(i)? {
            b'>' => {
                i += 1;
                break;
            }
            b'/' => {
                self_closing = true;
                i += 1;
                continue;
            }
            _ => {}
        }
        self_closing = false;

        let attr_start = i;
        while i < bytes.len()
            && !bytes[i].is_ascii_whitespace()
            && !matches!(bytes[i], b'=' | b'>' | b'/')
        {
            i += 1;
        }
        let attr_name = s[attr_start..i].to_ascii_lowercase();

        while i < bytes.len() && bytes[i].is_ascii_whitespace() {
            i += 1;
        }
        let mut value = String::new();
        if bytes.get(i) == Some(&b'=') {
            i += 1;
            while i < bytes.len() && bytes[i].is_ascii_whitespace() {
                i += 1;
            }
            match bytes.get(i)? {
                q @ (b'"' | b'\'') => {
                    let quote = *q as char;
                    let close = s[i + 1..].find(quote)?;
                    value = decode_entities(&s[i + 1..i + 1 + close]).into_owned();
                    i += close + 2;
                }
                _ => {
                    let start = i;
                    while i < bytes.len() && !bytes[i].is_ascii_whitespace() && bytes[i] != b'>'
                    {
                        i += 1;
                    }
                    value = decode_entities(&s[start..i]).into_owned();
                }
            }
        }
        attrs.push((attr_name, value));
    }

    Some((
        Tag {
            name,
            closing,
            self_closing,
            attrs,
        },
        i,
    ))
}

/// Decode the character references the serializer and browsers produce.
///
/// `&nbsp;` becomes a plain space. Unknown references are kept literally.
fn decode_entities(s: &str) -> Cow<'_, str> {
    if !s.contains('&') {
        return Cow::Borrowed(s);
    }
    let mut out = String::with_capacity(s.len());
    let mut rest = s;
    while let Some(amp) = rest.find('&') {
        out.push_str(&rest[..amp]);
        rest = &rest[amp..];
        let decoded = rest
            .as_bytes()
            .iter()
            .take(12)
            .position(|&b| b == b';')
            .and_then(|semi| decode_reference(&rest[1..semi]).map(|c| (c, semi + 1)));
        match decoded {
            Some((c, consumed)) => {
                out.push(c);
                rest = &rest[consumed..];
            }
            None => {
                out.push('&');
                rest = &rest[1..];
            }
        }
    }
    out.push_str(rest);
    Cow::Owned(out)
}

fn decode_reference(name: &str) -> Option<char> {
    match name {
        "amp" => Some('&'),
        "lt" => Some('<'),
        "gt" => Some('>'),
        "quot" => Some('"'),
        "apos" => Some('\''),
        "nbsp" => Some(' '),
        _ => {
            let num = name.strip_prefix('#')?;
            let code = match num.strip_prefix(['x', 'X']) {
                Some(hex) => u32::from_str_radix(hex, 16).ok()?,
                None => num.parse().ok()?,
            };
            match char::from_u32(code) {
                Some('\0') | None => Some('\u{FFFD}'),
                Some(c) => Some(c),
            }
        }
    }
}

fn find_ascii_case_insensitive(haystack: &str, needle: &str) -> Option<usize> {
    let hay = haystack.as_bytes();
    let needle = needle.as_bytes();
    if needle.len() > hay.len() {
        return None;
    }
    (0..=hay.len() - needle.len()).find(|&i| hay[i..i + needle.len()].eq_ignore_ascii_case(needle))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::token::Token;

    fn sample() -> NoteDocument {
        let mut doc = NoteDocument::new();
        doc.append_text("Hi <customer>,\nyour code: ");
        doc.append_token(Token::stock("Keys & Codes", "p1"));
        doc.append_text(" ");
        doc.append_token(Token::message("Thanks", "Thank you for \"shopping\""));
        doc
    }

    #[test]
    fn test_persisted_html() {
        insta::assert_snapshot!(
            sample().to_html(),
            @r#"Hi &lt;customer&gt;,<br>your code: <span class="note-token note-token--stock" contenteditable="false" draggable="true" data-token-type="stock" data-label="Keys &amp; Codes" data-product-id="p1">Keys &amp; Codes</span> <span class="note-token note-token--message" contenteditable="false" draggable="true" data-token-type="message" data-label="Thanks" data-value="Thank you for &quot;shopping&quot;">Thanks</span>"#
        );
    }

    #[test]
    fn test_surface_html_carries_ids() {
        let mut doc = NoteDocument::new();
        doc.append_token(Token::stock("K", "p1"));
        insta::assert_snapshot!(
            doc.to_html_with(&HtmlOptions::surface("chip")),
            @r#"<span class="chip chip--stock" contenteditable="false" draggable="true" data-token-id="0" data-token-type="stock" data-label="K" data-product-id="p1">K</span>"#
        );
    }

    #[test]
    fn test_surface_shows_empty_last_line() {
        let mut doc = NoteDocument::new();
        doc.append_text("a\n");
        assert_eq!(doc.to_html(), "a<br>");
        insta::assert_snapshot!(
            doc.to_html_with(&HtmlOptions::surface("chip")),
            @r#"a<br><br data-trailing-break="">"#
        );

        let back = NoteDocument::from_html(&doc.to_html_with(&HtmlOptions::surface("chip")));
        assert_eq!(back.rendered_text(), "a\n");

        doc.append_token(Token::message("M", "v"));
        assert!(
            !doc.to_html_with(&HtmlOptions::surface("chip"))
                .contains(DATA_TRAILING_BREAK)
        );
    }

    #[test]
    fn test_roundtrip() {
        let doc = sample();
        let back = NoteDocument::from_html(&doc.to_html());
        assert_eq!(back.rendered_text(), doc.rendered_text());
        let before: Vec<_> = doc.tokens().map(|(_, t)| t.clone()).collect();
        let after: Vec<_> = back.tokens().map(|(_, t)| t.clone()).collect();
        assert_eq!(before, after);
        assert_eq!(back.to_html(), doc.to_html());
    }

    #[test]
    fn test_roundtrip_surface_html() {
        let doc = sample();
        let back = NoteDocument::from_html(&doc.to_html_with(&HtmlOptions::surface("x")));
        assert_eq!(back.to_html(), doc.to_html());
    }

    #[test]
    fn test_script_and_style_dropped() {
        let doc = NoteDocument::from_html(
            "a<script>alert('x')</script>b<STYLE>p{}</STYLE>c<iframe src=x></iframe>d",
        );
        assert_eq!(doc.rendered_text(), "abcd");
        assert_eq!(doc.to_html(), "abcd");
    }

    #[test]
    fn test_unclosed_script_drops_rest() {
        let doc = NoteDocument::from_html("safe<script>alert(1)");
        assert_eq!(doc.rendered_text(), "safe");
    }

    #[test]
    fn test_event_handlers_not_propagated() {
        let doc = NoteDocument::from_html(
            r#"<span data-token-type="message" data-label="Hi" data-value="v" onclick="evil()">Hi</span><img src=x onerror="evil()">"#,
        );
        assert_eq!(doc.token_count(), 1);
        let html = doc.to_html();
        assert!(!html.contains("onclick"));
        assert!(!html.contains("onerror"));
        assert!(!html.contains("<img"));
    }

    #[test]
    fn test_unknown_elements_unwrapped() {
        let doc = NoteDocument::from_html("<b>bold</b> and <a href=\"javascript:x\">link</a>");
        assert_eq!(doc.rendered_text(), "bold and link");
        assert_eq!(doc.token_count(), 0);
    }

    #[test]
    fn test_malformed_token_dropped() {
        let doc = NoteDocument::from_html(
            r#"a<span data-label="orphan">orphan</span>b<span data-token-type="stock" data-label="x">x</span>c"#,
        );
        // The first span has no token-type so it is an ordinary span.
        assert_eq!(doc.rendered_text(), "aorphanbc");
        assert_eq!(doc.token_count(), 0);
    }

    #[test]
    fn test_block_boundaries_and_entities() {
        let doc = NoteDocument::from_html("first<div>second</div><div>third&nbsp;&amp;&#33;&#x41;</div>");
        assert_eq!(doc.rendered_text(), "first\nsecond\nthird &!A");
    }

    #[test]
    fn test_literal_angle_bracket_and_comments() {
        let doc = NoteDocument::from_html("1 < 2 <!-- hidden --> ok\r\nnext");
        assert_eq!(doc.rendered_text(), "1 < 2  ok\nnext");
    }

    #[test]
    fn test_nested_span_label_skipped() {
        let doc = NoteDocument::from_html(
            r#"<span data-token-type="stock" data-label="K" data-product-id="p1"><span>K</span></span>after"#,
        );
        assert_eq!(doc.token_count(), 1);
        assert_eq!(doc.rendered_text(), "Kafter");
    }

    #[test]
    fn test_multiline_attribute_value() {
        let mut doc = NoteDocument::new();
        doc.append_token(Token::message("Steps", "one\ntwo"));
        let back = NoteDocument::from_html(&doc.to_html());
        assert_eq!(
            back.tokens().next().map(|(_, t)| t.clone()),
            Some(Token::message("Steps", "one\ntwo"))
        );
    }
}
