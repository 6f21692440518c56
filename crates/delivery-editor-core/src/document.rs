//! The note document: an ordered sequence of text runs and tokens.
//!
//! Positions are measured in document units. Every text character is one
//! unit and every token is exactly one unit, so a position can sit between
//! two tokens, between a token and a character, or between two characters,
//! but never inside a token.
//!
//! The node list is kept normalized: no empty text runs and no two adjacent
//! text runs.

use std::ops::Range;

use crate::token::{Token, TokenId};

/// One node of the document.
#[derive(Clone, Debug, PartialEq, Eq)]
pub enum Node {
    Text(String),
    Token { id: TokenId, token: Token },
}

impl Node {
    /// Width of this node in document units.
    pub fn width(&self) -> usize {
        match self {
            Node::Text(text) => text.chars().count(),
            Node::Token { .. } => 1,
        }
    }

    pub fn as_token(&self) -> Option<(TokenId, &Token)> {
        match self {
            Node::Token { id, token } => Some((*id, token)),
            Node::Text(_) => None,
        }
    }
}

/// What occupies a single document position.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Unit<'a> {
    Char(char),
    Token(TokenId, &'a Token),
}

/// The authoritative in-memory note.
#[derive(Clone, Debug, Default)]
pub struct NoteDocument {
    nodes: Vec<Node>,
    next_id: u64,
}

impl NoteDocument {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn nodes(&self) -> &[Node] {
        &self.nodes
    }

    /// Length in document units.
    pub fn len(&self) -> usize {
        self.nodes.iter().map(Node::width).sum()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Number of tokens in the document.
    pub fn token_count(&self) -> usize {
        self.tokens().count()
    }

    /// Iterate tokens in document order.
    pub fn tokens(&self) -> impl Iterator<Item = (TokenId, &Token)> {
        self.nodes.iter().filter_map(Node::as_token)
    }

    pub fn token(&self, id: TokenId) -> Option<&Token> {
        self.tokens().find(|(tid, _)| *tid == id).map(|(_, t)| t)
    }

    /// Position of a token, if it is in the document.
    pub fn token_position(&self, id: TokenId) -> Option<usize> {
        let mut pos = 0;
        for node in &self.nodes {
            if let Node::Token { id: tid, .. } = node {
                if *tid == id {
                    return Some(pos);
                }
            }
            pos += node.width();
        }
        None
    }

    /// The unit starting at `pos`.
    pub fn unit_at(&self, pos: usize) -> Option<Unit<'_>> {
        let mut acc = 0;
        for node in &self.nodes {
            let width = node.width();
            if pos < acc + width {
                return match node {
                    Node::Text(text) => text.chars().nth(pos - acc).map(Unit::Char),
                    Node::Token { id, token } => Some(Unit::Token(*id, token)),
                };
            }
            acc += width;
        }
        None
    }

    /// Character at `pos`, if that position holds text.
    pub fn char_at(&self, pos: usize) -> Option<char> {
        match self.unit_at(pos)? {
            Unit::Char(c) => Some(c),
            Unit::Token(..) => None,
        }
    }

    // === Appending ===

    pub fn append_text(&mut self, text: &str) {
        if text.is_empty() {
            return;
        }
        match self.nodes.last_mut() {
            Some(Node::Text(last)) => last.push_str(text),
            _ => self.nodes.push(Node::Text(text.to_string())),
        }
    }

    pub fn append_token(&mut self, token: Token) -> TokenId {
        let id = self.alloc_id();
        self.nodes.push(Node::Token { id, token });
        id
    }

    // === Positional edits ===

    /// Insert text at `pos`. Positions past the end append.
    pub fn insert_text(&mut self, pos: usize, text: &str) {
        if text.is_empty() {
            return;
        }
        let idx = self.split_at(pos);
        self.nodes.insert(idx, Node::Text(text.to_string()));
        self.normalize();
    }

    /// Insert a token at `pos`. Positions past the end append.
    pub fn insert_token(&mut self, pos: usize, token: Token) -> TokenId {
        let id = self.alloc_id();
        let idx = self.split_at(pos);
        self.nodes.insert(idx, Node::Token { id, token });
        self.normalize();
        id
    }

    /// Delete every unit in `range`, returning how many were removed.
    pub fn delete_range(&mut self, range: Range<usize>) -> usize {
        let len = self.len();
        let end = range.end.min(len);
        let start = range.start.min(end);
        if start == end {
            return 0;
        }
        let first = self.split_at(start);
        let last = self.split_at(end);
        let removed = self.nodes.drain(first..last).map(|n| n.width()).sum();
        self.normalize();
        removed
    }

    /// Remove a token by id, returning its former position and payload.
    pub fn remove_token(&mut self, id: TokenId) -> Option<(usize, Token)> {
        let pos = self.token_position(id)?;
        let idx = self
            .nodes
            .iter()
            .position(|n| matches!(n, Node::Token { id: tid, .. } if *tid == id))?;
        let Node::Token { token, .. } = self.nodes.remove(idx) else {
            return None;
        };
        self.normalize();
        Some((pos, token))
    }

    pub fn clear(&mut self) {
        self.nodes.clear();
    }

    // === Projections ===

    /// Text as the surface displays it: runs verbatim, tokens as their label.
    pub fn rendered_text(&self) -> String {
        let mut out = String::new();
        for node in &self.nodes {
            match node {
                Node::Text(text) => out.push_str(text),
                Node::Token { token, .. } => out.push_str(token.label()),
            }
        }
        out
    }

    // === Internals ===

    fn alloc_id(&mut self) -> TokenId {
        let id = TokenId(self.next_id);
        self.next_id += 1;
        id
    }

    /// Ensure a node boundary at `pos`, splitting a text run if needed.
    ///
    /// Returns the node index at which content for `pos` should be inserted.
    fn split_at(&mut self, pos: usize) -> usize {
        let mut acc = 0;
        for i in 0..self.nodes.len() {
            if pos == acc {
                return i;
            }
            let width = self.nodes[i].width();
            if pos < acc + width {
                if let Node::Text(text) = &mut self.nodes[i] {
                    let byte = char_to_byte(text, pos - acc);
                    let tail = text.split_off(byte);
                    self.nodes.insert(i + 1, Node::Text(tail));
                }
                return i + 1;
            }
            acc += width;
        }
        self.nodes.len()
    }

    fn normalize(&mut self) {
        let mut out: Vec<Node> = Vec::with_capacity(self.nodes.len());
        for node in self.nodes.drain(..) {
            match node {
                Node::Text(text) if text.is_empty() => {}
                Node::Text(text) => match out.last_mut() {
                    Some(Node::Text(prev)) => prev.push_str(&text),
                    _ => out.push(Node::Text(text)),
                },
                token => out.push(token),
            }
        }
        self.nodes = out;
    }
}

fn char_to_byte(text: &str, char_offset: usize) -> usize {
    text.char_indices()
        .nth(char_offset)
        .map(|(b, _)| b)
        .unwrap_or(text.len())
}
