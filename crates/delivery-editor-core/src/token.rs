//! Tokens: atomic, data-carrying units embedded in a note.

use std::fmt;
use std::str::FromStr;

use smol_str::SmolStr;

use crate::error::EditorError;

/// Discriminant of a token, as written in the `token-type` attribute.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum TokenKind {
    Message,
    Stock,
}

impl TokenKind {
    pub fn as_str(self) -> &'static str {
        match self {
            TokenKind::Message => "message",
            TokenKind::Stock => "stock",
        }
    }
}

impl FromStr for TokenKind {
    type Err = EditorError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "message" => Ok(TokenKind::Message),
            "stock" => Ok(TokenKind::Stock),
            other => Err(EditorError::MalformedToken(format!(
                "unknown token type {other:?}"
            ))),
        }
    }
}

impl fmt::Display for TokenKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A token's typed payload.
///
/// Each variant carries exactly the fields its type needs. A token has no
/// editable text of its own; `label` is display only.
#[derive(Clone, Debug, PartialEq, Eq, Hash)]
pub enum Token {
    /// Reference to a message template. Clicking copies `value`.
    Message {
        label: SmolStr,
        value: Option<SmolStr>,
    },
    /// Reference to a product's stock list, resolved at click time.
    Stock { label: SmolStr, product_id: SmolStr },
}

impl Token {
    pub fn message(label: impl Into<SmolStr>, value: impl Into<SmolStr>) -> Self {
        Token::Message {
            label: label.into(),
            value: Some(value.into()),
        }
    }

    pub fn stock(label: impl Into<SmolStr>, product_id: impl Into<SmolStr>) -> Self {
        Token::Stock {
            label: label.into(),
            product_id: product_id.into(),
        }
    }

    pub fn kind(&self) -> TokenKind {
        match self {
            Token::Message { .. } => TokenKind::Message,
            Token::Stock { .. } => TokenKind::Stock,
        }
    }

    pub fn label(&self) -> &str {
        match self {
            Token::Message { label, .. } | Token::Stock { label, .. } => label,
        }
    }
}

/// Session-local identity of a token placed in a document.
///
/// Ids are assigned on insertion and never persisted.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct TokenId(pub u64);

impl fmt::Display for TokenId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for TokenId {
    type Err = std::num::ParseIntError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        s.parse().map(TokenId)
    }
}
