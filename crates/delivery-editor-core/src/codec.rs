//! Token codec: flat attribute sets for the DOM and drag payloads.
//!
//! A token travels through two string-only channels: element attributes on the
//! rendered surface, and the drag-and-drop transfer (one JSON object). Both use
//! the same `AttributeSet`, so both round-trip every field losslessly.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

use crate::error::EditorError;
use crate::token::{Token, TokenKind};

pub const DATA_TOKEN_TYPE: &str = "data-token-type";
pub const DATA_LABEL: &str = "data-label";
pub const DATA_VALUE: &str = "data-value";
pub const DATA_PRODUCT_ID: &str = "data-product-id";

/// Flat attribute form of a token.
///
/// Absent keys are `None`, never empty strings.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub struct AttributeSet {
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub token_type: Option<SmolStr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub label: Option<SmolStr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub value: Option<SmolStr>,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub product_id: Option<SmolStr>,
}

impl AttributeSet {
    /// Build from an attribute lookup, e.g. `Element::get_attribute`.
    pub fn from_dom<F>(lookup: F) -> Self
    where
        F: Fn(&str) -> Option<String>,
    {
        Self {
            token_type: lookup(DATA_TOKEN_TYPE).map(SmolStr::from),
            label: lookup(DATA_LABEL).map(SmolStr::from),
            value: lookup(DATA_VALUE).map(SmolStr::from),
            product_id: lookup(DATA_PRODUCT_ID).map(SmolStr::from),
        }
    }

    /// Present attributes as `data-*` name/value pairs, in a fixed order.
    pub fn dom_attributes(&self) -> impl Iterator<Item = (&'static str, &str)> {
        [
            (DATA_TOKEN_TYPE, &self.token_type),
            (DATA_LABEL, &self.label),
            (DATA_VALUE, &self.value),
            (DATA_PRODUCT_ID, &self.product_id),
        ]
        .into_iter()
        .filter_map(|(name, v)| v.as_deref().map(|v| (name, v)))
    }
}

/// Encode a token into its attribute set.
pub fn encode(token: &Token) -> AttributeSet {
    match token {
        Token::Message { label, value } => AttributeSet {
            token_type: Some(SmolStr::new_static(TokenKind::Message.as_str())),
            label: Some(label.clone()),
            value: value.clone(),
            product_id: None,
        },
        Token::Stock { label, product_id } => AttributeSet {
            token_type: Some(SmolStr::new_static(TokenKind::Stock.as_str())),
            label: Some(label.clone()),
            value: None,
            product_id: Some(product_id.clone()),
        },
    }
}

/// Decode an attribute set into a token.
///
/// Fields that do not belong to the token's type are ignored.
pub fn decode(attrs: &AttributeSet) -> Result<Token, EditorError> {
    let kind: TokenKind = attrs
        .token_type
        .as_deref()
        .ok_or_else(|| EditorError::MalformedToken("missing token-type".into()))?
        .parse()?;
    let label = attrs
        .label
        .clone()
        .ok_or_else(|| EditorError::MalformedToken("missing label".into()))?;

    match kind {
        TokenKind::Message => Ok(Token::Message {
            label,
            value: attrs.value.clone(),
        }),
        TokenKind::Stock => {
            let product_id = attrs
                .product_id
                .clone()
                .ok_or_else(|| EditorError::MalformedToken("stock without product-id".into()))?;
            Ok(Token::Stock { label, product_id })
        }
    }
}

/// Serialize a token as a drag payload (one JSON object).
pub fn to_drag_payload(token: &Token) -> Result<String, EditorError> {
    Ok(serde_json::to_string(&encode(token))?)
}

/// Parse a drag payload back into a token.
///
/// Every failure is reported as `MalformedDragPayload`.
pub fn from_drag_payload(payload: &str) -> Result<Token, EditorError> {
    let attrs: AttributeSet = serde_json::from_str(payload)?;
    decode(&attrs).map_err(|e| EditorError::MalformedDragPayload(e.to_string()))
}
