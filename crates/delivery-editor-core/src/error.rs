//! Error types for editor operations.

use thiserror::Error;

use crate::platform::PlatformError;

/// Errors produced by editing, clipboard and drag-and-drop operations.
///
/// None of these are fatal to an editing session. Whenever one is returned
/// the document is left exactly as it was before the call.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[non_exhaustive]
pub enum EditorError {
    /// A mutation was attempted while the surface is read-only.
    #[error("editing is disabled")]
    EditingDisabled,

    /// An insert was requested with no template or product chosen.
    #[error("nothing selected to insert")]
    MissingSelection,

    /// The platform clipboard rejected a write.
    #[error("clipboard write failed: {0}")]
    ClipboardWriteFailed(String),

    /// A stock token resolved to a product with no available codes.
    #[error("no available stock for {product}")]
    NoAvailableStock { product: String },

    /// A drag payload could not be decoded into a token.
    #[error("malformed drag payload: {0}")]
    MalformedDragPayload(String),

    /// An attribute set does not describe a well-formed token.
    #[error("malformed token: {0}")]
    MalformedToken(String),
}

impl EditorError {
    /// Whether this failure should be shown to the user.
    ///
    /// Malformed drag payloads are dropped without feedback.
    pub fn is_user_visible(&self) -> bool {
        !matches!(self, EditorError::MalformedDragPayload(_))
    }
}

impl From<PlatformError> for EditorError {
    fn from(e: PlatformError) -> Self {
        EditorError::ClipboardWriteFailed(e.0)
    }
}

impl From<serde_json::Error> for EditorError {
    fn from(e: serde_json::Error) -> Self {
        EditorError::MalformedDragPayload(e.to_string())
    }
}
