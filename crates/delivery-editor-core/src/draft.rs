//! The host-owned draft record an editing session writes into.

use serde::{Deserialize, Serialize};

/// Transient state of the stock picker beside the editor.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockPicker {
    pub open: bool,
    pub query: String,
    pub product_id: Option<String>,
}

/// Draft of a delivery note.
///
/// `note` is the serialized document and the only durable output of the
/// editor. `template` is the label of the last-selected message template.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Draft {
    pub note: String,
    #[serde(default)]
    pub template: String,
    #[serde(skip)]
    pub stock_picker: StockPicker,
}

impl Draft {
    pub fn new(note: impl Into<String>) -> Self {
        Self {
            note: note.into(),
            ..Default::default()
        }
    }
}
