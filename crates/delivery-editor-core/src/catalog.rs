//! Read-only collaborator data: message templates, products and stock.
//!
//! The editor only ever reads a snapshot of these at the moment of an
//! insertion or a token click. Stock changes independently of open editors,
//! so tokens never cache codes.

use serde::{Deserialize, Serialize};
use smol_str::SmolStr;

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct MessageTemplate {
    pub label: String,
    pub value: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct StockEntry {
    pub code: String,
    pub status: String,
}

impl StockEntry {
    pub fn new(code: impl Into<String>, status: impl Into<String>) -> Self {
        Self {
            code: code.into(),
            status: status.into(),
        }
    }
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
pub struct Product {
    pub id: String,
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub stocks: Vec<StockEntry>,
}

/// Snapshot of the host's templates and products.
#[derive(Clone, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct Catalog {
    #[serde(default)]
    pub templates: Vec<MessageTemplate>,
    #[serde(default)]
    pub products: Vec<Product>,
}

impl Catalog {
    pub fn template(&self, label: &str) -> Option<&MessageTemplate> {
        self.templates.iter().find(|t| t.label == label)
    }

    pub fn product(&self, id: &str) -> Option<&Product> {
        self.products.iter().find(|p| p.id == id)
    }
}

/// A stock list partitioned into available and used entries.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct StockSplit<'a> {
    pub available: Vec<&'a StockEntry>,
    pub used: Vec<&'a StockEntry>,
}

impl StockSplit<'_> {
    /// Available codes joined one per line, ready for the clipboard.
    pub fn available_codes(&self) -> String {
        self.available
            .iter()
            .map(|s| s.code.as_str())
            .collect::<Vec<_>>()
            .join("\n")
    }
}

/// Host-supplied partition of a stock list.
pub trait StockPartition {
    fn split<'a>(&self, stocks: &'a [StockEntry]) -> StockSplit<'a>;
}

/// Partition by status: entries whose status equals `used_status`
/// (ignoring ASCII case) are used, everything else is available.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct StatusPartition {
    used_status: SmolStr,
}

impl StatusPartition {
    pub fn new(used_status: impl Into<SmolStr>) -> Self {
        Self {
            used_status: used_status.into(),
        }
    }
}

impl Default for StatusPartition {
    fn default() -> Self {
        Self::new("used")
    }
}

impl StockPartition for StatusPartition {
    fn split<'a>(&self, stocks: &'a [StockEntry]) -> StockSplit<'a> {
        let (used, available): (Vec<_>, Vec<_>) = stocks
            .iter()
            .partition(|s| s.status.trim().eq_ignore_ascii_case(&self.used_status));
        StockSplit { available, used }
    }
}
