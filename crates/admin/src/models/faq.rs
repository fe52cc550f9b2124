//! FAQ entries, stored as an ordered list per category.

use serde::{Deserialize, Serialize};
use serde_json::Value;

use crate::db::children;

/// A single question and answer (`faqs/{category}/{index}`).
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct Faq {
    pub question: String,
    pub answer: String,
}

/// The FAQ list of one category, keeping each entry's stored index.
///
/// Lists written by older clients may have holes, so the stored index
/// of an entry is not always its position.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct FaqList {
    pub entries: Vec<IndexedFaq>,
}

/// A FAQ entry with its stored index.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct IndexedFaq {
    pub index: usize,
    #[serde(flatten)]
    pub faq: Faq,
}

impl FaqList {
    /// Decode a category node stored as an array or an index-keyed object.
    ///
    /// Holes and entries that do not decode are skipped.
    #[must_use]
    pub fn from_node(node: Option<Value>) -> Self {
        let mut entries: Vec<IndexedFaq> = node
            .map(children)
            .unwrap_or_default()
            .into_iter()
            .filter_map(|(key, value)| {
                let Ok(index) = key.parse::<usize>() else {
                    tracing::warn!(key = %key, "Skipping FAQ with non-numeric index");
                    return None;
                };
                match serde_json::from_value::<Faq>(value) {
                    Ok(faq) => Some(IndexedFaq { index, faq }),
                    Err(e) => {
                        tracing::warn!(index, error = %e, "Skipping undecodable FAQ");
                        None
                    }
                }
            })
            .collect();
        entries.sort_by_key(|e| e.index);
        Self { entries }
    }

    /// Entry stored at `index`.
    #[must_use]
    pub fn get(&self, index: usize) -> Option<&Faq> {
        self.entries
            .iter()
            .find(|e| e.index == index)
            .map(|e| &e.faq)
    }

    /// Entries in order, without their indices.
    #[must_use]
    pub fn to_dense(&self) -> Vec<Faq> {
        self.entries.iter().map(|e| e.faq.clone()).collect()
    }

    /// Number of entries.
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Whether the list has no entries.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}
