use std::collections::BTreeMap;

use crate::document::{Document, scalar_text};
use crate::error::Result;

/// Logical-name segment to physical-name fragment mapping.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Dictionary {
    entries: BTreeMap<String, String>,
}

impl Dictionary {
    /// Build a dictionary from the `dictionary` section of a document.
    pub fn from_document(document: &Document) -> Result<Self> {
        let section = document.root().require("dictionary")?;
        let entries = section
            .entries()?
            .into_iter()
            .filter_map(|(segment, node)| Some((segment, scalar_text(node.value())?)))
            .collect();
        Ok(Self { entries })
    }

    pub fn from_entries<K, V>(entries: impl IntoIterator<Item = (K, V)>) -> Self
    where
        K: Into<String>,
        V: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(segment, fragment)| (segment.into(), fragment.into()))
                .collect(),
        }
    }

    pub fn get(&self, segment: &str) -> Option<&str> {
        self.entries.get(segment).map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    /// Translate a dotted logical name segment by segment.
    ///
    /// Each segment is looked up whole; segments without an entry are kept
    /// verbatim. The results are concatenated without a separator.
    pub fn translate(&self, logical_name: &str) -> String {
        logical_name
            .split('.')
            .map(|segment| self.get(segment).unwrap_or(segment))
            .collect()
    }
}
