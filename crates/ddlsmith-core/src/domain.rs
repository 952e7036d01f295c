use std::collections::BTreeMap;

use crate::attributes::Attributes;
use crate::document::Document;
use crate::error::Result;

/// Named column attribute templates.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Domains {
    templates: BTreeMap<String, Attributes>,
}

impl Domains {
    /// Build the registry from the `domains` section of a document.
    pub fn from_document(document: &Document) -> Result<Self> {
        let section = document.root().require("domains")?;
        let mut templates = BTreeMap::new();
        for (name, node) in section.entries()? {
            templates.insert(name, Attributes::from_node(&node)?);
        }
        Ok(Self { templates })
    }

    pub fn resolve(&self, name: &str) -> Option<&Attributes> {
        self.templates.get(name)
    }

    pub fn len(&self) -> usize {
        self.templates.len()
    }

    pub fn is_empty(&self) -> bool {
        self.templates.is_empty()
    }
}
