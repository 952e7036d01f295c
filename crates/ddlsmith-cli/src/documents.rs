use std::path::Path;

use ddlsmith_core::{Dictionary, Document, Domains, Table};
use tracing::{debug, info};

use crate::CliError;
use crate::config::DocumentPath;

/// Dictionary and domain registry shared by every table of one invocation.
#[derive(Debug, Default)]
pub struct Catalog {
    pub dictionary: Option<Dictionary>,
    pub domains: Option<Domains>,
}

impl Catalog {
    pub fn load(dictionary: &DocumentPath, domains: &DocumentPath) -> Result<Self, CliError> {
        let dictionary = load_optional(dictionary)?
            .map(|document| Dictionary::from_document(&document))
            .transpose()?;
        let domains = load_optional(domains)?
            .map(|document| Domains::from_document(&document))
            .transpose()?;

        info!(
            event = "documents_loaded",
            dictionary_entries = dictionary.as_ref().map_or(0, Dictionary::len),
            domains = domains.as_ref().map_or(0, Domains::len),
        );

        Ok(Self {
            dictionary,
            domains,
        })
    }

    pub fn table(&self, path: &Path) -> Result<Table, CliError> {
        let document = Document::load(path)?;
        let table = Table::from_document(
            &document,
            self.dictionary.as_ref(),
            self.domains.as_ref(),
        )?;
        debug!(
            event = "table_loaded",
            path = %path.display(),
            table = table.physical_name().unwrap_or_default(),
        );
        Ok(table)
    }
}

/// Implicit defaults may be absent; a path the user named must load.
fn load_optional(location: &DocumentPath) -> Result<Option<Document>, CliError> {
    if !location.explicit && !location.path.exists() {
        debug!(
            event = "document_skipped",
            path = %location.path.display(),
            "default document not found"
        );
        return Ok(None);
    }
    Ok(Some(Document::load(&location.path)?))
}
