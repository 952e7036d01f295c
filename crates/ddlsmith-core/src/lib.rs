//! Core schema model for ddlsmith.
//!
//! This crate turns schema-description documents (a name dictionary, domain
//! templates and one document per table) into resolved table models that
//! DDL can be generated from.

pub mod attributes;
pub mod column;
pub mod dictionary;
pub mod document;
pub mod domain;
pub mod error;
pub mod graph;
pub mod placeholder;
pub mod reference;
pub mod table;
pub mod validation;

pub use attributes::Attributes;
pub use column::{Column, IndexMembership, index_number};
pub use dictionary::Dictionary;
pub use document::{Document, Node};
pub use domain::Domains;
pub use error::{Error, Result};
pub use graph::{ReferenceOrder, build_reference_order};
pub use reference::{Reference, TableTarget};
pub use table::{ForeignKey, Table, TableReference};
pub use validation::{IssueSeverity, ValidationIssue, ValidationReport, validate_table};
