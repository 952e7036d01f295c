//! DDL synthesis for ddlsmith table models.
//!
//! Every function here is pure formatting over an already-resolved
//! [`ddlsmith_core::Table`]; none of them fail.

pub mod column;
pub mod comment;
pub mod foreign;
pub mod index;
pub mod table;

pub use column::{column_checks, column_default, column_definitions, column_null, column_size};
pub use comment::table_comments;
pub use foreign::{foreign_key_statements, foreign_keys};
pub use index::create_indexes;
pub use table::{create_table, table_constraints};

/// One level of indentation in generated DDL.
pub const INDENT: &str = "  ";

pub(crate) fn indent(level: usize) -> String {
    INDENT.repeat(level)
}
