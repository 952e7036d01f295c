//! Placeholder expansion for check-constraint expressions.
//!
//! Two dialects exist. Column checks use the literal `<name>` for the owning
//! column. Table checks use `<logical.path>` to address any column of the
//! table by its authored logical name.

use std::sync::LazyLock;

use regex::{Captures, Regex};

/// Stands for the owning column inside a column-level check.
pub const COLUMN_PLACEHOLDER: &str = "<name>";

static TABLE_PLACEHOLDER: LazyLock<Option<Regex>> =
    LazyLock::new(|| Regex::new(r"<([^\s<>]+)>").ok());

/// Expand a column-level check.
///
/// Every `<name>` is replaced by `physical_name`; an expression without the
/// placeholder gets the physical name and a space prefixed instead.
pub fn expand_column_check(expression: &str, physical_name: &str) -> String {
    if expression.contains(COLUMN_PLACEHOLDER) {
        expression.replace(COLUMN_PLACEHOLDER, physical_name)
    } else {
        format!("{physical_name} {expression}")
    }
}

/// Expand a table-level check, asking `resolve` for each `<logical.path>`.
///
/// Paths the resolver does not know become the empty string.
pub fn expand_table_check<F>(expression: &str, mut resolve: F) -> String
where
    F: FnMut(&str) -> Option<String>,
{
    let Some(pattern) = TABLE_PLACEHOLDER.as_ref() else {
        return expression.to_string();
    };
    pattern
        .replace_all(expression, |caps: &Captures<'_>| {
            resolve(&caps[1]).unwrap_or_default()
        })
        .into_owned()
}

/// Logical paths referenced by a table-level check, in order of appearance.
pub fn table_placeholders(expression: &str) -> Vec<&str> {
    let Some(pattern) = TABLE_PLACEHOLDER.as_ref() else {
        return Vec::new();
    };
    pattern
        .captures_iter(expression)
        .filter_map(|caps| caps.get(1).map(|path| path.as_str()))
        .collect()
}
