use ddlsmith_core::Column;

use crate::indent;

/// `(<size>)` when the column has a size.
pub fn column_size(column: &Column) -> String {
    column
        .size()
        .map(|size| format!("({size})"))
        .unwrap_or_default()
}

/// `DEFAULT <value>` when the column has a default.
pub fn column_default(column: &Column) -> String {
    column
        .default()
        .map(|value| format!("DEFAULT {value}"))
        .unwrap_or_default()
}

pub fn column_null(column: &Column) -> &'static str {
    if column.nullable() { "" } else { " NOT NULL" }
}

/// One ` CHECK(<expr>)` per column check, concatenated.
pub fn column_checks(column: &Column) -> String {
    column
        .checks()
        .iter()
        .map(|check| format!(" CHECK({check})"))
        .collect()
}

/// Column lines of a `create table` body, joined with `,\n`.
pub fn column_definitions(columns: &[Column], level: usize) -> String {
    columns
        .iter()
        .map(|column| {
            format!(
                "{}{} {}{} {}{}{}",
                indent(level),
                column.physical_name().unwrap_or_default(),
                column.data_type().unwrap_or_default(),
                column_size(column),
                column_default(column),
                column_null(column),
                column_checks(column),
            )
        })
        .collect::<Vec<_>>()
        .join(",\n")
}
