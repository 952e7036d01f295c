use ddlsmith_core::Table;

use crate::column::column_definitions;
use crate::indent;

/// `drop table` followed by `create table` for the whole table.
///
/// The body holds the column lines, then the primary key and table checks.
pub fn create_table(table: &Table) -> String {
    let name = table.physical_name().unwrap_or_default();
    format!(
        "drop table {name};\ncreate table {name} (\n{}\n{}\n);\n",
        column_definitions(table.columns(), 1),
        table_constraints(table, 1),
    )
}

/// Primary key clause and table-level checks, each introduced by `, `.
pub fn table_constraints(table: &Table, level: usize) -> String {
    let name = table.physical_name().unwrap_or_default();
    let prefix = indent(level);

    let primary_key = table.primary_key();
    let mut constraints = if primary_key.is_empty() {
        String::new()
    } else {
        let columns = primary_key
            .iter()
            .map(|column| column.physical_name().unwrap_or_default())
            .collect::<Vec<_>>()
            .join(", ");
        format!("{prefix}, constraint PK_{name} primary key({columns})")
    };

    for check in table.checks() {
        constraints.push_str(&format!("\n{prefix}, CHECK({check})"));
    }
    constraints
}
