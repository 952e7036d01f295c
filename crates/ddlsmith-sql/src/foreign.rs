use ddlsmith_core::Table;
use tracing::debug;

/// `alter table ... add foreign key` statements joined with `;\n`.
///
/// `None` when the table declares no table-level references.
pub fn foreign_keys(table: &Table) -> Option<String> {
    let name = table.physical_name().unwrap_or_default();
    let statements: Vec<String> = table
        .foreign_keys()?
        .iter()
        .map(|key| {
            if key.references.is_empty() {
                debug!(table = name, target = %key.target.physical_name, "no column refers to target");
            }
            format!(
                "alter table {name} add foreign key({}) references {}({})",
                key.local_columns().join(","),
                key.target.physical_name,
                key.remote_columns().join(","),
            )
        })
        .collect();
    Some(statements.join(";\n"))
}

/// Foreign-key statements, each terminated, ready to be written out.
pub fn foreign_key_statements(table: &Table) -> Option<String> {
    foreign_keys(table)
        .filter(|ddl| !ddl.is_empty())
        .map(|ddl| format!("{ddl};\n"))
}
