use ddlsmith_core::Table;

use crate::indent;

fn format_comment(comment: &str) -> String {
    if comment.is_empty() {
        String::new()
    } else {
        format!("\t {comment}")
    }
}

/// `comment on table` followed by one `comment on column` per column.
pub fn table_comments(table: &Table, level: usize) -> String {
    let prefix = indent(level);
    let name = table.physical_name().unwrap_or_default();

    let mut ddl = format!(
        "{prefix}comment on table {name} is '{}{}';\n",
        table.logical_name().unwrap_or_default(),
        format_comment(table.comment()),
    );
    for column in table.columns() {
        ddl.push_str(&format!(
            "{prefix}comment on column {name}.{} is '{}{}';\n",
            column.physical_name().unwrap_or_default(),
            column.display_name(),
            format_comment(column.comment()),
        ));
    }
    ddl
}
