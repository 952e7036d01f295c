use ddlsmith_core::{Table, index_number};

/// One `create index` statement per index key, in key order.
pub fn create_indexes(table: &Table) -> String {
    let name = table.physical_name().unwrap_or_default();
    table
        .index_keys()
        .into_iter()
        .map(|key| {
            let columns = table
                .index(key)
                .iter()
                .map(|column| column.physical_name().unwrap_or_default())
                .collect::<Vec<_>>()
                .join(", ");
            format!(
                "create index I_{name}{} on {name}({columns});\n",
                index_number(key)
            )
        })
        .collect()
}
