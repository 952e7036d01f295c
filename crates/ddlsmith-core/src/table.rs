use std::collections::BTreeSet;
use std::path::Path;

use tracing::{debug, warn};

use crate::column::Column;
use crate::dictionary::Dictionary;
use crate::document::{Document, Node, scalar_text};
use crate::domain::Domains;
use crate::error::Result;
use crate::placeholder::{expand_table_check, table_placeholders};
use crate::reference::{Reference, TableTarget};

/// A table named in the table-level `refers` list.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TableReference {
    pub logical_name: String,
    pub physical_name: String,
}

/// A foreign key assembled from one table-level reference and the column
/// references that target it, sorted by their `order`.
#[derive(Debug, Clone)]
pub struct ForeignKey<'a> {
    pub target: &'a TableReference,
    pub references: Vec<&'a Reference>,
}

impl ForeignKey<'_> {
    pub fn local_columns(&self) -> Vec<&str> {
        self.references
            .iter()
            .map(|reference| reference.local_column())
            .collect()
    }

    pub fn remote_columns(&self) -> Vec<&str> {
        self.references
            .iter()
            .map(|reference| reference.remote_column())
            .collect()
    }
}

/// One table with its columns, built once from a schema-description document.
#[derive(Debug, Clone, PartialEq)]
pub struct Table {
    logical_name: Option<String>,
    physical_name: Option<String>,
    comment: String,
    columns: Vec<Column>,
    checks: Vec<String>,
    references: Option<Vec<TableReference>>,
}

impl Table {
    /// Build the table from the `table` section of a document.
    ///
    /// Without an explicit `pname` the physical name is the file stem of the
    /// document's source path.
    pub fn from_document(
        document: &Document,
        dictionary: Option<&Dictionary>,
        domains: Option<&Domains>,
    ) -> Result<Self> {
        let section = document.root().require("table")?;
        Self::from_node(&section, document.source(), dictionary, domains)
    }

    pub fn from_node(
        node: &Node<'_>,
        source: Option<&Path>,
        dictionary: Option<&Dictionary>,
        domains: Option<&Domains>,
    ) -> Result<Self> {
        let columns = node
            .require("columns")?
            .items()
            .iter()
            .map(|column| Column::from_node(column, dictionary, domains))
            .collect::<Result<Vec<_>>>()?;

        let text = |field: &str| -> Result<Option<String>> {
            Ok(node
                .extract(field)?
                .and_then(|value| scalar_text(value.value())))
        };

        let physical_name = text("pname")?.or_else(|| {
            source
                .and_then(Path::file_stem)
                .map(|stem| stem.to_string_lossy().into_owned())
        });

        let checks = match node.extract("checks")? {
            Some(checks) => checks
                .items()
                .iter()
                .map(Node::text)
                .collect::<Result<Vec<_>>>()?,
            None => Vec::new(),
        };

        // Column references address these entries by position.
        let references = match node.extract("refers")? {
            Some(refers) => Some(
                refers
                    .items()
                    .iter()
                    .map(|item| {
                        let logical_name = item.text()?;
                        Ok(TableReference {
                            physical_name: match dictionary {
                                Some(dictionary) => dictionary.translate(&logical_name),
                                None => logical_name.clone(),
                            },
                            logical_name,
                        })
                    })
                    .collect::<Result<Vec<_>>>()?,
            ),
            None => None,
        };

        let table = Self {
            logical_name: text("name")?,
            physical_name,
            comment: text("comment")?.unwrap_or_default(),
            columns,
            checks,
            references,
        };
        debug!(
            table = table.physical_name().unwrap_or_default(),
            columns = table.columns.len(),
            "table model built"
        );
        Ok(table)
    }

    pub fn logical_name(&self) -> Option<&str> {
        self.logical_name.as_deref()
    }

    pub fn physical_name(&self) -> Option<&str> {
        self.physical_name.as_deref()
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn columns(&self) -> &[Column] {
        &self.columns
    }

    /// Find a column by its authored logical name.
    pub fn column_by_logical_name(&self, logical_name: &str) -> Option<&Column> {
        self.columns
            .iter()
            .find(|column| column.logical_name() == Some(logical_name))
    }

    /// Primary key columns ordered by rank; equal ranks keep declaration order.
    pub fn primary_key(&self) -> Vec<&Column> {
        let mut columns: Vec<&Column> = self
            .columns
            .iter()
            .filter(|column| column.primary_key_rank().is_some())
            .collect();
        columns.sort_by_key(|column| column.primary_key_rank());
        columns
    }

    /// Distinct index keys across all columns, sorted by name.
    pub fn index_keys(&self) -> Vec<&str> {
        self.columns
            .iter()
            .flat_map(|column| column.indexes())
            .map(|membership| membership.key.as_str())
            .collect::<BTreeSet<_>>()
            .into_iter()
            .collect()
    }

    /// Members of the index `key` ordered by their rank in it.
    pub fn index(&self, key: &str) -> Vec<&Column> {
        let mut members: Vec<(i64, &Column)> = self
            .columns
            .iter()
            .filter_map(|column| column.index_rank(key).map(|rank| (rank, column)))
            .collect();
        members.sort_by_key(|(rank, _)| *rank);
        members.into_iter().map(|(_, column)| column).collect()
    }

    /// Table-level references with dictionary-translated names.
    ///
    /// `None` means the table declares no `refers` at all.
    pub fn table_references(&self) -> Option<&[TableReference]> {
        self.references.as_deref()
    }

    /// Column references pointing at `target`, ordered by `order`.
    ///
    /// Columns are visited in declaration order, so equal orders keep it.
    pub fn references_to(&self, target: &TableTarget) -> Vec<&Reference> {
        self.collect_references(|candidate| candidate == target)
    }

    /// One foreign key per table-level reference.
    ///
    /// A column reference joins the key at position `i` when its target is
    /// `i` or the logical or physical name of that table-level reference.
    pub fn foreign_keys(&self) -> Option<Vec<ForeignKey<'_>>> {
        let targets = self.references.as_ref()?;
        Some(
            targets
                .iter()
                .enumerate()
                .map(|(position, target)| ForeignKey {
                    target,
                    references: self.collect_references(|candidate| {
                        candidate.designates(
                            position,
                            &target.logical_name,
                            &target.physical_name,
                        )
                    }),
                })
                .collect(),
        )
    }

    /// Table-level checks with every `<logical.path>` expanded.
    ///
    /// Paths that name no column expand to the empty string.
    pub fn checks(&self) -> Vec<String> {
        self.checks
            .iter()
            .map(|expression| {
                expand_table_check(expression, |path| {
                    let resolved = self
                        .column_by_logical_name(path)
                        .map(|column| column.physical_name().unwrap_or_default().to_string());
                    if resolved.is_none() {
                        warn!(
                            table = self.physical_name().unwrap_or_default(),
                            path, "check placeholder names no column"
                        );
                    }
                    resolved
                })
            })
            .collect()
    }

    /// Placeholder paths of table-level checks that name no column.
    pub fn unresolved_check_paths(&self) -> Vec<&str> {
        self.checks
            .iter()
            .flat_map(|expression| table_placeholders(expression))
            .filter(|path| self.column_by_logical_name(path).is_none())
            .collect()
    }

    fn collect_references<F>(&self, mut accept: F) -> Vec<&Reference>
    where
        F: FnMut(&TableTarget) -> bool,
    {
        let mut references: Vec<&Reference> = self
            .columns
            .iter()
            .flat_map(|column| column.references())
            .filter(|reference| reference.target().is_some_and(&mut accept))
            .collect();
        references.sort_by_key(|reference| reference.order());
        references
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::error::Error;

    const TABLE_SAMPLE: &str =
        "{table: {name: testname, pname: test_table, columns: [{name: word1.word2, domain: domain1}]}}";
    const TABLE_SAMPLE_COLUMNS: &str = "{table: {name: testname, pname: test_table, columns: [\
        {name: word1.word2, domain: domain1, nullable: false}, \
        {name: word2.word3, domain: domain2, pkey: 2, nullable: false}, \
        {name: word3.GGG, domain: domain1, pkey: 1, nullable: false}]}}";

    fn domains() -> Domains {
        let document = Document::parse(
            "domains: {domain1: {type: number, size: 10, default: 200, nullable: false}, \
             domain2: {type: varchar, size: 10}}",
        )
        .unwrap();
        Domains::from_document(&document).unwrap()
    }

    fn dictionary() -> Dictionary {
        Dictionary::from_entries([("word1", "AAA"), ("word2", "BBB"), ("word3", "CCC")])
    }

    fn table(yaml: &str) -> Table {
        let document = Document::parse(yaml).unwrap();
        Table::from_document(&document, Some(&dictionary()), Some(&domains())).unwrap()
    }

    fn names(columns: &[&Column]) -> Vec<String> {
        columns
            .iter()
            .map(|column| column.physical_name().unwrap_or_default().to_string())
            .collect()
    }

    #[test]
    fn physical_name_falls_back_to_file_stem() {
        assert_eq!(table(TABLE_SAMPLE).physical_name(), Some("test_table"));

        let document =
            Document::parse("{table: {name: testname, columns: [{name: word1.word2}]}}").unwrap();
        let section = document.root().require("table").unwrap();
        let table =
            Table::from_node(&section, Some(Path::new("dir/file_name.yaml")), None, None).unwrap();
        assert_eq!(table.physical_name(), Some("file_name"));
    }

    #[test]
    fn columns_are_required() {
        let document = Document::parse("{table: {name: t}}").unwrap();
        assert!(Table::from_document(&document, None, None).is_err());
    }

    #[test]
    fn non_scalar_refers_entry_is_a_shape_error() {
        let document =
            Document::parse("{table: {pname: t, refers: [parent, [nested], other], columns: [{pname: a}]}}")
                .unwrap();
        let err = Table::from_document(&document, None, None).unwrap_err();
        assert!(
            matches!(&err, Error::Shape { path, expected: "a scalar", found: "a sequence" }
                if path == "document.table.refers[1]"),
            "{err}"
        );
    }

    #[test]
    fn non_scalar_check_is_a_shape_error() {
        let document =
            Document::parse("{table: {pname: t, checks: ['<a> > 0', {bad: 1}], columns: [{name: a}]}}")
                .unwrap();
        assert!(matches!(
            Table::from_document(&document, None, None),
            Err(Error::Shape { found: "a mapping", .. })
        ));
    }

    #[test]
    fn primary_key_is_sorted_by_rank() {
        let table = table(TABLE_SAMPLE_COLUMNS);
        assert_eq!(names(&table.primary_key()), vec!["CCCGGG", "BBBCCC"]);
    }

    #[test]
    fn primary_key_ties_keep_declaration_order() {
        let table = table("{table: {columns: [{pname: A, pkey: 1}, {pname: B}, {pname: C, pkey: 1}]}}");
        assert_eq!(names(&table.primary_key()), vec!["A", "C"]);
    }

    #[test]
    fn indexes_are_grouped_and_ordered() {
        let table = table(
            "table: {name: test_index, pname: test_index, columns: [\
             {pname: col1, type: number, index2: 2, index1: 1}, \
             {pname: col2, type: number, index2: 1}, \
             {pname: col3, type: number}]}",
        );
        assert_eq!(table.index_keys(), vec!["index1", "index2"]);
        assert_eq!(names(&table.index("index1")), vec!["col1"]);
        assert_eq!(names(&table.index("index2")), vec!["col2", "col1"]);
        assert!(table.index("index3").is_empty());
    }

    #[test]
    fn table_references_are_translated() {
        let table =
            table("{table: {name: test_refers, refers: [word1.word4, word2.word3], columns: [name: dummy]}}");
        let references = table.table_references().unwrap();
        assert_eq!(references[0].physical_name, "AAAword4");
        assert_eq!(references[1].physical_name, "BBBCCC");
        assert_eq!(references[1].logical_name, "word2.word3");

        let bare = self::table("{table: {columns: [name: dummy]}}");
        assert!(bare.table_references().is_none());
    }

    #[test]
    fn references_to_sorts_by_order() {
        let table = table(
            "{table: {columns: [{name: TEST1, refers: {table: 1, order: 999}}, {name: TEST2, refers: {table: 1}}]}}",
        );
        let references = table.references_to(&TableTarget::Position(1));
        assert_eq!(references.len(), 2);
        assert_eq!(references[0].local_column(), "TEST2");
        assert_eq!(references[1].order(), 999);
        assert_eq!(references[1].local_column(), "TEST1");
        assert!(table.references_to(&TableTarget::Position(0)).is_empty());
    }

    #[test]
    fn foreign_keys_pair_targets_with_column_references() {
        let table = table(
            "{table: {pname: test_refers, refers: [ptable1, word1.word2], columns: [\
             {name: TEST1, refers: {table: 0, order: 999}}, \
             {name: TEST2, refers: {table: 0, column: TEST9}}, \
             {name: TEST3, refers: {table: word1.word2}}]}}",
        );
        let keys = table.foreign_keys().unwrap();
        assert_eq!(keys.len(), 2);
        assert_eq!(keys[0].target.physical_name, "ptable1");
        assert_eq!(keys[0].local_columns(), vec!["TEST2", "TEST1"]);
        assert_eq!(keys[0].remote_columns(), vec!["TEST9", "TEST1"]);
        assert_eq!(keys[1].target.physical_name, "AAABBB");
        assert_eq!(keys[1].local_columns(), vec!["TEST3"]);
    }

    #[test]
    fn checks_resolve_logical_paths() {
        let single = table(
            "{table: {name: testname, pname: test_table, columns: [{name: word1.word2, domain: domain1}], \
             checks: <word1.word2> > 0}}",
        );
        assert_eq!(single.checks(), vec!["AAABBB > 0"]);

        let multi = table(
            "{table: {name: testname, pname: test_table, columns: [\
             {name: word1.word2, domain: domain1, nullable: false}, \
             {name: word2.word3, domain: domain2, pkey: 2, nullable: false}, \
             {name: word3.GGG, domain: domain1, pkey: 1, nullable: false}], \
             checks: [<word2.word3> = <word3.GGG>, <word3.GGG> < <word1.word2>]}}",
        );
        assert_eq!(multi.checks(), vec!["BBBCCC = CCCGGG", "CCCGGG < AAABBB"]);
        assert!(multi.unresolved_check_paths().is_empty());
    }

    #[test]
    fn unresolved_check_paths_become_empty() {
        let table = table("{table: {columns: [{name: a}], checks: '<a> < <missing.col>'}}");
        assert_eq!(table.checks(), vec!["a < "]);
        assert_eq!(table.unresolved_check_paths(), vec!["missing.col"]);
    }
}
