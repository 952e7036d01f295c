use ddlsmith_core::{IssueSeverity, Table, ValidationReport, build_reference_order, validate_table};
use ddlsmith_sql::{create_indexes, create_table, foreign_key_statements, table_comments};
use tracing::warn;

/// Create-table DDL followed by the comment statements.
pub fn table_ddl(table: &Table) -> String {
    let mut ddl = create_table(table);
    ddl.push_str(&table_comments(table, 0));
    ddl
}

pub fn index_ddl(table: &Table) -> String {
    create_indexes(table)
}

pub fn foreign_key_ddl(table: &Table) -> String {
    foreign_key_statements(table).unwrap_or_default()
}

/// DDL for several tables: every table body in reference order, then all
/// indexes, then all foreign keys.
pub fn build_ddl(tables: &[Table]) -> String {
    let order = build_reference_order(tables);
    if let Some(cycle) = &order.cycle {
        warn!(
            event = "reference_cycle",
            tables = %cycle.join(", "),
            "tables refer to each other; keeping declaration order"
        );
    }

    let ordered: Vec<&Table> = order
        .order_or_declared(tables.len())
        .into_iter()
        .map(|idx| &tables[idx])
        .collect();

    let mut ddl = String::new();
    for table in &ordered {
        ddl.push_str(&table_ddl(table));
    }
    for table in &ordered {
        ddl.push_str(&index_ddl(table));
    }
    for table in &ordered {
        ddl.push_str(&foreign_key_ddl(table));
    }
    ddl
}

pub fn lint_report(tables: &[Table]) -> ValidationReport {
    let mut report = ValidationReport::default();
    for table in tables {
        report.merge(validate_table(table));
    }
    report
}

/// One line per issue, errors first.
pub fn render_lint(report: &ValidationReport, tables: usize) -> String {
    let mut text = String::new();
    for issue in report.errors.iter().chain(&report.warnings) {
        let severity = match issue.severity {
            IssueSeverity::Error => "error",
            IssueSeverity::Warning => "warning",
        };
        text.push_str(&format!(
            "{severity}: {} [{}] {}\n",
            issue.path, issue.code, issue.message
        ));
        if let Some(hint) = &issue.hint {
            text.push_str(&format!("  hint: {hint}\n"));
        }
    }
    text.push_str(&format!(
        "{tables} table(s) checked: {} error(s), {} warning(s)\n",
        report.errors.len(),
        report.warnings.len()
    ));
    text
}

#[cfg(test)]
mod tests {
    use super::*;
    use ddlsmith_core::{Dictionary, Document, Domains};
    use std::path::{Path, PathBuf};

    fn samples() -> PathBuf {
        Path::new(env!("CARGO_MANIFEST_DIR")).join("../../samples")
    }

    fn sample_tables(names: &[&str]) -> Vec<Table> {
        let dictionary = Dictionary::from_document(
            &Document::load(&samples().join("dict.yaml")).expect("load dictionary"),
        )
        .expect("dictionary section");
        let domains = Domains::from_document(
            &Document::load(&samples().join("domains.yaml")).expect("load domains"),
        )
        .expect("domains section");
        names
            .iter()
            .map(|name| {
                let path = samples().join("tables").join(format!("{name}.yaml"));
                let document = Document::load(&path).expect("load table");
                Table::from_document(&document, Some(&dictionary), Some(&domains))
                    .expect("build table")
            })
            .collect()
    }

    fn position(ddl: &str, needle: &str) -> usize {
        ddl.find(needle)
            .unwrap_or_else(|| panic!("`{needle}` missing from:\n{ddl}"))
    }

    #[test]
    fn build_orders_tables_then_indexes_then_foreign_keys() {
        let ddl = build_ddl(&sample_tables(&["assignment", "employee", "department"]));

        let dept = position(&ddl, "create table DEPT (");
        let emp = position(&ddl, "create table EMP (");
        let assignment = position(&ddl, "create table assignment (");
        let first_index = position(&ddl, "create index I_DEPT1");
        let first_key = position(&ddl, "alter table EMP add foreign key");

        assert!(dept < emp && emp < assignment);
        assert!(position(&ddl, "comment on column assignment.HIREDT") < first_index);
        assert!(position(&ddl, "create index I_EMP2") < first_key);
        assert!(first_key < position(&ddl, "alter table assignment add foreign key(EMPCD)"));
        assert!(ddl.ends_with("references DEPT(DEPTCD);\n"));
    }

    #[test]
    fn build_keeps_declaration_order_on_cycles() {
        let tables: Vec<Table> = [
            "{table: {pname: A, refers: B, columns: [{pname: id, type: number}]}}",
            "{table: {pname: B, refers: A, columns: [{pname: id, type: number}]}}",
        ]
        .iter()
        .map(|yaml| {
            Table::from_document(&Document::parse(yaml).expect("parse"), None, None)
                .expect("build table")
        })
        .collect();
        let ddl = build_ddl(&tables);
        assert!(position(&ddl, "create table A (") < position(&ddl, "create table B ("));
    }

    #[test]
    fn single_table_modes() {
        let tables = sample_tables(&["department"]);
        let department = &tables[0];
        assert!(table_ddl(department).starts_with("drop table DEPT;\n"));
        assert!(table_ddl(department).ends_with("comment on column DEPT.DEPTNM is 'departmentname';\n"));
        assert_eq!(index_ddl(department), "create index I_DEPT1 on DEPT(DEPTNM);\n");
        assert_eq!(foreign_key_ddl(department), "");
    }

    #[test]
    fn lint_lines() {
        let table = Table::from_document(
            &Document::parse("{table: {pname: T, columns: [{pname: a}], checks: '<b> > 0'}}")
                .expect("parse"),
            None,
            None,
        )
        .expect("build table");
        let report = lint_report(&[table]);
        assert_eq!(
            render_lint(&report, 1),
            "error: T.columns[0] [missing_type] column has no type\n  \
             hint: set `type` or reference a domain\n\
             error: T.checks [unresolved_placeholder] placeholder <b> names no column\n  \
             hint: placeholders use the logical column name\n\
             1 table(s) checked: 2 error(s), 0 warning(s)\n"
        );
    }

    #[test]
    fn samples_lint_clean() {
        let report = lint_report(&sample_tables(&["department", "employee", "assignment"]));
        assert_eq!(
            render_lint(&report, 3),
            "3 table(s) checked: 0 error(s), 0 warning(s)\n"
        );
    }
}
