use std::collections::BTreeSet;

use serde::Serialize;

use crate::error::{Error, Result};
use crate::reference::TableTarget;
use crate::table::Table;

/// Severity level for validation issues.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum IssueSeverity {
    Error,
    Warning,
}

/// Structured validation issue with location and hint.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationIssue {
    pub severity: IssueSeverity,
    pub code: String,
    pub path: String,
    pub message: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hint: Option<String>,
}

impl ValidationIssue {
    pub fn new(
        severity: IssueSeverity,
        code: impl Into<String>,
        path: impl Into<String>,
        message: impl Into<String>,
        hint: Option<String>,
    ) -> Self {
        Self {
            severity,
            code: code.into(),
            path: path.into(),
            message: message.into(),
            hint,
        }
    }
}

/// Aggregated validation report with errors and warnings.
#[derive(Debug, Default, Clone, PartialEq, Eq, Serialize)]
pub struct ValidationReport {
    pub errors: Vec<ValidationIssue>,
    pub warnings: Vec<ValidationIssue>,
}

impl ValidationReport {
    /// Returns true when there are no errors.
    pub fn is_ok(&self) -> bool {
        self.errors.is_empty()
    }

    pub fn push(&mut self, issue: ValidationIssue) {
        match issue.severity {
            IssueSeverity::Error => self.errors.push(issue),
            IssueSeverity::Warning => self.warnings.push(issue),
        }
    }

    /// Merge another report into this one.
    pub fn merge(&mut self, other: ValidationReport) {
        self.errors.extend(other.errors);
        self.warnings.extend(other.warnings);
    }

    /// Turn a report with errors into [`Error::InvalidSchema`].
    pub fn into_result(self) -> Result<Self> {
        match self.errors.first() {
            None => Ok(self),
            Some(first) => Err(Error::InvalidSchema(format!(
                "{} ({}): {}{}",
                first.path,
                first.code,
                first.message,
                match self.errors.len() {
                    1 => String::new(),
                    count => format!(" (and {} more)", count - 1),
                }
            ))),
        }
    }
}

/// Validate a table model before DDL is generated from it.
///
/// This checks:
/// - table and column physical names exist and are unique
/// - every column has a type after domain merging
/// - declared domains resolve
/// - table check placeholders name existing columns
/// - column references and table-level references match up
pub fn validate_table(table: &Table) -> ValidationReport {
    let mut report = ValidationReport::default();
    let table_path = table
        .physical_name()
        .or(table.logical_name())
        .unwrap_or("table")
        .to_string();

    if table.physical_name().is_none_or(str::is_empty) {
        report.push(ValidationIssue::new(
            IssueSeverity::Error,
            "missing_physical_name",
            &table_path,
            "table has no physical name",
            Some("set `pname` or load the table from a file".to_string()),
        ));
    }

    let mut seen = BTreeSet::new();
    for (idx, column) in table.columns().iter().enumerate() {
        let column_path = format!(
            "{table_path}.columns[{idx}]{}",
            column
                .logical_name()
                .map(|name| format!(" ({name})"))
                .unwrap_or_default()
        );

        match column.physical_name() {
            Some(name) if !name.is_empty() => {
                if !seen.insert(name) {
                    report.push(ValidationIssue::new(
                        IssueSeverity::Error,
                        "duplicate_column",
                        &column_path,
                        format!("duplicate column name: {table_path}.{name}"),
                        None,
                    ));
                }
            }
            _ => report.push(ValidationIssue::new(
                IssueSeverity::Error,
                "missing_physical_name",
                &column_path,
                "column has neither `name` nor `pname`",
                None,
            )),
        }

        if column.data_type().is_none() {
            report.push(ValidationIssue::new(
                IssueSeverity::Error,
                "missing_type",
                &column_path,
                "column has no type",
                Some("set `type` or reference a domain".to_string()),
            ));
        }

        if let Some(domain) = column.domain() {
            if column.applied_domain() != Some(domain) {
                report.push(ValidationIssue::new(
                    IssueSeverity::Warning,
                    "unknown_domain",
                    &column_path,
                    format!("domain not found: {domain}"),
                    None,
                ));
            }
        }

        for reference in column.references() {
            match reference.target() {
                None => report.push(ValidationIssue::new(
                    IssueSeverity::Error,
                    "missing_reference_target",
                    &column_path,
                    "column reference has no `table`",
                    None,
                )),
                Some(target) if !targets_declared(table, target) => {
                    report.push(ValidationIssue::new(
                        IssueSeverity::Warning,
                        "dangling_reference",
                        &column_path,
                        format!("reference target {target} is not in the table `refers` list"),
                        None,
                    ))
                }
                Some(_) => {}
            }
        }
    }

    for path in table.unresolved_check_paths() {
        report.push(ValidationIssue::new(
            IssueSeverity::Error,
            "unresolved_placeholder",
            format!("{table_path}.checks"),
            format!("placeholder <{path}> names no column"),
            Some("placeholders use the logical column name".to_string()),
        ));
    }

    if let Some(keys) = table.foreign_keys() {
        for key in keys.iter().filter(|key| key.references.is_empty()) {
            report.push(ValidationIssue::new(
                IssueSeverity::Warning,
                "unused_table_reference",
                format!("{table_path}.refers"),
                format!("no column refers to {}", key.target.logical_name),
                None,
            ));
        }
    }

    report
}

fn targets_declared(table: &Table, target: &TableTarget) -> bool {
    table.table_references().is_some_and(|references| {
        references.iter().enumerate().any(|(position, reference)| {
            target.designates(position, &reference.logical_name, &reference.physical_name)
        })
    })
}
