use std::fmt;

use serde_yaml::Value;

use crate::attributes::Attributes;
use crate::document::{Node, integer, scalar_text};
use crate::error::Result;

/// The table a column reference points at.
///
/// Targets are usually the position of an entry in the table-level `refers`
/// list; a name is matched against that list's logical or physical names.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TableTarget {
    Position(i64),
    Name(String),
}

impl TableTarget {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Number(number) => match number.as_i64() {
                Some(position) => Some(Self::Position(position)),
                None => Some(Self::Name(number.to_string())),
            },
            other => scalar_text(other).map(Self::Name),
        }
    }

    /// True when this target designates the table-level reference at
    /// `position`, known by `logical_name` and `physical_name`.
    pub fn designates(&self, position: usize, logical_name: &str, physical_name: &str) -> bool {
        match self {
            Self::Position(value) => usize::try_from(*value).is_ok_and(|value| value == position),
            Self::Name(name) => name == logical_name || name == physical_name,
        }
    }
}

impl fmt::Display for TableTarget {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::Position(position) => write!(f, "#{position}"),
            Self::Name(name) => f.write_str(name),
        }
    }
}

/// One foreign-key link from a column to a column of another table.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Reference {
    order: i64,
    target: Option<TableTarget>,
    local_column: String,
    remote_column: String,
}

impl Reference {
    /// Build a reference from its raw mapping.
    ///
    /// `order` defaults to 0 and `column` to the local column; an absent
    /// `table` is carried as `None`.
    pub fn from_node(node: &Node<'_>, local_column: &str) -> Result<Self> {
        let attributes = Attributes::from_node(node)?;
        let order = attributes.get("order").and_then(integer).unwrap_or(0);
        let target = attributes.get("table").and_then(TableTarget::from_value);
        let remote_column = attributes
            .text("column")
            .unwrap_or_else(|| local_column.to_string());

        Ok(Self {
            order,
            target,
            local_column: local_column.to_string(),
            remote_column,
        })
    }

    pub fn order(&self) -> i64 {
        self.order
    }

    pub fn target(&self) -> Option<&TableTarget> {
        self.target.as_ref()
    }

    pub fn local_column(&self) -> &str {
        &self.local_column
    }

    pub fn remote_column(&self) -> &str {
        &self.remote_column
    }
}
