//! Loading of schema-description documents and field access on the loaded tree.

use std::path::{Path, PathBuf};

use serde_yaml::Value;

use crate::error::{Error, Result};

/// A fully-loaded schema-description document.
#[derive(Debug, Clone)]
pub struct Document {
    root: Value,
    source: Option<PathBuf>,
}

impl Document {
    /// Parse a document from YAML text.
    pub fn parse(text: &str) -> Result<Self> {
        let root: Value = serde_yaml::from_str(text)?;
        Ok(Self { root, source: None })
    }

    /// Read and parse a document from disk, remembering its path.
    pub fn load(path: &Path) -> Result<Self> {
        let text = std::fs::read_to_string(path)?;
        let mut document = Self::parse(&text)?;
        document.source = Some(path.to_path_buf());
        Ok(document)
    }

    pub fn source(&self) -> Option<&Path> {
        self.source.as_deref()
    }

    pub fn root(&self) -> Node<'_> {
        Node::new(&self.root, "document")
    }
}

/// A borrowed node of the document tree carrying its dotted path for error reporting.
#[derive(Debug, Clone)]
pub struct Node<'a> {
    value: &'a Value,
    path: String,
}

impl<'a> Node<'a> {
    pub fn new(value: &'a Value, path: impl Into<String>) -> Self {
        Self {
            value,
            path: path.into(),
        }
    }

    pub fn value(&self) -> &'a Value {
        self.value
    }

    pub fn path(&self) -> &str {
        &self.path
    }

    /// Return the value stored under `field`, or `None` when it is absent or null.
    ///
    /// Only mappings are addressable by field name; any other shape is a
    /// [`Error::Shape`].
    pub fn extract(&self, field: &str) -> Result<Option<Node<'a>>> {
        let mapping = match self.value {
            Value::Mapping(mapping) => mapping,
            Value::Tagged(tagged) => {
                return Node::new(&tagged.value, self.path.clone()).extract(field);
            }
            other => return Err(Error::shape(&self.path, "a mapping", other)),
        };

        Ok(mapping
            .get(field)
            .filter(|value| !value.is_null())
            .map(|value| Node::new(value, format!("{}.{field}", self.path))))
    }

    /// Like [`Node::extract`], but an absent field is a [`Error::MissingField`].
    pub fn require(&self, field: &str) -> Result<Node<'a>> {
        self.extract(field)?
            .ok_or_else(|| Error::missing(field, &self.path))
    }

    /// Key/value pairs of a mapping node in document order.
    ///
    /// Keys are rendered as text, so `1: x` and `"1": x` are the same entry.
    pub fn entries(&self) -> Result<Vec<(String, Node<'a>)>> {
        let mapping = match self.value {
            Value::Mapping(mapping) => mapping,
            Value::Tagged(tagged) => return Node::new(&tagged.value, self.path.clone()).entries(),
            other => return Err(Error::shape(&self.path, "a mapping", other)),
        };

        Ok(mapping
            .iter()
            .filter_map(|(key, value)| {
                let key = scalar_text(key)?;
                let path = format!("{}.{key}", self.path);
                Some((key, Node::new(value, path)))
            })
            .collect())
    }

    /// Normalize a single value or a sequence into an ordered list of nodes.
    pub fn items(&self) -> Vec<Node<'a>> {
        match self.value {
            Value::Sequence(items) => items
                .iter()
                .enumerate()
                .map(|(idx, value)| Node::new(value, format!("{}[{idx}]", self.path)))
                .collect(),
            _ => vec![self.clone()],
        }
    }

    /// The node as scalar text; a collection or null is a [`Error::Shape`].
    pub fn text(&self) -> Result<String> {
        scalar_text(self.value).ok_or_else(|| Error::shape(&self.path, "a scalar", self.value))
    }
}

/// Render a scalar value as the text that is spliced into SQL.
pub fn scalar_text(value: &Value) -> Option<String> {
    match value {
        Value::Null => None,
        Value::Bool(flag) => Some(flag.to_string()),
        Value::Number(number) => Some(number.to_string()),
        Value::String(text) => Some(text.clone()),
        Value::Tagged(tagged) => scalar_text(&tagged.value),
        Value::Sequence(_) | Value::Mapping(_) => None,
    }
}

/// Read an integer rank from a number or a numeric string.
pub fn integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(number) => number.as_i64(),
        Value::String(text) => text.trim().parse().ok(),
        Value::Tagged(tagged) => integer(&tagged.value),
        _ => None,
    }
}

/// Everything except `null` and `false` counts as set.
pub fn is_truthy(value: &Value) -> bool {
    !matches!(value, Value::Null | Value::Bool(false))
}

pub(crate) fn shape_name(value: &Value) -> &'static str {
    match value {
        Value::Null => "null",
        Value::Bool(_) => "a boolean",
        Value::Number(_) => "a number",
        Value::String(_) => "a string",
        Value::Sequence(_) => "a sequence",
        Value::Mapping(_) => "a mapping",
        Value::Tagged(_) => "a tagged value",
    }
}
