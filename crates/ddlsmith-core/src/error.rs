use thiserror::Error;

use crate::document::shape_name;

/// Core error type shared across ddlsmith crates.
#[derive(Debug, Error)]
pub enum Error {
    /// A node had the wrong shape, e.g. a sequence where a mapping belongs.
    #[error("shape error: `{path}` must be {expected}, found {found}")]
    Shape {
        path: String,
        expected: &'static str,
        found: &'static str,
    },
    /// A structurally required field is absent.
    #[error("missing field: `{field}` does not exist in `{path}`")]
    MissingField { field: String, path: String },
    /// The document could not be parsed as YAML.
    #[error("yaml error: {0}")]
    Yaml(#[from] serde_yaml::Error),
    /// The document could not be read.
    #[error("io error: {0}")]
    Io(#[from] std::io::Error),
    /// The model violates a rule enforced in strict mode.
    #[error("invalid schema: {0}")]
    InvalidSchema(String),
}

impl Error {
    pub(crate) fn shape(path: &str, expected: &'static str, value: &serde_yaml::Value) -> Self {
        Self::Shape {
            path: path.to_string(),
            expected,
            found: shape_name(value),
        }
    }

    pub(crate) fn missing(field: &str, path: &str) -> Self {
        Self::MissingField {
            field: field.to_string(),
            path: path.to_string(),
        }
    }
}

/// Convenience alias for results returned by ddlsmith crates.
pub type Result<T> = std::result::Result<T, Error>;
