use serde_yaml::{Mapping, Value};

use crate::document::{Node, scalar_text};
use crate::error::{Error, Result};

/// An immutable attribute set for a column or a domain template.
///
/// Attribute sets are combined with [`Attributes::layered`], which is the
/// only way a domain template reaches a column.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Attributes {
    values: Mapping,
}

impl Attributes {
    /// Capture the attributes of a mapping node.
    pub fn from_node(node: &Node<'_>) -> Result<Self> {
        match node.value() {
            Value::Mapping(values) => Ok(Self {
                values: values.clone(),
            }),
            Value::Tagged(tagged) => Self::from_node(&Node::new(&tagged.value, node.path())),
            other => Err(Error::shape(node.path(), "a mapping", other)),
        }
    }

    /// Return a new set holding `base` with every key of `overrides` on top.
    ///
    /// Keys keep the position they first appeared at. Values from `overrides`
    /// win unless they are null, which leaves the base value in place.
    pub fn layered(base: &Attributes, overrides: &Attributes) -> Attributes {
        let mut values = base.values.clone();
        for (key, value) in &overrides.values {
            if value.is_null() && values.contains_key(key) {
                continue;
            }
            values.insert(key.clone(), value.clone());
        }
        Attributes { values }
    }

    /// True when the key is present, even with a null value.
    pub fn contains(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    /// The value under `key`, treating null as absent.
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.values.get(key).filter(|value| !value.is_null())
    }

    pub fn text(&self, key: &str) -> Option<String> {
        self.get(key).and_then(scalar_text)
    }

    pub fn node<'a>(&'a self, key: &str, parent: &str) -> Option<Node<'a>> {
        self.get(key)
            .map(|value| Node::new(value, format!("{parent}.{key}")))
    }

    /// Keys with a textual form, in attribute order.
    pub fn keys(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.values
            .iter()
            .filter_map(|(key, value)| key.as_str().map(|key| (key, value)))
    }
}
