//! Pass-through values of a lockfile entry.
//!
//! yarn reads every scalar in `yarn.lock` as a string, so `1.10` and `1e3`
//! must come back out exactly as written. Values are kept as a string-leaf
//! tree and never go through a typed YAML value.
//!
//! A YAML deserializer only hands out a scalar's source text when asked for a
//! string, so the expected layout of each value is chosen up front from the
//! field name (see [`Shape`]). Unknown fields fall back to self-describing
//! parsing.

use serde::de::{self, DeserializeSeed, Deserializer, MapAccess, Visitor};
use serde::ser::{SerializeMap, Serializer};
use serde::Serialize;
use std::fmt;

/// A pass-through value: a scalar's text or a nested mapping.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Node {
    Str(String),
    Map(Fields),
}

impl Node {
    #[must_use]
    pub fn as_str(&self) -> Option<&str> {
        match self {
            Self::Str(text) => Some(text),
            Self::Map(_) => None,
        }
    }

    #[must_use]
    pub fn as_map(&self) -> Option<&Fields> {
        match self {
            Self::Str(_) => None,
            Self::Map(fields) => Some(fields),
        }
    }
}

impl From<&str> for Node {
    fn from(text: &str) -> Self {
        Self::Str(text.to_string())
    }
}

impl From<String> for Node {
    fn from(text: String) -> Self {
        Self::Str(text)
    }
}

/// Named values in their original order.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Fields(Vec<(String, Node)>);

impl Fields {
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    #[must_use]
    pub fn get(&self, name: &str) -> Option<&Node> {
        self.0.iter().find(|(k, _)| k == name).map(|(_, v)| v)
    }

    #[must_use]
    pub fn contains_key(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Replace an existing value in place or append a new one.
    pub fn insert(&mut self, name: impl Into<String>, value: impl Into<Node>) {
        let name = name.into();
        let value = value.into();
        match self.0.iter_mut().find(|(k, _)| *k == name) {
            Some((_, slot)) => *slot = value,
            None => self.0.push((name, value)),
        }
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.0.iter().map(|(k, _)| k.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Node)> {
        self.0.iter().map(|(k, v)| (k.as_str(), v))
    }

    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl Serialize for Node {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        match self {
            Self::Str(text) => serializer.serialize_str(text),
            Self::Map(fields) => fields.serialize(serializer),
        }
    }
}

impl Serialize for Fields {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.0.len()))?;
        for (name, value) in &self.0 {
            map.serialize_entry(name, value)?;
        }
        map.end()
    }
}

const SCALAR: Shape = Shape::Scalar;
const STRING_MAP: Shape = Shape::Map(&SCALAR);
const NESTED_MAP: Shape = Shape::Map(&STRING_MAP);

/// Expected layout of a value, used as a deserialization seed.
#[derive(Debug, Clone, Copy)]
pub(crate) enum Shape {
    /// A scalar, read as its source text.
    Scalar,
    /// A mapping whose values all have the inner shape.
    Map(&'static Shape),
    /// Whatever the document holds. Non-string scalars are re-rendered.
    Any,
}

impl Shape {
    /// Layout of `__metadata`.
    pub(crate) const METADATA: Shape = STRING_MAP;

    /// Layout of a named field inside a package entry.
    pub(crate) fn of_field(name: &str) -> Self {
        match name {
            "version" | "resolution" | "checksum" | "languageName" | "linkType"
            | "conditions" | "cacheKey" => SCALAR,
            "dependencies" | "peerDependencies" | "optionalDependencies" | "bin" => STRING_MAP,
            "dependenciesMeta" | "peerDependenciesMeta" => NESTED_MAP,
            _ => Self::Any,
        }
    }

    fn inner(self) -> Self {
        match self {
            Self::Map(inner) => *inner,
            other => other,
        }
    }
}

impl<'de> DeserializeSeed<'de> for Shape {
    type Value = Node;

    fn deserialize<D: Deserializer<'de>>(self, deserializer: D) -> Result<Node, D::Error> {
        match self {
            Self::Scalar => deserializer.deserialize_str(NodeVisitor(self)),
            Self::Map(_) => deserializer.deserialize_map(NodeVisitor(self)),
            Self::Any => deserializer.deserialize_any(NodeVisitor(self)),
        }
    }
}

struct NodeVisitor(Shape);

impl<'de> Visitor<'de> for NodeVisitor {
    type Value = Node;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self.0 {
            Shape::Scalar => f.write_str("a scalar"),
            Shape::Map(_) => f.write_str("a mapping"),
            Shape::Any => f.write_str("a scalar or a mapping"),
        }
    }

    fn visit_str<E: de::Error>(self, v: &str) -> Result<Node, E> {
        Ok(Node::Str(v.to_string()))
    }

    fn visit_string<E: de::Error>(self, v: String) -> Result<Node, E> {
        Ok(Node::Str(v))
    }

    fn visit_bool<E: de::Error>(self, v: bool) -> Result<Node, E> {
        Ok(Node::Str(v.to_string()))
    }

    fn visit_i64<E: de::Error>(self, v: i64) -> Result<Node, E> {
        Ok(Node::Str(v.to_string()))
    }

    fn visit_u64<E: de::Error>(self, v: u64) -> Result<Node, E> {
        Ok(Node::Str(v.to_string()))
    }

    fn visit_f64<E: de::Error>(self, v: f64) -> Result<Node, E> {
        Ok(Node::Str(v.to_string()))
    }

    fn visit_unit<E: de::Error>(self) -> Result<Node, E> {
        Ok(Node::Str(String::new()))
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Node, A::Error> {
        let inner = self.0.inner();
        let mut fields = Fields::new();
        while let Some(name) = map.next_key::<String>()? {
            let value = map.next_value_seed(inner)?;
            fields.insert(name, value);
        }
        Ok(Node::Map(fields))
    }
}
