// SPDX-License-Identifier: MIT OR Apache-2.0
//! In-memory document elements.
//!
//! An [`Element`] is one already-validated node of a kinematic document:
//! a kind tag, typed attributes, an optional typed value and child
//! elements. Loaders read it through [`Element::get`], which reports
//! whether a value was present or the caller's default was used.
//!
//! On disk, documents are the RON encoding of this structure.

use framekit_graph::Pose;
use indexmap::IndexMap;
use serde::{Deserialize, Serialize};
use std::path::Path;
use std::sync::Arc;

/// Shared handle to a parsed element
pub type ElementPtr = Arc<Element>;

/// A typed attribute or element value
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum Value {
    /// Boolean
    Bool(bool),
    /// Integer
    Int(i64),
    /// Floating point
    Double(f64),
    /// Text
    String(String),
    /// 3D vector
    Vector3([f64; 3]),
    /// Color (RGBA)
    Color([f32; 4]),
    /// Pose as `[x, y, z, roll, pitch, yaw]`
    Pose([f64; 6]),
}

/// Conversion from a [`Value`] to a concrete type
pub trait FromValue: Sized {
    /// Convert, or `None` if the value has another type
    fn from_value(value: &Value) -> Option<Self>;
}

impl FromValue for bool {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Bool(b) => Some(*b),
            _ => None,
        }
    }
}

impl FromValue for i64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Int(i) => Some(*i),
            _ => None,
        }
    }
}

impl FromValue for f64 {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Double(d) => Some(*d),
            Value::Int(i) => Some(*i as f64),
            _ => None,
        }
    }
}

impl FromValue for String {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::String(s) => Some(s.clone()),
            _ => None,
        }
    }
}

impl FromValue for [f64; 3] {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Vector3(v) => Some(*v),
            _ => None,
        }
    }
}

impl FromValue for [f32; 4] {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Color(c) => Some(*c),
            _ => None,
        }
    }
}

impl FromValue for Pose {
    fn from_value(value: &Value) -> Option<Self> {
        match value {
            Value::Pose(p) => Some(Pose::from_array(*p)),
            _ => None,
        }
    }
}

/// A parsed document element
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct Element {
    /// Kind tag (`model`, `link`, `joint`, ...)
    pub kind: String,
    /// Attributes by name
    #[serde(default)]
    pub attributes: IndexMap<String, Value>,
    /// Element content
    #[serde(default)]
    pub value: Option<Value>,
    /// Child elements in document order
    #[serde(default)]
    pub children: Vec<ElementPtr>,
}

impl Element {
    /// Create an empty element of the given kind
    pub fn new(kind: impl Into<String>) -> Self {
        Self {
            kind: kind.into(),
            ..Default::default()
        }
    }

    /// Set an attribute
    pub fn with_attribute(mut self, key: impl Into<String>, value: Value) -> Self {
        self.attributes.insert(key.into(), value);
        self
    }

    /// Set the element content
    pub fn with_value(mut self, value: Value) -> Self {
        self.value = Some(value);
        self
    }

    /// Append a child element
    pub fn with_child(mut self, child: Element) -> Self {
        self.children.push(Arc::new(child));
        self
    }

    /// Wrap in a shared handle
    pub fn into_ptr(self) -> ElementPtr {
        Arc::new(self)
    }

    /// Get a raw attribute
    pub fn attribute(&self, key: &str) -> Option<&Value> {
        self.attributes.get(key)
    }

    /// Check for a child element with the given kind
    pub fn has_element(&self, kind: &str) -> bool {
        self.children.iter().any(|c| c.kind == kind)
    }

    /// First child element with the given kind
    pub fn first_element(&self, kind: &str) -> Option<&ElementPtr> {
        self.children.iter().find(|c| c.kind == kind)
    }

    /// All child elements with the given kind
    pub fn elements<'a>(&'a self, kind: &'a str) -> impl Iterator<Item = &'a ElementPtr> + 'a {
        self.children.iter().filter(move |c| c.kind == kind)
    }

    /// Read a typed value.
    ///
    /// Looks at the attribute `key` first, then at the content of the first
    /// child element of kind `key`. Returns the value and `true` when found,
    /// otherwise `default` and `false`.
    pub fn get<T: FromValue>(&self, key: &str, default: T) -> (T, bool) {
        let raw = self
            .attributes
            .get(key)
            .or_else(|| self.first_element(key).and_then(|c| c.value.as_ref()));

        match raw {
            Some(value) => match T::from_value(value) {
                Some(converted) => (converted, true),
                None => {
                    tracing::warn!(
                        "Value of '{}' on <{}> has unexpected type {:?}",
                        key,
                        self.kind,
                        value
                    );
                    (default, false)
                }
            },
            None => (default, false),
        }
    }

    /// Serialize to RON format
    pub fn to_ron(&self) -> Result<String, ron::Error> {
        ron::ser::to_string_pretty(self, ron::ser::PrettyConfig::default())
    }

    /// Deserialize from RON format
    pub fn from_ron(s: &str) -> Result<Self, ron::error::SpannedError> {
        ron::from_str(s)
    }

    /// Load a document from file
    pub fn load(path: &Path) -> std::io::Result<Self> {
        let contents = std::fs::read_to_string(path)?;
        Self::from_ron(&contents).map_err(|e| {
            std::io::Error::new(std::io::ErrorKind::InvalidData, e.to_string())
        })
    }
}
