//! Component option maps and attribute harvesting.
//!
//! Component configuration arrives from two directions: programmatic options
//! passed at construction, and markup attributes harvested during fresh
//! instantiation. Attribute values are written as strings in markup, so they
//! are parsed as structured JSON values first and fall back to the raw string
//! when parsing fails (`count="3"` becomes a number, `title="hello"` stays a
//! string). Class-level default options layer underneath without overriding
//! anything explicitly provided.

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

/// An ordered string-keyed option map for a component instance.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Options(Map<String, Value>);

impl Options {
    /// Creates an empty option map.
    #[must_use]
    pub fn new() -> Self {
        Self::default()
    }

    /// Parses a markup attribute value: structured JSON first, raw string as
    /// fallback.
    #[must_use]
    pub fn parse_attribute(raw: &str) -> Value {
        serde_json::from_str(raw).unwrap_or_else(|_| Value::String(raw.to_string()))
    }

    /// Harvests markup attributes, without overriding options already set.
    pub fn apply_attributes<'a>(
        &mut self,
        attributes: impl IntoIterator<Item = (&'a str, &'a str)>,
    ) {
        for (name, raw) in attributes {
            if !self.0.contains_key(name) {
                self.0.insert(name.to_string(), Self::parse_attribute(raw));
            }
        }
    }

    /// Layers class defaults underneath: keys not present are filled in from
    /// `defaults`, explicitly set keys win.
    pub fn merge_defaults(&mut self, defaults: &Options) {
        for (key, value) in &defaults.0 {
            if !self.0.contains_key(key) {
                self.0.insert(key.clone(), value.clone());
            }
        }
    }

    /// Looks up an option value.
    #[must_use]
    pub fn get(&self, key: &str) -> Option<&Value> {
        self.0.get(key)
    }

    /// Sets an option value.
    pub fn insert(&mut self, key: impl Into<String>, value: Value) {
        self.0.insert(key.into(), value);
    }

    /// Whether an option is set.
    #[must_use]
    pub fn contains(&self, key: &str) -> bool {
        self.0.contains_key(key)
    }

    /// Number of options.
    #[must_use]
    pub fn len(&self) -> usize {
        self.0.len()
    }

    /// Whether the map is empty.
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterates over option entries.
    pub fn iter(&self) -> impl Iterator<Item = (&String, &Value)> {
        self.0.iter()
    }
}

impl FromIterator<(String, Value)> for Options {
    fn from_iter<T: IntoIterator<Item = (String, Value)>>(iter: T) -> Self {
        Self(iter.into_iter().collect())
    }
}
