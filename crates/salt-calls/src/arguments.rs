//! Ordered keyword arguments for a call.
//!
//! Salt maps keyword arguments onto the remote function's parameters, and the
//! order they were supplied in is kept all the way onto the wire.

use serde::ser::{Serialize, SerializeMap, Serializer};
use serde_json::Value;

/// Immutable, insertion-ordered keyword arguments.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Arguments {
    entries: Vec<(String, Value)>,
}

impl Arguments {
    pub fn builder() -> ArgumentsBuilder {
        ArgumentsBuilder::default()
    }

    pub fn get(&self, name: &str) -> Option<&Value> {
        self.entries
            .iter()
            .find(|(key, _)| key == name)
            .map(|(_, value)| value)
    }

    pub fn contains(&self, name: &str) -> bool {
        self.get(name).is_some()
    }

    /// Argument names in insertion order
    pub fn names(&self) -> impl Iterator<Item = &str> {
        self.entries.iter().map(|(key, _)| key.as_str())
    }

    pub fn iter(&self) -> impl Iterator<Item = (&str, &Value)> {
        self.entries.iter().map(|(key, value)| (key.as_str(), value))
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Serialize for Arguments {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        let mut map = serializer.serialize_map(Some(self.entries.len()))?;
        for (key, value) in &self.entries {
            map.serialize_entry(key, value)?;
        }
        map.end()
    }
}

/// Collects arguments while a call is being built.
#[derive(Debug, Default)]
pub struct ArgumentsBuilder {
    entries: Vec<(String, Value)>,
}

impl ArgumentsBuilder {
    /// Append an argument. Re-setting a name replaces its value in place.
    pub fn arg(mut self, name: &str, value: impl Into<Value>) -> Self {
        let value = value.into();
        match self.entries.iter_mut().find(|(key, _)| key == name) {
            Some(entry) => entry.1 = value,
            None => self.entries.push((name.to_string(), value)),
        }
        self
    }

    /// Append an argument only when a value is supplied.
    pub fn optional_arg<V: Into<Value>>(self, name: &str, value: Option<V>) -> Self {
        match value {
            Some(value) => self.arg(name, value),
            None => self,
        }
    }

    pub fn build(self) -> Arguments {
        Arguments {
            entries: self.entries,
        }
    }
}
