//! Raw input values handed to a configuration

use std::collections::BTreeMap;

use crate::value::Value;

/// Explicit values by option key, as parsed from the command line or code.
///
/// A key mapped to `None` is an explicit nil.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Inputs {
    values: BTreeMap<String, Option<Value>>,
}

impl Inputs {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, key: impl Into<String>, value: impl Into<Value>) -> Self {
        self.values.insert(key.into(), Some(value.into()));
        self
    }

    pub fn with_nil(mut self, key: impl Into<String>) -> Self {
        self.values.insert(key.into(), None);
        self
    }

    pub fn insert(&mut self, key: impl Into<String>, value: Option<Value>) {
        self.values.insert(key.into(), value);
    }

    /// Build from a JSON object, `null` members become explicit nils
    pub fn from_json(object: serde_json::Map<String, serde_json::Value>) -> Self {
        Self {
            values: object
                .into_iter()
                .map(|(k, v)| (k, Value::from_json(v)))
                .collect(),
        }
    }

    /// Parse `key:value` pairs as typed on a command line
    pub fn parse_pairs<I, S>(pairs: I) -> Result<Self, String>
    where
        I: IntoIterator<Item = S>,
        S: AsRef<str>,
    {
        let mut inputs = Self::new();
        for pair in pairs {
            let pair = pair.as_ref();
            let (key, value) = pair
                .split_once(':')
                .ok_or_else(|| format!("Expected key:value, got '{}'", pair))?;
            inputs.insert(key.trim(), Some(Value::from(value)));
        }
        Ok(inputs)
    }

    pub fn get(&self, key: &str) -> Option<&Option<Value>> {
        self.values.get(key)
    }

    pub fn contains_key(&self, key: &str) -> bool {
        self.values.contains_key(key)
    }

    pub fn keys(&self) -> impl Iterator<Item = &str> {
        self.values.keys().map(String::as_str)
    }

    pub fn len(&self) -> usize {
        self.values.len()
    }

    pub fn is_empty(&self) -> bool {
        self.values.is_empty()
    }
}

impl<K: Into<String>, V: Into<Value>> FromIterator<(K, V)> for Inputs {
    fn from_iter<T: IntoIterator<Item = (K, V)>>(iter: T) -> Self {
        Self {
            values: iter
                .into_iter()
                .map(|(k, v)| (k.into(), Some(v.into())))
                .collect(),
        }
    }
}
