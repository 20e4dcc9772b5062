//! Best-effort conversion of raw values toward an option's type
//!
//! Coercion never fails. A value that matches no rule is returned as is and
//! left for [`ConfigItem::validate`] to accept or reject.

use std::collections::BTreeMap;

use crate::item::{ConfigItem, DataType};
use crate::value::{format_float, Value};

const TRUE_WORDS: [&str; 4] = ["YES", "yes", "true", "TRUE"];
const FALSE_WORDS: [&str; 4] = ["NO", "no", "false", "FALSE"];

impl ConfigItem {
    /// Convert a raw value toward the effective data type
    pub fn coerce(&self, value: Value) -> Value {
        if self.allow_shell_conversion() {
            return shell_convert(value);
        }

        match (self.data_type(), value) {
            (Some(DataType::Array), Value::String(s)) => split_list(&s),
            (Some(DataType::Integer), Value::String(s)) => match s.parse::<i64>() {
                Ok(i) if i.to_string() == s => Value::Integer(i),
                _ => Value::String(s),
            },
            (Some(DataType::Float), Value::String(s)) => match s.parse::<f64>() {
                Ok(f) if f.is_finite() && format_float(f) == s => Value::Float(f),
                _ => Value::String(s),
            },
            (Some(DataType::Map), Value::String(s)) => {
                parse_json_object(&s).unwrap_or(Value::String(s))
            }
            (
                Some(
                    DataType::String
                    | DataType::Array
                    | DataType::Integer
                    | DataType::Float
                    | DataType::Map,
                ),
                value,
            ) => value,
            (_, Value::String(s)) => match boolean_word(&s) {
                Some(b) => Value::Bool(b),
                None => Value::String(s),
            },
            (_, value) => value,
        }
    }
}

/// Split on commas the way a command line list is written.
///
/// Trailing empty fields are dropped, so `""` becomes an empty list.
fn split_list(s: &str) -> Value {
    let mut parts: Vec<&str> = s.split(',').collect();
    while parts.last().is_some_and(|p| p.is_empty()) {
        parts.pop();
    }
    Value::Array(parts.into_iter().map(Value::from).collect())
}

fn parse_json_object(s: &str) -> Option<Value> {
    match serde_json::from_str::<serde_json::Value>(s) {
        Ok(json @ serde_json::Value::Object(_)) => Value::from_json(json),
        _ => None,
    }
}

fn boolean_word(s: &str) -> Option<bool> {
    if TRUE_WORDS.contains(&s) {
        Some(true)
    } else if FALSE_WORDS.contains(&s) {
        Some(false)
    } else {
        None
    }
}

fn shell_convert(value: Value) -> Value {
    let joined = match &value {
        Value::Array(items) => {
            let words: Vec<String> = items.iter().map(|v| v.to_string()).collect();
            shlex::try_join(words.iter().map(String::as_str)).ok()
        }
        Value::Map(map) => shell_assignments(map),
        _ => None,
    };
    joined.map(Value::String).unwrap_or(value)
}

fn shell_assignments(map: &BTreeMap<String, Value>) -> Option<String> {
    let mut pairs = Vec::with_capacity(map.len());
    for (k, v) in map {
        let key = shlex::try_quote(k).ok()?;
        let value = v.to_string();
        let value = shlex::try_quote(&value).ok()?;
        pairs.push(format!("{}={}", key, value));
    }
    Some(pairs.join(" "))
}
