//! Options file loading

use std::path::{Path, PathBuf};
use std::sync::Arc;

use tracing::{debug, info};

use crate::error::{ConfigError, Result};
use crate::value::Value;

use super::{accept, Configuration, Entry, ValueSource};

/// Candidate file names for an options file, in search order
pub fn options_file_names(base: &str) -> Vec<String> {
    ["yml", "yaml", "toml", "json"]
        .iter()
        .map(|ext| format!("{}.{}", base, ext))
        .collect()
}

/// Read a flat mapping of option keys to values.
///
/// The format follows the extension: `.toml`, `.json`, anything else is YAML.
pub fn read_options_file(path: &Path) -> Result<serde_json::Map<String, serde_json::Value>> {
    let extension = path.extension().and_then(|e| e.to_str()).unwrap_or_default();
    debug!(path = %path.display(), extension, "reading options file");

    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    if content.trim().is_empty() {
        return Ok(serde_json::Map::new());
    }

    let parsed: serde_json::Value = match extension {
        "toml" => toml::from_str(&content)?,
        "json" => serde_json::from_str(&content)?,
        _ => serde_yaml::from_str(&content)?,
    };

    match parsed {
        serde_json::Value::Object(map) => Ok(map),
        serde_json::Value::Null => Ok(serde_json::Map::new()),
        other => Err(ConfigError::OptionsFile {
            path: path.to_path_buf(),
            message: format!("expected a mapping of option keys, found {}", json_kind(&other)),
        }),
    }
}

/// Find an options file in a directory or its parents.
///
/// At each level the search checks `<dir>/<name>` then `<dir>/lanes/<name>`
/// for every candidate name. The first match wins.
pub fn find_options_file(start_dir: &Path, base: &str) -> Option<PathBuf> {
    debug!(start_dir = %start_dir.display(), base, "searching for options file");
    let names = options_file_names(base);
    let mut current = start_dir.to_path_buf();

    loop {
        for name in &names {
            let path = current.join(name);
            if path.is_file() {
                return Some(path);
            }

            let nested = current.join("lanes").join(name);
            if nested.is_file() {
                return Some(nested);
            }
        }

        if !current.pop() {
            break;
        }
    }

    debug!(base, "no options file found");
    None
}

impl Configuration {
    /// Merge values from an options file; explicit inputs take precedence.
    ///
    /// Returns how many values were taken from the file.
    pub fn load_options_file(&mut self, path: &Path) -> Result<usize> {
        let values = read_options_file(path)?;
        info!(path = %path.display(), options = values.len(), "loading options file");

        if let Some(unknown) = values.keys().find(|k| !self.index.contains_key(k.as_str())) {
            return Err(ConfigError::OptionsFile {
                path: path.to_path_buf(),
                message: format!(
                    "Could not find option '{}' in the list of available options: {}",
                    unknown,
                    self.all_keys().join(", ")
                ),
            });
        }

        if let Some(key) = values.iter().find(|(_, json)| has_null_element(json)).map(|(k, _)| k) {
            return Err(ConfigError::OptionsFile {
                path: path.to_path_buf(),
                message: format!("option '{}' contains a null list element", key),
            });
        }

        self.transaction(|config| {
            let items = Arc::clone(&config.items);
            let mut loaded = 0;
            for (key, json) in values {
                if config.is_explicit(&key) {
                    debug!(key = %key, "option given explicitly, ignoring options file value");
                    continue;
                }
                let Some(raw) = Value::from_json(json) else {
                    continue;
                };

                let value = accept(&items[config.index[&key]], raw)?;
                debug!(key = %key, source = %ValueSource::OptionsFile, "value resolved");
                config.values.insert(
                    key,
                    Entry {
                        value: Some(value),
                        source: ValueSource::OptionsFile,
                    },
                );
                loaded += 1;
            }
            Ok(loaded)
        })
    }

    /// Find `base` options file from `dir` upwards and load it when present
    pub fn load_options_file_from_dir(&mut self, dir: &Path, base: &str) -> Result<Option<PathBuf>> {
        match find_options_file(dir, base) {
            Some(path) => {
                self.load_options_file(&path)?;
                Ok(Some(path))
            }
            None => Ok(None),
        }
    }
}

/// `Value` has no null element, so a list holding one would silently shrink
fn has_null_element(json: &serde_json::Value) -> bool {
    match json {
        serde_json::Value::Array(items) => items
            .iter()
            .any(|item| item.is_null() || has_null_element(item)),
        serde_json::Value::Object(map) => map.values().any(has_null_element),
        _ => false,
    }
}

fn json_kind(value: &serde_json::Value) -> &'static str {
    match value {
        serde_json::Value::Null => "null",
        serde_json::Value::Bool(_) => "a boolean",
        serde_json::Value::Number(_) => "a number",
        serde_json::Value::String(_) => "a string",
        serde_json::Value::Array(_) => "a list",
        serde_json::Value::Object(_) => "a mapping",
    }
}
