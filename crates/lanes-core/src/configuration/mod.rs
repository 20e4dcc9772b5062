//! Resolved option values for one invocation
//!
//! A [`Configuration`] is built from a declared list of [`ConfigItem`]s and
//! the explicit [`Inputs`]. Every declared key is resolved eagerly through
//! the chain explicit value, environment variable, dynamic default, static
//! default. Required options left without a value are asked for lazily by
//! [`Configuration::fetch`] when someone is at the terminal.

mod inputs;
mod options_file;

pub use inputs::Inputs;
pub use options_file::{find_options_file, options_file_names, read_options_file};

use std::collections::{HashMap, HashSet};
use std::fmt;
use std::sync::Arc;

use tracing::{debug, instrument, warn};

use crate::env::{EnvSource, Interactivity, ProcessEnv};
use crate::error::{ConfigError, Result};
use crate::item::{ConfigItem, ConflictResolution, DataType, REDACTED};
use crate::prompt::{NoPrompter, Prompter};
use crate::report::Reporter;
use crate::value::Value;

/// Where a stored value came from
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum ValueSource {
    /// Passed in the inputs
    Explicit,
    /// Read from an options file
    OptionsFile,
    /// Read from the option's environment variable
    Environment,
    /// Computed by the option's default provider
    DynamicDefault,
    /// The option's static default
    Default,
    /// Typed in at the prompt
    Prompt,
    /// Injected later through [`Configuration::set`]
    Assigned,
}

impl ValueSource {
    /// Whether the value was deliberately chosen rather than defaulted
    pub fn is_explicit(&self) -> bool {
        matches!(self, Self::Explicit | Self::OptionsFile | Self::Assigned)
    }

    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Explicit => "explicit",
            Self::OptionsFile => "options_file",
            Self::Environment => "environment",
            Self::DynamicDefault => "dynamic_default",
            Self::Default => "default",
            Self::Prompt => "prompt",
            Self::Assigned => "assigned",
        }
    }
}

impl fmt::Display for ValueSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Collaborators used while resolving values
#[derive(Clone)]
pub struct ResolutionContext {
    pub env: Arc<dyn EnvSource>,
    pub prompter: Arc<dyn Prompter>,
    pub interactivity: Interactivity,
}

impl ResolutionContext {
    /// Process environment, no prompting
    pub fn non_interactive() -> Self {
        Self {
            env: Arc::new(ProcessEnv),
            prompter: Arc::new(NoPrompter),
            interactivity: Interactivity::NonInteractive,
        }
    }

    /// Process environment with the given prompter, interactive unless on CI
    /// or detached from a terminal
    pub fn detect(prompter: Arc<dyn Prompter>) -> Self {
        let env: Arc<dyn EnvSource> = Arc::new(ProcessEnv);
        let interactivity = Interactivity::detect(env.as_ref());
        Self {
            env,
            prompter,
            interactivity,
        }
    }
}

impl Default for ResolutionContext {
    fn default() -> Self {
        Self::non_interactive()
    }
}

impl fmt::Debug for ResolutionContext {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ResolutionContext")
            .field("interactivity", &self.interactivity)
            .finish_non_exhaustive()
    }
}

#[derive(Debug, Clone)]
struct Entry {
    value: Option<Value>,
    source: ValueSource,
}

/// Validated key/value store for one declared option list
pub struct Configuration {
    items: Arc<[ConfigItem]>,
    index: HashMap<String, usize>,
    values: HashMap<String, Entry>,
    context: ResolutionContext,
}

impl Configuration {
    /// Resolve `inputs` against `items` using the process environment, without prompting
    pub fn create(items: impl Into<Arc<[ConfigItem]>>, inputs: Inputs) -> Result<Self> {
        Self::builder(items).inputs(inputs).build()
    }

    pub fn builder(items: impl Into<Arc<[ConfigItem]>>) -> ConfigurationBuilder {
        ConfigurationBuilder {
            items: items.into(),
            inputs: Inputs::new(),
            context: ResolutionContext::default(),
        }
    }

    /// Declared options in declaration order
    pub fn items(&self) -> &[ConfigItem] {
        &self.items
    }

    pub fn item(&self, key: &str) -> Option<&ConfigItem> {
        self.index.get(key).map(|&i| &self.items[i])
    }

    pub fn all_keys(&self) -> Vec<&str> {
        self.items.iter().map(ConfigItem::key).collect()
    }

    pub fn interactivity(&self) -> Interactivity {
        self.context.interactivity
    }

    /// Where the current value of `key` came from, `None` when unset
    pub fn source(&self, key: &str) -> Option<ValueSource> {
        self.values.get(key).map(|e| e.source)
    }

    /// Whether `key` holds a deliberately chosen, non-nil value
    pub fn is_explicit(&self, key: &str) -> bool {
        self.values
            .get(key)
            .is_some_and(|e| e.source.is_explicit() && e.value.is_some())
    }

    /// Current value without prompting.
    ///
    /// Fails when a required option has no value.
    pub fn get(&self, key: &str) -> Result<Option<&Value>> {
        let item = self.item_or_err(key)?;
        match self.values.get(key).and_then(|e| e.value.as_ref()) {
            Some(value) => Ok(Some(value)),
            None if item.optional() => Ok(None),
            None => Err(ConfigError::MissingRequiredValue {
                key: key.to_string(),
                description: item.description().unwrap_or_default().to_string(),
            }),
        }
    }

    /// Current value, asking for required options that are still unset
    /// when running interactively.
    pub fn fetch(&mut self, key: &str) -> Result<Option<&Value>> {
        let index = self.index_of(key)?;
        let missing = self.values.get(key).map_or(true, |e| e.value.is_none());
        let item = &self.items[index];

        if missing && !item.optional() && self.context.interactivity.is_interactive() {
            let value = self.ask(item)?;
            debug!(key, source = %ValueSource::Prompt, "value resolved");
            self.values.insert(
                key.to_string(),
                Entry {
                    value: Some(value),
                    source: ValueSource::Prompt,
                },
            );
        }

        self.get(key)
    }

    /// Fetch every declared option, prompting where needed
    pub fn fetch_all(&mut self) -> Result<()> {
        let items = Arc::clone(&self.items);
        for item in items.iter() {
            self.fetch(item.key())?;
        }
        Ok(())
    }

    pub fn string(&self, key: &str) -> Result<Option<&str>> {
        Ok(self.get(key)?.and_then(Value::as_str))
    }

    pub fn integer(&self, key: &str) -> Result<Option<i64>> {
        Ok(self.get(key)?.and_then(Value::as_i64))
    }

    pub fn float(&self, key: &str) -> Result<Option<f64>> {
        Ok(self.get(key)?.and_then(Value::as_f64))
    }

    pub fn boolean(&self, key: &str) -> Result<Option<bool>> {
        Ok(self.get(key)?.and_then(Value::as_bool))
    }

    pub fn array(&self, key: &str) -> Result<Option<&[Value]>> {
        Ok(self.get(key)?.and_then(Value::as_array))
    }

    /// Overwrite a value; it passes the same coercion, validation and
    /// conflict checks as any input. On failure the previous value is kept.
    pub fn set(&mut self, key: &str, value: impl Into<Value>) -> Result<()> {
        let index = self.index_of(key)?;
        let item = &self.items[index];
        let value = item.coerce(value.into());
        item.validate(Some(&value))?;

        self.transaction(|config| {
            debug!(key, source = %ValueSource::Assigned, "value resolved");
            config.values.insert(
                key.to_string(),
                Entry {
                    value: Some(value),
                    source: ValueSource::Assigned,
                },
            );
            Ok(())
        })
    }

    /// Drop the current value and fall back to environment and defaults
    pub fn unset(&mut self, key: &str) -> Result<()> {
        let index = self.index_of(key)?;
        self.fall_back(index);
        Ok(())
    }

    /// Settle options that were explicitly set together with options
    /// they conflict with.
    pub fn resolve_conflicts(&mut self) -> Result<()> {
        let items = Arc::clone(&self.items);
        for item in items.iter() {
            for other_key in item.conflicting_options() {
                if !self.is_explicit(item.key()) {
                    break;
                }
                if !self.is_explicit(other_key) {
                    continue;
                }
                let Some(&other_index) = self.index.get(other_key.as_str()) else {
                    continue;
                };
                let other = &items[other_index];

                let Some(resolver) = item.conflict_resolver() else {
                    return Err(ConfigError::ConflictingOptions {
                        key: item.key().to_string(),
                        conflicting: other_key.clone(),
                    });
                };

                let resolution = resolver(item, other)
                    .map_err(|message| ConfigError::validation(item.key(), message))?;
                debug!(key = item.key(), conflicting = %other_key, ?resolution, "conflict resolved");
                match resolution {
                    ConflictResolution::KeepCurrent => self.fall_back(other_index),
                    ConflictResolution::KeepConflicting => {
                        if let Some(&index) = self.index.get(item.key()) {
                            self.fall_back(index);
                        }
                    }
                    ConflictResolution::KeepBoth => {}
                }
            }
        }
        Ok(())
    }

    /// Declared-order snapshot of resolved values
    pub fn all_values(&self, include_unset: bool) -> Vec<(&str, Option<&Value>)> {
        self.items
            .iter()
            .map(|item| {
                let value = self.values.get(item.key()).and_then(|e| e.value.as_ref());
                (item.key(), value)
            })
            .filter(|(_, value)| include_unset || value.is_some())
            .collect()
    }

    /// Snapshot safe for display: sensitive values are replaced by a marker
    pub fn display_values(&self, include_unset: bool) -> Vec<(String, String)> {
        self.all_values(include_unset)
            .into_iter()
            .map(|(key, value)| {
                let shown = match (value, self.item(key)) {
                    (Some(v), Some(item)) => item.display_value(v),
                    _ => String::new(),
                };
                (key.to_string(), shown)
            })
            .collect()
    }

    /// Hand the redacted snapshot to a display collaborator
    pub fn report_values(&self, title: &str, include_unset: bool, reporter: &dyn Reporter) {
        reporter.summary(title, &self.display_values(include_unset));
    }

    /// Redacted snapshot as a JSON object
    pub fn to_json(&self, include_unset: bool) -> serde_json::Value {
        let mut object = serde_json::Map::new();
        for (key, value) in self.all_values(include_unset) {
            let sensitive = self.item(key).is_some_and(ConfigItem::sensitive);
            let json = match value {
                None => serde_json::Value::Null,
                Some(_) if sensitive => serde_json::Value::String(REDACTED.to_string()),
                Some(v) => serde_json::to_value(v).unwrap_or(serde_json::Value::Null),
            };
            object.insert(key.to_string(), json);
        }
        serde_json::Value::Object(object)
    }

    /// Apply `change` then settle conflicts; any failure restores the
    /// values held before the call.
    fn transaction<T>(&mut self, change: impl FnOnce(&mut Self) -> Result<T>) -> Result<T> {
        let snapshot = self.values.clone();
        let result = change(self).and_then(|out| {
            self.resolve_conflicts()?;
            Ok(out)
        });
        if result.is_err() {
            debug!("rolling back configuration change");
            self.values = snapshot;
        }
        result
    }

    fn index_of(&self, key: &str) -> Result<usize> {
        self.index.get(key).copied().ok_or_else(|| ConfigError::UnknownKey {
            key: key.to_string(),
            available: self.all_keys().join(", "),
        })
    }

    fn item_or_err(&self, key: &str) -> Result<&ConfigItem> {
        let index = self.index_of(key)?;
        Ok(&self.items[index])
    }

    /// Replace the value at `index` with whatever the non-explicit sources give
    fn fall_back(&mut self, index: usize) {
        let item = &self.items[index];
        match self.resolve_implicit(item) {
            Some((value, source)) => {
                debug!(key = item.key(), %source, "value resolved");
                self.values.insert(
                    item.key().to_string(),
                    Entry {
                        value: Some(value),
                        source,
                    },
                );
            }
            None => {
                debug!(key = item.key(), "no value resolved");
                self.values.remove(item.key());
            }
        }
    }

    /// Environment, then dynamic default, then static default.
    ///
    /// A candidate failing validation is skipped, never fatal.
    fn resolve_implicit(&self, item: &ConfigItem) -> Option<(Value, ValueSource)> {
        if let Some(name) = item.env_name() {
            if let Some(raw) = self.context.env.var(name) {
                match accept(item, Value::String(raw)) {
                    Ok(value) => return Some((value, ValueSource::Environment)),
                    Err(e) => warn!(key = item.key(), env = name, error = %loggable_error(item, &e), "ignoring environment value"),
                }
            }
        }

        if let Some(value) = item.dynamic_default(self.context.env.as_ref()) {
            match accept(item, value) {
                Ok(value) => return Some((value, ValueSource::DynamicDefault)),
                Err(e) => warn!(key = item.key(), error = %loggable_error(item, &e), "ignoring dynamic default"),
            }
        }

        if let Some(value) = item.default_value() {
            match accept(item, value.clone()) {
                Ok(value) => return Some((value, ValueSource::Default)),
                Err(e) => warn!(key = item.key(), error = %loggable_error(item, &e), "ignoring default value"),
            }
        }

        None
    }

    /// Ask until the answer is valid or the prompter gives up
    #[instrument(skip(self, item), fields(key = item.key()))]
    fn ask(&self, item: &ConfigItem) -> Result<Value> {
        let description = item.description().unwrap_or(item.key());
        loop {
            let raw = if item.data_type() == Some(DataType::Boolean) {
                Value::Bool(
                    self.context
                        .prompter
                        .confirm(&format!("{} (y/n)", description))?,
                )
            } else {
                Value::String(
                    self.context
                        .prompter
                        .prompt_for_value(description, item.sensitive())?,
                )
            };

            match accept(item, raw) {
                Ok(value) => return Ok(value),
                Err(e) => warn!(error = %loggable_error(item, &e), "invalid answer, asking again"),
            }
        }
    }
}

impl fmt::Debug for Configuration {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Configuration")
            .field("values", &self.display_values(true))
            .field("interactivity", &self.context.interactivity)
            .finish_non_exhaustive()
    }
}

/// Error text safe for logs; verify messages may echo a sensitive value
fn loggable_error(item: &ConfigItem, err: &ConfigError) -> String {
    if item.sensitive() {
        format!("invalid value for '{}' (details hidden for sensitive option)", item.key())
    } else {
        err.to_string()
    }
}

/// Coerce then validate
fn accept(item: &ConfigItem, value: Value) -> Result<Value> {
    let value = item.coerce(value);
    item.validate(Some(&value))?;
    Ok(value)
}

/// Builder for [`Configuration`]
pub struct ConfigurationBuilder {
    items: Arc<[ConfigItem]>,
    inputs: Inputs,
    context: ResolutionContext,
}

impl ConfigurationBuilder {
    pub fn inputs(mut self, inputs: Inputs) -> Self {
        self.inputs = inputs;
        self
    }

    pub fn context(mut self, context: ResolutionContext) -> Self {
        self.context = context;
        self
    }

    pub fn env(mut self, env: Arc<dyn EnvSource>) -> Self {
        self.context.env = env;
        self
    }

    pub fn prompter(mut self, prompter: Arc<dyn Prompter>) -> Self {
        self.context.prompter = prompter;
        self
    }

    pub fn interactivity(mut self, interactivity: Interactivity) -> Self {
        self.context.interactivity = interactivity;
        self
    }

    /// Check the declarations, resolve every key, then settle conflicts
    pub fn build(self) -> Result<Configuration> {
        let index = build_index(&self.items)?;

        if let Some(unknown) = self.inputs.keys().find(|k| !index.contains_key(*k)) {
            return Err(ConfigError::UnknownKey {
                key: unknown.to_string(),
                available: self
                    .items
                    .iter()
                    .map(ConfigItem::key)
                    .collect::<Vec<_>>()
                    .join(", "),
            });
        }

        let mut config = Configuration {
            items: self.items,
            index,
            values: HashMap::new(),
            context: self.context,
        };

        let items = Arc::clone(&config.items);
        for (i, item) in items.iter().enumerate() {
            match self.inputs.get(item.key()) {
                Some(Some(raw)) => {
                    let value = accept(item, raw.clone())?;
                    if item.deprecated().is_some() {
                        warn!(
                            key = item.key(),
                            "option is deprecated: {}",
                            item.description().unwrap_or_default()
                        );
                    }
                    debug!(key = item.key(), source = %ValueSource::Explicit, "value resolved");
                    config.values.insert(
                        item.key().to_string(),
                        Entry {
                            value: Some(value),
                            source: ValueSource::Explicit,
                        },
                    );
                }
                Some(None) if item.optional() => {
                    debug!(key = item.key(), "explicit nil kept");
                    config.values.insert(
                        item.key().to_string(),
                        Entry {
                            value: None,
                            source: ValueSource::Explicit,
                        },
                    );
                }
                _ => config.fall_back(i),
            }
        }

        config.resolve_conflicts()?;
        debug!(options = config.items.len(), "configuration resolved");
        Ok(config)
    }
}

fn build_index(items: &[ConfigItem]) -> Result<HashMap<String, usize>> {
    let mut index = HashMap::with_capacity(items.len());
    let mut short_flags = HashSet::new();

    for (i, item) in items.iter().enumerate() {
        if index.insert(item.key().to_string(), i).is_some() {
            return Err(ConfigError::AmbiguousConfig(format!(
                "Multiple entries for configuration key '{}' found!",
                item.key()
            )));
        }
        if let Some(flag) = item.short_flag() {
            if !short_flags.insert(flag) {
                return Err(ConfigError::AmbiguousConfig(format!(
                    "Multiple entries for short_option '-{}' found!",
                    flag
                )));
            }
        }
    }

    Ok(index)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::env::MapEnv;
    use crate::prompt::{Asked, ScriptedPrompter};
    use crate::report::{RecordingReporter, Report};
    use std::sync::atomic::{AtomicUsize, Ordering};

    fn not_empty(value: &Value) -> std::result::Result<(), String> {
        match value.as_str() {
            Some("") => Err("value must not be empty".to_string()),
            _ => Ok(()),
        }
    }

    fn username() -> ConfigItem {
        ConfigItem::builder("username")
            .env_name("USER_ENV")
            .description("Your Apple ID username")
            .default_value("default@example.com")
            .build()
            .unwrap()
    }

    fn build(items: Vec<ConfigItem>, inputs: Inputs, env: MapEnv) -> Result<Configuration> {
        Configuration::builder(items)
            .inputs(inputs)
            .env(Arc::new(env))
            .build()
    }

    #[test]
    fn test_explicit_beats_env_beats_default() {
        let env = MapEnv::new().with("USER_ENV", "bob");

        let config = build(vec![username()], Inputs::new().with("username", "alice"), env.clone()).unwrap();
        assert_eq!(config.string("username").unwrap(), Some("alice"));
        assert_eq!(config.source("username"), Some(ValueSource::Explicit));

        let config = build(vec![username()], Inputs::new(), env).unwrap();
        assert_eq!(config.string("username").unwrap(), Some("bob"));
        assert_eq!(config.source("username"), Some(ValueSource::Environment));

        let config = build(vec![username()], Inputs::new(), MapEnv::new()).unwrap();
        assert_eq!(config.string("username").unwrap(), Some("default@example.com"));
        assert_eq!(config.source("username"), Some(ValueSource::Default));
    }

    #[test]
    fn test_resolution_is_idempotent() {
        let mut config = build(vec![username()], Inputs::new(), MapEnv::new()).unwrap();
        let first = config.get("username").unwrap().cloned();
        let second = config.fetch("username").unwrap().cloned();
        assert_eq!(first, second);
        assert_eq!(config.get("username").unwrap().cloned(), first);
    }

    #[test]
    fn test_integer_coercion_from_input() {
        let item = ConfigItem::builder("build_number")
            .data_type(DataType::Integer)
            .build()
            .unwrap();

        let config = build(vec![item.clone()], Inputs::new().with("build_number", "42"), MapEnv::new()).unwrap();
        assert_eq!(config.integer("build_number").unwrap(), Some(42));

        let err = build(vec![item], Inputs::new().with("build_number", "42.5"), MapEnv::new()).unwrap_err();
        assert!(matches!(err, ConfigError::Validation { ref key, .. } if key == "build_number"));
    }

    #[test]
    fn test_boolean_coercion_from_input() {
        let item = ConfigItem::builder("force")
            .data_type(DataType::Boolean)
            .build()
            .unwrap();
        for (raw, expected) in [("true", true), ("YES", true), ("false", false), ("NO", false)] {
            let config = build(vec![item.clone()], Inputs::new().with("force", raw), MapEnv::new()).unwrap();
            assert_eq!(config.boolean("force").unwrap(), Some(expected), "{raw}");
        }
    }

    #[test]
    fn test_env_value_is_coerced() {
        let item = ConfigItem::builder("languages")
            .env_name("LANGS")
            .data_type(DataType::Array)
            .build()
            .unwrap();
        let config = build(vec![item], Inputs::new(), MapEnv::new().with("LANGS", "en-US,fr-FR")).unwrap();
        assert_eq!(
            config.array("languages").unwrap(),
            Some(&[Value::from("en-US"), Value::from("fr-FR")][..])
        );
    }

    #[test]
    fn test_explicit_invalid_input_is_terminal() {
        let item = ConfigItem::builder("app_identifier")
            .default_value("com.example.app")
            .verify(not_empty)
            .build()
            .unwrap();
        let err = build(vec![item], Inputs::new().with("app_identifier", ""), MapEnv::new()).unwrap_err();
        assert!(matches!(
            err,
            ConfigError::Validation { ref message, .. } if message == "value must not be empty"
        ));
    }

    #[test]
    fn test_invalid_env_falls_through_to_default() {
        let item = ConfigItem::builder("app_identifier")
            .env_name("APP_ID")
            .default_value("com.example.app")
            .verify(not_empty)
            .build()
            .unwrap();
        let config = build(vec![item], Inputs::new(), MapEnv::new().with("APP_ID", "")).unwrap();
        assert_eq!(config.string("app_identifier").unwrap(), Some("com.example.app"));
        assert_eq!(config.source("app_identifier"), Some(ValueSource::Default));
    }

    #[test]
    fn test_dynamic_default_is_recomputed_and_falls_through() {
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();
        let item = ConfigItem::builder("output_path")
            .default_value("./out")
            .default_value_dynamic(move |_| {
                let n = counter.fetch_add(1, Ordering::SeqCst);
                if n == 0 {
                    Some(Value::from("/tmp/first"))
                } else {
                    Some(Value::from(""))
                }
            })
            .verify(not_empty)
            .build()
            .unwrap();
        let items: Arc<[ConfigItem]> = vec![item].into();

        let first = Configuration::create(Arc::clone(&items), Inputs::new()).unwrap();
        assert_eq!(first.string("output_path").unwrap(), Some("/tmp/first"));
        assert_eq!(first.source("output_path"), Some(ValueSource::DynamicDefault));

        let second = Configuration::create(items, Inputs::new()).unwrap();
        assert_eq!(second.string("output_path").unwrap(), Some("./out"));
        assert_eq!(second.source("output_path"), Some(ValueSource::Default));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
    }

    #[test]
    fn test_unknown_input_key() {
        let err = build(vec![username()], Inputs::new().with("usernme", "x"), MapEnv::new()).unwrap_err();
        assert!(matches!(err, ConfigError::UnknownKey { ref key, ref available }
            if key == "usernme" && available == "username"));
        assert!(!err.is_user_error());
    }

    #[test]
    fn test_duplicate_keys_are_ambiguous() {
        let err = build(vec![username(), username()], Inputs::new(), MapEnv::new()).unwrap_err();
        assert!(matches!(err, ConfigError::AmbiguousConfig(ref m) if m.contains("username")));
    }

    #[test]
    fn test_duplicate_short_options_are_ambiguous() {
        let a = ConfigItem::builder("a").short_option("-x").build().unwrap();
        let b = ConfigItem::builder("b").short_option("x").build().unwrap();
        let err = build(vec![a, b], Inputs::new(), MapEnv::new()).unwrap_err();
        assert!(matches!(err, ConfigError::AmbiguousConfig(ref m) if m.contains("-x")));
    }

    #[test]
    fn test_missing_required_value() {
        let item = ConfigItem::builder("team_id")
            .description("The ID of your team")
            .build()
            .unwrap();
        let mut config = build(vec![item], Inputs::new(), MapEnv::new()).unwrap();
        let err = config.fetch("team_id").unwrap_err();
        assert!(matches!(err, ConfigError::MissingRequiredValue { ref key, .. } if key == "team_id"));
        assert!(err.is_user_error());
    }

    #[test]
    fn test_optional_unset_is_none() {
        let item = ConfigItem::builder("team_name").optional(true).build().unwrap();
        let config = build(vec![item], Inputs::new(), MapEnv::new()).unwrap();
        assert_eq!(config.get("team_name").unwrap(), None);
        assert_eq!(config.source("team_name"), None);
    }

    #[test]
    fn test_explicit_nil() {
        let optional = ConfigItem::builder("team_name")
            .optional(true)
            .default_value("Team")
            .build()
            .unwrap();
        let required = ConfigItem::builder("team_id").default_value("ABC123").build().unwrap();
        let config = build(
            vec![optional, required],
            Inputs::new().with_nil("team_name").with_nil("team_id"),
            MapEnv::new(),
        )
        .unwrap();

        assert_eq!(config.get("team_name").unwrap(), None);
        assert_eq!(config.source("team_name"), Some(ValueSource::Explicit));
        assert_eq!(config.string("team_id").unwrap(), Some("ABC123"));
    }

    #[test]
    fn test_fetch_prompts_when_interactive() {
        let item = ConfigItem::builder("username")
            .description("Your Apple ID username")
            .verify(not_empty)
            .build()
            .unwrap();
        let password = ConfigItem::builder("password")
            .description("Your password")
            .sensitive(true)
            .build()
            .unwrap();
        let prompter = Arc::new(ScriptedPrompter::new().answer("").answer("alice").answer("s3cret"));
        let mut config = Configuration::builder(vec![item, password])
            .env(Arc::new(MapEnv::new()))
            .prompter(prompter.clone())
            .interactivity(Interactivity::Interactive)
            .build()
            .unwrap();

        assert!(matches!(
            config.get("username"),
            Err(ConfigError::MissingRequiredValue { .. })
        ));
        config.fetch_all().unwrap();
        assert_eq!(config.string("username").unwrap(), Some("alice"));
        assert_eq!(config.source("username"), Some(ValueSource::Prompt));
        assert_eq!(config.string("password").unwrap(), Some("s3cret"));

        let asked = prompter.asked();
        assert_eq!(asked.len(), 3);
        assert_eq!(
            asked[2],
            Asked::Value {
                description: "Your password".to_string(),
                sensitive: true
            }
        );
    }

    #[test]
    fn test_fetch_confirms_booleans() {
        let item = ConfigItem::builder("development")
            .description("Create a development certificate instead of a distribution one")
            .data_type(DataType::Boolean)
            .build()
            .unwrap();
        let prompter = Arc::new(ScriptedPrompter::new().confirm_with(true));
        let mut config = Configuration::builder(vec![item])
            .env(Arc::new(MapEnv::new()))
            .prompter(prompter.clone())
            .interactivity(Interactivity::Interactive)
            .build()
            .unwrap();

        assert_eq!(config.fetch("development").unwrap(), Some(&Value::Bool(true)));
        assert!(matches!(prompter.asked()[0], Asked::Confirm { ref message } if message.ends_with("(y/n)")));
    }

    #[test]
    fn test_cancelled_prompt() {
        let item = ConfigItem::builder("username").build().unwrap();
        let mut config = Configuration::builder(vec![item])
            .env(Arc::new(MapEnv::new()))
            .prompter(Arc::new(ScriptedPrompter::new().cancel()))
            .interactivity(Interactivity::Interactive)
            .build()
            .unwrap();
        assert!(config.fetch("username").unwrap_err().is_cancelled());
    }

    #[test]
    fn test_set_revalidates() {
        let item = ConfigItem::builder("build_number")
            .data_type(DataType::Integer)
            .optional(true)
            .verify(|v| match v.as_i64() {
                Some(n) if n < 0 => Err("must be positive".to_string()),
                _ => Ok(()),
            })
            .build()
            .unwrap();
        let mut config = build(vec![item], Inputs::new().with("build_number", 3), MapEnv::new()).unwrap();

        config.set("build_number", "7").unwrap();
        assert_eq!(config.integer("build_number").unwrap(), Some(7));
        assert_eq!(config.source("build_number"), Some(ValueSource::Assigned));

        assert!(config.set("build_number", -1).is_err());
        assert!(config.set("build_number", "seven").is_err());
        assert_eq!(config.integer("build_number").unwrap(), Some(7));

        assert!(matches!(
            config.set("unknown", 1),
            Err(ConfigError::UnknownKey { .. })
        ));
    }

    #[test]
    fn test_unset_falls_back() {
        let mut config = build(
            vec![username()],
            Inputs::new().with("username", "alice"),
            MapEnv::new().with("USER_ENV", "bob"),
        )
        .unwrap();
        config.unset("username").unwrap();
        assert_eq!(config.string("username").unwrap(), Some("bob"));
    }

    fn conflicting_pair() -> Vec<ConfigItem> {
        vec![
            ConfigItem::builder("a").optional(true).conflicting_options(["b"]).build().unwrap(),
            ConfigItem::builder("b").optional(true).conflicting_options(["a"]).build().unwrap(),
        ]
    }

    #[test]
    fn test_conflicting_explicit_values() {
        let err = build(
            conflicting_pair(),
            Inputs::new().with("a", "x").with("b", "y"),
            MapEnv::new(),
        )
        .unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ConflictingOptions { ref key, ref conflicting } if key == "a" && conflicting == "b"
        ));
    }

    #[test]
    fn test_conflict_ignores_defaulted_values() {
        let items = vec![
            ConfigItem::builder("a").optional(true).conflicting_options(["b"]).build().unwrap(),
            ConfigItem::builder("b").default_value("y").build().unwrap(),
        ];
        let config = build(items, Inputs::new().with("a", "x"), MapEnv::new()).unwrap();
        assert_eq!(config.string("a").unwrap(), Some("x"));
        assert_eq!(config.string("b").unwrap(), Some("y"));
    }

    #[test]
    fn test_conflict_resolver_picks_winner() {
        let items = vec![
            ConfigItem::builder("api_key")
                .optional(true)
                .conflicting_options(["username"])
                .conflict_resolver(|current, other| {
                    assert_eq!(current.key(), "api_key");
                    assert_eq!(other.key(), "username");
                    Ok(ConflictResolution::KeepCurrent)
                })
                .build()
                .unwrap(),
            username(),
        ];
        let config = build(
            items,
            Inputs::new().with("api_key", "KEY").with("username", "alice"),
            MapEnv::new(),
        )
        .unwrap();
        assert_eq!(config.string("api_key").unwrap(), Some("KEY"));
        assert_eq!(config.string("username").unwrap(), Some("default@example.com"));
        assert_eq!(config.source("username"), Some(ValueSource::Default));
    }

    #[test]
    fn test_conflict_resolver_can_reject() {
        let items = vec![
            ConfigItem::builder("ipa")
                .optional(true)
                .conflicting_options(["pkg"])
                .conflict_resolver(|_, other| Err(format!("'ipa' cannot be used with '{}'", other.key())))
                .build()
                .unwrap(),
            ConfigItem::builder("pkg").optional(true).build().unwrap(),
        ];
        let err = build(items, Inputs::new().with("ipa", "a.ipa").with("pkg", "a.pkg"), MapEnv::new())
            .unwrap_err();
        assert!(err.to_string().contains("cannot be used with 'pkg'"));
    }

    #[test]
    fn test_set_rejects_conflicting_value() {
        let mut config = build(conflicting_pair(), Inputs::new().with("a", "x"), MapEnv::new()).unwrap();

        let err = config.set("b", "y").unwrap_err();
        assert!(matches!(
            err,
            ConfigError::ConflictingOptions { ref key, ref conflicting } if key == "a" && conflicting == "b"
        ));
        assert_eq!(config.get("b").unwrap(), None);
        assert!(!config.is_explicit("b"));
        assert_eq!(config.string("a").unwrap(), Some("x"));
        assert_eq!(config.source("a"), Some(ValueSource::Explicit));
    }

    #[test]
    fn test_set_applies_conflict_resolver() {
        let items = vec![
            ConfigItem::builder("api_key")
                .optional(true)
                .conflicting_options(["username"])
                .conflict_resolver(|_, _| Ok(ConflictResolution::KeepCurrent))
                .build()
                .unwrap(),
            username(),
        ];
        let mut config = build(items, Inputs::new().with("username", "alice"), MapEnv::new()).unwrap();

        config.set("api_key", "KEY").unwrap();
        assert_eq!(config.string("api_key").unwrap(), Some("KEY"));
        assert_eq!(config.string("username").unwrap(), Some("default@example.com"));
    }

    #[test]
    fn test_sensitive_rejections_are_not_logged() {
        let item = ConfigItem::builder("password")
            .sensitive(true)
            .verify(|v| Err(format!("'{}' is too short", v)))
            .build()
            .unwrap();
        let err = accept(&item, Value::from("hunter2")).unwrap_err();
        assert!(err.to_string().contains("hunter2"));

        let logged = loggable_error(&item, &err);
        assert!(logged.contains("password"));
        assert!(!logged.contains("hunter2"));

        let plain = ConfigItem::builder("team_id")
            .verify(|v| Err(format!("'{}' is not a team", v)))
            .build()
            .unwrap();
        let err = accept(&plain, Value::from("ABC")).unwrap_err();
        assert_eq!(loggable_error(&plain, &err), err.to_string());
    }

    #[test]
    fn test_all_values_and_redaction() {
        let items = vec![
            username(),
            ConfigItem::builder("password").sensitive(true).build().unwrap(),
            ConfigItem::builder("team_name").optional(true).build().unwrap(),
        ];
        let config = build(
            items,
            Inputs::new().with("password", "hunter2"),
            MapEnv::new(),
        )
        .unwrap();

        let keys: Vec<_> = config.all_values(false).into_iter().map(|(k, _)| k).collect();
        assert_eq!(keys, ["username", "password"]);
        assert_eq!(config.all_values(true).len(), 3);
        assert_eq!(config.all_values(false)[1].1, Some(&Value::from("hunter2")));

        let shown = config.display_values(false);
        assert_eq!(shown[1], ("password".to_string(), REDACTED.to_string()));

        let reporter = RecordingReporter::new();
        config.report_values("Summary for cert", false, &reporter);
        let reports = reporter.reports();
        let Report::Summary { title, rows } = &reports[0] else {
            panic!("expected summary");
        };
        assert_eq!(title, "Summary for cert");
        assert!(rows.iter().all(|(_, v)| !v.contains("hunter2")));

        let json = config.to_json(true);
        assert_eq!(json["password"], REDACTED);
        assert_eq!(json["team_name"], serde_json::Value::Null);
        assert!(!format!("{:?}", config).contains("hunter2"));
    }
}
