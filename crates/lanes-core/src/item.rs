//! Option descriptors

use std::fmt;
use std::sync::{Arc, LazyLock};

use regex::Regex;
use tracing::error;

use crate::env::EnvSource;
use crate::error::{ConfigError, Result};
use crate::value::Value;

/// Marker shown instead of sensitive values
pub const REDACTED: &str = "********";

/// Keys and conflicting option names must look like identifiers
static KEY_REGEX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[a-z_][a-z0-9_]*$").expect("Invalid regex"));

/// Semantic check run on every value after the type check
pub type VerifyFn = Arc<dyn Fn(&Value) -> std::result::Result<(), String> + Send + Sync>;

/// Produces a default at resolution time from the resolution environment
pub type DefaultFn = Arc<dyn Fn(&dyn EnvSource) -> Option<Value> + Send + Sync>;

/// Decides which of two explicitly set, conflicting options wins
pub type ConflictFn = Arc<
    dyn Fn(&ConfigItem, &ConfigItem) -> std::result::Result<ConflictResolution, String>
        + Send
        + Sync,
>;

/// Target type of an option
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum DataType {
    String,
    Integer,
    Float,
    Boolean,
    Array,
    Map,
    /// Validates as a string; arrays and maps are shell-escaped into one
    ShellString,
    /// Closure passed through untouched
    Callback,
}

impl DataType {
    /// Returns the string representation of the data type
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::String => "String",
            Self::Integer => "Integer",
            Self::Float => "Float",
            Self::Boolean => "Boolean",
            Self::Array => "Array",
            Self::Map => "Map",
            Self::ShellString => "ShellString",
            Self::Callback => "Callback",
        }
    }

    fn accepts(&self, value: &Value) -> bool {
        match self {
            Self::String | Self::ShellString => matches!(value, Value::String(_)),
            Self::Integer => matches!(value, Value::Integer(_)),
            Self::Float => matches!(value, Value::Float(_)),
            Self::Boolean => matches!(value, Value::Bool(_)),
            Self::Array => matches!(value, Value::Array(_)),
            Self::Map => matches!(value, Value::Map(_)),
            Self::Callback => true,
        }
    }
}

impl fmt::Display for DataType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.as_str())
    }
}

/// Deprecation marker for an option
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Deprecation {
    /// Deprecated without further explanation
    Flag,
    /// Deprecated with a hint such as "use `api_key` instead"
    Message(String),
}

/// Outcome of a conflict resolver
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ConflictResolution {
    /// The option declaring the conflict keeps its value
    KeepCurrent,
    /// The conflicting option keeps its value
    KeepConflicting,
    /// Both values are fine together after all
    KeepBoth,
}

/// Declarative descriptor of one configurable option.
///
/// Built once through [`ConfigItem::builder`] and never mutated afterwards.
#[derive(Clone)]
pub struct ConfigItem {
    key: String,
    env_name: Option<String>,
    description: Option<String>,
    short_option: Option<String>,
    default_value: Option<Value>,
    default_provider: Option<DefaultFn>,
    code_gen_default_value: Option<Value>,
    verify: Option<VerifyFn>,
    is_string: bool,
    data_type: Option<DataType>,
    skip_type_validation: bool,
    optional: bool,
    conflicting_options: Vec<String>,
    conflict_resolver: Option<ConflictFn>,
    deprecated: Option<Deprecation>,
    sensitive: bool,
    code_gen_sensitive: bool,
    display_in_shell: bool,
}

impl ConfigItem {
    /// Start declaring an option
    pub fn builder(key: impl Into<String>) -> ConfigItemBuilder {
        ConfigItemBuilder::new(key)
    }

    pub fn key(&self) -> &str {
        &self.key
    }

    pub fn env_name(&self) -> Option<&str> {
        self.env_name.as_deref()
    }

    pub fn description(&self) -> Option<&str> {
        self.description.as_deref()
    }

    pub fn short_option(&self) -> Option<&str> {
        self.short_option.as_deref()
    }

    /// The single significant character of the short option
    pub fn short_flag(&self) -> Option<char> {
        self.short_option
            .as_deref()
            .and_then(|s| s.chars().find(|c| *c != '-'))
    }

    pub fn default_value(&self) -> Option<&Value> {
        self.default_value.as_ref()
    }

    /// Whether the default is computed at resolution time
    pub fn default_value_dynamic(&self) -> bool {
        self.default_provider.is_some()
    }

    /// Run the dynamic default provider, if any
    pub fn dynamic_default(&self, env: &dyn EnvSource) -> Option<Value> {
        self.default_provider.as_ref().and_then(|provider| provider(env))
    }

    /// Default value safe to surface in generated docs and code
    pub fn code_gen_default_value(&self) -> Option<&Value> {
        self.code_gen_default_value.as_ref()
    }

    /// Effective data type: an explicit type wins over the legacy string flag
    pub fn data_type(&self) -> Option<DataType> {
        match self.data_type {
            Some(t) => Some(t),
            None if self.is_string => Some(DataType::String),
            None => None,
        }
    }

    /// Whether the effective type is a plain string
    pub fn string(&self) -> bool {
        self.data_type() == Some(DataType::String)
    }

    pub fn is_string(&self) -> bool {
        self.is_string
    }

    /// Whether arrays and maps are turned into shell-escaped strings
    pub fn allow_shell_conversion(&self) -> bool {
        self.data_type == Some(DataType::ShellString)
    }

    pub fn skip_type_validation(&self) -> bool {
        self.skip_type_validation
    }

    pub fn optional(&self) -> bool {
        self.optional
    }

    pub fn conflicting_options(&self) -> &[String] {
        &self.conflicting_options
    }

    pub fn conflict_resolver(&self) -> Option<&ConflictFn> {
        self.conflict_resolver.as_ref()
    }

    pub fn deprecated(&self) -> Option<&Deprecation> {
        self.deprecated.as_ref()
    }

    pub fn sensitive(&self) -> bool {
        self.sensitive
    }

    pub fn code_gen_sensitive(&self) -> bool {
        self.code_gen_sensitive
    }

    pub fn display_in_shell(&self) -> bool {
        self.display_in_shell
    }

    /// Render a value for display, hiding it when the option is sensitive
    pub fn display_value(&self, value: &Value) -> String {
        if self.sensitive {
            REDACTED.to_string()
        } else {
            value.to_string()
        }
    }

    /// Check a value against the type and the verify block.
    ///
    /// Absence always passes; required options are enforced during resolution.
    pub fn validate(&self, value: Option<&Value>) -> Result<()> {
        let Some(value) = value else {
            return Ok(());
        };

        self.check_type(value)?;

        if let Some(verify) = &self.verify {
            if let Err(message) = verify(value) {
                error!(
                    key = %self.key,
                    value = %self.display_value(value),
                    "error setting value for option"
                );
                return Err(ConfigError::validation(&self.key, message));
            }
        }

        Ok(())
    }

    fn check_type(&self, value: &Value) -> Result<()> {
        if self.skip_type_validation {
            return Ok(());
        }

        match self.data_type() {
            None | Some(DataType::Callback) => Ok(()),
            Some(DataType::Boolean) if !matches!(value, Value::Bool(_)) => {
                Err(ConfigError::validation(
                    &self.key,
                    format!(
                        "'{}' value must be either `true` or `false`! Found {} instead.",
                        self.key,
                        value.type_name()
                    ),
                ))
            }
            Some(expected) if !expected.accepts(value) => Err(ConfigError::validation(
                &self.key,
                format!(
                    "'{}' value must be a {}! Found {} instead.",
                    self.key,
                    match expected {
                        DataType::ShellString => DataType::String,
                        other => other,
                    },
                    value.type_name()
                ),
            )),
            Some(_) => Ok(()),
        }
    }

    /// Default value as shown in `--help` style output
    pub fn help_default_value(&self) -> String {
        if self.default_value_dynamic() {
            let shown = self
                .default_value
                .as_ref()
                .map(|v| v.to_string())
                .unwrap_or_default();
            return format!("{} *", shown).trim().to_string();
        }
        match &self.default_value {
            None => String::new(),
            Some(v) if v.is_empty_string() => "''".to_string(),
            Some(v) => v.to_string(),
        }
    }

    /// Default value as shown in generated Markdown documentation
    pub fn doc_default_value(&self) -> String {
        if self.default_value_dynamic() {
            return "[*](#parameters-legend-dynamic)".to_string();
        }
        match &self.default_value {
            None => String::new(),
            Some(v) if v.is_empty_string() => "`''`".to_string(),
            Some(v) => format!("`{}`", v),
        }
    }
}

impl fmt::Display for ConfigItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{}: {}",
            self.key,
            self.description.as_deref().unwrap_or_default()
        )
    }
}

impl fmt::Debug for ConfigItem {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ConfigItem")
            .field("key", &self.key)
            .field("env_name", &self.env_name)
            .field("description", &self.description)
            .field("short_option", &self.short_option)
            .field("default_value_dynamic", &self.default_value_dynamic())
            .field("data_type", &self.data_type())
            .field("optional", &self.optional)
            .field("conflicting_options", &self.conflicting_options)
            .field("deprecated", &self.deprecated)
            .field("sensitive", &self.sensitive)
            .finish_non_exhaustive()
    }
}

/// Builder for [`ConfigItem`]
pub struct ConfigItemBuilder {
    key: String,
    env_name: Option<String>,
    description: Option<String>,
    short_option: Option<String>,
    default_value: Option<Value>,
    default_provider: Option<DefaultFn>,
    code_gen_default_value: Option<Value>,
    verify: Option<VerifyFn>,
    is_string: bool,
    data_type: Option<DataType>,
    skip_type_validation: bool,
    optional: Option<bool>,
    conflicting_options: Vec<String>,
    conflict_resolver: Option<ConflictFn>,
    deprecated: Option<Deprecation>,
    sensitive: bool,
    code_gen_sensitive: bool,
    display_in_shell: bool,
}

impl ConfigItemBuilder {
    fn new(key: impl Into<String>) -> Self {
        Self {
            key: key.into(),
            env_name: None,
            description: None,
            short_option: None,
            default_value: None,
            default_provider: None,
            code_gen_default_value: None,
            verify: None,
            is_string: true,
            data_type: None,
            skip_type_validation: false,
            optional: None,
            conflicting_options: Vec::new(),
            conflict_resolver: None,
            deprecated: None,
            sensitive: false,
            code_gen_sensitive: false,
            display_in_shell: true,
        }
    }

    /// Environment variable consulted when no explicit value is given
    pub fn env_name(mut self, name: impl Into<String>) -> Self {
        self.env_name = Some(name.into());
        self
    }

    /// Help text, also used as the interactive prompt
    pub fn description(mut self, description: impl Into<String>) -> Self {
        self.description = Some(description.into());
        self
    }

    /// One-character command line alias, with or without the leading dash
    pub fn short_option(mut self, short: impl Into<String>) -> Self {
        self.short_option = Some(short.into());
        self
    }

    pub fn default_value(mut self, value: impl Into<Value>) -> Self {
        self.default_value = Some(value.into());
        self
    }

    /// Compute the default each time the option is resolved
    pub fn default_value_dynamic(
        mut self,
        provider: impl Fn(&dyn EnvSource) -> Option<Value> + Send + Sync + 'static,
    ) -> Self {
        self.default_provider = Some(Arc::new(provider));
        self
    }

    /// Override the default surfaced in generated docs and code
    pub fn code_gen_default_value(mut self, value: impl Into<Value>) -> Self {
        self.code_gen_default_value = Some(value.into());
        self
    }

    pub fn verify(
        mut self,
        verify: impl Fn(&Value) -> std::result::Result<(), String> + Send + Sync + 'static,
    ) -> Self {
        self.verify = Some(Arc::new(verify));
        self
    }

    /// Legacy flag; ignored once an explicit data type is set
    pub fn is_string(mut self, is_string: bool) -> Self {
        self.is_string = is_string;
        self
    }

    pub fn data_type(mut self, data_type: DataType) -> Self {
        self.data_type = Some(data_type);
        self
    }

    pub fn skip_type_validation(mut self, skip: bool) -> Self {
        self.skip_type_validation = skip;
        self
    }

    pub fn optional(mut self, optional: bool) -> Self {
        self.optional = Some(optional);
        self
    }

    pub fn conflicting_options<I, S>(mut self, keys: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.conflicting_options = keys.into_iter().map(Into::into).collect();
        self
    }

    pub fn conflict_resolver(
        mut self,
        resolver: impl Fn(&ConfigItem, &ConfigItem) -> std::result::Result<ConflictResolution, String>
            + Send
            + Sync
            + 'static,
    ) -> Self {
        self.conflict_resolver = Some(Arc::new(resolver));
        self
    }

    /// Mark as deprecated with a hint for the replacement
    pub fn deprecated(mut self, message: impl Into<String>) -> Self {
        self.deprecated = Some(Deprecation::Message(message.into()));
        self
    }

    /// Mark as deprecated without a hint
    pub fn deprecated_flag(mut self) -> Self {
        self.deprecated = Some(Deprecation::Flag);
        self
    }

    pub fn sensitive(mut self, sensitive: bool) -> Self {
        self.sensitive = sensitive;
        self
    }

    pub fn code_gen_sensitive(mut self, sensitive: bool) -> Self {
        self.code_gen_sensitive = sensitive;
        self
    }

    pub fn display_in_shell(mut self, display: bool) -> Self {
        self.display_in_shell = display;
        self
    }

    /// Check the descriptor and produce the option
    pub fn build(self) -> Result<ConfigItem> {
        let key = self.key;

        if !is_valid_key(&key) {
            return Err(ConfigError::descriptor(
                &key,
                "key must be a lowercase identifier",
            ));
        }

        if let Some(env_name) = &self.env_name {
            if env_name.is_empty() || env_name.contains(['=', '\0']) {
                return Err(ConfigError::descriptor(
                    &key,
                    format!("env_name '{}' is not a valid variable name", env_name),
                ));
            }
        }

        if let Some(short) = &self.short_option {
            if short.chars().filter(|c| *c != '-').count() != 1 {
                return Err(ConfigError::descriptor(
                    &key,
                    "short_option must be a string of length 1",
                ));
            }
        }

        if self.description.as_deref().is_some_and(|d| d.ends_with('.')) {
            return Err(ConfigError::descriptor(
                &key,
                "Do not let descriptions end with a '.', since it's used for user inputs as well",
            ));
        }

        if let Some(bad) = self.conflicting_options.iter().find(|k| !is_valid_key(k)) {
            return Err(ConfigError::descriptor(
                &key,
                format!("conflicting option key '{}' must be an identifier", bad),
            ));
        }

        let mut description = self.description;
        let optional = match &self.deprecated {
            Some(deprecation) => {
                if self.optional == Some(false) {
                    return Err(ConfigError::descriptor(
                        &key,
                        "Deprecated option must be optional",
                    ));
                }
                description = Some(deprecated_description(description.as_deref(), deprecation));
                true
            }
            None => self.optional.unwrap_or(false),
        };

        let code_gen_sensitive = self.code_gen_sensitive || self.sensitive;
        let code_gen_default_value = if self.data_type == Some(DataType::Callback) {
            None
        } else if self.code_gen_default_value.is_some() || code_gen_sensitive {
            self.code_gen_default_value
        } else {
            self.default_value.clone()
        };

        Ok(ConfigItem {
            key,
            env_name: self.env_name,
            description,
            short_option: self.short_option,
            default_value: self.default_value,
            default_provider: self.default_provider,
            code_gen_default_value,
            verify: self.verify,
            is_string: self.is_string,
            data_type: self.data_type,
            skip_type_validation: self.skip_type_validation,
            optional,
            conflicting_options: self.conflicting_options,
            conflict_resolver: self.conflict_resolver,
            deprecated: self.deprecated,
            sensitive: self.sensitive,
            code_gen_sensitive,
            display_in_shell: self.display_in_shell,
        })
    }
}

/// Whether a string is usable as an option key
pub fn is_valid_key(key: &str) -> bool {
    KEY_REGEX.is_match(key)
}

fn deprecated_description(initial: Option<&str>, deprecation: &Deprecation) -> String {
    let initial = initial.unwrap_or_default();
    let has_description = !initial.is_empty();

    let mut description = String::from("**DEPRECATED!**");
    if let Deprecation::Message(message) = deprecation {
        description.push(' ');
        description.push_str(message);
        if has_description {
            description.push_str(" -");
        }
    }
    if has_description {
        description.push(' ');
        description.push_str(initial);
    }
    description
}
