//! Error types for Lanes configuration

use std::path::PathBuf;
use thiserror::Error;

use crate::prompt::PromptError;
use crate::report::Reporter;

/// Result type alias using ConfigError
pub type Result<T> = std::result::Result<T, ConfigError>;

/// Errors raised while declaring options or resolving a configuration
#[derive(Debug, Error)]
pub enum ConfigError {
    /// Malformed option descriptor
    #[error("Invalid option '{key}': {message}")]
    InvalidDescriptor { key: String, message: String },

    /// Two options share a key or short option
    #[error("{0}")]
    AmbiguousConfig(String),

    /// Input names an option that was never declared
    #[error("Could not find option '{key}' in the list of available options: {available}")]
    UnknownKey { key: String, available: String },

    /// Value rejected by type check or verify block
    #[error("Invalid value for '{key}': {message}")]
    Validation { key: String, message: String },

    /// Mutually exclusive options were both set
    #[error("Unresolved conflict between options: '{key}' and '{conflicting}'")]
    ConflictingOptions { key: String, conflicting: String },

    /// Required option has no value and nobody can be asked for one
    #[error("No value found for '{key}' ({description})")]
    MissingRequiredValue { key: String, description: String },

    /// Interactive prompt failed
    #[error(transparent)]
    Prompt(#[from] PromptError),

    /// Options file is malformed or names an unknown option
    #[error("Invalid options file {path}: {message}")]
    OptionsFile { path: PathBuf, message: String },

    /// IO error
    #[error("IO error reading options file {path}: {source}")]
    Io {
        path: PathBuf,
        #[source]
        source: std::io::Error,
    },

    /// YAML parsing error
    #[error("YAML parsing error: {0}")]
    Yaml(#[from] serde_yaml::Error),

    /// TOML parsing error
    #[error("TOML parsing error: {0}")]
    Toml(#[from] toml::de::Error),

    /// JSON parsing error
    #[error("JSON parsing error: {0}")]
    Json(#[from] serde_json::Error),
}

impl ConfigError {
    /// Create a descriptor error for the given key
    pub fn descriptor(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::InvalidDescriptor {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Create a validation error for the given key
    pub fn validation(key: impl Into<String>, message: impl Into<String>) -> Self {
        Self::Validation {
            key: key.into(),
            message: message.into(),
        }
    }

    /// Whether the error was caused by the person running the tool rather
    /// than by the code declaring the options.
    pub fn is_user_error(&self) -> bool {
        !matches!(
            self,
            Self::InvalidDescriptor { .. } | Self::AmbiguousConfig(_) | Self::UnknownKey { .. }
        )
    }

    /// Whether the user cancelled an interactive prompt
    pub fn is_cancelled(&self) -> bool {
        matches!(self, Self::Prompt(PromptError::Cancelled))
    }

    /// Hand the error to a reporter on the matching channel
    pub fn report(&self, reporter: &dyn Reporter) {
        if self.is_user_error() {
            reporter.user_error(&self.to_string());
        } else {
            reporter.fatal(&self.to_string());
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::{RecordingReporter, Report};

    #[test]
    fn test_descriptor_errors_are_not_user_errors() {
        assert!(!ConfigError::descriptor("key", "bad").is_user_error());
        assert!(!ConfigError::AmbiguousConfig("dup".to_string()).is_user_error());
        assert!(!ConfigError::UnknownKey {
            key: "x".to_string(),
            available: String::new(),
        }
        .is_user_error());
    }

    #[test]
    fn test_resolution_errors_are_user_errors() {
        assert!(ConfigError::validation("key", "bad").is_user_error());
        assert!(ConfigError::ConflictingOptions {
            key: "a".to_string(),
            conflicting: "b".to_string(),
        }
        .is_user_error());
        assert!(ConfigError::Prompt(PromptError::Cancelled).is_cancelled());
    }

    #[test]
    fn test_report_routes_by_class() {
        let reporter = RecordingReporter::new();
        ConfigError::validation("username", "must not be empty").report(&reporter);
        ConfigError::descriptor("Bad", "key must be an identifier").report(&reporter);

        let reports = reporter.reports();
        assert_eq!(reports.len(), 2);
        assert!(matches!(&reports[0], Report::UserError(msg) if msg.contains("username")));
        assert!(matches!(&reports[1], Report::Fatal(msg) if msg.contains("Bad")));
    }

    #[test]
    fn test_conflict_message_names_both_keys() {
        let err = ConfigError::ConflictingOptions {
            key: "a".to_string(),
            conflicting: "b".to_string(),
        };
        assert_eq!(
            err.to_string(),
            "Unresolved conflict between options: 'a' and 'b'"
        );
    }
}
