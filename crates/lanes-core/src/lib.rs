//! Lanes Core - option descriptors and configuration resolution
//!
//! Tools declare the options they accept as [`ConfigItem`]s. A
//! [`Configuration`] resolves each option from explicit inputs, options
//! files, environment variables and defaults, coercing loosely typed input
//! to the declared type and validating it before anyone reads it.

pub mod action;
pub mod coerce;
pub mod configuration;
pub mod env;
pub mod error;
pub mod item;
pub mod prompt;
pub mod report;
pub mod value;

pub use action::{parse_action_options, Action, ActionRegistry};
pub use configuration::{
    find_options_file, options_file_names, read_options_file, Configuration, ConfigurationBuilder,
    Inputs, ResolutionContext, ValueSource,
};
pub use env::{EnvSource, Interactivity, MapEnv, ProcessEnv};
pub use error::{ConfigError, Result};
pub use item::{ConfigItem, ConfigItemBuilder, ConflictResolution, DataType, Deprecation, REDACTED};
pub use prompt::{NoPrompter, PromptError, Prompter, ScriptedPrompter};
pub use report::{RecordingReporter, Report, Reporter};
pub use value::{Callback, Value};
