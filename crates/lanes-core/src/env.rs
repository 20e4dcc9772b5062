//! Environment access and interactivity detection

use std::collections::HashMap;

use tracing::debug;

/// Variables whose presence marks a CI machine
pub const CI_MARKERS: [&str; 9] = [
    "JENKINS_URL",
    "TRAVIS",
    "CIRCLECI",
    "CI",
    "TEAMCITY_VERSION",
    "GO_PIPELINE_NAME",
    "bamboo_buildKey",
    "GITLAB_CI",
    "XCS",
];

/// Source of environment variables
pub trait EnvSource: Send + Sync {
    /// Look up a variable, `None` when unset or not valid unicode
    fn var(&self, name: &str) -> Option<String>;
}

/// Reads the real process environment
#[derive(Debug, Clone, Copy, Default)]
pub struct ProcessEnv;

impl EnvSource for ProcessEnv {
    fn var(&self, name: &str) -> Option<String> {
        std::env::var(name).ok()
    }
}

/// In-memory environment
#[derive(Debug, Clone, Default)]
pub struct MapEnv {
    vars: HashMap<String, String>,
}

impl MapEnv {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with(mut self, name: impl Into<String>, value: impl Into<String>) -> Self {
        self.set(name, value);
        self
    }

    pub fn set(&mut self, name: impl Into<String>, value: impl Into<String>) {
        self.vars.insert(name.into(), value.into());
    }
}

impl EnvSource for MapEnv {
    fn var(&self, name: &str) -> Option<String> {
        self.vars.get(name).cloned()
    }
}

/// Whether a missing required value may be asked for
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Interactivity {
    /// Someone is at the terminal
    Interactive,
    /// CI, scripts, tests
    NonInteractive,
}

impl Interactivity {
    /// Non-interactive on CI machines or when nobody is attending the terminal
    pub fn detect(env: &dyn EnvSource) -> Self {
        if is_ci(env) {
            debug!("CI environment detected, prompts disabled");
            return Self::NonInteractive;
        }
        if !console::user_attended() {
            debug!("terminal not attended, prompts disabled");
            return Self::NonInteractive;
        }
        Self::Interactive
    }

    pub fn is_interactive(&self) -> bool {
        matches!(self, Self::Interactive)
    }
}

/// Whether any known CI marker variable is set
pub fn is_ci(env: &dyn EnvSource) -> bool {
    CI_MARKERS.iter().any(|name| env.var(name).is_some())
}
