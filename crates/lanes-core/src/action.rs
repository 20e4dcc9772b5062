//! Actions and their declared options

use std::sync::Arc;

use tracing::{debug, error};

use crate::configuration::{Configuration, Inputs, ResolutionContext};
use crate::error::{ConfigError, Result};
use crate::item::ConfigItem;

/// A tool step that declares the options it accepts
pub trait Action: Send + Sync {
    /// Name used on the command line
    fn name(&self) -> &str;

    /// One-line summary
    fn description(&self) -> &str;

    /// Declared options, in the order they are shown and resolved
    fn available_options(&self) -> Result<Vec<ConfigItem>>;

    /// Base name of the action's options file, `Certfile` for `cert`
    fn options_file_base(&self) -> String {
        let mut chars = self.name().chars();
        match chars.next() {
            Some(first) => format!("{}{}file", first.to_uppercase(), chars.as_str()),
            None => "Lanesfile".to_string(),
        }
    }
}

/// Resolve `inputs` against the options an action declares
pub fn parse_action_options(
    action: &dyn Action,
    inputs: Inputs,
    context: ResolutionContext,
) -> Result<Configuration> {
    let items = action.available_options()?;
    debug!(action = action.name(), options = items.len(), inputs = inputs.len(), "parsing action options");

    Configuration::builder(items)
        .inputs(inputs)
        .context(context)
        .build()
        .inspect_err(|e| {
            if let ConfigError::UnknownKey { key, .. } = e {
                error!(
                    action = action.name(),
                    key = %key,
                    "action does not support option, run `lanes action {}` for the list of available options",
                    action.name()
                );
            }
        })
}

/// Registry of available actions
pub struct ActionRegistry {
    actions: Vec<Arc<dyn Action>>,
}

impl ActionRegistry {
    /// Create an empty registry
    pub fn new() -> Self {
        Self {
            actions: Vec::new(),
        }
    }

    /// Register an action
    pub fn register<A: Action + 'static>(&mut self, action: A) {
        self.actions.push(Arc::new(action));
    }

    /// Get an action by name
    pub fn get(&self, name: &str) -> Option<Arc<dyn Action>> {
        self.actions.iter().find(|a| a.name() == name).cloned()
    }

    /// Get all registered actions
    pub fn all(&self) -> &[Arc<dyn Action>] {
        &self.actions
    }

    /// Get action names
    pub fn names(&self) -> Vec<String> {
        self.actions.iter().map(|a| a.name().to_string()).collect()
    }
}

impl Default for ActionRegistry {
    fn default() -> Self {
        Self::new()
    }
}
