//! CLI commands

mod action;
mod actions;
mod completions;
mod run;

pub use action::ActionCommand;
pub use actions::ActionsCommand;
pub use completions::CompletionsCommand;
pub use run::RunCommand;

use std::sync::Arc;

use lanes_core::{Action, ConfigError, ConfigItem, Inputs};

/// Look up a built-in action by name
fn lookup_action(name: &str) -> anyhow::Result<Arc<dyn Action>> {
    let registry = crate::actions::registry();
    registry.get(name).ok_or_else(|| {
        anyhow::anyhow!(
            "Unknown action '{}', available actions: {}",
            name,
            registry.names().join(", ")
        )
    })
}

/// Options that can be given on the command line
fn shell_options(items: &[ConfigItem]) -> Vec<&ConfigItem> {
    items.iter().filter(|item| item.display_in_shell()).collect()
}

/// Reject `key:value` arguments for options hidden from the command line
fn reject_hidden_inputs(items: &[ConfigItem], inputs: &Inputs) -> lanes_core::Result<()> {
    match items
        .iter()
        .find(|item| !item.display_in_shell() && inputs.contains_key(item.key()))
    {
        Some(item) => Err(ConfigError::validation(
            item.key(),
            format!(
                "'{}' can't be passed on the command line, use an options file or {} instead",
                item.key(),
                item.env_name().unwrap_or("the environment")
            ),
        )),
        None => Ok(()),
    }
}
