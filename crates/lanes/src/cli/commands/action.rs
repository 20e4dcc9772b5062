//! Show the options an action accepts

use clap::Args;
use tracing::info;

use lanes_core::ConfigItem;

use super::{lookup_action, shell_options};
use crate::cli::{output, Cli, OutputFormat};

/// Show the options an action accepts
#[derive(Debug, Args)]
pub struct ActionCommand {
    /// Action name
    pub name: String,
}

impl ActionCommand {
    /// Execute the action command
    pub fn execute(&self, cli: &Cli) -> anyhow::Result<()> {
        info!(action = %self.name, "executing action command");
        let action = lookup_action(&self.name)?;
        let all = action.available_options()?;
        let items = shell_options(&all);

        match cli.format {
            OutputFormat::Json => {
                let options: Vec<_> = items.iter().map(|item| option_json(item)).collect();
                let doc = serde_json::json!({
                    "name": action.name(),
                    "description": action.description(),
                    "options_file": action.options_file_base(),
                    "options": options,
                });
                println!("{}", serde_json::to_string_pretty(&doc)?);
            }
            OutputFormat::Text => {
                println!(
                    "{}",
                    output::header(&format!("{}: {}", action.name(), action.description()))
                );
                println!();
                for item in &items {
                    print_option(item);
                }
                if !cli.quiet {
                    println!();
                    output::info("* = default value is dependent on the environment");
                }
            }
        }

        Ok(())
    }
}

fn print_option(item: &ConfigItem) {
    let mut line = format!("  {}", output::key_style().apply_to(item.key()));
    if let Some(short) = item.short_flag() {
        line.push_str(&format!(" (-{})", short));
    }
    if let Some(env) = item.env_name() {
        line.push_str(&format!("  {}", output::env_style().apply_to(env)));
    }
    println!("{}", line);

    if let Some(description) = item.description() {
        println!("      {}", description);
    }
    let default = item.help_default_value();
    if !default.is_empty() {
        println!("      default: {}", default);
    }
}

fn option_json(item: &ConfigItem) -> serde_json::Value {
    serde_json::json!({
        "key": item.key(),
        "env_name": item.env_name(),
        "short_option": item.short_flag().map(|c| format!("-{}", c)),
        "description": item.description(),
        "type": item.data_type().map(|t| t.to_string()),
        "optional": item.optional(),
        "sensitive": item.sensitive(),
        "default": item.help_default_value(),
    })
}
